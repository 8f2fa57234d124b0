//! # Error Types
//!
//! Domain-specific error types for aquagas-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  aquagas-core errors (this file)                                       │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  aquagas-db errors     └── DbError     - Database failures             │
//! │  aquagas-print errors  └── PrintError  - Artifact / surface failures   │
//! │  desktop app           └── ApiError    - What the frontend sees        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Notification │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cart operations never fail: an unknown product id is a no-op. Errors in
//! this crate come from validating data that crosses a boundary (sale
//! payloads, stored JSON, company settings).

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Money arithmetic left the i64 range.
    ///
    /// ## When This Occurs
    /// Only with absurd prices or quantities in a creation request; the
    /// cart clamps quantities to `MAX_QUANTITY`.
    #[error("Amount out of range")]
    AmountOverflow,

    /// Stored sale items could not be decoded.
    #[error("Invalid sale items payload: {0}")]
    InvalidItemsPayload(#[from] serde_json::Error),

    /// A stored company profile blob could not be decoded.
    #[error("Invalid company profile: {0}")]
    InvalidProfile(serde_json::Error),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value outside the accepted range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g. malformed amount, bad data URL).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
