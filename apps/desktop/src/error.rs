//! # API Error Type
//!
//! Unified error type for commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Aquagas POS                            │
//! │                                                                         │
//! │  Frontend                    Rust Backend                               │
//! │  ────────                    ────────────                               │
//! │                                                                         │
//! │  invoke('submit_sale')                                                  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Database Error? ─── DbError::QueryFailed("...") ──┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Print Error? ─────── PrintError::Surface ─────── ApiError ────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  try {                                                                  │
//! │    await invoke('submit_sale')                                          │
//! │  } catch (e) {                                                          │
//! │    // e.code = "SUBMISSION_FAILED"                                      │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Submission and print failures also push a [`Notification`] so the
//! operator sees them even when the caller ignores the error.
//!
//! [`Notification`]: crate::state::Notification

use aquagas_core::{CoreError, ValidationError};
use aquagas_db::DbError;
use aquagas_print::PrintError;
use serde::Serialize;

use crate::config::ConfigError;

/// API error returned from commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "SUBMISSION_IN_FLIGHT",
///   "message": "A sale is already being submitted"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed, or the form is not ready to submit
    ValidationError,

    /// Database operation failed
    DatabaseError,

    /// The backend rejected or could not store the sale
    SubmissionFailed,

    /// A submission for this session is still pending
    SubmissionInFlight,

    /// Artifact generation or printing failed
    PrintFailed,

    /// Configuration could not be loaded or is invalid
    ConfigError,

    /// Internal error
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    pub fn in_flight() -> Self {
        ApiError::new(
            ErrorCode::SubmissionInFlight,
            "A sale is already being submitted",
        )
    }

    /// Wraps whatever made the sale creation fail.
    pub fn submission_failed(cause: impl Into<ApiError>) -> Self {
        let cause = cause.into();
        ApiError::new(ErrorCode::SubmissionFailed, cause.message)
    }
}

/// Result type for commands
pub type ApiResult<T> = Result<T, ApiError>;

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::InvalidData(message) => ApiError::validation(message),
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AmountOverflow => ApiError::validation("Amount out of range"),
            CoreError::InvalidItemsPayload(e) => {
                tracing::error!("Invalid items payload: {}", e);
                ApiError::internal("Stored sale items are corrupt")
            }
            CoreError::InvalidProfile(e) => {
                tracing::error!("Invalid company profile: {}", e);
                ApiError::internal("Company settings are corrupt")
            }
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<PrintError> for ApiError {
    fn from(err: PrintError) -> Self {
        ApiError::new(ErrorCode::PrintFailed, err.to_string())
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_code_and_message() {
        let json = serde_json::to_value(ApiError::in_flight()).unwrap();
        assert_eq!(json["code"], "SUBMISSION_IN_FLIGHT");
        assert_eq!(json["message"], "A sale is already being submitted");
    }

    #[test]
    fn test_db_not_found() {
        let err: ApiError = DbError::not_found("Client", 99).into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Client not found: 99");
    }

    #[test]
    fn test_query_failure_hides_details() {
        let err: ApiError = DbError::QueryFailed("disk I/O error".to_string()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("disk"));
    }

    #[test]
    fn test_submission_failed_keeps_cause_message() {
        let err = ApiError::submission_failed(DbError::not_found("Client", 7));
        assert_eq!(err.code, ErrorCode::SubmissionFailed);
        assert_eq!(err.message, "Client not found: 7");
    }

    #[test]
    fn test_core_error_codes() {
        let err: ApiError = CoreError::AmountOverflow.into();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: ApiError = CoreError::InvalidProfile(json_err).into();
        assert_eq!(err.code, ErrorCode::Internal);
        assert_eq!(err.message, "Company settings are corrupt");
    }

    #[test]
    fn test_print_error_code() {
        let err: ApiError = PrintError::Surface("no frame".to_string()).into();
        assert_eq!(err.code, ErrorCode::PrintFailed);
    }
}
