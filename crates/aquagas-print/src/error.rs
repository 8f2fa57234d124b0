//! Error types for rendering and dispatch

use thiserror::Error;

use crate::host::SurfaceId;

/// Print error types
#[derive(Debug, Error)]
pub enum PrintError {
    /// PDF generation failed
    #[error("PDF generation failed: {0}")]
    Pdf(String),

    /// Logo data URL could not be decoded
    #[error("Invalid logo: {0}")]
    Logo(String),

    /// IO error while spooling
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The host could not create or show a surface
    #[error("Surface error: {0}")]
    Surface(String),

    /// Release or print against a surface that is gone
    #[error("Unknown surface: {0}")]
    UnknownSurface(SurfaceId),

    /// The print command could not be started
    #[error("Print command failed: {0}")]
    Command(String),

    /// Background rendering task panicked or was cancelled
    #[error("Render task failed: {0}")]
    Task(String),

    /// Invalid print configuration
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type for print operations
pub type PrintResult<T> = Result<T, PrintError>;
