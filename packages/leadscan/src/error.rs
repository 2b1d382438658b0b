//! Typed errors for the lead scanning library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

/// Errors that can occur while scanning pages and admitting leads.
///
/// Validation rejections and duplicate admissions are *not* errors;
/// they are ordinary outcomes reported through [`crate::AdmissionOutcome`].
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The external key-value store failed an I/O operation
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A persisted value could not be decoded into its expected shape
    #[error("stored value decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Cross-context message delivery failed
    #[error("transport error: {0}")]
    Transport(String),
}

impl ScrapeError {
    /// Wrap an arbitrary error as a storage failure.
    pub fn storage(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Storage(err.into())
    }
}

/// Result type alias for scanning operations.
pub type Result<T> = std::result::Result<T, ScrapeError>;
