//! Error types for the air-quality analysis services.

use thiserror::Error;

/// Result type alias using AqError.
pub type AqResult<T> = Result<T, AqError>;

/// Primary error type for analysis operations.
///
/// Absence of data is never an error: an empty [`crate::TimeSeries`] or a
/// [`crate::StatisticsRecord`] with absent fields is the normal way to say
/// "no data for this selection".
#[derive(Debug, Error)]
pub enum AqError {
    // === Request validation errors ===
    #[error("Unknown layer: {0}")]
    UnknownLayer(String),

    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    // === Backend errors ===
    /// The remote raster service could not be reached (network/auth failure).
    /// Recoverable by retry.
    #[error("Raster service unavailable: {0}")]
    ServiceUnavailable(String),

    /// A remote call did not complete within the configured deadline.
    #[error("Raster service timed out after {0}s")]
    ServiceTimeout(u64),

    /// The backend rejected or failed a reduction. Not retryable without
    /// changing inputs.
    #[error("Region reduction failed: {0}")]
    ReductionFailed(String),
}

impl AqError {
    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            AqError::UnknownLayer(_) => 404,
            AqError::InvalidRegion(_) | AqError::InvalidDate(_) => 400,
            AqError::ServiceUnavailable(_) => 503,
            AqError::ServiceTimeout(_) => 504,
            AqError::ReductionFailed(_) => 502,
        }
    }

    /// Whether retrying the identical request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AqError::ServiceUnavailable(_) | AqError::ServiceTimeout(_)
        )
    }
}
