//! HTTP request handlers.

pub mod analysis;
pub mod health;
pub mod layers;
pub mod statistics;
pub mod timeseries;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Days, Utc};
use serde::{Deserialize, Serialize};

use aq_common::{AqError, AqResult, DateRange};

/// Common query parameters selecting an analysis window.
#[derive(Debug, Default, Deserialize)]
pub struct WindowParams {
    /// Start date, `YYYY-MM-DD`.
    pub start: Option<String>,
    /// End date, `YYYY-MM-DD` (exclusive).
    pub end: Option<String>,
    /// Output format (`json` or `csv` where supported).
    pub f: Option<String>,
}

impl WindowParams {
    /// Resolve the requested window, defaulting to the trailing 30 days.
    /// An inverted window is accepted; it simply selects nothing.
    pub fn resolve_range(&self) -> AqResult<DateRange> {
        let today = Utc::now().date_naive();
        let start = match &self.start {
            Some(s) => aq_common::time::parse_date(s)?,
            None => today
                .checked_sub_days(Days::new(30))
                .unwrap_or(today),
        };
        let end = match &self.end {
            Some(s) => aq_common::time::parse_date(s)?,
            None => today,
        };
        Ok(DateRange::new(start, end))
    }
}

/// Structured error payload.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    pub retryable: bool,
}

/// Map a pipeline error to its HTTP response.
pub fn error_response(err: &AqError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = ErrorBody {
        code: error_code(err),
        message: err.to_string(),
        retryable: err.is_retryable(),
    };
    (status, Json(body)).into_response()
}

fn error_code(err: &AqError) -> &'static str {
    match err {
        AqError::UnknownLayer(_) => "unknown_layer",
        AqError::InvalidRegion(_) => "invalid_region",
        AqError::InvalidDate(_) => "invalid_date",
        AqError::ServiceUnavailable(_) => "service_unavailable",
        AqError::ServiceTimeout(_) => "service_timeout",
        AqError::ReductionFailed(_) => "reduction_failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_window() {
        let params = WindowParams {
            start: Some("2024-01-01".to_string()),
            end: Some("2024-01-31".to_string()),
            f: None,
        };
        let range = params.resolve_range().unwrap();
        assert_eq!(range.to_string(), "2024-01-01/2024-01-31");
    }

    #[test]
    fn test_default_window_is_trailing_30_days() {
        let range = WindowParams::default().resolve_range().unwrap();
        assert!(!range.is_empty());
        assert_eq!(range.end, Utc::now().date_naive());
    }

    #[test]
    fn test_bad_date_rejected() {
        let params = WindowParams {
            start: Some("last tuesday".to_string()),
            end: None,
            f: None,
        };
        assert!(matches!(
            params.resolve_range(),
            Err(AqError::InvalidDate(_))
        ));
    }
}
