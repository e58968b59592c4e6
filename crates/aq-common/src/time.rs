//! Calendar date ranges for collection queries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AqError, AqResult};

/// A calendar date range: inclusive start, exclusive end.
///
/// The exclusive end matches the filtering convention of the backing raster
/// service. A range whose start is not before its end is empty; user input
/// with start after end must produce empty results downstream, never an
/// error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Parse a range from two `YYYY-MM-DD` strings.
    pub fn parse(start: &str, end: &str) -> AqResult<Self> {
        Ok(Self {
            start: parse_date(start)?,
            end: parse_date(end)?,
        })
    }

    /// Whether this range selects no dates at all.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Check if a date falls within the range (start inclusive, end
    /// exclusive). Always false for an empty range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.start, self.end)
    }
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(s: &str) -> AqResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| AqError::InvalidDate(format!("expected YYYY-MM-DD, got '{}'", s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_parse() {
        let range = DateRange::parse("2024-01-01", "2024-01-31").unwrap();
        assert_eq!(range.start, d("2024-01-01"));
        assert_eq!(range.end, d("2024-01-31"));
        assert!(!range.is_empty());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(DateRange::parse("01/02/2024", "2024-01-31").is_err());
        assert!(DateRange::parse("2024-01-01", "yesterday").is_err());
    }

    #[test]
    fn test_inverted_range_is_empty_not_error() {
        let range = DateRange::new(d("2024-02-01"), d("2024-01-01"));
        assert!(range.is_empty());
        assert!(!range.contains(d("2024-01-15")));
    }

    #[test]
    fn test_end_exclusive() {
        let range = DateRange::new(d("2024-01-01"), d("2024-01-31"));
        assert!(range.contains(d("2024-01-01")));
        assert!(range.contains(d("2024-01-30")));
        assert!(!range.contains(d("2024-01-31")));
        assert!(!range.contains(d("2023-12-31")));
    }

    #[test]
    fn test_zero_length_range_is_empty() {
        let range = DateRange::new(d("2024-01-01"), d("2024-01-01"));
        assert!(range.is_empty());
        assert!(!range.contains(d("2024-01-01")));
    }
}
