//! Regional time series and summary statistics types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One regional sample: the mean band value over the region for a single
/// image, paired with the image's acquisition time. Values are always finite;
/// images with no valid pixels in the region never become samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// A date-ordered sequence of regional samples.
///
/// Timestamps are non-decreasing; duplicates from same-day granules are
/// allowed and not deduplicated. An empty series is a valid terminal state
/// meaning "no data for this period", not an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeSeries {
    points: Vec<SamplePoint>,
}

impl TimeSeries {
    /// Build a series from samples in arbitrary order. Sorting is stable:
    /// samples sharing a timestamp keep their source order.
    pub fn from_unordered(mut points: Vec<SamplePoint>) -> Self {
        points.sort_by_key(|p| p.timestamp);
        Self { points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn points(&self) -> &[SamplePoint] {
        &self.points
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.value)
    }

    /// Arithmetic mean of the sample values.
    pub fn mean(&self) -> Option<f64> {
        if self.points.is_empty() {
            return None;
        }
        Some(self.values().sum::<f64>() / self.points.len() as f64)
    }

    pub fn min(&self) -> Option<f64> {
        self.values().reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.values().reduce(f64::max)
    }

    /// Sample standard deviation (n-1 denominator). None for fewer than two
    /// samples.
    pub fn std_dev(&self) -> Option<f64> {
        let n = self.points.len();
        if n < 2 {
            return None;
        }
        let mean = self.mean()?;
        let sum_sq: f64 = self.values().map(|v| (v - mean) * (v - mean)).sum();
        Some((sum_sq / (n - 1) as f64).sqrt())
    }

    /// Descriptive statistics of the sample values over time.
    ///
    /// These are temporal statistics of the regional mean, distinct from the
    /// spatial statistics of the temporal-mean composite.
    pub fn summary(&self) -> StatisticsRecord {
        StatisticsRecord {
            mean: self.mean(),
            std_dev: self.std_dev(),
            min: self.min(),
            max: self.max(),
        }
    }

    /// Serialize as CSV with a `Date,<column>` header and one
    /// `YYYY-MM-DD,value` row per sample. An empty series produces a
    /// header-only file.
    pub fn to_csv(&self, column: &str) -> String {
        let mut out = format!("Date,{}\n", column);
        for point in &self.points {
            out.push_str(&format!(
                "{},{}\n",
                point.timestamp.format("%Y-%m-%d"),
                point.value
            ));
        }
        out
    }
}

/// Summary statistics of one regional reduction. Any field may be absent
/// when there were no valid pixels to reduce; absent is distinct from zero
/// and must be rendered as "no data".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsRecord {
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl StatisticsRecord {
    /// True when every statistic is absent.
    pub fn is_empty(&self) -> bool {
        self.mean.is_none() && self.std_dev.is_none() && self.min.is_none() && self.max.is_none()
    }
}
