//! API runtime configuration.

use std::time::Duration;

use aq_common::{AqResult, RegionSpec};

/// Configuration assembled from CLI flags and environment variables.
///
/// The study region and remote-call deadline are explicit here rather than
/// process-wide constants; every component receives them from this object.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Fixed study region. All collection filtering and regional reduction
    /// happens over this rectangle.
    pub region: RegionSpec,

    /// Client-side deadline for each remote raster service call.
    pub request_timeout: Duration,
}

impl ApiConfig {
    pub fn new(
        min_lon: f64,
        min_lat: f64,
        max_lon: f64,
        max_lat: f64,
        timeout_secs: u64,
    ) -> AqResult<Self> {
        Ok(Self {
            region: RegionSpec::new(min_lon, min_lat, max_lon, max_lat)?,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = ApiConfig::new(100.3, 13.5, 100.9, 14.0, 30).unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!((config.region.width() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_region_rejected() {
        assert!(ApiConfig::new(100.9, 13.5, 100.3, 14.0, 30).is_err());
    }
}
