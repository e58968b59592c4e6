//! Geographic region types.

use serde::{Deserialize, Serialize};

use crate::error::{AqError, AqResult};

/// A geographic bounding rectangle in EPSG:4326 degrees.
///
/// This is the spatial filter for every query: collections are restricted to
/// it, and all regional reductions are computed over it. It is created once
/// per configuration and shared read-only afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionSpec {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl RegionSpec {
    /// Create a region from corner coordinates.
    ///
    /// Requires min < max on both axes and finite coordinates.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> AqResult<Self> {
        let coords = [min_lon, min_lat, max_lon, max_lat];
        if coords.iter().any(|c| !c.is_finite()) {
            return Err(AqError::InvalidRegion(
                "coordinates must be finite".to_string(),
            ));
        }
        if min_lon >= max_lon || min_lat >= max_lat {
            return Err(AqError::InvalidRegion(format!(
                "expected min < max on both axes, got ({}, {}, {}, {})",
                min_lon, min_lat, max_lon, max_lat
            )));
        }
        Ok(Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        })
    }

    /// Width of the region in degrees of longitude.
    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Height of the region in degrees of latitude.
    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Center of the region as (lon, lat).
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lon + self.max_lon) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }

    /// Check if a point is contained within this region.
    pub fn contains_point(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }

    /// Check if this region intersects another.
    pub fn intersects(&self, other: &RegionSpec) -> bool {
        self.min_lon < other.max_lon
            && self.max_lon > other.min_lon
            && self.min_lat < other.max_lat
            && self.max_lat > other.min_lat
    }
}

impl std::fmt::Display for RegionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_region() {
        let region = RegionSpec::new(100.3, 13.5, 100.9, 14.0).unwrap();
        assert!((region.width() - 0.6).abs() < 1e-12);
        assert!((region.height() - 0.5).abs() < 1e-12);
        let (lon, lat) = region.center();
        assert!((lon - 100.6).abs() < 1e-9);
        assert!((lat - 13.75).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_region_rejected() {
        assert!(RegionSpec::new(100.9, 13.5, 100.3, 14.0).is_err());
        assert!(RegionSpec::new(100.3, 14.0, 100.9, 13.5).is_err());
        assert!(RegionSpec::new(100.3, 13.5, 100.3, 14.0).is_err());
        assert!(RegionSpec::new(f64::NAN, 13.5, 100.9, 14.0).is_err());
    }

    #[test]
    fn test_contains_point() {
        let region = RegionSpec::new(100.3, 13.5, 100.9, 14.0).unwrap();
        assert!(region.contains_point(100.5, 13.75));
        assert!(region.contains_point(100.3, 13.5));
        assert!(!region.contains_point(101.0, 13.75));
        assert!(!region.contains_point(100.5, 14.5));
    }

    #[test]
    fn test_intersects() {
        let a = RegionSpec::new(0.0, 0.0, 10.0, 10.0).unwrap();
        let b = RegionSpec::new(5.0, 5.0, 15.0, 15.0).unwrap();
        let c = RegionSpec::new(20.0, 20.0, 30.0, 30.0).unwrap();
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }
}
