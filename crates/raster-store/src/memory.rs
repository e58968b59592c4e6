//! Deterministic in-memory raster backend.
//!
//! Holds small gridded rasters with per-cell missing values and answers the
//! [`RasterService`] contract exactly: end-exclusive date filtering, spatial
//! intersection, per-pixel temporal compositing, and regional reduction.
//! Used by tests and the demo deployment; a live satellite backend would be
//! a second implementation of the same trait.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use aq_common::{DateRange, RegionSpec, StatisticsRecord};

use crate::service::{
    CollectionHandle, ImageRef, RasterService, RasterStoreError, ReducerKind, StoreResult,
};

/// A rectangular raster of band values with missing cells.
///
/// Cells are laid out row-major with row 0 at the southern edge; each cell
/// value sits at the cell center.
#[derive(Debug, Clone, PartialEq)]
pub struct GridRaster {
    bounds: RegionSpec,
    width: usize,
    height: usize,
    values: Vec<Option<f64>>,
}

impl GridRaster {
    /// Build a raster by evaluating `f` at every cell center (lon, lat).
    /// `None` marks an invalid pixel (cloud cover, retrieval failure).
    pub fn from_fn(
        bounds: RegionSpec,
        width: usize,
        height: usize,
        f: impl Fn(f64, f64) -> Option<f64>,
    ) -> Self {
        let mut values = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                let (lon, lat) = cell_center(&bounds, width, height, col, row);
                values.push(f(lon, lat));
            }
        }
        Self {
            bounds,
            width,
            height,
            values,
        }
    }

    /// A raster with every cell set to the same value.
    pub fn constant(bounds: RegionSpec, width: usize, height: usize, value: f64) -> Self {
        Self::from_fn(bounds, width, height, |_, _| Some(value))
    }

    /// A raster with no cells at all, used for composites of empty
    /// collections.
    fn void(bounds: RegionSpec) -> Self {
        Self {
            bounds,
            width: 0,
            height: 0,
            values: Vec::new(),
        }
    }

    pub fn bounds(&self) -> &RegionSpec {
        &self.bounds
    }

    /// Valid, finite cell values whose centers fall inside `region`.
    fn values_in(&self, region: &RegionSpec) -> Vec<f64> {
        let mut out = Vec::new();
        for row in 0..self.height {
            for col in 0..self.width {
                let (lon, lat) = cell_center(&self.bounds, self.width, self.height, col, row);
                if !region.contains_point(lon, lat) {
                    continue;
                }
                if let Some(v) = self.values[row * self.width + col] {
                    if v.is_finite() {
                        out.push(v);
                    }
                }
            }
        }
        out
    }

    fn same_grid(&self, other: &GridRaster) -> bool {
        self.width == other.width && self.height == other.height && self.bounds == other.bounds
    }
}

fn cell_center(bounds: &RegionSpec, width: usize, height: usize, col: usize, row: usize) -> (f64, f64) {
    let lon = bounds.min_lon + bounds.width() * (col as f64 + 0.5) / width as f64;
    let lat = bounds.min_lat + bounds.height() * (row as f64 + 0.5) / height as f64;
    (lon, lat)
}

/// Image id for the temporal mean of a filtered view. Two handles with the
/// same content resolve to the same composite.
fn composite_key(handle: &CollectionHandle) -> String {
    format!(
        "composite:{}:{}:{}:{}",
        handle.collection_id, handle.band, handle.range, handle.region
    )
}

struct Granule {
    collection_id: String,
    band: String,
    acquired: DateTime<Utc>,
    raster: GridRaster,
}

/// In-memory [`RasterService`] implementation.
pub struct MemoryRasterService {
    granules: Vec<Granule>,
    /// Composites materialized by `temporal_mean`, keyed by the content of
    /// the handle that produced them. Granules never change after
    /// construction, so a cached composite stays valid and repeated
    /// identical requests share one entry instead of growing the map.
    composites: RwLock<HashMap<String, GridRaster>>,
}

impl MemoryRasterService {
    pub fn new() -> Self {
        Self {
            granules: Vec::new(),
            composites: RwLock::new(HashMap::new()),
        }
    }

    /// Ingest one granule. Insertion order is acquisition order for
    /// `list_images`.
    pub fn add_granule(
        &mut self,
        collection_id: impl Into<String>,
        band: impl Into<String>,
        acquired: DateTime<Utc>,
        raster: GridRaster,
    ) {
        self.granules.push(Granule {
            collection_id: collection_id.into(),
            band: band.into(),
            acquired,
            raster,
        });
    }

    /// Indices of granules matched by a handle, in insertion order.
    fn matching(&self, handle: &CollectionHandle) -> Vec<usize> {
        if handle.range.is_empty() {
            return Vec::new();
        }
        self.granules
            .iter()
            .enumerate()
            .filter(|(_, g)| {
                g.collection_id == handle.collection_id
                    && g.band == handle.band
                    && handle.range.contains(g.acquired.date_naive())
                    && g.raster.bounds.intersects(&handle.region)
            })
            .map(|(i, _)| i)
            .collect()
    }
}

impl Default for MemoryRasterService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RasterService for MemoryRasterService {
    async fn filter(
        &self,
        collection_id: &str,
        band: &str,
        range: &DateRange,
        region: &RegionSpec,
    ) -> StoreResult<CollectionHandle> {
        // Filtering is pure bookkeeping: the handle records the view and all
        // evaluation happens in later calls. A handle matching no granules
        // is valid.
        Ok(CollectionHandle {
            collection_id: collection_id.to_string(),
            band: band.to_string(),
            range: *range,
            region: *region,
        })
    }

    async fn list_images(&self, handle: &CollectionHandle) -> StoreResult<Vec<ImageRef>> {
        Ok(self
            .matching(handle)
            .iter()
            .map(|&i| ImageRef {
                id: format!("granule-{}", i),
                acquired: Some(self.granules[i].acquired),
            })
            .collect())
    }

    async fn temporal_mean(&self, handle: &CollectionHandle) -> StoreResult<ImageRef> {
        let key = composite_key(handle);
        if self.composites.read().await.contains_key(&key) {
            return Ok(ImageRef {
                id: key,
                acquired: None,
            });
        }

        let indices = self.matching(handle);

        let composite = match indices.split_first() {
            None => GridRaster::void(handle.region),
            Some((&first, rest)) => {
                let template = &self.granules[first].raster;
                for &i in rest {
                    if !template.same_grid(&self.granules[i].raster) {
                        return Err(RasterStoreError::Backend(format!(
                            "inconsistent granule grids in {}",
                            handle.collection_id
                        )));
                    }
                }

                let cells = template.width * template.height;
                let mut values = Vec::with_capacity(cells);
                for cell in 0..cells {
                    let mut sum = 0.0;
                    let mut count = 0usize;
                    for &i in indices.iter() {
                        if let Some(v) = self.granules[i].raster.values[cell] {
                            if v.is_finite() {
                                sum += v;
                                count += 1;
                            }
                        }
                    }
                    values.push(if count > 0 {
                        Some(sum / count as f64)
                    } else {
                        None
                    });
                }

                GridRaster {
                    bounds: template.bounds,
                    width: template.width,
                    height: template.height,
                    values,
                }
            }
        };

        debug!(
            collection = %handle.collection_id,
            granules = indices.len(),
            composite = %key,
            "materialized temporal mean"
        );

        self.composites
            .write()
            .await
            .entry(key.clone())
            .or_insert(composite);

        Ok(ImageRef {
            id: key,
            acquired: None,
        })
    }

    async fn reduce_region(
        &self,
        image: &ImageRef,
        region: &RegionSpec,
        reducer: ReducerKind,
        scale_meters: u32,
    ) -> StoreResult<StatisticsRecord> {
        if scale_meters == 0 {
            return Err(RasterStoreError::InvalidQuery(
                "scale must be positive".to_string(),
            ));
        }

        // This backend samples at native cell resolution regardless of the
        // requested scale; the scale still must be a sane value.
        let values = if let Some(idx) = image
            .id
            .strip_prefix("granule-")
            .and_then(|s| s.parse::<usize>().ok())
        {
            let granule = self.granules.get(idx).ok_or_else(|| {
                RasterStoreError::InvalidQuery(format!("unknown image: {}", image.id))
            })?;
            granule.raster.values_in(region)
        } else {
            let composites = self.composites.read().await;
            let raster = composites.get(&image.id).ok_or_else(|| {
                RasterStoreError::InvalidQuery(format!("unknown image: {}", image.id))
            })?;
            raster.values_in(region)
        };

        Ok(reduce_values(&values, reducer))
    }
}

/// Reduce a set of valid pixel values to the requested statistics. An empty
/// set yields an all-absent record.
fn reduce_values(values: &[f64], reducer: ReducerKind) -> StatisticsRecord {
    if values.is_empty() {
        return StatisticsRecord::default();
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;

    match reducer {
        ReducerKind::Mean => StatisticsRecord {
            mean: Some(mean),
            ..StatisticsRecord::default()
        },
        ReducerKind::Full => {
            let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
            StatisticsRecord {
                mean: Some(mean),
                std_dev: Some(variance.sqrt()),
                min: values.iter().copied().reduce(f64::min),
                max: values.iter().copied().reduce(f64::max),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bangkok() -> RegionSpec {
        RegionSpec::new(100.3, 13.5, 100.9, 14.0).unwrap()
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 3, 30, 0).unwrap()
    }

    fn range(start: &str, end: &str) -> DateRange {
        DateRange::parse(start, end).unwrap()
    }

    fn service_with_days(days: &[(u32, f64)]) -> MemoryRasterService {
        let mut svc = MemoryRasterService::new();
        for &(d, v) in days {
            svc.add_granule(
                "MODIS/061/MCD19A2_GRANULES",
                "Optical_Depth_047",
                day(d),
                GridRaster::constant(bangkok(), 6, 5, v),
            );
        }
        svc
    }

    #[tokio::test]
    async fn test_filter_end_exclusive() {
        let svc = service_with_days(&[(1, 0.1), (15, 0.2), (31, 0.3)]);
        let handle = svc
            .filter(
                "MODIS/061/MCD19A2_GRANULES",
                "Optical_Depth_047",
                &range("2024-01-01", "2024-01-31"),
                &bangkok(),
            )
            .await
            .unwrap();

        let images = svc.list_images(&handle).await.unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].acquired.unwrap().date_naive(), day(1).date_naive());
    }

    #[tokio::test]
    async fn test_inverted_range_matches_nothing() {
        let svc = service_with_days(&[(10, 0.4)]);
        let handle = svc
            .filter(
                "MODIS/061/MCD19A2_GRANULES",
                "Optical_Depth_047",
                &range("2024-02-01", "2024-01-01"),
                &bangkok(),
            )
            .await
            .unwrap();
        assert!(svc.list_images(&handle).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reduce_mean_only() {
        let svc = service_with_days(&[(5, 0.4)]);
        let handle = svc
            .filter(
                "MODIS/061/MCD19A2_GRANULES",
                "Optical_Depth_047",
                &range("2024-01-01", "2024-02-01"),
                &bangkok(),
            )
            .await
            .unwrap();
        let images = svc.list_images(&handle).await.unwrap();
        let stats = svc
            .reduce_region(&images[0], &bangkok(), ReducerKind::Mean, 1000)
            .await
            .unwrap();
        assert!((stats.mean.unwrap() - 0.4).abs() < 1e-12);
        assert_eq!(stats.std_dev, None);
        assert_eq!(stats.min, None);
    }

    #[tokio::test]
    async fn test_reduce_all_cloudy_is_absent() {
        let mut svc = MemoryRasterService::new();
        svc.add_granule(
            "MODIS/061/MCD19A2_GRANULES",
            "Optical_Depth_047",
            day(5),
            GridRaster::from_fn(bangkok(), 6, 5, |_, _| None),
        );
        let handle = svc
            .filter(
                "MODIS/061/MCD19A2_GRANULES",
                "Optical_Depth_047",
                &range("2024-01-01", "2024-02-01"),
                &bangkok(),
            )
            .await
            .unwrap();
        let images = svc.list_images(&handle).await.unwrap();
        let stats = svc
            .reduce_region(&images[0], &bangkok(), ReducerKind::Full, 1000)
            .await
            .unwrap();
        assert!(stats.is_empty());
    }

    #[tokio::test]
    async fn test_reduce_respects_region() {
        // Values increase eastward; reducing the west half must exclude the
        // east.
        let mut svc = MemoryRasterService::new();
        svc.add_granule(
            "c",
            "b",
            day(1),
            GridRaster::from_fn(bangkok(), 10, 10, |lon, _| Some(lon - 100.0)),
        );
        let handle = svc
            .filter("c", "b", &range("2024-01-01", "2024-02-01"), &bangkok())
            .await
            .unwrap();
        let images = svc.list_images(&handle).await.unwrap();

        let west = RegionSpec::new(100.3, 13.5, 100.6, 14.0).unwrap();
        let east = RegionSpec::new(100.6, 13.5, 100.9, 14.0).unwrap();
        let west_mean = svc
            .reduce_region(&images[0], &west, ReducerKind::Mean, 1000)
            .await
            .unwrap()
            .mean
            .unwrap();
        let east_mean = svc
            .reduce_region(&images[0], &east, ReducerKind::Mean, 1000)
            .await
            .unwrap()
            .mean
            .unwrap();
        assert!(west_mean < east_mean);
    }

    #[tokio::test]
    async fn test_temporal_mean_per_pixel() {
        let svc = service_with_days(&[(1, 0.2), (2, 0.6)]);
        let handle = svc
            .filter(
                "MODIS/061/MCD19A2_GRANULES",
                "Optical_Depth_047",
                &range("2024-01-01", "2024-02-01"),
                &bangkok(),
            )
            .await
            .unwrap();
        let composite = svc.temporal_mean(&handle).await.unwrap();
        assert_eq!(composite.acquired, None);
        let stats = svc
            .reduce_region(&composite, &bangkok(), ReducerKind::Full, 1000)
            .await
            .unwrap();
        assert!((stats.mean.unwrap() - 0.4).abs() < 1e-12);
        assert!((stats.min.unwrap() - 0.4).abs() < 1e-12);
        assert!(stats.std_dev.unwrap().abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_temporal_mean_of_empty_collection() {
        let svc = service_with_days(&[]);
        let handle = svc
            .filter("nope", "nope", &range("2024-01-01", "2024-02-01"), &bangkok())
            .await
            .unwrap();
        let composite = svc.temporal_mean(&handle).await.unwrap();
        let stats = svc
            .reduce_region(&composite, &bangkok(), ReducerKind::Full, 1000)
            .await
            .unwrap();
        assert!(stats.is_empty());
    }

    #[tokio::test]
    async fn test_repeated_composites_share_one_entry() {
        let svc = service_with_days(&[(1, 0.2), (2, 0.6)]);
        let handle = svc
            .filter(
                "MODIS/061/MCD19A2_GRANULES",
                "Optical_Depth_047",
                &range("2024-01-01", "2024-02-01"),
                &bangkok(),
            )
            .await
            .unwrap();

        let first = svc.temporal_mean(&handle).await.unwrap();
        for _ in 0..100 {
            let again = svc.temporal_mean(&handle).await.unwrap();
            assert_eq!(again.id, first.id);
        }
        assert_eq!(svc.composites.read().await.len(), 1);

        // A different window is a different composite.
        let narrower = svc
            .filter(
                "MODIS/061/MCD19A2_GRANULES",
                "Optical_Depth_047",
                &range("2024-01-01", "2024-01-02"),
                &bangkok(),
            )
            .await
            .unwrap();
        let other = svc.temporal_mean(&narrower).await.unwrap();
        assert_ne!(other.id, first.id);
        assert_eq!(svc.composites.read().await.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_image_is_invalid_query() {
        let svc = service_with_days(&[]);
        let bogus = ImageRef {
            id: "granule-99".to_string(),
            acquired: None,
        };
        let err = svc
            .reduce_region(&bogus, &bangkok(), ReducerKind::Mean, 1000)
            .await
            .unwrap_err();
        assert!(matches!(err, RasterStoreError::InvalidQuery(_)));
    }

    #[tokio::test]
    async fn test_zero_scale_rejected() {
        let svc = service_with_days(&[(1, 0.1)]);
        let image = ImageRef {
            id: "granule-0".to_string(),
            acquired: None,
        };
        let err = svc
            .reduce_region(&image, &bangkok(), ReducerKind::Mean, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, RasterStoreError::InvalidQuery(_)));
    }
}
