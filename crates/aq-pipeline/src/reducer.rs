//! Regional reduction of single rasters.

use aq_common::{AqError, AqResult, RegionSpec, StatisticsRecord};
use raster_store::{ImageRef, RasterService, RasterStoreError, ReducerKind};

/// Nominal ground sampling distance for every regional reduction, in
/// meters.
///
/// Coarser than the native resolution of any supported layer: the reduction
/// samples at 1 km to trade precision for compute cost. This constant
/// directly affects every numeric output of the pipeline, so it is fixed
/// and explicit rather than per-call.
pub const REDUCTION_SCALE_METERS: u32 = 1000;

/// Reduces one raster image, restricted to a region, to scalar statistics.
///
/// Thin orchestration over [`RasterService::reduce_region`]: the numeric
/// work happens in the backend, this type owns the error classification and
/// the finiteness guarantee on returned values.
pub struct RegionReducer<'a> {
    svc: &'a dyn RasterService,
    scale_meters: u32,
}

impl<'a> RegionReducer<'a> {
    pub fn new(svc: &'a dyn RasterService) -> Self {
        Self {
            svc,
            scale_meters: REDUCTION_SCALE_METERS,
        }
    }

    /// Mean-only reduction, used for per-image time-series sampling.
    ///
    /// Returns `None` when the region has no valid pixels for this image
    /// (e.g. full cloud cover) — absence, not zero and not an error.
    pub async fn mean(&self, image: &ImageRef, region: &RegionSpec) -> AqResult<Option<f64>> {
        let record = self
            .svc
            .reduce_region(image, region, ReducerKind::Mean, self.scale_meters)
            .await
            .map_err(reduction_error)?;
        // A present value is always finite; anything else from the backend
        // is treated as absent.
        Ok(record.mean.filter(|v| v.is_finite()))
    }

    /// Combined mean/stddev/min/max reduction, used for aggregate
    /// statistics over a composite. Every field is absent when the region
    /// holds no valid pixels.
    pub async fn full(
        &self,
        image: &ImageRef,
        region: &RegionSpec,
    ) -> AqResult<StatisticsRecord> {
        let record = self
            .svc
            .reduce_region(image, region, ReducerKind::Full, self.scale_meters)
            .await
            .map_err(reduction_error)?;
        Ok(StatisticsRecord {
            mean: record.mean.filter(|v| v.is_finite()),
            std_dev: record.std_dev.filter(|v| v.is_finite()),
            min: record.min.filter(|v| v.is_finite()),
            max: record.max.filter(|v| v.is_finite()),
        })
    }
}

/// Reduction failures are genuine backend/query errors; a response that
/// cannot be classified also lands here rather than being coerced to
/// no-data.
fn reduction_error(err: RasterStoreError) -> AqError {
    match err {
        RasterStoreError::Unavailable(msg) => AqError::ServiceUnavailable(msg),
        RasterStoreError::Timeout(secs) => AqError::ServiceTimeout(secs),
        RasterStoreError::InvalidQuery(msg) | RasterStoreError::Backend(msg) => {
            AqError::ReductionFailed(msg)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use aq_common::DateRange;
    use raster_store::CollectionHandle;

    /// Backend returning a canned record from every reduction.
    struct CannedService(StatisticsRecord);

    #[async_trait]
    impl RasterService for CannedService {
        async fn filter(
            &self,
            collection_id: &str,
            band: &str,
            range: &DateRange,
            region: &RegionSpec,
        ) -> Result<CollectionHandle, RasterStoreError> {
            Ok(CollectionHandle {
                collection_id: collection_id.to_string(),
                band: band.to_string(),
                range: *range,
                region: *region,
            })
        }

        async fn list_images(
            &self,
            _handle: &CollectionHandle,
        ) -> Result<Vec<ImageRef>, RasterStoreError> {
            Ok(Vec::new())
        }

        async fn temporal_mean(
            &self,
            _handle: &CollectionHandle,
        ) -> Result<ImageRef, RasterStoreError> {
            Ok(ImageRef {
                id: "composite".to_string(),
                acquired: None,
            })
        }

        async fn reduce_region(
            &self,
            _image: &ImageRef,
            _region: &RegionSpec,
            _reducer: ReducerKind,
            _scale_meters: u32,
        ) -> Result<StatisticsRecord, RasterStoreError> {
            Ok(self.0)
        }
    }

    fn region() -> RegionSpec {
        RegionSpec::new(100.3, 13.5, 100.9, 14.0).unwrap()
    }

    fn image() -> ImageRef {
        ImageRef {
            id: "granule-0".to_string(),
            acquired: None,
        }
    }

    #[tokio::test]
    async fn test_mean_treats_non_finite_as_absent() {
        let svc = CannedService(StatisticsRecord {
            mean: Some(f64::NAN),
            ..StatisticsRecord::default()
        });
        let value = RegionReducer::new(&svc)
            .mean(&image(), &region())
            .await
            .unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn test_full_drops_non_finite_fields_only() {
        let svc = CannedService(StatisticsRecord {
            mean: Some(0.4),
            std_dev: Some(f64::INFINITY),
            min: Some(f64::NEG_INFINITY),
            max: Some(0.9),
        });
        let record = RegionReducer::new(&svc)
            .full(&image(), &region())
            .await
            .unwrap();
        assert_eq!(record.mean, Some(0.4));
        assert_eq!(record.std_dev, None);
        assert_eq!(record.min, None);
        assert_eq!(record.max, Some(0.9));
    }

    #[tokio::test]
    async fn test_finite_values_pass_through() {
        let svc = CannedService(StatisticsRecord {
            mean: Some(0.25),
            ..StatisticsRecord::default()
        });
        let value = RegionReducer::new(&svc)
            .mean(&image(), &region())
            .await
            .unwrap();
        assert_eq!(value, Some(0.25));
    }
}
