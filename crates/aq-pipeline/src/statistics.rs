//! Aggregate regional statistics over the temporal mean composite.

use tracing::debug;

use aq_common::{AqError, AqResult, RegionSpec, StatisticsRecord};
use raster_store::{CollectionHandle, ImageRef, RasterService, RasterStoreError};

use crate::reducer::RegionReducer;

/// Computes the spatial distribution statistics of the time-averaged field.
///
/// The filtered collection is first collapsed to its temporal mean
/// composite (per-pixel mean across the window, invalid pixels ignored
/// per-pixel), then reduced over the region with the combined
/// mean/stddev/min/max reducer. This answers a different question than the
/// descriptive statistics of a time series — spatial spread of the average
/// field versus temporal spread of the regional average — and the two must
/// not be conflated.
pub struct StatisticsAggregator<'a> {
    svc: &'a dyn RasterService,
}

impl<'a> StatisticsAggregator<'a> {
    pub fn new(svc: &'a dyn RasterService) -> Self {
        Self { svc }
    }

    /// Aggregate one filtered collection. An empty collection yields a
    /// record with every statistic absent; callers render that as
    /// "no data", never as zero.
    pub async fn aggregate(
        &self,
        handle: &CollectionHandle,
        region: &RegionSpec,
    ) -> AqResult<StatisticsRecord> {
        let composite = composite_ref(self.svc, handle).await?;

        let record = RegionReducer::new(self.svc).full(&composite, region).await?;

        debug!(
            collection = %handle.collection_id,
            empty = record.is_empty(),
            "aggregated regional statistics"
        );

        Ok(record)
    }
}

/// Fetch the temporal mean composite reference for a filtered collection.
pub(crate) async fn composite_ref(
    svc: &dyn RasterService,
    handle: &CollectionHandle,
) -> AqResult<ImageRef> {
    svc.temporal_mean(handle).await.map_err(composite_error)
}

fn composite_error(err: RasterStoreError) -> AqError {
    match err {
        RasterStoreError::Unavailable(msg) => AqError::ServiceUnavailable(msg),
        RasterStoreError::Timeout(secs) => AqError::ServiceTimeout(secs),
        RasterStoreError::InvalidQuery(msg) | RasterStoreError::Backend(msg) => {
            AqError::ReductionFailed(msg)
        }
    }
}
