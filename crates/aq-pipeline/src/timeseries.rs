//! Regional time-series assembly.

use tracing::debug;

use aq_common::{AqError, AqResult, RegionSpec, SamplePoint, TimeSeries};
use raster_store::{CollectionHandle, RasterService, RasterStoreError};

use crate::reducer::RegionReducer;

/// Maps a mean-only regional reduction over every image in a filtered
/// collection and assembles the date-ordered series.
///
/// Images whose region holds no valid pixels contribute nothing. The sort
/// is stable, so samples sharing a timestamp keep the backend's order. For
/// a fixed backend snapshot the result is deterministic.
pub struct TimeSeriesBuilder<'a> {
    svc: &'a dyn RasterService,
}

impl<'a> TimeSeriesBuilder<'a> {
    pub fn new(svc: &'a dyn RasterService) -> Self {
        Self { svc }
    }

    /// Build the series for one filtered collection. An empty collection,
    /// or one whose every image is fully invalid over the region, yields an
    /// empty series — a normal terminal state, not an error.
    pub async fn build(
        &self,
        handle: &CollectionHandle,
        region: &RegionSpec,
    ) -> AqResult<TimeSeries> {
        let images = self.svc.list_images(handle).await.map_err(listing_error)?;
        let reducer = RegionReducer::new(self.svc);

        let mut points = Vec::with_capacity(images.len());
        for image in &images {
            // Composites never appear in a listing; skip anything without
            // an acquisition time rather than fabricating one.
            let Some(timestamp) = image.acquired else {
                continue;
            };
            if let Some(value) = reducer.mean(image, region).await? {
                points.push(SamplePoint { timestamp, value });
            }
        }

        debug!(
            collection = %handle.collection_id,
            images = images.len(),
            samples = points.len(),
            "assembled time series"
        );

        Ok(TimeSeries::from_unordered(points))
    }
}

fn listing_error(err: RasterStoreError) -> AqError {
    match err {
        RasterStoreError::Unavailable(msg) => AqError::ServiceUnavailable(msg),
        RasterStoreError::Timeout(secs) => AqError::ServiceTimeout(secs),
        RasterStoreError::InvalidQuery(msg) | RasterStoreError::Backend(msg) => {
            AqError::ServiceUnavailable(msg)
        }
    }
}
