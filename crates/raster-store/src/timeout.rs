//! Client-side deadline enforcement for raster service calls.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use aq_common::{DateRange, RegionSpec, StatisticsRecord};

use crate::service::{
    CollectionHandle, ImageRef, RasterService, RasterStoreError, ReducerKind, StoreResult,
};

/// Wraps a [`RasterService`] and bounds every call with a deadline.
///
/// Remote queries would otherwise block until the backend answers; a slow or
/// hung backend surfaces as a distinct [`RasterStoreError::Timeout`] instead
/// of an indefinite stall.
pub struct TimeoutRasterService {
    inner: Arc<dyn RasterService>,
    deadline: Duration,
}

impl TimeoutRasterService {
    pub fn new(inner: Arc<dyn RasterService>, deadline: Duration) -> Self {
        Self { inner, deadline }
    }

    async fn bounded<T>(&self, fut: impl Future<Output = StoreResult<T>> + Send) -> StoreResult<T> {
        match tokio::time::timeout(self.deadline, fut).await {
            Ok(result) => result,
            Err(_) => Err(RasterStoreError::Timeout(self.deadline.as_secs())),
        }
    }
}

#[async_trait]
impl RasterService for TimeoutRasterService {
    async fn filter(
        &self,
        collection_id: &str,
        band: &str,
        range: &DateRange,
        region: &RegionSpec,
    ) -> StoreResult<CollectionHandle> {
        self.bounded(self.inner.filter(collection_id, band, range, region))
            .await
    }

    async fn list_images(&self, handle: &CollectionHandle) -> StoreResult<Vec<ImageRef>> {
        self.bounded(self.inner.list_images(handle)).await
    }

    async fn temporal_mean(&self, handle: &CollectionHandle) -> StoreResult<ImageRef> {
        self.bounded(self.inner.temporal_mean(handle)).await
    }

    async fn reduce_region(
        &self,
        image: &ImageRef,
        region: &RegionSpec,
        reducer: ReducerKind,
        scale_meters: u32,
    ) -> StoreResult<StatisticsRecord> {
        self.bounded(self.inner.reduce_region(image, region, reducer, scale_meters))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Backend that never answers.
    struct StalledService;

    #[async_trait]
    impl RasterService for StalledService {
        async fn filter(
            &self,
            _collection_id: &str,
            _band: &str,
            _range: &DateRange,
            _region: &RegionSpec,
        ) -> StoreResult<CollectionHandle> {
            std::future::pending().await
        }

        async fn list_images(&self, _handle: &CollectionHandle) -> StoreResult<Vec<ImageRef>> {
            std::future::pending().await
        }

        async fn temporal_mean(&self, _handle: &CollectionHandle) -> StoreResult<ImageRef> {
            std::future::pending().await
        }

        async fn reduce_region(
            &self,
            _image: &ImageRef,
            _region: &RegionSpec,
            _reducer: ReducerKind,
            _scale_meters: u32,
        ) -> StoreResult<StatisticsRecord> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_stalled_call_times_out() {
        let svc = TimeoutRasterService::new(Arc::new(StalledService), Duration::from_millis(20));
        let region = RegionSpec::new(0.0, 0.0, 1.0, 1.0).unwrap();
        let range = DateRange::parse("2024-01-01", "2024-01-31").unwrap();

        let err = svc.filter("c", "b", &range, &region).await.unwrap_err();
        assert!(matches!(err, RasterStoreError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_fast_call_passes_through() {
        let inner = Arc::new(crate::memory::MemoryRasterService::new());
        let svc = TimeoutRasterService::new(inner, Duration::from_secs(5));
        let region = RegionSpec::new(0.0, 0.0, 1.0, 1.0).unwrap();
        let range = DateRange::parse("2024-01-01", "2024-01-31").unwrap();

        let handle = svc.filter("c", "b", &range, &region).await.unwrap();
        assert!(svc.list_images(&handle).await.unwrap().is_empty());
    }
}
