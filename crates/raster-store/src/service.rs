//! The remote raster service query contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use aq_common::{DateRange, RegionSpec, StatisticsRecord};

/// Handle to a filtered view of a raster collection: one collection and
/// band, restricted to a date range and region.
///
/// Nothing is materialized locally; every downstream operation is a further
/// query against the handle. Handles are scoped to one analysis request and
/// are not cached across requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionHandle {
    pub collection_id: String,
    pub band: String,
    pub range: DateRange,
    pub region: RegionSpec,
}

/// Reference to a single raster image held by the backend.
///
/// Granules carry their acquisition time; synthetic composites (e.g. a
/// temporal mean) do not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Backend-assigned identifier, opaque to callers.
    pub id: String,
    /// Acquisition time, if this references a single granule.
    pub acquired: Option<DateTime<Utc>>,
}

/// Which statistics a regional reduction should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReducerKind {
    /// Mean only; used for per-image time-series sampling.
    Mean,
    /// Mean, standard deviation, minimum and maximum; used for aggregate
    /// statistics over a composite.
    Full,
}

/// Errors from the remote raster service.
#[derive(Debug, Error)]
pub enum RasterStoreError {
    /// The service could not be reached at all (network/auth failure).
    #[error("service unreachable: {0}")]
    Unavailable(String),

    /// The call did not complete within the configured deadline.
    #[error("call exceeded deadline of {0}s")]
    Timeout(u64),

    /// The service rejected the query (malformed region, bad scale, unknown
    /// image reference).
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The service accepted the query but failed while executing it. Also
    /// the conservative classification for any response that cannot be
    /// interpreted.
    #[error("backend failure: {0}")]
    Backend(String),
}

/// Result type alias for raster store operations.
pub type StoreResult<T> = Result<T, RasterStoreError>;

/// The narrow query contract of the remote raster engine.
///
/// All calls are remote round-trips and may fail; absence of data is never a
/// failure. A filter that matches nothing returns a perfectly valid handle
/// whose image list is empty, and a reduction over a region with no valid
/// pixels returns a record with absent statistics.
#[async_trait]
pub trait RasterService: Send + Sync {
    /// Restrict a collection to a band, date range and region.
    async fn filter(
        &self,
        collection_id: &str,
        band: &str,
        range: &DateRange,
        region: &RegionSpec,
    ) -> StoreResult<CollectionHandle>;

    /// List the images in a filtered collection, in acquisition order as
    /// held by the backend. Every returned ref has an acquisition time.
    async fn list_images(&self, handle: &CollectionHandle) -> StoreResult<Vec<ImageRef>>;

    /// Build the temporal mean composite of a filtered collection: one
    /// synthetic raster whose per-pixel value is the mean across all images
    /// in the window, ignoring invalid pixels per-pixel. An empty collection
    /// yields a composite with no valid pixels.
    async fn temporal_mean(&self, handle: &CollectionHandle) -> StoreResult<ImageRef>;

    /// Reduce one image over a region to scalar statistics at the given
    /// nominal ground sampling distance in meters. Statistics are absent
    /// when no valid pixels fall inside the region.
    async fn reduce_region(
        &self,
        image: &ImageRef,
        region: &RegionSpec,
        reducer: ReducerKind,
        scale_meters: u32,
    ) -> StoreResult<StatisticsRecord>;
}
