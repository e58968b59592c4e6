//! Filtered collection queries.

use aq_common::{AqError, AqResult, DateRange, LayerDescriptor, LayerId, RegionSpec};
use raster_store::{CollectionHandle, RasterService, RasterStoreError};

/// Builds a filtered view of a layer's raster collection.
///
/// Resolves the layer in the static registry, then delegates date, bounds
/// and band filtering entirely to the remote service. No local computation
/// happens here; the returned handle is queried further by the builders.
#[derive(Debug, Clone, Copy)]
pub struct CollectionQuery {
    pub layer: LayerId,
    pub range: DateRange,
    pub region: RegionSpec,
}

impl CollectionQuery {
    pub fn new(layer: LayerId, range: DateRange, region: RegionSpec) -> Self {
        Self {
            layer,
            range,
            region,
        }
    }

    /// Resolve a layer by its string identifier. Unknown names fail fast
    /// with [`AqError::UnknownLayer`] before any remote call.
    pub fn for_layer(name: &str, range: DateRange, region: RegionSpec) -> AqResult<Self> {
        Ok(Self::new(LayerDescriptor::lookup(name)?.id, range, region))
    }

    pub fn descriptor(&self) -> &'static LayerDescriptor {
        LayerDescriptor::get(self.layer)
    }

    /// Issue the remote filter. A result matching zero images is a valid
    /// handle, not an error; later stages handle it gracefully.
    pub async fn run(&self, svc: &dyn RasterService) -> AqResult<CollectionHandle> {
        let desc = self.descriptor();
        svc.filter(desc.collection_id, desc.band, &self.range, &self.region)
            .await
            .map_err(filter_error)
    }
}

/// Failures at query time mean the service itself could not be reached or
/// rejected the request outright.
fn filter_error(err: RasterStoreError) -> AqError {
    match err {
        RasterStoreError::Unavailable(msg) => AqError::ServiceUnavailable(msg),
        RasterStoreError::Timeout(secs) => AqError::ServiceTimeout(secs),
        RasterStoreError::InvalidQuery(msg) | RasterStoreError::Backend(msg) => {
            AqError::ServiceUnavailable(msg)
        }
    }
}
