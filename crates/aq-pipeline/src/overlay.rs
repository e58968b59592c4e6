//! Map overlay descriptors for the visualization widget.

use serde::Serialize;

use aq_common::{AqResult, LayerDescriptor, LayerId};
use raster_store::{CollectionHandle, RasterService};

use crate::statistics::composite_ref;

/// Everything the map widget needs to render one layer: a reference to the
/// renderable composite raster plus its display mapping. The pipeline does
/// not render pixels itself.
#[derive(Debug, Clone, Serialize)]
pub struct MapOverlay {
    pub layer: LayerId,
    pub title: String,
    /// Backend reference to the temporal mean composite to render.
    pub image_id: String,
    /// Display mapping: values at or below `min` take the first palette
    /// entry, at or above `max` the last.
    pub min: f64,
    pub max: f64,
    pub palette: Vec<String>,
    pub opacity: f64,
}

impl MapOverlay {
    /// Build the overlay for one filtered collection.
    pub async fn build(
        svc: &dyn RasterService,
        handle: &CollectionHandle,
        layer: LayerId,
    ) -> AqResult<MapOverlay> {
        let desc = LayerDescriptor::get(layer);
        let composite = composite_ref(svc, handle).await?;

        Ok(MapOverlay {
            layer,
            title: desc.title.to_string(),
            image_id: composite.id,
            min: desc.valid_min,
            max: desc.valid_max,
            palette: desc.palette.iter().map(|c| c.to_string()).collect(),
            opacity: desc.opacity,
        })
    }
}
