//! Layer registry and map overlay handlers.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    response::{IntoResponse, Response},
    Json,
};

use aq_common::{LayerDescriptor, LayerId};
use aq_pipeline::{CollectionQuery, MapOverlay};

use crate::handlers::{error_response, WindowParams};
use crate::state::AppState;

/// GET /layers — the static layer registry.
pub async fn list_layers_handler() -> Response {
    Json(LayerDescriptor::registry()).into_response()
}

/// GET /layers/:layer_id/overlay — renderable composite reference plus
/// display mapping for the map widget.
pub async fn overlay_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(layer_id): Path<String>,
    Query(params): Query<WindowParams>,
) -> Response {
    let layer = match LayerId::parse(&layer_id) {
        Ok(layer) => layer,
        Err(err) => return error_response(&err),
    };
    let range = match params.resolve_range() {
        Ok(range) => range,
        Err(err) => return error_response(&err),
    };

    let region = state.config.region;
    let handle = match CollectionQuery::new(layer, range, region)
        .run(state.service.as_ref())
        .await
    {
        Ok(handle) => handle,
        Err(err) => return error_response(&err),
    };

    match MapOverlay::build(state.service.as_ref(), &handle, layer).await {
        Ok(overlay) => Json(overlay).into_response(),
        Err(err) => error_response(&err),
    }
}
