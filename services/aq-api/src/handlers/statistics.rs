//! Aggregate regional statistics handler.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use aq_common::{DateRange, LayerId, StatisticsRecord};
use aq_pipeline::{CollectionQuery, StatisticsAggregator};

use crate::handlers::{error_response, WindowParams};
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct StatisticsResponse {
    layer: LayerId,
    range: DateRange,
    /// Spatial statistics of the temporal mean composite. All fields absent
    /// means "no data for this selection", never zero.
    statistics: StatisticsRecord,
}

/// GET /layers/:layer_id/statistics — mean/stddev/min/max of the
/// time-averaged field over the study region.
pub async fn statistics_handler(
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

    match StatisticsAggregator::new(state.service.as_ref())
        .aggregate(&handle, &region)
        .await
    {
        Ok(statistics) => Json(StatisticsResponse {
            layer,
            range,
            statistics,
        })
        .into_response(),
        Err(err) => error_response(&err),
    }
}
