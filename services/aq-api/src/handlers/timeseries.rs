//! Regional time-series handler.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use aq_common::{LayerId, StatisticsRecord, TimeSeries};
use aq_pipeline::{CollectionQuery, TimeSeriesBuilder};

use crate::handlers::{error_response, WindowParams};
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct TimeSeriesResponse {
    layer: LayerId,
    series: TimeSeries,
    /// Descriptive statistics of the series values over time.
    summary: StatisticsRecord,
}

/// GET /layers/:layer_id/timeseries — date-ordered regional means.
///
/// `?f=csv` returns the series as `Date,<column>` rows; an empty series
/// still produces the header. An empty JSON series is the "no data for this
/// period" terminal state, not an error.
pub async fn timeseries_handler(
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

    let series = match TimeSeriesBuilder::new(state.service.as_ref())
        .build(&handle, &region)
        .await
    {
        Ok(series) => series,
        Err(err) => return error_response(&err),
    };

    if params.f.as_deref() == Some("csv") {
        let column = layer.as_str().to_uppercase();
        let filename = format!("{}_{}_{}.csv", layer, range.start, range.end);
        return (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", filename),
                ),
            ],
            series.to_csv(&column),
        )
            .into_response();
    }

    let summary = series.summary();
    Json(TimeSeriesResponse {
        layer,
        series,
        summary,
    })
    .into_response()
}
