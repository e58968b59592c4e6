//! Multi-layer analysis handler.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use aq_common::LayerId;
use aq_pipeline::{run_analysis, AnalysisRequest, LayerAnalysis};

use crate::handlers::{error_response, WindowParams};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalysisParams {
    /// Comma-separated layer ids. Defaults to every registered layer.
    pub layers: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Per-layer entry of the analysis response. Failed layers are reported in
/// place so successes render alongside them.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum LayerReport {
    Ok(Box<LayerAnalysis>),
    Failed {
        layer: LayerId,
        error: String,
        retryable: bool,
    },
}

/// GET /analysis — run the pipeline for each requested layer
/// independently. One layer's backend failure never aborts the others.
pub async fn analysis_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<AnalysisParams>,
) -> Response {
    let layers = match parse_layers(params.layers.as_deref()) {
        Ok(layers) => layers,
        Err(err) => return error_response(&err),
    };
    let window = WindowParams {
        start: params.start,
        end: params.end,
        f: None,
    };
    let range = match window.resolve_range() {
        Ok(range) => range,
        Err(err) => return error_response(&err),
    };

    let request = AnalysisRequest {
        layers,
        range,
        region: state.config.region,
    };

    let outcomes = run_analysis(state.service.as_ref(), &request).await;
    let reports: Vec<LayerReport> = outcomes
        .into_iter()
        .map(|outcome| match outcome.result {
            Ok(analysis) => LayerReport::Ok(Box::new(analysis)),
            Err(err) => LayerReport::Failed {
                layer: outcome.layer,
                error: err.to_string(),
                retryable: err.is_retryable(),
            },
        })
        .collect();

    Json(reports).into_response()
}

fn parse_layers(spec: Option<&str>) -> aq_common::AqResult<Vec<LayerId>> {
    match spec {
        None => Ok(LayerId::all().to_vec()),
        Some(s) => s
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(LayerId::parse)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_layers_default_is_all() {
        assert_eq!(parse_layers(None).unwrap(), LayerId::all().to_vec());
    }

    #[test]
    fn test_parse_layers_list() {
        let layers = parse_layers(Some("aod, no2")).unwrap();
        assert_eq!(layers, vec![LayerId::Aod, LayerId::No2]);
    }

    #[test]
    fn test_parse_layers_unknown() {
        assert!(parse_layers(Some("aod,pm10")).is_err());
    }
}
