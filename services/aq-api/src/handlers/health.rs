//! Health handlers.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// GET /health — liveness probe.
pub async fn health_handler() -> Response {
    Json(json!({ "status": "ok" })).into_response()
}
