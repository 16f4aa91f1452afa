use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::api_state::ApiState;

/// Readiness probe: 200 once the documentation cache has been populated, else 503.
pub async fn ready(State(state): State<ApiState>) -> impl IntoResponse {
    let snapshot = state.cache().snapshot().await;
    let counts = json!({
        "documents": snapshot.documents().len(),
        "paragraphs": snapshot.paragraphs().len(),
        "refreshed_at": snapshot.refreshed_at().map(|at| at.to_rfc3339()),
    });

    if snapshot.is_populated() {
        (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "checks": { "docs_cache": "ok" },
                "cache": counts
            })),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "error",
                "checks": { "docs_cache": "empty" },
                "cache": counts
            })),
        )
    }
}
