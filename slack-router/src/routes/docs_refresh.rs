use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;
use tracing::info;

use crate::{api_state::ApiState, error::ApiError};

/// Rebuilds the documentation cache on demand.
pub async fn refresh_docs(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let summary = state.cache().refresh().await?;
    info!(
        documents = summary.documents,
        paragraphs = summary.paragraphs,
        "Manual documentation refresh finished"
    );

    Ok(Json(json!({
        "status": "ok",
        "documents": summary.documents,
        "paragraphs": summary.paragraphs,
    })))
}
