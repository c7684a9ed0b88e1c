use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;

use crate::exam::resume::rebuild_learning_resume;
use crate::extractors::JsonBody;
use crate::response::{ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/rebuild", post(rebuild))
        .route("/:user_id", get(get_resume))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RebuildRequest {
    #[serde(default)]
    user_id: String,
}

async fn rebuild(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RebuildRequest>,
) -> Result<impl IntoResponse, AppError> {
    let summary = rebuild_learning_resume(state.store(), &state.exam().mastery, &req.user_id)?;
    tracing::info!(
        user_id = %summary.user_id,
        responses = summary.responses_read,
        chapters = summary.updated.len(),
        "learning resume rebuilt"
    );
    Ok(ok("Learning resume updated", summary))
}

async fn get_resume(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let rows = state.store().list_learning_resumes(&user_id)?;
    Ok(ok("Learning resume fetched", rows))
}
