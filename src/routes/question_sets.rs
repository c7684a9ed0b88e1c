use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::exam::allocator::BucketFill;
use crate::exam::question_set::generate_question_set;
use crate::extractors::JsonBody;
use crate::response::{created, ok, AppError};
use crate::state::AppState;
use crate::store::operations::question_sets::QuestionSet;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(generate))
        .route("/by-test/:test_id", get(get_by_test))
        .route("/:id", get(get_by_id))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    #[serde(default)]
    mocktest_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    question_set: QuestionSet,
    existing: bool,
    buckets: Vec<BucketFill>,
}

async fn generate(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<GenerateRequest>,
) -> Result<Response, AppError> {
    let outcome = generate_question_set(state.store(), &state.exam().generation, &req.mocktest_id)?;

    let existing = outcome.existing;
    let body = GenerateResponse {
        question_set: outcome.question_set,
        existing,
        buckets: outcome.buckets,
    };
    if existing {
        Ok(ok("Question set already exists", body).into_response())
    } else {
        tracing::info!(
            mocktest_id = %body.question_set.mocktest_id,
            question_count = body.question_set.question_count,
            "question set generated"
        );
        Ok(created("Question set generated", body).into_response())
    }
}

async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let set = state
        .store()
        .get_question_set(&id)?
        .ok_or_else(|| AppError::not_found("QUESTION_SET_NOT_FOUND", "Question set not found"))?;
    Ok(ok("Question set fetched", set))
}

async fn get_by_test(
    State(state): State<AppState>,
    Path(test_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let set = state.store().get_question_set_by_test(&test_id)?.ok_or_else(|| {
        AppError::not_found(
            "QUESTION_SET_NOT_FOUND",
            "No question set has been generated for this test",
        )
    })?;
    Ok(ok("Question set fetched", set))
}
