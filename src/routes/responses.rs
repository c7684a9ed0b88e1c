use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_RESPONSE_PAGE_SIZE, MAX_RESPONSE_PAGE_SIZE};
use crate::exam::types::Difficulty;
use crate::exam::xp::award_after_submit;
use crate::extractors::JsonBody;
use crate::response::{created, ok, AppError};
use crate::state::AppState;
use crate::store::operations::responses::AnswerResponse;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(submit_response))
        .route("/:user_id", get(list_responses))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponseRequest {
    #[serde(default)]
    user_id: String,
    #[serde(default)]
    question_id: String,
    exam_category_id: Option<String>,
    subject: Option<String>,
    chapter: Option<String>,
    topics: Option<String>,
    difficulty: Option<Difficulty>,
    #[serde(default)]
    time_spent_secs: f64,
    #[serde(default)]
    is_correct: bool,
    #[serde(default)]
    is_skipped: bool,
    #[serde(default)]
    skip_count: u32,
    #[serde(default)]
    is_reattempt: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponseResult {
    response: AnswerResponse,
    xp_awarded: u64,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

async fn submit_response(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<SubmitResponseRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = req.user_id.trim();
    if user_id.is_empty() {
        return Err(AppError::bad_request("MISSING_INPUT", "userId is required"));
    }
    let question_id = req.question_id.trim();
    if question_id.is_empty() {
        return Err(AppError::bad_request("MISSING_INPUT", "questionId is required"));
    }
    if !req.time_spent_secs.is_finite() || req.time_spent_secs < 0.0 {
        return Err(AppError::bad_request(
            "VALIDATION_ERROR",
            "timeSpentSecs must be a non-negative number",
        ));
    }

    let store = state.store();
    if store.get_user_by_id(user_id)?.is_none() {
        return Err(AppError::not_found("USER_NOT_FOUND", "User not found"));
    }
    let question = store
        .get_question(question_id)?
        .ok_or_else(|| AppError::not_found("QUESTION_NOT_FOUND", "Question not found"))?;

    let response = AnswerResponse {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        question_id: question.id.clone(),
        exam_category_id: non_blank(req.exam_category_id),
        subject: non_blank(req.subject).unwrap_or_else(|| question.subject.clone()),
        chapter: non_blank(req.chapter).unwrap_or_default(),
        topics: non_blank(req.topics).unwrap_or_else(|| question.topics.join(",")),
        difficulty: req.difficulty.unwrap_or(question.difficulty),
        time_spent_secs: req.time_spent_secs,
        // 跳过的题不可能同时答对
        is_correct: req.is_correct && !req.is_skipped,
        is_skipped: req.is_skipped,
        skip_count: req.skip_count,
        is_reattempt: req.is_reattempt,
        created_at: Utc::now(),
    };
    store.create_response(&response)?;

    // 作答已落库，奖励失败只记日志
    let xp_awarded = award_after_submit(store, &state.exam().xp, &response);
    tracing::info!(
        user_id = %response.user_id,
        question_id = %response.question_id,
        is_correct = response.is_correct,
        xp_awarded,
        "response recorded"
    );

    Ok(created(
        "Response recorded",
        SubmitResponseResult {
            response,
            xp_awarded,
        },
    ))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    limit: Option<usize>,
}

async fn list_responses(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(q): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let limit = q
        .limit
        .unwrap_or(DEFAULT_RESPONSE_PAGE_SIZE)
        .clamp(1, MAX_RESPONSE_PAGE_SIZE);
    let responses = state.store().list_user_responses(&user_id, limit)?;
    Ok(ok("Responses fetched", responses))
}
