pub mod health;
pub mod learning_resume;
pub mod question_sets;
pub mod questions;
pub mod responses;
pub mod syllabus;
pub mod users;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Json, Router};

use crate::constants::MAX_BODY_BYTES;
use crate::middleware::{rate_limit, request_id};
use crate::response::ErrorBody;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .nest("/question-sets", question_sets::router())
        .nest("/questions", questions::router())
        .nest("/responses", responses::router())
        .nest("/learning-resume", learning_resume::router())
        .nest("/users", users::router())
        .nest("/syllabus", syllabus::router())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit::rate_limit_middleware,
        ))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    Router::new()
        .nest("/api", api_routes)
        .nest("/health", health::router())
        .fallback(fallback_404)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .with_state(state)
}

async fn fallback_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            success: false,
            code: "NOT_FOUND".to_string(),
            message: "Not found".to_string(),
            trace_id: None,
        }),
    )
}
