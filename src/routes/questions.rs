use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;

use crate::exam::selector::{select_next_question, NextQuestion, NextQuestionRequest};
use crate::extractors::JsonBody;
use crate::response::{ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/next", post(next_question))
}

async fn next_question(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<NextQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    // ThreadRng 不是 Send，必须在 await 之前用完
    let selected = {
        let mut rng = rand::thread_rng();
        select_next_question(state.store(), state.exam(), &req, &mut rng)?
    };

    match selected {
        Some(next) => {
            tracing::debug!(
                user_id = %req.user_id,
                question_id = %next.question.id,
                source = ?next.source,
                "next question selected"
            );
            Ok(ok("Question fetched", Some(next)))
        }
        None => Ok(ok("No question available", None::<NextQuestion>)),
    }
}
