use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::response::{ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/:user_id/progress", get(get_progress))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProgressView {
    user_id: String,
    xp: u64,
    xp_spent: u64,
    xp_earned_this_week: u64,
    level: u32,
    last_xp_update_at: Option<DateTime<Utc>>,
}

async fn get_progress(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .store()
        .get_user_by_id(&user_id)?
        .ok_or_else(|| AppError::not_found("USER_NOT_FOUND", "User not found"))?;

    let p = user.progression;
    Ok(ok(
        "Progress fetched",
        ProgressView {
            user_id: user.id,
            xp: p.xp,
            xp_spent: p.xp_spent,
            xp_earned_this_week: p.xp_earned_this_week,
            level: p.level,
            last_xp_update_at: p.last_xp_update_at,
        },
    ))
}
