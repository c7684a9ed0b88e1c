use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health_check))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
        .route("/database", get(database_health))
}

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let healthy = probe_store(&state).is_ok();
    Json(serde_json::json!({
        "status": if healthy { "ok" } else { "degraded" },
        "uptimeSecs": state.uptime_secs(),
        "store": {
            "healthy": healthy,
        }
    }))
}

pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    if probe_store(&state).is_ok() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

pub async fn database_health(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let probe = probe_store(&state);
    let latency_us = start.elapsed().as_micros() as u64;

    let status = if probe.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(serde_json::json!({
            "healthy": probe.is_ok(),
            "latencyUs": latency_us,
            "questionCount": probe.as_ref().ok(),
            "error": probe.err(),
        })),
    )
}

// 读一次用户树 + 统计题库，任一失败即视为不健康
fn probe_store(state: &AppState) -> Result<usize, String> {
    let store = state.store();
    store
        .get_user_by_id("health-check")
        .map_err(|e| e.to_string())?;
    Ok(store.count_questions())
}
