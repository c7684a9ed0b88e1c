use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

use crate::exam::syllabus::group_by_subject;
use crate::response::{ok, AppError};
use crate::state::AppState;
use crate::store::operations::chapters::ChapterStatus;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_syllabus))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SyllabusQuery {
    exam_category_id: Option<String>,
    institute_id: Option<String>,
}

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

async fn list_syllabus(
    State(state): State<AppState>,
    Query(q): Query<SyllabusQuery>,
) -> Result<impl IntoResponse, AppError> {
    let catalogue = &state.config().catalogue;
    let category = or_default(q.exam_category_id, &catalogue.default_exam_category_id);
    let institute = or_default(q.institute_id, &catalogue.default_institute_id);

    let chapters: Vec<_> = state
        .store()
        .list_chapters_by_exam_category(
            &category,
            ChapterStatus::Active,
            state.exam().generation.chapter_fetch_limit,
        )?
        .into_iter()
        .filter(|c| c.institute_id == institute)
        .collect();
    tracing::debug!(%category, %institute, chapters = chapters.len(), "syllabus listed");
    Ok(ok("Syllabus fetched", group_by_subject(&chapters)))
}
