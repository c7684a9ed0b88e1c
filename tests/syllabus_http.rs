mod common;

use axum::http::StatusCode;
use chrono::Utc;
use serde_json::json;

use exam_prep_backend::store::operations::chapters::{Chapter, ChapterStatus};

use common::app::spawn_test_app;
use common::fixtures::{seed_chapter, CATEGORY_ID, INSTITUTE_ID};
use common::http::get;

#[tokio::test]
async fn it_syllabus_groups_active_chapters_by_subject() {
    let app = spawn_test_app().await;
    let store = app.store();
    seed_chapter(store, "a-p1", "Physics", "Kinematics", "Kinematics, Vectors");
    seed_chapter(store, "b-c1", "Chemistry", "Bonding", "Ionic Bonds");
    seed_chapter(store, "c-p2", "Physics", "Motion", "vectors, Newton's Laws");
    store
        .upsert_chapter(&Chapter {
            id: "draft".to_string(),
            institute_id: INSTITUTE_ID.to_string(),
            exam_category_id: CATEGORY_ID.to_string(),
            subject: "Physics".to_string(),
            name: "Unpublished".to_string(),
            topics: "Secret".to_string(),
            weightage: None,
            status: ChapterStatus::Draft,
            created_at: Utc::now(),
        })
        .unwrap();

    let reply = get(&app.app, "/api/syllabus").await;
    assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);

    let subjects = reply.body["result"].as_array().unwrap();
    assert_eq!(subjects.len(), 2);
    assert_eq!(subjects[0]["subject"], "Physics");
    assert_eq!(
        subjects[0]["topics"],
        json!(["Kinematics", "Vectors", "Newton's Laws"])
    );
    assert_eq!(subjects[0]["chapters"].as_array().unwrap().len(), 2);
    assert_eq!(subjects[1]["subject"], "Chemistry");
}

#[tokio::test]
async fn it_unknown_category_is_empty_list() {
    let app = spawn_test_app().await;
    seed_chapter(app.store(), "p1", "Physics", "Kinematics", "Kinematics");

    let reply = get(&app.app, "/api/syllabus?examCategoryId=neet").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["result"], json!([]));
}
