mod common;

use axum::http::StatusCode;

use common::app::spawn_test_server_with_limit;
use common::http::get;

#[tokio::test]
async fn it_rate_limit_triggers_429_with_headers() {
    let app = spawn_test_server_with_limit(3).await;

    for _ in 0..3 {
        assert_eq!(get(&app.app, "/api/syllabus").await.status, StatusCode::OK);
    }
    let limited = get(&app.app, "/api/syllabus").await;
    limited.assert_failure(StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED");
    for name in [
        "retry-after",
        "ratelimit-limit",
        "ratelimit-remaining",
        "ratelimit-reset",
    ] {
        assert!(limited.headers.get(name).is_some(), "missing {name}");
    }
}

#[tokio::test]
async fn it_health_is_not_rate_limited() {
    let app = spawn_test_server_with_limit(1).await;

    for _ in 0..3 {
        assert_eq!(get(&app.app, "/health/live").await.status, StatusCode::OK);
    }
}
