//! In-process calls against the API router.

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::util::ServiceExt;

/// Status, headers and decoded JSON envelope of one call. Empty bodies decode to `null`.
#[derive(Debug)]
pub struct ApiReply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl ApiReply {
    /// Checks the failure envelope `{success:false, code, message, traceId}`.
    pub fn assert_failure(&self, status: StatusCode, code: &str) {
        assert_eq!(self.status, status, "{}", self.body);
        assert_eq!(self.body["success"], false);
        assert_eq!(self.body["code"], code);
        assert!(self.body["message"].is_string());
        assert!(self.body["traceId"].is_string());
    }
}

pub async fn get(app: &Router, path: &str) -> ApiReply {
    call(app, Method::GET, path, None).await
}

pub async fn post_json(app: &Router, path: &str, payload: Value) -> ApiReply {
    call(app, Method::POST, path, Some(payload)).await
}

pub async fn call(app: &Router, method: Method, path: &str, payload: Option<Value>) -> ApiReply {
    let builder = Request::builder().method(method).uri(path);
    let request = match payload {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("build request");

    let response = app.clone().oneshot(request).await.expect("router call");
    let status = response.status();
    let headers = response.headers().clone();
    let raw = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("collect body");
    let body = if raw.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&raw).expect("JSON body")
    };

    ApiReply {
        status,
        headers,
        body,
    }
}
