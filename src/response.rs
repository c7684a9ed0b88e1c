use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::exam::ExamError;
use crate::store::StoreError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub result: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub success: bool,
    pub code: String,
    pub message: String,
    pub trace_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub is_operational: bool,
}

impl AppError {
    pub fn bad_request(code: &str, message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: code.to_string(),
            message: message.to_string(),
            is_operational: true,
        }
    }

    pub fn not_found(code: &str, message: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: code.to_string(),
            message: message.to_string(),
            is_operational: true,
        }
    }

    pub fn conflict(code: &str, message: &str) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            code: code.to_string(),
            message: message.to_string(),
            is_operational: true,
        }
    }

    pub fn too_many_requests(message: &str) -> Self {
        Self {
            status: StatusCode::TOO_MANY_REQUESTS,
            code: "RATE_LIMITED".to_string(),
            message: message.to_string(),
            is_operational: true,
        }
    }

    pub fn internal(message: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_ERROR".to_string(),
            message: message.to_string(),
            is_operational: false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // 内部错误同样返回原始消息，便于调用方排查；只在日志级别上区分
        if self.is_operational {
            tracing::warn!(status = %self.status, code = %self.code, error = %self.message, "API error");
        } else {
            tracing::error!(status = %self.status, code = %self.code, error = %self.message, "Internal API error");
        }

        (
            self.status,
            Json(ErrorBody {
                success: false,
                code: self.code,
                message: self.message,
                trace_id: None,
            }),
        )
            .into_response()
    }
}

// StoreError 映射：
// - Validation -> 400
// - NotFound -> 404
// - Conflict -> 409
// - 其他 -> 500
impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        match &value {
            StoreError::Validation(msg) => AppError::bad_request("VALIDATION_ERROR", msg),
            StoreError::NotFound { .. } => AppError::not_found("NOT_FOUND", &value.to_string()),
            StoreError::Conflict { .. } => AppError::conflict("CONFLICT", &value.to_string()),
            _ => AppError::internal(&value.to_string()),
        }
    }
}

impl From<ExamError> for AppError {
    fn from(value: ExamError) -> Self {
        let message = value.to_string();
        match value {
            ExamError::MissingInput { .. }
            | ExamError::NoGenerationRules(_)
            | ExamError::NoTopicsResolved
            | ExamError::NoQuestionsMatched
            | ExamError::NoQuestionsSelected => AppError::bad_request(value.code(), &message),
            ExamError::TestNotFound(_)
            | ExamError::InstituteNotFound(_)
            | ExamError::UserNotFound(_)
            | ExamError::QuestionNotFound(_) => AppError::not_found(value.code(), &message),
            ExamError::Store(store_error) => store_error.into(),
        }
    }
}

pub fn ok<T: Serialize>(message: &str, result: T) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ApiResponse {
            success: true,
            message: message.to_string(),
            result,
        }),
    )
}

pub fn created<T: Serialize>(message: &str, result: T) -> impl IntoResponse {
    (
        StatusCode::CREATED,
        Json(ApiResponse {
            success: true,
            message: message.to_string(),
            result,
        }),
    )
}
