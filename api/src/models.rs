use axum::http::StatusCode;
use axum::Json;
use common::services::ServiceError;
use serde::Serialize;

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    pub data: Option<T>,
    pub timestamp: i64,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: 200,
            message: "Success".to_string(),
            data: Some(data),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn error(code: i32, message: String) -> Self {
        Self {
            code,
            message,
            data: None,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

pub type ApiError = (StatusCode, Json<ApiResponse<serde_json::Value>>);

pub fn error_response(code: i32, message: impl Into<String>) -> ApiError {
    let status = u16::try_from(code)
        .ok()
        .and_then(|c| StatusCode::from_u16(c).ok())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ApiResponse::error(code, message.into())))
}

pub fn service_error(err: ServiceError) -> ApiError {
    let (status, mut body) = error_response(err.code, err.message);
    body.0.data = err.data;
    (status, body)
}
