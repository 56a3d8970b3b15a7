use crate::errors::error::AppError;
use crate::log_warn;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// 统一响应体：code 为 0 表示成功，失败时为 HTTP 状态码
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub code: u16,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            code: 0,
            message: "success".to_string(),
            data: Some(data),
        })
    }
}

pub fn error_response(status: StatusCode, message: String) -> Response {
    let body = ApiResponse::<()> {
        code: status.as_u16(),
        message,
        data: None,
    };
    (status, Json(body)).into_response()
}

pub fn status_of(err: &AppError) -> StatusCode {
    if err.is_input_error() {
        return StatusCode::BAD_REQUEST;
    }
    match err {
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        AppError::Conflict(_) => StatusCode::CONFLICT,
        AppError::ProviderError(_) | AppError::InvalidUrl(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = status_of(&self);
        if status.is_server_error() {
            log_warn!("请求处理失败 ({}): {}", status, self);
        }
        error_response(status, self.to_string())
    }
}
