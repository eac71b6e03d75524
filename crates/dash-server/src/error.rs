use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dash_control::RuntimeControlError;
use dash_metrics::CollectionError;
use dash_timeseries::StoreError;
use serde_json::json;
use std::fmt;

/// API 错误类型
#[derive(Debug)]
pub enum ApiError {
    /// 请求错误
    BadRequest(String),
    /// 存储错误
    DatabaseError(String),
    /// 服务暂时不可用（重启队列已满）
    ServiceUnavailable(String),
    /// 内部错误
    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::BadRequest(ref msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::DatabaseError(ref msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            ApiError::ServiceUnavailable(ref msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            ApiError::InternalError(ref msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::DatabaseError(err.to_string())
    }
}

impl From<CollectionError> for ApiError {
    fn from(err: CollectionError) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<RuntimeControlError> for ApiError {
    fn from(err: RuntimeControlError) -> Self {
        match err {
            RuntimeControlError::InvalidId(_) => ApiError::BadRequest(err.to_string()),
            RuntimeControlError::QueueFull | RuntimeControlError::QueueClosed => {
                ApiError::ServiceUnavailable(err.to_string())
            }
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
