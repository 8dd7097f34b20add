use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::registry::RegistryError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Session store error: {0}")]
    Session(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Message safe to show a caller. Server-side detail stays in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::NotFound(msg) | AppError::Validation(msg) | AppError::RateLimited(msg) => {
                msg.clone()
            }
            AppError::Llm(_) => "AI 매칭 처리 중 오류가 발생했습니다.".to_string(),
            AppError::Registry(_) => "지원사업 데이터 조회 중 오류가 발생했습니다.".to_string(),
            AppError::Session(_) => "세션 처리 중 오류가 발생했습니다.".to_string(),
            AppError::Snapshot(_) => "지원사업 데이터 저장 중 오류가 발생했습니다.".to_string(),
            AppError::Internal(_) => "처리 중 오류가 발생했습니다.".to_string(),
        }
    }

    /// HTTP status and the stable machine-readable code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::Llm(_) => (StatusCode::BAD_GATEWAY, "LLM_ERROR"),
            AppError::Registry(_) => (StatusCode::BAD_GATEWAY, "REGISTRY_ERROR"),
            AppError::Session(_) => (StatusCode::INTERNAL_SERVER_ERROR, "SESSION_ERROR"),
            AppError::Snapshot(_) => (StatusCode::INTERNAL_SERVER_ERROR, "SNAPSHOT_ERROR"),
            AppError::RateLimited(_) => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        match &self {
            AppError::Llm(e) => tracing::error!("LLM error: {e}"),
            AppError::Registry(e) => tracing::error!("Registry error: {e}"),
            AppError::Session(msg) => tracing::error!("Session store error: {msg}"),
            AppError::Snapshot(msg) => tracing::error!("Snapshot error: {msg}"),
            AppError::Internal(e) => tracing::error!("Internal error: {e:?}"),
            _ => {}
        }

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.public_message()
            }
        }));

        (status, body).into_response()
    }
}
