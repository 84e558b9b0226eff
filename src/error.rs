use std::{error::Error, fmt::Display};

use axum::response::IntoResponse;
use axum::Json;
use http::StatusCode;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub enum AppError {
    Storage(String),
    Fetch(String),
    Validation(String),
}

pub type Result<T> = core::result::Result<T, AppError>;

impl Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Storage(msg) => write!(f, "storage error: {msg}"),
            AppError::Fetch(msg) => write!(f, "fetch error: {msg}"),
            AppError::Validation(msg) => write!(f, "validation error: {msg}"),
        }
    }
}

impl Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(value: sqlx::Error) -> Self {
        Self::Storage(value.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(value: sqlx::migrate::MigrateError) -> Self {
        Self::Storage(value.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(value: reqwest::Error) -> Self {
        Self::Fetch(value.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Fetch(value.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let code = match &self {
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Fetch(_) => StatusCode::BAD_GATEWAY,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
        };
        let body = serde_json::json!({
            "status": "error",
            "message": self.to_string(),
        });
        (code, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_context() {
        let err = AppError::Fetch("unexpected status 503".to_string());
        assert_eq!(err.to_string(), "fetch error: unexpected status 503");
    }
}
