//! API error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use crewdesk_auth::AuthError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Auth(#[from] AuthError),

    /// An auth failure with extra detail, attached only in dev mode.
    #[error("{source}")]
    AuthDetail { source: AuthError, detail: String },

    #[error("Database error: {0}")]
    Database(#[from] crewdesk_db::DbError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, detail) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), None)
            }
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone(), None),
            ApiError::Unavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "UNAVAILABLE",
                msg.clone(),
                None,
            ),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg.clone(),
                None,
            ),
            ApiError::Auth(e) => (e.status(), e.code(), e.to_string(), None),
            ApiError::AuthDetail { source, detail } => (
                source.status(),
                source.code(),
                source.to_string(),
                Some(detail.clone()),
            ),
            ApiError::Database(e) => match e {
                crewdesk_db::DbError::NotFound(msg) => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None)
                }
                crewdesk_db::DbError::Duplicate(msg) => {
                    (StatusCode::BAD_REQUEST, "DUPLICATE", msg.clone(), None)
                }
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    e.to_string(),
                    None,
                ),
            },
        };

        let body = match detail {
            Some(detail) => axum::Json(json!({
                "error": code,
                "message": message,
                "details": detail,
            })),
            None => axum::Json(json!({
                "error": code,
                "message": message,
            })),
        };

        (status, body).into_response()
    }
}
