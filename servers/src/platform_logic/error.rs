use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use lib_platform::store::StoreError;

/// Request-level error type. Every failure is answered with a JSON body
/// and a mapped status code; nothing propagates past the handler.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not signed in")]
    Unauthorized,

    #[error("forbidden: {0}")]
    Forbidden(&'static str),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_json) = match &self {
            AppError::Store(StoreError::NotFound(what)) => (
                StatusCode::NOT_FOUND,
                json!({
                    "error_type": "NotFound",
                    "message": format!("{} not found", what),
                }),
            ),
            AppError::Store(StoreError::Db(e)) => {
                error!("Database error: {:?}", e);
                if let Some(db_err) = e.as_db_error() {
                    let code = db_err.code().code();
                    // Class 23: Integrity Constraint Violation
                    // Class 42: Syntax Error or Access Rule Violation
                    // Class 22: Data Exception
                    let http_status = match code {
                        _ if code.starts_with("23") => StatusCode::CONFLICT,
                        _ if code.starts_with("42") || code.starts_with("22") => {
                            StatusCode::BAD_REQUEST
                        }
                        _ => StatusCode::INTERNAL_SERVER_ERROR,
                    };
                    (
                        http_status,
                        json!({
                            "error_type": "DatabaseError",
                            "message": db_err.message(),
                            "pg_code": code,
                        }),
                    )
                } else {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        json!({
                            "error_type": "DatabaseClientError",
                            "message": "Error communicating with the database.",
                            "detail": e.to_string(),
                        }),
                    )
                }
            }
            AppError::Store(StoreError::Pool(e)) => {
                error!("Database pool error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error_type": "DatabasePoolError",
                        "message": "Failed to get connection from pool. The database might be unavailable.",
                    }),
                )
            }
            AppError::Store(e) => {
                error!("Store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error_type": "StoreError",
                        "message": e.to_string(),
                    }),
                )
            }
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error_type": "BadRequest",
                    "message": msg,
                }),
            ),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({
                    "error_type": "Unauthorized",
                    "message": "Sign in first.",
                }),
            ),
            AppError::Forbidden(msg) => (
                StatusCode::FORBIDDEN,
                json!({
                    "error_type": "Forbidden",
                    "message": msg,
                }),
            ),
        };
        (status, Json(error_json)).into_response()
    }
}
