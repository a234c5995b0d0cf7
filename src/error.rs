use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoungeError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type LoungeResult<T> = Result<T, LoungeError>;

impl IntoResponse for LoungeError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            LoungeError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred.".to_string(),
                )
            }
            LoungeError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg),
            LoungeError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            LoungeError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            LoungeError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            LoungeError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred.".to_string(),
                )
            }
            LoungeError::Io(ref e) => {
                tracing::error!("IO error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A filesystem error occurred.".to_string(),
                )
            }
            _ => {
                tracing::error!("Unhandled error: {:?}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unknown error occurred.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
