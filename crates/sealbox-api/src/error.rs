use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use sealbox_engine::EngineError;

/// Everything a handler can fail with, flattened to a uniform
/// `{"error": message}` body at the response boundary. Internal causes are
/// logged server-side and never reach the client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    /// Unknown email and wrong password collapse into the same message so
    /// the login endpoint cannot be used to enumerate accounts.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not found")]
    NotFound,

    #[error("Email already exists")]
    EmailTaken,

    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Validation(msg) => ApiError::Validation(msg),
            EngineError::Unauthorized => ApiError::Unauthorized,
            EngineError::NotFound => ApiError::NotFound,
            EngineError::Storage(e) => ApiError::Internal(e),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::EmailTaken => StatusCode::CONFLICT,
            ApiError::Internal(cause) => {
                error!("internal error: {:#}", cause);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

pub(crate) fn join_error(err: tokio::task::JoinError) -> ApiError {
    ApiError::Internal(anyhow::anyhow!("spawn_blocking join error: {}", err))
}
