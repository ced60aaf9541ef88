//! API error type and its HTTP mapping.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use derive_more::{Display, Error};
use serde_json::json;
use tracing::error;

use crate::accounts::AccountError;
use crate::db::{DbError, StoreError};

/// Error returned by every API handler.
#[derive(Debug, Clone, Display, Error)]
pub enum ApiError {
    /// Missing or malformed input.
    #[display("{_0}")]
    Validation(#[error(not(source))] String),
    /// Unknown session.
    #[display("{_0}")]
    NotFound(#[error(not(source))] String),
    /// Duplicate account.
    #[display("{_0}")]
    Conflict(#[error(not(source))] String),
    /// Login failed.
    #[display("Invalid email or password.")]
    InvalidCredentials,
    /// Persistence or runtime failure. The detail is logged, never returned.
    #[display("{_0}")]
    Internal(#[error(not(source))] String),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidCredentials => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Internal(detail) => {
                error!(detail = %detail, "Request failed");
                "Internal server error.".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::SessionNotFound(id) => Self::NotFound(format!("Session '{}' not found.", id)),
            StoreError::Db(db) => db.into(),
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Validation(msg) => Self::Validation(msg),
            AccountError::Conflict(_) => Self::Conflict("User already exists.".to_string()),
            AccountError::InvalidCredentials => Self::InvalidCredentials,
            AccountError::Hash(msg) => Self::Internal(msg),
            AccountError::Store(db) => db.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(format!("Blocking task failed: {}", err))
    }
}
