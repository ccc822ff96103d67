//! Error taxonomy shared by the services and the HTTP surface.
//!
//! Every failure carries a stable machine-readable kind plus a human
//! message; responses are `{"message": ..., "errorKind": ...}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::domain::aggregates::OrderError;
use crate::repository::RepositoryError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    InvalidState(String),
    #[error("quantity must be greater than zero")]
    InvalidQuantity,
    #[error("{0}")]
    Validation(String),
    #[error("storage failure: {0}")]
    Storage(#[source] RepositoryError),
}

impl Error {
    pub fn not_found(msg: impl Into<String>) -> Self { Self::NotFound(msg.into()) }
    pub fn forbidden(msg: impl Into<String>) -> Self { Self::Forbidden(msg.into()) }
    pub fn unauthorized(msg: impl Into<String>) -> Self { Self::Unauthorized(msg.into()) }
    pub fn validation(msg: impl Into<String>) -> Self { Self::Validation(msg.into()) }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Forbidden(_) => "forbidden",
            Self::Unauthorized(_) => "unauthorized",
            Self::InvalidState(_) => "invalid_state",
            Self::InvalidQuantity => "invalid_quantity",
            Self::Validation(_) => "validation",
            Self::Storage(_) => "storage_failure",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidState(_) => StatusCode::CONFLICT,
            Self::InvalidQuantity | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<OrderError> for Error {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::AlreadyCompleted => Self::InvalidState(err.to_string()),
            OrderError::InvalidQuantity => Self::InvalidQuantity,
            OrderError::ItemNotFound => Self::NotFound("Item not found in the order".into()),
        }
    }
}

impl From<RepositoryError> for Error {
    fn from(err: RepositoryError) -> Self { Self::Storage(err) }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self { Self::Validation(err.to_string()) }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, kind = self.kind(), "request failed");
        }
        let body = serde_json::json!({ "message": self.to_string(), "errorKind": self.kind() });
        (status, Json(body)).into_response()
    }
}
