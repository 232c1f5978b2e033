//! Mapping of domain and application errors onto JSON responses.
//!
//! Every error body has the shape `{"error": "<snake_code>", "message": "..."}`.
//! Server-side failures are logged in full and answered with a generic message.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;
use tranche_core::LedgerError;
use tranche_shared::AppError;

/// Error returned by handlers.
#[derive(Debug)]
pub enum ApiError {
    /// Failure reported by the ledger engine.
    Ledger(LedgerError),
    /// Request or application failure outside the ledger.
    App(AppError),
}

impl ApiError {
    /// Shorthand for a 400 with a message.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::App(AppError::Validation(message.into()))
    }

    /// Returns the HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        let code = match self {
            Self::Ledger(e) => e.http_status_code(),
            Self::App(e) => e.status_code(),
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Returns the snake-case error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Ledger(e) => e.error_code(),
            Self::App(e) => e.error_code(),
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self::Ledger(err)
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            match &self {
                Self::Ledger(e) => error!(error = %e, code = e.error_code(), "Request failed"),
                Self::App(e) => error!(error = %e, code = e.error_code(), "Request failed"),
            }
            "An error occurred".to_string()
        } else {
            match &self {
                Self::Ledger(e) => e.to_string(),
                Self::App(AppError::Validation(msg) | AppError::NotFound(msg)) => msg.clone(),
                Self::App(e) => e.to_string(),
            }
        };

        (
            status,
            Json(json!({
                "error": self.code(),
                "message": message
            })),
        )
            .into_response()
    }
}
