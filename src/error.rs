//! HTTP-facing error type.
//!
//! Every handler returns `Result<_, AppError>`; the response body is always
//! `{"error": "<message>"}` and never carries upstream details.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::i18n::MessageFetchError;
use crate::pages::PageNotFound;
use crate::snippets::SnippetError;

/// Errors surfaced to HTTP clients.
///
/// Locale problems never reach here: an unsupported locale is silently
/// replaced by the default before anything is fetched.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing parameters")]
    MissingParameters,

    #[error("File not found")]
    SnippetNotFound,

    #[error(transparent)]
    PageNotFound(#[from] PageNotFound),

    #[error(transparent)]
    MessageFetch(#[from] MessageFetchError),
}

impl From<SnippetError> for AppError {
    fn from(err: SnippetError) -> Self {
        match err {
            SnippetError::MissingParameters => AppError::MissingParameters,
            SnippetError::NotFound { .. } => AppError::SnippetNotFound,
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingParameters => StatusCode::BAD_REQUEST,
            AppError::SnippetNotFound | AppError::PageNotFound(_) => StatusCode::NOT_FOUND,
            AppError::MessageFetch(e) if e.cause.is_upstream() => StatusCode::BAD_GATEWAY,
            // Bundled messages are part of the deployment
            AppError::MessageFetch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message; upstream details stay in the logs
    fn public_message(&self) -> &'static str {
        match self {
            AppError::MissingParameters => "Missing parameters",
            AppError::SnippetNotFound => "File not found",
            AppError::PageNotFound(_) => "Page not found",
            AppError::MessageFetch(_) => "Failed to fetch translations",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::MessageFetch(e) = &self {
            error!("Rendering error page: {}", e);
        }

        let body = Json(json!({ "error": self.public_message() }));
        (self.status(), body).into_response()
    }
}
