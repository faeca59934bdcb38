//! Error types and error handling

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

/// Application error type
///
/// Handlers return `Result<_, TaxiError>`; the [`IntoResponse`] impl picks
/// the status code and keeps internal details out of the response body.
#[derive(Debug, Error)]
pub enum TaxiError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Bad request error
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Server error
    #[error("Server error: {0}")]
    ServerError(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Template rendering error
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// Password hashing error
    #[error("Password error: {0}")]
    Password(#[from] crate::auth::PasswordError),

    /// Session error
    #[error("Session error: {0}")]
    Session(#[from] crate::auth::SessionError),

    /// Unauthorized (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Forbidden (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Not Found (404)
    #[error("Not found: {0}")]
    NotFound(String),
}

impl TaxiError {
    /// Not-found error for a model row
    #[must_use]
    pub fn not_found(resource: &str, id: i64) -> Self {
        Self::NotFound(format!("{resource} {id}"))
    }

    /// HTTP status this error maps to
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Config(_)
            | Self::ServerError(_)
            | Self::Database(_)
            | Self::Migration(_)
            | Self::Template(_)
            | Self::Password(_)
            | Self::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for TaxiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "Something went wrong on our side.".to_string()
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
            self.to_string()
        };

        let title = status.canonical_reason().unwrap_or("Error");
        let body = format!(
            "<!DOCTYPE html><html><head><title>{title}</title></head>\
             <body><h1>{code} {title}</h1><p>{message}</p>\
             <p><a href=\"/\">Home</a></p></body></html>",
            code = status.as_u16(),
            message = escape_html(&message),
        );

        (status, Html(body)).into_response()
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
