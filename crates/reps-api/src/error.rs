use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use thiserror::Error;
use tracing::error;

use reps_types::session::Flash;

/// Flash attached to a response by a handler that had no session at hand.
/// The session layer moves it into the visitor's session.
#[derive(Debug, Clone)]
pub struct PendingFlash(pub Flash);

#[derive(Debug, Error)]
pub enum AppError {
    /// Rejected input. Shown to the visitor, who is sent back to `back`.
    #[error("{message}")]
    Rejected { message: String, back: String },

    #[error("{what} not found")]
    NotFound { what: &'static str, back: String },

    #[error("admin access required")]
    Forbidden,

    #[error("invalid CSRF token")]
    Csrf,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),

    #[error("template error: {0}")]
    Render(#[from] askama::Error),
}

impl AppError {
    pub fn rejected(message: impl Into<String>, back: impl Into<String>) -> Self {
        Self::Rejected { message: message.into(), back: back.into() }
    }

    pub fn not_found(what: &'static str, back: impl Into<String>) -> Self {
        Self::NotFound { what, back: back.into() }
    }
}

/// Redirect carrying a flash message for the next page.
pub fn redirect_with(flash: Flash, to: &str) -> Response {
    let mut response = Redirect::to(to).into_response();
    response.extensions_mut().insert(PendingFlash(flash));
    response
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Rejected { message, back } => redirect_with(Flash::error(message), &back),
            AppError::NotFound { what, back } => {
                redirect_with(Flash::error(format!("{what} not found!")), &back)
            }
            AppError::Forbidden => Redirect::to("/").into_response(),
            AppError::Csrf => redirect_with(Flash::error("Invalid CSRF token, please try again"), "/"),
            AppError::Internal(e) => {
                error!("Request failed: {:#}", e);
                redirect_with(Flash::error("Something went wrong, please try again later"), "/")
            }
            AppError::Render(e) => {
                error!("Template rendering failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}
