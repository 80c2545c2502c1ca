use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use minijinja::context;
use serde_json::json;
use thiserror::Error;

use crate::render::{render_page, Page};

pub const TOO_LARGE_MESSAGE: &str = "File too large. Please upload a file smaller than 16MB.";
pub const SERVER_ERROR_MESSAGE: &str = "Server error. Please try again later.";
pub const UPLOAD_FAILED_MESSAGE: &str = "Error processing the uploaded file. Please try again.";

/// Application-level error type.
/// Implements `IntoResponse` so JSON handlers can return `Result<T, AppError>`;
/// the body is `{"error": "<message>"}` and never carries internal detail.
/// `PayloadTooLarge` is the exception: every route answers it with the upload page.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payload too large")]
    PayloadTooLarge,

    #[error("Upload processing error: {0}")]
    Upload(anyhow::Error),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::PayloadTooLarge => {
                (StatusCode::PAYLOAD_TOO_LARGE, TOO_LARGE_MESSAGE.to_string())
            }
            AppError::Upload(e) => {
                tracing::error!("Error processing file: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    UPLOAD_FAILED_MESSAGE.to_string(),
                )
            }
            AppError::Template(e) => {
                tracing::error!("Template error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    SERVER_ERROR_MESSAGE.to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    SERVER_ERROR_MESSAGE.to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(self, AppError::PayloadTooLarge) {
            return PageError(self).into_response();
        }
        let (status, message) = self.status_and_message();
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Error for HTML endpoints: renders the upload page with a generic message.
#[derive(Debug)]
pub struct PageError(pub AppError);

impl From<AppError> for PageError {
    fn from(err: AppError) -> Self {
        PageError(err)
    }
}

impl From<anyhow::Error> for PageError {
    fn from(err: anyhow::Error) -> Self {
        PageError(AppError::Internal(err))
    }
}

impl From<minijinja::Error> for PageError {
    fn from(err: minijinja::Error) -> Self {
        PageError(AppError::Template(err))
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let (status, message) = self.0.status_and_message();
        match render_page(Page::Upload, context! { error => message }) {
            Ok(html) => (status, html).into_response(),
            Err(e) => {
                tracing::error!("Failed to render error page: {e}");
                (status, message).into_response()
            }
        }
    }
}
