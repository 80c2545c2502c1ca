pub mod health;

use std::any::Any;

use axum::{
    extract::{DefaultBodyLimit, Request},
    http::header::CONTENT_LENGTH,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tracing::warn;

use crate::errors::{AppError, PageError};
use crate::flow::handlers;
use crate::render::page_script;
use crate::state::AppState;

/// Largest request body accepted anywhere in the app.
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Rejects requests whose declared length is over the limit before any handler runs.
/// Bodies without a declared length are capped by `DefaultBodyLimit` while streaming.
async fn reject_oversized(request: Request, next: Next) -> Response {
    let declared = request
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok());

    if let Some(length) = declared.filter(|&length| length > MAX_UPLOAD_BYTES) {
        warn!("Rejected {} {} with a {length} byte body", request.method(), request.uri());
        return PageError(AppError::PayloadTooLarge).into_response();
    }
    next.run(request).await
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    PageError(AppError::Internal(anyhow::anyhow!("handler panicked: {detail}"))).into_response()
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/static/script.js", get(page_script))
        // Wizard: upload → job → chat
        .route(
            "/",
            get(handlers::upload_page).post(handlers::handle_upload_form),
        )
        .route("/upload", post(handlers::handle_upload))
        .route("/job", get(handlers::job_page).post(handlers::handle_job))
        .route("/chat", get(handlers::chat_page).post(handlers::handle_chat))
        .route("/reset_job", get(handlers::handle_reset_job))
        .route("/reset", get(handlers::handle_reset))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(middleware::from_fn(reject_oversized))
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}
