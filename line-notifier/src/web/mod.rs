//! Web server module for handling LINE webhooks.
//!
//! This module provides:
//! - `GET /` health check
//! - `POST /webhook` signature-verified event intake

pub mod handlers;
pub mod signature;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::line::Messenger;

pub use handlers::{health, line_webhook, AppState, WebhookResponse};
pub use signature::{compute_line_signature, verify_line_signature, SIGNATURE_HEADER};

/// Build the application router.
pub fn router<M>(state: AppState<M>) -> Router
where
    M: Messenger + Clone + 'static,
{
    Router::new()
        .route("/", get(health))
        .route("/webhook", post(line_webhook::<M>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
