//! Webhook endpoint handlers.
//!
//! The webhook handler:
//! 1. Verifies `x-line-signature` over the raw body
//! 2. Decodes the event batch
//! 3. Dispatches events to the notification rule
//! 4. Returns 200 once the batch has been processed

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::line::{LineClient, Messenger, PayloadError, WebhookPayload};
use crate::notify::{dispatch, NotificationRule};
use crate::web::signature::{verify_line_signature, SIGNATURE_HEADER};
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState<M = LineClient> {
    pub config: Arc<Config>,
    pub rule: Arc<NotificationRule>,
    pub messenger: M,
}

impl<M> AppState<M> {
    pub fn new(config: Config, messenger: M) -> Self {
        let rule = NotificationRule::from_config(&config);
        Self {
            config: Arc::new(config),
            rule: Arc::new(rule),
            messenger,
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check endpoint.
pub async fn health() -> &'static str {
    "ok"
}

// =============================================================================
// LINE Webhook
// =============================================================================

/// Webhook response.
#[derive(Serialize)]
pub struct WebhookResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pushed: Option<usize>,
}

impl WebhookResponse {
    fn status(status: &'static str) -> Json<Self> {
        Json(Self {
            status,
            pushed: None,
        })
    }
}

/// LINE webhook endpoint.
///
/// The body is taken as raw bytes so the signature is checked against
/// exactly what LINE sent.
pub async fn line_webhook<M>(
    State(state): State<AppState<M>>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse
where
    M: Messenger + Clone + 'static,
{
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    info!(
        body_length = body.len(),
        has_signature = signature.is_some(),
        "webhook_received"
    );

    if !verify_line_signature(&state.config.channel_secret, &body, signature) {
        warn!("webhook_signature_invalid");
        return (
            StatusCode::UNAUTHORIZED,
            WebhookResponse::status("invalid_signature"),
        );
    }

    let value: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "webhook_body_not_json");
            return (
                StatusCode::BAD_REQUEST,
                WebhookResponse::status("invalid_payload"),
            );
        }
    };

    let payload = match WebhookPayload::from_value(value) {
        Ok(p) => p,
        Err(PayloadError::NotAnObject) => {
            warn!("webhook_body_not_object");
            return (
                StatusCode::BAD_REQUEST,
                WebhookResponse::status("invalid_payload"),
            );
        }
        Err(e) => {
            error!(error = %e, "webhook_processing_error");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                WebhookResponse::status("error"),
            );
        }
    };

    info!(
        destination = ?payload.destination,
        events = payload.events.len(),
        skipped = payload.skipped,
        "webhook_payload_decoded"
    );

    let summary = dispatch(&payload.events, &state.rule, &state.messenger).await;

    (
        StatusCode::OK,
        Json(WebhookResponse {
            status: "ok",
            pushed: Some(summary.pushed),
        }),
    )
}
