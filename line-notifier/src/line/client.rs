//! Async client for the LINE Messaging API push endpoint.
//!
//! The client is cheap to clone and shared across request handlers; the
//! underlying `reqwest::Client` keeps a connection pool.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use tracing::{error, info};
use url::Url;

use super::types::PushRequest;
use crate::config::with_trailing_slash;
use crate::Config;

/// Errors returned by an outbound push.
#[derive(Debug, Error)]
pub enum PushError {
    #[error("push request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("push rejected with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid push endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

/// Something that can deliver a text message to a user.
///
/// Implemented by [`LineClient`] in production and by in-memory recorders in
/// tests.
pub trait Messenger: Send + Sync {
    fn push_text(&self, to: &str, text: &str)
        -> impl Future<Output = Result<(), PushError>> + Send;
}

/// LINE Messaging API client.
#[derive(Clone)]
pub struct LineClient {
    inner: Arc<LineClientInner>,
}

struct LineClientInner {
    http: Client,
    base_url: Url,
    access_token: String,
}

impl LineClient {
    /// Create a client for the given API base URL and channel access token.
    ///
    /// Any path on `base_url` is kept as a prefix of the endpoint path.
    pub fn new(
        base_url: Url,
        access_token: String,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            inner: Arc::new(LineClientInner {
                http,
                base_url: with_trailing_slash(base_url),
                access_token,
            }),
        })
    }

    /// Create a client from the loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Self::new(
            config.line_api_base_url.clone(),
            config.channel_access_token.clone(),
            Duration::from_millis(config.request_timeout_ms),
        )
    }

    fn push_endpoint(&self) -> Result<Url, url::ParseError> {
        self.inner.base_url.join("v2/bot/message/push")
    }
}

impl Messenger for LineClient {
    async fn push_text(&self, to: &str, text: &str) -> Result<(), PushError> {
        let endpoint = self.push_endpoint()?;

        let resp = self
            .inner
            .http
            .post(endpoint)
            .bearer_auth(&self.inner.access_token)
            .json(&PushRequest::text(to, text))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!(
                to = to,
                status_code = status.as_u16(),
                body = %body,
                "line_push_rejected"
            );
            return Err(PushError::Status {
                status: status.as_u16(),
                body,
            });
        }

        info!(to = to, text_length = text.len(), "line_push_sent");

        Ok(())
    }
}
