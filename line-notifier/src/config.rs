//! Configuration module for environment variable parsing.
//!
//! Everything is read once at startup. Required secrets abort startup when
//! missing; optional values that are set to an empty string count as unset.

use std::env;
use std::fmt;

use thiserror::Error;
use tracing::warn;
use url::Url;

/// Phrase that activates the notification rule when no override is set.
pub const DEFAULT_TRIGGER_PHRASE: &str = "おめでとうございます";

/// Base URL of the LINE Messaging API.
pub const DEFAULT_LINE_API_BASE_URL: &str = "https://api.line.me";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// Channel secret used as the HMAC key for `x-line-signature`
    pub channel_secret: String,

    /// Long-lived channel access token for the Messaging API
    pub channel_access_token: String,

    /// The only user allowed to activate the rule. `None` disables it.
    pub trigger_user_id: Option<String>,

    /// Form link sent back to the user
    pub form_url: Option<String>,

    /// Substring that must appear in the message text
    pub trigger_phrase: String,

    /// Port for the web server to listen on
    pub port: u16,

    /// Messaging API base URL (overridable for tests and proxies)
    pub line_api_base_url: Url,

    /// HTTP request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let channel_access_token =
            non_empty("CHANNEL_ACCESS_TOKEN").ok_or(ConfigError::Missing("CHANNEL_ACCESS_TOKEN"))?;
        let channel_secret =
            non_empty("CHANNEL_SECRET").ok_or(ConfigError::Missing("CHANNEL_SECRET"))?;

        let port = match non_empty("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                reason: format!("{raw:?} is not a port number"),
            })?,
            None => 3000,
        };

        let base_url_raw = non_empty("LINE_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_LINE_API_BASE_URL.to_string());
        let line_api_base_url = Url::parse(&base_url_raw)
            .map(with_trailing_slash)
            .map_err(|e| ConfigError::Invalid {
                name: "LINE_API_BASE_URL",
                reason: e.to_string(),
            })?;

        let request_timeout_ms = match non_empty("REQUEST_TIMEOUT_MS") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!(env_var = "REQUEST_TIMEOUT_MS", value = %raw, "Invalid timeout, using default");
                8000
            }),
            None => 8000,
        };

        Ok(Config {
            channel_secret,
            channel_access_token,
            trigger_user_id: non_empty("TOM_USER_ID"),
            form_url: non_empty("FORM_URL"),
            trigger_phrase: non_empty("TRIGGER_PHRASE")
                .unwrap_or_else(|| DEFAULT_TRIGGER_PHRASE.to_string()),
            port,
            line_api_base_url,
            request_timeout_ms,
        })
    }
}

/// Ensure the URL path ends in `/` so relative joins keep any path prefix.
pub fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("channel_secret", &"<redacted>")
            .field("channel_access_token", &"<redacted>")
            .field("trigger_user_id", &self.trigger_user_id)
            .field("form_url", &self.form_url)
            .field("trigger_phrase", &self.trigger_phrase)
            .field("port", &self.port)
            .field("line_api_base_url", &self.line_api_base_url.as_str())
            .field("request_timeout_ms", &self.request_timeout_ms)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [("CHANNEL_ACCESS_TOKEN", "token"), ("CHANNEL_SECRET", "secret")];

    #[test]
    fn test_defaults() {
        let config = load(&REQUIRED).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.trigger_phrase, DEFAULT_TRIGGER_PHRASE);
        assert_eq!(config.trigger_user_id, None);
        assert_eq!(config.form_url, None);
        assert_eq!(config.request_timeout_ms, 8000);
        assert_eq!(config.line_api_base_url.as_str(), "https://api.line.me/");
    }

    #[test]
    fn test_missing_token() {
        let err = load(&[("CHANNEL_SECRET", "secret")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("CHANNEL_ACCESS_TOKEN")));
    }

    #[test]
    fn test_missing_secret() {
        let err = load(&[("CHANNEL_ACCESS_TOKEN", "token"), ("CHANNEL_SECRET", "")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("CHANNEL_SECRET")));
    }

    #[test]
    fn test_optional_values() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("TOM_USER_ID", "U1"),
            ("FORM_URL", "https://example.com/form"),
            ("PORT", "8080"),
            ("REQUEST_TIMEOUT_MS", "250"),
        ]);
        let config = load(&vars).unwrap();
        assert_eq!(config.trigger_user_id.as_deref(), Some("U1"));
        assert_eq!(config.form_url.as_deref(), Some("https://example.com/form"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.request_timeout_ms, 250);
    }

    #[test]
    fn test_empty_optionals_are_unset() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([("TOM_USER_ID", ""), ("FORM_URL", "  "), ("TRIGGER_PHRASE", "")]);
        let config = load(&vars).unwrap();
        assert_eq!(config.trigger_user_id, None);
        assert_eq!(config.form_url, None);
        assert_eq!(config.trigger_phrase, DEFAULT_TRIGGER_PHRASE);
    }

    #[test]
    fn test_invalid_port() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("PORT", "http"));
        let err = load(&vars).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));
    }

    #[test]
    fn test_invalid_base_url() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("LINE_API_BASE_URL", "not a url"));
        let err = load(&vars).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "LINE_API_BASE_URL", .. }));
    }

    #[test]
    fn test_base_url_path_gets_trailing_slash() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("LINE_API_BASE_URL", "http://proxy.local/line"));
        let config = load(&vars).unwrap();
        assert_eq!(config.line_api_base_url.as_str(), "http://proxy.local/line/");

        let mut vars = REQUIRED.to_vec();
        vars.push(("LINE_API_BASE_URL", "http://proxy.local/line/"));
        let config = load(&vars).unwrap();
        assert_eq!(config.line_api_base_url.as_str(), "http://proxy.local/line/");
    }

    #[test]
    fn test_custom_trigger_phrase() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("TRIGGER_PHRASE", "提出しました"));
        assert_eq!(load(&vars).unwrap().trigger_phrase, "提出しました");
    }

    #[test]
    fn test_bad_timeout_falls_back() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("REQUEST_TIMEOUT_MS", "soon"));
        assert_eq!(load(&vars).unwrap().request_timeout_ms, 8000);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = load(&REQUIRED).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("\"token\""));
        assert!(!rendered.contains("\"secret\""));
        assert!(rendered.contains("<redacted>"));
    }
}
