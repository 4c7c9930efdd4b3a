// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the contact relay.
//!
//! Every field has a serde default so a partial config file (or none at all)
//! yields a working service. [`Config::from_env`] overlays environment
//! variables on top of those defaults.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Configuration for the contact relay service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Who receives submissions and who they appear to come from
    #[serde(default)]
    pub contact: ContactConfig,

    /// Field and content-type validation bounds
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Transactional email provider
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Addressing for the outbound notification email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactConfig {
    #[serde(default = "default_recipient_email")]
    pub recipient_email: String,

    #[serde(default = "default_recipient_name")]
    pub recipient_name: String,

    #[serde(default = "default_sender_email")]
    pub sender_email: String,

    #[serde(default = "default_sender_name")]
    pub sender_name: String,

    /// Prepended to the submitter's name in the subject line
    #[serde(default = "default_subject_prefix")]
    pub subject_prefix: String,
}

/// Validation bounds for submitted fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Maximum trimmed name length (default: 50)
    #[serde(default = "default_name_max_length")]
    pub name_max_length: usize,

    /// Minimum trimmed message length (default: 10)
    #[serde(default = "default_message_min_length")]
    pub message_min_length: usize,

    /// Maximum trimmed message length (default: 1000)
    #[serde(default = "default_message_max_length")]
    pub message_max_length: usize,

    /// Maximum email length, per RFC 5321 (default: 254)
    #[serde(default = "default_email_max_length")]
    pub email_max_length: usize,

    /// Accepted request media types (default: application/json)
    #[serde(default = "default_content_types")]
    pub accepted_content_types: Vec<String>,

    /// Largest request body read before parsing, in bytes (default: 65536)
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

/// Fixed-window rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Window length in milliseconds (default: 60000)
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    /// Requests allowed per client key per window (default: 5)
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// How often closed windows are swept from the store (default: 60)
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

/// Transactional email provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider API key. Absent means the service is not configured.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_provider_endpoint")]
    pub endpoint: Url,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid provider endpoint {value:?}: {source}")]
    InvalidEndpoint {
        value: String,
        #[source]
        source: url::ParseError,
    },
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_recipient_email() -> String {
    "owner@example.com".to_string()
}

fn default_recipient_name() -> String {
    "Site Owner".to_string()
}

fn default_sender_email() -> String {
    "contact@example.com".to_string()
}

fn default_sender_name() -> String {
    "Contact Form".to_string()
}

fn default_subject_prefix() -> String {
    "New Contact Form Message from".to_string()
}

fn default_name_max_length() -> usize {
    50
}

fn default_message_min_length() -> usize {
    10
}

fn default_message_max_length() -> usize {
    1000
}

fn default_email_max_length() -> usize {
    254
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

fn default_content_types() -> Vec<String> {
    vec!["application/json".to_string()]
}

fn default_window_ms() -> u64 {
    60_000
}

fn default_max_requests() -> u32 {
    5
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_provider_endpoint() -> Url {
    Url::parse("https://api.brevo.com/v3/smtp/email").expect("static endpoint URL is valid")
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            contact: ContactConfig::default(),
            validation: ValidationConfig::default(),
            rate_limit: RateLimitConfig::default(),
            provider: ProviderConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            recipient_email: default_recipient_email(),
            recipient_name: default_recipient_name(),
            sender_email: default_sender_email(),
            sender_name: default_sender_name(),
            subject_prefix: default_subject_prefix(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            name_max_length: default_name_max_length(),
            message_min_length: default_message_min_length(),
            message_max_length: default_message_max_length(),
            email_max_length: default_email_max_length(),
            accepted_content_types: default_content_types(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_ms: default_window_ms(),
            max_requests: default_max_requests(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_provider_endpoint(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl RateLimitConfig {
    /// Get the rate window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    /// Get the sweep interval
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

impl Config {
    /// Load configuration from environment variables on top of the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    ///
    /// Numeric values that fail to parse keep their default. Empty strings are
    /// treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Config::default();

        if let Some(v) = get("BIND_ADDR") {
            config.bind_addr = v;
        }

        if let Some(v) = get("CONTACT_RECIPIENT_EMAIL") {
            config.contact.recipient_email = v;
        }
        if let Some(v) = get("CONTACT_RECIPIENT_NAME") {
            config.contact.recipient_name = v;
        }
        if let Some(v) = get("CONTACT_SENDER_EMAIL") {
            config.contact.sender_email = v;
        }
        if let Some(v) = get("CONTACT_SENDER_NAME") {
            config.contact.sender_name = v;
        }

        parse_into(&get, "NAME_MAX_LENGTH", &mut config.validation.name_max_length);
        parse_into(&get, "MESSAGE_MIN_LENGTH", &mut config.validation.message_min_length);
        parse_into(&get, "MESSAGE_MAX_LENGTH", &mut config.validation.message_max_length);
        parse_into(&get, "MAX_BODY_BYTES", &mut config.validation.max_body_bytes);

        parse_into(&get, "RATE_LIMIT_WINDOW_MS", &mut config.rate_limit.window_ms);
        parse_into(&get, "RATE_LIMIT_MAX_REQUESTS", &mut config.rate_limit.max_requests);
        parse_into(&get, "RATE_LIMIT_SWEEP_SECS", &mut config.rate_limit.sweep_interval_secs);

        config.provider.api_key = get("BREVO_API_KEY");
        if let Some(v) = get("BREVO_ENDPOINT") {
            config.provider.endpoint = Url::parse(&v)
                .map_err(|source| ConfigError::InvalidEndpoint { value: v, source })?;
        }

        parse_into(&get, "METRICS_ENABLED", &mut config.metrics.enabled);

        Ok(config)
    }
}

fn parse_into<T, G>(get: &G, key: &str, slot: &mut T)
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    if let Some(parsed) = get(key).and_then(|v| v.trim().parse().ok()) {
        *slot = parsed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.validation.name_max_length, 50);
        assert_eq!(config.validation.message_min_length, 10);
        assert_eq!(config.validation.message_max_length, 1000);
        assert_eq!(config.validation.max_body_bytes, 65_536);
        assert_eq!(config.rate_limit.window_ms, 60_000);
        assert_eq!(config.rate_limit.max_requests, 5);
        assert!(config.provider.api_key.is_none());
        assert_eq!(
            config.provider.endpoint.as_str(),
            "https://api.brevo.com/v3/smtp/email"
        );
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("BREVO_API_KEY", "xkeysib-123"),
            ("RATE_LIMIT_MAX_REQUESTS", "10"),
            ("MESSAGE_MAX_LENGTH", "2000"),
            ("CONTACT_RECIPIENT_EMAIL", "me@example.org"),
        ]))
        .unwrap();

        assert_eq!(config.provider.api_key.as_deref(), Some("xkeysib-123"));
        assert_eq!(config.rate_limit.max_requests, 10);
        assert_eq!(config.validation.message_max_length, 2000);
        assert_eq!(config.contact.recipient_email, "me@example.org");
    }

    #[test]
    fn test_empty_api_key_is_absent() {
        let config = Config::from_lookup(lookup(&[("BREVO_API_KEY", "  ")])).unwrap();
        assert!(config.provider.api_key.is_none());
    }

    #[test]
    fn test_unparseable_number_keeps_default() {
        let config = Config::from_lookup(lookup(&[("RATE_LIMIT_WINDOW_MS", "soon")])).unwrap();
        assert_eq!(config.rate_limit.window_ms, 60_000);
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let result = Config::from_lookup(lookup(&[("BREVO_ENDPOINT", "not a url")]));
        assert!(matches!(result, Err(ConfigError::InvalidEndpoint { .. })));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"rate_limit": {"max_requests": 3}}"#).unwrap();
        assert_eq!(config.rate_limit.max_requests, 3);
        assert_eq!(config.rate_limit.window_ms, 60_000);
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
    }
}
