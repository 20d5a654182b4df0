use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "triage-webhook";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_FALLBACK_INTENT: &str = "Default Fallback Intent";
pub const DEFAULT_TRIAGE_INTENTS: &[&str] = &["Symptom Triage"];
pub const DEFAULT_LOG_PATH: &str = "unrecognized_queries.csv";
/// 10 MiB before the unrecognized log is rotated.
pub const DEFAULT_LOG_MAX_BYTES: u64 = 10 * 1024 * 1024;
pub const DEFAULT_GENERATIVE_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_GENERATIVE_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_GENERATIVE_MAX_TOKENS: u32 = 150;
pub const DEFAULT_GENERATIVE_TIMEOUT_SECS: u64 = 10;

/// Filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "info,triage_webhook_lib=debug,tower_http=info"
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got {value:?}")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("TRIAGE_INTENTS must list at least one intent name")]
    NoTriageIntents,

    #[error("Intent {0:?} is configured both as the fallback intent and as a triage intent")]
    AmbiguousIntent(String),
}

/// Settings for the external generative text service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerativeConfig {
    /// `None` disables the generative path; every fallback gets the apology.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
}

/// Settings for the unrecognized-query log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub path: PathBuf,
    /// Rotate once the file reaches this size. 0 disables rotation.
    pub max_bytes: u64,
}

/// Process-wide configuration, read once at startup and passed down explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookConfig {
    pub bind_address: IpAddr,
    pub port: u16,
    pub fallback_intent: String,
    pub triage_intents: Vec<String>,
    pub unrecognized_log: LogConfig,
    pub generative: GenerativeConfig,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            fallback_intent: DEFAULT_FALLBACK_INTENT.to_string(),
            triage_intents: DEFAULT_TRIAGE_INTENTS.iter().map(|s| s.to_string()).collect(),
            unrecognized_log: LogConfig {
                path: PathBuf::from(DEFAULT_LOG_PATH),
                max_bytes: DEFAULT_LOG_MAX_BYTES,
            },
            generative: GenerativeConfig {
                api_key: None,
                base_url: DEFAULT_GENERATIVE_BASE_URL.to_string(),
                model: DEFAULT_GENERATIVE_MODEL.to_string(),
                max_tokens: DEFAULT_GENERATIVE_MAX_TOKENS,
                timeout: Duration::from_secs(DEFAULT_GENERATIVE_TIMEOUT_SECS),
            },
        }
    }
}

impl WebhookConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Unset or blank variables fall back to defaults. The result is validated
    /// before it is returned.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();

        if let Some(raw) = get("BIND_ADDRESS") {
            config.bind_address = parse(&raw, "BIND_ADDRESS", "an IP address")?;
        }
        if let Some(raw) = get("PORT") {
            config.port = parse(&raw, "PORT", "a port number")?;
        }
        if let Some(name) = get("FALLBACK_INTENT") {
            config.fallback_intent = name;
        }
        if let Some(raw) = get("TRIAGE_INTENTS") {
            config.triage_intents = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(path) = get("UNRECOGNIZED_LOG_PATH") {
            config.unrecognized_log.path = PathBuf::from(path);
        }
        if let Some(raw) = get("UNRECOGNIZED_LOG_MAX_BYTES") {
            config.unrecognized_log.max_bytes =
                parse(&raw, "UNRECOGNIZED_LOG_MAX_BYTES", "a byte count")?;
        }

        let generative = &mut config.generative;
        generative.api_key = get("OPENAI_API_KEY");
        if let Some(url) = get("GENERATIVE_BASE_URL") {
            generative.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = get("GENERATIVE_MODEL") {
            generative.model = model;
        }
        if let Some(raw) = get("GENERATIVE_MAX_TOKENS") {
            generative.max_tokens =
                parse(&raw, "GENERATIVE_MAX_TOKENS", "a positive integer")?;
        }
        if let Some(raw) = get("GENERATIVE_TIMEOUT_SECS") {
            let secs: u64 = parse(&raw, "GENERATIVE_TIMEOUT_SECS", "a positive integer")?;
            generative.timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.triage_intents.is_empty() {
            return Err(ConfigError::NoTriageIntents);
        }
        if self.triage_intents.iter().any(|i| i == &self.fallback_intent) {
            return Err(ConfigError::AmbiguousIntent(self.fallback_intent.clone()));
        }
        if self.generative.max_tokens == 0 {
            return Err(ConfigError::Invalid {
                var: "GENERATIVE_MAX_TOKENS",
                expected: "a positive integer",
                value: "0".into(),
            });
        }
        if self.generative.timeout.is_zero() {
            return Err(ConfigError::Invalid {
                var: "GENERATIVE_TIMEOUT_SECS",
                expected: "a positive integer",
                value: "0".into(),
            });
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }
}

fn parse<T: std::str::FromStr>(
    raw: &str,
    var: &'static str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Invalid {
        var,
        expected,
        value: raw.to_string(),
    })
}
