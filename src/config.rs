use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use crate::pipeline::analysis::{DEFAULT_API_BASE, DEFAULT_MODEL};

/// Application-level constants
pub const APP_NAME: &str = "GlucoSight";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const API_KEY_VAR: &str = "GOOGLE_GENAI_API_KEY";
pub const MODEL_VAR: &str = "GLUCOSIGHT_MODEL";
pub const API_BASE_VAR: &str = "GLUCOSIGHT_API_BASE";
pub const TIMEOUT_VAR: &str = "GLUCOSIGHT_TIMEOUT_SECS";
pub const BIND_VAR: &str = "GLUCOSIGHT_BIND";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_BIND: &str = "127.0.0.1:8787";

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "info,glucosight_lib=debug"
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("GOOGLE_GENAI_API_KEY is not set")]
    MissingApiKey,
    #[error("Invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub request_timeout: Duration,
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = get(API_KEY_VAR).ok_or(ConfigError::MissingApiKey)?;
        let model = get(MODEL_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let api_base = get(API_BASE_VAR).unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let timeout_secs = match get(TIMEOUT_VAR) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: TIMEOUT_VAR,
                        value: raw,
                    })
                }
            },
            None => DEFAULT_TIMEOUT_SECS,
        };

        let bind_raw = get(BIND_VAR).unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind_addr = bind_raw.parse::<SocketAddr>().map_err(|_| ConfigError::Invalid {
            var: BIND_VAR,
            value: bind_raw.clone(),
        })?;

        Ok(Self {
            api_key,
            model,
            api_base,
            request_timeout: Duration::from_secs(timeout_secs),
            bind_addr,
        })
    }
}
