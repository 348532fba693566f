//! Configuration module for the roster console.
//!
//! All configuration is loaded from environment variables with sensible defaults. Department and
//! team ids are absent: they are passed to each panel explicitly.

use std::env;
use std::time::Duration;

use crate::errors::RosterError;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the department administration API
    pub api_base_url: String,
    /// Bearer token sent in the Authorization header
    pub api_token: Option<String>,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, RosterError> {
        dotenvy::dotenv().ok();

        let api_base_url = env::var("ROSTER_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(RosterError::Config(format!(
                "ROSTER_API_BASE_URL must be an http(s) URL, got {:?}",
                api_base_url
            )));
        }

        let api_token = env::var("ROSTER_API_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());

        let request_timeout = match env::var("ROSTER_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    RosterError::Config(format!(
                        "Invalid ROSTER_REQUEST_TIMEOUT_SECS value: {:?}",
                        raw
                    ))
                })?;
                Duration::from_secs(secs)
            }
            Err(_) => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let log_level = env::var("ROSTER_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            api_base_url,
            api_token,
            request_timeout,
            log_level,
        })
    }
}
