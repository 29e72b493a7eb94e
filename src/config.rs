//! Client configuration parsed from environment variables.
//!
//! SYSTEM CONTEXT
//! ==============
//! The binary loads `.env` via `dotenvy` and then calls
//! [`ClientConfig::from_env`]. Parsing itself goes through
//! [`ClientConfig::from_lookup`] so callers (and tests) can supply values
//! without touching process environment.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_SESSION_FILE: &str = ".watchparty/session.json";
pub const DEFAULT_VERIFY_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid API base URL '{0}' (expected http:// or https://)")]
    InvalidBaseUrl(String),
    #[error("invalid value for {key}: '{value}'")]
    InvalidNumber { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl VerifyTimeouts {
    #[must_use]
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    #[must_use]
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }
}

impl Default for VerifyTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_VERIFY_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base address, without a trailing slash.
    pub api_base_url: String,
    pub session_path: PathBuf,
    pub timeouts: VerifyTimeouts,
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `WATCHPARTY_API_URL`: default `http://127.0.0.1:5000`
    /// - `WATCHPARTY_SESSION_FILE`: default `.watchparty/session.json`
    /// - `WATCHPARTY_VERIFY_TIMEOUT_SECS`: default 10
    /// - `WATCHPARTY_CONNECT_TIMEOUT_SECS`: default 5
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL has no http(s) scheme or a timeout is not a number.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = normalize_base_url(
            lookup("WATCHPARTY_API_URL")
                .as_deref()
                .unwrap_or(DEFAULT_API_URL),
        )?;
        let session_path = lookup("WATCHPARTY_SESSION_FILE")
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE), PathBuf::from);
        let timeouts = VerifyTimeouts {
            request_secs: parse_secs(&lookup, "WATCHPARTY_VERIFY_TIMEOUT_SECS", DEFAULT_VERIFY_TIMEOUT_SECS)?,
            connect_secs: parse_secs(&lookup, "WATCHPARTY_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?,
        };

        Ok(Self { api_base_url, session_path, timeouts })
    }
}

/// Trim whitespace and trailing slashes, and require an http(s) scheme.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidBaseUrl`] when the scheme is missing or nothing follows it.
pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let host = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"));
    match host {
        Some(rest) if !rest.is_empty() => Ok(trimmed.to_owned()),
        _ => Err(ConfigError::InvalidBaseUrl(raw.to_owned())),
    }
}

fn parse_secs<F>(lookup: &F, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { key, value: raw }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
