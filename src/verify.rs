//! Remote token verification.
//!
//! SYSTEM CONTEXT
//! ==============
//! The navigation guard asks the backend whether a locally held token is still
//! good before entering a protected page. The backend answers on
//! `GET {base}/api/verify-token` with the token as a bearer credential.
//!
//! ERROR HANDLING
//! ==============
//! Only a 401 body is inspected. Every failure to obtain or parse an answer
//! collapses to [`VerificationOutcome::NetworkFailure`] at the trait boundary,
//! so callers never see a transport error.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{ClientConfig, VerifyTimeouts};

pub const VERIFY_TOKEN_PATH: &str = "/api/verify-token";

// =============================================================================
// OUTCOME
// =============================================================================

/// What the backend asked us to do with a rejected token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutDirective {
    /// `logout: true`: drop the local session.
    Evict,
    /// `logout: false`: token is suspect but the session stays.
    Retain,
}

impl LogoutDirective {
    #[must_use]
    pub fn from_flag(logout: bool) -> Self {
        if logout { Self::Evict } else { Self::Retain }
    }
}

/// Result of one verification call. Consumed once, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// No usable answer: transport error, timeout, or unparsable 401 body.
    NetworkFailure,
    Unauthorized(LogoutDirective),
    /// Any non-401 status, success included.
    Other(u16),
}

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    #[error("verify request failed: {0}")]
    Request(String),

    #[error("verify request timed out")]
    Timeout,

    #[error("unparsable 401 body: {0}")]
    MalformedBody(String),
}

impl From<reqwest::Error> for VerifyError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() { Self::Timeout } else { Self::Request(e.to_string()) }
    }
}

// =============================================================================
// VERIFIER TRAIT
// =============================================================================

/// Remote authority for token validity. Enables mocking in tests.
#[async_trait::async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Check `token` once. Never retries and never fails; failures are `NetworkFailure`.
    async fn verify(&self, token: &str) -> VerificationOutcome;
}

// =============================================================================
// HTTP VERIFIER
// =============================================================================

pub struct HttpTokenVerifier {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpTokenVerifier {
    /// Build a verifier for the backend at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::HttpClientBuild`] if the HTTP client cannot be constructed.
    pub fn new(base_url: &str, timeouts: VerifyTimeouts) -> Result<Self, VerifyError> {
        let http = reqwest::Client::builder()
            .timeout(timeouts.request())
            .connect_timeout(timeouts.connect())
            .build()
            .map_err(|e| VerifyError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, endpoint: verify_endpoint(base_url) })
    }

    /// Build a verifier from parsed client config.
    ///
    /// # Errors
    ///
    /// See [`HttpTokenVerifier::new`].
    pub fn from_config(config: &ClientConfig) -> Result<Self, VerifyError> {
        Self::new(&config.api_base_url, config.timeouts)
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn try_verify(&self, token: &str) -> Result<VerificationOutcome, VerifyError> {
        let response = self.http.get(&self.endpoint).bearer_auth(token).send().await?;

        let status = response.status().as_u16();
        if status != 401 {
            return Ok(VerificationOutcome::Other(status));
        }

        let body = response.text().await?;
        parse_unauthorized(&body).map(VerificationOutcome::Unauthorized)
    }
}

#[async_trait::async_trait]
impl TokenVerifier for HttpTokenVerifier {
    async fn verify(&self, token: &str) -> VerificationOutcome {
        match self.try_verify(token).await {
            Ok(outcome) => {
                debug!(endpoint = %self.endpoint, ?outcome, "token verification answered");
                outcome
            }
            Err(e) => {
                warn!(endpoint = %self.endpoint, error = %e, "token verification failed");
                VerificationOutcome::NetworkFailure
            }
        }
    }
}

#[must_use]
pub fn verify_endpoint(base_url: &str) -> String {
    format!("{}{VERIFY_TOKEN_PATH}", base_url.trim_end_matches('/'))
}

#[derive(Deserialize)]
struct UnauthorizedBody {
    logout: bool,
}

fn parse_unauthorized(body: &str) -> Result<LogoutDirective, VerifyError> {
    serde_json::from_str::<UnauthorizedBody>(body)
        .map(|b| LogoutDirective::from_flag(b.logout))
        .map_err(|e| VerifyError::MalformedBody(e.to_string()))
}

#[cfg(test)]
#[path = "verify_test.rs"]
mod tests;
