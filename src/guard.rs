//! Navigation guard: decides whether a page transition may proceed.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every page transition passes through [`NavigationGuard::evaluate`] before
//! anything renders. The guard reads the session store, classifies the target
//! route, and for protected routes with a local token asks the token verifier
//! once before resolving.
//!
//! DESIGN
//! ======
//! Evaluation is `classify` (pure, ordered rules, first match wins) followed by
//! at most one awaited verification. The verification is the only suspension
//! point and is bounded by `verify_timeout`.
//!
//! ERROR HANDLING
//! ==============
//! The guard never fails. Unverifiable sessions resolve to the login page
//! without touching the store; only an explicit forced logout clears it.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::DEFAULT_VERIFY_TIMEOUT_SECS;
use crate::routes::{ENTRY_PATH, LANDING_PATH, LOGIN_PATH, RouteMatch, RouteTable, normalize_path};
use crate::session::{Session, SessionStore};
use crate::verify::{LogoutDirective, TokenVerifier, VerificationOutcome};

// =============================================================================
// RESOLUTION
// =============================================================================

/// Terminal state of one guard evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Allow,
    RedirectLogin,
    RedirectLanding,
}

impl Resolution {
    /// Path the caller should navigate to instead, if any.
    #[must_use]
    pub fn redirect_target(self) -> Option<&'static str> {
        match self {
            Self::Allow => None,
            Self::RedirectLogin => Some(LOGIN_PATH),
            Self::RedirectLanding => Some(LANDING_PATH),
        }
    }
}

// =============================================================================
// TRANSITION REQUEST
// =============================================================================

/// One navigation attempt, captured at interception time.
#[derive(Debug, Clone)]
pub struct TransitionRequest<'a> {
    /// Normalized target path.
    pub target_path: String,
    pub current_path: Option<String>,
    pub route: Option<RouteMatch<'a>>,
    pub session: Session,
}

impl TransitionRequest<'_> {
    #[must_use]
    pub fn requires_auth(&self) -> bool {
        self.route.as_ref().is_some_and(|m| m.route.requires_auth())
    }

    #[must_use]
    pub fn route_name(&self) -> Option<&str> {
        self.route.as_ref().map(|m| m.route.name())
    }
}

/// Result of the synchronous rule pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Decided(Resolution),
    /// Protected route with a local token; carries the token to verify.
    NeedsVerify(String),
}

/// Apply the guard rules in order. First match wins.
#[must_use]
pub fn classify(request: &TransitionRequest<'_>) -> Classification {
    let token = request.session.token();

    if request.target_path == ENTRY_PATH {
        return Classification::Decided(if token.is_some() {
            Resolution::RedirectLanding
        } else {
            Resolution::RedirectLogin
        });
    }

    match (request.requires_auth(), token) {
        (true, Some(token)) => Classification::NeedsVerify(token.to_owned()),
        (true, None) => Classification::Decided(Resolution::RedirectLogin),
        (false, Some(_)) if request.target_path == LOGIN_PATH => Classification::Decided(Resolution::RedirectLanding),
        _ => Classification::Decided(Resolution::Allow),
    }
}

/// Map a verification answer to a resolution. Fail closed on `NetworkFailure`.
#[must_use]
pub fn resolve_outcome(outcome: VerificationOutcome) -> Resolution {
    match outcome {
        VerificationOutcome::NetworkFailure | VerificationOutcome::Unauthorized(LogoutDirective::Evict) => {
            Resolution::RedirectLogin
        }
        VerificationOutcome::Unauthorized(LogoutDirective::Retain) | VerificationOutcome::Other(_) => Resolution::Allow,
    }
}

// =============================================================================
// GUARD
// =============================================================================

pub struct NavigationGuard {
    routes: RouteTable,
    sessions: Arc<dyn SessionStore>,
    verifier: Arc<dyn TokenVerifier>,
    verify_timeout: Duration,
}

impl NavigationGuard {
    #[must_use]
    pub fn new(routes: RouteTable, sessions: Arc<dyn SessionStore>, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { routes, sessions, verifier, verify_timeout: Duration::from_secs(DEFAULT_VERIFY_TIMEOUT_SECS) }
    }

    /// Upper bound on the remote call, independent of the verifier's own timeouts.
    #[must_use]
    pub fn with_verify_timeout(mut self, timeout: Duration) -> Self {
        self.verify_timeout = timeout;
        self
    }

    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    #[must_use]
    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    /// Snapshot the session and resolve the route for `target`.
    #[must_use]
    pub fn request(&self, target: &str, current: Option<&str>) -> TransitionRequest<'_> {
        TransitionRequest {
            target_path: normalize_path(target),
            current_path: current.map(normalize_path),
            route: self.routes.resolve(target),
            session: self.sessions.read(),
        }
    }

    /// Evaluate one transition to a terminal resolution.
    pub async fn evaluate(&self, target: &str, current: Option<&str>) -> Resolution {
        let request = self.request(target, current);
        let resolution = match classify(&request) {
            Classification::Decided(resolution) => resolution,
            Classification::NeedsVerify(token) => self.verify(&token).await,
        };

        info!(
            path = %request.target_path,
            from = request.current_path.as_deref().unwrap_or("-"),
            route = request.route_name().unwrap_or("-"),
            signed_in = request.session.is_signed_in(),
            ?resolution,
            "navigation resolved"
        );
        resolution
    }

    async fn verify(&self, token: &str) -> Resolution {
        let outcome = match tokio::time::timeout(self.verify_timeout, self.verifier.verify(token)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(timeout = ?self.verify_timeout, "token verification timed out");
                VerificationOutcome::NetworkFailure
            }
        };
        debug!(?outcome, "token verification settled");

        if outcome == VerificationOutcome::Unauthorized(LogoutDirective::Evict) {
            match self.sessions.clear() {
                Ok(()) => info!("session evicted by token verifier"),
                Err(e) => error!(error = %e, "failed to clear evicted session"),
            }
        }

        resolve_outcome(outcome)
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
