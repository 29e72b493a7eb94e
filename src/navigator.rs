//! Navigator: applies guard resolutions in the order navigations were requested.
//!
//! SYSTEM CONTEXT
//! ==============
//! The guard decides; the navigator is the caller that owns "which page is on
//! screen". It follows redirects through the guard and drops results from
//! navigations that a newer request has superseded.
//!
//! TRADE-OFFS
//! ==========
//! There is no cancellation: a superseded evaluation still runs to completion
//! (including any forced-logout clear) and its result is discarded. Redirect
//! chains are capped; when the cap is hit the navigator settles on the login
//! page, which covers the login/landing ping-pong when a token is present but
//! the verifier is unreachable.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

use crate::guard::{NavigationGuard, Resolution};
use crate::routes::{LOGIN_PATH, normalize_path};

pub const MAX_REDIRECTS: usize = 3;

/// One guard evaluation within a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub path: String,
    pub resolution: Resolution,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// `path` is now the current page.
    Rendered { path: String, steps: Vec<Step> },
    /// A newer navigation started before this one resolved.
    Superseded,
}

pub struct Navigator {
    guard: NavigationGuard,
    current: Mutex<Option<String>>,
    latest: AtomicU64,
}

impl Navigator {
    #[must_use]
    pub fn new(guard: NavigationGuard) -> Self {
        Self { guard, current: Mutex::new(None), latest: AtomicU64::new(0) }
    }

    /// Start as if `path` were already on screen.
    #[must_use]
    pub fn starting_at(self, path: &str) -> Self {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(normalize_path(path));
        self
    }

    #[must_use]
    pub fn guard(&self) -> &NavigationGuard {
        &self.guard
    }

    /// Page currently on screen, `None` before the first navigation.
    #[must_use]
    pub fn current(&self) -> Option<String> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Navigate to `target`, following redirects, and apply the result if still latest.
    pub async fn navigate(&self, target: &str) -> NavigationOutcome {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let mut from = self.current();
        let mut path = normalize_path(target);
        let mut steps = Vec::new();

        loop {
            let resolution = self.guard.evaluate(&path, from.as_deref()).await;
            if !self.is_latest(ticket) {
                debug!(ticket, %path, "navigation superseded");
                return NavigationOutcome::Superseded;
            }
            steps.push(Step { path: path.clone(), resolution });

            let Some(next) = resolution.redirect_target() else {
                break;
            };
            if steps.len() > MAX_REDIRECTS {
                warn!(redirects = steps.len(), "redirect limit reached; settling on login");
                path = LOGIN_PATH.to_owned();
                break;
            }
            from = Some(std::mem::replace(&mut path, next.to_owned()));
        }

        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if !self.is_latest(ticket) {
            return NavigationOutcome::Superseded;
        }
        *current = Some(path.clone());
        NavigationOutcome::Rendered { path, steps }
    }

    fn is_latest(&self, ticket: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket
    }
}

#[cfg(test)]
#[path = "navigator_test.rs"]
mod tests;
