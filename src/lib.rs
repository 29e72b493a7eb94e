//! Watch-party client navigation access control.
//!
//! SYSTEM CONTEXT
//! ==============
//! `session` holds the local sign-in record, `routes` describes which pages
//! need one, `verify` asks the backend whether a token is still good, `guard`
//! turns all of that into a per-transition resolution, and `navigator` applies
//! resolutions in request order.

pub mod config;
pub mod guard;
pub mod navigator;
pub mod routes;
pub mod session;
pub mod verify;

pub use config::ClientConfig;
pub use guard::{NavigationGuard, Resolution};
pub use navigator::{NavigationOutcome, Navigator};
pub use routes::{RouteDescriptor, RouteTable};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore};
pub use verify::{HttpTokenVerifier, LogoutDirective, TokenVerifier, VerificationOutcome};
