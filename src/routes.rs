//! Route table: static descriptors and path matching.
//!
//! SYSTEM CONTEXT
//! ==============
//! The navigation guard resolves each target path against this table to learn
//! whether the destination needs a session. Patterns use `:name` segments for
//! parameters (`/rooms/:room_id`), mirroring the page router.

use std::fmt;

/// Entry path; always redirected based on session presence.
pub const ENTRY_PATH: &str = "/";
/// Public login page.
pub const LOGIN_PATH: &str = "/login";
/// Landing page for signed-in users (the room browser).
pub const LANDING_PATH: &str = "/browse";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
}

/// One navigable destination. Built at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor {
    name: String,
    pattern: String,
    segments: Vec<Segment>,
    requires_auth: bool,
}

impl RouteDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, pattern: &str, requires_auth: bool) -> Self {
        let segments = split_segments(pattern)
            .map(|seg| match seg.strip_prefix(':') {
                Some(param) => Segment::Param(param.to_owned()),
                None => Segment::Static(seg.to_owned()),
            })
            .collect();
        Self { name: name.into(), pattern: normalize_path(pattern), segments, requires_auth }
    }

    #[must_use]
    pub fn public(name: impl Into<String>, pattern: &str) -> Self {
        Self::new(name, pattern, false)
    }

    #[must_use]
    pub fn protected(name: impl Into<String>, pattern: &str) -> Self {
        Self::new(name, pattern, true)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn requires_auth(&self) -> bool {
        self.requires_auth
    }

    fn match_segments(&self, parts: &[&str]) -> Option<Vec<(String, String)>> {
        if parts.len() != self.segments.len() {
            return None;
        }
        let mut params = Vec::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Static(expected) if expected == part => {}
                Segment::Static(_) => return None,
                Segment::Param(name) => params.push((name.clone(), (*part).to_owned())),
            }
        }
        Some(params)
    }
}

impl fmt::Display for RouteDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let access = if self.requires_auth { "protected" } else { "public" };
        write!(f, "{:<8} {:<18} {access}", self.name, self.pattern)
    }
}

/// A concrete path resolved to its descriptor plus captured parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub route: &'a RouteDescriptor,
    pub params: Vec<(String, String)>,
}

impl RouteMatch<'_> {
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Ordered set of descriptors. First match wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    routes: Vec<RouteDescriptor>,
}

impl RouteTable {
    #[must_use]
    pub fn new(routes: Vec<RouteDescriptor>) -> Self {
        Self { routes }
    }

    /// Entry, login, room browser, and per-room view.
    #[must_use]
    pub fn watch_party() -> Self {
        Self::new(vec![
            RouteDescriptor::public("entry", ENTRY_PATH),
            RouteDescriptor::public("login", LOGIN_PATH),
            RouteDescriptor::protected("browse", LANDING_PATH),
            RouteDescriptor::protected("room", "/rooms/:room_id"),
        ])
    }

    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_>> {
        let parts: Vec<&str> = split_segments(strip_suffixes(path)).collect();
        self.routes.iter().find_map(|route| {
            route
                .match_segments(&parts)
                .map(|params| RouteMatch { route, params })
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteDescriptor> {
        self.routes.iter()
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::watch_party()
    }
}

/// Canonical form of a path: no query, no fragment, no empty or trailing segments.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let joined = split_segments(strip_suffixes(path)).collect::<Vec<_>>().join("/");
    format!("/{joined}")
}

fn strip_suffixes(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or_default()
}

fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;
