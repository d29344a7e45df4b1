//! Ordered route registry.
//!
//! # Responsibilities
//! - Store path pattern → Route in insertion order
//! - Enforce one route per pattern and one route per non-empty override key
//! - Stable-sort by priority once loading completes
//! - Persist to / merge from the override document
//!
//! # Design Decisions
//! - Re-registering an existing pattern updates it in place (keeps its slot)
//! - Removing by override key is a linear scan; route counts are small
//! - Persistence failures are reported as `false`, never raised

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::routing::route::Route;

/// Ordered mapping from path pattern to route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteRegistry {
    entries: Vec<(String, Route)>,
}

impl RouteRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` at `pattern`.
    ///
    /// A non-empty `override_key` first removes every route carrying the same
    /// key. An existing entry for `pattern` is then replaced where it stands;
    /// otherwise the route is appended.
    pub fn add_route(
        &mut self,
        pattern: impl Into<String>,
        handler: impl Into<String>,
        priority: i32,
        override_key: impl Into<String>,
    ) {
        let pattern = pattern.into();
        let route = Route::new(handler, priority, override_key);

        if !route.override_key.is_empty() {
            self.remove_by_key(&route.override_key);
        }

        tracing::trace!(
            route = %pattern,
            handler = %route.handler,
            priority = route.priority,
            "Route registered"
        );

        match self.entries.iter_mut().find(|(p, _)| *p == pattern) {
            Some((_, existing)) => *existing = route,
            None => self.entries.push((pattern, route)),
        }
    }

    /// Remove every route whose override key equals `key`. Returns how many.
    pub fn remove_by_key(&mut self, key: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(_, r)| r.override_key != key);
        before - self.entries.len()
    }

    /// Stable sort by ascending priority; ties keep their relative order.
    pub fn sort(&mut self) {
        self.entries.sort_by_key(|(_, r)| r.priority);
    }

    /// Drop every route.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, pattern: &str) -> Option<&Route> {
        self.entries
            .iter()
            .find(|(p, _)| p == pattern)
            .map(|(_, r)| r)
    }

    /// Routes in current order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Route)> {
        self.entries.iter().map(|(p, r)| (p.as_str(), r))
    }

    /// Patterns in current order.
    pub fn patterns(&self) -> Vec<&str> {
        self.entries.iter().map(|(p, _)| p.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The registry as a JSON object (pattern → route), in current order.
    pub fn to_document(&self) -> Value {
        let mut map = Map::new();
        for (pattern, route) in &self.entries {
            if let Ok(value) = serde_json::to_value(route) {
                map.insert(pattern.clone(), value);
            }
        }
        Value::Object(map)
    }

    /// Write the registry as a pretty-printed JSON document.
    ///
    /// Returns `true` when the document was written, `false` otherwise.
    pub fn save(&self, path: &Path) -> bool {
        let content = match serde_json::to_string_pretty(&self.to_document()) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize routes");
                return false;
            }
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = fs::create_dir_all(parent) {
                tracing::error!(path = %parent.display(), error = %e, "Failed to create routes directory");
                return false;
            }
        }

        match fs::write(path, content) {
            Ok(()) => {
                tracing::info!(path = %path.display(), routes = self.len(), "Routes saved");
                true
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Failed to save routes");
                false
            }
        }
    }

    /// Merge routes from the override document at `path`.
    ///
    /// Missing or malformed documents are ignored. Returns the number of
    /// routes merged.
    pub fn merge_overrides(&mut self, path: &Path) -> usize {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return 0,
        };
        match parse_document(&content) {
            Some(routes) => {
                let count = routes.len();
                for (pattern, route) in routes {
                    self.add_route(pattern, route.handler, route.priority, route.override_key);
                }
                tracing::debug!(path = %path.display(), routes = count, "Route overrides merged");
                count
            }
            None => {
                tracing::warn!(path = %path.display(), "Ignoring malformed route override document");
                0
            }
        }
    }
}

/// Parse an override document. Any malformed entry invalidates the whole
/// document.
fn parse_document(content: &str) -> Option<Vec<(String, Route)>> {
    let Value::Object(map) = serde_json::from_str::<Value>(content).ok()? else {
        return None;
    };
    map.into_iter()
        .map(|(pattern, value)| {
            serde_json::from_value::<Route>(value)
                .ok()
                .map(|route| (pattern, route))
        })
        .collect()
}
