//! Route metadata and pattern matching.
//!
//! # Responsibilities
//! - Hold per-pattern metadata (handler, priority, override key)
//! - Match a routing key against a pattern (exact or wildcard prefix)
//!
//! # Design Decisions
//! - No regex and no pattern validation: a trailing `*` is the only syntax
//! - Exact comparison first, wildcard prefix second
//! - Serialized field names follow the persisted override document

use serde::{Deserialize, Serialize};

/// Trailing marker turning a pattern into a prefix match.
pub const WILDCARD: char = '*';

/// Separator of namespace-qualified handler identifiers.
pub const NAMESPACE_SEPARATOR: &str = "::";

/// Metadata registered for a path pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Handler identifier resolved through the handler registry.
    #[serde(rename = "controller")]
    pub handler: String,

    /// Lower sorts first.
    #[serde(rename = "position", default)]
    pub priority: i32,

    /// Stable key replacing any earlier route registered with the same key.
    #[serde(rename = "customId", default)]
    pub override_key: String,
}

impl Route {
    pub fn new(handler: impl Into<String>, priority: i32, override_key: impl Into<String>) -> Self {
        Self {
            handler: handler.into(),
            priority,
            override_key: override_key.into(),
        }
    }

    /// Handler name without its namespace (`Dinamic::Controller::ListCliente` → `ListCliente`).
    pub fn short_name(&self) -> &str {
        short_name(&self.handler)
    }
}

/// Last segment of a namespace-qualified identifier.
pub fn short_name(handler: &str) -> &str {
    handler
        .rsplit(NAMESPACE_SEPARATOR)
        .next()
        .unwrap_or(handler)
}

/// Match `key` against `pattern`.
pub fn matches(pattern: &str, key: &str) -> bool {
    if pattern == key {
        return true;
    }
    match pattern.strip_suffix(WILDCARD) {
        Some(prefix) => key.starts_with(prefix),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(matches("/login", "/login"));
        assert!(!matches("/login", "/login/"));
        assert!(!matches("/login", "/Login"));
    }

    #[test]
    fn test_wildcard_match() {
        assert!(matches("/api/*", "/api/3/clientes"));
        assert!(matches("/api/*", "/api/"));
        assert!(!matches("/api/*", "/api"));
        assert!(matches("*", "/anything"));
        assert!(matches("*", ""));
        // Literal pattern equal to the key also matches
        assert!(matches("/a*", "/a*"));
    }

    #[test]
    fn test_short_name() {
        assert_eq!(short_name("Dinamic::Controller::ListCliente"), "ListCliente");
        assert_eq!(short_name("Dashboard"), "Dashboard");
        assert_eq!(Route::new("Core::Files", 1, "").short_name(), "Files");
    }

    #[test]
    fn test_document_field_names() {
        let route = Route::new("Login", 1, "login-page");
        let value = serde_json::to_value(&route).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"controller": "Login", "position": 1, "customId": "login-page"})
        );

        let parsed: Route = serde_json::from_str(r#"{"controller": "X"}"#).unwrap();
        assert_eq!(parsed, Route::new("X", 0, ""));
    }
}
