//! Narrow read interfaces over configuration and settings.
//!
//! # Responsibilities
//! - `ConfigReader`: flat key/value lookups (`route`, `lang`, `db_name`, ...)
//! - `SettingsReader`: grouped property lookups (`default.homepage`, ...)
//!
//! # Design Decisions
//! - Route loading only sees these traits, so tests can hand in small fakes
//! - Missing keys never fail; the caller always supplies the default

use serde_json::Value;

use crate::config::schema::KernelConfig;

/// Key/value configuration reader.
pub trait ConfigReader: Send + Sync {
    /// Returns the value stored under `key`, or `default` when absent or empty.
    fn get(&self, key: &str, default: &str) -> String;
}

/// Grouped settings reader.
pub trait SettingsReader: Send + Sync {
    /// Returns `group.property`, or `default` when absent.
    fn get(&self, group: &str, property: &str, default: Value) -> Value;

    /// String convenience over [`SettingsReader::get`]. Non-string values are
    /// rendered with their JSON representation.
    fn get_str(&self, group: &str, property: &str, default: &str) -> String {
        match self.get(group, property, Value::String(default.to_string())) {
            Value::String(s) => s,
            Value::Null => default.to_string(),
            other => other.to_string(),
        }
    }
}

impl ConfigReader for KernelConfig {
    fn get(&self, key: &str, default: &str) -> String {
        let k = &self.kernel;
        let value = match key {
            "route" => k.route.clone(),
            "lang" => k.lang.clone(),
            "db_name" => k.db_name.clone(),
            "install_root" => k.install_root.display().to_string(),
            "controller_dir" => k.controller_dir.clone(),
            "controller_extension" => k.controller_extension.clone(),
            "routes_file" => k.routes_file.clone(),
            "error_lookup_url" => k.error_lookup_url.clone(),
            _ => String::new(),
        };
        if value.is_empty() {
            default.to_string()
        } else {
            value
        }
    }
}

impl SettingsReader for KernelConfig {
    fn get(&self, group: &str, property: &str, default: Value) -> Value {
        self.settings
            .get(group)
            .and_then(|g| g.get(property))
            .cloned()
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_config_reader_defaults_on_empty() {
        let config = KernelConfig::default();
        assert_eq!(ConfigReader::get(&config, "db_name", "fallback"), "fallback");
        assert_eq!(ConfigReader::get(&config, "lang", "xx"), "en_EN");
        assert_eq!(ConfigReader::get(&config, "no_such_key", "d"), "d");
    }

    #[test]
    fn test_settings_reader() {
        let mut config = KernelConfig::default();
        config
            .settings
            .entry("default".to_string())
            .or_default()
            .insert("homepage".to_string(), json!("ListCliente"));
        config
            .settings
            .entry("default".to_string())
            .or_default()
            .insert("item_limit".to_string(), json!(25));

        assert_eq!(config.get_str("default", "homepage", "Dashboard"), "ListCliente");
        assert_eq!(config.get_str("default", "item_limit", "50"), "25");
        assert_eq!(config.get_str("default", "missing", "x"), "x");
        assert_eq!(
            SettingsReader::get(&config, "other", "homepage", json!(null)),
            json!(null)
        );
    }
}
