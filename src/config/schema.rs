//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the kernel.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the routing kernel.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct KernelConfig {
    /// Installation layout, base path and data backend.
    pub kernel: KernelSection,

    /// Free-form settings grouped by name (`[settings.default]`, ...).
    pub settings: BTreeMap<String, BTreeMap<String, serde_json::Value>>,

    /// HTTP listener settings.
    pub listener: ListenerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Core kernel settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct KernelSection {
    /// Base path prefix stripped from every request path (e.g. "/erp").
    pub route: String,

    /// Locale code used for the process.
    pub lang: String,

    /// Database name. Empty means the application is not installed yet.
    pub db_name: String,

    /// Installation root. Relative paths below are resolved against it.
    pub install_root: PathBuf,

    /// Directory scanned for controller artifacts on rebuild.
    pub controller_dir: String,

    /// File extension of controller artifacts (without the dot).
    pub controller_extension: String,

    /// Persisted route override document.
    pub routes_file: String,

    /// Prefix of the lookup link embedded in fatal diagnostic pages.
    pub error_lookup_url: String,
}

impl Default for KernelSection {
    fn default() -> Self {
        Self {
            route: String::new(),
            lang: "en_EN".to_string(),
            db_name: String::new(),
            install_root: PathBuf::from("."),
            controller_dir: "Dinamic/Controller".to_string(),
            controller_extension: "rs".to_string(),
            routes_file: "MyFiles/routes.json".to_string(),
            error_lookup_url: "/errors/".to_string(),
        }
    }
}

impl KernelSection {
    /// Absolute-or-relative path of the route override document.
    pub fn routes_path(&self) -> PathBuf {
        self.install_root.join(&self.routes_file)
    }

    /// Path of the controller discovery directory.
    pub fn controller_path(&self) -> PathBuf {
        self.install_root.join(&self.controller_dir)
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
