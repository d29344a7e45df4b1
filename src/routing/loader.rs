//! Route loading pipeline.
//!
//! # Responsibilities
//! - Register the built-in default routes (installer set when not installed)
//! - Merge the persisted override document (`load`)
//! - Discover controllers and run extension callbacks (`rebuild`)
//! - Leave the registry sorted by priority
//!
//! # Design Decisions
//! - Every call builds a fresh registry; callers swap it in whole
//! - Defaults use priority 1, everything else defaults to 0. With a stable
//!   sort this puts priority-0 routes ahead of the defaults
//! - Not-installed mode returns early: no overrides, discovery or callbacks

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{ConfigReader, SettingsReader};
use crate::routing::discovery::ControllerSource;
use crate::routing::registry::RouteRegistry;

/// Extension hook run against the mutable registry during `rebuild`.
pub type RouteCallback = Arc<dyn Fn(&mut RouteRegistry) + Send + Sync>;

/// Priority given to every built-in default route.
pub const DEFAULT_ROUTE_PRIORITY: i32 = 1;

/// Namespace prefixed to discovered controller names.
pub const DISCOVERED_NAMESPACE: &str = "Dinamic::Controller::";

/// Handler serving the static-asset passthroughs.
pub const FILES_HANDLER: &str = "Files";

/// Handler serving `/MyFiles/*`.
pub const USER_FILES_HANDLER: &str = "Myfiles";

/// Handler bound to every path before installation.
pub const INSTALLER_HANDLER: &str = "Installer";

/// Homepage used when `settings.default.homepage` is unset.
pub const DEFAULT_HOMEPAGE: &str = "Dashboard";

const INSTALLER_ASSETS: [&str; 2] = ["/Core/Assets/*", "/node_modules/*"];

const DEFAULT_ROUTES: [(&str, &str); 12] = [
    ("/", DEFAULT_HOMEPAGE),
    ("/AdminPlugins", "AdminPlugins"),
    ("/api", "ApiRoot"),
    ("/api/*", "ApiRoot"),
    ("/Core/Assets/*", FILES_HANDLER),
    ("/cron", "Cron"),
    ("/deploy", "Deploy"),
    ("/Dinamic/Assets/*", FILES_HANDLER),
    ("/login", "Login"),
    ("/MyFiles/*", USER_FILES_HANDLER),
    ("/node_modules/*", FILES_HANDLER),
    ("/Plugins/*", FILES_HANDLER),
];

/// Distinct handler ids named by the default catalog.
pub fn default_handler_ids() -> Vec<&'static str> {
    let mut ids: Vec<&'static str> = DEFAULT_ROUTES.iter().map(|(_, h)| *h).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Builds route registries from defaults, overrides, discovery and callbacks.
pub struct RouteLoader<'a> {
    config: &'a dyn ConfigReader,
    settings: &'a dyn SettingsReader,
    controllers: &'a dyn ControllerSource,
    callbacks: &'a [RouteCallback],
    routes_file: PathBuf,
}

impl<'a> RouteLoader<'a> {
    pub fn new(
        config: &'a dyn ConfigReader,
        settings: &'a dyn SettingsReader,
        controllers: &'a dyn ControllerSource,
        routes_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            config,
            settings,
            controllers,
            callbacks: &[],
            routes_file: routes_file.into(),
        }
    }

    /// Extension callbacks run by `rebuild`, in order.
    pub fn with_callbacks(mut self, callbacks: &'a [RouteCallback]) -> Self {
        self.callbacks = callbacks;
        self
    }

    /// An empty database name means the application is not installed.
    pub fn is_installed(&self) -> bool {
        !self.config.get("db_name", "").is_empty()
    }

    /// Defaults plus persisted overrides, sorted.
    pub fn load(&self) -> RouteRegistry {
        let mut registry = RouteRegistry::new();
        if !self.load_defaults(&mut registry) {
            registry.sort();
            return registry;
        }

        registry.merge_overrides(&self.routes_file);
        registry.sort();

        tracing::info!(routes = registry.len(), "Routes loaded");
        registry
    }

    /// Defaults, homepage, discovered controllers and callbacks, sorted.
    ///
    /// Deterministic for a given configuration, directory content and set of
    /// (idempotent) callbacks.
    pub fn rebuild(&self) -> RouteRegistry {
        let mut registry = RouteRegistry::new();
        if !self.load_defaults(&mut registry) {
            registry.sort();
            return registry;
        }

        let homepage = self.settings.get_str("default", "homepage", DEFAULT_HOMEPAGE);
        registry.add_route("/", homepage, DEFAULT_ROUTE_PRIORITY, "");

        for name in self.controllers.controllers() {
            if name == INSTALLER_HANDLER {
                continue;
            }
            registry.add_route(format!("/{name}"), format!("{DISCOVERED_NAMESPACE}{name}"), 0, "");
        }

        for callback in self.callbacks {
            callback(&mut registry);
        }

        registry.sort();
        tracing::info!(
            routes = registry.len(),
            callbacks = self.callbacks.len(),
            "Routes rebuilt"
        );
        registry
    }

    /// Register the default catalog. Returns `false` in not-installed mode,
    /// where only the installer set is registered.
    fn load_defaults(&self, registry: &mut RouteRegistry) -> bool {
        if !self.is_installed() {
            for pattern in INSTALLER_ASSETS {
                registry.add_route(pattern, FILES_HANDLER, DEFAULT_ROUTE_PRIORITY, "");
            }
            registry.add_route("*", INSTALLER_HANDLER, DEFAULT_ROUTE_PRIORITY, "");
            tracing::info!("No database configured, installer routes only");
            return false;
        }

        for (pattern, handler) in DEFAULT_ROUTES {
            registry.add_route(pattern, handler, DEFAULT_ROUTE_PRIORITY, "");
        }
        true
    }
}
