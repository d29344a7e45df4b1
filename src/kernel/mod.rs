//! The kernel context object.
//!
//! # Data Flow
//! ```text
//! Kernel::builder(config)
//!     → register handlers / error handlers / route callbacks
//!     → build(): panic hook, start time, locale, legacy constants, load()
//!
//! Kernel::run(request)
//!     → FatalGuard::arm
//!     → Dispatcher over the current registry snapshot
//!         Err(KernelError) → ErrorHandlerRegistry::handle
//!         escaped panic    → fault slot (recovered panics are dropped)
//!     → FatalGuard::finish → Response
//! ```
//!
//! # Design Decisions
//! - All process-wide state lives here and is passed by reference
//! - The registry is immutable once built; loads build a fresh one and swap
//!   it in atomically, so concurrent readers see either old or new, whole
//! - `run` never panics and always returns a response

pub mod state;

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use arc_swap::ArcSwap;

use crate::config::{ConfigReader, KernelConfig};
use crate::error::{ErrorHandler, ErrorHandlerRegistry, KernelError};
use crate::fatal::{fault, Fault, FatalGuard};
use crate::handler::{Handler, HandlerRegistry};
use crate::http::{Request, Response};
use crate::observability::metrics;
use crate::routing::discovery::{ControllerSource, DirectoryLister};
use crate::routing::dispatcher::{DispatchTarget, Dispatcher};
use crate::routing::loader::{RouteCallback, RouteLoader};
use crate::routing::registry::RouteRegistry;

use self::state::{legacy_constants, round_to, Timers};

/// Builder collecting everything registered at startup.
pub struct KernelBuilder {
    config: KernelConfig,
    handlers: HandlerRegistry,
    errors: ErrorHandlerRegistry,
    controllers: Option<Box<dyn ControllerSource>>,
    callbacks: Vec<RouteCallback>,
}

impl KernelBuilder {
    /// Register a request handler constructor.
    pub fn handler<F>(mut self, id: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&str, &str) -> Box<dyn Handler> + Send + Sync + 'static,
    {
        self.handlers.register(id, factory);
        self
    }

    /// Register a site-specific error handler.
    pub fn error_handler<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(KernelError) -> Box<dyn ErrorHandler> + Send + Sync + 'static,
    {
        self.errors.register_override(name, factory);
        self
    }

    /// Replace the filesystem controller discovery.
    pub fn controllers(mut self, source: impl ControllerSource + 'static) -> Self {
        self.controllers = Some(Box::new(source));
        self
    }

    /// Register a route extension callback run on every rebuild.
    pub fn routes<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut RouteRegistry) + Send + Sync + 'static,
    {
        self.callbacks.push(Arc::new(callback));
        self
    }

    /// Initialise process state and load routes.
    pub fn build(self) -> Kernel {
        fault::install_panic_hook();

        let config = Arc::new(self.config);
        let controllers = self.controllers.unwrap_or_else(|| {
            Box::new(DirectoryLister::new(
                config.kernel.controller_path(),
                config.kernel.controller_extension.clone(),
            ))
        });

        let kernel = Kernel {
            started: Instant::now(),
            lang: ConfigReader::get(&*config, "lang", "en_EN"),
            legacy: legacy_constants(&*config),
            routes: ArcSwap::from_pointee(RouteRegistry::new()),
            callbacks: Mutex::new(self.callbacks),
            timers: Timers::default(),
            handlers: self.handlers,
            errors: self.errors,
            controllers,
            config,
        };

        tracing::info!(
            lang = %kernel.lang,
            installed = kernel.is_installed(),
            base_path = %kernel.config.kernel.route,
            "Kernel initialised"
        );
        kernel.load_routes();
        kernel
    }
}

/// Process-wide kernel state.
pub struct Kernel {
    config: Arc<KernelConfig>,
    started: Instant,
    lang: String,
    legacy: BTreeMap<&'static str, String>,
    routes: ArcSwap<RouteRegistry>,
    callbacks: Mutex<Vec<RouteCallback>>,
    timers: Timers,
    handlers: HandlerRegistry,
    errors: ErrorHandlerRegistry,
    controllers: Box<dyn ControllerSource>,
}

impl std::fmt::Debug for Kernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kernel")
            .field("lang", &self.lang)
            .field("routes", &self.routes.load().len())
            .field("handlers", &self.handlers)
            .field("errors", &self.errors)
            .finish()
    }
}

impl Kernel {
    /// Builder with the built-in handlers and error handlers registered.
    pub fn builder(config: KernelConfig) -> KernelBuilder {
        let handlers = HandlerRegistry::with_builtins(config.kernel.install_root.clone());
        KernelBuilder {
            config,
            handlers,
            errors: ErrorHandlerRegistry::with_builtins(),
            controllers: None,
            callbacks: Vec::new(),
        }
    }

    /// Kernel with only the built-ins registered.
    pub fn init(config: KernelConfig) -> Self {
        Self::builder(config).build()
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn is_installed(&self) -> bool {
        !self.config.kernel.db_name.is_empty()
    }

    pub fn legacy_constant(&self, name: &str) -> Option<&str> {
        self.legacy.get(name).map(String::as_str)
    }

    /// Seconds since the kernel was built, rounded to `decimals`.
    pub fn execution_time(&self, decimals: u32) -> f64 {
        round_to(self.started.elapsed().as_secs_f64(), decimals)
    }

    pub fn start_timer(&self, name: &str) {
        self.timers.start(name);
    }

    /// Milliseconds since `start_timer(name)`; 0.0 for unknown timers.
    pub fn stop_timer(&self, name: &str) -> f64 {
        self.timers.stop(name)
    }

    /// Snapshot of the live registry.
    pub fn routes(&self) -> Arc<RouteRegistry> {
        self.routes.load_full()
    }

    /// Register a route on the live registry.
    pub fn add_route(&self, pattern: &str, handler: &str, priority: i32, override_key: &str) {
        self.routes.rcu(|current| {
            let mut next = RouteRegistry::clone(current);
            next.add_route(pattern, handler, priority, override_key);
            next
        });
    }

    /// Queue a route extension callback for the next rebuild.
    pub fn add_routes<F>(&self, callback: F)
    where
        F: Fn(&mut RouteRegistry) + Send + Sync + 'static,
    {
        self.callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(callback));
    }

    fn callbacks(&self) -> Vec<RouteCallback> {
        self.callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Path of the persisted override document.
    pub fn routes_path(&self) -> PathBuf {
        self.config.kernel.routes_path()
    }

    fn swap(&self, registry: RouteRegistry) -> usize {
        let count = registry.len();
        self.routes.store(Arc::new(registry));
        metrics::record_route_count(count);
        count
    }

    /// Replace the registry with defaults plus persisted overrides.
    pub fn load_routes(&self) -> usize {
        let loader = RouteLoader::new(
            &*self.config,
            &*self.config,
            &*self.controllers,
            self.routes_path(),
        );
        self.swap(loader.load())
    }

    /// Replace the registry with a full rebuild (discovery + callbacks).
    pub fn rebuild_routes(&self) -> usize {
        let callbacks = self.callbacks();
        let loader = RouteLoader::new(
            &*self.config,
            &*self.config,
            &*self.controllers,
            self.routes_path(),
        )
        .with_callbacks(&callbacks);
        self.swap(loader.rebuild())
    }

    /// Persist the live registry. `true` when written.
    pub fn save_routes(&self) -> bool {
        self.routes.load().save(&self.routes_path())
    }

    /// Which route `path` would dispatch to.
    pub fn resolve(&self, path: &str) -> Result<DispatchTarget, KernelError> {
        let registry = self.routes.load_full();
        Dispatcher::new(&registry, &self.config.kernel.route).resolve(path)
    }

    /// Handle one request. Always yields a response.
    pub fn run(&self, request: &Request) -> Response {
        let kernel = &self.config.kernel;
        let mut guard = FatalGuard::arm(request, &kernel.install_root, &kernel.error_lookup_url);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.handle(request, guard.response_mut());
        }));
        match outcome {
            Ok(()) => fault::discard_panic(),
            Err(payload) => {
                let escaped = fault::take_panic()
                    .unwrap_or_else(|| Fault::new("panic", fault::payload_message(&*payload), "", 0));
                fault::record(escaped);
            }
        }

        guard.finish()
    }

    fn handle(&self, request: &Request, response: &mut Response) {
        let registry = self.routes.load_full();
        let dispatcher = Dispatcher::new(&registry, &self.config.kernel.route);
        if let Err(err) = dispatcher.dispatch(&self.handlers, request, response) {
            if matches!(err, KernelError::PageNotFound { .. }) {
                metrics::record_dispatch_miss();
            }
            fault::clear();
            self.errors.handle(err, request, response);
        }
    }
}
