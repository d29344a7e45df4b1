//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Loading (at boot, on rebuild, on override change):
//!     loader.rs
//!         → default catalog (installer set when not installed)
//!         → persisted overrides (load) | homepage + discovery.rs + callbacks (rebuild)
//!         → registry.rs stable sort by priority
//!     → swapped into the kernel as an immutable snapshot
//!
//! Incoming Request (path)
//!     → dispatcher.rs (strip base path, linear scan)
//!     → route.rs (exact or wildcard-prefix match)
//!     → Return: DispatchTarget or PageNotFound
//! ```
//!
//! # Design Decisions
//! - Registry is rebuilt whole, never patched under readers
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same snapshot and path always match the same route
//! - First match wins (ordered by priority, then insertion)

pub mod discovery;
pub mod dispatcher;
pub mod loader;
pub mod registry;
pub mod route;
pub mod watcher;

pub use dispatcher::{DispatchTarget, Dispatcher};
pub use loader::{RouteCallback, RouteLoader};
pub use registry::RouteRegistry;
pub use route::Route;
