//! Handler constructors by identifier.
//!
//! # Responsibilities
//! - Map handler identifiers to constructors, populated at startup
//! - Construct a fresh handler per request
//!
//! # Design Decisions
//! - Exact identifier first, then its short name, so namespace-qualified
//!   discovered routes resolve to plainly registered handlers
//! - An unknown identifier is an explicit `HandlerNotFound` error

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::KernelError;
use crate::handler::Handler;
use crate::routing::route::short_name;

/// Constructor fed with `(short name, routing key)`.
pub type HandlerFactory = Arc<dyn Fn(&str, &str) -> Box<dyn Handler> + Send + Sync>;

/// Registry of handler constructors.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    factories: HashMap<String, HandlerFactory>,
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<_> = self.factories.keys().collect();
        ids.sort();
        f.debug_struct("HandlerRegistry").field("handlers", &ids).finish()
    }
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor under `id`, replacing any previous one.
    pub fn register<F>(&mut self, id: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&str, &str) -> Box<dyn Handler> + Send + Sync + 'static,
    {
        self.factories.insert(id.into(), Arc::new(factory));
        self
    }

    /// True when `id` (or its short name) resolves.
    pub fn contains(&self, id: &str) -> bool {
        self.lookup(id).is_some()
    }

    fn lookup(&self, id: &str) -> Option<&HandlerFactory> {
        self.factories
            .get(id)
            .or_else(|| self.factories.get(short_name(id)))
    }

    /// Construct the handler for `id`.
    pub fn construct(&self, id: &str, pattern: &str, routing_key: &str) -> Result<Box<dyn Handler>, KernelError> {
        let factory = self.lookup(id).ok_or_else(|| KernelError::HandlerNotFound {
            handler: id.to_string(),
            pattern: pattern.to_string(),
        })?;
        Ok(factory(short_name(id), routing_key))
    }
}
