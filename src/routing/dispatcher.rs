//! Request dispatch.
//!
//! # Responsibilities
//! - Strip the configured base path to obtain the routing key
//! - Find the first matching route in registry order
//! - Construct the route's handler and invoke it
//!
//! # Design Decisions
//! - Linear scan over a sorted snapshot: same snapshot + path, same result
//! - First match wins; an exhausted scan is `PageNotFound`
//! - Resolution and invocation are separate so callers can inspect targets

use crate::error::KernelError;
use crate::handler::HandlerRegistry;
use crate::http::{Request, Response};
use crate::routing::registry::RouteRegistry;
use crate::routing::route::{self, Route};

/// The route chosen for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchTarget {
    /// Pattern of the matched route.
    pub pattern: String,
    /// Metadata of the matched route.
    pub route: Route,
    /// Request path with the base path removed.
    pub routing_key: String,
}

impl DispatchTarget {
    pub fn handler(&self) -> &str {
        &self.route.handler
    }
}

/// Dispatches request paths over a registry snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'a> {
    registry: &'a RouteRegistry,
    base_path: &'a str,
}

impl<'a> Dispatcher<'a> {
    pub fn new(registry: &'a RouteRegistry, base_path: &'a str) -> Self {
        Self { registry, base_path }
    }

    /// Remove the base path prefix on a segment boundary. An empty remainder
    /// becomes `/`.
    pub fn routing_key(&self, raw_path: &str) -> String {
        let key = if self.base_path.is_empty() {
            raw_path
        } else {
            raw_path
                .strip_prefix(self.base_path)
                .filter(|rest| rest.is_empty() || rest.starts_with('/'))
                .unwrap_or(raw_path)
        };
        if key.is_empty() {
            "/".to_string()
        } else {
            key.to_string()
        }
    }

    /// Find the first route matching `raw_path`.
    pub fn resolve(&self, raw_path: &str) -> Result<DispatchTarget, KernelError> {
        let key = self.routing_key(raw_path);
        self.registry
            .iter()
            .find(|(pattern, _)| route::matches(pattern, &key))
            .map(|(pattern, route)| DispatchTarget {
                pattern: pattern.to_string(),
                route: route.clone(),
                routing_key: key.clone(),
            })
            .ok_or_else(|| {
                tracing::warn!(path = %raw_path, key = %key, "No route matched");
                KernelError::PageNotFound {
                    path: raw_path.to_string(),
                }
            })
    }

    /// Resolve `request.path`, construct the handler and run it.
    pub fn dispatch(
        &self,
        handlers: &HandlerRegistry,
        request: &Request,
        response: &mut Response,
    ) -> Result<DispatchTarget, KernelError> {
        let target = self.resolve(&request.path)?;
        tracing::debug!(
            request_id = %request.request_id,
            route = %target.pattern,
            handler = %target.handler(),
            key = %target.routing_key,
            "Dispatching"
        );

        let mut handler = handlers.construct(target.handler(), &target.pattern, &target.routing_key)?;
        handler.run(request, response)?;
        Ok(target)
    }
}
