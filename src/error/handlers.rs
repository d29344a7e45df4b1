//! Error handler selection and the built-in handlers.
//!
//! # Responsibilities
//! - Map a failure kind to an error-handler constructor
//! - Prefer site-specific overrides over built-ins of the same name
//! - Fall back to `DefaultError` for untagged or unknown kinds
//!
//! # Design Decisions
//! - Constructors are registered at startup; no lookup by type name at runtime
//! - Handlers own the whole response and clear any partial output first

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

use crate::error::KernelError;
use crate::http::response::escape_html;
use crate::http::{Request, Response};

/// Produces the response for a caught application failure.
pub trait ErrorHandler: Send {
    fn run(&mut self, request: &Request, response: &mut Response);
}

/// Constructor for an error handler, fed with the failure it handles.
pub type ErrorHandlerFactory = Arc<dyn Fn(KernelError) -> Box<dyn ErrorHandler> + Send + Sync>;

/// Where a resolved error handler came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerSource {
    Override,
    Builtin,
    Default,
}

/// Registry of error handlers by name.
#[derive(Clone, Default)]
pub struct ErrorHandlerRegistry {
    overrides: HashMap<String, ErrorHandlerFactory>,
    builtins: HashMap<String, ErrorHandlerFactory>,
}

impl std::fmt::Debug for ErrorHandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorHandlerRegistry")
            .field("overrides", &self.overrides.keys().collect::<Vec<_>>())
            .field("builtins", &self.builtins.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ErrorHandlerRegistry {
    /// Empty registry; every failure goes to `DefaultError`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in `PageNotFound` handler.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_builtin("PageNotFound", |err| Box::new(PageNotFound::new(err)));
        registry
    }

    /// Register a built-in handler.
    pub fn register_builtin<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(KernelError) -> Box<dyn ErrorHandler> + Send + Sync + 'static,
    {
        self.builtins.insert(name.into(), Arc::new(factory));
    }

    /// Register a site-specific handler that shadows a built-in of the same name.
    pub fn register_override<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(KernelError) -> Box<dyn ErrorHandler> + Send + Sync + 'static,
    {
        self.overrides.insert(name.into(), Arc::new(factory));
    }

    /// Pick the constructor for `err`.
    pub fn select(&self, err: &KernelError) -> (HandlerSource, Option<ErrorHandlerFactory>) {
        let kind = err.kind();
        let Some(name) = kind.handler_name() else {
            return (HandlerSource::Default, None);
        };
        if let Some(factory) = self.overrides.get(name) {
            return (HandlerSource::Override, Some(factory.clone()));
        }
        if let Some(factory) = self.builtins.get(name) {
            return (HandlerSource::Builtin, Some(factory.clone()));
        }
        (HandlerSource::Default, None)
    }

    /// Construct the handler for `err`, along with where it came from.
    pub fn resolve(&self, err: KernelError) -> (HandlerSource, Box<dyn ErrorHandler>) {
        match self.select(&err) {
            (source, Some(factory)) => (source, factory(err)),
            (source, None) => (source, Box::new(DefaultError::new(err))),
        }
    }

    /// Resolve and run the handler for `err`.
    pub fn handle(&self, err: KernelError, request: &Request, response: &mut Response) {
        let kind = err.kind();
        let message = err.to_string();
        let (source, mut handler) = self.resolve(err);
        tracing::info!(
            request_id = %request.request_id,
            kind = ?kind,
            source = ?source,
            error = %message,
            "Dispatching to error handler"
        );
        handler.run(request, response);
    }
}

/// Generic handler for any failure without a dedicated handler.
#[derive(Debug)]
pub struct DefaultError {
    error: KernelError,
}

impl DefaultError {
    pub fn new(error: KernelError) -> Self {
        Self { error }
    }
}

impl ErrorHandler for DefaultError {
    fn run(&mut self, request: &Request, response: &mut Response) {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        let message = self.error.to_string();
        if request.wants_json() {
            response.json(status, &json!({ "error": message }));
            return;
        }
        response.html(
            status,
            format!(
                "<!DOCTYPE html>\n<html><head><title>Error</title></head>\
                 <body><h1>Error</h1><p>{}</p></body></html>\n",
                escape_html(&message)
            ),
        );
    }
}

/// Handler for routing misses.
#[derive(Debug)]
pub struct PageNotFound {
    error: KernelError,
}

impl PageNotFound {
    pub fn new(error: KernelError) -> Self {
        Self { error }
    }
}

impl ErrorHandler for PageNotFound {
    fn run(&mut self, request: &Request, response: &mut Response) {
        let status = StatusCode::NOT_FOUND;
        let path = self.error.path().unwrap_or(&request.path).to_string();
        if request.wants_json() {
            response.json(status, &json!({ "error": "Page not found", "path": path }));
            return;
        }
        response.html(
            status,
            format!(
                "<!DOCTYPE html>\n<html><head><title>Page not found</title></head>\
                 <body><h1>Page not found</h1><p>{}</p></body></html>\n",
                escape_html(&path)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker(&'static str);

    impl ErrorHandler for Marker {
        fn run(&mut self, _request: &Request, response: &mut Response) {
            response.html(StatusCode::IM_A_TEAPOT, self.0);
        }
    }

    fn not_found() -> KernelError {
        KernelError::PageNotFound { path: "/missing".into() }
    }

    #[test]
    fn test_untagged_goes_to_default() {
        let registry = ErrorHandlerRegistry::with_builtins();
        let (source, factory) = registry.select(&KernelError::Internal("x".into()));
        assert_eq!(source, HandlerSource::Default);
        assert!(factory.is_none());

        let mut res = Response::new();
        registry.handle(KernelError::Internal("boom".into()), &Request::get("/"), &mut res);
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(res.text().contains("boom"));
    }

    #[test]
    fn test_override_shadows_builtin() {
        let mut registry = ErrorHandlerRegistry::with_builtins();
        assert_eq!(registry.select(&not_found()).0, HandlerSource::Builtin);

        registry.register_override("PageNotFound", |_| Box::new(Marker("site")));
        assert_eq!(registry.select(&not_found()).0, HandlerSource::Override);

        let mut res = Response::new();
        registry.handle(not_found(), &Request::get("/missing"), &mut res);
        assert_eq!(res.status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(res.text(), "site");
    }

    #[test]
    fn test_resolve_reports_source_and_builds_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let built = Arc::new(AtomicUsize::new(0));
        let counter = built.clone();
        let mut registry = ErrorHandlerRegistry::with_builtins();
        registry.register_override("AccessDenied", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Box::new(Marker("denied"))
        });

        let (source, _) = registry.resolve(KernelError::tagged("AccessDenied", "no"));
        assert_eq!(source, HandlerSource::Override);
        assert_eq!(registry.resolve(not_found()).0, HandlerSource::Builtin);
        assert_eq!(registry.resolve(KernelError::Internal("x".into())).0, HandlerSource::Default);

        built.store(0, Ordering::SeqCst);
        let mut res = Response::new();
        registry.handle(KernelError::tagged("AccessDenied", "no"), &Request::get("/"), &mut res);
        assert_eq!(built.load(Ordering::SeqCst), 1);
        assert_eq!(res.text(), "denied");
    }

    #[test]
    fn test_unknown_tag_falls_back_to_default() {
        let registry = ErrorHandlerRegistry::with_builtins();
        let err = KernelError::tagged("NoSuchHandler", "denied");
        assert_eq!(registry.select(&err).0, HandlerSource::Default);

        let mut res = Response::new();
        registry.handle(err, &Request::get("/x").with_content_type("application/json"), &mut res);
        let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body, json!({ "error": "denied" }));
    }

    #[test]
    fn test_page_not_found_negotiates() {
        let registry = ErrorHandlerRegistry::with_builtins();

        let mut html = Response::new();
        html.write("partial");
        registry.handle(not_found(), &Request::get("/missing"), &mut html);
        assert_eq!(html.status(), StatusCode::NOT_FOUND);
        assert!(html.text().contains("/missing"));
        assert!(!html.text().contains("partial"));

        let mut js = Response::new();
        let req = Request::get("/missing").with_content_type("application/json");
        registry.handle(not_found(), &req, &mut js);
        let body: serde_json::Value = serde_json::from_slice(js.body()).unwrap();
        assert_eq!(body["path"], "/missing");
    }
}
