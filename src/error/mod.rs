//! Application-level failures and their dispatch to error handlers.
//!
//! # Data Flow
//! ```text
//! route loading / dispatch / handler
//!     → KernelError { kind, path, message }
//!     → Kernel::run catches at the top-level boundary
//!     → handlers.rs resolves an ErrorHandler by kind:
//!         site override → built-in of the same name → DefaultError
//!     → ErrorHandler::run writes the (content-negotiated) response
//! ```
//!
//! # Design Decisions
//! - Routing misses are plain `Err` values, never unwinding
//! - Every caught failure is handled exactly once, by exactly one handler
//! - Low-level failures (panics) are NOT represented here; see `fatal`

pub mod handlers;

use thiserror::Error;

pub use handlers::{DefaultError, ErrorHandler, ErrorHandlerRegistry, PageNotFound};

/// Kind of an application failure; selects the error handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// No route matched the request path.
    PageNotFound,
    /// A route matched but its handler identifier is not registered.
    HandlerNotFound,
    /// Failure tagged with an explicit error-handler name.
    Handler(String),
    /// Untagged failure; always handled by the generic handler.
    Internal,
}

impl ErrorKind {
    /// Name used to look up a dedicated error handler, if the kind carries one.
    pub fn handler_name(&self) -> Option<&str> {
        match self {
            ErrorKind::PageNotFound => Some("PageNotFound"),
            ErrorKind::Handler(name) if !name.is_empty() => Some(name.as_str()),
            ErrorKind::Handler(_) | ErrorKind::HandlerNotFound | ErrorKind::Internal => None,
        }
    }
}

/// Errors raised while loading routes or dispatching a request.
#[derive(Debug, Clone, Error)]
pub enum KernelError {
    /// No registered route matched.
    #[error("page not found: {path}")]
    PageNotFound { path: String },

    /// The matched route names a handler nobody registered.
    #[error("handler {handler} not registered (route {pattern})")]
    HandlerNotFound { handler: String, pattern: String },

    /// A failure that asks for a specific error handler.
    #[error("{message}")]
    Tagged { handler: String, message: String },

    /// Anything else.
    #[error("{0}")]
    Internal(String),
}

impl KernelError {
    /// Build a failure routed to the error handler named `handler`.
    pub fn tagged(handler: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tagged {
            handler: handler.into(),
            message: message.into(),
        }
    }

    /// The kind used for error-handler selection.
    pub fn kind(&self) -> ErrorKind {
        match self {
            KernelError::PageNotFound { .. } => ErrorKind::PageNotFound,
            KernelError::HandlerNotFound { .. } => ErrorKind::HandlerNotFound,
            KernelError::Tagged { handler, .. } => ErrorKind::Handler(handler.clone()),
            KernelError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// The request path this failure refers to, when known.
    pub fn path(&self) -> Option<&str> {
        match self {
            KernelError::PageNotFound { path } => Some(path),
            _ => None,
        }
    }
}
