//! Request handlers.
//!
//! # Data Flow
//! ```text
//! DispatchTarget (route, routing key)
//!     → registry.rs (identifier → constructor)
//!     → fresh Box<dyn Handler> for this request only
//!     → Handler::run writes the buffered Response
//! ```
//!
//! # Design Decisions
//! - Handlers are never cached or shared between requests
//! - A handler failure is an ordinary `KernelError`, handled by `error`

pub mod files;
pub mod placeholder;
pub mod registry;

use std::path::PathBuf;

use crate::error::KernelError;
use crate::http::{Request, Response};
use crate::routing::loader::{FILES_HANDLER, USER_FILES_HANDLER};

pub use files::Files;
pub use placeholder::{Placeholder, PLACEHOLDER_IDS};
pub use registry::{HandlerFactory, HandlerRegistry};

/// A unit constructed per matched request.
pub trait Handler: Send {
    fn run(&mut self, request: &Request, response: &mut Response) -> Result<(), KernelError>;
}

impl HandlerRegistry {
    /// Registry with the built-in handlers: `Files` and `Myfiles` serve from
    /// `install_root`, the other catalog ids answer with a placeholder page.
    pub fn with_builtins(install_root: impl Into<PathBuf>) -> Self {
        let root = install_root.into();
        let mut registry = Self::new();
        for id in PLACEHOLDER_IDS {
            registry.register(id, |name, key| Box::new(Placeholder::new(name, key)));
        }
        for id in [FILES_HANDLER, USER_FILES_HANDLER] {
            let root = root.clone();
            registry.register(id, move |_name, uri| Box::new(Files::new(root.clone(), uri)));
        }
        registry
    }
}
