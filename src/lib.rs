//! Request-routing kernel.
//!
//! Maps incoming request paths to named handlers through an ordered,
//! persistable route registry, dispatches to them, and guarantees a
//! response even when a handler fails or panics.

pub mod config;
pub mod error;
pub mod fatal;
pub mod handler;
pub mod http;
pub mod kernel;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::KernelConfig;
pub use error::KernelError;
pub use handler::Handler;
pub use http::{HttpServer, Request, Response};
pub use kernel::{Kernel, KernelBuilder};
pub use lifecycle::Shutdown;
