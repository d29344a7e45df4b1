//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     Ctrl+C or explicit trigger → broadcast → server drains → exit
//! ```
//!
//! # Design Decisions
//! - Startup order lives in the binary: config, logging, kernel, listeners
//! - Every long-running task subscribes to one shutdown broadcast

pub mod shutdown;

pub use shutdown::Shutdown;
