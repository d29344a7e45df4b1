//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (method, path, content type, request ID)
//!     → Kernel::run on a blocking thread
//!     → response.rs (status, headers, body)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{Request, X_REQUEST_ID};
pub use response::Response;
pub use server::{HttpServer, ServerError};
