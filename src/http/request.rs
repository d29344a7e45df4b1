//! Request view handed to the kernel.
//!
//! # Responsibilities
//! - Carry the routing-relevant parts of an HTTP request (path, content type)
//! - Carry the request ID used for log correlation
//! - Answer the content-negotiation question (structured data or HTML)
//!
//! # Design Decisions
//! - Independent of axum so the kernel can run from the CLI and from tests
//! - Request ID added as early as possible for tracing

use axum::http::{header, HeaderMap, Method};
use uuid::Uuid;

/// Header used to propagate the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// A request as seen by the routing kernel.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Raw request path, base path included.
    pub path: String,
    /// Query string without the leading `?`.
    pub query: Option<String>,
    /// Value of the `Content-Type` header.
    pub content_type: Option<String>,
    /// Correlation ID.
    pub request_id: String,
}

impl Request {
    /// A GET request for `path` with a fresh request ID.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: None,
            content_type: None,
            request_id: Uuid::new_v4().to_string(),
        }
    }

    /// Set the content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Build from HTTP parts, reusing an inbound `x-request-id` when present.
    pub fn from_parts(method: Method, path: &str, query: Option<&str>, headers: &HeaderMap) -> Self {
        let request_id = headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Self {
            method,
            path: path.to_string(),
            query: query.map(str::to_string),
            content_type,
            request_id,
        }
    }

    /// True when the client declared a structured-data (JSON) exchange.
    pub fn wants_json(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| {
                let mime = ct.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
                mime == "application/json" || mime.ends_with("+json")
            })
            .unwrap_or(false)
    }
}
