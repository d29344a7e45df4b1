//! Buffered response written by handlers.
//!
//! # Responsibilities
//! - Accumulate status, headers and body while a handler runs
//! - Allow the fatal path to discard partial output
//! - Convert into an axum response at the HTTP boundary
//!
//! # Design Decisions
//! - Fully buffered: nothing reaches the client until the kernel returns,
//!   which is what makes "discard buffered output" possible
//! - Invalid header values are dropped rather than failing the response

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response as AxumResponse};
use serde::Serialize;

/// Response under construction.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    /// Empty `200 OK` response.
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Set a header, replacing any previous value.
    pub fn set_header(&mut self, name: &str, value: &str) {
        let name = match HeaderName::from_bytes(name.as_bytes()) {
            Ok(n) => n,
            Err(_) => return,
        };
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
    }

    /// Value of the `Content-Type` header, if set.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body as UTF-8 text (lossy).
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Append bytes to the buffered body.
    pub fn write(&mut self, bytes: impl AsRef<[u8]>) {
        self.body.extend_from_slice(bytes.as_ref());
    }

    /// Discard any buffered body and headers, keeping the status.
    pub fn clear(&mut self) {
        self.body.clear();
        self.headers.clear();
    }

    /// Replace the body with an HTML document.
    pub fn html(&mut self, status: StatusCode, html: impl Into<String>) {
        self.clear();
        self.status = status;
        self.set_header(header::CONTENT_TYPE.as_str(), "text/html; charset=utf-8");
        self.body = html.into().into_bytes();
    }

    /// Replace the body with a JSON document. Serialization failures leave an
    /// empty JSON object.
    pub fn json<T: Serialize>(&mut self, status: StatusCode, value: &T) {
        self.clear();
        self.status = status;
        self.set_header(header::CONTENT_TYPE.as_str(), "application/json");
        self.body = serde_json::to_vec(value).unwrap_or_else(|_| b"{}".to_vec());
    }
}

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

impl IntoResponse for Response {
    fn into_response(self) -> AxumResponse {
        let mut response = AxumResponse::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}
