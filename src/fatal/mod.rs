//! Last-resort failure handling.
//!
//! # Data Flow
//! ```text
//! Kernel::run
//!     → FatalGuard::arm (clears the thread's fault slot, owns the Response)
//!     → dispatch inside catch_unwind
//!         panic → hook stashes it; escaped panic → Fault in fault.rs slot
//!     → FatalGuard::finish (or Drop, if unwinding got past us)
//!         no fault  → response untouched
//!         fault     → discard output, 500, JSON or page.rs HTML
//! ```
//!
//! # Design Decisions
//! - Runs exactly once per request (`finish` and `Drop` share one flag)
//! - Never panics itself: every step is infallible
//! - The error dispatcher clears the slot before handling, so a caught
//!   failure never also triggers this path

pub mod fault;
pub mod page;

use std::mem;
use std::path::Path;

use axum::http::StatusCode;

use crate::http::{Request, Response};
use crate::observability::metrics;

pub use fault::Fault;

/// Guard owning the response of one request until the fatal check has run.
pub struct FatalGuard<'a> {
    request: &'a Request,
    install_root: &'a Path,
    lookup_url: &'a str,
    response: Response,
    done: bool,
}

impl<'a> FatalGuard<'a> {
    /// Start guarding a request.
    pub fn arm(request: &'a Request, install_root: &'a Path, lookup_url: &'a str) -> Self {
        fault::clear();
        fault::discard_panic();
        Self {
            request,
            install_root,
            lookup_url,
            response: Response::new(),
            done: false,
        }
    }

    pub fn response_mut(&mut self) -> &mut Response {
        &mut self.response
    }

    /// Run the fatal check and hand out the final response.
    pub fn finish(mut self) -> Response {
        self.check();
        mem::take(&mut self.response)
    }

    fn check(&mut self) {
        if self.done {
            return;
        }
        self.done = true;
        if let Some(fault) = fault::take() {
            report(&fault, self.request, &mut self.response, self.install_root, self.lookup_url);
        }
    }
}

impl Drop for FatalGuard<'_> {
    fn drop(&mut self) {
        self.check();
    }
}

/// Replace whatever `response` holds with a diagnostic for `fault`.
pub fn report(fault: &Fault, request: &Request, response: &mut Response, install_root: &Path, lookup_url: &str) {
    tracing::error!(
        request_id = %request.request_id,
        kind = %fault.kind,
        file = %fault.file,
        line = fault.line,
        message = %fault.message,
        "Fatal error"
    );
    metrics::record_fatal();

    response.clear();
    let status = StatusCode::INTERNAL_SERVER_ERROR;
    if request.wants_json() {
        response.json(status, &page::json_body(fault));
        return;
    }
    response.html(
        status,
        page::render_html(fault, install_root, lookup_url, &request.request_id),
    );
}
