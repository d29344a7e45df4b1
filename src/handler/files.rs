//! Static asset passthrough.
//!
//! # Responsibilities
//! - Serve files below the installation root for the asset routes
//! - Derive the content type from the file extension
//!
//! # Design Decisions
//! - `..` segments and paths escaping the root are treated as missing
//! - Misses surface as `PageNotFound`, handled like any routing miss

use std::fs;
use std::path::{Component, Path, PathBuf};

use axum::http::{header, StatusCode};

use crate::error::KernelError;
use crate::handler::Handler;
use crate::http::{Request, Response};

/// Serves `<install_root>/<routing key>`.
#[derive(Debug)]
pub struct Files {
    root: PathBuf,
    uri: String,
}

impl Files {
    pub fn new(root: impl Into<PathBuf>, uri: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            uri: uri.into(),
        }
    }

    /// Resolve the request to a file path, refusing anything but plain segments.
    fn resolve(&self) -> Option<PathBuf> {
        let relative = Path::new(self.uri.trim_start_matches('/'));
        let mut path = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(segment) => path.push(segment),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(path).filter(|p| p.is_file())
    }
}

/// Content type for a file extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "css" => "text/css",
        "js" | "mjs" => "application/javascript",
        "json" | "map" => "application/json",
        "html" | "htm" => "text/html; charset=utf-8",
        "txt" => "text/plain; charset=utf-8",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "ico" => "image/x-icon",
        "webp" => "image/webp",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

impl Handler for Files {
    fn run(&mut self, _request: &Request, response: &mut Response) -> Result<(), KernelError> {
        let not_found = || KernelError::PageNotFound { path: self.uri.clone() };
        let path = self.resolve().ok_or_else(not_found)?;
        let bytes = fs::read(&path).map_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Cannot read asset");
            not_found()
        })?;

        response.clear();
        response.set_status(StatusCode::OK);
        response.set_header(header::CONTENT_TYPE.as_str(), content_type_for(&path));
        response.write(bytes);
        Ok(())
    }
}
