//! Fatal diagnostic rendering.
//!
//! # Responsibilities
//! - Derive the deterministic lookup hash of a fault
//! - Render the JSON body and the static HTML diagnostic page
//!
//! # Design Decisions
//! - Hash input: kind + file relative to install root + line + message with
//!   its trailing " in <file>" suffix removed, concatenated without separators
//! - Rendering is infallible; missing fields render as empty

use std::path::Path;

use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use crate::fatal::fault::Fault;
use crate::http::response::escape_html;

/// `file` relative to `install_root` when it lies below it.
pub fn relative_file(file: &str, install_root: &Path) -> String {
    Path::new(file)
        .strip_prefix(install_root)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| file.to_string())
}

/// `message` without a trailing `" in <file>..."` suffix.
pub fn strip_in_file<'m>(message: &'m str, file: &str) -> &'m str {
    if file.is_empty() {
        return message;
    }
    match message.rfind(&format!(" in {file}")) {
        Some(idx) => &message[..idx],
        None => message,
    }
}

/// Lowercase hex SHA-256 identifying the fault for the lookup service.
pub fn lookup_hash(fault: &Fault, install_root: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(fault.kind.as_bytes());
    hasher.update(relative_file(&fault.file, install_root).as_bytes());
    hasher.update(fault.line.to_string().as_bytes());
    hasher.update(strip_in_file(&fault.message, &fault.file).as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Structured error body.
pub fn json_body(fault: &Fault) -> Value {
    json!({ "error": fault.message })
}

/// Static diagnostic page.
pub fn render_html(fault: &Fault, install_root: &Path, lookup_url: &str, request_id: &str) -> String {
    let hash = lookup_hash(fault, install_root);
    let link = format!("{lookup_url}{hash}");
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Fatal error</title>
</head>
<body>
<h1>Fatal error</h1>
<table>
<tr><th>Type</th><td>{kind}</td></tr>
<tr><th>Message</th><td>{message}</td></tr>
<tr><th>File</th><td>{file}</td></tr>
<tr><th>Line</th><td>{line}</td></tr>
<tr><th>Request</th><td>{request_id}</td></tr>
</table>
<p><a href="{link}">{hash}</a></p>
</body>
</html>
"#,
        kind = escape_html(&fault.kind),
        message = escape_html(&fault.message),
        file = escape_html(&relative_file(&fault.file, install_root)),
        line = fault.line,
        request_id = escape_html(request_id),
        link = escape_html(&link),
        hash = hash,
    )
}
