//! Stand-in pages for the catalog handlers.
//!
//! A host replaces these by registering its own handler under the same id.

use axum::http::StatusCode;
use serde_json::json;

use crate::error::KernelError;
use crate::handler::Handler;
use crate::http::response::escape_html;
use crate::http::{Request, Response};

/// Catalog ids served by a placeholder until the host registers a real handler.
pub const PLACEHOLDER_IDS: [&str; 7] = [
    "AdminPlugins",
    "ApiRoot",
    "Cron",
    "Dashboard",
    "Deploy",
    "Installer",
    "Login",
];

/// Answers 200 with the handler name and routing key.
#[derive(Debug)]
pub struct Placeholder {
    name: String,
    key: String,
}

impl Placeholder {
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
        }
    }
}

impl Handler for Placeholder {
    fn run(&mut self, request: &Request, response: &mut Response) -> Result<(), KernelError> {
        if request.wants_json() {
            response.json(StatusCode::OK, &json!({ "handler": self.name, "path": self.key }));
            return Ok(());
        }
        response.html(
            StatusCode::OK,
            format!(
                "<!DOCTYPE html>\n<html><head><title>{name}</title></head>\
                 <body><h1>{name}</h1><p>{key}</p></body></html>\n",
                name = escape_html(&self.name),
                key = escape_html(&self.key),
            ),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_and_html() {
        let mut page = Placeholder::new("Login", "/login");

        let mut res = Response::new();
        page.run(&Request::get("/login").with_content_type("application/json"), &mut res)
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body, json!({ "handler": "Login", "path": "/login" }));

        let mut res = Response::new();
        page.run(&Request::get("/login"), &mut res).unwrap();
        assert!(res.text().contains("<h1>Login</h1>"));
    }
}
