//! End-to-end routing tests through `Kernel::run`.

use axum::http::StatusCode;
use route_kernel::error::ErrorHandler;
use route_kernel::{Handler, KernelError, Request, Response};
use serde_json::{json, Value};

mod common;

use common::{echo, TestSite};

fn json_body(response: &Response) -> Value {
    serde_json::from_slice(response.body()).unwrap()
}

#[test]
fn test_not_installed_routes_everything_to_installer() {
    let site = TestSite::not_installed();
    site.write("Core/Assets/CSS/app.css", "body{}");
    let kernel = site.kernel();
    kernel.rebuild_routes();

    for path in ["/", "/AdminPlugins", "/anything/at/all"] {
        let res = kernel.run(&Request::get(path));
        assert_eq!(res.status(), StatusCode::OK, "{path}");
        assert!(res.text().starts_with("Installer"), "{path}");
    }

    let res = kernel.run(&Request::get("/Core/Assets/CSS/app.css"));
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.content_type(), Some("text/css"));
    assert_eq!(res.text(), "body{}");
}

#[test]
fn test_installed_defaults() {
    let site = TestSite::installed();
    let kernel = site.kernel();

    assert_eq!(kernel.run(&Request::get("/")).text(), "Dashboard /");
    assert_eq!(kernel.run(&Request::get("/AdminPlugins")).text(), "AdminPlugins /AdminPlugins");
    assert_eq!(kernel.resolve("/api/3/products").unwrap().handler(), "ApiRoot");
    assert_eq!(kernel.resolve("/MyFiles/doc.pdf").unwrap().handler(), "Myfiles");
}

#[test]
fn test_exact_and_wildcard_do_not_overlap() {
    let site = TestSite::installed();
    let kernel = site
        .builder()
        .handler("Exact", echo("Exact"))
        .handler("Nested", echo("Nested"))
        .build();
    kernel.add_route("/a", "Exact", 0, "");
    kernel.add_route("/a/*", "Nested", 0, "");

    assert_eq!(kernel.run(&Request::get("/a")).text(), "Exact /a");
    assert_eq!(kernel.run(&Request::get("/a/b/c")).text(), "Nested /a/b/c");
    assert_eq!(kernel.run(&Request::get("/ab")).status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_base_path_is_stripped_and_miss_reports_raw_path() {
    let mut site = TestSite::installed();
    site.config.kernel.route = "/erp".to_string();
    let kernel = site.kernel();

    assert_eq!(kernel.run(&Request::get("/erp")).text(), "Dashboard /");
    assert_eq!(kernel.run(&Request::get("/erp/AdminPlugins")).text(), "AdminPlugins /AdminPlugins");

    let res = kernel.run(&Request::get("/erp/nowhere").with_content_type("application/json"));
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        json_body(&res),
        json!({ "error": "Page not found", "path": "/erp/nowhere" })
    );
}

#[test]
fn test_priority_zero_shadows_default_homepage() {
    let site = TestSite::installed();
    let kernel = site.builder().handler("Landing", echo("Landing")).build();

    kernel.add_routes(|r| r.add_route("/", "Landing", 0, ""));
    kernel.rebuild_routes();
    assert_eq!(kernel.run(&Request::get("/")).text(), "Landing /");
}

#[test]
fn test_save_then_load_round_trip() {
    let site = TestSite::installed();
    let kernel = site.builder().handler("Shop", echo("Shop")).build();
    kernel.add_route("/shop", "Shop", 0, "shop");
    kernel.add_route("/store", "Shop", 0, "shop");
    assert!(kernel.routes().get("/shop").is_none());

    assert!(kernel.save_routes());
    assert!(site.root().join("MyFiles/routes.json").is_file());

    let reloaded = site.builder().handler("Shop", echo("Shop")).build();
    assert_eq!(reloaded.run(&Request::get("/store")).text(), "Shop /store");
    assert_eq!(reloaded.routes().get("/store"), kernel.routes().get("/store"));
    assert_eq!(reloaded.run(&Request::get("/shop")).status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_malformed_override_document_is_ignored() {
    let site = TestSite::installed();
    site.write(
        "MyFiles/routes.json",
        r#"{"/shop": {"controller": "Shop"}, "/bad": {"position": 3}}"#,
    );
    let kernel = site.kernel();

    assert!(kernel.resolve("/shop").is_err());
    assert_eq!(kernel.run(&Request::get("/")).text(), "Dashboard /");
}

#[test]
fn test_save_reports_failure() {
    let mut site = TestSite::installed();
    site.write("blocker", "not a directory");
    site.config.kernel.routes_file = "blocker/routes.json".into();
    let kernel = site.kernel();

    assert!(!kernel.save_routes());
}

#[test]
fn test_rebuild_discovers_controllers() {
    let site = TestSite::installed();
    site.write("Dinamic/Controller/ListCliente.rs", "");
    site.write("Dinamic/Controller/Installer.rs", "");
    site.write("Dinamic/Controller/notes.txt", "");
    let kernel = site.builder().handler("ListCliente", echo("ListCliente")).build();

    kernel.rebuild_routes();
    let routes = kernel.routes();
    assert_eq!(
        routes.get("/ListCliente").map(|r| r.handler.as_str()),
        Some("Dinamic::Controller::ListCliente")
    );
    assert!(routes.get("/Installer").is_none());
    assert!(routes.get("/notes").is_none());

    assert_eq!(kernel.run(&Request::get("/ListCliente")).text(), "ListCliente /ListCliente");
}

#[test]
fn test_rebuild_uses_configured_homepage() {
    let mut site = TestSite::installed();
    site.config
        .settings
        .entry("default".into())
        .or_default()
        .insert("homepage".into(), json!("Welcome"));
    let kernel = site.builder().handler("Welcome", echo("Welcome")).build();

    assert_eq!(kernel.run(&Request::get("/")).text(), "Dashboard /");
    kernel.rebuild_routes();
    assert_eq!(kernel.run(&Request::get("/")).text(), "Welcome /");
}

struct Forbidden;

impl Handler for Forbidden {
    fn run(&mut self, _request: &Request, _response: &mut Response) -> Result<(), KernelError> {
        Err(KernelError::tagged("AccessDenied", "not allowed"))
    }
}

struct AccessDenied(KernelError);

impl ErrorHandler for AccessDenied {
    fn run(&mut self, _request: &Request, response: &mut Response) {
        response.set_status(StatusCode::FORBIDDEN);
        response.write(format!("denied: {}", self.0));
    }
}

#[test]
fn test_tagged_error_uses_override_handler() {
    let site = TestSite::installed();
    let kernel = site
        .builder()
        .handler("Secret", |_, _| Box::new(Forbidden))
        .error_handler("AccessDenied", |err| Box::new(AccessDenied(err)))
        .build();
    kernel.add_route("/secret", "Secret", 0, "");

    let res = kernel.run(&Request::get("/secret"));
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(res.text(), "denied: not allowed");
}

#[test]
fn test_unknown_tag_falls_back_to_default_error() {
    let site = TestSite::installed();
    let kernel = site.builder().handler("Secret", |_, _| Box::new(Forbidden)).build();
    kernel.add_route("/secret", "Secret", 0, "");

    let res = kernel.run(&Request::get("/secret").with_content_type("application/json"));
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(&res), json!({ "error": "not allowed" }));
}

struct Crash;

impl Handler for Crash {
    fn run(&mut self, _request: &Request, response: &mut Response) -> Result<(), KernelError> {
        response.write("partial output");
        let items: Vec<u32> = Vec::new();
        let _ = items[3];
        Ok(())
    }
}

#[test]
fn test_panic_yields_diagnostic_page() {
    let site = TestSite::installed();
    let kernel = site.builder().handler("Crash", |_, _| Box::new(Crash)).build();
    kernel.add_route("/crash", "Crash", 0, "");

    let res = kernel.run(&Request::get("/crash"));
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let html = res.text();
    assert!(!html.contains("partial output"));
    assert!(html.contains("index out of bounds"));

    let res = kernel.run(&Request::get("/crash").with_content_type("application/json"));
    let body = json_body(&res);
    assert!(body["error"].as_str().unwrap().contains("index out of bounds"));
}

struct CatchesOwnPanic;

impl Handler for CatchesOwnPanic {
    fn run(&mut self, _request: &Request, response: &mut Response) -> Result<(), KernelError> {
        let items: Vec<u32> = Vec::new();
        let caught = std::panic::catch_unwind(|| items[1]);
        response.write(format!("recovered={}", caught.is_err()));
        Ok(())
    }
}

#[test]
fn test_panic_recovered_inside_handler_is_not_fatal() {
    let site = TestSite::installed();
    let kernel = site
        .builder()
        .handler("Recovering", |_, _| Box::new(CatchesOwnPanic))
        .build();
    kernel.add_route("/rec", "Recovering", 0, "");

    let res = kernel.run(&Request::get("/rec"));
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text(), "recovered=true");

    // Escaped panics are still reported
    let kernel = site.builder().handler("Crash", |_, _| Box::new(Crash)).build();
    kernel.add_route("/crash", "Crash", 0, "");
    assert_eq!(kernel.run(&Request::get("/crash")).status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn test_default_kernel_serves_catalog_without_registrations() {
    let site = TestSite::installed();
    site.write("MyFiles/report.txt", "q3");
    let kernel = route_kernel::Kernel::init(site.config.clone());

    assert_eq!(kernel.run(&Request::get("/")).status(), StatusCode::OK);
    assert_eq!(kernel.run(&Request::get("/login")).status(), StatusCode::OK);
    let res = kernel.run(&Request::get("/MyFiles/report.txt"));
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text(), "q3");
}

#[test]
fn test_healthy_request_is_untouched_by_fatal_check() {
    let site = TestSite::installed();
    let kernel = site.kernel();

    let res = kernel.run(&Request::get("/"));
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text(), "Dashboard /");
}

#[test]
fn test_asset_traversal_is_not_found() {
    let site = TestSite::installed();
    site.write("Core/Assets/app.js", "x");
    site.write("secret.txt", "s");
    let kernel = site.kernel();

    assert_eq!(kernel.run(&Request::get("/Core/Assets/app.js")).status(), StatusCode::OK);
    assert_eq!(
        kernel.run(&Request::get("/Core/Assets/../../secret.txt")).status(),
        StatusCode::NOT_FOUND
    );
}
