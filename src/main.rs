//! Route kernel host binary.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http server ──▶ Kernel::run ──▶ dispatcher ──▶ handler
//!                                          │               │
//!                                          │               └─ miss / error ─▶ error handlers
//!                                          └─ panic ─▶ fatal guard ─▶ diagnostic page
//!
//!     routes.json ──▶ watcher ──▶ load ──▶ registry swap
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::http::StatusCode;
use clap::{Parser, Subcommand};

use route_kernel::config::{load_config, KernelConfig};
use route_kernel::observability::{logging, metrics};
use route_kernel::routing::watcher::RoutesWatcher;
use route_kernel::{HttpServer, Kernel, Request, Shutdown};

#[derive(Parser)]
#[command(name = "route-kernel")]
#[command(about = "Request-routing kernel", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "kernel.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve HTTP requests through the kernel
    Serve,
    /// Inspect or rebuild the route registry
    Routes {
        #[command(subcommand)]
        command: RoutesCommand,
    },
    /// Run a single request and print the response
    Dispatch {
        path: String,
        /// Send the request as application/json
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum RoutesCommand {
    /// Print the live registry in match order
    List,
    /// Rebuild from discovery and persist the result
    Rebuild,
}

fn read_config(path: &Path) -> Result<KernelConfig, Box<dyn std::error::Error>> {
    if path.exists() {
        Ok(load_config(path)?)
    } else {
        Ok(KernelConfig::default())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = read_config(&cli.config)?;

    logging::init(&config.observability);
    if !cli.config.exists() {
        tracing::warn!(path = ?cli.config, "Config file not found, using defaults");
    }

    match cli.command {
        Commands::Serve => serve(config).await,
        Commands::Routes { command } => {
            let kernel = Kernel::init(config);
            match command {
                RoutesCommand::List => print_routes(&kernel),
                RoutesCommand::Rebuild => {
                    let count = kernel.rebuild_routes();
                    if !kernel.save_routes() {
                        return Err(format!("failed to write {}", kernel.routes_path().display()).into());
                    }
                    println!("{count} routes written to {}", kernel.routes_path().display());
                }
            }
            Ok(())
        }
        Commands::Dispatch { path, json } => {
            let kernel = Kernel::init(config);
            let mut request = Request::get(path);
            if json {
                request = request.with_content_type("application/json");
            }
            let response = tokio::task::spawn_blocking(move || kernel.run(&request)).await?;
            println!("{}", response.status());
            println!("{}", response.text());
            if response.status() == StatusCode::INTERNAL_SERVER_ERROR {
                return Err("request failed".into());
            }
            Ok(())
        }
    }
}

fn print_routes(kernel: &Kernel) {
    let routes = kernel.routes();
    let width = routes.patterns().iter().map(|p| p.len()).max().unwrap_or(0);
    for (pattern, route) in routes.iter() {
        println!(
            "{pattern:<width$}  {:>3}  {}{}",
            route.priority,
            route.handler,
            if route.override_key.is_empty() {
                String::new()
            } else {
                format!("  [{}]", route.override_key)
            },
        );
    }
}

async fn serve(config: KernelConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("route-kernel v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener_config = config.listener.clone();
    let kernel = Arc::new(Kernel::init(config));

    let _watcher = match RoutesWatcher::new(kernel.clone()).run() {
        Ok(watcher) => Some(watcher),
        Err(e) => {
            tracing::warn!(error = %e, "Route override watcher disabled");
            None
        }
    };

    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();

    let server = HttpServer::new(kernel, listener_config);
    let listener = server.bind().await?;
    server.run(listener, shutdown.wait()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
