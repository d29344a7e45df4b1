//! HTTP host around the kernel.
//!
//! # Responsibilities
//! - Create Axum Router sending every path to the kernel
//! - Wire up middleware (tracing, timeout)
//! - Run the blocking kernel off the async executor
//! - Propagate request ID and execution time as response headers
//! - Bind server to listener with graceful shutdown

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{OriginalUri, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response as AxumResponse},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ListenerConfig;
use crate::http::request::{Request, X_REQUEST_ID};
use crate::kernel::Kernel;
use crate::observability::metrics;

/// Host failures.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Header carrying the kernel's wall-clock time for the request, in ms.
pub const X_EXECUTION_TIME: &str = "x-execution-time";

/// HTTP server for the kernel.
pub struct HttpServer {
    router: Router,
    config: ListenerConfig,
}

impl HttpServer {
    pub fn new(kernel: Arc<Kernel>, config: ListenerConfig) -> Self {
        let router = Self::build_router(&config, kernel);
        Self { router, config }
    }

    #[allow(deprecated)]
    fn build_router(config: &ListenerConfig, kernel: Arc<Kernel>) -> Router {
        Router::new()
            .route("/{*path}", any(kernel_handler))
            .route("/", any(kernel_handler))
            .with_state(kernel)
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// The router, for in-process testing.
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &ListenerConfig {
        &self.config
    }

    /// Bind the configured address.
    pub async fn bind(&self) -> Result<TcpListener, ServerError> {
        TcpListener::bind(&self.config.bind_address)
            .await
            .map_err(|source| ServerError::Bind {
                addr: self.config.bind_address.clone(),
                source,
            })
    }

    /// Serve until `shutdown` resolves.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn kernel_handler(
    State(kernel): State<Arc<Kernel>>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> AxumResponse {
    let start_time = Instant::now();
    let request = Request::from_parts(method, uri.path(), uri.query(), &headers);
    let request_id = request.request_id.clone();

    tracing::debug!(
        request_id = %request_id,
        method = %request.method,
        path = %request.path,
        "Dispatching request"
    );

    let outcome = tokio::task::spawn_blocking(move || kernel.run(&request)).await;
    let mut response = match outcome {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Kernel task failed");
            metrics::record_request(500, start_time);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response();
        }
    };

    let elapsed_ms = start_time.elapsed().as_secs_f64() * 1000.0;
    response.set_header(X_REQUEST_ID, &request_id);
    response.set_header(X_EXECUTION_TIME, &format!("{elapsed_ms:.3}"));
    metrics::record_request(response.status().as_u16(), start_time);

    response.into_response()
}
