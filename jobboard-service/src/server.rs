//! HTTP server with graceful shutdown
//!
//! On SIGINT or SIGTERM the listener stops accepting connections and
//! in-flight requests get `service.shutdown_grace_secs` to finish. Anything
//! still running after that is aborted, then the store is closed.

use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

use crate::{
    config::Config,
    error::{Error, Result},
    middleware::{request_id_layer, request_id_propagation_layer, sensitive_headers_layer},
    state::AppState,
};

/// Server instance
pub struct Server {
    state: AppState,
}

impl Server {
    /// Create a new server instance
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        self.state.config()
    }

    /// Wrap `app` in the middleware stack
    pub fn layered(&self, app: Router) -> Router {
        let config = self.config();

        // Layers are applied in reverse order (bottom layer is innermost/first)
        let body_limit = config.middleware.body_limit_mb * 1024 * 1024;

        app
            // CORS (outermost layer) - configurable
            .layer(self.build_cors_layer())
            // Compression - always enabled (minimal overhead)
            .layer(CompressionLayer::new())
            // Request timeout
            .layer(TimeoutLayer::with_status_code(
                http::StatusCode::REQUEST_TIMEOUT,
                config.request_timeout(),
            ))
            // Request body size limit - configurable via config
            .layer(RequestBodyLimitLayer::new(body_limit))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().include_headers(true))
                    .on_response(DefaultOnResponse::new().include_headers(true)),
            )
            .layer(sensitive_headers_layer())
            .layer(request_id_propagation_layer())
            .layer(request_id_layer())
            // Panic recovery (innermost layer)
            .layer(CatchPanicLayer::new())
    }

    /// Run the server with the given router until a shutdown signal
    pub async fn serve(self, app: Router) -> Result<()> {
        let config = self.config();
        let addr = SocketAddr::from(([0, 0, 0, 0], config.service.port));

        tracing::info!("Starting {} on {}", config.service.name, addr);
        self.log_middleware_config();

        let app = self.layered(app);
        let listener = TcpListener::bind(&addr).await?;
        tracing::info!("Server listening on {}", addr);

        let shutdown = CancellationToken::new();
        let server = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown.clone().cancelled_owned());
        let mut handle = tokio::spawn(async move { server.await });

        let early_exit = tokio::select! {
            joined = &mut handle => Some(joined),
            _ = shutdown_signal() => None,
        };

        let outcome = match early_exit {
            Some(joined) => joined
                .map_err(|e| Error::Internal(format!("server task failed: {}", e)))
                .and_then(|served| served.map_err(Error::from)),
            None => self.drain(shutdown, handle).await,
        };

        self.state.store().close().await;
        tracing::info!("Server shutdown complete");
        outcome
    }

    /// Stop accepting, then wait a bounded time for in-flight requests
    async fn drain(
        &self,
        shutdown: CancellationToken,
        mut handle: tokio::task::JoinHandle<std::io::Result<()>>,
    ) -> Result<()> {
        let grace = self.config().shutdown_grace();
        shutdown.cancel();
        tracing::info!(
            grace_secs = grace.as_secs(),
            "Shutdown signal received, draining requests..."
        );

        match tokio::time::timeout(grace, &mut handle).await {
            Ok(Ok(served)) => served.map_err(Error::from),
            Ok(Err(e)) => Err(Error::Internal(format!("server task failed: {}", e))),
            Err(_) => {
                tracing::warn!(
                    grace_secs = grace.as_secs(),
                    "Grace period elapsed, aborting in-flight requests"
                );
                handle.abort();
                Ok(())
            }
        }
    }

    /// Log middleware configuration for debugging
    fn log_middleware_config(&self) {
        let config = self.config();
        tracing::info!("Middleware configuration:");
        tracing::info!("  - Panic recovery: enabled");
        tracing::info!("  - Request ID tracking: enabled");
        tracing::info!("  - Sensitive header masking: enabled");
        tracing::info!(
            "  - Request body limit: {} MB",
            config.middleware.body_limit_mb
        );
        tracing::info!("  - Compression: enabled");
        tracing::info!("  - CORS mode: {}", config.middleware.cors_mode);
        tracing::info!(
            "  - Request timeout: {} seconds",
            config.service.timeout_secs
        );
        tracing::info!(
            "  - Referential integrity: {}",
            if config.integrity.enforce_references {
                "enforced"
            } else {
                "disabled"
            }
        );
    }

    /// Build CORS layer based on configuration
    fn build_cors_layer(&self) -> CorsLayer {
        let mode = &self.config().middleware.cors_mode;
        match mode.as_str() {
            "permissive" => {
                tracing::debug!("Enabling permissive CORS");
                CorsLayer::permissive()
            }
            "restrictive" | "disabled" => {
                tracing::debug!("Enabling restrictive CORS (default deny)");
                CorsLayer::new()
            }
            _ => {
                tracing::warn!("Unknown CORS mode: {}, defaulting to permissive", mode);
                CorsLayer::permissive()
            }
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl+C), starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use axum::{body::Body, http::Request, routing::get};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn server() -> Server {
        Server::new(AppState::new(Config::default(), Arc::new(MemoryStore::new())))
    }

    #[test]
    fn test_server_creation() {
        let server = server();
        assert_eq!(server.config().service.port, 8080);
    }

    #[tokio::test]
    async fn test_layered_router_sets_request_id() {
        let app = server().layered(Router::new().route("/ping", get(|| async { "pong" })));
        let response = app
            .oneshot(Request::builder().uri("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), http::StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_panics_become_500() {
        let app = server().layered(Router::new().route(
            "/boom",
            get(|| async {
                panic!("handler fault");
                #[allow(unreachable_code)]
                ""
            }),
        ));
        let response = app
            .oneshot(Request::builder().uri("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
