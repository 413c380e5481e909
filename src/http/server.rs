//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the axum Router from the route table
//! - Mount the asset middleware ahead of the routes
//! - Wire up middleware (tracing, limits, timeouts, request ID, metrics)
//! - Bind server to listener and stop on the shutdown signal
//!
//! # Layer Order (outermost first)
//! ```text
//! metrics → trace → set request id → propagate request id
//!     → timeout → body limit → assets → routes
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::http::uri::InvalidUri;
use axum::http::StatusCode;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::EntryConfig;
use crate::http::assets::{serve_assets, Assets};
use crate::http::routes::Routes;
use crate::lifecycle::shutdown;
use crate::observability::metrics;

/// HTTP server for the application entry point.
pub struct EntryServer {
    router: Router,
    config: EntryConfig,
}

impl EntryServer {
    /// Create a new server; fails only on an unparseable dev server URL.
    pub fn new(config: EntryConfig, routes: Routes) -> Result<Self, InvalidUri> {
        let assets = Assets::from_config(&config)?;
        let router = Self::build_router(&config, routes, assets);
        Ok(Self { router, config })
    }

    /// Build the axum router with all middleware layers.
    fn build_router(config: &EntryConfig, routes: Routes, assets: Assets) -> Router {
        routes
            .into_router()
            .layer(from_fn_with_state(Arc::new(assets), serve_assets::<Assets>))
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_size))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(config.timeouts.request_secs),
            ))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(from_fn(metrics::track_requests))
    }

    /// The fully layered router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            mode = %self.config.mode,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &EntryConfig {
        &self.config
    }
}
