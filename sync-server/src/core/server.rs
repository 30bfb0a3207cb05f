//! Server Implementation
//!
//! HTTP server assembly and lifecycle

use crate::api;
use crate::auth;
use crate::core::{Config, ServerState};
use axum::Router;
use axum::middleware;
use tower_http::trace::TraceLayer;

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state (tests, embedded use)
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    /// Build the full application router.
    ///
    /// Every route except `/health` sits behind the API key middleware.
    pub fn app(state: ServerState) -> Router {
        Router::new()
            .merge(api::health::router())
            .merge(api::orders::router())
            .merge(api::stock::router())
            .merge(api::pricing::router())
            .merge(api::internal::router())
            .layer(middleware::from_fn_with_state(
                state.clone(),
                auth::require_api_key,
            ))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await?,
        };
        let app = Self::app(state);

        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Order sync server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutting down...");
            })
            .await?;

        Ok(())
    }
}
