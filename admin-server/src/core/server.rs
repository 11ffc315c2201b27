//! Server Implementation
//!
//! Router assembly and the HTTP listener

use axum::{Router, middleware};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::core::{BoxError, Config, ServerState};

/// Build the router with all routes registered (no middleware, no state)
pub fn build_router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        // Health - public
        .merge(crate::api::health::router())
        // Login/register public, /me authenticated
        .merge(crate::api::auth::router())
        // Gated admin APIs
        .merge(crate::api::users::router(state))
        .merge(crate::api::role::router(state))
        .merge(crate::api::permission::router(state))
}

/// Build the fully configured application
///
/// Used by both the HTTP server and the integration tests.
pub fn build_app(state: &ServerState) -> Router {
    build_router(state)
        // JWT authentication - skips public routes, injects CurrentUser
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state.clone())
        .layer(
            ServiceBuilder::new()
                // Outermost: every request is traced, including CORS preflight
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

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

    /// Create server with an already initialized state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    /// Serve until ctrl-c
    pub async fn run(&self) -> Result<(), BoxError> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await?,
        };

        let app = build_app(&state);

        let addr = self.config.bind_addr();
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!(
            "Admin server listening on {} (env: {})",
            addr,
            self.config.environment
        );

        let shutdown = async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        };

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}
