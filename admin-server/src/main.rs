//! admin-server - RBAC admin panel backend
//!
//! Start sequence: `.env` → config → logging → database (migrations) →
//! RBAC bootstrap → demo accounts → HTTP server.

use admin_server::core::BoxError;
use admin_server::{Config, Server, ServerState, init_logger};

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;
    init_logger(Some(config.log_level.as_str()), config.log_dir.as_deref());

    if config.jwt_secret_generated {
        tracing::warn!("JWT_SECRET not set, using a temporary development key");
    }
    tracing::info!(
        "Starting admin-server v{} (env: {})",
        env!("CARGO_PKG_VERSION"),
        config.environment
    );

    let state = ServerState::initialize(&config).await?;

    Server::with_state(config, state).run().await
}
