//! Server state shared by every handler

use std::sync::Arc;

use shared::error::AppError;
use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::rbac::{Bootstrap, Gate, RbacAdmin, Resolver};
use crate::services::{UserService, demo_accounts};

/// Server state
///
/// Cheap to clone: every field is a pool handle or an `Arc`.
///
/// | Field | Purpose |
/// |-------|---------|
/// | config | loaded configuration |
/// | db | SQLite pool |
/// | jwt_service | token issue/validation |
/// | resolver | effective permissions, role membership |
/// | admin | role/permission management |
/// | gate | request-time authorization |
/// | users | user accounts |
#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub db: DbService,
    pub jwt_service: Arc<JwtService>,
    pub resolver: Resolver,
    pub admin: RbacAdmin,
    pub gate: Gate,
    pub users: UserService,
}

impl ServerState {
    /// Wire services over an already-migrated database
    pub fn new(config: Config, db: DbService) -> Self {
        let pool = db.pool.clone();
        let resolver = Resolver::new(pool.clone());

        Self {
            jwt_service: Arc::new(JwtService::with_config(config.jwt.clone())),
            config: Arc::new(config),
            gate: Gate::new(resolver.clone()),
            resolver,
            admin: RbacAdmin::new(pool.clone()),
            users: UserService::new(pool),
            db,
        }
    }

    /// Open the database and prepare it for serving
    ///
    /// 1. Database (migrations applied)
    /// 2. RBAC bootstrap (default catalog on a fresh store)
    /// 3. Demo accounts, when enabled
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        let db = DbService::new(&config.database_path).await?;
        Self::prepare(config.clone(), db).await
    }

    /// Bootstrap and seed over an existing database, then build the state
    pub async fn prepare(config: Config, db: DbService) -> Result<Self, AppError> {
        let outcome = Bootstrap::new(db.pool.clone()).run().await?;
        tracing::debug!(?outcome, "RBAC bootstrap finished");

        let state = Self::new(config, db);

        if state.config.seed_demo_users {
            demo_accounts::seed(state.pool(), &state.users).await?;
        }

        Ok(state)
    }

    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db.pool
    }
}
