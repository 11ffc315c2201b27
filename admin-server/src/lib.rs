//! Admin Server - RBAC-protected admin panel backend
//!
//! # Architecture
//!
//! - **Entity Store** (`db`): SQLite via sqlx, soft-deleted roles/permissions/users
//!   and their junction tables
//! - **RBAC** (`rbac`): effective-permission resolution, admin operations,
//!   first-run bootstrap and the authorization gate
//! - **Auth** (`auth`): JWT + Argon2
//! - **Accounts** (`services`): registration, credential checks, user CRUD
//! - **HTTP API** (`api`): axum routes
//!
//! ```text
//! admin-server/src/
//! ├── core/          # config, state, server
//! ├── db/            # pool, migrations, repositories
//! ├── rbac/          # resolver, admin ops, bootstrap, gate
//! ├── auth/          # JWT, middleware, password hashing
//! ├── services/      # user accounts
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # logging
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod rbac;
pub mod services;
pub mod utils;

// Re-export public types
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

pub use utils::logger::init_logger;

// Security logging macro - events on the `security` target
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}
