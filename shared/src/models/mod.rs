//! Data models
//!
//! Shared between admin-server and the admin console (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are UUID v4; timestamps are Unix milliseconds.

pub mod permission;
pub mod role;
pub mod user;

// Re-exports
pub use permission::*;
pub use role::*;
pub use user::*;
