//! Shared types for the admin backend
//!
//! Error system, RBAC/user models and API DTOs used by admin-server
//! and its clients.

pub mod client;
pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};
