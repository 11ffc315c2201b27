//! API routes
//!
//! # Structure
//!
//! - [`health`] - liveness and database check
//! - [`auth`] - login, registration, current user
//! - [`users`] - user accounts and their roles
//! - [`role`] - roles and their permissions
//! - [`permission`] - permission catalog

pub mod auth;
pub mod health;
pub mod permission;
pub mod role;
pub mod users;

use shared::error::{AppError, AppResult};
use validator::Validate;

/// Reject a payload that fails its `validator` rules
pub(crate) fn validate<T: Validate>(payload: &T) -> AppResult<()> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))
}
