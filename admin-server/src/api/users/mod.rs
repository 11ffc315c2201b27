//! User API Module
//!
//! | Path | Method | Requires |
//! |------|--------|----------|
//! | /api/users | GET | user:read or user:manage |
//! | /api/users/{id} | GET | user:read or user:manage |
//! | /api/users/{id}/permissions | GET | user:read or user:manage |
//! | /api/users/{id}/roles | GET | user:read or user:manage |
//! | /api/users | POST | user:write or user:manage (plus user:manage to pick a role) |
//! | /api/users/{id} | PUT | user:write or user:manage |
//! | /api/users/{id} | DELETE | user:delete or user:manage |
//! | /api/users/{id}/roles | PUT | user:manage |

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::auth::{require_any_permission, require_permission};
use crate::core::ServerState;

const READ: &[&str] = &["user:read", "user:manage"];
const WRITE: &[&str] = &["user:write", "user:manage"];
const DELETE: &[&str] = &["user:delete", "user:manage"];
const MANAGE: &str = "user:manage";

pub fn router(state: &ServerState) -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/api/users", get(handler::list))
        .route("/api/users/{id}", get(handler::get_by_id))
        .route("/api/users/{id}/permissions", get(handler::get_permissions))
        .route("/api/users/{id}/roles", get(handler::get_roles))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_any_permission(READ),
        ));

    let write_routes = Router::new()
        .route("/api/users", post(handler::create))
        .route("/api/users/{id}", put(handler::update))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_any_permission(WRITE),
        ));

    let delete_routes = Router::new()
        .route("/api/users/{id}", delete(handler::delete))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_any_permission(DELETE),
        ));

    let manage_routes = Router::new()
        .route("/api/users/{id}/roles", put(handler::update_roles))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission(MANAGE),
        ));

    read_routes
        .merge(write_routes)
        .merge(delete_routes)
        .merge(manage_routes)
}
