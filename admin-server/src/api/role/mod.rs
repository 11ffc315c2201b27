//! Role API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::{require_any_permission, require_permission};
use crate::core::ServerState;

/// Anyone who can see users can see the roles they hold
pub(crate) const READ: &[&str] = &["user:read", "user:manage", "system:admin"];

/// Reads need [`READ`]; every write needs `system:admin`
pub fn router(state: &ServerState) -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/api/roles", get(handler::list))
        .route("/api/roles/{id}", get(handler::get_by_id))
        .route("/api/roles/{id}/permissions", get(handler::get_role_permissions))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_any_permission(READ),
        ));

    let write_routes = Router::new()
        .route("/api/roles", post(handler::create))
        .route("/api/roles/{id}", put(handler::update).delete(handler::delete))
        .route("/api/roles/{id}/permissions", put(handler::update_role_permissions))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission("system:admin"),
        ));

    read_routes.merge(write_routes)
}
