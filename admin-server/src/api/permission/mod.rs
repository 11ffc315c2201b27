//! Permission API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::api::role;
use crate::auth::{require_any_permission, require_permission};
use crate::core::ServerState;

/// Listing shares the role read gate; writes need `system:admin`
pub fn router(state: &ServerState) -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/api/permissions", get(handler::list))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_any_permission(role::READ),
        ));

    let write_routes = Router::new()
        .route("/api/permissions", post(handler::create))
        .route("/api/permissions/{id}", put(handler::update).delete(handler::delete))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission("system:admin"),
        ));

    read_routes.merge(write_routes)
}
