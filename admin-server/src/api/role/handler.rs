//! Role API Handlers

use axum::Json;
use axum::extract::{Extension, Path, State};
use shared::client::AssignmentOutcome;
use shared::error::{ApiResponse, AppResult};
use shared::models::{
    Permission, Role, RoleCreate, RolePermissionsAssign, RoleUpdate, RoleWithPermissions,
};
use uuid::Uuid;

use crate::api::validate;
use crate::auth::CurrentUser;
use crate::core::ServerState;

/// GET /api/roles - live roles with their live permissions
pub async fn list(
    State(state): State<ServerState>,
) -> AppResult<ApiResponse<Vec<RoleWithPermissions>>> {
    Ok(ApiResponse::success(state.admin.list_roles().await?))
}

/// GET /api/roles/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<RoleWithPermissions>> {
    Ok(ApiResponse::success(state.admin.get_role(id).await?))
}

/// GET /api/roles/{id}/permissions
pub async fn get_role_permissions(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<Vec<Permission>>> {
    Ok(ApiResponse::success(state.admin.role_permissions(id).await?))
}

/// POST /api/roles
///
/// Roles created over HTTP are never system roles.
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(mut payload): Json<RoleCreate>,
) -> AppResult<ApiResponse<Role>> {
    validate(&payload)?;
    payload.is_system = false;

    tracing::info!(
        user_id = %current_user.id,
        username = %current_user.username,
        role_name = %payload.name,
        "Creating role"
    );

    Ok(ApiResponse::success(state.admin.create_role(payload).await?))
}

/// PUT /api/roles/{id}
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RoleUpdate>,
) -> AppResult<ApiResponse<Role>> {
    validate(&payload)?;
    tracing::info!(
        user_id = %current_user.id,
        username = %current_user.username,
        role_id = %id,
        "Updating role"
    );

    Ok(ApiResponse::success(state.admin.update_role(id, payload).await?))
}

/// DELETE /api/roles/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<()>> {
    tracing::info!(
        user_id = %current_user.id,
        username = %current_user.username,
        role_id = %id,
        "Deleting role"
    );

    state.admin.delete_role(id).await?;
    Ok(ApiResponse::ok())
}

/// PUT /api/roles/{id}/permissions - replace the role's permission set
pub async fn update_role_permissions(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RolePermissionsAssign>,
) -> AppResult<ApiResponse<AssignmentOutcome>> {
    tracing::info!(
        user_id = %current_user.id,
        username = %current_user.username,
        role_id = %id,
        permissions = payload.permission_ids.len(),
        "Replacing role permissions"
    );

    let outcome = state
        .admin
        .assign_permissions_to_role(id, &payload.permission_ids)
        .await?;
    Ok(ApiResponse::success(outcome))
}
