//! Permission API Handlers

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use shared::client::PermissionQuery;
use shared::error::{ApiResponse, AppResult};
use shared::models::{Permission, PermissionCreate, PermissionUpdate};
use uuid::Uuid;

use crate::api::validate;
use crate::auth::CurrentUser;
use crate::core::ServerState;

/// GET /api/permissions?resource=user
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<PermissionQuery>,
) -> AppResult<ApiResponse<Vec<Permission>>> {
    let permissions = state
        .admin
        .list_permissions(query.resource.as_deref())
        .await?;
    Ok(ApiResponse::success(permissions))
}

/// POST /api/permissions
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<PermissionCreate>,
) -> AppResult<ApiResponse<Permission>> {
    validate(&payload)?;
    tracing::info!(
        user_id = %current_user.id,
        username = %current_user.username,
        permission = %payload.name,
        "Creating permission"
    );

    Ok(ApiResponse::success(state.admin.create_permission(payload).await?))
}

/// PUT /api/permissions/{id} - display name and description only
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PermissionUpdate>,
) -> AppResult<ApiResponse<Permission>> {
    validate(&payload)?;
    Ok(ApiResponse::success(state.admin.update_permission(id, payload).await?))
}

/// DELETE /api/permissions/{id}
///
/// Roles keep their link rows; the permission simply stops resolving.
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<()>> {
    tracing::info!(
        user_id = %current_user.id,
        username = %current_user.username,
        permission_id = %id,
        "Deleting permission"
    );

    state.admin.delete_permission(id).await?;
    Ok(ApiResponse::ok())
}
