//! User API Handlers

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use shared::client::{AssignmentOutcome, PageQuery, Paginated, UserPermissionsResponse};
use shared::error::{ApiResponse, AppResult};
use shared::models::{Role, User, UserCreate, UserRolesAssign, UserUpdate};
use uuid::Uuid;

use crate::api::validate;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::rbac::Requirement;
use crate::rbac::catalog::DEFAULT_ROLE;
use crate::security_log;

/// GET /api/users - newest first, paginated
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Paginated<User>>> {
    let page = state.users.list_users(query).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/users/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<User>> {
    Ok(ApiResponse::success(state.users.get_user(id).await?))
}

/// GET /api/users/{id}/permissions - effective permissions, sorted by name
pub async fn get_permissions(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<UserPermissionsResponse>> {
    let permissions = state.resolver.effective_permissions(id).await?;
    Ok(ApiResponse::success(UserPermissionsResponse {
        user_id: id,
        permissions: permissions.into_sorted_vec(),
    }))
}

/// GET /api/users/{id}/roles - directly assigned live roles
pub async fn get_roles(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<Vec<Role>>> {
    Ok(ApiResponse::success(state.admin.user_roles(id).await?))
}

/// POST /api/users
///
/// A role other than the default is only honored for callers holding `user:manage`.
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<UserCreate>,
) -> AppResult<ApiResponse<User>> {
    validate(&payload)?;
    tracing::info!(
        user_id = %current_user.id,
        username = %current_user.username,
        new_username = %payload.username,
        "Creating user"
    );

    // Picking a role is a role assignment and needs the same grant as PUT {id}/roles
    if let Some(role) = payload.role.as_deref().filter(|r| *r != DEFAULT_ROLE) {
        let requirement = Requirement::Permission(super::MANAGE);
        if let Err(e) = state.gate.authorize(current_user.id, requirement).await {
            security_log!(
                "WARN",
                "access_denied",
                user_id = current_user.id.to_string(),
                username = current_user.username.clone(),
                required = requirement.to_string(),
                requested_role = role.to_string()
            );
            return Err(e.into());
        }
    }

    let user = state.users.create_user(payload).await?;
    Ok(ApiResponse::success(user))
}

/// PUT /api/users/{id}
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UserUpdate>,
) -> AppResult<ApiResponse<User>> {
    validate(&payload)?;
    tracing::info!(
        user_id = %current_user.id,
        username = %current_user.username,
        target_id = %id,
        "Updating user"
    );

    Ok(ApiResponse::success(state.users.update_user(id, payload).await?))
}

/// DELETE /api/users/{id} - soft delete
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<ApiResponse<()>> {
    state.users.delete_user(id, current_user.id).await?;
    Ok(ApiResponse::ok())
}

/// PUT /api/users/{id}/roles - replace the user's role set
///
/// Unknown or deleted role ids are skipped and reported in the outcome.
pub async fn update_roles(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UserRolesAssign>,
) -> AppResult<ApiResponse<AssignmentOutcome>> {
    tracing::info!(
        user_id = %current_user.id,
        username = %current_user.username,
        target_id = %id,
        roles = payload.role_ids.len(),
        "Replacing user roles"
    );

    let outcome = state.admin.assign_roles_to_user(id, &payload.role_ids).await?;
    Ok(ApiResponse::success(outcome))
}
