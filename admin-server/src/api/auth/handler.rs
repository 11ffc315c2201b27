//! Authentication Handlers
//!
//! Login issues a token; permissions are never embedded in it and are
//! re-read from the store on every gated request.

use axum::{Json, extract::State};
use shared::client::{LoginRequest, LoginResponse, UserInfo};
use shared::error::{ApiResponse, AppError, AppResult};
use shared::models::{User, UserCreate};

use crate::api::validate;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::security_log;

/// Roles and effective permission names of a user
async fn user_info(state: &ServerState, user: &User) -> AppResult<UserInfo> {
    let roles = state.resolver.roles_of(user.id).await?;
    let permissions = state.resolver.effective_permissions(user.id).await?.names();
    Ok(UserInfo::new(user, &roles, permissions))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<ApiResponse<LoginResponse>> {
    let user = match state
        .users
        .check_credentials(&req.username, &req.password)
        .await
    {
        Ok(user) => user,
        Err(e) => {
            security_log!(
                "WARN",
                "login_failed",
                username = req.username.clone(),
                reason = e.to_string()
            );
            return Err(e.into());
        }
    };

    let jwt_service = state.get_jwt_service();
    let token = jwt_service
        .generate_token(user.id, &user.username)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    tracing::info!(user_id = %user.id, username = %user.username, "User logged in");

    Ok(ApiResponse::success(LoginResponse {
        token,
        expires_in: jwt_service.expires_in(),
        user: user_info(&state, &user).await?,
    }))
}

/// POST /api/auth/register
///
/// Self-registration always receives the default role.
pub async fn register(
    State(state): State<ServerState>,
    Json(mut payload): Json<UserCreate>,
) -> AppResult<ApiResponse<UserInfo>> {
    validate(&payload)?;
    payload.role = None;

    let user = state.users.create_user(payload).await?;
    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    Ok(ApiResponse::success_with_message(
        "Registered",
        user_info(&state, &user).await?,
    ))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<ApiResponse<UserInfo>> {
    let user = state.users.get_user(current_user.id).await?;
    Ok(ApiResponse::success(user_info(&state, &user).await?))
}
