//! Authentication and authorization middleware

use std::future::Future;
use std::pin::Pin;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::AppError;

use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::rbac::Requirement;
use crate::security_log;

/// Routes reachable without a token
pub const PUBLIC_PATHS: &[&str] = &["/health", "/api/auth/login", "/api/auth/register"];

/// Authentication middleware
///
/// Validates `Authorization: Bearer <token>` and inserts [`CurrentUser`]
/// into the request extensions.
///
/// Skipped for `OPTIONS` (CORS preflight), non-`/api/` paths and [`PUBLIC_PATHS`].
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    if req.method() == http::Method::OPTIONS
        || !path.starts_with("/api/")
        || PUBLIC_PATHS.contains(&path)
    {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
            return Err(AppError::unauthorized());
        }
    };

    match state.get_jwt_service().validate_token(token) {
        Ok(claims) => {
            let user = CurrentUser::try_from(claims)
                .map_err(|e| AppError::invalid_token(format!("Malformed JWT claims: {e}")))?;
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", req.uri())
            );

            match e {
                JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            }
        }
    }
}

type GateFuture = Pin<Box<dyn Future<Output = Result<Response, AppError>> + Send>>;

/// Gate middleware for an arbitrary [`Requirement`]
///
/// Must sit inside [`require_auth`]. Use with `from_fn_with_state`:
///
/// ```ignore
/// Router::new()
///     .route("/api/roles", post(handler::create))
///     .layer(middleware::from_fn_with_state(state.clone(), require_permission("system:admin")));
/// ```
pub fn require(
    requirement: Requirement<'static>,
) -> impl Fn(State<ServerState>, Request, Next) -> GateFuture + Clone {
    move |State(state): State<ServerState>, req: Request, next: Next| {
        Box::pin(async move {
            let user = req.current_user()?.clone();

            if let Err(e) = state.gate.authorize(user.id, requirement).await {
                security_log!(
                    "WARN",
                    "access_denied",
                    user_id = user.id.to_string(),
                    username = user.username.clone(),
                    required = requirement.to_string(),
                    reason = e.to_string()
                );
                return Err(e.into());
            }

            Ok(next.run(req).await)
        })
    }
}

/// Require one exact permission, e.g. `"system:admin"`
pub fn require_permission(
    permission: &'static str,
) -> impl Fn(State<ServerState>, Request, Next) -> GateFuture + Clone {
    require(Requirement::Permission(permission))
}

/// Require at least one of the listed permissions
pub fn require_any_permission(
    permissions: &'static [&'static str],
) -> impl Fn(State<ServerState>, Request, Next) -> GateFuture + Clone {
    require(Requirement::AnyPermission(permissions))
}

/// Require a directly assigned role, e.g. `"super_admin"`
pub fn require_role(
    role: &'static str,
) -> impl Fn(State<ServerState>, Request, Next) -> GateFuture + Clone {
    require(Requirement::Role(role))
}

/// Read [`CurrentUser`] from request extensions
pub trait CurrentUserExt {
    /// Fails with 401 when the request was not authenticated
    fn current_user(&self) -> Result<&CurrentUser, AppError>;
}

impl CurrentUserExt for Request {
    fn current_user(&self) -> Result<&CurrentUser, AppError> {
        self.extensions()
            .get::<CurrentUser>()
            .ok_or_else(AppError::unauthorized)
    }
}
