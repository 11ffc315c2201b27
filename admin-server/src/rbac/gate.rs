//! Authorization gate
//!
//! Given a caller identity and a [`Requirement`], asks the [`Resolver`]
//! and allows or denies. Decisions are never cached.

use shared::error::{AppError, ErrorCode};
use thiserror::Error;
use uuid::Uuid;

use super::Resolver;
use crate::db::repository::RepoError;

/// What a route demands of its caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement<'a> {
    /// Exactly this permission
    Permission(&'a str),
    /// At least one of these permissions
    AnyPermission(&'a [&'a str]),
    /// Direct assignment of this role
    Role(&'a str),
}

impl std::fmt::Display for Requirement<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Requirement::Permission(p) => write!(f, "{p}"),
            Requirement::AnyPermission(ps) => write!(f, "any of [{}]", ps.join(", ")),
            Requirement::Role(r) => write!(f, "role {r}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum GateError {
    /// Caller no longer exists (deleted after the token was issued)
    #[error("User is not authenticated")]
    Unauthenticated,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Role required: {0}")]
    RoleRequired(String),

    #[error(transparent)]
    Store(RepoError),
}

impl From<GateError> for AppError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::Unauthenticated => AppError::unauthorized(),
            GateError::PermissionDenied(_) => {
                AppError::with_message(ErrorCode::PermissionDenied, err.to_string())
            }
            GateError::RoleRequired(_) => {
                AppError::with_message(ErrorCode::RoleRequired, err.to_string())
            }
            GateError::Store(e) => e.into(),
        }
    }
}

#[derive(Clone)]
pub struct Gate {
    resolver: Resolver,
}

impl Gate {
    pub fn new(resolver: Resolver) -> Self {
        Self { resolver }
    }

    /// `Ok(())` when `user_id` satisfies `requirement`
    pub async fn authorize(&self, user_id: Uuid, requirement: Requirement<'_>) -> Result<(), GateError> {
        let allowed = match requirement {
            Requirement::Permission(name) => self
                .resolver
                .effective_permissions(user_id)
                .await
                .map(|set| set.contains(name)),
            Requirement::AnyPermission(names) => self
                .resolver
                .effective_permissions(user_id)
                .await
                .map(|set| set.contains_any(names)),
            Requirement::Role(name) => self.resolver.has_role(user_id, name).await,
        };

        match allowed {
            Ok(true) => Ok(()),
            Ok(false) => match requirement {
                Requirement::Role(_) => Err(GateError::RoleRequired(requirement.to_string())),
                _ => Err(GateError::PermissionDenied(requirement.to_string())),
            },
            Err(e) if e.is_not_found() => Err(GateError::Unauthenticated),
            Err(e) => Err(GateError::Store(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requirement_display() {
        assert_eq!(Requirement::Permission("user:read").to_string(), "user:read");
        assert_eq!(
            Requirement::AnyPermission(&["user:read", "user:manage"]).to_string(),
            "any of [user:read, user:manage]"
        );
        assert_eq!(Requirement::Role("admin").to_string(), "role admin");
    }

    #[test]
    fn test_gate_error_codes() {
        let err: AppError = GateError::PermissionDenied("user:read".into()).into();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
        assert_eq!(err.message, "Permission denied: user:read");

        let err: AppError = GateError::RoleRequired("role admin".into()).into();
        assert_eq!(err.code, ErrorCode::RoleRequired);

        let err: AppError = GateError::Unauthenticated.into();
        assert_eq!(err.code, ErrorCode::NotAuthenticated);
    }
}
