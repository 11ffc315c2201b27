//! Repository Module
//!
//! Free functions over `&SqlitePool`, one module per table. Every read
//! path filters tombstones (`deleted_at IS NULL`) unless its name says otherwise.

pub mod association;
pub mod permission;
pub mod role;
pub mod user;

pub use association::Junction;

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    /// Referenced row does not exist or is soft-deleted
    #[error("{1}")]
    NotFound(ErrorCode, String),

    /// Uniqueness violation among live rows
    #[error("{1}")]
    Duplicate(ErrorCode, String),

    /// Storage failure
    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Policy rejection (e.g. touching a system role)
    #[error("{1}")]
    Business(ErrorCode, String),
}

impl RepoError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepoError::NotFound(..))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, RepoError::Duplicate(..))
    }

    /// Give a store-level unique violation its entity-specific code
    pub fn on_duplicate(self, code: ErrorCode, message: impl Into<String>) -> Self {
        match self {
            RepoError::Duplicate(..) => RepoError::Duplicate(code, message.into()),
            other => other,
        }
    }
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => {
                RepoError::NotFound(ErrorCode::NotFound, "Record not found".into())
            }
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepoError::Duplicate(ErrorCode::AlreadyExists, db_err.message().to_string())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(code, msg)
            | RepoError::Duplicate(code, msg)
            | RepoError::Business(code, msg) => AppError::with_message(code, msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Database(msg) => {
                tracing::error!(error = %msg, "Repository database error");
                AppError::database("Database error")
            }
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_on_duplicate_only_rewrites_conflicts() {
        let err = RepoError::Duplicate(ErrorCode::AlreadyExists, "UNIQUE constraint failed".into())
            .on_duplicate(ErrorCode::RoleNameExists, "Role 'admin' already exists");
        assert!(matches!(err, RepoError::Duplicate(ErrorCode::RoleNameExists, _)));

        let err = RepoError::Database("disk I/O error".into())
            .on_duplicate(ErrorCode::RoleNameExists, "ignored");
        assert!(matches!(err, RepoError::Database(_)));
    }

    #[test]
    fn test_repo_error_to_app_error() {
        let app: AppError =
            RepoError::NotFound(ErrorCode::RoleNotFound, "Role x not found".into()).into();
        assert_eq!(app.code, ErrorCode::RoleNotFound);
        assert_eq!(app.http_status(), http::StatusCode::NOT_FOUND);

        let app: AppError = RepoError::Database("secret path".into()).into();
        assert_eq!(app.code, ErrorCode::DatabaseError);
        assert_eq!(app.message, "Database error");

        let app: AppError =
            RepoError::Business(ErrorCode::RoleIsSystem, "Cannot delete system role".into()).into();
        assert_eq!(app.http_status(), http::StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err = RepoError::from(sqlx::Error::RowNotFound);
        assert!(err.is_not_found());
        assert!(!err.is_conflict());
    }
}
