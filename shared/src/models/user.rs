//! User Model

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Account status; only `Active` users may authenticate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type), sqlx(rename_all = "lowercase"))]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
    Banned,
}

/// User entity (DB row)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: Uuid,
    pub username: String,
    /// May be empty; unique when set
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub name: String,
    pub avatar: String,
    pub status: UserStatus,
    pub last_login: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<i64>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

/// Create user payload (admin create and self-registration)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserCreate {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[serde(default)]
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
    #[serde(default)]
    pub name: String,
    /// Role name; defaults to `user`
    #[serde(default)]
    pub role: Option<String>,
}

/// Update user payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UserUpdate {
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub status: Option<UserStatus>,
    #[validate(length(min = 6, max = 128))]
    pub password: Option<String>,
}

/// Replace a user's role set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRolesAssign {
    pub role_ids: Vec<Uuid>,
}
