//! Role Model

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::Permission;

/// Role entity
///
/// `name` is the immutable machine key (`super_admin`, `admin`, ...).
/// Rows with `deleted_at` set are tombstones and never grant anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub display_name: String,
    pub description: String,
    /// Seeded at bootstrap; cannot be renamed or deleted
    pub is_system: bool,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<i64>,
}

/// Role together with its live permissions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleWithPermissions {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: Vec<Permission>,
}

/// Create role payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RoleCreate {
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    #[validate(length(min = 1, max = 128))]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_system: bool,
}

/// Update role payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RoleUpdate {
    #[validate(length(min = 1, max = 64))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 128))]
    pub display_name: Option<String>,
    pub description: Option<String>,
}

/// Replace a role's permission set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolePermissionsAssign {
    pub permission_ids: Vec<Uuid>,
}
