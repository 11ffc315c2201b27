//! Request/response types for the auth and RBAC endpoints
//!
//! Shared between admin-server and API clients.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Permission, Role, User};

// =============================================================================
// Auth API DTOs
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: i64,
    pub user: UserInfo,
}

/// User information with resolved roles and effective permissions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub roles: Vec<String>,
    /// Effective permission names, sorted
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl UserInfo {
    pub fn new(user: &User, roles: &[Role], permissions: Vec<String>) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            roles: roles.iter().map(|r| r.name.clone()).collect(),
            permissions,
        }
    }
}

// =============================================================================
// RBAC API DTOs
// =============================================================================

/// Result of a replace-associations call
///
/// Ids that did not resolve to a live row are reported in `skipped`
/// instead of failing the call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentOutcome {
    pub applied: Vec<Uuid>,
    pub skipped: Vec<Uuid>,
}

impl AssignmentOutcome {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Effective permissions of a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPermissionsResponse {
    pub user_id: Uuid,
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermissionQuery {
    pub resource: Option<String>,
}

// =============================================================================
// Pagination
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl PageQuery {
    pub const MAX_PAGE_SIZE: u32 = 100;

    /// `(limit, offset)` with page clamped to >= 1 and size to 1..=100
    pub fn limit_offset(&self) -> (i64, i64) {
        let size = self.page_size.clamp(1, Self::MAX_PAGE_SIZE) as i64;
        let page = self.page.max(1) as i64;
        (size, (page - 1) * size)
    }
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    20
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_offset_clamps() {
        let q = PageQuery { page: 0, page_size: 0 };
        assert_eq!(q.limit_offset(), (1, 0));

        let q = PageQuery { page: 3, page_size: 500 };
        assert_eq!(q.limit_offset(), (100, 200));

        assert_eq!(PageQuery::default().limit_offset(), (20, 0));
    }

    #[test]
    fn test_page_query_defaults_from_json() {
        let q: PageQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.page, 1);
        assert_eq!(q.page_size, 20);
    }
}
