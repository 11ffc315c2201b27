//! Effective-permission resolution

use std::collections::HashMap;

use shared::models::{Permission, Role};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::repository::{RepoResult, permission, role, user};

/// Deduplicated set of permissions reachable from a user
///
/// Keyed by permission id; iteration order is unspecified.
#[derive(Debug, Clone, Default)]
pub struct EffectivePermissions {
    by_id: HashMap<Uuid, Permission>,
}

impl EffectivePermissions {
    pub fn contains(&self, name: &str) -> bool {
        self.by_id.values().any(|p| p.name == name)
    }

    pub fn contains_any(&self, names: &[&str]) -> bool {
        names.iter().any(|n| self.contains(n))
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.by_id.values()
    }

    /// Permission names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.by_id.values().map(|p| p.name.clone()).collect();
        names.sort();
        names
    }

    /// Permissions sorted by name
    pub fn into_sorted_vec(self) -> Vec<Permission> {
        let mut permissions: Vec<Permission> = self.by_id.into_values().collect();
        permissions.sort_by(|a, b| a.name.cmp(&b.name));
        permissions
    }
}

impl FromIterator<Permission> for EffectivePermissions {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self {
            by_id: iter.into_iter().map(|p| (p.id, p)).collect(),
        }
    }
}

/// Read-only view over the RBAC graph
#[derive(Clone)]
pub struct Resolver {
    pool: SqlitePool,
}

impl Resolver {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Union of the live permissions of the user's live roles
    ///
    /// Fails with `UserNotFound` when the user is missing or soft-deleted.
    pub async fn effective_permissions(&self, user_id: Uuid) -> RepoResult<EffectivePermissions> {
        // One read transaction so the existence check and the join see the same snapshot
        let mut tx = self.pool.begin().await?;

        if user::find_live(&mut tx, user_id).await?.is_none() {
            return Err(user::not_found(user_id));
        }
        let reachable = permission::reachable_by_user(&mut tx, user_id).await?;

        tx.commit().await?;
        Ok(reachable.into_iter().collect())
    }

    /// Absence of the permission is `false`; only a missing user is an error
    pub async fn has_permission(&self, user_id: Uuid, permission_name: &str) -> RepoResult<bool> {
        Ok(self
            .effective_permissions(user_id)
            .await?
            .contains(permission_name))
    }

    /// Direct assignment of a live role, by name
    pub async fn has_role(&self, user_id: Uuid, role_name: &str) -> RepoResult<bool> {
        Ok(self
            .roles_of(user_id)
            .await?
            .iter()
            .any(|r| r.name == role_name))
    }

    /// Live roles of a live user
    pub async fn roles_of(&self, user_id: Uuid) -> RepoResult<Vec<Role>> {
        if user::find_by_id(&self.pool, user_id).await?.is_none() {
            return Err(user::not_found(user_id));
        }
        role::roles_of(&self.pool, user_id).await
    }
}
