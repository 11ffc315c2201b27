//! RBAC administrative operations

use shared::client::AssignmentOutcome;
use shared::error::ErrorCode;
use shared::models::{
    Permission, PermissionCreate, PermissionUpdate, Role, RoleCreate, RoleUpdate,
    RoleWithPermissions,
};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::repository::{Junction, RepoError, RepoResult, association, permission, role, user};

/// Mutations of the role/permission graph plus the queries that back the admin API
#[derive(Clone)]
pub struct RbacAdmin {
    pool: SqlitePool,
}

impl RbacAdmin {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ========== Roles ==========

    /// Fails with `RoleNameExists` when a live role already has the name
    pub async fn create_role(&self, data: RoleCreate) -> RepoResult<Role> {
        let created = role::create(&self.pool, data).await?;
        tracing::info!(role_id = %created.id, name = %created.name, is_system = created.is_system, "Role created");
        Ok(created)
    }

    pub async fn update_role(&self, id: Uuid, data: RoleUpdate) -> RepoResult<Role> {
        let updated = role::update(&self.pool, id, data).await?;
        tracing::info!(role_id = %id, name = %updated.name, "Role updated");
        Ok(updated)
    }

    /// Soft delete; system roles are rejected with `RoleIsSystem`
    pub async fn delete_role(&self, id: Uuid) -> RepoResult<()> {
        role::soft_delete(&self.pool, id).await?;
        tracing::info!(role_id = %id, "Role deleted");
        Ok(())
    }

    pub async fn list_roles(&self) -> RepoResult<Vec<RoleWithPermissions>> {
        let roles = role::find_all(&self.pool).await?;
        let mut result = Vec::with_capacity(roles.len());
        for r in roles {
            let permissions = permission::permissions_of(&self.pool, r.id).await?;
            result.push(RoleWithPermissions { role: r, permissions });
        }
        Ok(result)
    }

    pub async fn get_role(&self, id: Uuid) -> RepoResult<RoleWithPermissions> {
        let r = role::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| role_not_found(id))?;
        let permissions = permission::permissions_of(&self.pool, id).await?;
        Ok(RoleWithPermissions { role: r, permissions })
    }

    pub async fn get_role_by_name(&self, name: &str) -> RepoResult<Option<Role>> {
        role::find_by_name(&self.pool, name).await
    }

    /// Live permissions of a live role
    pub async fn role_permissions(&self, role_id: Uuid) -> RepoResult<Vec<Permission>> {
        if role::find_by_id(&self.pool, role_id).await?.is_none() {
            return Err(role_not_found(role_id));
        }
        permission::permissions_of(&self.pool, role_id).await
    }

    /// Live roles of a live user
    pub async fn user_roles(&self, user_id: Uuid) -> RepoResult<Vec<Role>> {
        if user::find_by_id(&self.pool, user_id).await?.is_none() {
            return Err(user::not_found(user_id));
        }
        role::roles_of(&self.pool, user_id).await
    }

    // ========== Permissions ==========

    /// Fails with `PermissionNameExists` when a live permission already has the name
    pub async fn create_permission(&self, data: PermissionCreate) -> RepoResult<Permission> {
        let (resource, action) = data.resource_action();
        if resource.is_empty() || action.is_empty() {
            return Err(RepoError::Validation(format!(
                "Permission '{}' must be named resource:action",
                data.name
            )));
        }
        let created = permission::create(&self.pool, data).await?;
        tracing::info!(permission_id = %created.id, name = %created.name, "Permission created");
        Ok(created)
    }

    pub async fn update_permission(&self, id: Uuid, data: PermissionUpdate) -> RepoResult<Permission> {
        let updated = permission::update(&self.pool, id, data).await?;
        tracing::info!(permission_id = %id, name = %updated.name, "Permission updated");
        Ok(updated)
    }

    pub async fn delete_permission(&self, id: Uuid) -> RepoResult<()> {
        permission::soft_delete(&self.pool, id).await?;
        tracing::info!(permission_id = %id, "Permission deleted");
        Ok(())
    }

    pub async fn list_permissions(&self, resource: Option<&str>) -> RepoResult<Vec<Permission>> {
        permission::find_all(&self.pool, resource).await
    }

    // ========== Assignments ==========

    /// Replace a role's permission set
    ///
    /// Fails with `RoleNotFound` for a missing role. Permission ids that do not
    /// resolve to a live permission are dropped and reported in `skipped`.
    pub async fn assign_permissions_to_role(
        &self,
        role_id: Uuid,
        permission_ids: &[Uuid],
    ) -> RepoResult<AssignmentOutcome> {
        let outcome =
            association::replace(&self.pool, Junction::RolePermissions, role_id, permission_ids)
                .await?;
        log_assignment("role permissions replaced", role_id, &outcome);
        Ok(outcome)
    }

    /// Replace a user's role set; same contract as [`Self::assign_permissions_to_role`]
    pub async fn assign_roles_to_user(
        &self,
        user_id: Uuid,
        role_ids: &[Uuid],
    ) -> RepoResult<AssignmentOutcome> {
        let outcome =
            association::replace(&self.pool, Junction::UserRoles, user_id, role_ids).await?;
        log_assignment("user roles replaced", user_id, &outcome);
        Ok(outcome)
    }
}

fn role_not_found(id: Uuid) -> RepoError {
    RepoError::NotFound(ErrorCode::RoleNotFound, format!("Role {id} not found"))
}

fn log_assignment(what: &str, owner: Uuid, outcome: &AssignmentOutcome) {
    if outcome.is_complete() {
        tracing::info!(owner = %owner, applied = outcome.applied.len(), "{what}");
    } else {
        tracing::warn!(
            owner = %owner,
            applied = outcome.applied.len(),
            skipped = ?outcome.skipped,
            "{what}; unknown ids dropped"
        );
    }
}
