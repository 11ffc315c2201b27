//! Junction tables (`user_roles`, `role_permissions`)
//!
//! Assignment is always a full replace executed in one transaction.

use std::collections::HashSet;

use super::{RepoError, RepoResult};
use shared::client::AssignmentOutcome;
use shared::error::ErrorCode;
use shared::util::now_millis;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

/// A many-to-many relation, seen from its owning side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Junction {
    /// user -> roles
    UserRoles,
    /// role -> permissions
    RolePermissions,
}

impl Junction {
    const fn table(self) -> &'static str {
        match self {
            Junction::UserRoles => "user_roles",
            Junction::RolePermissions => "role_permissions",
        }
    }

    const fn owner_table(self) -> &'static str {
        match self {
            Junction::UserRoles => "users",
            Junction::RolePermissions => "roles",
        }
    }

    const fn owner_column(self) -> &'static str {
        match self {
            Junction::UserRoles => "user_id",
            Junction::RolePermissions => "role_id",
        }
    }

    const fn target_table(self) -> &'static str {
        match self {
            Junction::UserRoles => "roles",
            Junction::RolePermissions => "permissions",
        }
    }

    const fn target_column(self) -> &'static str {
        match self {
            Junction::UserRoles => "role_id",
            Junction::RolePermissions => "permission_id",
        }
    }

    fn owner_not_found(self, owner: Uuid) -> RepoError {
        match self {
            Junction::UserRoles => {
                RepoError::NotFound(ErrorCode::UserNotFound, format!("User {owner} not found"))
            }
            Junction::RolePermissions => {
                RepoError::NotFound(ErrorCode::RoleNotFound, format!("Role {owner} not found"))
            }
        }
    }
}

/// Replace every link of `owner` with `targets`
///
/// The owner must be live. Targets are de-duplicated (first occurrence wins)
/// and each is linked only if it resolves to a live row; the rest are
/// reported as skipped. Delete and inserts commit together or not at all.
pub async fn replace(
    pool: &SqlitePool,
    junction: Junction,
    owner: Uuid,
    targets: &[Uuid],
) -> RepoResult<AssignmentOutcome> {
    let mut tx = pool.begin().await?;
    // Dropping the transaction on error rolls the delete back
    let outcome = replace_in(&mut tx, junction, owner, targets).await?;
    tx.commit().await?;
    Ok(outcome)
}

/// [`replace`] inside a caller-owned transaction
///
/// Nothing is committed here; the caller decides.
pub async fn replace_in(
    conn: &mut SqliteConnection,
    junction: Junction,
    owner: Uuid,
    targets: &[Uuid],
) -> RepoResult<AssignmentOutcome> {
    let mut seen = HashSet::with_capacity(targets.len());
    let unique: Vec<Uuid> = targets.iter().copied().filter(|id| seen.insert(*id)).collect();

    let delete_sql = format!(
        "DELETE FROM {} WHERE {} = ?",
        junction.table(),
        junction.owner_column()
    );
    let owner_sql = format!(
        "SELECT COUNT(*) FROM {} WHERE id = ? AND deleted_at IS NULL",
        junction.owner_table()
    );
    let insert_sql = format!(
        "INSERT INTO {} ({}, {}, created_at) SELECT ?, id, ? FROM {} WHERE id = ? AND deleted_at IS NULL",
        junction.table(),
        junction.owner_column(),
        junction.target_column(),
        junction.target_table()
    );

    // Write first so the transaction holds the write lock from the start
    sqlx::query(&delete_sql).bind(owner).execute(&mut *conn).await?;

    let owner_live: i64 = sqlx::query_scalar(&owner_sql)
        .bind(owner)
        .fetch_one(&mut *conn)
        .await?;
    if owner_live == 0 {
        return Err(junction.owner_not_found(owner));
    }

    let now = now_millis();
    let mut outcome = AssignmentOutcome::default();
    for target in unique {
        let inserted = sqlx::query(&insert_sql)
            .bind(owner)
            .bind(now)
            .bind(target)
            .execute(&mut *conn)
            .await?
            .rows_affected();
        if inserted > 0 {
            outcome.applied.push(target);
        } else {
            outcome.skipped.push(target);
        }
    }

    Ok(outcome)
}

/// Raw target ids linked to `owner`, including links to deleted rows
pub async fn linked_ids(pool: &SqlitePool, junction: Junction, owner: Uuid) -> RepoResult<Vec<Uuid>> {
    let sql = format!(
        "SELECT {} FROM {} WHERE {} = ?",
        junction.target_column(),
        junction.table(),
        junction.owner_column()
    );
    let ids: Vec<Uuid> = sqlx::query_scalar(&sql).bind(owner).fetch_all(pool).await?;
    Ok(ids)
}
