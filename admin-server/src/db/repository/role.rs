//! Role Repository

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::{Role, RoleCreate, RoleUpdate};
use shared::util::now_millis;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

const COLUMNS: &str =
    "id, name, display_name, description, is_system, created_at, updated_at, deleted_at";

fn not_found(id: Uuid) -> RepoError {
    RepoError::NotFound(ErrorCode::RoleNotFound, format!("Role {id} not found"))
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Role>> {
    let roles = sqlx::query_as::<_, Role>(&format!(
        "SELECT {COLUMNS} FROM roles WHERE deleted_at IS NULL ORDER BY created_at, name"
    ))
    .fetch_all(pool)
    .await?;
    Ok(roles)
}

pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> RepoResult<Option<Role>> {
    let role = sqlx::query_as::<_, Role>(&format!(
        "SELECT {COLUMNS} FROM roles WHERE id = ? AND deleted_at IS NULL"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(role)
}

pub async fn find_by_name(pool: &SqlitePool, name: &str) -> RepoResult<Option<Role>> {
    let role = sqlx::query_as::<_, Role>(&format!(
        "SELECT {COLUMNS} FROM roles WHERE name = ? AND deleted_at IS NULL LIMIT 1"
    ))
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(role)
}

/// Live roles currently linked to a user
pub async fn roles_of(pool: &SqlitePool, user_id: Uuid) -> RepoResult<Vec<Role>> {
    let roles = sqlx::query_as::<_, Role>(
        "SELECT r.id, r.name, r.display_name, r.description, r.is_system, \
                r.created_at, r.updated_at, r.deleted_at \
         FROM user_roles ur \
         JOIN roles r ON r.id = ur.role_id AND r.deleted_at IS NULL \
         WHERE ur.user_id = ? \
         ORDER BY r.name",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(roles)
}

/// Number of role rows ever written, tombstones included
pub async fn count_all(pool: &SqlitePool) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM roles")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn create(pool: &SqlitePool, data: RoleCreate) -> RepoResult<Role> {
    if find_by_name(pool, &data.name).await?.is_some() {
        return Err(RepoError::Duplicate(
            ErrorCode::RoleNameExists,
            format!("Role '{}' already exists", data.name),
        ));
    }

    let id = Uuid::new_v4();
    {
        let mut conn = pool.acquire().await?;
        insert(&mut conn, id, &data).await?;
    }

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create role".into()))
}

/// Raw insert with a caller-chosen id (no pre-check beyond the unique index)
pub async fn insert(conn: &mut SqliteConnection, id: Uuid, data: &RoleCreate) -> RepoResult<()> {
    let now = now_millis();
    sqlx::query(
        "INSERT INTO roles (id, name, display_name, description, is_system, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.display_name)
    .bind(&data.description)
    .bind(data.is_system)
    .bind(now)
    .bind(now)
    .execute(conn)
    .await
    .map_err(|e| {
        RepoError::from(e).on_duplicate(
            ErrorCode::RoleNameExists,
            format!("Role '{}' already exists", data.name),
        )
    })?;
    Ok(())
}

/// Update display fields; renaming a system role is rejected
pub async fn update(pool: &SqlitePool, id: Uuid, data: RoleUpdate) -> RepoResult<Role> {
    let existing = find_by_id(pool, id).await?.ok_or_else(|| not_found(id))?;

    let renamed = data.name.as_deref().filter(|n| *n != existing.name);
    if let Some(new_name) = renamed {
        if existing.is_system {
            return Err(RepoError::Business(
                ErrorCode::RoleIsSystem,
                format!("Cannot rename system role '{}'", existing.name),
            ));
        }
        if find_by_name(pool, new_name).await?.is_some() {
            return Err(RepoError::Duplicate(
                ErrorCode::RoleNameExists,
                format!("Role '{new_name}' already exists"),
            ));
        }
    }

    let rows = sqlx::query(
        "UPDATE roles SET name = COALESCE(?1, name), display_name = COALESCE(?2, display_name), \
         description = COALESCE(?3, description), updated_at = ?4 \
         WHERE id = ?5 AND deleted_at IS NULL",
    )
    .bind(renamed)
    .bind(data.display_name.as_deref())
    .bind(data.description.as_deref())
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| {
        RepoError::from(e).on_duplicate(ErrorCode::RoleNameExists, "Role name already exists")
    })?;

    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }
    find_by_id(pool, id).await?.ok_or_else(|| not_found(id))
}

/// Tombstone a role; system roles are rejected
///
/// Junction rows are kept; the resolver ignores links to deleted roles.
pub async fn soft_delete(pool: &SqlitePool, id: Uuid) -> RepoResult<()> {
    let existing = find_by_id(pool, id).await?.ok_or_else(|| not_found(id))?;

    if existing.is_system {
        return Err(RepoError::Business(
            ErrorCode::RoleIsSystem,
            format!("Cannot delete system role '{}'", existing.name),
        ));
    }

    let rows = sqlx::query("UPDATE roles SET deleted_at = ?1, updated_at = ?1 WHERE id = ?2 AND deleted_at IS NULL")
        .bind(now_millis())
        .bind(id)
        .execute(pool)
        .await?;

    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }
    Ok(())
}
