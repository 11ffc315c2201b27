//! Permission Repository

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::{Permission, PermissionCreate, PermissionUpdate};
use shared::util::now_millis;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

const COLUMNS: &str = "id, name, display_name, description, resource, action, \
                       created_at, updated_at, deleted_at";

fn not_found(id: Uuid) -> RepoError {
    RepoError::NotFound(ErrorCode::PermissionNotFound, format!("Permission {id} not found"))
}

/// Live permissions, optionally filtered by resource
pub async fn find_all(pool: &SqlitePool, resource: Option<&str>) -> RepoResult<Vec<Permission>> {
    let permissions = sqlx::query_as::<_, Permission>(&format!(
        "SELECT {COLUMNS} FROM permissions \
         WHERE deleted_at IS NULL AND (?1 IS NULL OR resource = ?1) \
         ORDER BY resource, action"
    ))
    .bind(resource)
    .fetch_all(pool)
    .await?;
    Ok(permissions)
}

pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> RepoResult<Option<Permission>> {
    let permission = sqlx::query_as::<_, Permission>(&format!(
        "SELECT {COLUMNS} FROM permissions WHERE id = ? AND deleted_at IS NULL"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(permission)
}

pub async fn find_by_name(pool: &SqlitePool, name: &str) -> RepoResult<Option<Permission>> {
    let mut conn = pool.acquire().await?;
    find_live_by_name(&mut conn, name).await
}

/// Same as [`find_by_name`] on an existing connection or transaction
pub async fn find_live_by_name(
    conn: &mut SqliteConnection,
    name: &str,
) -> RepoResult<Option<Permission>> {
    let permission = sqlx::query_as::<_, Permission>(&format!(
        "SELECT {COLUMNS} FROM permissions WHERE name = ? AND deleted_at IS NULL LIMIT 1"
    ))
    .bind(name)
    .fetch_optional(conn)
    .await?;
    Ok(permission)
}

/// Live permissions attached to a role (no check on the role itself)
pub async fn permissions_of(pool: &SqlitePool, role_id: Uuid) -> RepoResult<Vec<Permission>> {
    let permissions = sqlx::query_as::<_, Permission>(
        "SELECT p.id, p.name, p.display_name, p.description, p.resource, p.action, \
                p.created_at, p.updated_at, p.deleted_at \
         FROM role_permissions rp \
         JOIN permissions p ON p.id = rp.permission_id AND p.deleted_at IS NULL \
         WHERE rp.role_id = ? \
         ORDER BY p.resource, p.action",
    )
    .bind(role_id)
    .fetch_all(pool)
    .await?;
    Ok(permissions)
}

/// Live permissions reachable from a user through live roles, one row per link
pub async fn reachable_by_user(
    conn: &mut sqlx::SqliteConnection,
    user_id: Uuid,
) -> RepoResult<Vec<Permission>> {
    let permissions = sqlx::query_as::<_, Permission>(
        "SELECT p.id, p.name, p.display_name, p.description, p.resource, p.action, \
                p.created_at, p.updated_at, p.deleted_at \
         FROM user_roles ur \
         JOIN roles r ON r.id = ur.role_id AND r.deleted_at IS NULL \
         JOIN role_permissions rp ON rp.role_id = r.id \
         JOIN permissions p ON p.id = rp.permission_id AND p.deleted_at IS NULL \
         WHERE ur.user_id = ?",
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?;
    Ok(permissions)
}

pub async fn create(pool: &SqlitePool, data: PermissionCreate) -> RepoResult<Permission> {
    if find_by_name(pool, &data.name).await?.is_some() {
        return Err(RepoError::Duplicate(
            ErrorCode::PermissionNameExists,
            format!("Permission '{}' already exists", data.name),
        ));
    }

    let id = Uuid::new_v4();
    {
        let mut conn = pool.acquire().await?;
        insert(&mut conn, id, &data).await?;
    }

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create permission".into()))
}

/// Raw insert with a caller-chosen id; `resource`/`action` fall back to the name halves
pub async fn insert(
    conn: &mut SqliteConnection,
    id: Uuid,
    data: &PermissionCreate,
) -> RepoResult<()> {
    let (resource, action) = data.resource_action();
    let now = now_millis();
    sqlx::query(
        "INSERT INTO permissions (id, name, display_name, description, resource, action, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.display_name)
    .bind(&data.description)
    .bind(&resource)
    .bind(&action)
    .bind(now)
    .bind(now)
    .execute(conn)
    .await
    .map_err(|e| {
        RepoError::from(e).on_duplicate(
            ErrorCode::PermissionNameExists,
            format!("Permission '{}' already exists", data.name),
        )
    })?;
    Ok(())
}

pub async fn update(pool: &SqlitePool, id: Uuid, data: PermissionUpdate) -> RepoResult<Permission> {
    let rows = sqlx::query(
        "UPDATE permissions SET display_name = COALESCE(?1, display_name), \
         description = COALESCE(?2, description), updated_at = ?3 \
         WHERE id = ?4 AND deleted_at IS NULL",
    )
    .bind(data.display_name.as_deref())
    .bind(data.description.as_deref())
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }
    find_by_id(pool, id).await?.ok_or_else(|| not_found(id))
}

pub async fn soft_delete(pool: &SqlitePool, id: Uuid) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE permissions SET deleted_at = ?1, updated_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
    )
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }
    Ok(())
}
