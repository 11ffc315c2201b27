//! User Repository

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::{User, UserStatus};
use shared::util::now_millis;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

const COLUMNS: &str = "id, username, email, password_hash, name, avatar, status, last_login, \
                       created_at, updated_at, deleted_at";

/// Insert payload; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
}

/// Column changes; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub status: Option<UserStatus>,
    pub password_hash: Option<String>,
}

pub fn not_found(id: Uuid) -> RepoError {
    RepoError::NotFound(ErrorCode::UserNotFound, format!("User {id} not found"))
}

pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> RepoResult<Option<User>> {
    let mut conn = pool.acquire().await?;
    find_live(&mut conn, id).await
}

/// Same as [`find_by_id`] on an existing connection or transaction
pub async fn find_live(conn: &mut SqliteConnection, id: Uuid) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {COLUMNS} FROM users WHERE id = ? AND deleted_at IS NULL"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(user)
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {COLUMNS} FROM users WHERE username = ? AND deleted_at IS NULL LIMIT 1"
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// Empty email never matches
pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<User>> {
    if email.is_empty() {
        return Ok(None);
    }
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {COLUMNS} FROM users WHERE email = ? AND deleted_at IS NULL LIMIT 1"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// One page of live users, newest first, plus the live total
pub async fn find_page(pool: &SqlitePool, limit: i64, offset: i64) -> RepoResult<(Vec<User>, i64)> {
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {COLUMNS} FROM users WHERE deleted_at IS NULL \
         ORDER BY created_at DESC, username LIMIT ? OFFSET ?"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE deleted_at IS NULL")
        .fetch_one(pool)
        .await?;

    Ok((users, total))
}

/// Number of user rows ever written, tombstones included
pub async fn count_all(pool: &SqlitePool) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn create(pool: &SqlitePool, data: NewUser) -> RepoResult<User> {
    let id = Uuid::new_v4();
    {
        let mut conn = pool.acquire().await?;
        insert(&mut conn, id, &data).await?;
    }

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))
}

/// Raw insert of an active user with a caller-chosen id
pub async fn insert(conn: &mut SqliteConnection, id: Uuid, data: &NewUser) -> RepoResult<()> {
    let now = now_millis();
    sqlx::query(
        "INSERT INTO users (id, username, email, password_hash, name, status, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(&data.username)
    .bind(&data.email)
    .bind(&data.password_hash)
    .bind(&data.name)
    .bind(UserStatus::Active)
    .bind(now)
    .bind(now)
    .execute(conn)
    .await
    .map_err(|e| {
        RepoError::from(e).on_duplicate(
            ErrorCode::UsernameExists,
            format!("Username '{}' or its email is already taken", data.username),
        )
    })?;
    Ok(())
}

pub async fn update(pool: &SqlitePool, id: Uuid, changes: UserChanges) -> RepoResult<User> {
    let rows = sqlx::query(
        "UPDATE users SET name = COALESCE(?1, name), email = COALESCE(?2, email), \
         avatar = COALESCE(?3, avatar), status = COALESCE(?4, status), \
         password_hash = COALESCE(?5, password_hash), updated_at = ?6 \
         WHERE id = ?7 AND deleted_at IS NULL",
    )
    .bind(changes.name)
    .bind(changes.email)
    .bind(changes.avatar)
    .bind(changes.status)
    .bind(changes.password_hash)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| RepoError::from(e).on_duplicate(ErrorCode::EmailExists, "Email already exists"))?;

    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }
    find_by_id(pool, id).await?.ok_or_else(|| not_found(id))
}

pub async fn touch_last_login(pool: &SqlitePool, id: Uuid) -> RepoResult<i64> {
    let now = now_millis();
    sqlx::query("UPDATE users SET last_login = ?1 WHERE id = ?2 AND deleted_at IS NULL")
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(now)
}

pub async fn soft_delete(pool: &SqlitePool, id: Uuid) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE users SET deleted_at = ?1, updated_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
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
