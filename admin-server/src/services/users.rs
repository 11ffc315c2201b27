//! User accounts

use shared::client::{PageQuery, Paginated};
use shared::error::ErrorCode;
use shared::models::{User, UserCreate, UserUpdate};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::db::repository::user::{NewUser, UserChanges};
use crate::db::repository::{Junction, RepoError, RepoResult, association, user};
use crate::rbac::RbacAdmin;
use crate::rbac::catalog::DEFAULT_ROLE;

#[derive(Clone)]
pub struct UserService {
    pool: SqlitePool,
    admin: RbacAdmin,
}

impl UserService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            admin: RbacAdmin::new(pool.clone()),
            pool,
        }
    }

    /// Create an active account and assign its role (default `user`)
    ///
    /// An unknown role name is skipped with a warning; the account is still created.
    /// The insert and the role link run in one transaction.
    pub async fn create_user(&self, data: UserCreate) -> RepoResult<User> {
        let email = data.email.unwrap_or_default();

        if user::find_by_username(&self.pool, &data.username).await?.is_some() {
            return Err(RepoError::Duplicate(
                ErrorCode::UsernameExists,
                format!("Username '{}' already exists", data.username),
            ));
        }
        if user::find_by_email(&self.pool, &email).await?.is_some() {
            return Err(RepoError::Duplicate(
                ErrorCode::EmailExists,
                format!("Email '{email}' already exists"),
            ));
        }

        let password_hash = hash(&data.password)?;
        let role_name = data.role.as_deref().unwrap_or(DEFAULT_ROLE);
        let role = self.admin.get_role_by_name(role_name).await?;

        let id = Uuid::new_v4();
        let new_user = NewUser {
            username: data.username,
            email,
            password_hash,
            name: data.name,
        };

        // Account and role link commit together
        let mut tx = self.pool.begin().await?;
        user::insert(&mut tx, id, &new_user).await?;
        let linked = match role {
            Some(role) => {
                association::replace_in(&mut tx, Junction::UserRoles, id, &[role.id])
                    .await?
                    .is_complete()
            }
            None => false,
        };
        tx.commit().await?;

        if !linked {
            tracing::warn!(user_id = %id, role = %role_name, "Role not found, user created without role");
        }

        let created = user::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| RepoError::Database("Failed to create user".into()))?;
        tracing::info!(user_id = %created.id, username = %created.username, "User created");
        Ok(created)
    }

    /// Verify a username/password pair and stamp `last_login`
    ///
    /// Unknown user and wrong password produce the same error.
    pub async fn check_credentials(&self, username: &str, password: &str) -> RepoResult<User> {
        let invalid = || RepoError::Business(ErrorCode::InvalidCredentials, "Invalid username or password".into());

        let Some(mut found) = user::find_by_username(&self.pool, username).await? else {
            return Err(invalid());
        };
        if !verify_password(password, &found.password_hash) {
            return Err(invalid());
        }
        if !found.is_active() {
            return Err(RepoError::Business(
                ErrorCode::AccountDisabled,
                "Account is disabled".into(),
            ));
        }

        found.last_login = Some(user::touch_last_login(&self.pool, found.id).await?);
        Ok(found)
    }

    pub async fn list_users(&self, query: PageQuery) -> RepoResult<Paginated<User>> {
        let (limit, offset) = query.limit_offset();
        let (items, total) = user::find_page(&self.pool, limit, offset).await?;
        Ok(Paginated {
            items,
            total,
            page: query.page.max(1),
            page_size: limit as u32,
        })
    }

    pub async fn get_user(&self, id: Uuid) -> RepoResult<User> {
        user::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| user::not_found(id))
    }

    pub async fn update_user(&self, id: Uuid, data: UserUpdate) -> RepoResult<User> {
        if let Some(email) = data.email.as_deref()
            && let Some(other) = user::find_by_email(&self.pool, email).await?
            && other.id != id
        {
            return Err(RepoError::Duplicate(
                ErrorCode::EmailExists,
                format!("Email '{email}' already exists"),
            ));
        }

        let password_hash = data.password.as_deref().map(hash).transpose()?;
        let updated = user::update(
            &self.pool,
            id,
            UserChanges {
                name: data.name,
                email: data.email,
                avatar: data.avatar,
                status: data.status,
                password_hash,
            },
        )
        .await?;

        tracing::info!(user_id = %id, "User updated");
        Ok(updated)
    }

    /// Soft delete; callers cannot delete themselves
    pub async fn delete_user(&self, id: Uuid, acting_user: Uuid) -> RepoResult<()> {
        if id == acting_user {
            return Err(RepoError::Business(
                ErrorCode::UserCannotDeleteSelf,
                "Cannot delete own account".into(),
            ));
        }
        user::soft_delete(&self.pool, id).await?;
        tracing::info!(user_id = %id, deleted_by = %acting_user, "User deleted");
        Ok(())
    }
}

fn hash(password: &str) -> RepoResult<String> {
    hash_password(password).map_err(|e| RepoError::Database(format!("Password hashing failed: {e}")))
}
