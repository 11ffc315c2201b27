//! Demo accounts for development databases

use shared::models::UserCreate;
use sqlx::SqlitePool;

use super::UserService;
use crate::db::repository::{RepoResult, user};

struct DemoAccount {
    username: &'static str,
    email: &'static str,
    password: &'static str,
    name: &'static str,
    role: &'static str,
}

const ACCOUNTS: &[DemoAccount] = &[
    DemoAccount {
        username: "test_user",
        email: "test@example.com",
        password: "123456",
        name: "Test User",
        role: "user",
    },
    DemoAccount {
        username: "admin",
        email: "admin@example.com",
        password: "admin123",
        name: "Administrator",
        role: "admin",
    },
    DemoAccount {
        username: "demo",
        email: "demo@example.com",
        password: "demo123",
        name: "Demo User",
        role: "user",
    },
];

/// Create the demo accounts when no user row has ever been written
///
/// Returns the number of accounts created. Run after the RBAC bootstrap so
/// the role names resolve.
pub async fn seed(pool: &SqlitePool, users: &UserService) -> RepoResult<usize> {
    let existing = user::count_all(pool).await?;
    if existing > 0 {
        tracing::debug!(existing, "Users present, skipping demo accounts");
        return Ok(0);
    }

    for account in ACCOUNTS {
        users
            .create_user(UserCreate {
                username: account.username.to_string(),
                email: Some(account.email.to_string()),
                password: account.password.to_string(),
                name: account.name.to_string(),
                role: Some(account.role.to_string()),
            })
            .await?;
    }

    tracing::info!(count = ACCOUNTS.len(), "Demo accounts created");
    Ok(ACCOUNTS.len())
}
