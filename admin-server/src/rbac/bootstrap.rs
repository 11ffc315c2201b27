//! First-run seeding of permissions and system roles
//!
//! Idempotent by precondition: if any role row exists (tombstones included)
//! the run is skipped without writing. The seed itself is one transaction.

use std::collections::HashMap;

use shared::models::{PermissionCreate, RoleCreate};
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::catalog::{PERMISSIONS, ROLES};
use crate::db::repository::{Junction, RepoError, RepoResult, association, permission, role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapState {
    Uninitialized,
    Seeding,
    /// Terminal
    Seeded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// Catalog written by this run; `permissions` counts rows created, not reused
    Seeded { permissions: usize, roles: usize },
    /// Store already held roles
    Skipped { existing_roles: i64 },
    /// This instance already finished a run
    AlreadySeeded,
}

/// Seeds the default catalog once per database
pub struct Bootstrap {
    pool: SqlitePool,
    state: Mutex<BootstrapState>,
}

impl Bootstrap {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            state: Mutex::new(BootstrapState::Uninitialized),
        }
    }

    pub async fn state(&self) -> BootstrapState {
        *self.state.lock().await
    }

    /// Run the seed sequence
    ///
    /// The state lock is held for the whole run, so concurrent callers on the
    /// same instance wait and then observe `AlreadySeeded`. A failed run
    /// resets to `Uninitialized` and returns the error.
    pub async fn run(&self) -> RepoResult<BootstrapOutcome> {
        let mut state = self.state.lock().await;
        if *state == BootstrapState::Seeded {
            return Ok(BootstrapOutcome::AlreadySeeded);
        }

        let existing_roles = role::count_all(&self.pool).await?;
        if existing_roles > 0 {
            tracing::info!(existing_roles, "RBAC already initialized, skipping bootstrap");
            *state = BootstrapState::Seeded;
            return Ok(BootstrapOutcome::Skipped { existing_roles });
        }

        *state = BootstrapState::Seeding;
        match self.seed().await {
            Ok(outcome) => {
                *state = BootstrapState::Seeded;
                Ok(outcome)
            }
            Err(e) => {
                tracing::error!(error = %e, "RBAC bootstrap failed");
                *state = BootstrapState::Uninitialized;
                Err(e)
            }
        }
    }

    /// Write the catalog in one transaction
    ///
    /// Live permissions already carrying a catalog name are reused, so leftovers
    /// from an earlier interrupted run never block startup.
    async fn seed(&self) -> RepoResult<BootstrapOutcome> {
        tracing::info!("Seeding default permissions and roles");

        let mut tx = self.pool.begin().await?;

        let mut ids: HashMap<&'static str, Uuid> = HashMap::with_capacity(PERMISSIONS.len());
        let mut created = 0;
        for seed in PERMISSIONS {
            let id = match permission::find_live_by_name(&mut tx, seed.name).await? {
                Some(existing) => {
                    tracing::warn!(name = seed.name, "Permission already present, reusing it");
                    existing.id
                }
                None => {
                    let id = Uuid::new_v4();
                    let data = PermissionCreate {
                        name: seed.name.to_string(),
                        display_name: seed.display_name.to_string(),
                        description: seed.description.to_string(),
                        resource: None,
                        action: None,
                    };
                    permission::insert(&mut tx, id, &data).await?;
                    created += 1;
                    id
                }
            };
            ids.insert(seed.name, id);
        }

        for seed in ROLES {
            let role_id = Uuid::new_v4();
            let data = RoleCreate {
                name: seed.name.to_string(),
                display_name: seed.display_name.to_string(),
                description: seed.description.to_string(),
                is_system: true,
            };
            role::insert(&mut tx, role_id, &data).await?;

            let permission_ids = seed
                .permissions
                .iter()
                .map(|name| {
                    ids.get(name).copied().ok_or_else(|| {
                        RepoError::Validation(format!("Role '{}' seeds unknown permission '{name}'", seed.name))
                    })
                })
                .collect::<RepoResult<Vec<Uuid>>>()?;

            association::replace_in(&mut tx, Junction::RolePermissions, role_id, &permission_ids)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(
            permissions = created,
            reused = PERMISSIONS.len() - created,
            roles = ROLES.len(),
            "RBAC bootstrap complete"
        );
        Ok(BootstrapOutcome::Seeded {
            permissions: created,
            roles: ROLES.len(),
        })
    }
}
