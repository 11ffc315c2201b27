//! RBAC behavior against a real (in-memory) SQLite store

use std::collections::HashSet;

use admin_server::db::DbService;
use admin_server::db::repository::association::{self, linked_ids};
use admin_server::db::repository::user::{self, NewUser};
use admin_server::db::repository::{Junction, RepoError, role};
use admin_server::rbac::catalog::{PERMISSIONS, ROLES};
use admin_server::rbac::{
    Bootstrap, BootstrapOutcome, BootstrapState, Gate, GateError, RbacAdmin, Requirement, Resolver,
};
use admin_server::services::UserService;
use shared::error::ErrorCode;
use shared::models::{Permission, PermissionCreate, Role, RoleCreate, RoleUpdate, User, UserCreate};
use sqlx::SqlitePool;
use uuid::Uuid;

async fn setup() -> (SqlitePool, RbacAdmin, Resolver) {
    let db = DbService::in_memory().await.unwrap();
    let pool = db.pool.clone();
    (pool.clone(), RbacAdmin::new(pool.clone()), Resolver::new(pool))
}

async fn new_user(pool: &SqlitePool, username: &str) -> User {
    user::create(
        pool,
        NewUser {
            username: username.into(),
            email: String::new(),
            password_hash: "not-a-real-hash".into(),
            name: username.into(),
        },
    )
    .await
    .unwrap()
}

async fn new_role(admin: &RbacAdmin, name: &str) -> Role {
    admin
        .create_role(RoleCreate {
            name: name.into(),
            display_name: name.into(),
            description: String::new(),
            is_system: false,
        })
        .await
        .unwrap()
}

async fn new_permission(admin: &RbacAdmin, name: &str) -> Permission {
    admin
        .create_permission(PermissionCreate {
            name: name.into(),
            display_name: name.into(),
            description: String::new(),
            resource: None,
            action: None,
        })
        .await
        .unwrap()
}

fn id_set(ids: &[Uuid]) -> HashSet<Uuid> {
    ids.iter().copied().collect()
}

async fn effective_names(resolver: &Resolver, user_id: Uuid) -> Vec<String> {
    resolver.effective_permissions(user_id).await.unwrap().names()
}

// ========== Bootstrap ==========

#[tokio::test]
async fn test_bootstrap_is_idempotent() {
    let (pool, admin, _) = setup().await;

    let first = Bootstrap::new(pool.clone());
    assert_eq!(first.state().await, BootstrapState::Uninitialized);
    let outcome = first.run().await.unwrap();
    assert!(matches!(outcome, BootstrapOutcome::Seeded { roles: 4, .. }));
    assert_eq!(first.state().await, BootstrapState::Seeded);

    let roles_before = admin.list_roles().await.unwrap();
    let permissions_before = admin.list_permissions(None).await.unwrap();

    // Same instance: terminal state
    assert_eq!(first.run().await.unwrap(), BootstrapOutcome::AlreadySeeded);

    // Fresh instance (next process start): precondition check
    let second = Bootstrap::new(pool.clone());
    assert_eq!(
        second.run().await.unwrap(),
        BootstrapOutcome::Skipped { existing_roles: 4 }
    );
    assert_eq!(second.state().await, BootstrapState::Seeded);

    let roles_after = admin.list_roles().await.unwrap();
    let permissions_after = admin.list_permissions(None).await.unwrap();

    let names: HashSet<&str> = roles_after.iter().map(|r| r.role.name.as_str()).collect();
    assert_eq!(names, HashSet::from(["super_admin", "admin", "user", "guest"]));
    assert!(roles_after.iter().all(|r| r.role.is_system));

    // Zero writes: every row identical, timestamps included
    assert_eq!(permissions_before, permissions_after);
    for (before, after) in roles_before.iter().zip(&roles_after) {
        assert_eq!(before.role, after.role);
        assert_eq!(before.permissions, after.permissions);
    }
}

#[tokio::test]
async fn test_bootstrap_skips_when_only_tombstoned_roles_exist() {
    let (pool, admin, _) = setup().await;
    let r = new_role(&admin, "temporary").await;
    admin.delete_role(r.id).await.unwrap();

    let outcome = Bootstrap::new(pool).run().await.unwrap();
    assert_eq!(outcome, BootstrapOutcome::Skipped { existing_roles: 1 });
    assert!(admin.list_roles().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_bootstrap_reuses_permissions_left_by_an_interrupted_run() {
    let (pool, admin, _) = setup().await;
    // Permissions written, no role yet: what a run stopped half-way leaves behind
    let leftover = new_permission(&admin, "user:read").await;

    let outcome = Bootstrap::new(pool.clone()).run().await.unwrap();
    assert_eq!(
        outcome,
        BootstrapOutcome::Seeded {
            permissions: PERMISSIONS.len() - 1,
            roles: ROLES.len(),
        }
    );

    let permissions = admin.list_permissions(None).await.unwrap();
    assert_eq!(permissions.len(), PERMISSIONS.len());
    let user_read: Vec<Uuid> = permissions
        .iter()
        .filter(|p| p.name == "user:read")
        .map(|p| p.id)
        .collect();
    assert_eq!(user_read, vec![leftover.id]);

    let admin_role = admin.get_role_by_name("admin").await.unwrap().unwrap();
    let linked = linked_ids(&pool, Junction::RolePermissions, admin_role.id).await.unwrap();
    assert!(linked.contains(&leftover.id));

    // Next start sees the roles and skips
    let outcome = Bootstrap::new(pool).run().await.unwrap();
    assert_eq!(outcome, BootstrapOutcome::Skipped { existing_roles: ROLES.len() as i64 });
}

#[tokio::test]
async fn test_bootstrap_role_permission_sets() {
    let (pool, admin, resolver) = setup().await;
    Bootstrap::new(pool.clone()).run().await.unwrap();

    let guest = admin.get_role_by_name("guest").await.unwrap().unwrap();
    let guest_permissions: Vec<String> = admin
        .role_permissions(guest.id)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(guest_permissions, vec!["announcement:read", "dashboard:view"]);

    let u = new_user(&pool, "root").await;
    let super_admin = admin.get_role_by_name("super_admin").await.unwrap().unwrap();
    admin.assign_roles_to_user(u.id, &[super_admin.id]).await.unwrap();

    assert!(resolver.has_permission(u.id, "system:admin").await.unwrap());
    assert!(resolver.has_permission(u.id, "user:manage").await.unwrap());
    // Names are exact: manage does not imply read
    assert!(!resolver.has_permission(u.id, "user:read").await.unwrap());
}

// ========== Resolver ==========

#[tokio::test]
async fn test_effective_permissions_union_deduplicates() {
    let (pool, admin, resolver) = setup().await;
    let p1 = new_permission(&admin, "doc:read").await;
    let p2 = new_permission(&admin, "doc:write").await;
    let p3 = new_permission(&admin, "doc:delete").await;
    let a = new_role(&admin, "a").await;
    let b = new_role(&admin, "b").await;
    admin.assign_permissions_to_role(a.id, &[p1.id, p2.id]).await.unwrap();
    admin.assign_permissions_to_role(b.id, &[p2.id, p3.id]).await.unwrap();

    let u = new_user(&pool, "alice").await;
    admin.assign_roles_to_user(u.id, &[a.id, b.id]).await.unwrap();

    let effective = resolver.effective_permissions(u.id).await.unwrap();
    assert_eq!(effective.len(), 3);
    let ids: HashSet<Uuid> = effective.iter().map(|p| p.id).collect();
    assert_eq!(ids, HashSet::from([p1.id, p2.id, p3.id]));
}

#[tokio::test]
async fn test_unknown_user_is_not_found() {
    let (pool, _, resolver) = setup().await;

    let err = resolver.effective_permissions(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, RepoError::NotFound(ErrorCode::UserNotFound, _)));

    let err = resolver.has_permission(Uuid::new_v4(), "doc:read").await.unwrap_err();
    assert!(err.is_not_found());

    // Deleted users are gone too
    let u = new_user(&pool, "bob").await;
    user::soft_delete(&pool, u.id).await.unwrap();
    assert!(resolver.effective_permissions(u.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_missing_permission_is_false_not_error() {
    let (pool, _, resolver) = setup().await;
    let u = new_user(&pool, "carol").await;

    assert!(resolver.effective_permissions(u.id).await.unwrap().is_empty());
    assert!(!resolver.has_permission(u.id, "no:such").await.unwrap());
    assert!(!resolver.has_role(u.id, "admin").await.unwrap());
}

#[tokio::test]
async fn test_has_role_is_direct_assignment() {
    let (pool, admin, resolver) = setup().await;
    let p = new_permission(&admin, "doc:read").await;
    let editor = new_role(&admin, "editor").await;
    let reader = new_role(&admin, "reader").await;
    admin.assign_permissions_to_role(editor.id, &[p.id]).await.unwrap();
    admin.assign_permissions_to_role(reader.id, &[p.id]).await.unwrap();

    let u = new_user(&pool, "dave").await;
    admin.assign_roles_to_user(u.id, &[editor.id]).await.unwrap();

    assert!(resolver.has_role(u.id, "editor").await.unwrap());
    // Holding every permission of `reader` does not make the user a reader
    assert!(!resolver.has_role(u.id, "reader").await.unwrap());
}

// ========== Soft delete ==========

#[tokio::test]
async fn test_deleted_role_grants_nothing() {
    let (pool, admin, resolver) = setup().await;
    let p1 = new_permission(&admin, "doc:read").await;
    let a = new_role(&admin, "a").await;
    admin.assign_permissions_to_role(a.id, &[p1.id]).await.unwrap();
    let u = new_user(&pool, "erin").await;
    admin.assign_roles_to_user(u.id, &[a.id]).await.unwrap();
    assert!(resolver.has_permission(u.id, "doc:read").await.unwrap());

    admin.delete_role(a.id).await.unwrap();

    // The link row survives, the resolver ignores it
    assert_eq!(linked_ids(&pool, Junction::UserRoles, u.id).await.unwrap(), vec![a.id]);
    assert!(resolver.effective_permissions(u.id).await.unwrap().is_empty());
    assert!(!resolver.has_permission(u.id, "doc:read").await.unwrap());
    assert!(!resolver.has_role(u.id, "a").await.unwrap());
    assert!(admin.user_roles(u.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_deleted_permission_stops_resolving() {
    let (pool, admin, resolver) = setup().await;
    let p1 = new_permission(&admin, "doc:read").await;
    let p2 = new_permission(&admin, "doc:write").await;
    let a = new_role(&admin, "a").await;
    admin.assign_permissions_to_role(a.id, &[p1.id, p2.id]).await.unwrap();
    let u = new_user(&pool, "frank").await;
    admin.assign_roles_to_user(u.id, &[a.id]).await.unwrap();

    admin.delete_permission(p2.id).await.unwrap();

    assert_eq!(effective_names(&resolver, u.id).await, vec!["doc:read"]);
    let role_permissions = admin.role_permissions(a.id).await.unwrap();
    assert_eq!(role_permissions.len(), 1);
    assert_eq!(role_permissions[0].id, p1.id);
}

// ========== Admin operations ==========

#[tokio::test]
async fn test_assignment_replaces_previous_set() {
    let (_, admin, _) = setup().await;
    let p1 = new_permission(&admin, "doc:read").await;
    let p2 = new_permission(&admin, "doc:write").await;
    let p3 = new_permission(&admin, "doc:delete").await;
    let r = new_role(&admin, "r").await;

    admin.assign_permissions_to_role(r.id, &[p1.id, p2.id]).await.unwrap();
    let outcome = admin.assign_permissions_to_role(r.id, &[p3.id]).await.unwrap();
    assert_eq!(outcome.applied, vec![p3.id]);

    let current = admin.role_permissions(r.id).await.unwrap();
    assert_eq!(current.len(), 1);
    assert_eq!(current[0].id, p3.id);

    // Empty target list clears the set
    admin.assign_permissions_to_role(r.id, &[]).await.unwrap();
    assert!(admin.role_permissions(r.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_duplicate_target_ids_collapse() {
    let (pool, admin, _) = setup().await;
    let p1 = new_permission(&admin, "doc:read").await;
    let r = new_role(&admin, "r").await;

    let outcome = admin
        .assign_permissions_to_role(r.id, &[p1.id, p1.id, p1.id])
        .await
        .unwrap();

    assert_eq!(outcome.applied, vec![p1.id]);
    assert!(outcome.skipped.is_empty());
    assert_eq!(
        linked_ids(&pool, Junction::RolePermissions, r.id).await.unwrap(),
        vec![p1.id]
    );
}

#[tokio::test]
async fn test_unknown_role_ids_are_skipped() {
    let (pool, admin, resolver) = setup().await;
    let valid = new_role(&admin, "valid").await;
    let deleted = new_role(&admin, "deleted").await;
    admin.delete_role(deleted.id).await.unwrap();
    let u = new_user(&pool, "grace").await;
    let missing = Uuid::new_v4();

    let outcome = admin
        .assign_roles_to_user(u.id, &[valid.id, missing, deleted.id])
        .await
        .unwrap();

    assert_eq!(outcome.applied, vec![valid.id]);
    assert_eq!(id_set(&outcome.skipped), id_set(&[missing, deleted.id]));
    assert!(!outcome.is_complete());

    let roles = resolver.roles_of(u.id).await.unwrap();
    assert_eq!(roles.len(), 1);
    assert_eq!(roles[0].id, valid.id);
    assert_eq!(linked_ids(&pool, Junction::UserRoles, u.id).await.unwrap(), vec![valid.id]);
}

#[tokio::test]
async fn test_assign_to_missing_owner_changes_nothing() {
    let (pool, admin, _) = setup().await;
    let p1 = new_permission(&admin, "doc:read").await;
    let p2 = new_permission(&admin, "doc:write").await;
    let r = new_role(&admin, "r").await;
    admin.assign_permissions_to_role(r.id, &[p1.id]).await.unwrap();
    admin.delete_role(r.id).await.unwrap();

    let err = admin.assign_permissions_to_role(r.id, &[p2.id]).await.unwrap_err();
    assert!(matches!(err, RepoError::NotFound(ErrorCode::RoleNotFound, _)));
    // The delete half of the replace was rolled back
    assert_eq!(
        linked_ids(&pool, Junction::RolePermissions, r.id).await.unwrap(),
        vec![p1.id]
    );

    let err = admin.assign_roles_to_user(Uuid::new_v4(), &[]).await.unwrap_err();
    assert!(matches!(err, RepoError::NotFound(ErrorCode::UserNotFound, _)));
}

#[tokio::test]
async fn test_account_and_role_link_are_written_together() {
    let (pool, admin, _) = setup().await;
    let editor = new_role(&admin, "editor").await;

    let created = UserService::new(pool.clone())
        .create_user(UserCreate {
            username: "erin".into(),
            email: None,
            password: "secret99".into(),
            name: "Erin".into(),
            role: Some("editor".into()),
        })
        .await
        .unwrap();
    let roles: Vec<Uuid> = admin.user_roles(created.id).await.unwrap().iter().map(|r| r.id).collect();
    assert_eq!(roles, vec![editor.id]);

    // Same two writes, abandoned before commit: neither survives
    let id = Uuid::new_v4();
    {
        let mut tx = pool.begin().await.unwrap();
        user::insert(
            &mut tx,
            id,
            &NewUser {
                username: "frank".into(),
                email: String::new(),
                password_hash: "not-a-real-hash".into(),
                name: "Frank".into(),
            },
        )
        .await
        .unwrap();
        let outcome = association::replace_in(&mut tx, Junction::UserRoles, id, &[editor.id])
            .await
            .unwrap();
        assert_eq!(outcome.applied, vec![editor.id]);
    }
    assert!(user::find_by_id(&pool, id).await.unwrap().is_none());
    assert!(linked_ids(&pool, Junction::UserRoles, id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_duplicate_role_name_conflicts() {
    let (_, admin, _) = setup().await;
    let first = new_role(&admin, "admin").await;

    let err = admin
        .create_role(RoleCreate {
            name: "admin".into(),
            display_name: "Again".into(),
            description: String::new(),
            is_system: false,
        })
        .await
        .unwrap_err();
    assert!(err.is_conflict());
    assert!(matches!(err, RepoError::Duplicate(ErrorCode::RoleNameExists, _)));

    // Uniqueness holds among live rows only
    admin.delete_role(first.id).await.unwrap();
    let again = new_role(&admin, "admin").await;
    assert_ne!(again.id, first.id);
}

#[tokio::test]
async fn test_duplicate_permission_name_conflicts() {
    let (_, admin, _) = setup().await;
    new_permission(&admin, "doc:read").await;

    let err = admin
        .create_permission(PermissionCreate {
            name: "doc:read".into(),
            display_name: "Read".into(),
            description: String::new(),
            resource: None,
            action: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Duplicate(ErrorCode::PermissionNameExists, _)));
}

#[tokio::test]
async fn test_permission_resource_action_split() {
    let (_, admin, _) = setup().await;
    let p = new_permission(&admin, "ticket:manage").await;
    assert_eq!(p.resource, "ticket");
    assert_eq!(p.action, "manage");

    new_permission(&admin, "doc:read").await;
    let tickets = admin.list_permissions(Some("ticket")).await.unwrap();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0].id, p.id);
}

#[tokio::test]
async fn test_system_role_cannot_be_deleted_or_renamed() {
    let (pool, admin, _) = setup().await;
    Bootstrap::new(pool.clone()).run().await.unwrap();
    let admin_role = admin.get_role_by_name("admin").await.unwrap().unwrap();

    let err = admin.delete_role(admin_role.id).await.unwrap_err();
    assert!(matches!(err, RepoError::Business(ErrorCode::RoleIsSystem, _)));
    assert!(role::find_by_id(&pool, admin_role.id).await.unwrap().is_some());

    let err = admin
        .update_role(
            admin_role.id,
            RoleUpdate {
                name: Some("root".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Business(ErrorCode::RoleIsSystem, _)));

    // Presentation fields stay editable
    let updated = admin
        .update_role(
            admin_role.id,
            RoleUpdate {
                display_name: Some("Operators".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "admin");
    assert_eq!(updated.display_name, "Operators");
}

#[tokio::test]
async fn test_concurrent_replace_last_commit_wins() {
    let (_, admin, _) = setup().await;
    let p1 = new_permission(&admin, "doc:read").await;
    let p2 = new_permission(&admin, "doc:write").await;
    let p3 = new_permission(&admin, "doc:delete").await;
    let r = new_role(&admin, "r").await;

    let (role_id, first, second) = (r.id, [p1.id, p2.id], [p3.id]);
    let left = {
        let admin = admin.clone();
        tokio::spawn(async move { admin.assign_permissions_to_role(role_id, &first).await })
    };
    let right = {
        let admin = admin.clone();
        tokio::spawn(async move { admin.assign_permissions_to_role(role_id, &second).await })
    };
    left.await.unwrap().unwrap();
    right.await.unwrap().unwrap();

    // Never a mix of the two sets
    let current: HashSet<Uuid> = admin
        .role_permissions(r.id)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert!(
        current == HashSet::from([p1.id, p2.id]) || current == HashSet::from([p3.id]),
        "partial replace observed: {current:?}"
    );
}

// ========== Gate ==========

#[tokio::test]
async fn test_gate_decisions() {
    let (pool, admin, resolver) = setup().await;
    Bootstrap::new(pool.clone()).run().await.unwrap();
    let gate = Gate::new(resolver);

    let u = new_user(&pool, "heidi").await;
    let guest = admin.get_role_by_name("guest").await.unwrap().unwrap();
    admin.assign_roles_to_user(u.id, &[guest.id]).await.unwrap();

    assert!(gate.authorize(u.id, Requirement::Permission("dashboard:view")).await.is_ok());
    assert!(gate.authorize(u.id, Requirement::Role("guest")).await.is_ok());
    assert!(
        gate.authorize(u.id, Requirement::AnyPermission(&["user:read", "announcement:read"]))
            .await
            .is_ok()
    );

    let denied = gate.authorize(u.id, Requirement::Permission("system:admin")).await;
    assert!(matches!(denied, Err(GateError::PermissionDenied(_))));

    let denied = gate.authorize(u.id, Requirement::Role("admin")).await;
    assert!(matches!(denied, Err(GateError::RoleRequired(_))));

    let ghost = gate.authorize(Uuid::new_v4(), Requirement::Permission("dashboard:view")).await;
    assert!(matches!(ghost, Err(GateError::Unauthenticated)));
}

#[tokio::test]
async fn test_gate_sees_changes_immediately() {
    let (pool, admin, resolver) = setup().await;
    let gate = Gate::new(resolver);
    let p = new_permission(&admin, "doc:read").await;
    let r = new_role(&admin, "r").await;
    let u = new_user(&pool, "ivan").await;
    admin.assign_roles_to_user(u.id, &[r.id]).await.unwrap();

    let need = Requirement::Permission("doc:read");
    assert!(gate.authorize(u.id, need).await.is_err());

    admin.assign_permissions_to_role(r.id, &[p.id]).await.unwrap();
    assert!(gate.authorize(u.id, need).await.is_ok());

    admin.assign_permissions_to_role(r.id, &[]).await.unwrap();
    assert!(gate.authorize(u.id, need).await.is_err());
}

// ========== Persistence ==========

#[tokio::test]
async fn test_bootstrap_runs_once_per_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("admin.db");
    let path = path.to_str().unwrap();

    let db = DbService::new(path).await.unwrap();
    let outcome = Bootstrap::new(db.pool.clone()).run().await.unwrap();
    assert!(matches!(outcome, BootstrapOutcome::Seeded { .. }));
    db.pool.close().await;

    // Next process start on the same file
    let db = DbService::new(path).await.unwrap();
    let outcome = Bootstrap::new(db.pool.clone()).run().await.unwrap();
    assert_eq!(outcome, BootstrapOutcome::Skipped { existing_roles: 4 });
    assert_eq!(RbacAdmin::new(db.pool.clone()).list_roles().await.unwrap().len(), 4);
}
