//! Default permission catalog and system roles seeded on first run

pub struct PermissionSeed {
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
}

pub struct RoleSeed {
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub permissions: &'static [&'static str],
}

const fn perm(
    name: &'static str,
    display_name: &'static str,
    description: &'static str,
) -> PermissionSeed {
    PermissionSeed {
        name,
        display_name,
        description,
    }
}

pub const PERMISSIONS: &[PermissionSeed] = &[
    // Users
    perm("user:read", "View users", "List and view user accounts"),
    perm("user:write", "Edit users", "Create and edit user accounts"),
    perm("user:delete", "Delete users", "Delete user accounts"),
    perm("user:manage", "Manage users", "Full user administration, including role assignment"),
    // Services
    perm("service:read", "View services", "View the service catalog"),
    perm("service:write", "Edit services", "Create and edit services"),
    perm("service:delete", "Delete services", "Delete services"),
    perm("service:manage", "Manage services", "Full service administration"),
    // Tickets
    perm("ticket:read", "View tickets", "View support tickets"),
    perm("ticket:write", "Edit tickets", "Create and reply to tickets"),
    perm("ticket:delete", "Delete tickets", "Delete tickets"),
    perm("ticket:manage", "Manage tickets", "Assign and close any ticket"),
    // Announcements
    perm("announcement:read", "View announcements", "Read announcements"),
    perm("announcement:write", "Edit announcements", "Publish and edit announcements"),
    perm("announcement:delete", "Delete announcements", "Delete announcements"),
    perm("announcement:manage", "Manage announcements", "Full announcement administration"),
    // API keys
    perm("apikey:read", "View API keys", "List own API keys"),
    perm("apikey:write", "Create API keys", "Create and rotate API keys"),
    perm("apikey:delete", "Delete API keys", "Revoke API keys"),
    // System
    perm("system:settings", "System settings", "Change system settings"),
    perm("system:admin", "System administration", "Manage roles and permissions"),
    perm("dashboard:view", "View dashboard", "Access the dashboard"),
];

pub const ROLES: &[RoleSeed] = &[
    RoleSeed {
        name: "super_admin",
        display_name: "Super Administrator",
        description: "Unrestricted access to every area",
        permissions: &[
            "user:manage",
            "service:manage",
            "ticket:manage",
            "announcement:manage",
            "apikey:read",
            "apikey:write",
            "apikey:delete",
            "system:settings",
            "system:admin",
            "dashboard:view",
        ],
    },
    RoleSeed {
        name: "admin",
        display_name: "Administrator",
        description: "Day-to-day administration",
        permissions: &[
            "user:read",
            "user:write",
            "service:manage",
            "ticket:manage",
            "announcement:manage",
            "dashboard:view",
        ],
    },
    RoleSeed {
        name: "user",
        display_name: "User",
        description: "Regular account",
        permissions: &[
            "service:read",
            "ticket:read",
            "ticket:write",
            "announcement:read",
            "apikey:read",
            "apikey:write",
            "dashboard:view",
        ],
    },
    RoleSeed {
        name: "guest",
        display_name: "Guest",
        description: "Read-only visitor",
        permissions: &["announcement:read", "dashboard:view"],
    },
];

/// Role given to self-registered accounts
pub const DEFAULT_ROLE: &str = "user";

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::split_permission_name;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_names_are_unique_and_well_formed() {
        let mut names = HashSet::new();
        for p in PERMISSIONS {
            assert!(split_permission_name(p.name).is_some(), "{}", p.name);
            assert!(names.insert(p.name), "duplicate {}", p.name);
        }
        assert_eq!(PERMISSIONS.len(), 22);
    }

    #[test]
    fn test_role_seeds_reference_catalog() {
        let names: HashSet<_> = PERMISSIONS.iter().map(|p| p.name).collect();
        for role in ROLES {
            for p in role.permissions {
                assert!(names.contains(p), "{} references unknown {}", role.name, p);
            }
        }
        assert!(ROLES.iter().any(|r| r.name == DEFAULT_ROLE));
    }
}
