//! Permission Model

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Permission entity, named `resource:action` (e.g. `user:read`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Permission {
    pub id: Uuid,
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub resource: String,
    pub action: String,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<i64>,
}

/// Create permission payload
///
/// `resource` and `action` may be omitted; they are then split out of `name`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PermissionCreate {
    #[validate(length(min = 3, max = 128), custom(function = "validate_permission_name"))]
    pub name: String,
    #[validate(length(min = 1, max = 128))]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub resource: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
}

impl PermissionCreate {
    /// `(resource, action)`, falling back to the halves of `name`
    pub fn resource_action(&self) -> (String, String) {
        let (res, act) = split_permission_name(&self.name).unwrap_or((self.name.as_str(), ""));
        (
            self.resource.clone().unwrap_or_else(|| res.to_string()),
            self.action.clone().unwrap_or_else(|| act.to_string()),
        )
    }
}

/// Update permission payload (presentation fields only; `name` is immutable)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PermissionUpdate {
    #[validate(length(min = 1, max = 128))]
    pub display_name: Option<String>,
    pub description: Option<String>,
}

/// Split `resource:action` into its two non-empty halves
pub fn split_permission_name(name: &str) -> Option<(&str, &str)> {
    match name.split_once(':') {
        Some((resource, action)) if !resource.is_empty() && !action.is_empty() => {
            Some((resource, action))
        }
        _ => None,
    }
}

fn validate_permission_name(name: &str) -> Result<(), ValidationError> {
    split_permission_name(name)
        .map(|_| ())
        .ok_or_else(|| ValidationError::new("permission_name_format"))
}
