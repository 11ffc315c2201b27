//! Authentication and authorization plumbing
//!
//! - [`JwtService`] - token issue/validation
//! - [`CurrentUser`] - authenticated caller
//! - [`require_auth`] - authentication middleware
//! - [`require_permission`] / [`require_any_permission`] / [`require_role`] - gate middleware
//! - [`password`] - Argon2 hashing

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService, generate_printable_secret};
pub use middleware::{
    CurrentUserExt, PUBLIC_PATHS, require_any_permission, require_auth, require_permission,
    require_role,
};
