//! Role-based access control
//!
//! - [`Resolver`] - effective permissions and role membership, read on demand
//! - [`RbacAdmin`] - role/permission CRUD and association replacement
//! - [`Bootstrap`] - first-run seeding of the default catalog
//! - [`Gate`] - request-time allow/deny decisions
//!
//! Nothing here caches: every decision re-reads the store.

pub mod admin;
pub mod bootstrap;
pub mod catalog;
pub mod gate;
pub mod resolver;

pub use admin::RbacAdmin;
pub use bootstrap::{Bootstrap, BootstrapOutcome, BootstrapState};
pub use gate::{Gate, GateError, Requirement};
pub use resolver::{EffectivePermissions, Resolver};
