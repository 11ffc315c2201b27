//! Application services
//!
//! - [`UserService`] - accounts: registration, credentials, CRUD
//! - [`demo_accounts`] - development accounts seeded on an empty user table

pub mod demo_accounts;
pub mod users;

pub use users::UserService;
