//! Core - configuration, shared state and the HTTP server
//!
//! - [`Config`] - environment-driven configuration
//! - [`ServerState`] - services shared by every handler
//! - [`Server`] - router assembly and serving

pub mod config;
pub mod server;
pub mod state;

pub use config::{BoxError, Config};
pub use server::{Server, build_app};
pub use state::ServerState;
