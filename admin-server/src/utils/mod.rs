//! Utilities
//!
//! - [`logger`] - tracing subscriber setup

pub mod logger;
