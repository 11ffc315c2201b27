//! Error system for the admin backend
//!
//! - [`ErrorCode`]: numeric codes grouped by range
//! - [`ErrorCategory`]: classification derived from the code range
//! - [`AppError`]: code + message + optional details
//! - [`ApiResponse`]: the JSON envelope every endpoint returns
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiResponse};
//!
//! let err = AppError::with_message(ErrorCode::RoleNameExists, "Role 'auditor' already exists")
//!     .with_detail("name", "auditor");
//!
//! let response = ApiResponse::<()>::error(&err);
//! assert_eq!(response.code, Some(8102));
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
