//! Shared types for the workforce-management backend
//!
//! Holds everything both the server and any future client binaries need to
//! agree on:
//!
//! - **Errors** (`error`): [`AppError`] with a fixed set of kinds, each
//!   mapped to an HTTP status code
//! - **Responses** (`response`): the `{success, message, data, pagination}`
//!   envelope every endpoint returns

pub mod error;
pub mod response;

pub use error::{AppError, AppResult};
pub use response::{ApiResponse, Pagination};
