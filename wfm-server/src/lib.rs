//! Workforce Management Server
//!
//! Multi-tenant workforce-management backend: user/team administration,
//! attendance clock-in/out, leave approval workflow, task tracking, and
//! messaging/notifications. JSON HTTP API over an embedded SurrealDB
//! document store.
//!
//! # Module structure
//!
//! ```text
//! wfm-server/src/
//! ├── core/          # Config, state, server loop
//! ├── auth/          # JWT tokens, credential hashing, auth middleware
//! ├── api/           # HTTP routes and handlers
//! ├── db/            # Models and repositories
//! └── utils/         # Time helpers, logging
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod utils;

// Re-export common types
pub use auth::{CurrentUser, JwtService, TokenPair};
pub use core::{Config, Server, ServerState};
pub use shared::{ApiResponse, AppError, AppResult, Pagination};
pub use utils::logger::init_logger;
