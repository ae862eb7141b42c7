//! Authentication module
//!
//! - [`JwtService`] - access/refresh token issuance and validation
//! - [`credential`] - password hashing and verification
//! - [`CurrentUser`] - resolved caller identity
//! - [`require_auth`] - bearer-token middleware

pub mod credential;
pub mod extractor;
pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService, TokenPair};
pub use middleware::require_auth;
