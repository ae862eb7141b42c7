//! CurrentUser extractor
//!
//! Handlers take [`CurrentUser`] as an argument to get the identity the
//! auth middleware resolved. Requests that bypassed the middleware (none
//! in practice) are rejected as unauthenticated.

use axum::{extract::FromRequestParts, http::request::Parts};

use shared::AppError;

use crate::auth::CurrentUser;
use crate::core::ServerState;

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}
