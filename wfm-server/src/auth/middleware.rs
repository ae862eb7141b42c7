//! Authentication middleware
//!
//! Extracts and validates the bearer access token, then resolves the
//! claimed user id to a live user document. A token whose user no longer
//! exists, or whose user has been deactivated, fails authentication even
//! if the signature is still valid.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use shared::AppError;

use crate::auth::{CurrentUser, JwtService};
use crate::core::ServerState;
use crate::db::repository::UserRepository;

/// Routes reachable without a token
const PUBLIC_PATHS: &[&str] = &["/auth/register", "/auth/login", "/auth/refresh", "/health"];

/// Require a valid bearer token resolving to an active user.
///
/// On success a [`CurrentUser`] is injected into request extensions.
///
/// | Failure | Status |
/// |---------|--------|
/// | Missing Authorization header | 401 Unauthorized |
/// | Expired token | 401 TokenExpired |
/// | Malformed/forged token, unknown or inactive user | 401 InvalidToken |
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // CORS preflight passes through
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    if PUBLIC_PATHS.contains(&req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            tracing::warn!(uri = %req.uri(), "Request without authorization header");
            return Err(AppError::unauthorized());
        }
    };

    let claims = state.jwt.validate_access(token).map_err(|e| {
        tracing::warn!(uri = %req.uri(), error = %e, "Token validation failed");
        match e {
            crate::auth::JwtError::ExpiredToken => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid token"),
        }
    })?;

    // Resolve the subject claim to a user document
    let repo = UserRepository::new(state.get_db());
    let user = repo
        .find_by_id(&claims.sub)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::invalid_token("Unknown user"))?;

    if !user.is_active {
        return Err(AppError::invalid_token("User is inactive"));
    }

    let current = CurrentUser {
        id: claims.sub,
        email: user.email,
        role: user.role,
    };
    req.extensions_mut().insert(current);

    Ok(next.run(req).await)
}
