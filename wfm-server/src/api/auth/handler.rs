//! Authentication API handlers

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use shared::{ApiResponse, AppError, AppResult};

use crate::auth::{CurrentUser, TokenPair};
use crate::core::ServerState;
use crate::db::models::{Role, User, UserCreate};
use crate::db::repository::{RevokedTokenRepository, UserRepository};

/// User plus freshly issued token pair
#[derive(Serialize)]
pub struct AuthPayload {
    pub user: User,
    pub tokens: TokenPair,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh: Option<String>,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Deserialize)]
pub struct ForceResetRequest {
    pub user_id: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Deserialize)]
pub struct ActiveFlagRequest {
    pub user_id: Option<String>,
}

/// Create an account and sign the first token pair
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<UserCreate>,
) -> AppResult<Json<ApiResponse<AuthPayload>>> {
    let repo = UserRepository::new(state.get_db());
    let user = repo.register(payload).await?;
    let tokens = issue_for(&state, &user)?;

    tracing::info!(email = %user.email, "User registered");
    Ok(Json(ApiResponse::ok(AuthPayload { user, tokens })))
}

/// Exchange credentials for a token pair.
///
/// Unknown email and wrong password are deliberately indistinguishable.
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthPayload>>> {
    let email = payload
        .email
        .as_deref()
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::validation("Email is required"))?;
    let password = payload
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::validation("Password is required"))?;

    let repo = UserRepository::new(state.get_db());
    let user = repo
        .login(email, password)
        .await?
        .ok_or_else(|| AppError::validation("Invalid credentials"))?;
    let tokens = issue_for(&state, &user)?;

    Ok(Json(ApiResponse::ok(AuthPayload { user, tokens })))
}

/// Rotate a refresh token: the presented token is revoked and a new pair
/// is issued. A revoked or reused token fails authentication.
pub async fn refresh(
    State(state): State<ServerState>,
    Json(payload): Json<RefreshRequest>,
) -> AppResult<Json<ApiResponse<TokenPair>>> {
    let token = payload
        .refresh
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::validation("Refresh token is required"))?;

    let claims = state.jwt.validate_refresh(token).map_err(|e| match e {
        crate::auth::JwtError::ExpiredToken => AppError::token_expired(),
        _ => AppError::invalid_token("Invalid refresh token"),
    })?;

    let revoked = RevokedTokenRepository::new(state.get_db());
    if revoked.is_revoked(&claims.jti).await? {
        return Err(AppError::invalid_token("Refresh token has been revoked"));
    }

    let users = UserRepository::new(state.get_db());
    let user = users
        .find_by_id(&claims.sub)
        .await?
        .ok_or_else(|| AppError::invalid_token("Unknown user"))?;
    if !user.is_active {
        return Err(AppError::invalid_token("User is inactive"));
    }

    revoked.revoke(&claims.jti).await?;
    let tokens = issue_for(&state, &user)?;

    Ok(Json(ApiResponse::ok(tokens)))
}

/// Self-service password change; requires the current password
pub async fn change_password(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    let current_password = payload
        .current_password
        .as_deref()
        .ok_or_else(|| AppError::validation("Current password is required"))?;
    let new_password = payload
        .new_password
        .as_deref()
        .ok_or_else(|| AppError::validation("New password is required"))?;

    let repo = UserRepository::new(state.get_db());
    repo.change_password(&current.id, current_password, new_password)
        .await?;

    Ok(Json(ApiResponse::ok_message("Password changed")))
}

/// HR reset without knowledge of the old password
pub async fn force_reset_password(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<ForceResetRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    require_hr(&current)?;
    let user_id = payload
        .user_id
        .as_deref()
        .ok_or_else(|| AppError::validation("User id is required"))?;
    let new_password = payload
        .new_password
        .as_deref()
        .ok_or_else(|| AppError::validation("New password is required"))?;

    let repo = UserRepository::new(state.get_db());
    repo.force_reset_password(user_id, new_password).await?;

    tracing::info!(user = %user_id, by = %current.id, "Password force-reset");
    Ok(Json(ApiResponse::ok_message("Password reset")))
}

/// Deactivate an account; its tokens stop resolving immediately
pub async fn deactivate(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<ActiveFlagRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    set_active(&state, &current, payload, false).await
}

/// Re-enable a previously deactivated account
pub async fn reactivate(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<ActiveFlagRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    set_active(&state, &current, payload, true).await
}

async fn set_active(
    state: &ServerState,
    current: &CurrentUser,
    payload: ActiveFlagRequest,
    active: bool,
) -> AppResult<Json<ApiResponse<User>>> {
    require_hr(current)?;
    let user_id = payload
        .user_id
        .as_deref()
        .ok_or_else(|| AppError::validation("User id is required"))?;

    let repo = UserRepository::new(state.get_db());
    let user = repo.set_active(user_id, active).await?;

    tracing::info!(user = %user_id, active, by = %current.id, "Active flag changed");
    Ok(Json(ApiResponse::ok(user)))
}

fn require_hr(current: &CurrentUser) -> Result<(), AppError> {
    if current.role != Role::HrManager {
        return Err(AppError::forbidden("HR manager role required"));
    }
    Ok(())
}

fn issue_for(state: &ServerState, user: &User) -> Result<TokenPair, AppError> {
    let user_id = user
        .id
        .as_ref()
        .map(ToString::to_string)
        .ok_or_else(|| AppError::internal("User record has no id"))?;
    state
        .jwt
        .issue_pair(&user_id)
        .map_err(|e| AppError::internal(format!("Token generation failed: {}", e)))
}
