//! User API handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use shared::{ApiResponse, AppError, AppResult, Pagination};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Role, User, UserUpdate};
use crate::db::repository::UserRepository;

#[derive(Deserialize)]
pub struct UserListQuery {
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

/// List users, filterable by role and team
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<UserListQuery>,
) -> AppResult<Json<ApiResponse<Vec<User>>>> {
    let page = query.page.unwrap_or(1).max(1);
    let page_size = query.page_size.unwrap_or(20).max(1);

    let repo = UserRepository::new(state.get_db());
    let (users, total) = repo
        .list(query.role, query.team_id.as_deref(), page, page_size)
        .await?;

    Ok(Json(ApiResponse::page(
        users,
        Pagination::new(page, page_size, total),
    )))
}

/// The authenticated caller's own record
pub async fn me(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<ApiResponse<User>>> {
    let repo = UserRepository::new(state.get_db());
    let user = repo.require(&current.id).await?;
    Ok(Json(ApiResponse::ok(user)))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<User>>> {
    let repo = UserRepository::new(state.get_db());
    let user = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {} not found", id)))?;
    Ok(Json(ApiResponse::ok(user)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<UserUpdate>,
) -> AppResult<Json<ApiResponse<User>>> {
    let repo = UserRepository::new(state.get_db());
    let user = repo.update(&id, payload).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// Permanent removal; there is no soft delete
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    let repo = UserRepository::new(state.get_db());
    repo.delete(&id).await?;
    Ok(Json(ApiResponse::ok_message("User deleted")))
}
