//! Team API handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use shared::{ApiResponse, AppError, AppResult, Pagination};

use crate::api::PageQuery;
use crate::core::ServerState;
use crate::db::models::{Team, TeamCreate, TeamUpdate};
use crate::db::repository::TeamRepository;

#[derive(Deserialize)]
pub struct MemberRequest {
    pub user_id: Option<String>,
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<Vec<Team>>>> {
    let repo = TeamRepository::new(state.get_db());
    let (teams, total) = repo.list(query.page(), query.page_size()).await?;
    Ok(Json(ApiResponse::page(
        teams,
        Pagination::new(query.page(), query.page_size(), total),
    )))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<TeamCreate>,
) -> AppResult<Json<ApiResponse<Team>>> {
    let repo = TeamRepository::new(state.get_db());
    let team = repo.create(payload).await?;
    Ok(Json(ApiResponse::ok(team)))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Team>>> {
    let repo = TeamRepository::new(state.get_db());
    let team = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Team {} not found", id)))?;
    Ok(Json(ApiResponse::ok(team)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<TeamUpdate>,
) -> AppResult<Json<ApiResponse<Team>>> {
    let repo = TeamRepository::new(state.get_db());
    let team = repo.update(&id, payload).await?;
    Ok(Json(ApiResponse::ok(team)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    let repo = TeamRepository::new(state.get_db());
    repo.delete(&id).await?;
    Ok(Json(ApiResponse::ok_message("Team deleted")))
}

pub async fn add_member(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<MemberRequest>,
) -> AppResult<Json<ApiResponse<Team>>> {
    let user_id = required_user_id(payload)?;
    let repo = TeamRepository::new(state.get_db());
    let team = repo.add_member(&id, &user_id).await?;
    Ok(Json(ApiResponse::ok(team)))
}

pub async fn remove_member(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<MemberRequest>,
) -> AppResult<Json<ApiResponse<Team>>> {
    let user_id = required_user_id(payload)?;
    let repo = TeamRepository::new(state.get_db());
    let team = repo.remove_member(&id, &user_id).await?;
    Ok(Json(ApiResponse::ok(team)))
}

pub async fn change_leader(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<MemberRequest>,
) -> AppResult<Json<ApiResponse<Team>>> {
    let user_id = required_user_id(payload)?;
    let repo = TeamRepository::new(state.get_db());
    let team = repo.change_leader(&id, &user_id).await?;
    Ok(Json(ApiResponse::ok(team)))
}

fn required_user_id(payload: MemberRequest) -> Result<String, AppError> {
    payload
        .user_id
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::validation("User id is required"))
}
