//! Leave API handlers
//!
//! A request is filed for the caller unless an explicit `user_id` is
//! given; approval and rejection stamp the caller as the approver.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use shared::{ApiResponse, AppError, AppResult, Pagination};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Leave, LeaveCreate, LeaveStatus, LeaveType, LeaveUpdate};
use crate::db::repository::LeaveRepository;

#[derive(Deserialize)]
pub struct LeaveListQuery {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub status: Option<LeaveStatus>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

#[derive(Deserialize)]
pub struct LeaveRequestPayload {
    /// Defaults to the authenticated caller
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(rename = "type")]
    pub leave_type: LeaveType,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub number_of_days: i64,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Deserialize)]
pub struct RejectRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<LeaveListQuery>,
) -> AppResult<Json<ApiResponse<Vec<Leave>>>> {
    let page = query.page.unwrap_or(1).max(1);
    let page_size = query.page_size.unwrap_or(20).max(1);

    let repo = LeaveRepository::new(state.get_db());
    let (leaves, total) = repo
        .list(query.user_id.as_deref(), query.status, page, page_size)
        .await?;

    Ok(Json(ApiResponse::page(
        leaves,
        Pagination::new(page, page_size, total),
    )))
}

pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<LeaveRequestPayload>,
) -> AppResult<Json<ApiResponse<Leave>>> {
    let data = LeaveCreate {
        user_id: payload.user_id.unwrap_or(current.id),
        leave_type: payload.leave_type,
        start_date: payload.start_date,
        end_date: payload.end_date,
        number_of_days: payload.number_of_days,
        reason: payload.reason,
    };

    let repo = LeaveRepository::new(state.get_db());
    let leave = repo.request(data).await?;
    Ok(Json(ApiResponse::ok(leave)))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Leave>>> {
    let repo = LeaveRepository::new(state.get_db());
    let leave = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Leave {} not found", id)))?;
    Ok(Json(ApiResponse::ok(leave)))
}

/// Edit a still-pending request
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<LeaveUpdate>,
) -> AppResult<Json<ApiResponse<Leave>>> {
    let repo = LeaveRepository::new(state.get_db());
    let leave = repo.update(&id, payload).await?;
    Ok(Json(ApiResponse::ok(leave)))
}

/// Remove a request in any state
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    let repo = LeaveRepository::new(state.get_db());
    repo.delete(&id).await?;
    Ok(Json(ApiResponse::ok_message("Leave deleted")))
}

pub async fn approve(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Leave>>> {
    let repo = LeaveRepository::new(state.get_db());
    let leave = repo.approve(&id, &current.id).await?;

    tracing::info!(leave = %id, by = %current.id, "Leave approved");
    Ok(Json(ApiResponse::ok(leave)))
}

pub async fn reject(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<RejectRequest>,
) -> AppResult<Json<ApiResponse<Leave>>> {
    let reason = payload.reason.unwrap_or_default();
    let repo = LeaveRepository::new(state.get_db());
    let leave = repo.reject(&id, &current.id, &reason).await?;

    tracing::info!(leave = %id, by = %current.id, "Leave rejected");
    Ok(Json(ApiResponse::ok(leave)))
}
