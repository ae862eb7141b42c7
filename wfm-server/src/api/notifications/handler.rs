//! Notification API handlers
//!
//! Listing is always scoped to the authenticated caller.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use shared::{ApiResponse, AppError, AppResult, Pagination};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Notification, NotificationCreate};
use crate::db::repository::NotificationRepository;

#[derive(Deserialize)]
pub struct NotificationListQuery {
    #[serde(default)]
    pub unread_only: Option<bool>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

#[derive(Serialize)]
pub struct ReadAllResult {
    pub marked: u64,
}

pub async fn list(
    State(state): State<ServerState>,
    current: CurrentUser,
    Query(query): Query<NotificationListQuery>,
) -> AppResult<Json<ApiResponse<Vec<Notification>>>> {
    let page = query.page.unwrap_or(1).max(1);
    let page_size = query.page_size.unwrap_or(20).max(1);

    let repo = NotificationRepository::new(state.get_db());
    let (notifications, total) = repo
        .list(
            &current.id,
            query.unread_only.unwrap_or(false),
            page,
            page_size,
        )
        .await?;

    Ok(Json(ApiResponse::page(
        notifications,
        Pagination::new(page, page_size, total),
    )))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<NotificationCreate>,
) -> AppResult<Json<ApiResponse<Notification>>> {
    let repo = NotificationRepository::new(state.get_db());
    let notification = repo.create(payload).await?;
    Ok(Json(ApiResponse::ok(notification)))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Notification>>> {
    let repo = NotificationRepository::new(state.get_db());
    let notification = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Notification {} not found", id)))?;
    Ok(Json(ApiResponse::ok(notification)))
}

pub async fn mark_read(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Notification>>> {
    let repo = NotificationRepository::new(state.get_db());
    let notification = repo.mark_read(&id).await?;
    Ok(Json(ApiResponse::ok(notification)))
}

pub async fn mark_all_read(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<ApiResponse<ReadAllResult>>> {
    let repo = NotificationRepository::new(state.get_db());
    let marked = repo.mark_all_read(&current.id).await?;
    Ok(Json(ApiResponse::ok(ReadAllResult { marked })))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    let repo = NotificationRepository::new(state.get_db());
    repo.delete(&id).await?;
    Ok(Json(ApiResponse::ok_message("Notification deleted")))
}
