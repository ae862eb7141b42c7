//! Task API handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use shared::{ApiResponse, AppError, AppResult, Pagination};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Task, TaskCreate, TaskStatus, TaskUpdate};
use crate::db::repository::TaskRepository;

#[derive(Deserialize)]
pub struct TaskListQuery {
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

#[derive(Deserialize)]
pub struct StatusRequest {
    pub status: Option<TaskStatus>,
}

#[derive(Deserialize)]
pub struct CommentRequest {
    pub text: Option<String>,
}

#[derive(Deserialize)]
pub struct AttachmentRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<TaskListQuery>,
) -> AppResult<Json<ApiResponse<Vec<Task>>>> {
    let page = query.page.unwrap_or(1).max(1);
    let page_size = query.page_size.unwrap_or(20).max(1);

    let repo = TaskRepository::new(state.get_db());
    let (tasks, total) = repo
        .list(
            query.status,
            query.team_id.as_deref(),
            query.assigned_to.as_deref(),
            page,
            page_size,
        )
        .await?;

    Ok(Json(ApiResponse::page(
        tasks,
        Pagination::new(page, page_size, total),
    )))
}

pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(mut payload): Json<TaskCreate>,
) -> AppResult<Json<ApiResponse<Task>>> {
    if payload.assigned_by_id.is_none() {
        payload.assigned_by_id = Some(current.id);
    }

    let repo = TaskRepository::new(state.get_db());
    let task = repo.create(payload).await?;
    Ok(Json(ApiResponse::ok(task)))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Task>>> {
    let repo = TaskRepository::new(state.get_db());
    let task = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Task {} not found", id)))?;
    Ok(Json(ApiResponse::ok(task)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<TaskUpdate>,
) -> AppResult<Json<ApiResponse<Task>>> {
    let repo = TaskRepository::new(state.get_db());
    let task = repo.update(&id, payload).await?;
    Ok(Json(ApiResponse::ok(task)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    let repo = TaskRepository::new(state.get_db());
    repo.delete(&id).await?;
    Ok(Json(ApiResponse::ok_message("Task deleted")))
}

pub async fn change_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<StatusRequest>,
) -> AppResult<Json<ApiResponse<Task>>> {
    let status = payload
        .status
        .ok_or_else(|| AppError::validation("Status is required"))?;

    let repo = TaskRepository::new(state.get_db());
    let task = repo.change_status(&id, status).await?;
    Ok(Json(ApiResponse::ok(task)))
}

pub async fn add_comment(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<CommentRequest>,
) -> AppResult<Json<ApiResponse<Task>>> {
    let text = payload
        .text
        .ok_or_else(|| AppError::validation("Comment text is required"))?;

    let repo = TaskRepository::new(state.get_db());
    let task = repo.add_comment(&id, &current.id, &text).await?;
    Ok(Json(ApiResponse::ok(task)))
}

pub async fn add_attachment(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<AttachmentRequest>,
) -> AppResult<Json<ApiResponse<Task>>> {
    let repo = TaskRepository::new(state.get_db());
    let task = repo.add_attachment(&id, payload.name, payload.url).await?;
    Ok(Json(ApiResponse::ok(task)))
}
