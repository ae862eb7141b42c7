//! Conversation API handlers
//!
//! Listing defaults to the caller's own conversations; creating one
//! always includes the caller as a participant.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use shared::{ApiResponse, AppError, AppResult, Pagination};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Conversation, ConversationCreate};
use crate::db::repository::ConversationRepository;

#[derive(Deserialize)]
pub struct ConversationListQuery {
    /// Filter by participant; defaults to the caller
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

#[derive(Deserialize)]
pub struct ParticipantRequest {
    pub user_id: Option<String>,
}

pub async fn list(
    State(state): State<ServerState>,
    current: CurrentUser,
    Query(query): Query<ConversationListQuery>,
) -> AppResult<Json<ApiResponse<Vec<Conversation>>>> {
    let page = query.page.unwrap_or(1).max(1);
    let page_size = query.page_size.unwrap_or(20).max(1);
    let user_id = query.user_id.unwrap_or(current.id);

    let repo = ConversationRepository::new(state.get_db());
    let (conversations, total) = repo.list(Some(user_id.as_str()), page, page_size).await?;

    Ok(Json(ApiResponse::page(
        conversations,
        Pagination::new(page, page_size, total),
    )))
}

pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(mut payload): Json<ConversationCreate>,
) -> AppResult<Json<ApiResponse<Conversation>>> {
    if !payload.participant_ids.contains(&current.id) {
        payload.participant_ids.push(current.id);
    }

    let repo = ConversationRepository::new(state.get_db());
    let conversation = repo.create(payload).await?;
    Ok(Json(ApiResponse::ok(conversation)))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Conversation>>> {
    let repo = ConversationRepository::new(state.get_db());
    let conversation = repo.require(&id).await?;
    Ok(Json(ApiResponse::ok(conversation)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    let repo = ConversationRepository::new(state.get_db());
    repo.delete(&id).await?;
    Ok(Json(ApiResponse::ok_message("Conversation deleted")))
}

pub async fn add_participant(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ParticipantRequest>,
) -> AppResult<Json<ApiResponse<Conversation>>> {
    let user_id = payload
        .user_id
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::validation("User id is required"))?;

    let repo = ConversationRepository::new(state.get_db());
    let conversation = repo.add_participant(&id, &user_id).await?;
    Ok(Json(ApiResponse::ok(conversation)))
}

pub async fn remove_participant(
    State(state): State<ServerState>,
    Path((id, user_id)): Path<(String, String)>,
) -> AppResult<Json<ApiResponse<Conversation>>> {
    let repo = ConversationRepository::new(state.get_db());
    let conversation = repo.remove_participant(&id, &user_id).await?;
    Ok(Json(ApiResponse::ok(conversation)))
}
