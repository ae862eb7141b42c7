//! Message API handlers
//!
//! The sender is always the authenticated caller; a message can only go
//! into a conversation the caller participates in.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use shared::{ApiResponse, AppError, AppResult, Pagination};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Attachment, Message, MessageCreate};
use crate::db::repository::MessageRepository;

#[derive(Deserialize)]
pub struct MessageListQuery {
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub conversation_id: Option<String>,
    pub message: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

#[derive(Deserialize)]
pub struct MarkConversationReadRequest {
    pub conversation_id: Option<String>,
}

/// Messages of one conversation, oldest first
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<MessageListQuery>,
) -> AppResult<Json<ApiResponse<Vec<Message>>>> {
    let conversation_id = query
        .conversation_id
        .as_deref()
        .ok_or_else(|| AppError::validation("Conversation id is required"))?;
    let page = query.page.unwrap_or(1).max(1);
    let page_size = query.page_size.unwrap_or(20).max(1);

    let repo = MessageRepository::new(state.get_db());
    let (messages, total) = repo
        .list_by_conversation(conversation_id, page, page_size)
        .await?;

    Ok(Json(ApiResponse::page(
        messages,
        Pagination::new(page, page_size, total),
    )))
}

pub async fn send(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<SendMessageRequest>,
) -> AppResult<Json<ApiResponse<Message>>> {
    let conversation_id = payload
        .conversation_id
        .ok_or_else(|| AppError::validation("Conversation id is required"))?;
    let message = payload
        .message
        .ok_or_else(|| AppError::validation("Message text is required"))?;

    let repo = MessageRepository::new(state.get_db());
    let message = repo
        .send(MessageCreate {
            conversation_id,
            sender_id: current.id,
            message,
            attachments: payload.attachments,
        })
        .await?;

    Ok(Json(ApiResponse::ok(message)))
}

pub async fn mark_read(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Message>>> {
    let repo = MessageRepository::new(state.get_db());
    let message = repo.mark_read(&id).await?;
    Ok(Json(ApiResponse::ok(message)))
}

/// Flag everything the caller has received in a conversation as read
pub async fn mark_conversation_read(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<MarkConversationReadRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    let conversation_id = payload
        .conversation_id
        .ok_or_else(|| AppError::validation("Conversation id is required"))?;

    let repo = MessageRepository::new(state.get_db());
    repo.mark_conversation_read(&conversation_id, &current.id)
        .await?;

    Ok(Json(ApiResponse::ok_message("Conversation marked read")))
}
