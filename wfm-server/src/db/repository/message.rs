//! Message repository
//!
//! Delivery rule: the sender must be a participant of the target
//! conversation. Each send also refreshes the conversation's preview and
//! unread counters through the conversation repository.

use chrono::Utc;
use surrealdb::{Surreal, engine::local::Db};

use crate::db::models::{Message, MessageCreate, User};

use super::{BaseRepository, ConversationRepository, RepoError, RepoResult, page_bounds};

#[derive(Clone)]
pub struct MessageRepository {
    base: BaseRepository,
    conversations: ConversationRepository,
}

impl MessageRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db.clone()),
            conversations: ConversationRepository::new(db),
        }
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Message>> {
        let rid = self.base.parse_id(id)?;
        Ok(self.base.db().select(rid).await?)
    }

    /// Messages of one conversation, oldest first
    pub async fn list_by_conversation(
        &self,
        conversation_id: &str,
        page: u32,
        page_size: u32,
    ) -> RepoResult<(Vec<Message>, u64)> {
        let (limit, start) = page_bounds(page, page_size);
        self.conversations.require(conversation_id).await?;
        let conversation = self.base.parse_id(conversation_id)?;

        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM message WHERE conversation = $conversation \
                 ORDER BY created_at ASC LIMIT $limit START $start",
            )
            .query("SELECT count() FROM message WHERE conversation = $conversation GROUP ALL")
            .bind(("conversation", conversation))
            .bind(("limit", limit))
            .bind(("start", start))
            .await?;

        let messages: Vec<Message> = result.take(0)?;
        let count: Option<i64> = result.take((1, "count"))?;
        Ok((messages, count.unwrap_or(0) as u64))
    }

    /// Send a message into a conversation the sender participates in
    pub async fn send(&self, data: MessageCreate) -> RepoResult<Message> {
        if data.message.trim().is_empty() {
            return Err(RepoError::Validation(
                "Message text is required".to_string(),
            ));
        }

        let conversation = self.conversations.require(&data.conversation_id).await?;
        let conversation_rid = conversation
            .id
            .clone()
            .ok_or_else(|| RepoError::Database("Conversation record has no id".to_string()))?;

        let sender = self.base.parse_id(&data.sender_id)?;
        let sender_doc: Option<User> = self.base.db().select(sender.clone()).await?;
        if sender_doc.is_none() {
            return Err(RepoError::NotFound(format!(
                "User {} not found",
                data.sender_id
            )));
        }
        if !conversation.participants.contains(&sender) {
            return Err(RepoError::Validation(
                "Sender is not a participant of this conversation".to_string(),
            ));
        }

        let now = Utc::now();
        let mut result = self
            .base
            .db()
            .query(
                "CREATE message SET conversation = $conversation, sender = $sender, \
                 message = $message, attachments = $attachments, is_read = false, \
                 created_at = $created_at RETURN AFTER",
            )
            .bind(("conversation", conversation_rid))
            .bind(("sender", sender.clone()))
            .bind(("message", data.message.clone()))
            .bind(("attachments", data.attachments))
            .bind(("created_at", now))
            .await?;

        let created: Option<Message> = result.take(0)?;
        let message =
            created.ok_or_else(|| RepoError::Database("Failed to create message".to_string()))?;

        self.conversations
            .record_message(&conversation, &sender, &data.message, now)
            .await?;

        Ok(message)
    }

    /// Flag a single message as read
    pub async fn mark_read(&self, id: &str) -> RepoResult<Message> {
        let rid = self.base.parse_id(id)?;
        let mut result = self
            .base
            .db()
            .query("UPDATE $message SET is_read = true RETURN AFTER")
            .bind(("message", rid))
            .await?;
        let updated: Option<Message> = result.take(0)?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Message {} not found", id)))
    }

    /// Flag everything the given participant has received in a
    /// conversation as read and zero their unread counter
    pub async fn mark_conversation_read(
        &self,
        conversation_id: &str,
        user_id: &str,
    ) -> RepoResult<()> {
        let conversation = self.conversations.require(conversation_id).await?;
        let conversation_rid = conversation
            .id
            .clone()
            .ok_or_else(|| RepoError::Database("Conversation record has no id".to_string()))?;

        let user = self.base.parse_id(user_id)?;
        if !conversation.participants.contains(&user) {
            return Err(RepoError::Validation(
                "User is not a participant of this conversation".to_string(),
            ));
        }

        self.base
            .db()
            .query(
                "UPDATE message SET is_read = true \
                 WHERE conversation = $conversation AND sender != $user AND is_read = false",
            )
            .bind(("conversation", conversation_rid))
            .bind(("user", user.clone()))
            .await?;

        self.conversations.clear_unread(&conversation, &user).await
    }
}
