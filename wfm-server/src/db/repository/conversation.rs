//! Conversation repository
//!
//! A conversation always holds at least two distinct participants. The
//! floor is enforced on create and on participant removal; message
//! delivery itself lives in the message repository.

use chrono::{DateTime, Utc};
use surrealdb::{RecordId, Surreal, engine::local::Db};

use crate::db::models::{Conversation, ConversationCreate, User};

use super::{BaseRepository, RepoError, RepoResult, page_bounds};

#[derive(Clone)]
pub struct ConversationRepository {
    base: BaseRepository,
}

impl ConversationRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Conversation>> {
        let rid = self.base.parse_id(id)?;
        Ok(self.base.db().select(rid).await?)
    }

    pub async fn require(&self, id: &str) -> RepoResult<Conversation> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Conversation {} not found", id)))
    }

    /// List conversations, most recent activity first. With a user filter
    /// only conversations that user participates in are returned.
    pub async fn list(
        &self,
        user_id: Option<&str>,
        page: u32,
        page_size: u32,
    ) -> RepoResult<(Vec<Conversation>, u64)> {
        let (limit, start) = page_bounds(page, page_size);

        let user_rid = match user_id {
            Some(id) => Some(self.base.parse_id(id)?),
            None => None,
        };

        let where_clause = if user_rid.is_some() {
            " WHERE $user IN participants"
        } else {
            ""
        };
        let list_query = format!(
            "SELECT * FROM conversation{} ORDER BY last_message_at DESC LIMIT $limit START $start",
            where_clause
        );
        let count_query = format!("SELECT count() FROM conversation{} GROUP ALL", where_clause);

        let mut query = self
            .base
            .db()
            .query(list_query)
            .query(count_query)
            .bind(("limit", limit))
            .bind(("start", start));
        if let Some(rid) = user_rid {
            query = query.bind(("user", rid));
        }

        let mut result = query.await?;
        let conversations: Vec<Conversation> = result.take(0)?;
        let count: Option<i64> = result.take((1, "count"))?;
        Ok((conversations, count.unwrap_or(0) as u64))
    }

    /// Open a conversation between two or more distinct existing users
    pub async fn create(&self, data: ConversationCreate) -> RepoResult<Conversation> {
        let mut participants: Vec<RecordId> = Vec::new();
        for participant_id in &data.participant_ids {
            let rid = self.resolve_user(participant_id).await?;
            if !participants.contains(&rid) {
                participants.push(rid);
            }
        }
        if participants.len() < 2 {
            return Err(RepoError::Validation(
                "A conversation requires at least two distinct participants".to_string(),
            ));
        }

        let mut result = self
            .base
            .db()
            .query(
                "CREATE conversation SET participants = $participants, last_message = NONE, \
                 last_message_at = NONE, unread_count = {}, created_at = $created_at \
                 RETURN AFTER",
            )
            .bind(("participants", participants))
            .bind(("created_at", Utc::now()))
            .await?;

        let created: Option<Conversation> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create conversation".to_string()))
    }

    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let rid = self.base.parse_id(id)?;
        let deleted: Option<Conversation> = self.base.db().delete(rid).await?;
        deleted
            .map(|_| ())
            .ok_or_else(|| RepoError::NotFound(format!("Conversation {} not found", id)))
    }

    /// Add an existing user; re-adding a participant is a Validation error
    pub async fn add_participant(&self, id: &str, user_id: &str) -> RepoResult<Conversation> {
        let conversation = self.require(id).await?;
        let rid = conversation
            .id
            .ok_or_else(|| RepoError::Database("Conversation record has no id".to_string()))?;
        let participant = self.resolve_user(user_id).await?;

        if conversation.participants.contains(&participant) {
            return Err(RepoError::Validation(
                "User is already a participant".to_string(),
            ));
        }
        let mut participants = conversation.participants;
        participants.push(participant);

        self.write_participants(rid, participants).await
    }

    /// Remove a participant; the conversation may never drop below two
    pub async fn remove_participant(&self, id: &str, user_id: &str) -> RepoResult<Conversation> {
        let conversation = self.require(id).await?;
        let rid = conversation
            .id
            .ok_or_else(|| RepoError::Database("Conversation record has no id".to_string()))?;
        let participant = self.base.parse_id(user_id)?;

        if !conversation.participants.contains(&participant) {
            return Err(RepoError::Validation(
                "User is not a participant".to_string(),
            ));
        }
        if conversation.participants.len() <= 2 {
            return Err(RepoError::Validation(
                "A conversation requires at least two distinct participants".to_string(),
            ));
        }
        let participants: Vec<RecordId> = conversation
            .participants
            .into_iter()
            .filter(|p| *p != participant)
            .collect();

        self.write_participants(rid, participants).await
    }

    /// Stamp the latest message preview and bump unread counters for every
    /// participant except the sender
    pub async fn record_message(
        &self,
        conversation: &Conversation,
        sender: &RecordId,
        preview: &str,
        at: DateTime<Utc>,
    ) -> RepoResult<()> {
        let rid = conversation
            .id
            .clone()
            .ok_or_else(|| RepoError::Database("Conversation record has no id".to_string()))?;

        let mut unread = conversation.unread_count.clone();
        for participant in conversation.participants.iter().filter(|p| *p != sender) {
            *unread.entry(participant.to_string()).or_insert(0) += 1;
        }

        self.base
            .db()
            .query(
                "UPDATE $conversation SET last_message = $last_message, \
                 last_message_at = $last_message_at, unread_count = $unread_count",
            )
            .bind(("conversation", rid))
            .bind(("last_message", preview.to_string()))
            .bind(("last_message_at", at))
            .bind(("unread_count", unread))
            .await?;
        Ok(())
    }

    /// Zero the unread counter for one participant
    pub async fn clear_unread(&self, conversation: &Conversation, user: &RecordId) -> RepoResult<()> {
        let rid = conversation
            .id
            .clone()
            .ok_or_else(|| RepoError::Database("Conversation record has no id".to_string()))?;

        let mut unread = conversation.unread_count.clone();
        unread.insert(user.to_string(), 0);

        self.base
            .db()
            .query("UPDATE $conversation SET unread_count = $unread_count")
            .bind(("conversation", rid))
            .bind(("unread_count", unread))
            .await?;
        Ok(())
    }

    async fn resolve_user(&self, user_id: &str) -> RepoResult<RecordId> {
        let rid = self.base.parse_id(user_id)?;
        let user: Option<User> = self.base.db().select(rid.clone()).await?;
        if user.is_none() {
            return Err(RepoError::NotFound(format!("User {} not found", user_id)));
        }
        Ok(rid)
    }

    async fn write_participants(
        &self,
        rid: RecordId,
        participants: Vec<RecordId>,
    ) -> RepoResult<Conversation> {
        let mut result = self
            .base
            .db()
            .query("UPDATE $conversation SET participants = $participants RETURN AFTER")
            .bind(("conversation", rid))
            .bind(("participants", participants))
            .await?;
        let updated: Option<Conversation> = result.take(0)?;
        updated.ok_or_else(|| RepoError::Database("Failed to update conversation".to_string()))
    }
}
