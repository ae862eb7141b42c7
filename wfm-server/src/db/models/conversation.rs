//! Conversation model

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// Conversation document
///
/// Invariant: at least two distinct participants, enforced on create and
/// on participant removal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::vec_record_id")]
    pub participants: Vec<RecordId>,
    #[serde(default)]
    pub last_message: Option<String>,
    #[serde(default)]
    pub last_message_at: Option<DateTime<Utc>>,
    /// user id string -> unread message count
    #[serde(default)]
    pub unread_count: HashMap<String, i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationCreate {
    pub participant_ids: Vec<String>,
}
