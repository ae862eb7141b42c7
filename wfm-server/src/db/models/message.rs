//! Message model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;
use super::task::Attachment;

/// Message document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub conversation: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub sender: RecordId,
    pub message: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageCreate {
    pub conversation_id: String,
    pub sender_id: String,
    pub message: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}
