//! Team model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// Team document. Leader and members are plain id references resolved on
/// demand, never embedded user copies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    /// Unique across all teams
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "serde_helpers::record_id")]
    pub leader: RecordId,
    #[serde(default, with = "serde_helpers::vec_record_id")]
    pub members: Vec<RecordId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamCreate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub leader_id: String,
    #[serde(default)]
    pub member_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
