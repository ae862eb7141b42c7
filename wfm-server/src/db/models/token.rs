//! Revoked refresh token bookkeeping
//!
//! Refresh rotation: when a refresh token is exchanged for a new pair, its
//! `jti` lands here and is rejected on any later use.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevokedToken {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub jti: String,
    pub revoked_at: DateTime<Utc>,
}
