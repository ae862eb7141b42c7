//! Leave request model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    Sick,
    Vacation,
    Personal,
}

/// `pending` is the only mutable state; `approved` and `rejected` are
/// terminal for the approval workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

/// Leave request document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Leave {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub user: RecordId,
    #[serde(rename = "type")]
    pub leave_type: LeaveType,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub number_of_days: i64,
    #[serde(default)]
    pub reason: Option<String>,
    pub status: LeaveStatus,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub approved_by: Option<RecordId>,
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request payload. Status and approver are never accepted from the
/// caller: a new request is always `pending` with no approver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveCreate {
    pub user_id: String,
    #[serde(rename = "type")]
    pub leave_type: LeaveType,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub number_of_days: i64,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Field patch, only legal while the request is still `pending`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveUpdate {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub leave_type: Option<LeaveType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_days: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
