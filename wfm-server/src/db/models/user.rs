//! User model

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// User ID type
pub type UserId = RecordId;

/// Role set; roles are fixed, permissions hang off them in the API layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    HrManager,
    TeamLead,
    Employee,
}

/// Embedded profile document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub full_name: String,
    /// Unique employee identifier ("EMP-0042" style, assigned by HR)
    pub employee_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

/// Per-year leave allowance, keyed by year string in [`User::leave_balance`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveBalance {
    pub total: i32,
    pub used: i32,
    pub remaining: i32,
}

impl Default for LeaveBalance {
    fn default() -> Self {
        Self {
            total: 12,
            used: 0,
            remaining: 12,
        }
    }
}

/// User document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<UserId>,
    /// Stored lowercase; uniqueness is case-insensitive
    pub email: String,
    /// Password digest, never serialized into responses
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,
    pub profile: Profile,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub team_id: Option<RecordId>,
    /// Self-referential: the user's manager, resolved on demand
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub manager_id: Option<RecordId>,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,
    /// year -> allowance
    #[serde(default)]
    pub leave_balance: HashMap<String, LeaveBalance>,
    pub created_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

/// Registration payload
///
/// Required fields are `Option` so that missing input surfaces as a
/// Validation error instead of a decode rejection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    pub profile: Option<Profile>,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub manager_id: Option<String>,
    #[serde(default)]
    pub leave_balance: Option<HashMap<String, LeaveBalance>>,
}

/// Profile/role/assignment update payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
    /// An explicit `null` clears the team assignment
    #[serde(
        default,
        deserialize_with = "serde_helpers::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub team_id: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub manager_id: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leave_balance: Option<HashMap<String, LeaveBalance>>,
}
