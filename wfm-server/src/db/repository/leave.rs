//! Leave request repository
//!
//! The approval workflow guards `update`, `approve` and `reject` behind
//! the `pending` state. Deletion is intentionally unguarded: processed
//! requests can still be removed.

use chrono::Utc;
use surrealdb::{Surreal, engine::local::Db};

use crate::db::models::{Leave, LeaveCreate, LeaveStatus, LeaveUpdate, User};

use super::{BaseRepository, RepoError, RepoResult, page_bounds};

#[derive(Clone)]
pub struct LeaveRepository {
    base: BaseRepository,
}

impl LeaveRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Leave>> {
        let rid = self.base.parse_id(id)?;
        Ok(self.base.db().select(rid).await?)
    }

    async fn require(&self, id: &str) -> RepoResult<Leave> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Leave {} not found", id)))
    }

    /// List requests, newest first, optionally filtered by user and status
    pub async fn list(
        &self,
        user_id: Option<&str>,
        status: Option<LeaveStatus>,
        page: u32,
        page_size: u32,
    ) -> RepoResult<(Vec<Leave>, u64)> {
        let (limit, start) = page_bounds(page, page_size);

        let user_rid = match user_id {
            Some(id) => Some(self.base.parse_id(id)?),
            None => None,
        };

        let mut conditions: Vec<&str> = Vec::new();
        if user_rid.is_some() {
            conditions.push("user = $user");
        }
        if status.is_some() {
            conditions.push("status = $status");
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let list_query = format!(
            "SELECT * FROM leave{} ORDER BY created_at DESC LIMIT $limit START $start",
            where_clause
        );
        let count_query = format!("SELECT count() FROM leave{} GROUP ALL", where_clause);

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
        if let Some(status) = status {
            query = query.bind(("status", status));
        }

        let mut result = query.await?;
        let leaves: Vec<Leave> = result.take(0)?;
        let count: Option<i64> = result.take((1, "count"))?;
        Ok((leaves, count.unwrap_or(0) as u64))
    }

    /// File a new request. Always created `pending` with no approver.
    pub async fn request(&self, data: LeaveCreate) -> RepoResult<Leave> {
        let user_rid = self.base.parse_id(&data.user_id)?;
        let user: Option<User> = self.base.db().select(user_rid.clone()).await?;
        if user.is_none() {
            return Err(RepoError::NotFound(format!(
                "User {} not found",
                data.user_id
            )));
        }

        if data.end_date < data.start_date {
            return Err(RepoError::Validation(
                "End date must not be before start date".to_string(),
            ));
        }
        if data.number_of_days <= 0 {
            return Err(RepoError::Validation(
                "Number of days must be positive".to_string(),
            ));
        }

        let mut result = self
            .base
            .db()
            .query(
                "CREATE leave SET user = $user, type = $type, start_date = $start_date, \
                 end_date = $end_date, number_of_days = $number_of_days, reason = $reason, \
                 status = $status, approved_by = NONE, approved_at = NONE, \
                 rejection_reason = NONE, created_at = $created_at RETURN AFTER",
            )
            .bind(("user", user_rid))
            .bind(("type", data.leave_type))
            .bind(("start_date", data.start_date))
            .bind(("end_date", data.end_date))
            .bind(("number_of_days", data.number_of_days))
            .bind(("reason", data.reason))
            .bind(("status", LeaveStatus::Pending))
            .bind(("created_at", Utc::now()))
            .await?;

        let created: Option<Leave> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create leave".to_string()))
    }

    /// Edit a request that has not been processed yet
    pub async fn update(&self, id: &str, data: LeaveUpdate) -> RepoResult<Leave> {
        let mut leave = self.require(id).await?;
        if leave.status != LeaveStatus::Pending {
            return Err(RepoError::Conflict(
                "Only pending leave requests can be updated".to_string(),
            ));
        }
        let rid = leave
            .id
            .take()
            .ok_or_else(|| RepoError::Database("Leave record has no id".to_string()))?;

        if let Some(leave_type) = data.leave_type {
            leave.leave_type = leave_type;
        }
        if let Some(start_date) = data.start_date {
            leave.start_date = start_date;
        }
        if let Some(end_date) = data.end_date {
            leave.end_date = end_date;
        }
        if let Some(number_of_days) = data.number_of_days {
            leave.number_of_days = number_of_days;
        }
        if let Some(reason) = data.reason {
            leave.reason = Some(reason);
        }

        if leave.end_date < leave.start_date {
            return Err(RepoError::Validation(
                "End date must not be before start date".to_string(),
            ));
        }

        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $leave SET type = $type, start_date = $start_date, \
                 end_date = $end_date, number_of_days = $number_of_days, reason = $reason \
                 RETURN AFTER",
            )
            .bind(("leave", rid))
            .bind(("type", leave.leave_type))
            .bind(("start_date", leave.start_date))
            .bind(("end_date", leave.end_date))
            .bind(("number_of_days", leave.number_of_days))
            .bind(("reason", leave.reason))
            .await?;

        let updated: Option<Leave> = result.take(0)?;
        updated.ok_or_else(|| RepoError::Database("Failed to update leave".to_string()))
    }

    /// Approve a pending request, stamping the approver and time
    pub async fn approve(&self, id: &str, approver_id: &str) -> RepoResult<Leave> {
        self.decide(id, approver_id, LeaveStatus::Approved, None)
            .await
    }

    /// Reject a pending request; a non-empty reason is mandatory
    pub async fn reject(&self, id: &str, approver_id: &str, reason: &str) -> RepoResult<Leave> {
        if reason.trim().is_empty() {
            return Err(RepoError::Validation(
                "Rejection reason is required".to_string(),
            ));
        }
        self.decide(id, approver_id, LeaveStatus::Rejected, Some(reason.to_string()))
            .await
    }

    async fn decide(
        &self,
        id: &str,
        approver_id: &str,
        status: LeaveStatus,
        rejection_reason: Option<String>,
    ) -> RepoResult<Leave> {
        let leave = self.require(id).await?;
        if leave.status != LeaveStatus::Pending {
            return Err(RepoError::Conflict(
                "Leave request has already been processed".to_string(),
            ));
        }
        let rid = leave
            .id
            .ok_or_else(|| RepoError::Database("Leave record has no id".to_string()))?;

        let approver_rid = self.base.parse_id(approver_id)?;
        let approver: Option<User> = self.base.db().select(approver_rid.clone()).await?;
        if approver.is_none() {
            return Err(RepoError::NotFound(format!(
                "User {} not found",
                approver_id
            )));
        }

        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $leave SET status = $status, approved_by = $approved_by, \
                 approved_at = $approved_at, rejection_reason = $rejection_reason RETURN AFTER",
            )
            .bind(("leave", rid))
            .bind(("status", status))
            .bind(("approved_by", approver_rid))
            .bind(("approved_at", Utc::now()))
            .bind(("rejection_reason", rejection_reason))
            .await?;

        let updated: Option<Leave> = result.take(0)?;
        updated.ok_or_else(|| RepoError::Database("Failed to update leave".to_string()))
    }

    /// Remove a request regardless of its state
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let rid = self.base.parse_id(id)?;
        let deleted: Option<Leave> = self.base.db().delete(rid).await?;
        deleted
            .map(|_| ())
            .ok_or_else(|| RepoError::NotFound(format!("Leave {} not found", id)))
    }
}
