//! Notification repository

use chrono::Utc;
use surrealdb::{Surreal, engine::local::Db};

use crate::db::models::{Notification, NotificationCreate, User};

use super::{BaseRepository, RepoError, RepoResult, page_bounds};

#[derive(Clone)]
pub struct NotificationRepository {
    base: BaseRepository,
}

impl NotificationRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Notification>> {
        let rid = self.base.parse_id(id)?;
        Ok(self.base.db().select(rid).await?)
    }

    /// One user's notifications, newest first, optionally unread only
    pub async fn list(
        &self,
        user_id: &str,
        unread_only: bool,
        page: u32,
        page_size: u32,
    ) -> RepoResult<(Vec<Notification>, u64)> {
        let (limit, start) = page_bounds(page, page_size);
        let user = self.base.parse_id(user_id)?;

        let where_clause = if unread_only {
            " WHERE user = $user AND is_read = false"
        } else {
            " WHERE user = $user"
        };
        let list_query = format!(
            "SELECT * FROM notification{} ORDER BY created_at DESC LIMIT $limit START $start",
            where_clause
        );
        let count_query = format!("SELECT count() FROM notification{} GROUP ALL", where_clause);

        let mut result = self
            .base
            .db()
            .query(list_query)
            .query(count_query)
            .bind(("user", user))
            .bind(("limit", limit))
            .bind(("start", start))
            .await?;

        let notifications: Vec<Notification> = result.take(0)?;
        let count: Option<i64> = result.take((1, "count"))?;
        Ok((notifications, count.unwrap_or(0) as u64))
    }

    pub async fn create(&self, data: NotificationCreate) -> RepoResult<Notification> {
        let user = self.base.parse_id(&data.user_id)?;
        let user_doc: Option<User> = self.base.db().select(user.clone()).await?;
        if user_doc.is_none() {
            return Err(RepoError::NotFound(format!(
                "User {} not found",
                data.user_id
            )));
        }
        if data.title.trim().is_empty() {
            return Err(RepoError::Validation("Title is required".to_string()));
        }

        let mut result = self
            .base
            .db()
            .query(
                "CREATE notification SET user = $user, type = $type, title = $title, \
                 message = $message, related_id = $related_id, is_read = false, \
                 created_at = $created_at RETURN AFTER",
            )
            .bind(("user", user))
            .bind(("type", data.kind))
            .bind(("title", data.title))
            .bind(("message", data.message))
            .bind(("related_id", data.related_id))
            .bind(("created_at", Utc::now()))
            .await?;

        let created: Option<Notification> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create notification".to_string()))
    }

    pub async fn mark_read(&self, id: &str) -> RepoResult<Notification> {
        let rid = self.base.parse_id(id)?;
        let mut result = self
            .base
            .db()
            .query("UPDATE $notification SET is_read = true RETURN AFTER")
            .bind(("notification", rid))
            .await?;
        let updated: Option<Notification> = result.take(0)?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Notification {} not found", id)))
    }

    /// Flag every unread notification of one user as read, returning how
    /// many were flipped
    pub async fn mark_all_read(&self, user_id: &str) -> RepoResult<u64> {
        let user = self.base.parse_id(user_id)?;
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE notification SET is_read = true \
                 WHERE user = $user AND is_read = false RETURN AFTER",
            )
            .bind(("user", user))
            .await?;
        let updated: Vec<Notification> = result.take(0)?;
        Ok(updated.len() as u64)
    }

    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let rid = self.base.parse_id(id)?;
        let deleted: Option<Notification> = self.base.db().delete(rid).await?;
        deleted
            .map(|_| ())
            .ok_or_else(|| RepoError::NotFound(format!("Notification {} not found", id)))
    }
}
