//! Task repository
//!
//! Tasks belong to a team, carry embedded comments and attachments, and
//! fan out notifications: assignees hear about new tasks and comments,
//! the assigner hears about status changes.

use chrono::Utc;
use futures::future::try_join_all;
use surrealdb::{RecordId, Surreal, engine::local::Db};

use crate::db::models::{
    Attachment, Comment, NotificationType, Task, TaskCreate, TaskPriority, TaskStatus, TaskUpdate,
    Team, User,
};

use super::{BaseRepository, RepoError, RepoResult, page_bounds};

#[derive(Clone)]
pub struct TaskRepository {
    base: BaseRepository,
}

impl TaskRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Task>> {
        let rid = self.base.parse_id(id)?;
        Ok(self.base.db().select(rid).await?)
    }

    async fn require(&self, id: &str) -> RepoResult<Task> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Task {} not found", id)))
    }

    /// List tasks, newest first, filtered by any of status, team, assignee
    pub async fn list(
        &self,
        status: Option<TaskStatus>,
        team_id: Option<&str>,
        assigned_to: Option<&str>,
        page: u32,
        page_size: u32,
    ) -> RepoResult<(Vec<Task>, u64)> {
        let (limit, start) = page_bounds(page, page_size);

        let team_rid = match team_id {
            Some(id) => Some(self.base.parse_id(id)?),
            None => None,
        };
        let assignee_rid = match assigned_to {
            Some(id) => Some(self.base.parse_id(id)?),
            None => None,
        };

        let mut conditions: Vec<&str> = Vec::new();
        if status.is_some() {
            conditions.push("status = $status");
        }
        if team_rid.is_some() {
            conditions.push("team = $team");
        }
        if assignee_rid.is_some() {
            conditions.push("$assignee IN assigned_to");
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let list_query = format!(
            "SELECT * FROM task{} ORDER BY created_at DESC LIMIT $limit START $start",
            where_clause
        );
        let count_query = format!("SELECT count() FROM task{} GROUP ALL", where_clause);

        let mut query = self
            .base
            .db()
            .query(list_query)
            .query(count_query)
            .bind(("limit", limit))
            .bind(("start", start));
        if let Some(status) = status {
            query = query.bind(("status", status));
        }
        if let Some(rid) = team_rid {
            query = query.bind(("team", rid));
        }
        if let Some(rid) = assignee_rid {
            query = query.bind(("assignee", rid));
        }

        let mut result = query.await?;
        let tasks: Vec<Task> = result.take(0)?;
        let count: Option<i64> = result.take((1, "count"))?;
        Ok((tasks, count.unwrap_or(0) as u64))
    }

    /// Create a task and notify every assignee
    pub async fn create(&self, data: TaskCreate) -> RepoResult<Task> {
        if data.title.trim().is_empty() {
            return Err(RepoError::Validation("Title is required".to_string()));
        }

        let assigned_by_id = data
            .assigned_by_id
            .as_deref()
            .filter(|a| !a.is_empty())
            .ok_or_else(|| RepoError::Validation("Assigner is required".to_string()))?;

        let team = self.resolve_team(&data.team_id).await?;
        let assigned_by = self.resolve_user(assigned_by_id).await?;
        let mut assigned_to: Vec<RecordId> = Vec::new();
        for user_id in &data.assigned_to_ids {
            let user = self.resolve_user(user_id).await?;
            if !assigned_to.contains(&user) {
                assigned_to.push(user);
            }
        }

        let title = data.title.trim().to_string();
        let mut result = self
            .base
            .db()
            .query(
                "CREATE task SET title = $title, description = $description, status = $status, \
                 priority = $priority, assigned_to = $assigned_to, assigned_by = $assigned_by, \
                 team = $team, start_date = $start_date, due_date = $due_date, progress = 0, \
                 attachments = $attachments, comments = [], tags = $tags, \
                 created_at = $created_at RETURN AFTER",
            )
            .bind(("title", title.clone()))
            .bind(("description", data.description))
            .bind(("status", data.status.unwrap_or(TaskStatus::Todo)))
            .bind(("priority", data.priority.unwrap_or(TaskPriority::Medium)))
            .bind(("assigned_to", assigned_to.clone()))
            .bind(("assigned_by", assigned_by))
            .bind(("team", team))
            .bind(("start_date", data.start_date))
            .bind(("due_date", data.due_date))
            .bind(("attachments", data.attachments))
            .bind(("tags", data.tags))
            .bind(("created_at", Utc::now()))
            .await?;

        let created: Option<Task> = result.take(0)?;
        let task =
            created.ok_or_else(|| RepoError::Database("Failed to create task".to_string()))?;

        if let Some(task_id) = &task.id {
            let message = format!("You have been assigned to '{}'", title);
            try_join_all(assigned_to.iter().map(|assignee| {
                self.notify(
                    assignee,
                    NotificationType::TaskAssigned,
                    "New task assigned",
                    &message,
                    task_id,
                )
            }))
            .await?;
        }

        Ok(task)
    }

    /// Partial update of task fields
    pub async fn update(&self, id: &str, data: TaskUpdate) -> RepoResult<Task> {
        let mut task = self.require(id).await?;
        let rid = task
            .id
            .take()
            .ok_or_else(|| RepoError::Database("Task record has no id".to_string()))?;

        if let Some(title) = data.title {
            if title.trim().is_empty() {
                return Err(RepoError::Validation("Title is required".to_string()));
            }
            task.title = title.trim().to_string();
        }
        if let Some(description) = data.description {
            task.description = description;
        }
        if let Some(status) = data.status {
            task.status = status;
        }
        if let Some(priority) = data.priority {
            task.priority = priority;
        }
        if let Some(assigned_to_ids) = data.assigned_to_ids {
            let mut assigned_to = Vec::new();
            for user_id in &assigned_to_ids {
                let user = self.resolve_user(user_id).await?;
                if !assigned_to.contains(&user) {
                    assigned_to.push(user);
                }
            }
            task.assigned_to = assigned_to;
        }
        if let Some(start_date) = data.start_date {
            task.start_date = Some(start_date);
        }
        if let Some(due_date) = data.due_date {
            task.due_date = Some(due_date);
        }
        if let Some(progress) = data.progress {
            if !(0..=100).contains(&progress) {
                return Err(RepoError::Validation(
                    "Progress must be between 0 and 100".to_string(),
                ));
            }
            task.progress = progress;
        }
        if let Some(attachments) = data.attachments {
            task.attachments = attachments;
        }
        if let Some(tags) = data.tags {
            task.tags = tags;
        }

        self.store(rid, task).await
    }

    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let rid = self.base.parse_id(id)?;
        let deleted: Option<Task> = self.base.db().delete(rid).await?;
        deleted
            .map(|_| ())
            .ok_or_else(|| RepoError::NotFound(format!("Task {} not found", id)))
    }

    /// Move the task to a new status and tell the assigner
    pub async fn change_status(&self, id: &str, status: TaskStatus) -> RepoResult<Task> {
        let task = self.require(id).await?;
        let rid = task
            .id
            .ok_or_else(|| RepoError::Database("Task record has no id".to_string()))?;

        let mut result = self
            .base
            .db()
            .query("UPDATE $task SET status = $status RETURN AFTER")
            .bind(("task", rid.clone()))
            .bind(("status", status))
            .await?;
        let updated: Option<Task> = result.take(0)?;
        let updated =
            updated.ok_or_else(|| RepoError::Database("Failed to update task".to_string()))?;

        self.notify(
            &task.assigned_by,
            NotificationType::TaskUpdated,
            "Task status changed",
            &format!("'{}' moved to {:?}", updated.title, status),
            &rid,
        )
        .await?;

        Ok(updated)
    }

    /// Append a comment and notify every assignee except the author
    pub async fn add_comment(&self, id: &str, user_id: &str, text: &str) -> RepoResult<Task> {
        if text.trim().is_empty() {
            return Err(RepoError::Validation(
                "Comment text is required".to_string(),
            ));
        }
        let task = self.require(id).await?;
        let rid = task
            .id
            .ok_or_else(|| RepoError::Database("Task record has no id".to_string()))?;
        let author = self.resolve_user(user_id).await?;

        let comment = Comment {
            user: author.clone(),
            text: text.trim().to_string(),
            created_at: Utc::now(),
        };

        let mut result = self
            .base
            .db()
            .query("UPDATE $task SET comments += $comment RETURN AFTER")
            .bind(("task", rid.clone()))
            .bind(("comment", comment))
            .await?;
        let updated: Option<Task> = result.take(0)?;
        let updated =
            updated.ok_or_else(|| RepoError::Database("Failed to update task".to_string()))?;

        let message = format!("New comment on '{}'", updated.title);
        try_join_all(
            updated
                .assigned_to
                .iter()
                .filter(|a| **a != author)
                .map(|assignee| {
                    self.notify(
                        assignee,
                        NotificationType::CommentAdded,
                        "New comment",
                        &message,
                        &rid,
                    )
                }),
        )
        .await?;

        Ok(updated)
    }

    /// Append a file reference; both a name and a url are required
    pub async fn add_attachment(
        &self,
        id: &str,
        name: Option<String>,
        url: Option<String>,
    ) -> RepoResult<Task> {
        let (name, url) = match (
            name.filter(|n| !n.trim().is_empty()),
            url.filter(|u| !u.trim().is_empty()),
        ) {
            (Some(name), Some(url)) => (name, url),
            _ => {
                return Err(RepoError::Validation(
                    "Attachment requires both a name and a url".to_string(),
                ));
            }
        };

        let task = self.require(id).await?;
        let rid = task
            .id
            .ok_or_else(|| RepoError::Database("Task record has no id".to_string()))?;

        let mut result = self
            .base
            .db()
            .query("UPDATE $task SET attachments += $attachment RETURN AFTER")
            .bind(("task", rid))
            .bind(("attachment", Attachment { name, url }))
            .await?;
        let updated: Option<Task> = result.take(0)?;
        updated.ok_or_else(|| RepoError::Database("Failed to update task".to_string()))
    }

    async fn notify(
        &self,
        user: &RecordId,
        kind: NotificationType,
        title: &str,
        message: &str,
        task_id: &RecordId,
    ) -> RepoResult<()> {
        self.base
            .db()
            .query(
                "CREATE notification SET user = $user, type = $type, title = $title, \
                 message = $message, related_id = $related_id, is_read = false, \
                 created_at = $created_at",
            )
            .bind(("user", user.clone()))
            .bind(("type", kind))
            .bind(("title", title.to_string()))
            .bind(("message", message.to_string()))
            .bind(("related_id", task_id.to_string()))
            .bind(("created_at", Utc::now()))
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

    async fn resolve_team(&self, team_id: &str) -> RepoResult<RecordId> {
        let rid = self.base.parse_id(team_id)?;
        let team: Option<Team> = self.base.db().select(rid.clone()).await?;
        if team.is_none() {
            return Err(RepoError::NotFound(format!("Team {} not found", team_id)));
        }
        Ok(rid)
    }

    async fn store(&self, rid: RecordId, task: Task) -> RepoResult<Task> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $task SET title = $title, description = $description, status = $status, \
                 priority = $priority, assigned_to = $assigned_to, start_date = $start_date, \
                 due_date = $due_date, progress = $progress, attachments = $attachments, \
                 tags = $tags RETURN AFTER",
            )
            .bind(("task", rid))
            .bind(("title", task.title))
            .bind(("description", task.description))
            .bind(("status", task.status))
            .bind(("priority", task.priority))
            .bind(("assigned_to", task.assigned_to))
            .bind(("start_date", task.start_date))
            .bind(("due_date", task.due_date))
            .bind(("progress", task.progress))
            .bind(("attachments", task.attachments))
            .bind(("tags", task.tags))
            .await?;
        let updated: Option<Task> = result.take(0)?;
        updated.ok_or_else(|| RepoError::Database("Failed to update task".to_string()))
    }
}
