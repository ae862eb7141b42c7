//! Team repository
//!
//! Team names are unique; a duplicate name on create or rename is a
//! Validation error, not a Conflict. Membership is a plain id list with
//! no floor, unlike conversations.

use chrono::Utc;
use surrealdb::{RecordId, Surreal, engine::local::Db};

use crate::db::models::{Team, TeamCreate, TeamUpdate, User};

use super::{BaseRepository, RepoError, RepoResult, page_bounds};

#[derive(Clone)]
pub struct TeamRepository {
    base: BaseRepository,
}

impl TeamRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Team>> {
        let rid = self.base.parse_id(id)?;
        Ok(self.base.db().select(rid).await?)
    }

    async fn require(&self, id: &str) -> RepoResult<Team> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Team {} not found", id)))
    }

    pub async fn find_by_name(&self, name: &str) -> RepoResult<Option<Team>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM team WHERE name = $name LIMIT 1")
            .bind(("name", name.to_string()))
            .await?;
        Ok(result.take(0)?)
    }

    pub async fn list(&self, page: u32, page_size: u32) -> RepoResult<(Vec<Team>, u64)> {
        let (limit, start) = page_bounds(page, page_size);
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM team ORDER BY created_at DESC LIMIT $limit START $start")
            .query("SELECT count() FROM team GROUP ALL")
            .bind(("limit", limit))
            .bind(("start", start))
            .await?;
        let teams: Vec<Team> = result.take(0)?;
        let count: Option<i64> = result.take((1, "count"))?;
        Ok((teams, count.unwrap_or(0) as u64))
    }

    /// Create a team. The leader and every listed member must exist; the
    /// leader is always included in the member list.
    pub async fn create(&self, data: TeamCreate) -> RepoResult<Team> {
        let name = data.name.trim().to_string();
        if name.is_empty() {
            return Err(RepoError::Validation("Team name is required".to_string()));
        }
        if self.find_by_name(&name).await?.is_some() {
            return Err(RepoError::Validation(format!(
                "Team name '{}' already exists",
                name
            )));
        }

        let leader = self.resolve_user(&data.leader_id).await?;
        let mut members: Vec<RecordId> = vec![leader.clone()];
        for member_id in &data.member_ids {
            let member = self.resolve_user(member_id).await?;
            if !members.contains(&member) {
                members.push(member);
            }
        }

        let mut result = self
            .base
            .db()
            .query(
                "CREATE team SET name = $name, description = $description, leader = $leader, \
                 members = $members, created_at = $created_at RETURN AFTER",
            )
            .bind(("name", name))
            .bind(("description", data.description))
            .bind(("leader", leader))
            .bind(("members", members))
            .bind(("created_at", Utc::now()))
            .await?;

        let created: Option<Team> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create team".to_string()))
    }

    /// Rename or re-describe a team; a rename to a taken name fails
    pub async fn update(&self, id: &str, data: TeamUpdate) -> RepoResult<Team> {
        let mut team = self.require(id).await?;
        let rid = team
            .id
            .take()
            .ok_or_else(|| RepoError::Database("Team record has no id".to_string()))?;

        if let Some(name) = data.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(RepoError::Validation("Team name is required".to_string()));
            }
            if name != team.name && self.find_by_name(&name).await?.is_some() {
                return Err(RepoError::Validation(format!(
                    "Team name '{}' already exists",
                    name
                )));
            }
            team.name = name;
        }
        if let Some(description) = data.description {
            team.description = description;
        }

        let mut result = self
            .base
            .db()
            .query("UPDATE $team SET name = $name, description = $description RETURN AFTER")
            .bind(("team", rid))
            .bind(("name", team.name))
            .bind(("description", team.description))
            .await?;

        let updated: Option<Team> = result.take(0)?;
        updated.ok_or_else(|| RepoError::Database("Failed to update team".to_string()))
    }

    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let rid = self.base.parse_id(id)?;
        let deleted: Option<Team> = self.base.db().delete(rid).await?;
        deleted
            .map(|_| ())
            .ok_or_else(|| RepoError::NotFound(format!("Team {} not found", id)))
    }

    /// Add an existing user to the member list
    pub async fn add_member(&self, id: &str, user_id: &str) -> RepoResult<Team> {
        let team = self.require(id).await?;
        let rid = team
            .id
            .ok_or_else(|| RepoError::Database("Team record has no id".to_string()))?;
        let member = self.resolve_user(user_id).await?;

        if team.members.contains(&member) {
            return Err(RepoError::Validation(
                "User is already a member of this team".to_string(),
            ));
        }
        let mut members = team.members;
        members.push(member);

        self.write_members(rid, members).await
    }

    /// Drop a user from the member list. Removing someone who is not a
    /// member is a Validation error; there is no minimum size.
    pub async fn remove_member(&self, id: &str, user_id: &str) -> RepoResult<Team> {
        let team = self.require(id).await?;
        let rid = team
            .id
            .ok_or_else(|| RepoError::Database("Team record has no id".to_string()))?;
        let member = self.base.parse_id(user_id)?;

        if !team.members.contains(&member) {
            return Err(RepoError::Validation(
                "User is not a member of this team".to_string(),
            ));
        }
        let members: Vec<RecordId> = team.members.into_iter().filter(|m| *m != member).collect();

        self.write_members(rid, members).await
    }

    /// Hand the team to a new leader, adding them as a member if needed
    pub async fn change_leader(&self, id: &str, user_id: &str) -> RepoResult<Team> {
        let team = self.require(id).await?;
        let rid = team
            .id
            .ok_or_else(|| RepoError::Database("Team record has no id".to_string()))?;
        let leader = self.resolve_user(user_id).await?;

        let mut members = team.members;
        if !members.contains(&leader) {
            members.push(leader.clone());
        }

        let mut result = self
            .base
            .db()
            .query("UPDATE $team SET leader = $leader, members = $members RETURN AFTER")
            .bind(("team", rid))
            .bind(("leader", leader))
            .bind(("members", members))
            .await?;

        let updated: Option<Team> = result.take(0)?;
        updated.ok_or_else(|| RepoError::Database("Failed to update team".to_string()))
    }

    async fn resolve_user(&self, user_id: &str) -> RepoResult<RecordId> {
        let rid = self.base.parse_id(user_id)?;
        let user: Option<User> = self.base.db().select(rid.clone()).await?;
        if user.is_none() {
            return Err(RepoError::NotFound(format!("User {} not found", user_id)));
        }
        Ok(rid)
    }

    async fn write_members(&self, rid: RecordId, members: Vec<RecordId>) -> RepoResult<Team> {
        let mut result = self
            .base
            .db()
            .query("UPDATE $team SET members = $members RETURN AFTER")
            .bind(("team", rid))
            .bind(("members", members))
            .await?;
        let updated: Option<Team> = result.take(0)?;
        updated.ok_or_else(|| RepoError::Database("Failed to update team".to_string()))
    }
}
