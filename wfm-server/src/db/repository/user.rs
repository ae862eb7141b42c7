//! User repository
//!
//! Owns registration, credential checks and account lifecycle. Email
//! uniqueness is case-insensitive: addresses are lowercased before every
//! store and lookup.

use chrono::{Datelike, Utc};
use std::collections::HashMap;
use surrealdb::{RecordId, Surreal, engine::local::Db};

use crate::auth::credential;
use crate::db::models::{LeaveBalance, Role, Team, User, UserCreate, UserUpdate};

use super::{BaseRepository, RepoError, RepoResult, page_bounds};

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let rid = self.base.parse_id(id)?;
        Ok(self.base.db().select(rid).await?)
    }

    /// Like [`find_by_id`](Self::find_by_id) but a missing user is an error
    pub async fn require(&self, id: &str) -> RepoResult<User> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))
    }

    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE email = $email LIMIT 1")
            .bind(("email", email.trim().to_lowercase()))
            .await?;
        Ok(result.take(0)?)
    }

    /// List users, optionally filtered by role and/or team, newest first
    pub async fn list(
        &self,
        role: Option<Role>,
        team_id: Option<&str>,
        page: u32,
        page_size: u32,
    ) -> RepoResult<(Vec<User>, u64)> {
        let (limit, start) = page_bounds(page, page_size);

        let team_rid = match team_id {
            Some(id) => Some(self.base.parse_id(id)?),
            None => None,
        };

        let mut conditions: Vec<&str> = Vec::new();
        if role.is_some() {
            conditions.push("role = $role");
        }
        if team_rid.is_some() {
            conditions.push("team_id = $team_id");
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let list_query = format!(
            "SELECT * FROM user{} ORDER BY created_at DESC LIMIT $limit START $start",
            where_clause
        );
        let count_query = format!("SELECT count() FROM user{} GROUP ALL", where_clause);

        let mut query = self
            .base
            .db()
            .query(list_query)
            .query(count_query)
            .bind(("limit", limit))
            .bind(("start", start));
        if let Some(role) = role {
            query = query.bind(("role", role));
        }
        if let Some(rid) = team_rid {
            query = query.bind(("team_id", rid));
        }

        let mut result = query.await?;
        let users: Vec<User> = result.take(0)?;
        let count: Option<i64> = result.take((1, "count"))?;
        Ok((users, count.unwrap_or(0) as u64))
    }

    /// Register a new account.
    ///
    /// Missing email, password or profile is a Validation error; a taken
    /// email is a Conflict. A referenced team must exist; a referenced
    /// manager must be an existing user. Without an explicit allowance the
    /// current year gets the default leave balance.
    pub async fn register(&self, data: UserCreate) -> RepoResult<User> {
        let email = data
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| RepoError::Validation("Email is required".to_string()))?
            .to_lowercase();

        let profile = data
            .profile
            .ok_or_else(|| RepoError::Validation("Profile is required".to_string()))?;
        if profile.full_name.trim().is_empty() {
            return Err(RepoError::Validation("Full name is required".to_string()));
        }

        let password = credential::hash_password(data.password.as_deref().unwrap_or(""))?;

        if self.find_by_email(&email).await?.is_some() {
            return Err(RepoError::Conflict(format!(
                "Email {} already registered",
                email
            )));
        }

        let team_rid = match data.team_id.as_deref().filter(|t| !t.is_empty()) {
            Some(id) => Some(self.resolve_team(id).await?),
            None => None,
        };
        let manager_rid: Option<RecordId> = match data.manager_id.as_deref().filter(|m| !m.is_empty()) {
            Some(id) => {
                let manager = self.require(id).await?;
                // require() guarantees a stored record, so the id is present
                Some(manager.id.ok_or_else(|| {
                    RepoError::Database("Manager record has no id".to_string())
                })?)
            }
            None => None,
        };

        let leave_balance = data.leave_balance.unwrap_or_else(|| {
            let mut balance = HashMap::new();
            balance.insert(Utc::now().year().to_string(), LeaveBalance::default());
            balance
        });

        let mut result = self
            .base
            .db()
            .query(
                "CREATE user SET email = $email, password = $password, role = $role, \
                 profile = $profile, team_id = $team_id, manager_id = $manager_id, \
                 is_active = true, leave_balance = $leave_balance, created_at = $created_at \
                 RETURN AFTER",
            )
            .bind(("email", email))
            .bind(("password", password))
            .bind(("role", data.role.unwrap_or(Role::Employee)))
            .bind(("profile", profile))
            .bind(("team_id", team_rid))
            .bind(("manager_id", manager_rid))
            .bind(("leave_balance", leave_balance))
            .bind(("created_at", Utc::now()))
            .await?;

        let created: Option<User> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    /// Check credentials; `None` means the email is unknown or the
    /// password does not match. The caller decides how to report that.
    pub async fn login(&self, email: &str, password: &str) -> RepoResult<Option<User>> {
        let user = match self.find_by_email(email).await? {
            Some(user) => user,
            None => return Ok(None),
        };
        if credential::verify_password(password, &user.password) {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Partial update; unset fields keep their stored value,
    /// `team_id: null` / `manager_id: null` clear the assignment.
    pub async fn update(&self, id: &str, data: UserUpdate) -> RepoResult<User> {
        let rid = self.base.parse_id(id)?;
        let mut user: User = self
            .base
            .db()
            .select(rid.clone())
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))?;

        if let Some(email) = data.email {
            let email = email.trim().to_lowercase();
            if email.is_empty() {
                return Err(RepoError::Validation("Email cannot be empty".to_string()));
            }
            if email != user.email {
                if self.find_by_email(&email).await?.is_some() {
                    return Err(RepoError::Conflict(format!(
                        "Email {} already registered",
                        email
                    )));
                }
                user.email = email;
            }
        }
        if let Some(password) = data.password {
            user.password = credential::hash_password(&password)?;
        }
        if let Some(role) = data.role {
            user.role = role;
        }
        if let Some(profile) = data.profile {
            user.profile = profile;
        }
        if let Some(team) = data.team_id {
            user.team_id = match team {
                Some(team_id) => Some(self.resolve_team(&team_id).await?),
                None => None,
            };
        }
        if let Some(manager) = data.manager_id {
            user.manager_id = match manager {
                Some(manager_id) => {
                    let manager = self.require(&manager_id).await?;
                    Some(manager.id.ok_or_else(|| {
                        RepoError::Database("Manager record has no id".to_string())
                    })?)
                }
                None => None,
            };
        }
        if let Some(active) = data.is_active {
            user.is_active = active;
        }
        if let Some(balance) = data.leave_balance {
            user.leave_balance = balance;
        }

        self.store(rid, user).await
    }

    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let rid = self.base.parse_id(id)?;
        let deleted: Option<User> = self.base.db().delete(rid).await?;
        deleted
            .map(|_| ())
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))
    }

    /// Self-service password change; the current password must verify
    pub async fn change_password(
        &self,
        id: &str,
        current: &str,
        new_password: &str,
    ) -> RepoResult<()> {
        let user = self.require(id).await?;
        if !credential::verify_password(current, &user.password) {
            return Err(RepoError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }
        self.write_password(id, new_password).await
    }

    /// Administrative reset, no knowledge of the old password needed
    pub async fn force_reset_password(&self, id: &str, new_password: &str) -> RepoResult<()> {
        self.require(id).await?;
        self.write_password(id, new_password).await
    }

    /// Deactivate or reactivate an account; inactive users fail auth
    pub async fn set_active(&self, id: &str, active: bool) -> RepoResult<User> {
        let rid = self.base.parse_id(id)?;
        let mut result = self
            .base
            .db()
            .query("UPDATE $user SET is_active = $active RETURN AFTER")
            .bind(("user", rid))
            .bind(("active", active))
            .await?;
        let updated: Option<User> = result.take(0)?;
        updated.ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))
    }

    async fn resolve_team(&self, team_id: &str) -> RepoResult<RecordId> {
        let rid = self.base.parse_id(team_id)?;
        let team: Option<Team> = self.base.db().select(rid.clone()).await?;
        if team.is_none() {
            return Err(RepoError::Validation(format!(
                "Team {} not found",
                team_id
            )));
        }
        Ok(rid)
    }

    async fn write_password(&self, id: &str, new_password: &str) -> RepoResult<()> {
        let digest = credential::hash_password(new_password)?;
        let rid = self.base.parse_id(id)?;
        let mut result = self
            .base
            .db()
            .query("UPDATE $user SET password = $password RETURN AFTER")
            .bind(("user", rid))
            .bind(("password", digest))
            .await?;
        let updated: Option<User> = result.take(0)?;
        updated
            .map(|_| ())
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))
    }

    async fn store(&self, rid: RecordId, user: User) -> RepoResult<User> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $user SET email = $email, password = $password, role = $role, \
                 profile = $profile, team_id = $team_id, manager_id = $manager_id, \
                 is_active = $is_active, leave_balance = $leave_balance RETURN AFTER",
            )
            .bind(("user", rid))
            .bind(("email", user.email))
            .bind(("password", user.password))
            .bind(("role", user.role))
            .bind(("profile", user.profile))
            .bind(("team_id", user.team_id))
            .bind(("manager_id", user.manager_id))
            .bind(("is_active", user.is_active))
            .bind(("leave_balance", user.leave_balance))
            .await?;
        let updated: Option<User> = result.take(0)?;
        updated.ok_or_else(|| RepoError::Database("Failed to update user".to_string()))
    }
}
