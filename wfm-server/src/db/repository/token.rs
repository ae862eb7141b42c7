//! Revoked refresh token repository
//!
//! Backs refresh rotation: once a refresh token is exchanged, its `jti`
//! is stored here and every later use of the same token is rejected.

use chrono::Utc;
use surrealdb::{Surreal, engine::local::Db};

use crate::db::models::RevokedToken;

use super::{BaseRepository, RepoResult};

#[derive(Clone)]
pub struct RevokedTokenRepository {
    base: BaseRepository,
}

impl RevokedTokenRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn is_revoked(&self, jti: &str) -> RepoResult<bool> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM revoked_token WHERE jti = $jti LIMIT 1")
            .bind(("jti", jti.to_string()))
            .await?;
        let found: Option<RevokedToken> = result.take(0)?;
        Ok(found.is_some())
    }

    pub async fn revoke(&self, jti: &str) -> RepoResult<()> {
        self.base
            .db()
            .query("CREATE revoked_token SET jti = $jti, revoked_at = $revoked_at")
            .bind(("jti", jti.to_string()))
            .bind(("revoked_at", Utc::now()))
            .await?;
        Ok(())
    }
}
