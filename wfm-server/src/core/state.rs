use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use shared::AppError;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db;

/// Server state holding shared references to every service
///
/// Cloning is cheap: the database handle and JWT service are shared.
///
/// | Field | Type | Purpose |
/// |-------|------|---------|
/// | config | Config | Immutable configuration |
/// | db | Surreal<Db> | Embedded document store |
/// | jwt | Arc<JwtService> | Token issuance and validation |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub db: Surreal<Db>,
    pub jwt: Arc<JwtService>,
}

impl ServerState {
    pub fn new(config: Config, db: Surreal<Db>, jwt: Arc<JwtService>) -> Self {
        Self { config, db, jwt }
    }

    /// Initialize server state: work directory, database, JWT service
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        std::fs::create_dir_all(&config.work_dir).map_err(|e| {
            AppError::internal(format!(
                "Failed to create work directory {}: {}",
                config.work_dir, e
            ))
        })?;

        let db = db::connect(&config.work_dir).await?;
        let jwt = Arc::new(JwtService::with_config(config.jwt.clone()));

        Ok(Self::new(config.clone(), db, jwt))
    }

    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt.clone()
    }
}
