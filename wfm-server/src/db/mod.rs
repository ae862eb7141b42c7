//! Database module
//!
//! Embedded SurrealDB storage. Every document type has a model in
//! [`models`] and a repository in [`repository`]; all domain invariants
//! are enforced at the repository layer.

pub mod models;
pub mod repository;

use std::path::Path;

use shared::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

const NAMESPACE: &str = "wfm";
const DATABASE: &str = "main";

/// Open the embedded database under `<work_dir>/database`
pub async fn connect(work_dir: &str) -> Result<Surreal<Db>, AppError> {
    let path = Path::new(work_dir).join("database");

    let db = Surreal::new::<RocksDb>(path.as_path())
        .await
        .map_err(|e| AppError::database(format!("Failed to open database: {}", e)))?;

    db.use_ns(NAMESPACE)
        .use_db(DATABASE)
        .await
        .map_err(|e| AppError::database(format!("Failed to select namespace: {}", e)))?;

    tracing::info!("Database opened at {}", path.display());
    Ok(db)
}
