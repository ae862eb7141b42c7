//! Repository module
//!
//! One repository per collection. Domain invariants (one clock-in per
//! user per day, pending-only leave transitions, unique team names, the
//! conversation participant floor) are enforced here, so handlers stay
//! thin decode/encode shims.

pub mod attendance;
pub mod conversation;
pub mod leave;
pub mod message;
pub mod notification;
pub mod statistics;
pub mod task;
pub mod team;
pub mod token;
pub mod user;

// Re-exports
pub use attendance::AttendanceRepository;
pub use conversation::ConversationRepository;
pub use leave::LeaveRepository;
pub use message::MessageRepository;
pub use notification::NotificationRepository;
pub use statistics::StatisticsRepository;
pub use task::TaskRepository;
pub use team::TeamRepository;
pub use token::RevokedTokenRepository;
pub use user::UserRepository;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

use crate::auth::credential::CredentialError;

/// Repository error kinds, one per HTTP status category
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<CredentialError> for RepoError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Empty => RepoError::Validation(err.to_string()),
            CredentialError::Hash(msg) => RepoError::Database(msg),
        }
    }
}

impl From<RepoError> for shared::AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => shared::AppError::NotFound(msg),
            RepoError::Conflict(msg) => shared::AppError::Conflict(msg),
            RepoError::Validation(msg) => shared::AppError::Validation(msg),
            RepoError::Database(msg) => shared::AppError::Database(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Base repository with database reference
///
/// All ids use the "table:id" string form end to end; parse into
/// [`surrealdb::RecordId`] at the repository boundary.
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }

    /// Parse a "table:id" string, rejecting malformed input as Validation
    pub fn parse_id(&self, id: &str) -> RepoResult<surrealdb::RecordId> {
        id.parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))
    }
}

/// Convert a 1-based page and size into LIMIT/START values
pub fn page_bounds(page: u32, page_size: u32) -> (i64, i64) {
    let page = page.max(1);
    let limit = page_size as i64;
    let start = (page as i64 - 1) * limit;
    (limit, start)
}
