//! Shared helpers for integration tests
#![allow(dead_code)]

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

use wfm_server::db::models::{Profile, Role, User, UserCreate};
use wfm_server::db::repository::UserRepository;

/// Fresh in-memory database per test
pub async fn mem_db() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.expect("open in-memory db");
    db.use_ns("wfm").use_db("test").await.expect("select ns/db");
    db
}

pub fn profile(full_name: &str) -> Profile {
    Profile {
        full_name: full_name.to_string(),
        employee_id: format!("EMP-{}", full_name.len()),
        avatar: None,
        phone: None,
        department: None,
        position: None,
    }
}

pub async fn register_user(db: &Surreal<Db>, email: &str, role: Role) -> User {
    let repo = UserRepository::new(db.clone());
    repo.register(UserCreate {
        email: Some(email.to_string()),
        password: Some("s3cret-password".to_string()),
        role: Some(role),
        profile: Some(profile(email)),
        team_id: None,
        manager_id: None,
        leave_balance: None,
    })
    .await
    .expect("register user")
}

/// Stored record id as a "user:xyz" string
pub fn user_id(user: &User) -> String {
    user.id.as_ref().expect("stored user has an id").to_string()
}
