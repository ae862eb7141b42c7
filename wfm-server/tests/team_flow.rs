//! Team membership and unique-name rules

mod common;

use wfm_server::db::models::{Role, TeamCreate, TeamUpdate};
use wfm_server::db::repository::{RepoError, TeamRepository};

use common::{mem_db, register_user, user_id};

fn team(name: &str, leader_id: String, member_ids: Vec<String>) -> TeamCreate {
    TeamCreate {
        name: name.to_string(),
        description: String::new(),
        leader_id,
        member_ids,
    }
}

#[tokio::test]
async fn create_includes_leader_in_members() {
    let db = mem_db().await;
    let lead = register_user(&db, "lead@example.com", Role::TeamLead).await;
    let emp = register_user(&db, "emp@example.com", Role::Employee).await;
    let repo = TeamRepository::new(db.clone());

    let created = repo
        .create(team("Platform", user_id(&lead), vec![user_id(&emp)]))
        .await
        .expect("create team");
    assert_eq!(created.members.len(), 2);
    assert_eq!(created.leader.to_string(), user_id(&lead));
}

#[tokio::test]
async fn duplicate_team_name_is_a_validation_error() {
    let db = mem_db().await;
    let lead = register_user(&db, "lead@example.com", Role::TeamLead).await;
    let repo = TeamRepository::new(db.clone());

    repo.create(team("Platform", user_id(&lead), vec![]))
        .await
        .expect("first team");

    let err = repo
        .create(team("Platform", user_id(&lead), vec![]))
        .await
        .expect_err("duplicate name");
    assert!(matches!(err, RepoError::Validation(_)));

    // Renaming onto a taken name fails the same way
    let other = repo
        .create(team("Infra", user_id(&lead), vec![]))
        .await
        .expect("second team");
    let other_id = other.id.as_ref().expect("id").to_string();
    let err = repo
        .update(
            &other_id,
            TeamUpdate {
                name: Some("Platform".to_string()),
                description: None,
            },
        )
        .await
        .expect_err("rename onto taken name");
    assert!(matches!(err, RepoError::Validation(_)));
}

#[tokio::test]
async fn member_add_remove_and_leader_change() {
    let db = mem_db().await;
    let lead = register_user(&db, "lead@example.com", Role::TeamLead).await;
    let emp = register_user(&db, "emp@example.com", Role::Employee).await;
    let repo = TeamRepository::new(db.clone());

    let created = repo
        .create(team("Platform", user_id(&lead), vec![]))
        .await
        .expect("create team");
    let team_id = created.id.as_ref().expect("id").to_string();

    let after_add = repo
        .add_member(&team_id, &user_id(&emp))
        .await
        .expect("add member");
    assert_eq!(after_add.members.len(), 2);

    let err = repo
        .add_member(&team_id, &user_id(&emp))
        .await
        .expect_err("already a member");
    assert!(matches!(err, RepoError::Validation(_)));

    let err = repo
        .add_member(&team_id, "user:missing")
        .await
        .expect_err("unknown user");
    assert!(matches!(err, RepoError::NotFound(_)));

    // New leader joins the member list automatically
    let after_leader = repo
        .change_leader(&team_id, &user_id(&emp))
        .await
        .expect("change leader");
    assert_eq!(after_leader.leader.to_string(), user_id(&emp));

    let after_remove = repo
        .remove_member(&team_id, &user_id(&lead))
        .await
        .expect("remove member");
    assert_eq!(after_remove.members.len(), 1);

    let err = repo
        .remove_member(&team_id, &user_id(&lead))
        .await
        .expect_err("not a member anymore");
    assert!(matches!(err, RepoError::Validation(_)));
}
