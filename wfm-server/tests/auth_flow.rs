//! Registration, login and account lifecycle

mod common;

use wfm_server::db::models::{Role, UserCreate, UserUpdate};
use wfm_server::db::repository::{RepoError, RevokedTokenRepository, UserRepository};

use common::{mem_db, profile, register_user, user_id};

#[tokio::test]
async fn register_and_login() {
    let db = mem_db().await;
    let user = register_user(&db, "hr@example.com", Role::HrManager).await;
    assert!(user.is_active);
    assert_eq!(user.email, "hr@example.com");
    // One leave allowance seeded for the current year
    assert_eq!(user.leave_balance.len(), 1);

    let repo = UserRepository::new(db.clone());
    let logged_in = repo
        .login("hr@example.com", "s3cret-password")
        .await
        .expect("login query")
        .expect("credentials accepted");
    assert_eq!(logged_in.email, user.email);

    // Wrong password and unknown email are both a plain None
    assert!(
        repo.login("hr@example.com", "wrong")
            .await
            .expect("login query")
            .is_none()
    );
    assert!(
        repo.login("nobody@example.com", "s3cret-password")
            .await
            .expect("login query")
            .is_none()
    );
}

#[tokio::test]
async fn email_uniqueness_is_case_insensitive() {
    let db = mem_db().await;
    register_user(&db, "dup@example.com", Role::Employee).await;

    let repo = UserRepository::new(db.clone());
    let err = repo
        .register(UserCreate {
            email: Some("DUP@Example.COM".to_string()),
            password: Some("another-password".to_string()),
            role: Some(Role::Employee),
            profile: Some(profile("dup")),
            team_id: None,
            manager_id: None,
            leave_balance: None,
        })
        .await
        .expect_err("duplicate email");
    assert!(matches!(err, RepoError::Conflict(_)));
}

#[tokio::test]
async fn register_requires_email_password_and_profile() {
    let db = mem_db().await;
    let repo = UserRepository::new(db.clone());

    let missing_email = UserCreate {
        email: None,
        password: Some("pw-good-enough".to_string()),
        role: None,
        profile: Some(profile("x")),
        team_id: None,
        manager_id: None,
        leave_balance: None,
    };
    assert!(matches!(
        repo.register(missing_email).await.expect_err("no email"),
        RepoError::Validation(_)
    ));

    let missing_password = UserCreate {
        email: Some("x@example.com".to_string()),
        password: None,
        role: None,
        profile: Some(profile("x")),
        team_id: None,
        manager_id: None,
        leave_balance: None,
    };
    assert!(matches!(
        repo.register(missing_password)
            .await
            .expect_err("no password"),
        RepoError::Validation(_)
    ));

    let missing_profile = UserCreate {
        email: Some("x@example.com".to_string()),
        password: Some("pw-good-enough".to_string()),
        role: None,
        profile: None,
        team_id: None,
        manager_id: None,
        leave_balance: None,
    };
    assert!(matches!(
        repo.register(missing_profile)
            .await
            .expect_err("no profile"),
        RepoError::Validation(_)
    ));
}

#[tokio::test]
async fn unknown_team_or_manager_reference_fails() {
    let db = mem_db().await;
    let repo = UserRepository::new(db.clone());

    let bad_team = UserCreate {
        email: Some("t@example.com".to_string()),
        password: Some("pw-good-enough".to_string()),
        role: None,
        profile: Some(profile("t")),
        team_id: Some("team:missing".to_string()),
        manager_id: None,
        leave_balance: None,
    };
    assert!(matches!(
        repo.register(bad_team).await.expect_err("team missing"),
        RepoError::Validation(_)
    ));

    let bad_manager = UserCreate {
        email: Some("m@example.com".to_string()),
        password: Some("pw-good-enough".to_string()),
        role: None,
        profile: Some(profile("m")),
        team_id: None,
        manager_id: Some("user:missing".to_string()),
        leave_balance: None,
    };
    assert!(matches!(
        repo.register(bad_manager)
            .await
            .expect_err("manager missing"),
        RepoError::NotFound(_)
    ));
}

#[tokio::test]
async fn change_password_requires_current() {
    let db = mem_db().await;
    let user = register_user(&db, "pw@example.com", Role::Employee).await;
    let uid = user_id(&user);
    let repo = UserRepository::new(db.clone());

    let err = repo
        .change_password(&uid, "not-the-password", "new-password")
        .await
        .expect_err("wrong current password");
    assert!(matches!(err, RepoError::Validation(_)));

    repo.change_password(&uid, "s3cret-password", "new-password")
        .await
        .expect("change password");
    assert!(
        repo.login("pw@example.com", "new-password")
            .await
            .expect("login query")
            .is_some()
    );
    assert!(
        repo.login("pw@example.com", "s3cret-password")
            .await
            .expect("login query")
            .is_none()
    );
}

#[tokio::test]
async fn force_reset_needs_no_current_password() {
    let db = mem_db().await;
    let user = register_user(&db, "reset@example.com", Role::Employee).await;
    let repo = UserRepository::new(db.clone());

    repo.force_reset_password(&user_id(&user), "reset-password")
        .await
        .expect("force reset");
    assert!(
        repo.login("reset@example.com", "reset-password")
            .await
            .expect("login query")
            .is_some()
    );
}

#[tokio::test]
async fn deactivate_and_reactivate() {
    let db = mem_db().await;
    let user = register_user(&db, "flag@example.com", Role::Employee).await;
    let uid = user_id(&user);
    let repo = UserRepository::new(db.clone());

    let user = repo.set_active(&uid, false).await.expect("deactivate");
    assert!(!user.is_active);

    let user = repo.set_active(&uid, true).await.expect("reactivate");
    assert!(user.is_active);
}

#[tokio::test]
async fn update_rejects_taken_email_and_clears_team() {
    let db = mem_db().await;
    register_user(&db, "taken@example.com", Role::Employee).await;
    let user = register_user(&db, "mover@example.com", Role::Employee).await;
    let uid = user_id(&user);
    let repo = UserRepository::new(db.clone());

    let err = repo
        .update(
            &uid,
            UserUpdate {
                email: Some("taken@example.com".to_string()),
                password: None,
                role: None,
                profile: None,
                team_id: None,
                manager_id: None,
                is_active: None,
                leave_balance: None,
            },
        )
        .await
        .expect_err("email taken");
    assert!(matches!(err, RepoError::Conflict(_)));

    // Explicit null clears the assignment
    let updated = repo
        .update(
            &uid,
            UserUpdate {
                email: None,
                password: None,
                role: Some(Role::TeamLead),
                profile: None,
                team_id: Some(None),
                manager_id: None,
                is_active: None,
                leave_balance: None,
            },
        )
        .await
        .expect("update");
    assert_eq!(updated.role, Role::TeamLead);
    assert!(updated.team_id.is_none());
}

#[tokio::test]
async fn refresh_token_revocation_denylist() {
    let db = mem_db().await;
    let repo = RevokedTokenRepository::new(db.clone());

    assert!(!repo.is_revoked("jti-1").await.expect("lookup"));
    repo.revoke("jti-1").await.expect("revoke");
    assert!(repo.is_revoked("jti-1").await.expect("lookup"));
    assert!(!repo.is_revoked("jti-2").await.expect("lookup"));
}
