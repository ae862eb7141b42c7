//! Leave request approval workflow

mod common;

use chrono::{TimeZone, Utc};
use wfm_server::db::models::{LeaveCreate, LeaveStatus, LeaveType, LeaveUpdate, Role, User};
use wfm_server::db::repository::{LeaveRepository, RepoError};

use common::{mem_db, register_user, user_id};

fn vacation(user: &User) -> LeaveCreate {
    LeaveCreate {
        user_id: user_id(user),
        leave_type: LeaveType::Vacation,
        start_date: Utc.with_ymd_and_hms(2024, 6, 3, 0, 0, 0).unwrap(),
        end_date: Utc.with_ymd_and_hms(2024, 6, 5, 0, 0, 0).unwrap(),
        number_of_days: 3,
        reason: Some("Family trip".to_string()),
    }
}

#[tokio::test]
async fn request_starts_pending_without_approver() {
    let db = mem_db().await;
    let employee = register_user(&db, "emp@example.com", Role::Employee).await;
    let repo = LeaveRepository::new(db.clone());

    let leave = repo.request(vacation(&employee)).await.expect("request");
    assert_eq!(leave.status, LeaveStatus::Pending);
    assert!(leave.approved_by.is_none());
    assert!(leave.approved_at.is_none());
    assert!(leave.rejection_reason.is_none());
}

#[tokio::test]
async fn request_for_unknown_user_is_not_found() {
    let db = mem_db().await;
    let repo = LeaveRepository::new(db.clone());

    let err = repo
        .request(LeaveCreate {
            user_id: "user:missing".to_string(),
            leave_type: LeaveType::Sick,
            start_date: Utc.with_ymd_and_hms(2024, 6, 3, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 6, 4, 0, 0, 0).unwrap(),
            number_of_days: 1,
            reason: None,
        })
        .await
        .expect_err("unknown user");
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[tokio::test]
async fn approve_stamps_approver_and_blocks_further_mutation() {
    let db = mem_db().await;
    let employee = register_user(&db, "emp@example.com", Role::Employee).await;
    let manager = register_user(&db, "mgr@example.com", Role::HrManager).await;
    let repo = LeaveRepository::new(db.clone());

    let leave = repo.request(vacation(&employee)).await.expect("request");
    let leave_id = leave.id.as_ref().expect("id").to_string();

    let approved = repo
        .approve(&leave_id, &user_id(&manager))
        .await
        .expect("approve");
    assert_eq!(approved.status, LeaveStatus::Approved);
    assert!(approved.approved_by.is_some());
    assert!(approved.approved_at.is_some());
    assert!(approved.rejection_reason.is_none());

    // Approving twice is a Conflict regardless of terminal state
    let err = repo
        .approve(&leave_id, &user_id(&manager))
        .await
        .expect_err("already processed");
    assert!(matches!(err, RepoError::Conflict(_)));

    // So is a plain field edit
    let err = repo
        .update(
            &leave_id,
            LeaveUpdate {
                leave_type: None,
                start_date: None,
                end_date: None,
                number_of_days: Some(5),
                reason: None,
            },
        )
        .await
        .expect_err("terminal state is immutable");
    assert!(matches!(err, RepoError::Conflict(_)));
}

#[tokio::test]
async fn reject_requires_reason_and_stores_it() {
    let db = mem_db().await;
    let employee = register_user(&db, "emp@example.com", Role::Employee).await;
    let manager = register_user(&db, "mgr@example.com", Role::HrManager).await;
    let repo = LeaveRepository::new(db.clone());

    let leave = repo.request(vacation(&employee)).await.expect("request");
    let leave_id = leave.id.as_ref().expect("id").to_string();

    let err = repo
        .reject(&leave_id, &user_id(&manager), "  ")
        .await
        .expect_err("reason required");
    assert!(matches!(err, RepoError::Validation(_)));

    let rejected = repo
        .reject(&leave_id, &user_id(&manager), "Short staffed that week")
        .await
        .expect("reject");
    assert_eq!(rejected.status, LeaveStatus::Rejected);
    assert_eq!(
        rejected.rejection_reason.as_deref(),
        Some("Short staffed that week")
    );

    let err = repo
        .reject(&leave_id, &user_id(&manager), "again")
        .await
        .expect_err("already processed");
    assert!(matches!(err, RepoError::Conflict(_)));
}

#[tokio::test]
async fn approve_by_unknown_user_is_not_found() {
    let db = mem_db().await;
    let employee = register_user(&db, "emp@example.com", Role::Employee).await;
    let repo = LeaveRepository::new(db.clone());

    let leave = repo.request(vacation(&employee)).await.expect("request");
    let leave_id = leave.id.as_ref().expect("id").to_string();

    let err = repo
        .approve(&leave_id, "user:missing")
        .await
        .expect_err("unknown approver");
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[tokio::test]
async fn pending_update_and_unconditional_delete() {
    let db = mem_db().await;
    let employee = register_user(&db, "emp@example.com", Role::Employee).await;
    let manager = register_user(&db, "mgr@example.com", Role::HrManager).await;
    let repo = LeaveRepository::new(db.clone());

    let leave = repo.request(vacation(&employee)).await.expect("request");
    let leave_id = leave.id.as_ref().expect("id").to_string();

    let updated = repo
        .update(
            &leave_id,
            LeaveUpdate {
                leave_type: Some(LeaveType::Personal),
                start_date: None,
                end_date: None,
                number_of_days: Some(2),
                reason: None,
            },
        )
        .await
        .expect("pending edit");
    assert_eq!(updated.leave_type, LeaveType::Personal);
    assert_eq!(updated.number_of_days, 2);

    // Delete works even after the request is processed
    repo.approve(&leave_id, &user_id(&manager))
        .await
        .expect("approve");
    repo.delete(&leave_id).await.expect("delete");
    assert!(repo.find_by_id(&leave_id).await.expect("lookup").is_none());
}

#[tokio::test]
async fn list_filters_by_user_and_status() {
    let db = mem_db().await;
    let a = register_user(&db, "a@example.com", Role::Employee).await;
    let b = register_user(&db, "b@example.com", Role::Employee).await;
    let manager = register_user(&db, "mgr@example.com", Role::HrManager).await;
    let repo = LeaveRepository::new(db.clone());

    let first = repo.request(vacation(&a)).await.expect("request");
    repo.request(vacation(&b)).await.expect("request");

    let first_id = first.id.as_ref().expect("id").to_string();
    repo.approve(&first_id, &user_id(&manager))
        .await
        .expect("approve");

    let (for_a, total_a) = repo
        .list(Some(user_id(&a).as_str()), None, 1, 20)
        .await
        .expect("list");
    assert_eq!(total_a, 1);
    assert_eq!(for_a.len(), 1);

    let (pending, pending_total) = repo
        .list(None, Some(LeaveStatus::Pending), 1, 20)
        .await
        .expect("list");
    assert_eq!(pending_total, 1);
    assert_eq!(pending[0].status, LeaveStatus::Pending);
}
