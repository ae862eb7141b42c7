//! Attendance clock-in/out rules against an in-memory database

mod common;

use chrono::{NaiveTime, TimeZone, Utc};
use wfm_server::db::models::{AttendanceStatus, Geofence, Role};
use wfm_server::db::repository::{
    AttendanceRepository, RepoError, attendance::AttendanceRules,
};

use common::{mem_db, register_user, user_id};

fn office_rules() -> AttendanceRules {
    AttendanceRules {
        geofence: Geofence {
            lat_min: 10.869093,
            lat_max: 10.871556,
            lng_min: 106.802012,
            lng_max: 106.805138,
        },
        timezone: chrono_tz::Asia::Ho_Chi_Minh,
        workday_start: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
    }
}

// Ho Chi Minh is UTC+7, so 01:00 UTC is 08:00 local.
const IN_OFFICE: (Option<f64>, Option<f64>) = (Some(10.870), Some(106.803));

#[tokio::test]
async fn clock_in_at_workday_start_is_present() {
    let db = mem_db().await;
    let user = register_user(&db, "a@example.com", Role::Employee).await;
    let repo = AttendanceRepository::new(db.clone());

    let at = Utc.with_ymd_and_hms(2024, 3, 4, 1, 0, 0).unwrap();
    let record = repo
        .clock_in_at(&user_id(&user), IN_OFFICE.0, IN_OFFICE.1, &office_rules(), at)
        .await
        .expect("clock in");

    assert_eq!(record.status, AttendanceStatus::Present);
    assert!(record.clock_out.is_none());
    assert_eq!(record.work_hours, 0.0);
}

#[tokio::test]
async fn clock_in_after_workday_start_is_late() {
    let db = mem_db().await;
    let user = register_user(&db, "a@example.com", Role::Employee).await;
    let repo = AttendanceRepository::new(db.clone());

    // One second past the boundary
    let at = Utc.with_ymd_and_hms(2024, 3, 4, 1, 0, 1).unwrap();
    let record = repo
        .clock_in_at(&user_id(&user), IN_OFFICE.0, IN_OFFICE.1, &office_rules(), at)
        .await
        .expect("clock in");

    assert_eq!(record.status, AttendanceStatus::Late);
}

#[tokio::test]
async fn second_clock_in_same_day_conflicts_and_stores_one_record() {
    let db = mem_db().await;
    let user = register_user(&db, "a@example.com", Role::Employee).await;
    let uid = user_id(&user);
    let repo = AttendanceRepository::new(db.clone());

    let first = Utc.with_ymd_and_hms(2024, 3, 4, 1, 0, 0).unwrap();
    repo.clock_in_at(&uid, IN_OFFICE.0, IN_OFFICE.1, &office_rules(), first)
        .await
        .expect("first clock in");

    let later_same_day = Utc.with_ymd_and_hms(2024, 3, 4, 3, 0, 0).unwrap();
    let err = repo
        .clock_in_at(&uid, IN_OFFICE.0, IN_OFFICE.1, &office_rules(), later_same_day)
        .await
        .expect_err("second clock in must fail");
    assert!(matches!(err, RepoError::Conflict(_)));

    let (_, total) = repo.list(Some(uid.as_str()), None, None, 1, 20).await.expect("list");
    assert_eq!(total, 1);
}

#[tokio::test]
async fn clock_in_for_unknown_user_is_not_found() {
    let db = mem_db().await;
    let repo = AttendanceRepository::new(db.clone());

    let at = Utc.with_ymd_and_hms(2024, 3, 4, 1, 0, 0).unwrap();
    let err = repo
        .clock_in_at("user:missing", IN_OFFICE.0, IN_OFFICE.1, &office_rules(), at)
        .await
        .expect_err("unknown user");
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[tokio::test]
async fn clock_in_outside_geofence_fails_and_stores_nothing() {
    let db = mem_db().await;
    let user = register_user(&db, "a@example.com", Role::Employee).await;
    let uid = user_id(&user);
    let repo = AttendanceRepository::new(db.clone());

    let at = Utc.with_ymd_and_hms(2024, 3, 4, 1, 0, 0).unwrap();
    let err = repo
        .clock_in_at(&uid, Some(10.88), Some(106.803), &office_rules(), at)
        .await
        .expect_err("outside the fence");
    assert!(matches!(err, RepoError::Validation(_)));

    let err = repo
        .clock_in_at(&uid, None, None, &office_rules(), at)
        .await
        .expect_err("missing coordinates");
    assert!(matches!(err, RepoError::Validation(_)));

    let (_, total) = repo.list(Some(uid.as_str()), None, None, 1, 20).await.expect("list");
    assert_eq!(total, 0);
}

#[tokio::test]
async fn clock_out_computes_rounded_work_hours() {
    let db = mem_db().await;
    let user = register_user(&db, "a@example.com", Role::Employee).await;
    let uid = user_id(&user);
    let repo = AttendanceRepository::new(db.clone());

    // 08:00 to 17:30 local
    let clock_in = Utc.with_ymd_and_hms(2024, 3, 4, 1, 0, 0).unwrap();
    let clock_out = Utc.with_ymd_and_hms(2024, 3, 4, 10, 30, 0).unwrap();

    repo.clock_in_at(&uid, IN_OFFICE.0, IN_OFFICE.1, &office_rules(), clock_in)
        .await
        .expect("clock in");
    let record = repo
        .clock_out_at(&uid, &office_rules(), clock_out)
        .await
        .expect("clock out");

    assert_eq!(record.work_hours, 9.5);
    assert!(record.clock_out.is_some());
}

#[tokio::test]
async fn clock_out_without_clock_in_is_not_found() {
    let db = mem_db().await;
    let user = register_user(&db, "a@example.com", Role::Employee).await;
    let repo = AttendanceRepository::new(db.clone());

    let at = Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap();
    let err = repo
        .clock_out_at(&user_id(&user), &office_rules(), at)
        .await
        .expect_err("nothing to close");
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[tokio::test]
async fn second_clock_out_conflicts() {
    let db = mem_db().await;
    let user = register_user(&db, "a@example.com", Role::Employee).await;
    let uid = user_id(&user);
    let repo = AttendanceRepository::new(db.clone());

    let clock_in = Utc.with_ymd_and_hms(2024, 3, 4, 1, 0, 0).unwrap();
    let clock_out = Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap();

    repo.clock_in_at(&uid, IN_OFFICE.0, IN_OFFICE.1, &office_rules(), clock_in)
        .await
        .expect("clock in");
    repo.clock_out_at(&uid, &office_rules(), clock_out)
        .await
        .expect("clock out");

    let again = Utc.with_ymd_and_hms(2024, 3, 4, 11, 0, 0).unwrap();
    let err = repo
        .clock_out_at(&uid, &office_rules(), again)
        .await
        .expect_err("already closed");
    assert!(matches!(err, RepoError::Conflict(_)));
}

#[tokio::test]
async fn list_filters_by_inclusive_date_range() {
    let db = mem_db().await;
    let user = register_user(&db, "a@example.com", Role::Employee).await;
    let uid = user_id(&user);
    let repo = AttendanceRepository::new(db.clone());

    for day in 1..=4 {
        let at = Utc.with_ymd_and_hms(2024, 3, day, 1, 0, 0).unwrap();
        repo.clock_in_at(&uid, IN_OFFICE.0, IN_OFFICE.1, &office_rules(), at)
            .await
            .expect("clock in");
    }

    let from = chrono::NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
    let to = chrono::NaiveDate::from_ymd_opt(2024, 3, 3).unwrap();
    let (records, total) = repo
        .list(Some(uid.as_str()), Some(from), Some(to), 1, 20)
        .await
        .expect("list");

    assert_eq!(total, 2);
    // Newest date first
    assert_eq!(records[0].date, to);
    assert_eq!(records[1].date, from);
}
