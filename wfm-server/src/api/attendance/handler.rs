//! Attendance API handlers
//!
//! Clock-in/out always acts on the authenticated caller; the generic
//! CRUD below it is unguarded by design and can patch any field.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use shared::{ApiResponse, AppError, AppResult, Pagination};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Attendance, AttendanceUpdate};
use crate::db::repository::{AttendanceRepository, attendance::AttendanceRules};
use crate::utils::parse_date;

#[derive(Deserialize)]
pub struct ClockInRequest {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

#[derive(Deserialize)]
pub struct AttendanceListQuery {
    #[serde(default)]
    pub user_id: Option<String>,
    /// `YYYY-MM-DD`, inclusive; only applied together with `end_date`
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

fn rules(state: &ServerState) -> AttendanceRules {
    AttendanceRules {
        geofence: state.config.geofence,
        timezone: state.config.timezone,
        workday_start: state.config.workday_start,
    }
}

/// Open today's attendance record for the caller
pub async fn clock_in(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<ClockInRequest>,
) -> AppResult<Json<ApiResponse<Attendance>>> {
    let repo = AttendanceRepository::new(state.get_db());
    let record = repo
        .clock_in(&current.id, payload.lat, payload.lng, &rules(&state))
        .await?;

    tracing::info!(user = %current.id, status = ?record.status, "Clock-in");
    Ok(Json(ApiResponse::ok(record)))
}

/// Close today's attendance record for the caller
pub async fn clock_out(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<ApiResponse<Attendance>>> {
    let repo = AttendanceRepository::new(state.get_db());
    let record = repo.clock_out(&current.id, &rules(&state)).await?;

    tracing::info!(user = %current.id, work_hours = record.work_hours, "Clock-out");
    Ok(Json(ApiResponse::ok(record)))
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<AttendanceListQuery>,
) -> AppResult<Json<ApiResponse<Vec<Attendance>>>> {
    let page = query.page.unwrap_or(1).max(1);
    let page_size = query.page_size.unwrap_or(20).max(1);

    let start_date = query.start_date.as_deref().map(parse_date).transpose()?;
    let end_date = query.end_date.as_deref().map(parse_date).transpose()?;

    let repo = AttendanceRepository::new(state.get_db());
    let (records, total) = repo
        .list(
            query.user_id.as_deref(),
            start_date,
            end_date,
            page,
            page_size,
        )
        .await?;

    Ok(Json(ApiResponse::page(
        records,
        Pagination::new(page, page_size, total),
    )))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Attendance>>> {
    let repo = AttendanceRepository::new(state.get_db());
    let record = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Attendance {} not found", id)))?;
    Ok(Json(ApiResponse::ok(record)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<AttendanceUpdate>,
) -> AppResult<Json<ApiResponse<Attendance>>> {
    let repo = AttendanceRepository::new(state.get_db());
    let record = repo.update(&id, payload).await?;
    Ok(Json(ApiResponse::ok(record)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    let repo = AttendanceRepository::new(state.get_db());
    repo.delete(&id).await?;
    Ok(Json(ApiResponse::ok_message("Attendance deleted")))
}
