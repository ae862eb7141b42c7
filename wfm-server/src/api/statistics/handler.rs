//! Statistics API handlers
//!
//! Aggregate reads for dashboards. Every endpoint is restricted to HR
//! managers; the period parameters default to the current month/year in
//! the business timezone.

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{Datelike, Utc};
use serde::Deserialize;

use shared::{ApiResponse, AppError, AppResult};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::Role;
use crate::db::repository::StatisticsRepository;
use crate::db::repository::statistics::{
    AttendanceStats, DepartmentCount, LeaveStats, Overview, TaskStats, TeamPerformance,
};

#[derive(Deserialize)]
pub struct MonthQuery {
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub month: Option<u32>,
}

#[derive(Deserialize)]
pub struct YearQuery {
    #[serde(default)]
    pub year: Option<i32>,
}

pub async fn overview(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<ApiResponse<Overview>>> {
    require_hr(&current)?;
    let repo = StatisticsRepository::new(state.get_db());
    Ok(Json(ApiResponse::ok(repo.overview().await?)))
}

pub async fn employees_by_department(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<DepartmentCount>>>> {
    require_hr(&current)?;
    let repo = StatisticsRepository::new(state.get_db());
    Ok(Json(ApiResponse::ok(repo.employees_by_department().await?)))
}

pub async fn attendance(
    State(state): State<ServerState>,
    current: CurrentUser,
    Query(query): Query<MonthQuery>,
) -> AppResult<Json<ApiResponse<AttendanceStats>>> {
    require_hr(&current)?;
    let today = Utc::now().with_timezone(&state.config.timezone).date_naive();
    let year = query.year.unwrap_or_else(|| today.year());
    let month = query.month.unwrap_or_else(|| today.month());

    let repo = StatisticsRepository::new(state.get_db());
    Ok(Json(ApiResponse::ok(repo.attendance(year, month).await?)))
}

pub async fn leaves(
    State(state): State<ServerState>,
    current: CurrentUser,
    Query(query): Query<YearQuery>,
) -> AppResult<Json<ApiResponse<LeaveStats>>> {
    require_hr(&current)?;
    let today = Utc::now().with_timezone(&state.config.timezone).date_naive();
    let year = query.year.unwrap_or_else(|| today.year());

    let repo = StatisticsRepository::new(state.get_db());
    Ok(Json(ApiResponse::ok(repo.leaves(year).await?)))
}

pub async fn tasks(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<ApiResponse<TaskStats>>> {
    require_hr(&current)?;
    let repo = StatisticsRepository::new(state.get_db());
    Ok(Json(ApiResponse::ok(repo.tasks().await?)))
}

pub async fn team_performance(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<TeamPerformance>>>> {
    require_hr(&current)?;
    let repo = StatisticsRepository::new(state.get_db());
    Ok(Json(ApiResponse::ok(repo.team_performance().await?)))
}

fn require_hr(current: &CurrentUser) -> Result<(), AppError> {
    if current.role != Role::HrManager {
        return Err(AppError::forbidden("HR manager role required"));
    }
    Ok(())
}
