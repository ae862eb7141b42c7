//! Aggregate statistics over the other collections
//!
//! Read-only rollups for the reporting endpoints: headcounts, monthly
//! attendance, yearly leave usage, task and team-performance breakdowns.
//! No documents of its own; everything is derived on demand.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, Months, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::{RecordId, Surreal, engine::local::Db};

use crate::db::models::{
    AttendanceStatus, LeaveStatus, LeaveType, TaskPriority, TaskStatus, Team, User, serde_helpers,
};

use super::{BaseRepository, RepoError, RepoResult};

/// Headline counts for the dashboard
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub total_employees: u64,
    pub total_teams: u64,
    pub total_tasks: u64,
    pub pending_leaves: u64,
}

/// Active headcount for one department
#[derive(Debug, Clone, Serialize)]
pub struct DepartmentCount {
    pub department: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AttendanceSummary {
    pub present: u64,
    pub late: u64,
    pub absent: u64,
}

/// Status counts for one day of the month
#[derive(Debug, Clone, Default, Serialize)]
pub struct DailyAttendance {
    pub day: u32,
    pub present: u64,
    pub late: u64,
    pub absent: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceStats {
    pub summary: AttendanceSummary,
    /// Days with at least one record, ascending
    pub daily: Vec<DailyAttendance>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaveTypeStat {
    #[serde(rename = "type")]
    pub leave_type: LeaveType,
    pub count: u64,
    pub total_days: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaveStatusStat {
    pub status: LeaveStatus,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyLeaveStat {
    pub month: u32,
    pub count: u64,
    pub total_days: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaveStats {
    /// One entry per leave type, fixed order, zero counts included
    pub by_type: Vec<LeaveTypeStat>,
    pub by_status: Vec<LeaveStatusStat>,
    /// Months of the start date with at least one request, ascending
    pub by_month: Vec<MonthlyLeaveStat>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskStatusStat {
    pub status: TaskStatus,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskPriorityStat {
    pub priority: TaskPriority,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamTaskStat {
    pub team: String,
    pub total: u64,
    pub completed: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskStats {
    pub by_status: Vec<TaskStatusStat>,
    pub by_priority: Vec<TaskPriorityStat>,
    pub by_team: Vec<TeamTaskStat>,
}

/// Per-team delivery summary
#[derive(Debug, Clone, Serialize)]
pub struct TeamPerformance {
    pub team_name: String,
    pub leader: String,
    pub member_count: u64,
    pub total_tasks: u64,
    pub completed_tasks: u64,
    /// completed / total as a rounded percentage; 0 when there are no tasks
    pub completion_rate: u32,
}

#[derive(Deserialize)]
struct AttendanceRow {
    date: NaiveDate,
    status: AttendanceStatus,
}

#[derive(Deserialize)]
struct LeaveRow {
    #[serde(rename = "type")]
    leave_type: LeaveType,
    status: LeaveStatus,
    start_date: DateTime<Utc>,
    number_of_days: i64,
}

#[derive(Deserialize)]
struct TaskRow {
    status: TaskStatus,
    priority: TaskPriority,
    #[serde(with = "serde_helpers::record_id")]
    team: RecordId,
}

#[derive(Deserialize)]
struct DepartmentRow {
    department: Option<String>,
    count: i64,
}

#[derive(Clone)]
pub struct StatisticsRepository {
    base: BaseRepository,
}

impl StatisticsRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Active employees, teams, tasks and pending leave requests
    pub async fn overview(&self) -> RepoResult<Overview> {
        let mut result = self
            .base
            .db()
            .query("SELECT count() FROM user WHERE is_active = true GROUP ALL")
            .query("SELECT count() FROM team GROUP ALL")
            .query("SELECT count() FROM task GROUP ALL")
            .query("SELECT count() FROM leave WHERE status = $pending GROUP ALL")
            .bind(("pending", LeaveStatus::Pending))
            .await?;

        let employees: Option<i64> = result.take((0, "count"))?;
        let teams: Option<i64> = result.take((1, "count"))?;
        let tasks: Option<i64> = result.take((2, "count"))?;
        let leaves: Option<i64> = result.take((3, "count"))?;

        Ok(Overview {
            total_employees: to_count(employees),
            total_teams: to_count(teams),
            total_tasks: to_count(tasks),
            pending_leaves: to_count(leaves),
        })
    }

    /// Active headcount per department, largest first. Users without a
    /// department land in an "Unassigned" bucket.
    pub async fn employees_by_department(&self) -> RepoResult<Vec<DepartmentCount>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT profile.department AS department, count() AS count FROM user \
                 WHERE is_active = true GROUP BY department",
            )
            .await?;
        let rows: Vec<DepartmentRow> = result.take(0)?;

        let mut counts: Vec<DepartmentCount> = rows
            .into_iter()
            .map(|row| DepartmentCount {
                department: row
                    .department
                    .unwrap_or_else(|| "Unassigned".to_string()),
                count: row.count.max(0) as u64,
            })
            .collect();
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        Ok(counts)
    }

    /// Status summary and per-day breakdown for one calendar month
    pub async fn attendance(&self, year: i32, month: u32) -> RepoResult<AttendanceStats> {
        let from = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| RepoError::Validation(format!("Invalid month: {}-{}", year, month)))?;
        let to = from
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .ok_or_else(|| RepoError::Validation(format!("Invalid month: {}-{}", year, month)))?;

        let mut result = self
            .base
            .db()
            .query("SELECT date, status FROM attendance WHERE date >= $from AND date <= $to")
            .bind(("from", from))
            .bind(("to", to))
            .await?;
        let rows: Vec<AttendanceRow> = result.take(0)?;

        let mut summary = AttendanceSummary::default();
        let mut daily: BTreeMap<u32, DailyAttendance> = BTreeMap::new();
        for row in rows {
            let day = row.date.day();
            let entry = daily.entry(day).or_insert_with(|| DailyAttendance {
                day,
                ..DailyAttendance::default()
            });
            match row.status {
                AttendanceStatus::Present => {
                    summary.present += 1;
                    entry.present += 1;
                }
                AttendanceStatus::Late => {
                    summary.late += 1;
                    entry.late += 1;
                }
                AttendanceStatus::Absent => {
                    summary.absent += 1;
                    entry.absent += 1;
                }
            }
        }

        Ok(AttendanceStats {
            summary,
            daily: daily.into_values().collect(),
        })
    }

    /// Leave usage for requests filed within one calendar year
    pub async fn leaves(&self, year: i32) -> RepoResult<LeaveStats> {
        let from = Utc
            .with_ymd_and_hms(year, 1, 1, 0, 0, 0)
            .single()
            .ok_or_else(|| RepoError::Validation(format!("Invalid year: {}", year)))?;
        let to = Utc
            .with_ymd_and_hms(year + 1, 1, 1, 0, 0, 0)
            .single()
            .ok_or_else(|| RepoError::Validation(format!("Invalid year: {}", year)))?;

        let mut result = self
            .base
            .db()
            .query(
                "SELECT type, status, start_date, number_of_days FROM leave \
                 WHERE created_at >= $from AND created_at < $to",
            )
            .bind(("from", from))
            .bind(("to", to))
            .await?;
        let rows: Vec<LeaveRow> = result.take(0)?;

        let by_type = [LeaveType::Sick, LeaveType::Vacation, LeaveType::Personal]
            .into_iter()
            .map(|leave_type| {
                let mut count = 0;
                let mut total_days = 0;
                for row in rows.iter().filter(|r| r.leave_type == leave_type) {
                    count += 1;
                    total_days += row.number_of_days;
                }
                LeaveTypeStat {
                    leave_type,
                    count,
                    total_days,
                }
            })
            .collect();

        let by_status = [
            LeaveStatus::Pending,
            LeaveStatus::Approved,
            LeaveStatus::Rejected,
        ]
        .into_iter()
        .map(|status| LeaveStatusStat {
            status,
            count: rows.iter().filter(|r| r.status == status).count() as u64,
        })
        .collect();

        let mut by_month: BTreeMap<u32, MonthlyLeaveStat> = BTreeMap::new();
        for row in &rows {
            let month = row.start_date.month();
            let entry = by_month.entry(month).or_insert(MonthlyLeaveStat {
                month,
                count: 0,
                total_days: 0,
            });
            entry.count += 1;
            entry.total_days += row.number_of_days;
        }

        Ok(LeaveStats {
            by_type,
            by_status,
            by_month: by_month.into_values().collect(),
        })
    }

    /// Task counts by status, priority and owning team
    pub async fn tasks(&self) -> RepoResult<TaskStats> {
        let mut result = self
            .base
            .db()
            .query("SELECT status, priority, team FROM task")
            .query("SELECT * FROM team")
            .await?;
        let rows: Vec<TaskRow> = result.take(0)?;
        let teams: Vec<Team> = result.take(1)?;

        let by_status = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done]
            .into_iter()
            .map(|status| TaskStatusStat {
                status,
                count: rows.iter().filter(|r| r.status == status).count() as u64,
            })
            .collect();

        let by_priority = [TaskPriority::Low, TaskPriority::Medium, TaskPriority::High]
            .into_iter()
            .map(|priority| TaskPriorityStat {
                priority,
                count: rows.iter().filter(|r| r.priority == priority).count() as u64,
            })
            .collect();

        let names: HashMap<String, String> = teams
            .iter()
            .filter_map(|t| t.id.as_ref().map(|id| (id.to_string(), t.name.clone())))
            .collect();
        let mut by_team: BTreeMap<String, TeamTaskStat> = BTreeMap::new();
        for row in &rows {
            let key = row.team.to_string();
            let entry = by_team.entry(key.clone()).or_insert_with(|| TeamTaskStat {
                team: names.get(&key).cloned().unwrap_or(key),
                total: 0,
                completed: 0,
            });
            entry.total += 1;
            if row.status == TaskStatus::Done {
                entry.completed += 1;
            }
        }

        Ok(TaskStats {
            by_status,
            by_priority,
            by_team: by_team.into_values().collect(),
        })
    }

    /// Per-team rollup: leader, active members assigned to the team, task
    /// totals and the completion rate. Teams ordered by name.
    pub async fn team_performance(&self) -> RepoResult<Vec<TeamPerformance>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM team ORDER BY name")
            .await?;
        let teams: Vec<Team> = result.take(0)?;

        let mut performance = Vec::with_capacity(teams.len());
        for team in teams {
            let rid = match team.id {
                Some(rid) => rid,
                None => continue,
            };
            let leader: Option<User> = self.base.db().select(team.leader.clone()).await?;
            let leader_name = leader
                .map(|u| u.profile.full_name)
                .unwrap_or_else(|| "N/A".to_string());

            let mut counts = self
                .base
                .db()
                .query(
                    "SELECT count() FROM user WHERE team_id = $team AND is_active = true \
                     GROUP ALL",
                )
                .query("SELECT count() FROM task WHERE team = $team GROUP ALL")
                .query("SELECT count() FROM task WHERE team = $team AND status = $done GROUP ALL")
                .bind(("team", rid))
                .bind(("done", TaskStatus::Done))
                .await?;
            let members: Option<i64> = counts.take((0, "count"))?;
            let total: Option<i64> = counts.take((1, "count"))?;
            let completed: Option<i64> = counts.take((2, "count"))?;

            let total_tasks = to_count(total);
            let completed_tasks = to_count(completed);
            let completion_rate = if total_tasks > 0 {
                ((completed_tasks as f64 / total_tasks as f64) * 100.0).round() as u32
            } else {
                0
            };

            performance.push(TeamPerformance {
                team_name: team.name,
                leader: leader_name,
                member_count: to_count(members),
                total_tasks,
                completed_tasks,
                completion_rate,
            });
        }

        Ok(performance)
    }
}

fn to_count(value: Option<i64>) -> u64 {
    value.unwrap_or(0).max(0) as u64
}
