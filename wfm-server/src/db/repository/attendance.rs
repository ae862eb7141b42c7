//! Attendance repository
//!
//! Clock-in/clock-out state machine plus the generic record CRUD. The
//! day key is the calendar date in the business timezone, so a shift
//! spanning midnight UTC still lands on one local date.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use surrealdb::{RecordId, Surreal, engine::local::Db};

use crate::db::models::{
    Attendance, AttendanceStatus, AttendanceUpdate, GeoPoint, Geofence, User, round_work_hours,
};

use super::{BaseRepository, RepoError, RepoResult, page_bounds};

/// Business rules the clock-in path evaluates against
#[derive(Debug, Clone, Copy)]
pub struct AttendanceRules {
    pub geofence: Geofence,
    pub timezone: Tz,
    pub workday_start: NaiveTime,
}

#[derive(Clone)]
pub struct AttendanceRepository {
    base: BaseRepository,
}

impl AttendanceRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Attendance>> {
        let rid = self.base.parse_id(id)?;
        Ok(self.base.db().select(rid).await?)
    }

    /// The user's record for one calendar date, if any
    pub async fn find_for_date(
        &self,
        user: &RecordId,
        date: NaiveDate,
    ) -> RepoResult<Option<Attendance>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM attendance WHERE user = $user AND date = $date LIMIT 1")
            .bind(("user", user.clone()))
            .bind(("date", date))
            .await?;
        Ok(result.take(0)?)
    }

    /// Clock in at the current instant. See [`clock_in_at`](Self::clock_in_at).
    pub async fn clock_in(
        &self,
        user_id: &str,
        lat: Option<f64>,
        lng: Option<f64>,
        rules: &AttendanceRules,
    ) -> RepoResult<Attendance> {
        self.clock_in_at(user_id, lat, lng, rules, Utc::now()).await
    }

    /// Clock in at an explicit instant.
    ///
    /// Rejects missing coordinates, coordinates outside the geofence, and
    /// a second clock-in on the same local date. Status is `present` when
    /// the local time is at or before the workday start, `late` after.
    ///
    /// The existence check and the insert are separate statements; two
    /// simultaneous clock-ins can both pass the check.
    pub async fn clock_in_at(
        &self,
        user_id: &str,
        lat: Option<f64>,
        lng: Option<f64>,
        rules: &AttendanceRules,
        now: DateTime<Utc>,
    ) -> RepoResult<Attendance> {
        let user = self.resolve_user(user_id).await?;

        let (lat, lng) = match (lat, lng) {
            (Some(lat), Some(lng)) => (lat, lng),
            _ => {
                return Err(RepoError::Validation(
                    "Location (lat, lng) is required".to_string(),
                ));
            }
        };
        let location = GeoPoint { lat, lng };
        if !rules.geofence.contains(&location) {
            return Err(RepoError::Validation(
                "You are outside the allowed check-in area".to_string(),
            ));
        }

        let local = now.with_timezone(&rules.timezone);
        let date = local.date_naive();

        if self.find_for_date(&user, date).await?.is_some() {
            return Err(RepoError::Conflict(
                "Already clocked in today".to_string(),
            ));
        }

        let status = AttendanceStatus::classify(local.time(), rules.workday_start);

        let mut result = self
            .base
            .db()
            .query(
                "CREATE attendance SET user = $user, date = $date, clock_in = $clock_in, \
                 clock_out = NONE, location = $location, status = $status, work_hours = 0, \
                 created_at = $created_at RETURN AFTER",
            )
            .bind(("user", user))
            .bind(("date", date))
            .bind(("clock_in", now))
            .bind(("location", location))
            .bind(("status", status))
            .bind(("created_at", now))
            .await?;

        let created: Option<Attendance> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create attendance".to_string()))
    }

    /// Clock out at the current instant. See [`clock_out_at`](Self::clock_out_at).
    pub async fn clock_out(
        &self,
        user_id: &str,
        rules: &AttendanceRules,
    ) -> RepoResult<Attendance> {
        self.clock_out_at(user_id, rules, Utc::now()).await
    }

    /// Close today's open record and compute worked hours.
    ///
    /// No record for today is NotFound; an already-closed record is a
    /// Conflict. Worked hours are elapsed time rounded to two decimals.
    pub async fn clock_out_at(
        &self,
        user_id: &str,
        rules: &AttendanceRules,
        now: DateTime<Utc>,
    ) -> RepoResult<Attendance> {
        let user = self.base.parse_id(user_id)?;
        let date = now.with_timezone(&rules.timezone).date_naive();

        let record = self
            .find_for_date(&user, date)
            .await?
            .ok_or_else(|| RepoError::NotFound("No clock-in record for today".to_string()))?;
        if record.clock_out.is_some() {
            return Err(RepoError::Conflict("Already clocked out today".to_string()));
        }
        let rid = record
            .id
            .ok_or_else(|| RepoError::Database("Attendance record has no id".to_string()))?;

        let work_hours = round_work_hours(record.clock_in, now);

        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $record SET clock_out = $clock_out, work_hours = $work_hours \
                 RETURN AFTER",
            )
            .bind(("record", rid))
            .bind(("clock_out", now))
            .bind(("work_hours", work_hours))
            .await?;

        let updated: Option<Attendance> = result.take(0)?;
        updated.ok_or_else(|| RepoError::Database("Failed to update attendance".to_string()))
    }

    /// List records, newest date first. The date range filter applies only
    /// when both ends are given; both ends are inclusive.
    pub async fn list(
        &self,
        user_id: Option<&str>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        page: u32,
        page_size: u32,
    ) -> RepoResult<(Vec<Attendance>, u64)> {
        let (limit, start) = page_bounds(page, page_size);

        let user_rid = match user_id {
            Some(id) => Some(self.base.parse_id(id)?),
            None => None,
        };
        let range = match (start_date, end_date) {
            (Some(from), Some(to)) => Some((from, to)),
            _ => None,
        };

        let mut conditions: Vec<&str> = Vec::new();
        if user_rid.is_some() {
            conditions.push("user = $user");
        }
        if range.is_some() {
            conditions.push("date >= $from AND date <= $to");
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let list_query = format!(
            "SELECT * FROM attendance{} ORDER BY date DESC LIMIT $limit START $start",
            where_clause
        );
        let count_query = format!("SELECT count() FROM attendance{} GROUP ALL", where_clause);

        let mut query = self
            .base
            .db()
            .query(list_query)
            .query(count_query)
            .bind(("limit", limit))
            .bind(("start", start));
        if let Some(rid) = user_rid {
            query = query.bind(("user", rid));
        }
        if let Some((from, to)) = range {
            query = query.bind(("from", from)).bind(("to", to));
        }

        let mut result = query.await?;
        let records: Vec<Attendance> = result.take(0)?;
        let count: Option<i64> = result.take((1, "count"))?;
        Ok((records, count.unwrap_or(0) as u64))
    }

    /// Direct field patch without the clock-in/out state machine. Any
    /// field, including status, may be overwritten here.
    pub async fn update(&self, id: &str, data: AttendanceUpdate) -> RepoResult<Attendance> {
        let rid = self.base.parse_id(id)?;
        let mut record: Attendance = self
            .base
            .db()
            .select(rid.clone())
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Attendance {} not found", id)))?;

        if let Some(date) = data.date {
            record.date = date;
        }
        if let Some(clock_in) = data.clock_in {
            record.clock_in = clock_in;
        }
        if let Some(clock_out) = data.clock_out {
            record.clock_out = Some(clock_out);
        }
        if let Some(location) = data.location {
            record.location = location;
        }
        if let Some(status) = data.status {
            record.status = status;
        }
        if let Some(work_hours) = data.work_hours {
            record.work_hours = work_hours;
        }

        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $record SET date = $date, clock_in = $clock_in, clock_out = $clock_out, \
                 location = $location, status = $status, work_hours = $work_hours RETURN AFTER",
            )
            .bind(("record", rid))
            .bind(("date", record.date))
            .bind(("clock_in", record.clock_in))
            .bind(("clock_out", record.clock_out))
            .bind(("location", record.location))
            .bind(("status", record.status))
            .bind(("work_hours", record.work_hours))
            .await?;

        let updated: Option<Attendance> = result.take(0)?;
        updated.ok_or_else(|| RepoError::Database("Failed to update attendance".to_string()))
    }

    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let rid = self.base.parse_id(id)?;
        let deleted: Option<Attendance> = self.base.db().delete(rid).await?;
        deleted
            .map(|_| ())
            .ok_or_else(|| RepoError::NotFound(format!("Attendance {} not found", id)))
    }

    async fn resolve_user(&self, user_id: &str) -> RepoResult<RecordId> {
        let rid = self.base.parse_id(user_id)?;
        let user: Option<User> = self.base.db().select(rid.clone()).await?;
        if user.is_none() {
            return Err(RepoError::NotFound(format!("User {} not found", user_id)));
        }
        Ok(rid)
    }
}
