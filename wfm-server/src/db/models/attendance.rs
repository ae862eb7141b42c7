//! Attendance model and clock-in rules
//!
//! One record per (user, calendar date). The pure rules live here so they
//! can be tested without a database: geofence containment, late/present
//! classification, and work-hour rounding.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// Geolocation captured at clock-in
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Rectangular latitude/longitude bound within which clock-in is permitted.
/// Bounds are inclusive on every edge.
#[derive(Debug, Clone, Copy)]
pub struct Geofence {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lng_min: f64,
    pub lng_max: f64,
}

impl Geofence {
    pub fn contains(&self, point: &GeoPoint) -> bool {
        self.lat_min <= point.lat
            && point.lat <= self.lat_max
            && self.lng_min <= point.lng
            && point.lng <= self.lng_max
    }
}

/// Attendance status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
}

impl AttendanceStatus {
    /// Classify a clock-in by local time-of-day: at or before the workday
    /// start is `present`, strictly after is `late`. The boundary itself
    /// counts as `present`.
    pub fn classify(clock_in_local: NaiveTime, workday_start: NaiveTime) -> Self {
        if clock_in_local <= workday_start {
            Self::Present
        } else {
            Self::Late
        }
    }
}

/// Elapsed hours between clock-in and clock-out, rounded to 2 decimals
pub fn round_work_hours(clock_in: DateTime<Utc>, clock_out: DateTime<Utc>) -> f64 {
    let seconds = (clock_out - clock_in).num_seconds() as f64;
    (seconds / 3600.0 * 100.0).round() / 100.0
}

/// Attendance document
///
/// Invariant: at most one record per user per calendar date. `clock_out`
/// stays null and `work_hours` stays 0 until checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attendance {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub user: RecordId,
    /// Calendar date in the business timezone
    pub date: NaiveDate,
    pub clock_in: DateTime<Utc>,
    #[serde(default)]
    pub clock_out: Option<DateTime<Utc>>,
    pub location: GeoPoint,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub work_hours: f64,
    pub created_at: DateTime<Utc>,
}

/// Direct field patch for the generic update path.
///
/// Deliberately unguarded: any field, including `status`, is editable here
/// without the clock-in/out state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clock_in: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clock_out: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AttendanceStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_hours: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn office_fence() -> Geofence {
        Geofence {
            lat_min: 10.869093,
            lat_max: 10.871556,
            lng_min: 106.802012,
            lng_max: 106.805138,
        }
    }

    #[test]
    fn test_geofence_inclusive_bounds() {
        let fence = office_fence();
        // Interior point
        assert!(fence.contains(&GeoPoint {
            lat: 10.870,
            lng: 106.803,
        }));
        // Corners are inclusive
        assert!(fence.contains(&GeoPoint {
            lat: 10.869093,
            lng: 106.802012,
        }));
        assert!(fence.contains(&GeoPoint {
            lat: 10.871556,
            lng: 106.805138,
        }));
        // Just outside
        assert!(!fence.contains(&GeoPoint {
            lat: 10.869092,
            lng: 106.803,
        }));
        assert!(!fence.contains(&GeoPoint {
            lat: 10.870,
            lng: 106.805139,
        }));
    }

    #[test]
    fn test_status_boundary_at_workday_start() {
        let start = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
        // Exactly 08:00:00 is present
        assert_eq!(
            AttendanceStatus::classify(start, start),
            AttendanceStatus::Present
        );
        assert_eq!(
            AttendanceStatus::classify(NaiveTime::from_hms_opt(7, 59, 59).unwrap(), start),
            AttendanceStatus::Present
        );
        // One second after is late
        assert_eq!(
            AttendanceStatus::classify(NaiveTime::from_hms_opt(8, 0, 1).unwrap(), start),
            AttendanceStatus::Late
        );
    }

    #[test]
    fn test_work_hours_rounding() {
        let clock_in = Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap();
        let clock_out = Utc.with_ymd_and_hms(2024, 3, 4, 17, 30, 0).unwrap();
        assert_eq!(round_work_hours(clock_in, clock_out), 9.5);

        let clock_out = Utc.with_ymd_and_hms(2024, 3, 4, 8, 10, 0).unwrap();
        assert_eq!(round_work_hours(clock_in, clock_out), 0.17);
    }
}
