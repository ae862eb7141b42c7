use chrono::NaiveTime;
use chrono_tz::Tz;

use crate::auth::JwtConfig;
use crate::db::models::Geofence;

/// Server configuration
///
/// Every field can be overridden through an environment variable:
///
/// | Environment variable | Default | Meaning |
/// |----------------------|---------|---------|
/// | WORK_DIR | /var/lib/wfm | Working directory (database, logs) |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | ENVIRONMENT | development | development \| staging \| production |
/// | BUSINESS_TIMEZONE | Asia/Ho_Chi_Minh | Timezone for attendance dates |
/// | WORKDAY_START | 08:00:00 | Clock-in at or before this is `present` |
/// | GEOFENCE_LAT_MIN/MAX, GEOFENCE_LNG_MIN/MAX | office rectangle | Allowed clock-in area |
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory holding the embedded database
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// JWT configuration (secret, lifetimes)
    pub jwt: JwtConfig,
    /// Runtime environment: development | staging | production
    pub environment: String,
    /// Business timezone; attendance calendar dates and the late cutoff are
    /// evaluated in this zone
    pub timezone: Tz,
    /// Local time-of-day boundary between `present` and `late` (inclusive)
    pub workday_start: NaiveTime,
    /// Rectangular area within which clock-in is permitted
    pub geofence: Geofence,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/wfm".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            jwt: JwtConfig::from_env(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            timezone: std::env::var("BUSINESS_TIMEZONE")
                .ok()
                .and_then(|tz| tz.parse().ok())
                .unwrap_or(chrono_tz::Asia::Ho_Chi_Minh),
            workday_start: std::env::var("WORKDAY_START")
                .ok()
                .and_then(|t| NaiveTime::parse_from_str(&t, "%H:%M:%S").ok())
                .unwrap_or_else(|| NaiveTime::from_hms_opt(8, 0, 0).unwrap()),
            geofence: Geofence {
                lat_min: env_f64("GEOFENCE_LAT_MIN", 10.869093),
                lat_max: env_f64("GEOFENCE_LAT_MAX", 10.871556),
                lng_min: env_f64("GEOFENCE_LNG_MIN", 106.802012),
                lng_max: env_f64("GEOFENCE_LNG_MAX", 106.805138),
            },
        }
    }

    /// Override work dir and port, keeping everything else env-derived.
    /// Used by tests.
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
