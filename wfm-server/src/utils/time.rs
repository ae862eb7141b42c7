//! Date parsing for query parameters

use chrono::NaiveDate;

use shared::AppError;

/// Parse a `YYYY-MM-DD` query parameter
pub fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date '{}', expected YYYY-MM-DD", value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-03-04").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
        );
        assert!(parse_date("04/03/2024").is_err());
        assert!(parse_date("2024-13-01").is_err());
    }
}
