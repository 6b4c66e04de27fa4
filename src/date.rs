//! Parses the service date and time-of-day inputs to [`crate::find_route`].
//!
//! Distinct from [`timetable_core::time::Time`]'s `FromStr`, which expects
//! the `HH:MM:SS` form used inside GTFS itself: callers of this library pass
//! a plain `HH:MM`.

use chrono::NaiveDate;

use crate::errors::FindRouteError;
use timetable_core::time::TimeParseError;

/// Accepts `YYYY-MM-DD` or `YYYYMMDD`.
pub fn parse_service_date(s: &str) -> Result<NaiveDate, FindRouteError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y%m%d"))
        .map_err(|_| FindRouteError::InvalidDate(s.to_string()))
}

/// Accepts `HH:MM`, returning seconds since midnight. Hours may exceed 23 to
/// express a service that runs past midnight on the queried date's schedule.
pub fn parse_time_of_day(s: &str) -> Result<u32, FindRouteError> {
    let (hh, mm) = s
        .split_once(':')
        .ok_or(TimeParseError::InvalidFormat)?;
    let hours: u32 = hh.parse().map_err(|_| TimeParseError::InvalidFormat)?;
    let minutes: u32 = mm.parse().map_err(|_| TimeParseError::InvalidFormat)?;
    if minutes > 59 {
        return Err(TimeParseError::TooManySecondsOrMinutes.into());
    }
    Ok(hours * 3600 + minutes * 60)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn accepts_both_date_forms() {
        assert_eq!(
            parse_service_date("2025-06-15").unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
        );
        assert_eq!(
            parse_service_date("20250615").unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
        );
    }

    #[test]
    fn rejects_garbage_date() {
        assert!(parse_service_date("not a date").is_err());
    }

    #[test]
    fn parses_time_of_day_in_seconds() {
        assert_eq!(parse_time_of_day("08:05").unwrap(), 8 * 3600 + 5 * 60);
    }

    #[test]
    fn accepts_hours_past_midnight() {
        assert_eq!(parse_time_of_day("25:30").unwrap(), 25 * 3600 + 30 * 60);
    }

    #[test]
    fn rejects_bad_minutes() {
        assert!(parse_time_of_day("08:99").is_err());
    }

    #[test]
    fn bad_time_is_distinguishable_from_bad_date() {
        assert!(matches!(
            parse_time_of_day("not a time"),
            Err(FindRouteError::InvalidTime(_))
        ));
        assert!(matches!(
            parse_service_date("not a date"),
            Err(FindRouteError::InvalidDate(_))
        ));
    }
}
