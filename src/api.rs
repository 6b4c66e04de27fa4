//! Ties the feed store, connection builder, planner and journey builder
//! together into the single call a caller actually wants.

use std::sync::atomic::AtomicBool;

use chrono::NaiveDate;
use timetable_core::connections::build_connections;
use timetable_core::feed::FeedStore;
use timetable_core::journey::{build_journeys, Journey};
use timetable_core::planner::{self, Cancelled};

use crate::date::{parse_service_date, parse_time_of_day};
use crate::errors::FindRouteError;
use crate::resolve::resolve_station;

pub const DEFAULT_MAX_ROUTES: usize = 5;

/// Minimum dwell time, in seconds, assumed between alighting one trip and
/// boarding another at the same stop. `0` by default: GTFS feeds generally
/// already pad connection times where a transfer is genuinely tight, and a
/// blanket buffer on top of that tends to hide otherwise valid itineraries.
pub const DEFAULT_MIN_TRANSFER_SEC: u32 = 0;

/// Extra knobs beyond the five required call-surface arguments. Most callers
/// want [`find_route`], which fills these in with the defaults above.
#[derive(Debug, Clone, Copy)]
pub struct Options {
    pub min_transfer_sec: u32,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            min_transfer_sec: DEFAULT_MIN_TRANSFER_SEC,
        }
    }
}

/// Finds up to `max_routes` earliest-arrival journeys from `start_name` to
/// `end_name`, departing no earlier than `time` (`HH:MM`, hours may exceed 23
/// to mean "past midnight on `date`'s schedule") on `date` (`YYYY-MM-DD` or
/// `YYYYMMDD`).
pub fn find_route(
    feed: &FeedStore,
    start_name: &str,
    end_name: &str,
    date: &str,
    time: &str,
    max_routes: usize,
) -> Result<Vec<Journey>, FindRouteError> {
    let date = parse_service_date(date)?;
    let time_of_day_sec = parse_time_of_day(time)?;
    find_route_with_options(
        feed,
        start_name,
        end_name,
        date,
        time_of_day_sec,
        max_routes,
        Options::default(),
        None,
    )
}

/// Same as [`find_route`] but with an already-parsed date and time of day,
/// explicit [`Options`], and a cooperative cancellation flag the caller can
/// flip from another thread.
pub fn find_route_with_options(
    feed: &FeedStore,
    start_name: &str,
    end_name: &str,
    date: NaiveDate,
    time_of_day_sec: u32,
    max_routes: usize,
    options: Options,
    cancel: Option<&AtomicBool>,
) -> Result<Vec<Journey>, FindRouteError> {
    let origin_set = resolve_station(feed, start_name)?;
    let dest_set = resolve_station(feed, end_name)?;
    if !origin_set.is_disjoint(&dest_set) {
        return Err(FindRouteError::SameStation);
    }

    let active_services = feed.active_services(date);
    let connections = build_connections(feed, &active_services, time_of_day_sec);

    let outcome = planner::plan(
        &connections,
        &origin_set,
        &dest_set,
        time_of_day_sec,
        max_routes,
        options.min_transfer_sec,
        cancel,
    )
    .map_err(|Cancelled| FindRouteError::Cancelled)?;

    Ok(build_journeys(&outcome.arena, &outcome.destinations, feed))
}

#[cfg(test)]
mod test {
    use super::*;
    use timetable_core::time::Time;

    fn feed_with_direct_trip() -> FeedStore {
        let mut b = FeedStore::builder();
        b.add_station(1, "Alpha".into());
        b.add_platform(11, "Alpha 1".into(), Some(1));
        b.add_station(2, "Beta".into());
        b.add_platform(21, "Beta 1".into(), Some(2));
        b.add_route(100, "R1".into());
        b.add_service(
            1,
            [true; 7],
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
        );
        b.add_trip(1000, 100, 1);
        b.add_trip_stop(1000, 1, 11, Time::from_hms(8, 0, 0), Time::from_hms(8, 0, 0));
        b.add_trip_stop(1000, 2, 21, Time::from_hms(9, 0, 0), Time::from_hms(9, 0, 0));
        b.build()
    }

    #[test]
    fn finds_a_direct_journey() {
        let feed = feed_with_direct_trip();
        let journeys = find_route(&feed, "Alpha", "Beta", "2025-06-02", "07:00", 5).unwrap();
        assert_eq!(journeys.len(), 1);
        assert_eq!(journeys[0].legs.len(), 1);
    }

    #[test]
    fn same_station_is_rejected() {
        let feed = feed_with_direct_trip();
        let err = find_route(&feed, "Alpha", "Alpha", "2025-06-02", "00:00", 5).unwrap_err();
        assert!(matches!(err, FindRouteError::SameStation));
    }

    #[test]
    fn no_service_on_that_date_means_no_journeys() {
        let feed = feed_with_direct_trip();
        let journeys = find_route(&feed, "Alpha", "Beta", "2024-01-01", "00:00", 5).unwrap();
        assert!(journeys.is_empty());
    }

    #[test]
    fn bad_date_string_is_reported() {
        let feed = feed_with_direct_trip();
        let err = find_route(&feed, "Alpha", "Beta", "not a date", "07:00", 5).unwrap_err();
        assert!(matches!(err, FindRouteError::InvalidDate(_)));
    }

    #[test]
    fn bad_time_string_is_reported() {
        let feed = feed_with_direct_trip();
        let err = find_route(&feed, "Alpha", "Beta", "2025-06-02", "not a time", 5).unwrap_err();
        assert!(matches!(err, FindRouteError::InvalidTime(_)));
    }

    #[test]
    fn with_options_still_takes_a_parsed_date_and_time() {
        let feed = feed_with_direct_trip();
        let journeys = find_route_with_options(
            &feed,
            "Alpha",
            "Beta",
            NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            7 * 3600,
            5,
            Options::default(),
            None,
        )
        .unwrap();
        assert_eq!(journeys.len(), 1);
    }
}
