//! Resolves a rider-typed station name into the set of platform stop ids it refers to.

use std::collections::HashSet;

use timetable_core::feed::{FeedStore, Stop, StopId, StopKind};
use unicode_normalization::UnicodeNormalization;

use crate::errors::FindRouteError;

fn fold(s: &str) -> String {
    s.nfkc().collect::<String>().to_lowercase()
}

/// `Other`-kind stops (entrances, generic nodes, boarding areas) are never
/// boardable in their own right, so name matching skips them.
fn matchable(stop: &&Stop) -> bool {
    !matches!(stop.kind, StopKind::Other)
}

/// Finds the station matching `query`, preferring an exact (case/diacritic
/// insensitive) name match; falls back to a substring match. Returns the
/// matched station plus every platform under it so the planner can board or
/// alight at any of them.
///
/// Matching is not restricted to stops with `location_type=1`: many real
/// feeds have no separate station row at all and just list flat platforms,
/// in which case a matched platform with no parent stands in for its own
/// station.
pub fn resolve_station(feed: &FeedStore, query: &str) -> Result<HashSet<StopId>, FindRouteError> {
    let folded_query = fold(query);

    let exact: Vec<&Stop> = feed
        .stops()
        .filter(matchable)
        .filter(|s| fold(&s.stop_name) == folded_query)
        .collect();

    let station_id = if !exact.is_empty() {
        collapse_to_station(&exact, query)?
    } else {
        let substring: Vec<&Stop> = feed
            .stops()
            .filter(matchable)
            .filter(|s| fold(&s.stop_name).contains(&folded_query))
            .collect();
        if substring.is_empty() {
            return Err(FindRouteError::UnknownStation(query.to_string()));
        }
        collapse_to_station(&substring, query)?
    };

    let mut stops: HashSet<StopId> = feed
        .stops()
        .filter(|s| s.station_id() == station_id)
        .map(|s| s.stop_id)
        .collect();
    stops.insert(station_id);
    Ok(stops)
}

/// Collapses a set of name-matched stops to the single station they share
/// (by `station_id()`, i.e. parent if any, else the stop itself). Surfaces
/// `AmbiguousStation` if the matches span more than one station.
fn collapse_to_station(matches: &[&Stop], query: &str) -> Result<StopId, FindRouteError> {
    let mut station_ids: Vec<StopId> = matches.iter().map(|s| s.station_id()).collect();
    station_ids.sort_unstable();
    station_ids.dedup();

    match station_ids.as_slice() {
        [station_id] => Ok(*station_id),
        _ => {
            let mut names: Vec<String> = matches.iter().map(|s| s.stop_name.clone()).collect();
            names.sort();
            names.dedup();
            Err(FindRouteError::AmbiguousStation(query.to_string(), names))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use timetable_core::feed::FeedStore;

    fn feed_with_stations(names: &[(&str, &str)]) -> FeedStore {
        let mut b = FeedStore::builder();
        let mut next_id = 1u32;
        for (station_name, platform_name) in names {
            let station_id = next_id;
            next_id += 1;
            b.add_station(station_id, (*station_name).to_string());
            let platform_id = next_id;
            next_id += 1;
            b.add_platform(platform_id, (*platform_name).to_string(), Some(station_id));
        }
        b.build()
    }

    #[test]
    fn exact_match_is_case_insensitive() {
        let feed = feed_with_stations(&[("Zurich HB", "Zurich HB Platform 1")]);
        let stops = resolve_station(&feed, "zurich hb").unwrap();
        assert_eq!(stops.len(), 2);
    }

    #[test]
    fn exact_match_is_insensitive_to_combining_vs_composed_accents() {
        // "Zürich HB" stored with a precomposed ü; queried with "u" + combining
        // diaeresis (U+0308) - NFKC brings both to the same composed form.
        let feed = feed_with_stations(&[("Z\u{fc}rich HB", "Zurich HB Platform 1")]);
        let stops = resolve_station(&feed, "zu\u{308}rich hb").unwrap();
        assert_eq!(stops.len(), 2);
    }

    #[test]
    fn unique_substring_match_succeeds() {
        let feed = feed_with_stations(&[("Bern Bahnhof", "Bern Bahnhof 3")]);
        let stops = resolve_station(&feed, "Bahnhof").unwrap();
        assert_eq!(stops.len(), 2);
    }

    #[test]
    fn ambiguous_substring_is_rejected() {
        let feed = feed_with_stations(&[
            ("Bern Bahnhof", "Bern Bahnhof 1"),
            ("Bern Wankdorf", "Bern Wankdorf 1"),
        ]);
        let err = resolve_station(&feed, "Bern").unwrap_err();
        assert!(matches!(err, FindRouteError::AmbiguousStation(_, _)));
    }

    #[test]
    fn unknown_station_is_rejected() {
        let feed = feed_with_stations(&[("Bern", "Bern 1")]);
        let err = resolve_station(&feed, "Nowhere").unwrap_err();
        assert!(matches!(err, FindRouteError::UnknownStation(_)));
    }

    /// Many real feeds never set `location_type` or `parent_station` at all -
    /// every stop is a bare platform with no parent. `is_station()` is false
    /// for all of them, so matching must not depend on it.
    #[test]
    fn flat_feed_with_no_station_rows_still_resolves() {
        let mut b = FeedStore::builder();
        b.add_platform(1, "Alpha".into(), None);
        b.add_platform(2, "Beta".into(), None);
        let feed = b.build();

        let stops = resolve_station(&feed, "alpha").unwrap();
        assert_eq!(stops, [1].into_iter().collect());
    }
}
