//! Builds the day's list of [`Connection`]s from the active trips of a [`FeedStore`].

use std::collections::HashSet;

use crate::feed::{Connection, FeedStore, ServiceId};

/// For every active trip, emit one [`Connection`] per adjacent pair of stop
/// times (never the full quadratic self-join of all stop pairs in a trip),
/// then sort by departure time, breaking ties by arrival time then trip id
/// so that the scan order - and therefore the planner's output - is
/// deterministic.
///
/// Connections departing before `earliest_sec` are discarded up front; a
/// caller-supplied lookback can be folded into `earliest_sec` before calling
/// this.
pub fn build_connections(
    feed: &FeedStore,
    active_services: &HashSet<ServiceId>,
    earliest_sec: u32,
) -> Vec<Connection> {
    let mut connections = Vec::new();
    for trip in feed.trips() {
        if !active_services.contains(&trip.service_id) {
            continue;
        }
        for window in trip.stop_times.windows(2) {
            if let [from, to] = window {
                let dep_sec = from.departure_time.to_secs_since_midnight();
                if dep_sec < earliest_sec {
                    continue;
                }
                connections.push(Connection {
                    trip_id: trip.trip_id,
                    route_id: trip.route_id,
                    from_stop_id: from.stop_id,
                    to_stop_id: to.stop_id,
                    dep_sec,
                    arr_sec: to.arrival_time.to_secs_since_midnight(),
                });
            }
        }
    }
    connections.sort_by(|a, b| {
        a.dep_sec
            .cmp(&b.dep_sec)
            .then(a.arr_sec.cmp(&b.arr_sec))
            .then(a.trip_id.cmp(&b.trip_id))
    });
    connections
}
