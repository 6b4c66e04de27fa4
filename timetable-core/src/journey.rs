//! Walks predecessor chains left by [`crate::planner::plan`] into ordered,
//! human-meaningful [`Journey`]s.

use crate::arena::{Arena, ArenaIndex};
use crate::feed::{FeedStore, RouteId, StopId, TripId};
use crate::planner::Label;

/// One uninterrupted ride on a single trip, boarding and alighting at given stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leg {
    pub trip_id: TripId,
    pub route_id: RouteId,
    pub board_stop_id: StopId,
    pub board_sec: u32,
    pub alight_stop_id: StopId,
    pub alight_sec: u32,
    /// Seconds spent waiting at `board_stop_id` before this leg's departure;
    /// `0` for the first leg of a journey.
    pub wait_before_sec: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Journey {
    pub legs: Vec<Leg>,
}

impl Journey {
    pub fn departure_sec(&self) -> u32 {
        self.legs.first().map(|l| l.board_sec).unwrap_or(0)
    }

    pub fn arrival_sec(&self) -> u32 {
        self.legs.last().map(|l| l.alight_sec).unwrap_or(0)
    }

    pub fn transfer_count(&self) -> usize {
        self.legs.len().saturating_sub(1)
    }
}

/// Reconstructs and deduplicates every destination label produced by one
/// planner run, returning the finished, ranked list of journeys.
pub fn build_journeys(
    arena: &Arena<Label>,
    destinations: &[ArenaIndex<Label>],
    feed: &FeedStore,
) -> Vec<Journey> {
    let journeys = destinations
        .iter()
        .map(|&idx| reconstruct(arena, idx, feed))
        .collect();
    dedup(journeys)
}

/// Walks the predecessor chain of `label` back to Origin, coalescing
/// consecutive connections that share a `via_trip` into a single [`Leg`].
fn reconstruct(arena: &Arena<Label>, label: ArenaIndex<Label>, feed: &FeedStore) -> Journey {
    let mut hops: Vec<Label> = Vec::new();
    let mut cur = Some(label);
    while let Some(idx) = cur {
        let l = arena[idx];
        if l.via_trip.is_none() {
            break; // Origin label, nothing to ride
        }
        hops.push(l);
        cur = l.predecessor;
    }
    hops.reverse();

    let mut legs: Vec<Leg> = Vec::new();
    for hop in hops {
        let trip_id = hop.via_trip.expect("non-origin hop always has a trip");
        let route_id = feed
            .trip_route(trip_id)
            .map(|(route_id, _)| route_id)
            .unwrap_or_default();
        match legs.last_mut() {
            Some(leg) if leg.trip_id == trip_id => {
                leg.alight_stop_id = hop.stop_id;
                leg.alight_sec = hop.arr_sec;
            }
            _ => {
                let board_stop_id = predecessor_stop(arena, hop.predecessor);
                // The first leg of a journey has no preceding segment to wait on,
                // regardless of how long before departure the rider reached the
                // boarding stop (which may be well before the query's earliest time).
                let wait_before_sec = if legs.is_empty() {
                    0
                } else {
                    hop.dep_from_predecessor_sec
                        - arena[hop.predecessor.expect("non-origin hop has a predecessor")].arr_sec
                };
                legs.push(Leg {
                    trip_id,
                    route_id,
                    board_stop_id,
                    board_sec: hop.dep_from_predecessor_sec,
                    alight_stop_id: hop.stop_id,
                    alight_sec: hop.arr_sec,
                    wait_before_sec,
                });
            }
        }
    }
    Journey { legs }
}

fn predecessor_stop(arena: &Arena<Label>, predecessor: Option<ArenaIndex<Label>>) -> StopId {
    let idx = predecessor.expect("non-origin hop has a predecessor");
    arena[idx].stop_id
}

/// Deduplicates journeys that reconstruct to the same sequence of
/// `(trip_id, board_stop_id, alight_stop_id)` triples - this can happen when
/// multiple destination platforms in the same station both yield a label
/// for what is, in the rider's terms, the same ride.
fn dedup(mut journeys: Vec<Journey>) -> Vec<Journey> {
    let mut seen: Vec<Vec<(TripId, StopId, StopId)>> = Vec::new();
    journeys.retain(|journey| {
        let key: Vec<(TripId, StopId, StopId)> = journey
            .legs
            .iter()
            .map(|l| (l.trip_id, l.board_stop_id, l.alight_stop_id))
            .collect();
        if seen.contains(&key) {
            false
        } else {
            seen.push(key);
            true
        }
    });
    journeys
}
