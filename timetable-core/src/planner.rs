//! Pruned label-setting connection scan: the core of the journey search.
//!
//! Walks the day's [`Connection`]s in departure order, keeping a small
//! bounded set of non-dominated arrival labels per stop, and returns the K
//! earliest arrivals at the destination set together with enough
//! predecessor information for [`crate::journey`] to reconstruct the rides.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::arena::{Arena, ArenaIndex};
use crate::feed::{Connection, StopId, TripId};

/// Labels kept per stop before the weakest is dropped. Small because the
/// planner only needs enough alternatives to support a handful of distinct
/// journeys, not every Pareto-optimal arrival.
const LABELS_PER_STOP: usize = 4;

/// How many connections pass between checks of the cancellation flag.
const CANCEL_CHECK_INTERVAL: usize = 1 << 16;

/// A tentative reachable `(stop, arrival_time, via)` tuple.
#[derive(Debug, Clone, Copy)]
pub struct Label {
    pub stop_id: StopId,
    pub arr_sec: u32,
    /// `None` for the synthetic label placed on every origin stop.
    pub via_trip: Option<TripId>,
    pub predecessor: Option<ArenaIndex<Label>>,
    pub dep_from_predecessor_sec: u32,
    /// Departure time from Origin along this label's chain; used only to
    /// break ties between otherwise-equal labels (spec open question: prefer
    /// the label with the later departure from Origin, i.e. the shorter ride).
    origin_departure_sec: u32,
    hops: u32,
}

/// Returned by [`plan`]: the arena backing every label produced during the
/// search, plus the indices of the (up to K) best labels reaching a
/// destination stop, already sorted and ranked.
pub struct PlanOutcome {
    pub arena: Arena<Label>,
    pub destinations: Vec<ArenaIndex<Label>>,
}

/// Search was aborted via the caller's cancellation flag before it could
/// produce a complete answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

/// Runs the label-setting connection scan.
///
/// `connections` must already be sorted by departure time ascending (see
/// [`crate::connections::build_connections`]). `mtt_sec` is the minimum
/// transfer time in seconds; `0` disables the transfer buffer entirely.
pub fn plan(
    connections: &[Connection],
    origin_set: &HashSet<StopId>,
    dest_set: &HashSet<StopId>,
    earliest_sec: u32,
    k: usize,
    mtt_sec: u32,
    cancel: Option<&AtomicBool>,
) -> Result<PlanOutcome, Cancelled> {
    let mut arena: Arena<Label> = Arena::new();
    let mut best_labels: HashMap<StopId, Vec<ArenaIndex<Label>>> = HashMap::new();
    let mut dest_arrivals: Vec<u32> = Vec::new();

    for &stop_id in origin_set {
        let idx = arena.alloc(Label {
            stop_id,
            arr_sec: earliest_sec,
            via_trip: None,
            predecessor: None,
            dep_from_predecessor_sec: earliest_sec,
            origin_departure_sec: earliest_sec,
            hops: 0,
        });
        best_labels.entry(stop_id).or_default().push(idx);
        if dest_set.contains(&stop_id) {
            dest_arrivals.push(earliest_sec);
        }
    }

    let mut scanned = 0usize;
    for c in connections.iter() {
        if scanned % CANCEL_CHECK_INTERVAL == 0 {
            if let Some(flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    log::warn!("search cancelled after scanning {scanned} of {} connections", connections.len());
                    return Err(Cancelled);
                }
            }
        }

        let kth_best = kth_best_arrival(&dest_arrivals, k);
        if c.dep_sec > kth_best {
            break;
        }
        scanned += 1;

        let Some(boarding) = best_labels.get(&c.from_stop_id).cloned() else {
            continue;
        };
        for board_idx in boarding {
            let board = arena[board_idx];
            if board.arr_sec > c.dep_sec {
                continue;
            }
            let same_trip = board.via_trip == Some(c.trip_id);
            let from_origin = board.predecessor.is_none() && board.via_trip.is_none();
            let transfer_ok = same_trip || from_origin || c.dep_sec - board.arr_sec >= mtt_sec;
            if !transfer_ok {
                continue;
            }

            let candidate = Label {
                stop_id: c.to_stop_id,
                arr_sec: c.arr_sec,
                via_trip: Some(c.trip_id),
                predecessor: Some(board_idx),
                dep_from_predecessor_sec: c.dep_sec,
                origin_departure_sec: board.origin_departure_sec,
                hops: board.hops + 1,
            };
            if let Some(idx) = try_insert(&mut arena, &mut best_labels, candidate) {
                if dest_set.contains(&c.to_stop_id) {
                    dest_arrivals.push(arena[idx].arr_sec);
                }
            }
        }
    }

    let mut destinations: Vec<ArenaIndex<Label>> = dest_set
        .iter()
        .filter_map(|stop_id| best_labels.get(stop_id))
        .flatten()
        .copied()
        .collect();
    destinations.sort_by(|&a_idx, &b_idx| {
        let a = arena[a_idx];
        let b = arena[b_idx];
        a.arr_sec
            .cmp(&b.arr_sec)
            .then(b.origin_departure_sec.cmp(&a.origin_departure_sec))
            .then(a.hops.cmp(&b.hops))
            .then(a.via_trip.cmp(&b.via_trip))
    });
    destinations.truncate(k);

    log::info!(
        "search terminated: scanned {scanned} of {} connections, {} destination label(s) kept",
        connections.len(),
        destinations.len()
    );

    Ok(PlanOutcome { arena, destinations })
}

/// The arrival time of the K-th best destination label so far, or `u32::MAX`
/// if fewer than K destinations have been reached yet (meaning nothing can
/// be pruned).
fn kth_best_arrival(dest_arrivals: &[u32], k: usize) -> u32 {
    if dest_arrivals.len() < k || k == 0 {
        return u32::MAX;
    }
    let mut sorted = dest_arrivals.to_vec();
    sorted.sort_unstable();
    sorted[k - 1]
}

/// Inserts `candidate` into `stop`'s bounded label set under the dominance
/// rule: a label is dominated (and dropped) by another label on the same
/// trip that arrives no later; ties on arrival prefer the label departing
/// Origin later. Returns the arena index of the inserted label, or `None` if
/// the candidate was dominated outright.
fn try_insert(
    arena: &mut Arena<Label>,
    best_labels: &mut HashMap<StopId, Vec<ArenaIndex<Label>>>,
    candidate: Label,
) -> Option<ArenaIndex<Label>> {
    let list = best_labels.entry(candidate.stop_id).or_default();

    let dominated = list.iter().any(|&existing_idx| {
        let existing = arena[existing_idx];
        existing.via_trip == candidate.via_trip && existing.arr_sec <= candidate.arr_sec
    });
    if dominated {
        return None;
    }

    list.retain(|&existing_idx| {
        let existing = arena[existing_idx];
        !(existing.via_trip == candidate.via_trip && existing.arr_sec > candidate.arr_sec)
    });

    let idx = arena.alloc(candidate);
    let list = best_labels.entry(candidate.stop_id).or_default();
    list.push(idx);
    list.sort_by(|&a_idx, &b_idx| {
        let a = arena[a_idx];
        let b = arena[b_idx];
        a.arr_sec
            .cmp(&b.arr_sec)
            .then(b.origin_departure_sec.cmp(&a.origin_departure_sec))
    });
    list.truncate(LABELS_PER_STOP);
    Some(idx)
}
