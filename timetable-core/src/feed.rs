use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::time::Time;

pub type StopId = u32;
pub type TripId = u32;
pub type RouteId = u32;
pub type ServiceId = u16;

#[derive(Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Clone, Copy)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    /// The weekday masks in `calendar.txt` are given Monday-first, matching `chrono::Weekday`.
    pub fn from_chrono(weekday: chrono::Weekday) -> Day {
        use chrono::Weekday::*;
        match weekday {
            Mon => Day::Monday,
            Tue => Day::Tuesday,
            Wed => Day::Wednesday,
            Thu => Day::Thursday,
            Fri => Day::Friday,
            Sat => Day::Saturday,
            Sun => Day::Sunday,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Day::Monday => "mon",
            Day::Tuesday => "tue",
            Day::Wednesday => "wed",
            Day::Thursday => "thu",
            Day::Friday => "fri",
            Day::Saturday => "sat",
            Day::Sunday => "sun",
        })
    }
}

/// What kind of passenger-facing location a [`Stop`] is.
///
/// Simpler than a full GTFS `location_type` hierarchy (no entrances/exits,
/// no boarding areas, no pathways) since footpath transfers and station
/// access modelling are out of scope here.
#[derive(Debug, Clone)]
pub enum StopKind {
    Station { children: Vec<StopId> },
    Platform { parent: Option<StopId> },
    Other,
}

#[derive(Debug, Clone)]
pub struct Stop {
    pub stop_id: StopId,
    pub stop_name: String,
    pub kind: StopKind,
}

impl Stop {
    /// Id of the parent station, or this stop's own id if it has none.
    pub fn station_id(&self) -> StopId {
        match &self.kind {
            StopKind::Platform {
                parent: Some(parent),
            } => *parent,
            _ => self.stop_id,
        }
    }

    pub fn is_station(&self) -> bool {
        matches!(self.kind, StopKind::Station { .. })
    }

    pub fn children(&self) -> &[StopId] {
        match &self.kind {
            StopKind::Station { children } => children,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Route {
    pub route_id: RouteId,
    pub route_short_name: String,
}

#[derive(Debug, Clone)]
pub struct Trip {
    pub trip_id: TripId,
    pub route_id: RouteId,
    pub service_id: ServiceId,
    /// Sorted by `stop_sequence` ascending.
    pub stop_times: Vec<StopTime>,
}

#[derive(Debug, Clone, Copy)]
pub struct StopTime {
    pub stop_sequence: u32,
    pub stop_id: StopId,
    pub arrival_time: Time,
    pub departure_time: Time,
}

/// A GTFS `calendar.txt` row plus any `calendar_dates.txt` exceptions for
/// the same `service_id`.
#[derive(Debug, Clone)]
pub struct Service {
    pub service_id: ServiceId,
    pub weekdays: [bool; 7],
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// `date -> true` means added (exception_type 1), `false` means removed (exception_type 2).
    pub exceptions: HashMap<NaiveDate, bool>,
}

impl Service {
    pub fn runs_on(&self, date: NaiveDate) -> bool {
        if let Some(&added) = self.exceptions.get(&date) {
            return added;
        }
        if date < self.start_date || date > self.end_date {
            return false;
        }
        self.weekdays[Day::from_chrono(date.weekday()).index()]
    }
}

/// One directed hop between two consecutive stops of a single trip at fixed times.
#[derive(Debug, Clone, Copy)]
pub struct Connection {
    pub trip_id: TripId,
    pub route_id: RouteId,
    pub from_stop_id: StopId,
    pub to_stop_id: StopId,
    pub dep_sec: u32,
    pub arr_sec: u32,
}

/// Parsed and indexed GTFS data, immutable once built.
///
/// * efficient lookups for searching
/// * owns every timetable row; the planner only ever borrows from it
pub struct FeedStore {
    pub(crate) stops: HashMap<StopId, Stop>,
    pub(crate) trips: HashMap<TripId, Trip>,
    pub(crate) routes: HashMap<RouteId, Route>,
    pub(crate) services: HashMap<ServiceId, Service>,
}

impl FeedStore {
    pub fn builder() -> Builder {
        Builder {
            stops: HashMap::new(),
            trips: HashMap::new(),
            routes: HashMap::new(),
            services: HashMap::new(),
            stop_children: HashMap::new(),
        }
    }

    pub fn get_stop(&self, stop_id: StopId) -> Option<&Stop> {
        self.stops.get(&stop_id)
    }

    pub fn stops(&self) -> impl Iterator<Item = &Stop> {
        self.stops.values()
    }

    pub fn get_trip(&self, trip_id: TripId) -> Option<&Trip> {
        self.trips.get(&trip_id)
    }

    pub fn trips(&self) -> impl Iterator<Item = &Trip> {
        self.trips.values()
    }

    pub fn get_route(&self, route_id: RouteId) -> Option<&Route> {
        self.routes.get(&route_id)
    }

    /// Get the route that the specified trip belongs to.
    pub fn trip_route(&self, trip_id: TripId) -> Option<(RouteId, &str)> {
        let trip = self.trips.get(&trip_id)?;
        let route = self.routes.get(&trip.route_id)?;
        Some((route.route_id, route.route_short_name.as_str()))
    }

    pub fn stop_name(&self, stop_id: StopId) -> &str {
        self.stops
            .get(&stop_id)
            .map(|stop| stop.stop_name.as_str())
            .unwrap_or("?")
    }

    /// The set of `service_id`s active on `date`, per `calendar.txt` + `calendar_dates.txt`.
    pub fn active_services(&self, date: NaiveDate) -> HashSet<ServiceId> {
        self.services
            .values()
            .filter(|service| service.runs_on(date))
            .map(|service| service.service_id)
            .collect()
    }
}

pub struct Builder {
    stops: HashMap<StopId, Stop>,
    trips: HashMap<TripId, Trip>,
    routes: HashMap<RouteId, Route>,
    services: HashMap<ServiceId, Service>,
    stop_children: HashMap<StopId, Vec<StopId>>,
}

impl Builder {
    pub fn add_station(&mut self, stop_id: StopId, stop_name: String) {
        self.stops.insert(
            stop_id,
            Stop {
                stop_id,
                stop_name,
                kind: StopKind::Station {
                    children: Default::default(),
                },
            },
        );
    }

    pub fn add_platform(&mut self, stop_id: StopId, stop_name: String, parent: Option<StopId>) {
        self.stops.insert(
            stop_id,
            Stop {
                stop_id,
                stop_name,
                kind: StopKind::Platform { parent },
            },
        );
        if let Some(parent) = parent {
            self.stop_children.entry(parent).or_default().push(stop_id);
        }
    }

    pub fn add_other(&mut self, stop_id: StopId, stop_name: String) {
        self.stops.insert(
            stop_id,
            Stop {
                stop_id,
                stop_name,
                kind: StopKind::Other,
            },
        );
    }

    pub fn add_route(&mut self, route_id: RouteId, route_short_name: String) {
        self.routes.insert(
            route_id,
            Route {
                route_id,
                route_short_name,
            },
        );
    }

    pub fn add_trip(&mut self, trip_id: TripId, route_id: RouteId, service_id: ServiceId) {
        self.trips.insert(
            trip_id,
            Trip {
                trip_id,
                route_id,
                service_id,
                stop_times: Vec::new(),
            },
        );
    }

    pub fn add_trip_stop(
        &mut self,
        trip_id: TripId,
        stop_sequence: u32,
        stop_id: StopId,
        arrival_time: Time,
        departure_time: Time,
    ) {
        if let Some(trip) = self.trips.get_mut(&trip_id) {
            trip.stop_times.push(StopTime {
                stop_sequence,
                stop_id,
                arrival_time,
                departure_time,
            });
        }
    }

    pub fn add_service(
        &mut self,
        service_id: ServiceId,
        weekdays: [bool; 7],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) {
        self.services.insert(
            service_id,
            Service {
                service_id,
                weekdays,
                start_date,
                end_date,
                exceptions: HashMap::new(),
            },
        );
    }

    /// Record a `calendar_dates.txt` exception. `added = true` for
    /// exception_type 1, `false` for exception_type 2. A service with no
    /// `calendar.txt` row (only exceptions) is created with a mask of all
    /// `false` and a date range matching `date`, so `runs_on` falls through
    /// to the exception table.
    pub fn add_service_exception(&mut self, service_id: ServiceId, date: NaiveDate, added: bool) {
        let service = self.services.entry(service_id).or_insert_with(|| Service {
            service_id,
            weekdays: [false; 7],
            start_date: date,
            end_date: date,
            exceptions: HashMap::new(),
        });
        service.exceptions.insert(date, added);
    }

    pub fn build(mut self) -> FeedStore {
        for (trip_id, trip) in self.trips.iter_mut() {
            trip.stop_times.sort_by_key(|st| st.stop_sequence);
            debug_assert!(
                trip.stop_times.windows(2).all(|w| w[0].stop_sequence < w[1].stop_sequence),
                "trip {trip_id} has duplicate stop_sequence values"
            );
        }
        for (station_id, children) in self.stop_children {
            if let Some(station) = self.stops.get_mut(&station_id) {
                if let StopKind::Station { children: existing } = &mut station.kind {
                    *existing = children;
                }
            }
        }
        log::info!(
            "loaded {} stops, {} trips, {} routes, {} services",
            self.stops.len(),
            self.trips.len(),
            self.routes.len(),
            self.services.len()
        );
        FeedStore {
            stops: self.stops,
            trips: self.trips,
            routes: self.routes,
            services: self.services,
        }
    }
}
