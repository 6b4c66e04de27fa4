//! Earliest-arrival public transit journey planner over a static GTFS feed.

pub mod api;
pub mod date;
pub mod errors;
pub mod gtfs;
pub mod resolve;

pub use api::{find_route, find_route_with_options, Options, DEFAULT_MAX_ROUTES, DEFAULT_MIN_TRANSFER_SEC};
pub use errors::{FindRouteError, LoadError};
pub use gtfs::loader::load;

pub use timetable_core::feed::FeedStore;
pub use timetable_core::journey::{Journey, Leg};
