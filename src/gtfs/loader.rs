//! Reads a GTFS feed directory into a [`timetable_core::feed::FeedStore`].
//!
//! Unlike a live-dashboard loader that can shrug off the occasional bad row,
//! a journey planner needs every stop_time it's told about - a silently
//! dropped row could turn a real connection into a missed one. So any row
//! that fails to parse aborts the whole load with [`LoadError::BadFormat`]
//! naming the file and line.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use lasso::{Rodeo, Spur};

use timetable_core::feed::{FeedStore, RouteId, ServiceId, StopId, TripId};
use timetable_core::time::Time;

use crate::errors::LoadError;
use crate::gtfs;

/// Interns GTFS's string ids into the small `Copy` integers the rest of the
/// planner works with.
struct Interner {
    stops: Rodeo,
    trips: Rodeo,
    routes: Rodeo,
    services: Rodeo,
}

impl Interner {
    fn new() -> Interner {
        Interner {
            stops: Rodeo::default(),
            trips: Rodeo::default(),
            routes: Rodeo::default(),
            services: Rodeo::default(),
        }
    }

    fn stop(&mut self, id: &str) -> StopId {
        spur_to_u32(self.stops.get_or_intern(id))
    }

    fn trip(&mut self, id: &str) -> TripId {
        spur_to_u32(self.trips.get_or_intern(id))
    }

    fn route(&mut self, id: &str) -> RouteId {
        spur_to_u32(self.routes.get_or_intern(id))
    }

    fn service(&mut self, id: &str) -> ServiceId {
        spur_to_u32(self.services.get_or_intern(id)) as ServiceId
    }
}

fn spur_to_u32(spur: Spur) -> u32 {
    spur.into_inner().get() - 1
}

pub fn load(gtfs_dir: &Path) -> Result<FeedStore, LoadError> {
    let mut interner = Interner::new();
    let mut builder = FeedStore::builder();

    load_stops(gtfs_dir, &mut interner, &mut builder)?;
    load_routes(gtfs_dir, &mut interner, &mut builder)?;
    load_trips(gtfs_dir, &mut interner, &mut builder)?;
    load_stop_times(gtfs_dir, &mut interner, &mut builder)?;
    load_calendar(gtfs_dir, &mut interner, &mut builder)?;
    load_calendar_dates(gtfs_dir, &mut interner, &mut builder)?;

    Ok(builder.build())
}

fn open_csv(gtfs_dir: &Path, name: &str) -> Result<(csv::Reader<std::fs::File>, PathBuf), LoadError> {
    let path = gtfs_dir.join(name);
    if !path.is_file() {
        return Err(LoadError::MissingFile(path));
    }
    let file = std::fs::File::open(&path).map_err(|e| LoadError::Io(path.clone(), e))?;
    Ok((csv::Reader::from_reader(file), path))
}

fn row_line(record_position: Option<&csv::Position>) -> u64 {
    // +1 for the header row, +1 because csv::Position::line() is 0-based for the first data row's *preceding* newline count
    record_position.map(|p| p.line() + 1).unwrap_or(0)
}

fn load_stops(
    gtfs_dir: &Path,
    interner: &mut Interner,
    builder: &mut timetable_core::feed::Builder,
) -> Result<(), LoadError> {
    let (mut rdr, path) = open_csv(gtfs_dir, "stops.txt")?;
    // platforms may declare a parent before it's been seen, so resolve parents in a second pass
    let mut pending_platforms: Vec<(StopId, String, Option<String>)> = Vec::new();
    let mut station_ids: HashMap<String, StopId> = HashMap::new();

    for result in rdr.deserialize::<gtfs::Stop>() {
        let record = result.map_err(|e| {
            LoadError::bad_format(&path, row_line(e.position()), e.to_string())
        })?;
        let stop_id = interner.stop(&record.stop_id);
        match record.location_type.unwrap_or(0) {
            1 => {
                station_ids.insert(record.stop_id.clone(), stop_id);
                builder.add_station(stop_id, record.stop_name);
            }
            0 => pending_platforms.push((stop_id, record.stop_name, record.parent_station)),
            _ => builder.add_other(stop_id, record.stop_name),
        }
    }

    for (stop_id, stop_name, parent_station) in pending_platforms {
        let parent = parent_station
            .as_ref()
            .and_then(|p| station_ids.get(p).copied())
            .or_else(|| parent_station.map(|p| interner.stop(&p)));
        builder.add_platform(stop_id, stop_name, parent);
    }
    Ok(())
}

fn load_routes(
    gtfs_dir: &Path,
    interner: &mut Interner,
    builder: &mut timetable_core::feed::Builder,
) -> Result<(), LoadError> {
    let (mut rdr, path) = open_csv(gtfs_dir, "routes.txt")?;
    for result in rdr.deserialize::<gtfs::Route>() {
        let record = result.map_err(|e| LoadError::bad_format(&path, row_line(e.position()), e.to_string()))?;
        let route_id = interner.route(&record.route_id);
        let name = record
            .route_short_name
            .or(record.route_long_name)
            .unwrap_or_default();
        builder.add_route(route_id, name);
    }
    Ok(())
}

fn load_trips(
    gtfs_dir: &Path,
    interner: &mut Interner,
    builder: &mut timetable_core::feed::Builder,
) -> Result<(), LoadError> {
    let (mut rdr, path) = open_csv(gtfs_dir, "trips.txt")?;
    for result in rdr.deserialize::<gtfs::Trip>() {
        let record = result.map_err(|e| LoadError::bad_format(&path, row_line(e.position()), e.to_string()))?;
        let trip_id = interner.trip(&record.trip_id);
        let route_id = interner.route(&record.route_id);
        let service_id = interner.service(&record.service_id);
        builder.add_trip(trip_id, route_id, service_id);
    }
    Ok(())
}

/// Reads one row at a time via [`csv::Reader::read_record`] rather than
/// `deserialize()` so that the row's [`csv::Position`] is still on hand after
/// a successful parse, for any semantic (as opposed to column-shape)
/// validation the caller does on the deserialized fields.
fn next_row<T: serde::de::DeserializeOwned>(
    rdr: &mut csv::Reader<std::fs::File>,
    headers: &csv::StringRecord,
    path: &Path,
    record: &mut csv::StringRecord,
) -> Result<Option<(T, u64)>, LoadError> {
    let more = rdr
        .read_record(record)
        .map_err(|e| LoadError::bad_format(path, row_line(e.position()), e.to_string()))?;
    if !more {
        return Ok(None);
    }
    let line = row_line(record.position());
    let parsed = record
        .deserialize(Some(headers))
        .map_err(|e| LoadError::bad_format(path, line, e.to_string()))?;
    Ok(Some((parsed, line)))
}

fn load_stop_times(
    gtfs_dir: &Path,
    interner: &mut Interner,
    builder: &mut timetable_core::feed::Builder,
) -> Result<(), LoadError> {
    let (mut rdr, path) = open_csv(gtfs_dir, "stop_times.txt")?;
    let headers = rdr
        .headers()
        .map_err(|e| LoadError::bad_format(&path, row_line(e.position()), e.to_string()))?
        .clone();
    let mut raw = csv::StringRecord::new();
    while let Some((record, line)) = next_row::<gtfs::StopTime>(&mut rdr, &headers, &path, &mut raw)? {
        let trip_id = interner.trip(&record.trip_id);
        let stop_id = interner.stop(&record.stop_id);
        let arrival_time: Time = record.arrival_time.parse().map_err(|_| {
            LoadError::bad_format(&path, line, format!("invalid arrival_time {:?}", record.arrival_time))
        })?;
        let departure_time: Time = record.departure_time.parse().map_err(|_| {
            LoadError::bad_format(&path, line, format!("invalid departure_time {:?}", record.departure_time))
        })?;
        builder.add_trip_stop(trip_id, record.stop_sequence, stop_id, arrival_time, departure_time);
    }
    Ok(())
}

fn load_calendar(
    gtfs_dir: &Path,
    interner: &mut Interner,
    builder: &mut timetable_core::feed::Builder,
) -> Result<(), LoadError> {
    let (mut rdr, path) = open_csv(gtfs_dir, "calendar.txt")?;
    let headers = rdr
        .headers()
        .map_err(|e| LoadError::bad_format(&path, row_line(e.position()), e.to_string()))?
        .clone();
    let mut raw = csv::StringRecord::new();
    while let Some((record, line)) = next_row::<gtfs::Calendar>(&mut rdr, &headers, &path, &mut raw)? {
        let service_id = interner.service(&record.service_id);
        let weekdays = [
            record.monday > 0,
            record.tuesday > 0,
            record.wednesday > 0,
            record.thursday > 0,
            record.friday > 0,
            record.saturday > 0,
            record.sunday > 0,
        ];
        let start_date = parse_gtfs_date(&record.start_date)
            .ok_or_else(|| LoadError::bad_format(&path, line, format!("invalid start_date {:?}", record.start_date)))?;
        let end_date = parse_gtfs_date(&record.end_date)
            .ok_or_else(|| LoadError::bad_format(&path, line, format!("invalid end_date {:?}", record.end_date)))?;
        builder.add_service(service_id, weekdays, start_date, end_date);
    }
    Ok(())
}

fn load_calendar_dates(
    gtfs_dir: &Path,
    interner: &mut Interner,
    builder: &mut timetable_core::feed::Builder,
) -> Result<(), LoadError> {
    let (mut rdr, path) = open_csv(gtfs_dir, "calendar_dates.txt")?;
    let headers = rdr
        .headers()
        .map_err(|e| LoadError::bad_format(&path, row_line(e.position()), e.to_string()))?
        .clone();
    let mut raw = csv::StringRecord::new();
    while let Some((record, line)) = next_row::<gtfs::CalendarDate>(&mut rdr, &headers, &path, &mut raw)? {
        let service_id = interner.service(&record.service_id);
        let date = parse_gtfs_date(&record.date)
            .ok_or_else(|| LoadError::bad_format(&path, line, format!("invalid date {:?}", record.date)))?;
        let added = match record.exception_type {
            1 => true,
            2 => false,
            other => {
                return Err(LoadError::bad_format(
                    &path,
                    line,
                    format!("invalid exception_type {other}"),
                ))
            }
        };
        builder.add_service_exception(service_id, date, added);
    }
    Ok(())
}

/// Parses GTFS's `YYYYMMDD` date format (`calendar.txt`, `calendar_dates.txt`).
fn parse_gtfs_date(s: &str) -> Option<NaiveDate> {
    if s.len() != 8 {
        return None;
    }
    let year: i32 = s[0..4].parse().ok()?;
    let month: u32 = s[4..6].parse().ok()?;
    let day: u32 = s[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}
