//! One-shot CLI demonstrator: `find_route <gtfs-dir> <from> <to> <date> <time> [max_routes]`.
//!
//! Not the interactive planner UI - just enough to exercise
//! [`pyroutech::find_route`] from argv for manual testing.

use std::path::PathBuf;
use std::process::ExitCode;

use pyroutech::{find_route, DEFAULT_MAX_ROUTES};

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [gtfs_dir, from, to, date, time] = &args[..5.min(args.len())] else {
        eprintln!("usage: find_route <gtfs-dir> <from> <to> <date> <time> [max_routes]");
        return ExitCode::FAILURE;
    };
    let max_routes = args
        .get(5)
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_MAX_ROUTES);

    match run(gtfs_dir.into(), from, to, date, time, max_routes) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(
    gtfs_dir: PathBuf,
    from: &str,
    to: &str,
    date: &str,
    time: &str,
    max_routes: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = pyroutech::load(&gtfs_dir)?;
    let journeys = find_route(&store, from, to, date, time, max_routes)?;
    if journeys.is_empty() {
        println!("no journeys found");
    }
    for (i, journey) in journeys.iter().enumerate() {
        println!(
            "{}. depart {} arrive {} ({} transfer{})",
            i + 1,
            journey.departure_sec(),
            journey.arrival_sec(),
            journey.transfer_count(),
            if journey.transfer_count() == 1 { "" } else { "s" }
        );
        for leg in &journey.legs {
            println!(
                "   {} -> {} on trip {} ({} -> {})",
                store.stop_name(leg.board_stop_id),
                store.stop_name(leg.alight_stop_id),
                leg.trip_id,
                leg.board_sec,
                leg.alight_sec,
            );
        }
    }
    Ok(())
}
