use std::path::PathBuf;

use timetable_core::time::TimeParseError;

/// Everything that can go wrong while reading a GTFS feed directory into a
/// [`timetable_core::feed::FeedStore`].
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("missing required GTFS file: {0}")]
    MissingFile(PathBuf),

    #[error("{file}:{line}: {reason}")]
    BadFormat {
        file: PathBuf,
        line: u64,
        reason: String,
    },

    #[error("could not open {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
}

impl LoadError {
    pub(crate) fn bad_format(file: &std::path::Path, line: u64, reason: impl Into<String>) -> LoadError {
        LoadError::BadFormat {
            file: file.to_path_buf(),
            line,
            reason: reason.into(),
        }
    }
}

/// Everything that can go wrong while answering a `find_route` query.
#[derive(Debug, thiserror::Error)]
pub enum FindRouteError {
    #[error("no stop matches station name {0:?}")]
    UnknownStation(String),

    #[error("station name {0:?} is ambiguous, matches: {1:?}")]
    AmbiguousStation(String, Vec<String>),

    #[error("origin and destination resolve to the same station")]
    SameStation,

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("invalid time: {0}")]
    InvalidTime(#[from] TimeParseError),

    #[error("search was cancelled")]
    Cancelled,
}
