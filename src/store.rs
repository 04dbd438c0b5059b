use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::orbit::{OrbitError, TleRecord};
use crate::timebase::Instant;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("TLE file read error: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("invalid TLE in {path}: {source}")]
    InvalidTle {
        path: String,
        #[source]
        source: OrbitError,
    },
}

/// Where element sets come from. The core never fetches or refreshes TLE
/// data itself; a store hands over whatever it currently holds.
pub trait TleStore {
    fn current_tle(&self) -> Result<TleRecord, StoreError>;
    /// When the stored element set was last refreshed, if known.
    fn last_update(&self) -> Option<Instant>;
}

/// Injectable time source so searches can be pinned in tests.
pub trait Clock {
    fn now(&self) -> Instant;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::from_datetime(Utc::now())
    }
}

/// A clock frozen at a fixed instant.
#[allow(dead_code)]
pub struct FixedClock(pub Instant);

impl Clock for FixedClock {
    fn now(&self) -> Instant {
        self.0
    }
}

/// TLE store backed by a single text file holding one element set in
/// either the 2-line or the name + 2-line form.
pub struct FileTleStore {
    path: PathBuf,
}

impl FileTleStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl TleStore for FileTleStore {
    fn current_tle(&self) -> Result<TleRecord, StoreError> {
        let content = std::fs::read_to_string(&self.path)?;
        TleRecord::from_text(&content).map_err(|source| StoreError::InvalidTle {
            path: self.path.display().to_string(),
            source,
        })
    }

    /// File modification time stands in for the upstream refresh instant.
    fn last_update(&self) -> Option<Instant> {
        let modified = std::fs::metadata(&self.path).ok()?.modified().ok()?;
        let datetime: DateTime<Utc> = modified.into();
        Some(Instant::from_datetime(datetime))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const ISS_LINE1: &str =
        "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927";
    const ISS_LINE2: &str =
        "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";

    #[test]
    fn reads_a_named_tle_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "ISS (ZARYA)").unwrap();
        writeln!(file, "{ISS_LINE1}").unwrap();
        writeln!(file, "{ISS_LINE2}").unwrap();

        let store = FileTleStore::new(file.path());
        let tle = store.current_tle().unwrap();
        assert_eq!(tle.norad_id, 25544);
        assert_eq!(tle.name.as_deref(), Some("ISS (ZARYA)"));
        assert!(store.last_update().is_some());
    }

    #[test]
    fn surfaces_parse_failures_with_the_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "garbage").unwrap();

        let store = FileTleStore::new(file.path());
        match store.current_tle() {
            Err(StoreError::InvalidTle { path, .. }) => {
                let name = file.path().file_name().unwrap().to_string_lossy();
                assert!(path.contains(name.as_ref()));
            }
            other => panic!("expected InvalidTle, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let store = FileTleStore::new("/nonexistent/path/iss.tle");
        assert!(matches!(store.current_tle(), Err(StoreError::FileRead(_))));
    }

    #[test]
    fn fixed_clock_returns_its_instant() {
        let t = Instant::from_calendar(2024, 1, 1, 0, 0, 0.0).unwrap();
        assert_eq!(FixedClock(t).now().jd(), t.jd());
    }
}
