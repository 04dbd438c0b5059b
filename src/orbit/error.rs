use thiserror::Error;

use crate::timebase::TimeError;

#[derive(Debug, Error)]
pub enum OrbitError {
    #[error("TLE line {line} has {length} characters, expected 69")]
    LineLength { line: u8, length: usize },
    #[error("TLE line {line} does not start with '{expected}'")]
    LineNumber { line: u8, expected: char },
    #[error("TLE line {line} checksum mismatch: computed {computed}, recorded {recorded}")]
    Checksum { line: u8, computed: u32, recorded: u32 },
    #[error("TLE line {line}, field {field}: cannot parse {value:?}")]
    Field {
        line: u8,
        field: &'static str,
        value: String,
    },
    #[error("TLE catalog number differs between lines: {line1} vs {line2}")]
    CatalogMismatch { line1: String, line2: String },
    #[error("TLE epoch: {0}")]
    Epoch(#[from] TimeError),
    #[error("TLE text does not contain a pair of element lines")]
    MissingLines,
    #[error("Kepler solver did not converge within {iterations} iterations (e = {eccentricity})")]
    KeplerDivergence { iterations: u32, eccentricity: f64 },
}
