use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::timebase::Instant;

/// Look angles from a site to a satellite at one instant.
#[derive(Debug, Clone, Copy)]
pub struct TopocentricView {
    pub instant: Instant,
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    pub range_km: f64,
    pub range_rate_km_s: f64,
}

/// Visibility verdict with the two facts that produced it.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Visibility {
    pub visible: bool,
    pub satellite_illuminated: bool,
    pub ground_dark: bool,
}

/// One horizon crossing of a satellite: rise, culmination, set.
///
/// Invariants: rise <= transit <= set, duration = set - rise.
#[derive(Debug, Clone, Serialize)]
pub struct PassEvent {
    pub rise: DateTime<Utc>,
    pub rise_azimuth_deg: f64,
    pub transit: DateTime<Utc>,
    pub transit_elevation_deg: f64,
    pub set: DateTime<Utc>,
    pub set_azimuth_deg: f64,
    pub duration_seconds: f64,
    #[serde(flatten)]
    pub visibility: Visibility,
}

/// Why a search returned as many passes as it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchOutcome {
    /// The requested number of passes was found.
    Complete,
    /// The search window ended first; the list is partial.
    WindowExhausted,
    /// The caller's abort check fired between grid steps.
    Aborted,
}

/// Result of one pass search: events in strictly increasing time order.
#[derive(Debug, Clone, Serialize)]
pub struct PassList {
    pub passes: Vec<PassEvent>,
    pub outcome: SearchOutcome,
}
