use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::orbit::SubPoint;
use crate::predict::{GroundSite, PassEvent, PassList, SearchOutcome};
use crate::timebase::Instant;

/// Current sub-point response. The `iss_position` key is the wire name
/// the consumers of this feed already depend on.
#[derive(Debug, Serialize)]
pub struct LocationReport {
    pub timestamp: i64,
    pub iss_position: PositionReport,
}

#[derive(Debug, Serialize)]
pub struct PositionReport {
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationReport {
    pub fn new(subpoint: &SubPoint, t: Instant) -> Self {
        Self {
            timestamp: t.unix_seconds().round() as i64,
            iss_position: PositionReport {
                latitude: round4(subpoint.latitude_deg),
                longitude: round4(subpoint.longitude_deg),
            },
        }
    }
}

/// Pass prediction response: an echo of the request parameters followed
/// by the found passes.
#[derive(Debug, Serialize)]
pub struct PassesReport {
    pub request: RequestEcho,
    pub response: Vec<PassRecord>,
}

#[derive(Debug, Serialize)]
pub struct RequestEcho {
    pub datetime: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub passes: usize,
    pub horizon: f64,
    /// Set when the element set's epoch is outside the configured
    /// staleness window; predictions still run but degrade.
    pub tle_stale: bool,
    pub search_outcome: SearchOutcome,
}

#[derive(Debug, Serialize)]
pub struct PassRecord {
    pub risetime: DateTime<Utc>,
    pub riseazimuth: f64,
    pub transittime: DateTime<Utc>,
    pub transitaltitude: f64,
    pub settime: DateTime<Utc>,
    pub setazimuth: f64,
    /// Seconds above the horizon.
    pub duration: i64,
    pub visible: bool,
    pub satellite_illuminated: bool,
    pub ground_dark: bool,
}

impl PassesReport {
    pub fn new(
        site: &GroundSite,
        requested: usize,
        start: Instant,
        tle_stale: bool,
        list: &PassList,
    ) -> Self {
        Self {
            request: RequestEcho {
                datetime: start.unix_seconds().round() as i64,
                latitude: site.latitude_deg,
                longitude: site.longitude_deg,
                altitude: site.altitude_m,
                passes: requested,
                horizon: site.horizon_deg,
                tle_stale,
                search_outcome: list.outcome,
            },
            response: list.passes.iter().map(PassRecord::from).collect(),
        }
    }
}

impl From<&PassEvent> for PassRecord {
    fn from(pass: &PassEvent) -> Self {
        Self {
            risetime: pass.rise,
            riseazimuth: round2(pass.rise_azimuth_deg),
            transittime: pass.transit,
            transitaltitude: round2(pass.transit_elevation_deg),
            settime: pass.set,
            setazimuth: round2(pass.set_azimuth_deg),
            duration: pass.duration_seconds.round() as i64,
            visible: pass.visibility.visible,
            satellite_illuminated: pass.visibility.satellite_illuminated,
            ground_dark: pass.visibility.ground_dark,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::Visibility;

    #[test]
    fn location_report_serializes_the_documented_shape() {
        let subpoint = SubPoint {
            latitude_deg: -12.345_678,
            longitude_deg: 98.765_432,
            altitude_km: 420.0,
        };
        let t = Instant::from_calendar(2024, 6, 1, 0, 0, 0.0).unwrap();
        let report = LocationReport::new(&subpoint, t);
        let json: serde_json::Value = serde_json::to_value(&report).unwrap();

        assert_eq!(json["timestamp"], 1_717_200_000);
        assert_eq!(json["iss_position"]["latitude"], -12.3457);
        assert_eq!(json["iss_position"]["longitude"], 98.7654);
    }

    #[test]
    fn passes_report_echoes_the_request() {
        let site = GroundSite::new(40.0, -3.7, 650.0, 10.0).unwrap();
        let start = Instant::from_calendar(2024, 6, 1, 0, 0, 0.0).unwrap();
        let rise = start.plus_minutes(30.0);
        let set = rise.plus_seconds(540.0);
        let list = PassList {
            passes: vec![PassEvent {
                rise: rise.to_datetime(),
                rise_azimuth_deg: 123.456,
                transit: rise.plus_seconds(270.0).to_datetime(),
                transit_elevation_deg: 45.678,
                set: set.to_datetime(),
                set_azimuth_deg: 301.2,
                duration_seconds: 540.0,
                visibility: Visibility {
                    visible: true,
                    satellite_illuminated: true,
                    ground_dark: true,
                },
            }],
            outcome: SearchOutcome::Complete,
        };

        let report = PassesReport::new(&site, 5, start, false, &list);
        let json: serde_json::Value = serde_json::to_value(&report).unwrap();

        assert_eq!(json["request"]["latitude"], 40.0);
        assert_eq!(json["request"]["passes"], 5);
        assert_eq!(json["request"]["horizon"], 10.0);
        assert_eq!(json["request"]["tle_stale"], false);
        assert_eq!(json["request"]["search_outcome"], "complete");

        let passes = json["response"].as_array().unwrap();
        assert_eq!(passes.len(), 1);
        assert_eq!(passes[0]["duration"], 540);
        assert_eq!(passes[0]["riseazimuth"], 123.46);
        assert_eq!(passes[0]["visible"], true);
        // Timestamps serialize in ISO-8601 form.
        assert!(passes[0]["risetime"]
            .as_str()
            .unwrap()
            .starts_with("2024-06-01T00:30:00"));
    }
}
