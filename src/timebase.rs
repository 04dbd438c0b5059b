use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

pub const SECONDS_PER_DAY: f64 = 86_400.0;
/// Julian date of the Unix epoch, 1970-01-01T00:00:00Z.
pub const JD_UNIX_EPOCH: f64 = 2_440_587.5;
/// Julian date of the J2000.0 reference epoch, 2000-01-01T12:00:00Z.
pub const JD_J2000: f64 = 2_451_545.0;

#[derive(Debug, Error)]
pub enum TimeError {
    #[error("out-of-range calendar date {year:04}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u32, day: u32 },
    #[error("out-of-range time of day {hour:02}:{minute:02}:{second}")]
    InvalidTime { hour: u32, minute: u32, second: f64 },
}

/// A UTC timestamp held as a continuous Julian-date value.
///
/// All internal time arithmetic happens on this type; conversion to and
/// from calendar form only occurs at the edges. An `f64` Julian date
/// resolves to well under a millisecond for any date of interest here.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Instant {
    jd: f64,
}

impl Instant {
    #[allow(dead_code)]
    pub fn from_jd(jd: f64) -> Self {
        Self { jd }
    }

    pub fn jd(&self) -> f64 {
        self.jd
    }

    pub fn from_datetime(t: DateTime<Utc>) -> Self {
        let unix = t.timestamp() as f64 + f64::from(t.timestamp_subsec_nanos()) * 1e-9;
        Self {
            jd: JD_UNIX_EPOCH + unix / SECONDS_PER_DAY,
        }
    }

    /// Calendar form, rounded to the nearest millisecond. A Julian date
    /// quantizes around 40 microseconds at present-day values, so finer
    /// digits would only print float noise.
    pub fn to_datetime(&self) -> DateTime<Utc> {
        let millis = (self.unix_seconds() * 1000.0).round() as i64;
        let secs = millis.div_euclid(1000);
        let nanos = (millis.rem_euclid(1000) * 1_000_000) as u32;
        DateTime::from_timestamp(secs, nanos).expect("Julian date within chrono range")
    }

    /// Build an Instant from UTC calendar fields. The fractional `second`
    /// carries sub-second resolution.
    pub fn from_calendar(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: f64,
    ) -> Result<Self, TimeError> {
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or(TimeError::InvalidDate { year, month, day })?;
        if hour >= 24 || minute >= 60 || !(0.0..60.0).contains(&second) {
            return Err(TimeError::InvalidTime {
                hour,
                minute,
                second,
            });
        }
        let midnight = Instant::from_datetime(date.and_hms_opt(0, 0, 0).unwrap().and_utc());
        Ok(midnight.plus_seconds(f64::from(hour) * 3600.0 + f64::from(minute) * 60.0 + second))
    }

    pub fn unix_seconds(&self) -> f64 {
        (self.jd - JD_UNIX_EPOCH) * SECONDS_PER_DAY
    }

    pub fn plus_seconds(&self, seconds: f64) -> Self {
        Self {
            jd: self.jd + seconds / SECONDS_PER_DAY,
        }
    }

    pub fn plus_minutes(&self, minutes: f64) -> Self {
        self.plus_seconds(minutes * 60.0)
    }

    pub fn plus_days(&self, days: f64) -> Self {
        Self {
            jd: self.jd + days,
        }
    }

    pub fn seconds_since(&self, other: Instant) -> f64 {
        (self.jd - other.jd) * SECONDS_PER_DAY
    }

    pub fn days_since(&self, other: Instant) -> f64 {
        self.jd - other.jd
    }

    pub fn midpoint(a: Instant, b: Instant) -> Instant {
        Self {
            jd: (a.jd + b.jd) / 2.0,
        }
    }
}

/// Greenwich mean sidereal angle in radians for an instant.
///
/// IAU 1982 polynomial in days since J2000; adequate for topocentric
/// work at the arcsecond level.
pub fn gmst_rad(t: Instant) -> f64 {
    let d = t.jd() - JD_J2000;
    let centuries = d / 36_525.0;
    let gmst_deg = 280.460_618_37 + 360.985_647_366_29 * d + 0.000_387_933 * centuries * centuries
        - centuries * centuries * centuries / 38_710_000.0;
    normalize_deg(gmst_deg).to_radians()
}

/// Wrap an angle in degrees to [0, 360).
pub fn normalize_deg(deg: f64) -> f64 {
    deg.rem_euclid(360.0)
}

/// Wrap an angle in degrees to [-180, 180).
pub fn normalize_signed_deg(deg: f64) -> f64 {
    (deg + 180.0).rem_euclid(360.0) - 180.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn j2000_calendar_round_trip() {
        let t = Instant::from_calendar(2000, 1, 1, 12, 0, 0.0).unwrap();
        assert_relative_eq!(t.jd(), JD_J2000, epsilon = 1e-9);

        let back = t.to_datetime();
        assert_eq!(back.to_rfc3339(), "2000-01-01T12:00:00+00:00");
    }

    #[test]
    fn unix_epoch_julian_date() {
        let t = Instant::from_calendar(1970, 1, 1, 0, 0, 0.0).unwrap();
        assert_relative_eq!(t.jd(), JD_UNIX_EPOCH, epsilon = 1e-9);
        assert_relative_eq!(t.unix_seconds(), 0.0, epsilon = 1e-4);
    }

    #[test]
    fn arithmetic_is_subsecond_exact() {
        let t = Instant::from_calendar(2024, 3, 1, 6, 30, 0.0).unwrap();
        let later = t.plus_minutes(90.0).plus_seconds(0.25);
        assert_relative_eq!(later.seconds_since(t), 5400.25, epsilon = 1e-4);
    }

    #[test]
    fn rejects_bad_calendar_input() {
        assert!(Instant::from_calendar(2024, 13, 1, 0, 0, 0.0).is_err());
        assert!(Instant::from_calendar(2024, 2, 30, 0, 0, 0.0).is_err());
        assert!(Instant::from_calendar(2024, 2, 28, 24, 0, 0.0).is_err());
        assert!(Instant::from_calendar(2023, 2, 29, 0, 0, 0.0).is_err());
    }

    #[test]
    fn gmst_at_j2000_noon() {
        // At J2000.0 the polynomial's constant term dominates.
        let t = Instant::from_jd(JD_J2000);
        assert_relative_eq!(gmst_rad(t).to_degrees(), 280.460_618_37, epsilon = 1e-6);
    }

    #[test]
    fn gmst_advances_slightly_faster_than_solar_day() {
        let t0 = Instant::from_jd(JD_J2000);
        let t1 = t0.plus_days(1.0);
        let advance = normalize_deg(gmst_rad(t1).to_degrees() - gmst_rad(t0).to_degrees());
        // Sidereal gain is ~0.9856 degrees per solar day.
        assert_relative_eq!(advance, 0.985_647, epsilon = 1e-3);
    }

    #[test]
    fn angle_normalization() {
        assert_relative_eq!(normalize_deg(-30.0), 330.0);
        assert_relative_eq!(normalize_deg(720.5), 0.5);
        assert_relative_eq!(normalize_signed_deg(190.0), -170.0);
        assert_relative_eq!(normalize_signed_deg(-190.0), 170.0);
    }
}
