use crate::timebase::{gmst_rad, Instant, JD_J2000};

pub const AU_KM: f64 = 149_597_870.7;

/// Apparent geocentric solar position.
#[derive(Debug, Clone, Copy)]
pub struct SunPosition {
    pub right_ascension_rad: f64,
    pub declination_rad: f64,
    pub distance_km: f64,
}

/// Low-precision solar position from the truncated mean-longitude series.
///
/// Accurate to a few arc-minutes over the current century, which is enough
/// for twilight and eclipse geometry but not for almanac-grade work.
pub fn sun_position(t: Instant) -> SunPosition {
    let d = t.jd() - JD_J2000;

    // Mean anomaly and mean longitude of the Sun, degrees.
    let g = (357.529 + 0.985_600_28 * d).to_radians();
    let q = 280.459 + 0.985_647_36 * d;

    // Ecliptic longitude with the two largest equation-of-center terms.
    let lambda = (q + 1.915 * g.sin() + 0.020 * (2.0 * g).sin()).to_radians();
    let distance_au = 1.000_14 - 0.016_71 * g.cos() - 0.000_14 * (2.0 * g).cos();

    let epsilon = (23.439 - 0.000_000_36 * d).to_radians();
    let right_ascension_rad = (epsilon.cos() * lambda.sin()).atan2(lambda.cos());
    let declination_rad = (epsilon.sin() * lambda.sin()).asin();

    SunPosition {
        right_ascension_rad,
        declination_rad,
        distance_km: distance_au * AU_KM,
    }
}

/// Geocentric Sun vector in the Earth-centered inertial frame, km.
pub fn sun_eci_km(t: Instant) -> [f64; 3] {
    let sun = sun_position(t);
    let (sin_dec, cos_dec) = sun.declination_rad.sin_cos();
    let (sin_ra, cos_ra) = sun.right_ascension_rad.sin_cos();
    [
        sun.distance_km * cos_dec * cos_ra,
        sun.distance_km * cos_dec * sin_ra,
        sun.distance_km * sin_dec,
    ]
}

/// Solar elevation above the geometric horizon at a geodetic location.
pub fn solar_elevation_deg(latitude_deg: f64, longitude_deg: f64, t: Instant) -> f64 {
    let sun = sun_position(t);
    let lat = latitude_deg.to_radians();

    // Local hour angle of the Sun.
    let hour_angle = gmst_rad(t) + longitude_deg.to_radians() - sun.right_ascension_rad;

    let sin_elevation = lat.sin() * sun.declination_rad.sin()
        + lat.cos() * sun.declination_rad.cos() * hour_angle.cos();
    sin_elevation.clamp(-1.0, 1.0).asin().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn declination_near_june_solstice() {
        let t = Instant::from_calendar(2024, 6, 20, 21, 0, 0.0).unwrap();
        let sun = sun_position(t);
        assert_relative_eq!(sun.declination_rad.to_degrees(), 23.44, epsilon = 0.1);
    }

    #[test]
    fn declination_near_march_equinox() {
        let t = Instant::from_calendar(2024, 3, 20, 3, 6, 0.0).unwrap();
        let sun = sun_position(t);
        assert!(sun.declination_rad.to_degrees().abs() < 0.5);
    }

    #[test]
    fn distance_stays_near_one_au() {
        for month in 1..=12 {
            let t = Instant::from_calendar(2024, month, 15, 0, 0, 0.0).unwrap();
            let sun = sun_position(t);
            let au = sun.distance_km / AU_KM;
            assert!((0.98..1.02).contains(&au), "month {month}: {au}");
        }
    }

    #[test]
    fn sun_vector_magnitude_matches_distance() {
        let t = Instant::from_calendar(2024, 9, 1, 12, 0, 0.0).unwrap();
        let v = sun_eci_km(t);
        let norm = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
        assert_relative_eq!(norm, sun_position(t).distance_km, epsilon = 1.0);
    }

    #[test]
    fn noon_sun_is_high_on_the_equator() {
        // Local solar noon on the Greenwich meridian at the equinox.
        let t = Instant::from_calendar(2024, 3, 20, 12, 0, 0.0).unwrap();
        let elevation = solar_elevation_deg(0.0, 0.0, t);
        assert!(elevation > 85.0, "elevation {elevation}");
    }

    #[test]
    fn midnight_sun_is_below_the_equatorial_horizon() {
        let t = Instant::from_calendar(2024, 3, 20, 0, 0, 0.0).unwrap();
        let elevation = solar_elevation_deg(0.0, 0.0, t);
        assert!(elevation < -80.0, "elevation {elevation}");
    }
}
