use std::f64::consts::{PI, TAU};

use crate::almanac::sun_eci_km;
use crate::orbit::error::OrbitError;
use crate::orbit::tle::TleRecord;
use crate::timebase::{gmst_rad, normalize_signed_deg, Instant, SECONDS_PER_DAY};

pub const GM_EARTH_KM3_S2: f64 = 398_600.4418;
pub const EARTH_EQUATORIAL_RADIUS_KM: f64 = 6_378.137;
pub const EARTH_FLATTENING: f64 = 1.0 / 298.257_223_563;

const KEPLER_MAX_ITERATIONS: u32 = 30;
const KEPLER_TOLERANCE_RAD: f64 = 1e-12;

/// Satellite position and velocity in the Earth-centered inertial frame
/// at one instant, with the derived illumination flag.
#[derive(Debug, Clone, Copy)]
pub struct SatelliteState {
    pub instant: Instant,
    pub position_eci_km: [f64; 3],
    pub velocity_eci_km_s: [f64; 3],
    /// False while the satellite is inside Earth's shadow.
    pub illuminated: bool,
}

/// Geodetic point directly beneath the satellite.
#[derive(Debug, Clone, Copy)]
pub struct SubPoint {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
}

/// Propagate mean elements to the requested instant.
///
/// Mean anomaly and mean motion are advanced through the TLE drag terms
/// (the element set stores n-dot/2 and n-ddot/6, so the fields multiply
/// the elapsed-time powers directly), Kepler's equation is solved for the
/// eccentric anomaly, and the perifocal state is rotated through argument
/// of perigee, inclination and RAAN into the inertial frame.
pub fn propagate(tle: &TleRecord, t: Instant) -> Result<SatelliteState, OrbitError> {
    let dt = t.days_since(tle.epoch);

    let mean_anomaly_rev = tle.mean_anomaly_deg / 360.0
        + tle.mean_motion_rev_day * dt
        + tle.mean_motion_dot * dt * dt
        + tle.mean_motion_ddot * dt * dt * dt;
    let mean_anomaly_rad = mean_anomaly_rev.rem_euclid(1.0) * TAU;

    let mean_motion_rev_day = tle.mean_motion_rev_day
        + 2.0 * tle.mean_motion_dot * dt
        + 3.0 * tle.mean_motion_ddot * dt * dt;
    let mean_motion_rad_s = mean_motion_rev_day * TAU / SECONDS_PER_DAY;
    let semi_major_km = (GM_EARTH_KM3_S2 / (mean_motion_rad_s * mean_motion_rad_s)).cbrt();

    let e = tle.eccentricity;
    let eccentric_anomaly = solve_kepler(mean_anomaly_rad, e)?;
    let true_anomaly = ((1.0 + e).sqrt() * (eccentric_anomaly / 2.0).sin())
        .atan2((1.0 - e).sqrt() * (eccentric_anomaly / 2.0).cos())
        * 2.0;

    let semilatus_km = semi_major_km * (1.0 - e * e);
    let (position_eci_km, velocity_eci_km_s) = elements_to_state(
        semilatus_km,
        e,
        tle.inclination_deg.to_radians(),
        tle.raan_deg.to_radians(),
        tle.arg_perigee_deg.to_radians(),
        true_anomaly,
    );

    let illuminated = !in_earth_shadow(position_eci_km, sun_eci_km(t));

    Ok(SatelliteState {
        instant: t,
        position_eci_km,
        velocity_eci_km_s,
        illuminated,
    })
}

/// Age of the element set relative to a requested instant, in days.
/// Positive when propagating forward from the epoch.
pub fn epoch_age_days(tle: &TleRecord, t: Instant) -> f64 {
    t.days_since(tle.epoch)
}

/// Newton iteration on E - e sin E = M with a fixed iteration cap.
fn solve_kepler(mean_anomaly_rad: f64, eccentricity: f64) -> Result<f64, OrbitError> {
    let mut ea = if eccentricity < 0.8 {
        mean_anomaly_rad
    } else {
        PI
    };
    for _ in 0..KEPLER_MAX_ITERATIONS {
        let delta =
            (ea - eccentricity * ea.sin() - mean_anomaly_rad) / (1.0 - eccentricity * ea.cos());
        ea -= delta;
        if delta.abs() < KEPLER_TOLERANCE_RAD {
            return Ok(ea);
        }
    }
    Err(OrbitError::KeplerDivergence {
        iterations: KEPLER_MAX_ITERATIONS,
        eccentricity,
    })
}

/// Orbital elements to inertial position/velocity, km and km/s.
fn elements_to_state(
    semilatus_km: f64,
    e: f64,
    inclination_rad: f64,
    raan_rad: f64,
    arg_perigee_rad: f64,
    true_anomaly_rad: f64,
) -> ([f64; 3], [f64; 3]) {
    let r = semilatus_km / (1.0 + e * true_anomaly_rad.cos());
    let h = (semilatus_km * GM_EARTH_KM3_S2).sqrt();
    let u = true_anomaly_rad + arg_perigee_rad;

    let (sin_raan, cos_raan) = raan_rad.sin_cos();
    let (sin_u, cos_u) = u.sin_cos();
    let cos_i = inclination_rad.cos();
    let sin_i = inclination_rad.sin();

    let x = r * (cos_raan * cos_u - sin_raan * sin_u * cos_i);
    let y = r * (sin_raan * cos_u + cos_raan * sin_u * cos_i);
    let z = r * (sin_i * sin_u);

    let radial_rate = h * e / (r * semilatus_km) * true_anomaly_rad.sin();
    let transverse_rate = h / r;

    let vx = x * radial_rate - transverse_rate * (cos_raan * sin_u + sin_raan * cos_u * cos_i);
    let vy = y * radial_rate - transverse_rate * (sin_raan * sin_u - cos_raan * cos_u * cos_i);
    let vz = z * radial_rate + transverse_rate * sin_i * cos_u;

    ([x, y, z], [vx, vy, vz])
}

/// Rotate an inertial position into the Earth-fixed frame.
pub fn eci_to_ecef_position(pos_eci: [f64; 3], gmst: f64) -> [f64; 3] {
    let (sin_gmst, cos_gmst) = gmst.sin_cos();
    [
        pos_eci[0] * cos_gmst + pos_eci[1] * sin_gmst,
        -pos_eci[0] * sin_gmst + pos_eci[1] * cos_gmst,
        pos_eci[2],
    ]
}

/// Geodetic point beneath the satellite at its own instant.
pub fn subpoint(state: &SatelliteState) -> SubPoint {
    let ecef = eci_to_ecef_position(state.position_eci_km, gmst_rad(state.instant));
    let longitude_deg = normalize_signed_deg(ecef[1].atan2(ecef[0]).to_degrees());

    let e2 = EARTH_FLATTENING * (2.0 - EARTH_FLATTENING);
    let rho = (ecef[0] * ecef[0] + ecef[1] * ecef[1]).sqrt();

    // Fixed-point iteration for geodetic latitude on the WGS-84 ellipsoid;
    // converges in a handful of rounds for any orbital altitude.
    let mut latitude = ecef[2].atan2(rho);
    let mut prime_vertical = EARTH_EQUATORIAL_RADIUS_KM;
    for _ in 0..5 {
        let sin_lat = latitude.sin();
        prime_vertical = EARTH_EQUATORIAL_RADIUS_KM / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        latitude = (ecef[2] + e2 * prime_vertical * sin_lat).atan2(rho);
    }

    let altitude_km = if latitude.cos().abs() > 1e-6 {
        rho / latitude.cos() - prime_vertical
    } else {
        ecef[2].abs() - prime_vertical * (1.0 - e2)
    };

    SubPoint {
        latitude_deg: latitude.to_degrees(),
        longitude_deg,
        altitude_km,
    }
}

/// Cylindrical Earth-shadow test: the satellite is shadowed when it sits
/// on the anti-Sun side and within one equatorial radius of the
/// Earth-Sun axis. Ignoring the penumbral cone shifts LEO shadow
/// entry/exit by only a few seconds.
fn in_earth_shadow(sat_km: [f64; 3], sun_km: [f64; 3]) -> bool {
    let sun_dist = (sun_km[0] * sun_km[0] + sun_km[1] * sun_km[1] + sun_km[2] * sun_km[2]).sqrt();
    let sun_unit = [
        sun_km[0] / sun_dist,
        sun_km[1] / sun_dist,
        sun_km[2] / sun_dist,
    ];

    let along = sat_km[0] * sun_unit[0] + sat_km[1] * sun_unit[1] + sat_km[2] * sun_unit[2];
    if along > 0.0 {
        return false;
    }

    let perp = [
        sat_km[0] - along * sun_unit[0],
        sat_km[1] - along * sun_unit[1],
        sat_km[2] - along * sun_unit[2],
    ];
    let perp_dist = (perp[0] * perp[0] + perp[1] * perp[1] + perp[2] * perp[2]).sqrt();
    perp_dist <= EARTH_EQUATORIAL_RADIUS_KM
}
