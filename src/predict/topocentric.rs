use crate::orbit::{eci_to_ecef_position, SatelliteState};
use crate::predict::site::{GroundSite, EARTH_ROTATION_RAD_S};
use crate::predict::types::TopocentricView;
use crate::timebase::gmst_rad;

/// Compute the satellite's look angles from a ground site at the state's
/// instant: inertial state into the Earth-fixed frame, difference against
/// the site, then into the site's local east/north/up frame.
pub fn observe(state: &SatelliteState, site: &GroundSite) -> TopocentricView {
    let gmst = gmst_rad(state.instant);

    let sat_ecef = eci_to_ecef_position(state.position_eci_km, gmst);
    let sat_vel_ecef = eci_to_ecef_velocity(state.position_eci_km, state.velocity_eci_km_s, gmst);

    let site_ecef = site.position_ecef_km();
    let site_vel = site.velocity_ecef_km_s();

    let dr = [
        sat_ecef[0] - site_ecef[0],
        sat_ecef[1] - site_ecef[1],
        sat_ecef[2] - site_ecef[2],
    ];
    let range_km = (dr[0] * dr[0] + dr[1] * dr[1] + dr[2] * dr[2]).sqrt();

    let (east, north, up) = ecef_to_enu(dr, site.lat_rad(), site.lon_rad());
    let azimuth_deg = east.atan2(north).to_degrees().rem_euclid(360.0);
    let elevation_deg = if range_km > 0.0 {
        (up / range_km).asin().to_degrees()
    } else {
        0.0
    };

    let los_unit = if range_km > 0.0 {
        [dr[0] / range_km, dr[1] / range_km, dr[2] / range_km]
    } else {
        [0.0, 0.0, 0.0]
    };
    let rel_vel = [
        sat_vel_ecef[0] - site_vel[0],
        sat_vel_ecef[1] - site_vel[1],
        sat_vel_ecef[2] - site_vel[2],
    ];
    let range_rate_km_s =
        rel_vel[0] * los_unit[0] + rel_vel[1] * los_unit[1] + rel_vel[2] * los_unit[2];

    TopocentricView {
        instant: state.instant,
        azimuth_deg,
        elevation_deg,
        range_km,
        range_rate_km_s,
    }
}

/// Velocity transforms with the frame rotation term subtracted.
fn eci_to_ecef_velocity(pos_eci: [f64; 3], vel_eci: [f64; 3], gmst: f64) -> [f64; 3] {
    let (sin_gmst, cos_gmst) = gmst.sin_cos();
    let pos = eci_to_ecef_position(pos_eci, gmst);
    let rotated = [
        vel_eci[0] * cos_gmst + vel_eci[1] * sin_gmst,
        -vel_eci[0] * sin_gmst + vel_eci[1] * cos_gmst,
        vel_eci[2],
    ];
    let rotation = [
        -EARTH_ROTATION_RAD_S * pos[1],
        EARTH_ROTATION_RAD_S * pos[0],
        0.0,
    ];
    [
        rotated[0] - rotation[0],
        rotated[1] - rotation[1],
        rotated[2] - rotation[2],
    ]
}

fn ecef_to_enu(dr: [f64; 3], lat_rad: f64, lon_rad: f64) -> (f64, f64, f64) {
    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let sin_lon = lon_rad.sin();
    let cos_lon = lon_rad.cos();

    let east = -sin_lon * dr[0] + cos_lon * dr[1];
    let north = -sin_lat * cos_lon * dr[0] - sin_lat * sin_lon * dr[1] + cos_lat * dr[2];
    let up = cos_lat * cos_lon * dr[0] + cos_lat * sin_lon * dr[1] + sin_lat * dr[2];
    (east, north, up)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timebase::Instant;
    use approx::assert_relative_eq;

    /// A synthetic state directly over a site, built in the Earth-fixed
    /// frame and rotated back to inertial so `observe` undoes it.
    fn state_above_site(site: &GroundSite, height_km: f64, t: Instant) -> SatelliteState {
        let gmst = gmst_rad(t);
        let site_ecef = site.position_ecef_km();
        let up_scale = 1.0 + height_km / 6_378.137;
        let ecef = [
            site_ecef[0] * up_scale,
            site_ecef[1] * up_scale,
            site_ecef[2] * up_scale,
        ];
        // Inverse of eci_to_ecef_position.
        let (sin_gmst, cos_gmst) = gmst.sin_cos();
        let eci = [
            ecef[0] * cos_gmst - ecef[1] * sin_gmst,
            ecef[0] * sin_gmst + ecef[1] * cos_gmst,
            ecef[2],
        ];
        SatelliteState {
            instant: t,
            position_eci_km: eci,
            velocity_eci_km_s: [0.0, 0.0, 0.0],
            illuminated: true,
        }
    }

    #[test]
    fn satellite_at_zenith_reads_ninety_degrees_elevation() {
        let site = GroundSite::new(10.0, 25.0, 0.0, 0.0).unwrap();
        let t = Instant::from_calendar(2024, 5, 1, 0, 0, 0.0).unwrap();
        let view = observe(&state_above_site(&site, 400.0, t), &site);

        assert!(view.elevation_deg > 89.9, "elevation {}", view.elevation_deg);
        // Range is the radial offset used to build the state, roughly.
        assert!(
            (view.range_km - 400.0).abs() < 10.0,
            "range {}",
            view.range_km
        );
    }

    #[test]
    fn azimuth_wraps_into_degrees_north_east() {
        let site = GroundSite::new(0.0, 0.0, 0.0, 0.0).unwrap();
        let t = Instant::from_calendar(2024, 5, 1, 3, 0, 0.0).unwrap();
        let view = observe(&state_above_site(&site, 400.0, t), &site);
        assert!((0.0..360.0).contains(&view.azimuth_deg));
    }

    #[test]
    fn stationary_target_range_rate_reflects_site_motion() {
        let site = GroundSite::new(0.0, 0.0, 0.0, 0.0).unwrap();
        let t = Instant::from_calendar(2024, 5, 1, 0, 0, 0.0).unwrap();
        let view = observe(&state_above_site(&site, 400.0, t), &site);
        // Site velocity is tangential, the line of sight radial; the
        // projection should be near zero.
        assert_relative_eq!(view.range_rate_km_s, 0.0, epsilon = 1e-3);
    }
}
