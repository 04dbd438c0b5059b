use crate::orbit::{EARTH_EQUATORIAL_RADIUS_KM, EARTH_FLATTENING};
use crate::predict::error::PredictError;

pub const EARTH_ROTATION_RAD_S: f64 = 7.292_115e-5;

/// A ground observer: geodetic coordinates plus the elevation angle a
/// satellite must exceed to count as visible from here.
#[derive(Debug, Clone, Copy)]
pub struct GroundSite {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_m: f64,
    /// Minimum elevation for pass detection; 0 means the geometric
    /// horizon, i.e. full-sky search.
    pub horizon_deg: f64,
}

impl GroundSite {
    pub fn new(
        latitude_deg: f64,
        longitude_deg: f64,
        altitude_m: f64,
        horizon_deg: f64,
    ) -> Result<Self, PredictError> {
        if !(-90.0..=90.0).contains(&latitude_deg) || !latitude_deg.is_finite() {
            return Err(PredictError::Site {
                field: "latitude",
                value: latitude_deg.to_string(),
            });
        }
        if !(-180.0..=180.0).contains(&longitude_deg) || !longitude_deg.is_finite() {
            return Err(PredictError::Site {
                field: "longitude",
                value: longitude_deg.to_string(),
            });
        }
        if !altitude_m.is_finite() {
            return Err(PredictError::Site {
                field: "altitude",
                value: altitude_m.to_string(),
            });
        }
        if !(-90.0..=90.0).contains(&horizon_deg) || !horizon_deg.is_finite() {
            return Err(PredictError::Site {
                field: "horizon",
                value: horizon_deg.to_string(),
            });
        }
        Ok(Self {
            latitude_deg,
            longitude_deg,
            altitude_m,
            horizon_deg,
        })
    }

    /// Parse a `"lat, lon"` coordinate pair.
    pub fn from_coordinates(
        coordinates: &str,
        altitude_m: f64,
        horizon_deg: f64,
    ) -> Result<Self, PredictError> {
        let parts: Vec<_> = coordinates.split(',').map(|s| s.trim()).collect();
        if parts.len() != 2 {
            return Err(PredictError::Site {
                field: "coordinates",
                value: coordinates.to_string(),
            });
        }
        let lat = parts[0].parse().map_err(|_| PredictError::Site {
            field: "latitude",
            value: parts[0].to_string(),
        })?;
        let lon = parts[1].parse().map_err(|_| PredictError::Site {
            field: "longitude",
            value: parts[1].to_string(),
        })?;
        Self::new(lat, lon, altitude_m, horizon_deg)
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }

    pub fn position_ecef_km(&self) -> [f64; 3] {
        let e2 = EARTH_FLATTENING * (2.0 - EARTH_FLATTENING);
        let lat = self.lat_rad();
        let lon = self.lon_rad();
        let sin_lat = lat.sin();
        let cos_lat = lat.cos();
        let sin_lon = lon.sin();
        let cos_lon = lon.cos();
        let n = EARTH_EQUATORIAL_RADIUS_KM / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        let alt_km = self.altitude_m / 1000.0;
        let x = (n + alt_km) * cos_lat * cos_lon;
        let y = (n + alt_km) * cos_lat * sin_lon;
        let z = (n * (1.0 - e2) + alt_km) * sin_lat;
        [x, y, z]
    }

    pub fn velocity_ecef_km_s(&self) -> [f64; 3] {
        let pos = self.position_ecef_km();
        [
            -EARTH_ROTATION_RAD_S * pos[1],
            EARTH_ROTATION_RAD_S * pos[0],
            0.0,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn equatorial_site_sits_on_the_equatorial_radius() {
        let site = GroundSite::new(0.0, 0.0, 0.0, 0.0).unwrap();
        let pos = site.position_ecef_km();
        assert_relative_eq!(pos[0], EARTH_EQUATORIAL_RADIUS_KM, epsilon = 1e-6);
        assert_relative_eq!(pos[1], 0.0, epsilon = 1e-6);
        assert_relative_eq!(pos[2], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn polar_site_uses_the_polar_radius() {
        let site = GroundSite::new(90.0, 0.0, 0.0, 0.0).unwrap();
        let pos = site.position_ecef_km();
        assert!(pos[2] > 6_356.0 && pos[2] < 6_357.0, "z = {}", pos[2]);
    }

    #[test]
    fn parses_coordinate_strings() {
        let site = GroundSite::from_coordinates("40.4168, -3.7038", 650.0, 10.0).unwrap();
        assert_relative_eq!(site.latitude_deg, 40.4168);
        assert_relative_eq!(site.longitude_deg, -3.7038);
        assert_relative_eq!(site.altitude_m, 650.0);
        assert_relative_eq!(site.horizon_deg, 10.0);
    }

    #[test]
    fn rejects_out_of_range_fields_by_name() {
        match GroundSite::new(95.0, 0.0, 0.0, 0.0).unwrap_err() {
            PredictError::Site { field, .. } => assert_eq!(field, "latitude"),
            other => panic!("unexpected error: {other}"),
        }
        match GroundSite::new(0.0, 200.0, 0.0, 0.0).unwrap_err() {
            PredictError::Site { field, .. } => assert_eq!(field, "longitude"),
            other => panic!("unexpected error: {other}"),
        }
        match GroundSite::from_coordinates("not-a-number, 3", 0.0, 0.0).unwrap_err() {
            PredictError::Site { field, .. } => assert_eq!(field, "latitude"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn site_velocity_follows_earth_rotation() {
        let site = GroundSite::new(0.0, 0.0, 0.0, 0.0).unwrap();
        let vel = site.velocity_ecef_km_s();
        // Equatorial rotation speed is about 465 m/s, pointing east (+y).
        assert_relative_eq!(vel[1], 0.465, epsilon = 0.005);
        assert_relative_eq!(vel[0], 0.0, epsilon = 1e-9);
    }
}
