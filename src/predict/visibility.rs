use crate::almanac::solar_elevation_deg;
use crate::predict::types::Visibility;
use crate::timebase::Instant;

/// The one visibility rule: a pass is worth watching only when the
/// satellite is still in sunlight while the observer's sky is dark.
pub fn classify(satellite_illuminated: bool, ground_dark: bool) -> Visibility {
    Visibility {
        visible: satellite_illuminated && ground_dark,
        satellite_illuminated,
        ground_dark,
    }
}

/// Whether the site's sky counts as dark: solar elevation below the
/// twilight threshold (conventionally -6 for civil twilight).
pub fn ground_dark(latitude_deg: f64, longitude_deg: f64, t: Instant, twilight_deg: f64) -> bool {
    solar_elevation_deg(latitude_deg, longitude_deg, t) < twilight_deg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truth_table() {
        for &(lit, dark) in &[(false, false), (false, true), (true, false), (true, true)] {
            let v = classify(lit, dark);
            assert_eq!(v.visible, lit && dark, "lit={lit} dark={dark}");
            assert_eq!(v.satellite_illuminated, lit);
            assert_eq!(v.ground_dark, dark);
        }
    }

    #[test]
    fn midday_equator_is_not_dark() {
        let noon = Instant::from_calendar(2024, 3, 20, 12, 0, 0.0).unwrap();
        assert!(!ground_dark(0.0, 0.0, noon, -6.0));
    }

    #[test]
    fn midnight_equator_is_dark() {
        let midnight = Instant::from_calendar(2024, 3, 20, 0, 0, 0.0).unwrap();
        assert!(ground_dark(0.0, 0.0, midnight, -6.0));
    }
}
