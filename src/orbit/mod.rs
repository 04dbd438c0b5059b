mod error;
mod propagator;
mod tle;

pub use error::OrbitError;
pub use propagator::{
    eci_to_ecef_position, epoch_age_days, propagate, subpoint, SatelliteState, SubPoint,
    EARTH_EQUATORIAL_RADIUS_KM, EARTH_FLATTENING, GM_EARTH_KM3_S2,
};
pub use tle::TleRecord;
