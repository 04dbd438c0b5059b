mod error;
mod riseset;
mod sun;

pub use error::AlmanacError;
pub use riseset::{next_crossing, previous_crossing, Crossing, SunCrossing};
pub use sun::{solar_elevation_deg, sun_eci_km, sun_position, SunPosition, AU_KM};
