mod error;
mod pass_finder;
mod site;
mod topocentric;
mod types;
mod visibility;

pub use error::PredictError;
pub use pass_finder::{find_passes, SearchConfig};
pub use site::{GroundSite, EARTH_ROTATION_RAD_S};
pub use topocentric::observe;
pub use types::{PassEvent, PassList, SearchOutcome, TopocentricView, Visibility};
pub use visibility::{classify, ground_dark};
