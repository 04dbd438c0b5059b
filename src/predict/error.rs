use thiserror::Error;

use crate::orbit::OrbitError;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("ground site {field} out of range: {value}")]
    Site { field: &'static str, value: String },
    #[error("orbit error: {0}")]
    Orbit(#[from] OrbitError),
}
