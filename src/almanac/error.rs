use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlmanacError {
    #[error("solar crossing refinement did not converge within {iterations} iterations")]
    NoConvergence { iterations: u32 },
}
