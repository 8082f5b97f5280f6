use std::io;

use bignum_core::SimError;
use thiserror::Error;

/// Failure that ends a driven run.
#[derive(Debug, Error)]
pub enum RunError {
    /// Fatal simulation error.
    #[error("simulation failed: {0}")]
    Sim(#[from] SimError),
    /// Console or file I/O failed.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    /// Statistics could not be serialized.
    #[error("stats export failed: {0}")]
    Json(#[from] serde_json::Error),
    /// The configured step limit was reached.
    #[error("step limit reached after {steps} instructions")]
    StepLimit {
        /// Instructions retired before stopping.
        steps: u64,
    },
}
