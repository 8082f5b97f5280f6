//! Console driver and interactive debugger for the bignum coprocessor
//! simulator.

/// Driver settings.
pub mod config;
pub use config::RunnerConfig;

/// Driver error type.
pub mod error;
pub use error::RunError;

/// Run results and statistics export.
pub mod report;
pub use report::{write_stats_json, RunExit, RunReport};

/// Text renderings of machine state.
pub mod render;

/// Run loop and debugger prompt.
pub mod runner;
pub use runner::{Runner, PROMPT};

#[cfg(test)]
use rstest as _;
#[cfg(test)]
use tempfile as _;
