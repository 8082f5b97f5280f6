use std::io::Write;

use bignum_core::Stats;

use crate::RunError;

/// How a driven run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize)]
pub enum RunExit {
    /// The simulator halted.
    #[default]
    Halted,
    /// The user quit at the debugger prompt, or the console closed.
    Quit,
}

/// Result of [`Runner::run`](crate::Runner::run).
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize)]
pub struct RunReport {
    /// Instructions retired.
    pub steps: u64,
    /// Cycles charged.
    pub cycles: u64,
    /// Trace text of every retired instruction, in order.
    pub traces: Vec<String>,
    /// Whether the program signalled completion.
    pub finished: bool,
    /// Exit reason.
    pub exit: RunExit,
}

impl RunReport {
    /// One-line summary.
    #[must_use]
    pub fn summary(&self) -> String {
        let exit = match self.exit {
            RunExit::Halted => "halted",
            RunExit::Quit => "quit",
        };
        format!(
            "{exit} after {} instructions, {} cycles{}",
            self.steps,
            self.cycles,
            if self.finished { " (finished)" } else { "" }
        )
    }
}

/// Writes `stats` as pretty-printed JSON followed by a newline.
///
/// # Errors
///
/// Returns [`RunError::Json`] or [`RunError::Io`] when serialization or
/// the write fails.
pub fn write_stats_json<W: Write>(stats: &Stats, mut out: W) -> Result<(), RunError> {
    serde_json::to_writer_pretty(&mut out, stats)?;
    writeln!(out)?;
    Ok(())
}
