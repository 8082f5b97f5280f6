//! Data and instruction memory models.

/// Word-addressed data memory with per-cell initialization tracking.
pub mod data;
/// Data-memory hex dump format.
pub mod dump;
/// Read-only instruction memory.
pub mod program;

pub use data::{DataCell, DataMemory};
pub use dump::write_dump;
pub use program::Program;

/// Number of 256-bit cells in data memory.
pub const DMEM_DEPTH: usize = 128;
/// Maximum number of instructions in instruction memory.
pub const IMEM_DEPTH: usize = 1024;
/// File written by a dump request that names no file.
pub const DEFAULT_DUMP_FILENAME: &str = "dmem_dump.hex";
