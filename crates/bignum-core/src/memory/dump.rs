use std::io::{self, Write};

use super::{DataMemory, DMEM_DEPTH};

/// Writes the first `len` cells (capped at [`DMEM_DEPTH`]) as
/// `"<addr:04>: <word>"` lines.
///
/// # Errors
///
/// Propagates I/O failures from `out`.
pub fn write_dump<W: Write>(memory: &DataMemory, len: usize, out: &mut W) -> io::Result<()> {
    for (addr, cell) in memory.cells().iter().take(len.min(DMEM_DEPTH)).enumerate() {
        writeln!(out, "{addr:04}: {}", cell.value)?;
    }
    Ok(())
}
