//! Saturating diagnostic counters kept alongside the machine state.

/// Counters for conditions that are reported but never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DiagCounters {
    /// Saturating counter for retired instructions.
    pub retired: u64,
    /// Saturating counter for reads of uninitialized data memory.
    pub uninit_reads: u64,
    /// Data address of the most recent uninitialized read.
    pub last_uninit_addr: Option<usize>,
    /// Saturating counter for breaks taken.
    pub breaks: u64,
}

impl DiagCounters {
    /// Creates zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a read of a never-written data cell.
    pub const fn record_uninit_read(&mut self, addr: usize) {
        self.uninit_reads = self.uninit_reads.saturating_add(1);
        self.last_uninit_addr = Some(addr);
    }

    /// Increments the retired-instruction counter.
    pub const fn record_retired(&mut self) {
        self.retired = self.retired.saturating_add(1);
    }

    /// Increments the break counter.
    pub const fn record_break(&mut self) {
        self.breaks = self.breaks.saturating_add(1);
    }

    /// Resets all counters to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
