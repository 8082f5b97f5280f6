//! Simulator construction parameters.

/// Start and stop addresses for a simulator instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct SimConfig {
    /// Address of the first instruction to execute.
    pub start_pc: usize,
    /// Address after whose execution the run halts. `None` means the last
    /// instruction of the program.
    pub stop_addr: Option<usize>,
}

impl SimConfig {
    /// Sets the start address.
    #[must_use]
    pub const fn with_start_pc(mut self, start_pc: usize) -> Self {
        self.start_pc = start_pc;
        self
    }

    /// Sets an explicit stop address.
    #[must_use]
    pub const fn with_stop_addr(mut self, stop_addr: usize) -> Self {
        self.stop_addr = Some(stop_addr);
        self
    }

    /// Stop address for a program of `program_len` instructions.
    #[must_use]
    pub const fn resolve_stop_addr(&self, program_len: usize) -> usize {
        match self.stop_addr {
            Some(addr) => addr,
            None => program_len.saturating_sub(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SimConfig;

    #[test]
    fn default_stop_is_last_instruction() {
        let config = SimConfig::default();
        assert_eq!(config.start_pc, 0);
        assert_eq!(config.resolve_stop_addr(3), 2);
        assert_eq!(config.resolve_stop_addr(0), 0);
    }

    #[test]
    fn explicit_stop_address_wins() {
        let config = SimConfig::default().with_start_pc(1).with_stop_addr(0);
        assert_eq!(config.start_pc, 1);
        assert_eq!(config.resolve_stop_addr(3), 0);
    }
}
