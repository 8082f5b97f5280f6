use super::DMEM_DEPTH;
use crate::{BoundsTarget, SimError, Word};

/// One data-memory cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DataCell {
    /// Resident value.
    pub value: Word,
    /// Whether the cell was supplied at construction or written since.
    pub initialized: bool,
}

/// Fixed-depth data memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataMemory {
    cells: Box<[DataCell; DMEM_DEPTH]>,
}

impl Default for DataMemory {
    fn default() -> Self {
        Self {
            cells: Box::new([DataCell::default(); DMEM_DEPTH]),
        }
    }
}

impl DataMemory {
    /// Builds data memory from initial contents.
    ///
    /// Supplied values are marked initialized; the remaining cells are zero
    /// and uninitialized.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Bounds`] when more than [`DMEM_DEPTH`] values are
    /// supplied.
    pub fn new(initial: &[Word]) -> Result<Self, SimError> {
        if initial.len() > DMEM_DEPTH {
            return Err(SimError::bounds(BoundsTarget::DataAddress, initial.len() - 1));
        }
        let mut memory = Self::default();
        for (cell, value) in memory.cells.iter_mut().zip(initial) {
            *cell = DataCell {
                value: *value,
                initialized: true,
            };
        }
        Ok(memory)
    }

    /// Returns the cell at `addr` without logging.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Bounds`] when `addr >= DMEM_DEPTH`.
    pub fn cell(&self, addr: usize) -> Result<DataCell, SimError> {
        self.cells
            .get(addr)
            .copied()
            .ok_or(SimError::bounds(BoundsTarget::DataAddress, addr))
    }

    /// Returns `true` if the cell at `addr` has been initialized.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Bounds`] when `addr >= DMEM_DEPTH`.
    pub fn is_initialized(&self, addr: usize) -> Result<bool, SimError> {
        self.cell(addr).map(|cell| cell.initialized)
    }

    /// Stores `value` at `addr` and marks the cell initialized.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Bounds`] when `addr >= DMEM_DEPTH`.
    pub fn write(&mut self, addr: usize, value: Word) -> Result<(), SimError> {
        let cell = self
            .cells
            .get_mut(addr)
            .ok_or(SimError::bounds(BoundsTarget::DataAddress, addr))?;
        *cell = DataCell {
            value,
            initialized: true,
        };
        Ok(())
    }

    /// All cells in address order.
    #[must_use]
    pub fn cells(&self) -> &[DataCell] {
        self.cells.as_slice()
    }
}
