use super::IMEM_DEPTH;
use crate::{BoundsTarget, SimError};

/// Immutable instruction memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program<I> {
    instructions: Vec<I>,
}

impl<I> Program<I> {
    /// Wraps an instruction sequence.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Bounds`] when the sequence is longer than
    /// [`IMEM_DEPTH`].
    pub fn new(instructions: Vec<I>) -> Result<Self, SimError> {
        if instructions.len() > IMEM_DEPTH {
            return Err(SimError::bounds(
                BoundsTarget::InstructionAddress,
                instructions.len() - 1,
            ));
        }
        Ok(Self { instructions })
    }

    /// Fetches the instruction at `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Bounds`] when `addr` is past the last instruction.
    pub fn fetch(&self, addr: usize) -> Result<&I, SimError> {
        self.instructions
            .get(addr)
            .ok_or(SimError::bounds(BoundsTarget::InstructionAddress, addr))
    }

    /// Validates a control-transfer target.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Bounds`] with [`BoundsTarget::JumpTarget`] when
    /// `addr` is past the last instruction.
    pub fn check_jump(&self, addr: usize) -> Result<usize, SimError> {
        if addr < self.instructions.len() {
            Ok(addr)
        } else {
            Err(SimError::bounds(BoundsTarget::JumpTarget, addr))
        }
    }

    /// Number of instructions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns `true` when the program holds no instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Iterates over instructions in address order.
    pub fn iter(&self) -> impl Iterator<Item = &I> {
        self.instructions.iter()
    }
}
