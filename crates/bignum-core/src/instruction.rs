//! Contract between the step engine and instruction implementations.

use crate::{MachineState, SimError};

/// Short and long assembly renderings of an instruction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AsmText {
    /// Compact form.
    pub short: String,
    /// Full form; its first token is the mnemonic.
    pub long: String,
}

/// Result of executing one instruction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Executed {
    /// Human-readable trace of what the instruction did.
    pub trace: String,
    /// Control-transfer target, if the instruction jumps.
    pub jump: Option<usize>,
}

impl Executed {
    /// Falls through to the next instruction.
    #[must_use]
    pub fn next(trace: impl Into<String>) -> Self {
        Self {
            trace: trace.into(),
            jump: None,
        }
    }

    /// Transfers control to `target`.
    #[must_use]
    pub fn jump(trace: impl Into<String>, target: usize) -> Self {
        Self {
            trace: trace.into(),
            jump: Some(target),
        }
    }
}

/// A pre-assembled instruction the simulator can run.
///
/// `execute` is the only place instruction-specific state changes happen.
/// It must not assume anything about pc beyond [`MachineState::pc`]; the
/// step engine advances pc after it returns.
pub trait Instruction {
    /// Assembly text for listings and statistics. Must be side-effect free.
    fn asm_text(&self) -> AsmText;

    /// Cycle cost charged when the instruction is fetched.
    fn cycle_cost(&self) -> u32;

    /// Applies the instruction to `machine`.
    ///
    /// # Errors
    ///
    /// Any [`SimError`] aborts the run; the step engine forwards it as is.
    fn execute(&self, machine: &mut MachineState) -> Result<Executed, SimError>;
}

impl<T: Instruction + ?Sized> Instruction for Box<T> {
    fn asm_text(&self) -> AsmText {
        (**self).asm_text()
    }

    fn cycle_cost(&self) -> u32 {
        (**self).cycle_cost()
    }

    fn execute(&self, machine: &mut MachineState) -> Result<Executed, SimError> {
        (**self).execute(machine)
    }
}
