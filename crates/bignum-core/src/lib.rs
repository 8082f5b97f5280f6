//! Execution core of a cycle-level simulator for a 256-bit big-number
//! coprocessor.

/// 256-bit word model and width constants.
pub mod word;
pub use word::{
    ParseWordError, Word, HALF_LIMBS, HALF_LIMB_WIDTH, LIMBS, LIMB_WIDTH, WORD_BYTES, XLEN,
};

/// Error taxonomy for fatal simulation conditions.
pub mod error;
pub use error::{BoundsTarget, ErrorClass, SimError, Stack};

/// Architectural register and flag state.
pub mod state;
pub use state::{
    Flag, FlagGroup, Flags, RegisterFile, RegisterRef, SpecialRegister, ValidHalfLimbs, WriteHint,
    GENERAL_REGISTER_COUNT, SPECIAL_REGISTER_COUNT,
};

/// Data memory, instruction memory and the dump format.
pub mod memory;
pub use memory::{
    write_dump, DataCell, DataMemory, Program, DEFAULT_DUMP_FILENAME, DMEM_DEPTH, IMEM_DEPTH,
};

/// Bounded loop and call stacks.
pub mod stack;
pub use stack::{CallStack, LoopFrame, LoopStack, CALL_STACK_SIZE, LOOP_STACK_SIZE};

/// Breakpoint table and force-break state machine.
pub mod breakpoint;
pub use breakpoint::{
    BreakEvent, BreakReason, Breakpoint, BreakpointEngine, BreakpointEntry, ForceBreak, Toggled,
};

/// Symbolic assembly context.
pub mod asm;
pub use asm::AsmContext;

/// Execution statistics.
pub mod stats;
pub use stats::{FlagAccess, FuncCall, LoopRecord, Stats, WideMemOp};

/// Non-fatal diagnostic counters.
pub mod diag;
pub use diag::DiagCounters;

/// Instruction capability contract.
pub mod instruction;
pub use instruction::{AsmText, Executed, Instruction};

/// Simulator construction parameters.
pub mod config;
pub use config::SimConfig;

/// Machine state handed to instructions.
pub mod machine;
pub use machine::MachineState;

/// Step engine and run state machine.
pub mod simulator;
pub use simulator::{Retired, RunOutcome, RunState, RunStop, Simulator, StepOutcome};

/// Debugger command grammar.
pub mod debug;
pub use debug::{BreakTarget, CommandParseError, DebugCommand, HELP_TEXT};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
#[cfg(test)]
use tracing_subscriber as _;
