//! Architectural register and flag state.

/// Condition flags and their derivation from arithmetic results.
pub mod flags;
/// Wide register file with half-limb write tracking.
pub mod registers;

pub use flags::{Flag, FlagGroup, Flags};
pub use registers::{
    RegisterFile, RegisterRef, SpecialRegister, ValidHalfLimbs, WriteHint,
    GENERAL_REGISTER_COUNT, SPECIAL_REGISTER_COUNT,
};
