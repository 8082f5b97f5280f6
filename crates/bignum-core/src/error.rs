use std::fmt;

use thiserror::Error;

/// Range-checked index spaces that can reject an out-of-bounds access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum BoundsTarget {
    /// General register index (`0..=31`).
    Register,
    /// Limb index within a word (`0..=7`).
    Limb,
    /// Half-limb slot within a word (`0..=15`).
    HalfLimb,
    /// Data-memory address (`0..=127`).
    DataAddress,
    /// Instruction-memory address (`0..len`).
    InstructionAddress,
    /// Resolved control-transfer target.
    JumpTarget,
    /// Breakpoint address (`0..IMEM_DEPTH`).
    BreakpointAddress,
}

impl fmt::Display for BoundsTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Register => "register index",
            Self::Limb => "limb index",
            Self::HalfLimb => "half-limb slot",
            Self::DataAddress => "dmem address",
            Self::InstructionAddress => "imem address",
            Self::JumpTarget => "jump target",
            Self::BreakpointAddress => "breakpoint address",
        })
    }
}

/// One of the two bounded control stacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Stack {
    /// Zero-overhead loop stack.
    Loop,
    /// Return-address call stack.
    Call,
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Loop => "loop",
            Self::Call => "call",
        })
    }
}

/// Coarse error categories for callers that triage failures programmatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// An index or address fell outside its valid range.
    Bounds,
    /// A value exceeded its declared bit width.
    Range,
    /// A bounded control stack overflowed or underran.
    Stack,
    /// A register or flag name was not recognized.
    Identifier,
}

/// Fatal simulation error. Every variant aborts the current run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum SimError {
    /// Index or address outside its valid range.
    #[error("{target} {index} out of range")]
    Bounds {
        /// Which index space rejected the access.
        target: BoundsTarget,
        /// The rejected index.
        index: usize,
    },
    /// Value wider than the declared bit width.
    #[error("value exceeds {width}-bit width")]
    Range {
        /// Declared width in bits.
        width: u32,
    },
    /// Push onto a full stack.
    #[error("{0} stack overflow")]
    StackOverflow(Stack),
    /// Pop or peek on an empty stack.
    #[error("{0} stack underrun")]
    StackUnderrun(Stack),
    /// Unrecognized special-register or flag name.
    #[error("invalid identifier `{0}`")]
    InvalidIdentifier(String),
}

impl SimError {
    /// Shorthand for a [`SimError::Bounds`] error.
    #[must_use]
    pub const fn bounds(target: BoundsTarget, index: usize) -> Self {
        Self::Bounds { target, index }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Bounds { .. } => ErrorClass::Bounds,
            Self::Range { .. } => ErrorClass::Range,
            Self::StackOverflow(_) | Self::StackUnderrun(_) => ErrorClass::Stack,
            Self::InvalidIdentifier(_) => ErrorClass::Identifier,
        }
    }
}
