//! Persistent breakpoints and the one-shot force-break override.
//!
//! A persistent breakpoint fires on its `passes`-th arrival at its address
//! and then starts counting again. A [`ForceBreak`] is armed by the debugger
//! to implement step, step-over and step-out; it is evaluated first and
//! disarms itself once its condition holds. When it fires, the persistent
//! table is not consulted for that step.

use std::collections::BTreeMap;
use std::fmt;

use crate::memory::IMEM_DEPTH;
use crate::{BoundsTarget, SimError};

/// Pass-count state of one persistent breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Breakpoint {
    /// Arrival on which the breakpoint fires.
    pub passes: u32,
    /// Arrival currently being counted, starting at 1.
    pub counter: u32,
}

impl Breakpoint {
    const fn new(passes: u32) -> Self {
        Self { passes, counter: 1 }
    }

    /// Arrivals already counted without firing.
    #[must_use]
    pub const fn passed(self) -> u32 {
        self.counter - 1
    }

    /// Returns `true` when the next arrival fires.
    #[must_use]
    pub const fn is_due(self) -> bool {
        self.counter == self.passes
    }
}

/// Result of [`BreakpointEngine::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    /// A new breakpoint was added.
    Installed,
    /// An existing breakpoint was deleted.
    Removed,
}

/// One-shot break condition armed by a debugger resume command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ForceBreak {
    /// Break before the very next instruction.
    Next,
    /// Break once the call stack is exactly this deep.
    CallDepth(usize),
    /// Break once the loop stack is exactly this deep.
    LoopDepth(usize),
}

impl ForceBreak {
    const fn is_met(self, call_depth: usize, loop_depth: usize) -> bool {
        match self {
            Self::Next => true,
            Self::CallDepth(depth) => call_depth == depth,
            Self::LoopDepth(depth) => loop_depth == depth,
        }
    }
}

/// Why execution stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum BreakReason {
    /// An armed force-break condition was met.
    Forced(ForceBreak),
    /// A persistent breakpoint reached its pass count.
    Breakpoint {
        /// The configured pass count.
        passes: u32,
    },
}

/// A triggered break: where and why.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct BreakEvent {
    /// Address of the instruction that has not yet executed.
    pub pc: usize,
    /// Trigger.
    pub reason: BreakReason,
}

impl fmt::Display for BreakEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            BreakReason::Breakpoint { passes } if passes > 1 => {
                write!(f, "Breakpoint hit at address {} at pass {passes}.", self.pc)
            }
            _ => write!(f, "Breakpoint hit at address {}.", self.pc),
        }
    }
}

/// Listing row produced by [`BreakpointEngine::entries`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct BreakpointEntry {
    /// Instruction address.
    pub addr: usize,
    /// Configured pass count.
    pub passes: u32,
    /// Arrivals counted since the last trigger.
    pub passed: u32,
}

/// Per-machine breakpoint table plus the armed force-break, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BreakpointEngine {
    table: BTreeMap<usize, Breakpoint>,
    force: Option<ForceBreak>,
}

impl BreakpointEngine {
    /// Adds a breakpoint at `addr` firing on arrival `passes`, or removes the
    /// one already there.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Bounds`] for `addr >= IMEM_DEPTH` and
    /// [`SimError::Range`] for a zero pass count when installing.
    pub fn toggle(&mut self, addr: usize, passes: u32) -> Result<Toggled, SimError> {
        if self.table.remove(&addr).is_some() {
            return Ok(Toggled::Removed);
        }
        self.install(addr, passes)?;
        Ok(Toggled::Installed)
    }

    /// Ensures a breakpoint exists at `addr`, keeping an existing one as is.
    ///
    /// Returns `true` when a new entry was created.
    ///
    /// # Errors
    ///
    /// Same conditions as [`toggle`](Self::toggle).
    pub fn install(&mut self, addr: usize, passes: u32) -> Result<bool, SimError> {
        if addr >= IMEM_DEPTH {
            return Err(SimError::bounds(BoundsTarget::BreakpointAddress, addr));
        }
        if passes == 0 {
            return Err(SimError::Range { width: u32::BITS });
        }
        if self.table.contains_key(&addr) {
            return Ok(false);
        }
        self.table.insert(addr, Breakpoint::new(passes));
        Ok(true)
    }

    /// Breakpoint at `addr`, if any.
    #[must_use]
    pub fn get(&self, addr: usize) -> Option<Breakpoint> {
        self.table.get(&addr).copied()
    }

    /// Evaluates the force-break and then the table for an arrival at `pc`.
    ///
    /// A met force-break disarms itself and leaves the table untouched. A
    /// persistent breakpoint either fires (resetting its counter to 1) or
    /// advances its counter.
    pub fn check(&mut self, pc: usize, call_depth: usize, loop_depth: usize) -> Option<BreakReason> {
        if let Some(force) = self.force {
            if force.is_met(call_depth, loop_depth) {
                self.force = None;
                return Some(BreakReason::Forced(force));
            }
        }

        let breakpoint = self.table.get_mut(&pc)?;
        if breakpoint.is_due() {
            breakpoint.counter = 1;
            Some(BreakReason::Breakpoint {
                passes: breakpoint.passes,
            })
        } else {
            breakpoint.counter += 1;
            None
        }
    }

    /// Arms a one-shot break, replacing any armed one.
    pub fn arm(&mut self, force: ForceBreak) {
        self.force = Some(force);
    }

    /// Drops the armed one-shot break.
    pub fn disarm(&mut self) {
        self.force = None;
    }

    /// The armed one-shot break, if any.
    #[must_use]
    pub const fn armed(&self) -> Option<ForceBreak> {
        self.force
    }

    /// Breakpoints in address order.
    pub fn entries(&self) -> impl Iterator<Item = BreakpointEntry> + '_ {
        self.table.iter().map(|(addr, bp)| BreakpointEntry {
            addr: *addr,
            passes: bp.passes,
            passed: bp.passed(),
        })
    }

    /// Number of persistent breakpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` when no persistent breakpoint is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
