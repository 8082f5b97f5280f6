//! Bounded loop and call stacks.

use std::fmt;

use crate::{SimError, Stack};

/// Maximum loop-stack depth.
pub const LOOP_STACK_SIZE: usize = 16;
/// Maximum call-stack depth.
pub const CALL_STACK_SIZE: usize = 16;

/// One active zero-overhead loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct LoopFrame {
    /// Iterations still to run after the current one.
    pub remaining: u32,
    /// Address of the last instruction in the loop body.
    pub end_addr: usize,
    /// Address of the first instruction in the loop body.
    pub start_addr: usize,
}

impl fmt::Display for LoopFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "remaining={} start={} end={}",
            self.remaining, self.start_addr, self.end_addr
        )
    }
}

/// Loop stack holding at most [`LOOP_STACK_SIZE`] frames.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopStack {
    frames: Vec<LoopFrame>,
}

impl LoopStack {
    /// Pushes a new frame.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::StackOverflow`] when the stack is full.
    pub fn push(&mut self, frame: LoopFrame) -> Result<(), SimError> {
        if self.frames.len() >= LOOP_STACK_SIZE {
            return Err(SimError::StackOverflow(Stack::Loop));
        }
        self.frames.push(frame);
        Ok(())
    }

    /// Decrements the top frame's remaining count.
    ///
    /// Returns `true` ("loop again") when the count was nonzero. A count
    /// already at zero is left as is and `false` is returned; the frame
    /// stays on the stack for the caller to pop.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::StackUnderrun`] when the stack is empty.
    pub fn dec_top_count(&mut self) -> Result<bool, SimError> {
        let top = self
            .frames
            .last_mut()
            .ok_or(SimError::StackUnderrun(Stack::Loop))?;
        if top.remaining == 0 {
            return Ok(false);
        }
        top.remaining -= 1;
        Ok(true)
    }

    /// Peeks the top frame.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::StackUnderrun`] when the stack is empty.
    pub fn top(&self) -> Result<&LoopFrame, SimError> {
        self.frames
            .last()
            .ok_or(SimError::StackUnderrun(Stack::Loop))
    }

    /// End address of the top frame.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::StackUnderrun`] when the stack is empty.
    pub fn top_end_addr(&self) -> Result<usize, SimError> {
        self.top().map(|frame| frame.end_addr)
    }

    /// Start address of the top frame.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::StackUnderrun`] when the stack is empty.
    pub fn top_start_addr(&self) -> Result<usize, SimError> {
        self.top().map(|frame| frame.start_addr)
    }

    /// Removes the top frame and returns its start address.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::StackUnderrun`] when the stack is empty.
    pub fn pop(&mut self) -> Result<usize, SimError> {
        self.frames
            .pop()
            .map(|frame| frame.start_addr)
            .ok_or(SimError::StackUnderrun(Stack::Loop))
    }

    /// Current depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Frames from bottom to top.
    #[must_use]
    pub fn frames(&self) -> &[LoopFrame] {
        &self.frames
    }

    /// Drops every frame.
    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

/// Call stack of return addresses, at most [`CALL_STACK_SIZE`] deep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallStack {
    addresses: Vec<usize>,
}

impl CallStack {
    /// Pushes a return address.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::StackOverflow`] when the stack is full.
    pub fn push(&mut self, addr: usize) -> Result<(), SimError> {
        if self.addresses.len() >= CALL_STACK_SIZE {
            return Err(SimError::StackOverflow(Stack::Call));
        }
        self.addresses.push(addr);
        Ok(())
    }

    /// Pops the most recent return address.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::StackUnderrun`] when the stack is empty.
    pub fn pop(&mut self) -> Result<usize, SimError> {
        self.addresses
            .pop()
            .ok_or(SimError::StackUnderrun(Stack::Call))
    }

    /// Current depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.addresses.len()
    }

    /// Return addresses from bottom to top.
    #[must_use]
    pub fn addresses(&self) -> &[usize] {
        &self.addresses
    }

    /// Drops every return address.
    pub fn clear(&mut self) {
        self.addresses.clear();
    }
}
