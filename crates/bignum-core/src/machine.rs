//! Machine state visible to instructions.

use crate::breakpoint::BreakpointEngine;
use crate::diag::DiagCounters;
use crate::memory::DataMemory;
use crate::stack::{CallStack, LoopFrame, LoopStack};
use crate::stats::{LoopRecord, Stats};
use crate::{AsmContext, BoundsTarget, FlagGroup, Flags, RegisterFile, SimError, Word};

/// Registers, flags, data memory, control stacks and debugger bookkeeping of
/// one simulated coprocessor.
///
/// Instruction memory is owned by the [`Simulator`](crate::Simulator) and is
/// not reachable from here; only its length is known, to validate stack
/// addresses.
#[derive(Debug, Clone)]
pub struct MachineState {
    /// Wide and special registers.
    pub registers: RegisterFile,
    /// Condition flags.
    pub flags: Flags,
    dmem: DataMemory,
    loop_stack: LoopStack,
    call_stack: CallStack,
    pc: usize,
    imem_len: usize,
    breakpoints: BreakpointEngine,
    stats: Stats,
    diag: DiagCounters,
    finished: bool,
    ctx: Option<AsmContext>,
}

impl MachineState {
    pub(crate) fn new(
        dmem: &[Word],
        imem_len: usize,
        start_pc: usize,
        ctx: Option<AsmContext>,
    ) -> Result<Self, SimError> {
        Ok(Self {
            registers: RegisterFile::default(),
            flags: Flags::default(),
            dmem: DataMemory::new(dmem)?,
            loop_stack: LoopStack::default(),
            call_stack: CallStack::default(),
            pc: start_pc,
            imem_len,
            breakpoints: BreakpointEngine::default(),
            stats: Stats::default(),
            diag: DiagCounters::new(),
            finished: false,
            ctx,
        })
    }

    /// Reinitializes everything except breakpoints, statistics and the
    /// assembly context. Registers are zeroed (with `rnd = 1`) only when
    /// `clear_regs` is set; otherwise only their write tracking is dropped.
    pub(crate) fn reset(
        &mut self,
        dmem: &[Word],
        imem_len: usize,
        start_pc: usize,
        clear_regs: bool,
    ) -> Result<(), SimError> {
        self.dmem = DataMemory::new(dmem)?;
        if clear_regs {
            self.registers.clear();
        } else {
            self.registers.reset_validity();
        }
        self.flags.clear();
        self.loop_stack.clear();
        self.call_stack.clear();
        self.pc = start_pc;
        self.imem_len = imem_len;
        self.diag.reset();
        self.finished = false;
        Ok(())
    }

    /// Address of the instruction being executed.
    #[must_use]
    pub const fn pc(&self) -> usize {
        self.pc
    }

    pub(crate) const fn set_pc(&mut self, pc: usize) {
        self.pc = pc;
    }

    /// Number of instructions in the loaded program.
    #[must_use]
    pub const fn imem_len(&self) -> usize {
        self.imem_len
    }

    /// Reads a data word.
    ///
    /// Reading a cell that was never written is allowed: the resident value
    /// is returned and the read is logged and counted.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Bounds`] when `addr` is outside data memory.
    pub fn read_data(&mut self, addr: usize) -> Result<Word, SimError> {
        let cell = self.dmem.cell(addr)?;
        if !cell.initialized {
            tracing::warn!(addr, "reading from uninitialized dmem address");
            self.diag.record_uninit_read(addr);
        }
        Ok(cell.value)
    }

    /// Writes a data word and marks the cell initialized.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Bounds`] when `addr` is outside data memory.
    pub fn write_data(&mut self, addr: usize, value: Word) -> Result<(), SimError> {
        self.dmem.write(addr, value)
    }

    /// Data memory, for inspection and dumps.
    #[must_use]
    pub const fn data_memory(&self) -> &DataMemory {
        &self.dmem
    }

    /// Pushes a loop frame running `count` more iterations over
    /// `start_addr..=end_addr`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Bounds`] when either address is outside the
    /// program and [`SimError::StackOverflow`] when the loop stack is full.
    pub fn push_loop(&mut self, count: u32, end_addr: usize, start_addr: usize) -> Result<(), SimError> {
        self.check_imem_addr(end_addr)?;
        self.check_imem_addr(start_addr)?;
        self.loop_stack.push(LoopFrame {
            remaining: count,
            end_addr,
            start_addr,
        })
    }

    /// Decrements the top loop count; `true` means "loop again".
    ///
    /// # Errors
    ///
    /// Returns [`SimError::StackUnderrun`] when the loop stack is empty.
    pub fn dec_top_loop_count(&mut self) -> Result<bool, SimError> {
        self.loop_stack.dec_top_count()
    }

    /// End address of the innermost loop.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::StackUnderrun`] when the loop stack is empty.
    pub fn top_loop_end_addr(&self) -> Result<usize, SimError> {
        self.loop_stack.top_end_addr()
    }

    /// Start address of the innermost loop.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::StackUnderrun`] when the loop stack is empty.
    pub fn top_loop_start_addr(&self) -> Result<usize, SimError> {
        self.loop_stack.top_start_addr()
    }

    /// Pops the innermost loop and returns its start address.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::StackUnderrun`] when the loop stack is empty.
    pub fn pop_loop(&mut self) -> Result<usize, SimError> {
        self.loop_stack.pop()
    }

    /// The loop stack.
    #[must_use]
    pub const fn loop_stack(&self) -> &LoopStack {
        &self.loop_stack
    }

    /// Pushes a return address.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Bounds`] when `addr` is outside the program and
    /// [`SimError::StackOverflow`] when the call stack is full.
    pub fn push_call(&mut self, addr: usize) -> Result<(), SimError> {
        self.check_imem_addr(addr)?;
        self.call_stack.push(addr)
    }

    /// Pops the most recent return address.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::StackUnderrun`] when the call stack is empty.
    pub fn pop_call(&mut self) -> Result<usize, SimError> {
        self.call_stack.pop()
    }

    /// The call stack.
    #[must_use]
    pub const fn call_stack(&self) -> &CallStack {
        &self.call_stack
    }

    /// Marks the program as finished after a return with an empty call
    /// stack, and makes sure a breakpoint sits at the current address.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Bounds`] if pc is not a valid breakpoint address.
    pub fn finish(&mut self) -> Result<(), SimError> {
        self.finished = true;
        self.breakpoints.install(self.pc, 1)?;
        Ok(())
    }

    /// Whether [`finish`](Self::finish) has been called since the last reset.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Breakpoint table and armed force-break.
    #[must_use]
    pub const fn breakpoints(&self) -> &BreakpointEngine {
        &self.breakpoints
    }

    pub(crate) const fn breakpoints_mut(&mut self) -> &mut BreakpointEngine {
        &mut self.breakpoints
    }

    /// Collected statistics.
    #[must_use]
    pub const fn stats(&self) -> &Stats {
        &self.stats
    }

    pub(crate) const fn stats_mut(&mut self) -> &mut Stats {
        &mut self.stats
    }

    /// Diagnostic counters.
    #[must_use]
    pub const fn diag(&self) -> &DiagCounters {
        &self.diag
    }

    pub(crate) const fn diag_mut(&mut self) -> &mut DiagCounters {
        &mut self.diag
    }

    /// Assembly context, if one was supplied.
    #[must_use]
    pub const fn asm_context(&self) -> Option<&AsmContext> {
        self.ctx.as_ref()
    }

    /// Records a call from the current pc to `callee_func`.
    pub fn record_func_call(&mut self, callee_func: usize) {
        self.stats
            .record_func_call(self.pc, callee_func, self.ctx.as_ref());
    }

    /// Records entry into a loop of `loop_len` instructions starting after
    /// the current pc. Call after pushing its frame.
    pub fn record_loop(&mut self, loop_len: usize, iterations: u32) {
        self.stats.record_loop(LoopRecord {
            loop_addr: self.pc,
            loop_len,
            new_loop_stack_depth: self.loop_stack.depth(),
            iterations,
        });
    }

    /// Records a move-immediate of `imm_size` bits.
    pub fn record_movi(&mut self, imm_size: u32) {
        self.stats.record_movi(imm_size);
    }

    /// Records a wide memory operation.
    pub fn record_wide_mem_op(&mut self, op: &str, inc_src: bool, inc_dst: bool) {
        self.stats.record_wide_mem_op(op, inc_src, inc_dst);
    }

    /// Records an explicit flag access.
    pub fn record_flag_access(&mut self, group: FlagGroup, op: &str) {
        self.stats.record_flag_access(group, op);
    }

    fn check_imem_addr(&self, addr: usize) -> Result<(), SimError> {
        if addr < self.imem_len {
            Ok(())
        } else {
            Err(SimError::bounds(BoundsTarget::InstructionAddress, addr))
        }
    }
}
