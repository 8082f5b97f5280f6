//! Fetch/execute orchestration and the debugger-facing run state machine.
//!
//! A [`Simulator::step`] call either reports a break without executing
//! anything, or retires exactly one instruction:
//!
//! 1. note whether pc is the stop address,
//! 2. evaluate the force-break and breakpoint table (skipped when resuming
//!    from [`RunState::Broken`]),
//! 3. fetch, charge cycles and execute,
//! 4. run the loop epilogue when pc is the innermost loop's end address,
//! 5. transfer control or fall through,
//! 6. report whether the run continues.
//!
//! The core never blocks: a break is returned to the caller, which decides
//! how to resume by arming a [`ForceBreak`] (or not) and stepping again.

use crate::breakpoint::{BreakEvent, ForceBreak, Toggled};
use crate::debug::BreakTarget;
use crate::memory::Program;
use crate::{AsmContext, Executed, Instruction, MachineState, SimConfig, SimError, Stack, Word};

/// Execution state of a [`Simulator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RunState {
    /// Ready to evaluate breakpoints and execute at pc.
    #[default]
    Running,
    /// Suspended before executing pc; the next step executes it without
    /// re-evaluating breakpoints.
    Broken(BreakEvent),
    /// Stop address executed, program ran off its end, or a fatal error
    /// occurred. Only [`Simulator::reset`] leaves this state.
    Halted,
}

/// One retired instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retired {
    /// Address the instruction was fetched from.
    pub pc: usize,
    /// Trace text produced by the instruction.
    pub trace: String,
    /// Cycle cost charged.
    pub cycles: u32,
    /// `false` once the run is over.
    pub cont: bool,
    /// Whether the program has signalled completion.
    pub finished: bool,
}

/// Result of a single [`Simulator::step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// An instruction executed.
    Retired(Retired),
    /// A break triggered before pc executed.
    Broken(BreakEvent),
    /// The simulator was already halted; nothing happened.
    Halted,
}

/// Why [`Simulator::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStop {
    /// The run is over.
    Halted,
    /// A break triggered.
    Broken(BreakEvent),
    /// The step limit was reached while still running.
    StepLimit,
}

/// Summary of a [`Simulator::run`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    /// Instructions retired during this call.
    pub steps: u64,
    /// Cycles charged during this call.
    pub cycles: u64,
    /// Stop condition.
    pub stop: RunStop,
}

/// A loaded program together with the machine it runs on.
#[derive(Debug, Clone)]
pub struct Simulator<I> {
    state: MachineState,
    program: Program<I>,
    stop_addr: usize,
    run_state: RunState,
}

impl<I: Instruction> Simulator<I> {
    /// Builds a simulator starting at address 0 and stopping after the last
    /// instruction.
    ///
    /// # Errors
    ///
    /// Same conditions as [`with_config`](Self::with_config).
    pub fn new(dmem: &[Word], instructions: Vec<I>) -> Result<Self, SimError> {
        Self::with_config(dmem, instructions, SimConfig::default(), None)
    }

    /// Builds a simulator with explicit addresses and an optional assembly
    /// context.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Bounds`] for more than 128 data words or more
    /// than 1024 instructions.
    pub fn with_config(
        dmem: &[Word],
        instructions: Vec<I>,
        config: SimConfig,
        ctx: Option<AsmContext>,
    ) -> Result<Self, SimError> {
        let program = Program::new(instructions)?;
        let state = MachineState::new(dmem, program.len(), config.start_pc, ctx)?;
        Ok(Self {
            stop_addr: config.resolve_stop_addr(program.len()),
            state,
            program,
            run_state: RunState::Running,
        })
    }

    /// Reloads data memory and the program and returns to [`RunState::Running`].
    ///
    /// Flags, stacks, write tracking and the finish flag are reset; register
    /// contents only when `clear_regs` is set. Breakpoints and statistics
    /// are kept.
    ///
    /// # Errors
    ///
    /// Same conditions as [`with_config`](Self::with_config).
    pub fn reset(
        &mut self,
        dmem: &[Word],
        instructions: Vec<I>,
        config: SimConfig,
        clear_regs: bool,
    ) -> Result<(), SimError> {
        let program = Program::new(instructions)?;
        self.state
            .reset(dmem, program.len(), config.start_pc, clear_regs)?;
        self.stop_addr = config.resolve_stop_addr(program.len());
        self.program = program;
        self.run_state = RunState::Running;
        Ok(())
    }

    /// Advances by one step.
    ///
    /// From [`RunState::Running`] this may return [`StepOutcome::Broken`]
    /// without executing anything. From [`RunState::Broken`] it executes the
    /// suspended instruction.
    ///
    /// # Errors
    ///
    /// Any fatal [`SimError`] from fetch, execution, the loop epilogue or
    /// jump validation. The simulator is halted afterwards.
    pub fn step(&mut self) -> Result<StepOutcome, SimError> {
        match self.run_state {
            RunState::Halted => return Ok(StepOutcome::Halted),
            RunState::Broken(_) => self.run_state = RunState::Running,
            RunState::Running => {
                if self.state.is_finished() {
                    tracing::info!(
                        pc = self.state.pc(),
                        "reached 'ret' instruction with empty call stack, finishing here"
                    );
                }
                if let Some(event) = self.check_break() {
                    self.run_state = RunState::Broken(event);
                    return Ok(StepOutcome::Broken(event));
                }
            }
        }

        match self.retire() {
            Ok(retired) => Ok(StepOutcome::Retired(retired)),
            Err(error) => {
                self.run_state = RunState::Halted;
                Err(error)
            }
        }
    }

    /// Executes the instruction a break suspended. Equivalent to [`step`](Self::step).
    ///
    /// # Errors
    ///
    /// Same conditions as [`step`](Self::step).
    pub fn resume(&mut self) -> Result<StepOutcome, SimError> {
        self.step()
    }

    /// Steps until the run halts, a break triggers, or `max_steps`
    /// instructions have retired.
    ///
    /// # Errors
    ///
    /// Same conditions as [`step`](Self::step).
    pub fn run(&mut self, max_steps: Option<u64>) -> Result<RunOutcome, SimError> {
        let mut steps = 0_u64;
        let mut cycles = 0_u64;
        loop {
            if max_steps.is_some_and(|limit| steps >= limit) {
                return Ok(RunOutcome {
                    steps,
                    cycles,
                    stop: RunStop::StepLimit,
                });
            }
            let stop = match self.step()? {
                StepOutcome::Retired(retired) => {
                    steps += 1;
                    cycles = cycles.saturating_add(u64::from(retired.cycles));
                    if retired.cont {
                        continue;
                    }
                    RunStop::Halted
                }
                StepOutcome::Broken(event) => RunStop::Broken(event),
                StepOutcome::Halted => RunStop::Halted,
            };
            return Ok(RunOutcome {
                steps,
                cycles,
                stop,
            });
        }
    }

    fn check_break(&mut self) -> Option<BreakEvent> {
        let pc = self.state.pc();
        let call_depth = self.state.call_stack().depth();
        let loop_depth = self.state.loop_stack().depth();
        let reason = self
            .state
            .breakpoints_mut()
            .check(pc, call_depth, loop_depth)?;
        self.state.diag_mut().record_break();
        tracing::debug!(pc, ?reason, "break triggered");
        Some(BreakEvent { pc, reason })
    }

    fn retire(&mut self) -> Result<Retired, SimError> {
        let pc = self.state.pc();
        let final_step = pc == self.stop_addr;

        let instruction = self.program.fetch(pc)?;
        let cycles = instruction.cycle_cost();
        let asm = instruction.asm_text();
        self.state.stats_mut().record_instruction(&asm.long, cycles);
        let Executed { trace, mut jump } = instruction.execute(&mut self.state)?;

        if self.state.loop_stack().depth() > 0 && pc == self.state.top_loop_end_addr()? {
            if self.state.dec_top_loop_count()? {
                jump = Some(self.state.top_loop_start_addr()?);
            } else {
                let start = self.state.pop_loop()?;
                tracing::debug!(pc, start, "loop finished");
            }
        }

        let cont = match jump {
            Some(target) => {
                let target = self.program.check_jump(target)?;
                self.state.set_pc(target);
                true
            }
            None if pc + 1 >= self.program.len() => false,
            None => {
                self.state.set_pc(pc + 1);
                true
            }
        };
        let cont = cont && !final_step;

        self.state.diag_mut().record_retired();
        tracing::trace!(pc, cycles, "retired");
        if !cont {
            self.run_state = RunState::Halted;
        }
        Ok(Retired {
            pc,
            trace,
            cycles,
            cont,
            finished: self.state.is_finished(),
        })
    }

    /// Arms a break before the next instruction.
    pub fn arm_step(&mut self) {
        self.state.breakpoints_mut().arm(ForceBreak::Next);
    }

    /// Arms a break at the current call depth, stepping over calls.
    pub fn arm_step_over(&mut self) {
        let depth = self.state.call_stack().depth();
        self.state.breakpoints_mut().arm(ForceBreak::CallDepth(depth));
    }

    /// Arms a break once the current function returns.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::StackUnderrun`] for [`Stack::Call`] when the call
    /// stack is empty; nothing is armed.
    pub fn arm_step_out(&mut self) -> Result<(), SimError> {
        let depth = self
            .state
            .call_stack()
            .depth()
            .checked_sub(1)
            .ok_or(SimError::StackUnderrun(Stack::Call))?;
        self.state.breakpoints_mut().arm(ForceBreak::CallDepth(depth));
        Ok(())
    }

    /// Arms a break once the innermost loop is left.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::StackUnderrun`] for [`Stack::Loop`] when the loop
    /// stack is empty; nothing is armed.
    pub fn arm_step_out_of_loop(&mut self) -> Result<(), SimError> {
        let depth = self
            .state
            .loop_stack()
            .depth()
            .checked_sub(1)
            .ok_or(SimError::StackUnderrun(Stack::Loop))?;
        self.state.breakpoints_mut().arm(ForceBreak::LoopDepth(depth));
        Ok(())
    }

    /// Drops any armed one-shot break.
    pub fn disarm(&mut self) {
        self.state.breakpoints_mut().disarm();
    }

    /// Toggles a breakpoint; `None` means the current pc.
    ///
    /// Returns the resolved address and whether it was installed or removed.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidIdentifier`] for an unresolvable symbol,
    /// [`SimError::Bounds`] for an address past instruction-memory depth,
    /// [`SimError::Range`] for a zero pass count.
    pub fn toggle_breakpoint(
        &mut self,
        target: Option<&BreakTarget>,
        passes: u32,
    ) -> Result<(usize, Toggled), SimError> {
        let addr = match target {
            Some(target) => target.resolve(self.state.asm_context())?,
            None => self.state.pc(),
        };
        let toggled = self.state.breakpoints_mut().toggle(addr, passes)?;
        Ok((addr, toggled))
    }

    /// Machine state.
    #[must_use]
    pub const fn state(&self) -> &MachineState {
        &self.state
    }

    /// Mutable machine state, for test setup and host-side pokes.
    pub const fn state_mut(&mut self) -> &mut MachineState {
        &mut self.state
    }

    /// Loaded program.
    #[must_use]
    pub const fn program(&self) -> &Program<I> {
        &self.program
    }

    /// Address after whose execution the run halts.
    #[must_use]
    pub const fn stop_addr(&self) -> usize {
        self.stop_addr
    }

    /// Current run state.
    #[must_use]
    pub const fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Current pc.
    #[must_use]
    pub const fn pc(&self) -> usize {
        self.state.pc()
    }
}
