//! Drives a [`Simulator`] to completion and hosts the debugger prompt.
//!
//! The simulator never blocks. When [`Simulator::step`] reports a break the
//! runner prints the break banner and an assembly window, then reads
//! commands from its console until one of them resumes execution. Resume
//! commands arm the matching force-break before stepping again.

use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

use bignum_core::{
    write_dump, CommandParseError, DebugCommand, Instruction, SimError, Simulator, Stack,
    StepOutcome, Toggled, DMEM_DEPTH, HELP_TEXT,
};

use crate::render::{
    all_registers, asm_window, breakpoint_list, call_stack_listing, dmem_table, flags_table,
    general_registers, loop_stack_listing, special_registers, ASM_WINDOW,
};
use crate::report::write_stats_json;
use crate::{RunError, RunExit, RunReport, RunnerConfig};

/// Debugger prompt text.
pub const PROMPT: &str = "Press 'c' to continue, 'h' for help: ";

enum Prompt {
    Resume,
    Quit,
}

/// A simulator together with its driver settings.
#[derive(Debug, Clone)]
pub struct Runner<I> {
    sim: Simulator<I>,
    config: RunnerConfig,
}

impl<I: Instruction> Runner<I> {
    /// Wraps `sim`.
    #[must_use]
    pub const fn new(sim: Simulator<I>, config: RunnerConfig) -> Self {
        Self { sim, config }
    }

    /// Steps until the simulator halts or the user quits.
    ///
    /// Debugger commands are read line by line from `input`; listings and
    /// messages go to `output`. End of input at the prompt counts as `q`.
    ///
    /// # Errors
    ///
    /// [`RunError::Sim`] for a fatal simulation error,
    /// [`RunError::StepLimit`] once `max_steps` instructions have retired
    /// without halting, [`RunError::Io`] when the console fails.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        input: &mut R,
        output: &mut W,
    ) -> Result<RunReport, RunError> {
        let mut report = RunReport::default();
        tracing::info!(
            pc = self.sim.pc(),
            stop_addr = self.sim.stop_addr(),
            interactive = self.config.interactive,
            "run started"
        );

        loop {
            if let Some(limit) = self.config.max_steps {
                if report.steps >= limit {
                    return Err(RunError::StepLimit {
                        steps: report.steps,
                    });
                }
            }
            match self.sim.step()? {
                StepOutcome::Retired(retired) => {
                    report.steps += 1;
                    report.cycles += u64::from(retired.cycles);
                    report.finished = retired.finished;
                    report.traces.push(retired.trace);
                    if !retired.cont {
                        break;
                    }
                }
                StepOutcome::Broken(event) => {
                    if !self.config.interactive {
                        continue;
                    }
                    writeln!(output, "{event}")?;
                    self.print_asm(output)?;
                    if matches!(self.prompt(input, output)?, Prompt::Quit) {
                        report.exit = RunExit::Quit;
                        break;
                    }
                }
                StepOutcome::Halted => break,
            }
        }

        tracing::info!(
            steps = report.steps,
            cycles = report.cycles,
            finished = report.finished,
            "run finished"
        );
        Ok(report)
    }

    /// Writes the first `len` data-memory words to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Io`] when the file cannot be created or written.
    pub fn dump_to_file(&self, len: usize, path: &Path) -> Result<(), RunError> {
        let mut out = BufWriter::new(File::create(path)?);
        write_dump(self.sim.state().data_memory(), len, &mut out)?;
        out.flush()?;
        Ok(())
    }

    /// Writes the collected statistics as JSON.
    ///
    /// # Errors
    ///
    /// Same conditions as [`write_stats_json`].
    pub fn write_stats_json<W: Write>(&self, out: W) -> Result<(), RunError> {
        write_stats_json(self.sim.state().stats(), out)
    }

    /// The wrapped simulator.
    #[must_use]
    pub const fn simulator(&self) -> &Simulator<I> {
        &self.sim
    }

    /// The wrapped simulator, for breakpoints set before a run.
    pub const fn simulator_mut(&mut self) -> &mut Simulator<I> {
        &mut self.sim
    }

    /// Unwraps the simulator.
    #[must_use]
    pub fn into_simulator(self) -> Simulator<I> {
        self.sim
    }

    /// Driver settings.
    #[must_use]
    pub const fn config(&self) -> &RunnerConfig {
        &self.config
    }

    fn prompt<R: BufRead, W: Write>(
        &mut self,
        input: &mut R,
        output: &mut W,
    ) -> Result<Prompt, RunError> {
        let mut line = String::new();
        loop {
            write!(output, "{PROMPT}")?;
            output.flush()?;
            line.clear();
            if input.read_line(&mut line)? == 0 {
                writeln!(output)?;
                tracing::debug!("console closed at prompt");
                return Ok(Prompt::Quit);
            }
            let command = match line.parse::<DebugCommand>() {
                Ok(command) => command,
                Err(CommandParseError::Empty) => continue,
                Err(error) => {
                    writeln!(output, "Invalid command: {error}")?;
                    continue;
                }
            };
            tracing::debug!(?command, "debug command");
            if let Some(prompt) = self.execute(command, output)? {
                return Ok(prompt);
            }
        }
    }

    fn execute<W: Write>(
        &mut self,
        command: DebugCommand,
        output: &mut W,
    ) -> Result<Option<Prompt>, RunError> {
        match command {
            DebugCommand::Help => writeln!(output, "{HELP_TEXT}")?,
            DebugCommand::Quit => return Ok(Some(Prompt::Quit)),
            DebugCommand::Continue => return Ok(Some(Prompt::Resume)),
            DebugCommand::Step => {
                self.sim.arm_step();
                return Ok(Some(Prompt::Resume));
            }
            DebugCommand::StepOver => {
                self.sim.arm_step_over();
                return Ok(Some(Prompt::Resume));
            }
            DebugCommand::StepOut => return self.step_out(output, Stack::Call),
            DebugCommand::StepOutOfLoop => return self.step_out(output, Stack::Loop),
            DebugCommand::PrintRegisters => {
                let registers = &self.sim.state().registers;
                write!(output, "{}", general_registers(registers, true))?;
            }
            DebugCommand::PrintSpecialRegisters => {
                let registers = &self.sim.state().registers;
                write!(output, "{}", special_registers(registers, true))?;
            }
            DebugCommand::PrintAllRegisters => {
                write!(output, "{}", all_registers(&self.sim.state().registers))?;
            }
            DebugCommand::PrintDmem { len, start } => {
                let end = len.map_or(DMEM_DEPTH, |len| start.saturating_add(len));
                let memory = self.sim.state().data_memory();
                write!(output, "{}", dmem_table(memory, start..end))?;
            }
            DebugCommand::PrintFlags => write!(output, "{}", flags_table(self.sim.state().flags))?,
            DebugCommand::PrintLoopStack => {
                write!(output, "{}", loop_stack_listing(self.sim.state().loop_stack()))?;
            }
            DebugCommand::PrintCallStack => {
                write!(output, "{}", call_stack_listing(self.sim.state().call_stack()))?;
            }
            DebugCommand::PrintAsm => self.print_asm(output)?,
            DebugCommand::ToggleBreakpoint { target, passes } => {
                match self.sim.toggle_breakpoint(target.as_ref(), passes) {
                    Ok((addr, Toggled::Installed)) => {
                        writeln!(output, "Breakpoint set at address {addr}")?;
                    }
                    Ok((addr, Toggled::Removed)) => {
                        writeln!(output, "Breakpoint deleted at address {addr}")?;
                    }
                    Err(error) => writeln!(output, "Cannot toggle breakpoint: {error}")?,
                }
                self.print_asm(output)?;
            }
            DebugCommand::ListBreakpoints => {
                write!(output, "{}", breakpoint_list(self.sim.state().breakpoints()))?;
            }
            DebugCommand::Dump { len, filename } => {
                let path = filename.map_or_else(|| self.config.dump_filename.clone(), PathBuf::from);
                match self.dump_to_file(len, &path) {
                    Ok(()) => writeln!(
                        output,
                        "Dumped {} words to {}",
                        len.min(DMEM_DEPTH),
                        path.display()
                    )?,
                    Err(error) => writeln!(output, "Dump failed: {error}")?,
                }
            }
        }
        Ok(None)
    }

    fn step_out<W: Write>(&mut self, output: &mut W, stack: Stack) -> Result<Option<Prompt>, RunError> {
        let armed = match stack {
            Stack::Call => self.sim.arm_step_out(),
            Stack::Loop => self.sim.arm_step_out_of_loop(),
        };
        match armed {
            Ok(()) => Ok(Some(Prompt::Resume)),
            Err(SimError::StackUnderrun(_)) => {
                writeln!(output, "Nothing on {stack} stack, can't \"step out\".")?;
                Ok(None)
            }
            Err(error) => Err(error.into()),
        }
    }

    fn print_asm<W: Write>(&self, output: &mut W) -> io::Result<()> {
        write!(
            output,
            "{}",
            asm_window(&self.sim, self.sim.pc(), ASM_WINDOW, ASM_WINDOW)
        )
    }
}
