//! Small instruction set and program used by the console suites.

#![allow(dead_code)]

use bignum_core::{
    AsmContext, AsmText, BreakTarget, Executed, Instruction, MachineState, SimConfig, SimError,
    Simulator, Word,
};

/// Toy opcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    /// Does nothing.
    Nop,
    /// `dmem[addr] = value`.
    Put { addr: usize, value: u32 },
    /// Runs the next `len` instructions `iterations` times.
    Loop { iterations: u32, len: usize },
    /// Pushes the return address and jumps to `target`.
    Call { target: usize },
    /// Returns, or finishes the program when the call stack is empty.
    Ret,
    /// Jumps to `target`.
    Jump { target: usize },
}

impl Instruction for Op {
    fn asm_text(&self) -> AsmText {
        let long = match self {
            Self::Nop => "nop".to_string(),
            Self::Put { addr, value } => format!("put {addr}, {value}"),
            Self::Loop { iterations, len } => format!("loop {iterations}, {len}"),
            Self::Call { target } => format!("call {target}"),
            Self::Ret => "ret".to_string(),
            Self::Jump { target } => format!("jump {target}"),
        };
        let short = long.split_whitespace().next().unwrap_or_default().to_string();
        AsmText { short, long }
    }

    fn cycle_cost(&self) -> u32 {
        match self {
            Self::Put { .. } => 2,
            Self::Call { .. } | Self::Ret => 3,
            _ => 1,
        }
    }

    fn execute(&self, machine: &mut MachineState) -> Result<Executed, SimError> {
        let pc = machine.pc();
        match *self {
            Self::Nop => Ok(Executed::next("nop")),
            Self::Put { addr, value } => {
                machine.write_data(addr, Word::from(value))?;
                Ok(Executed::next(format!("dmem[{addr}] = {value}")))
            }
            Self::Loop { iterations, len } => {
                machine.push_loop(iterations.saturating_sub(1), pc + len, pc + 1)?;
                machine.record_loop(len, iterations);
                Ok(Executed::next(format!("loop x{iterations}")))
            }
            Self::Call { target } => {
                machine.push_call(pc + 1)?;
                machine.record_func_call(target);
                Ok(Executed::jump(format!("call {target}"), target))
            }
            Self::Ret => {
                if machine.call_stack().depth() == 0 {
                    machine.finish()?;
                    return Ok(Executed::next("ret (finish)"));
                }
                let target = machine.pop_call()?;
                Ok(Executed::jump(format!("ret -> {target}"), target))
            }
            Self::Jump { target } => Ok(Executed::jump(format!("jump {target}"), target)),
        }
    }
}

/// Main calls `square`, whose body is a two-iteration loop over one `nop`,
/// then finishes at address 2. Visits 0, 1, 4, 5, 5, 6, 2.
pub fn square_program() -> Vec<Op> {
    vec![
        Op::Put { addr: 0, value: 7 },
        Op::Call { target: 4 },
        Op::Ret,
        Op::Nop,
        Op::Loop {
            iterations: 2,
            len: 1,
        },
        Op::Nop,
        Op::Ret,
    ]
}

/// Symbols for [`square_program`].
pub fn square_context() -> AsmContext {
    AsmContext {
        functions: [(0, "main".to_string()), (4, "square".to_string())].into(),
        labels: [(5, "body".to_string())].into(),
        loop_ranges: vec![5..6],
    }
}

/// [`square_program`] with its symbols, halting after address 2.
pub fn square_sim(dmem: &[Word]) -> Simulator<Op> {
    Simulator::with_config(
        dmem,
        square_program(),
        SimConfig::default().with_stop_addr(2),
        Some(square_context()),
    )
    .expect("valid program")
}

/// [`square_sim`] with a breakpoint at `addr`.
pub fn square_sim_breaking_at(addr: usize) -> Simulator<Op> {
    let mut sim = square_sim(&[]);
    install(&mut sim, addr);
    sim
}

/// Installs a breakpoint that fires on every arrival at `addr`.
pub fn install(sim: &mut Simulator<Op>, addr: usize) {
    let target = BreakTarget::Address(addr);
    sim.toggle_breakpoint(Some(&target), 1).expect("valid breakpoint");
}
