//! Toy instruction set shared by the integration suites.
//!
//! Just enough opcodes to drive every path of the step engine: arithmetic
//! with flag updates, data-memory traffic, zero-overhead loops, calls and
//! returns (including the finishing return), and raw jumps.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use bignum_core::{
    AsmText, Executed, FlagGroup, Instruction, MachineState, RegisterRef, SimError, Word,
    WriteHint,
};

/// Toy opcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    /// Does nothing.
    Nop,
    /// `rd = rs + imm`, updating C/Z/M/L.
    AddI { rd: usize, rs: usize, imm: u32 },
    /// Writes `imm` into limb `limb` of `rd`.
    MovI { rd: usize, limb: usize, imm: u32 },
    /// `rd = dmem[addr]`.
    Load { rd: usize, addr: usize },
    /// `dmem[addr] = rs`.
    Store { addr: usize, rs: usize },
    /// Runs the next `len` instructions `iterations` times.
    Loop { iterations: u32, len: usize },
    /// Pushes the return address and jumps to `target`.
    Call { target: usize },
    /// Returns, or finishes the program when the call stack is empty.
    Ret,
    /// Jumps to `target` unconditionally.
    Jump { target: usize },
}

impl Instruction for Op {
    fn asm_text(&self) -> AsmText {
        let long = match self {
            Self::Nop => "nop".to_string(),
            Self::AddI { rd, rs, imm } => format!("addi r{rd}, r{rs}, {imm}"),
            Self::MovI { rd, limb, imm } => format!("movi r{rd}.{limb}, {imm}"),
            Self::Load { rd, addr } => format!("ld r{rd}, {addr}"),
            Self::Store { addr, rs } => format!("st {addr}, r{rs}"),
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
            Self::Load { .. } | Self::Store { .. } => 2,
            Self::Call { .. } | Self::Ret => 3,
            _ => 1,
        }
    }

    fn execute(&self, machine: &mut MachineState) -> Result<Executed, SimError> {
        let pc = machine.pc();
        match *self {
            Self::Nop => Ok(Executed::next("nop")),
            Self::AddI { rd, rs, imm } => {
                let lhs = machine.registers.get(RegisterRef::General(rs))?;
                let (sum, carry) = lhs.overflowing_add(Word::from(imm));
                machine.registers.set(RegisterRef::General(rd), sum, WriteHint::Whole)?;
                machine.flags.set_c_z_m_l(sum, carry);
                Ok(Executed::next(format!("r{rd} = {sum}")))
            }
            Self::MovI { rd, limb, imm } => {
                machine.registers.set_limb(RegisterRef::General(rd), limb, imm)?;
                machine.record_movi(32);
                Ok(Executed::next(format!("r{rd}.{limb} = {imm:#x}")))
            }
            Self::Load { rd, addr } => {
                let value = machine.read_data(addr)?;
                machine.registers.set(RegisterRef::General(rd), value, WriteHint::Whole)?;
                machine.record_wide_mem_op("ld", false, false);
                Ok(Executed::next(format!("r{rd} = dmem[{addr}]")))
            }
            Self::Store { addr, rs } => {
                let value = machine.registers.get(RegisterRef::General(rs))?;
                machine.write_data(addr, value)?;
                machine.record_wide_mem_op("st", false, false);
                machine.record_flag_access(FlagGroup::Standard, "st");
                Ok(Executed::next(format!("dmem[{addr}] = r{rs}")))
            }
            Self::Loop { iterations, len } => {
                let remaining = iterations.saturating_sub(1);
                machine.push_loop(remaining, pc + len, pc + 1)?;
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

/// In-memory sink for `tracing` output.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Everything written so far.
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().expect("log buffer lock").clone();
        String::from_utf8(bytes).expect("utf-8 log output")
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().expect("log buffer lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Runs `f` with a subscriber that captures events at `level` and above.
pub fn with_captured_logs<T>(level: tracing::Level, f: impl FnOnce() -> T) -> (T, String) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, logs.contents())
}
