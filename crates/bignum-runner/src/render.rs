//! Text renderings of machine state for the debugger console.
//!
//! Every function returns a `String` ready to print; none of them touch the
//! simulator beyond reading it.

use std::fmt::Write as _;
use std::ops::Range;

use bignum_core::{
    BreakpointEngine, CallStack, DataMemory, Flag, Flags, Instruction, LoopStack, RegisterFile,
    Simulator, SpecialRegister, DMEM_DEPTH, LIMBS,
};

/// Instructions shown before and after pc in the assembly window.
pub const ASM_WINDOW: usize = 5;

/// Column header naming limbs, most significant first.
#[must_use]
pub fn limb_header() -> String {
    let mut out = String::from("     ");
    for limb in (0..LIMBS).rev() {
        let _ = write!(out, "{limb:>8} ");
    }
    out.push('\n');
    out.push_str("-----");
    for _ in 0..LIMBS {
        out.push_str("-------- ");
    }
    out.push('\n');
    out
}

/// General registers, grouped by four.
#[must_use]
pub fn general_registers(registers: &RegisterFile, header: bool) -> String {
    let mut out = if header { limb_header() } else { String::new() };
    for (index, value) in registers.general().iter().enumerate() {
        if index % 4 == 0 && index > 0 {
            out.push('\n');
        }
        let name = format!("r{index}");
        let _ = writeln!(out, "{name:>3}: {value}");
    }
    out
}

/// Special registers by name.
#[must_use]
pub fn special_registers(registers: &RegisterFile, header: bool) -> String {
    let mut out = if header { limb_header() } else { String::new() };
    for reg in SpecialRegister::ALL {
        let value = registers.get(reg.into()).unwrap_or_default();
        let _ = writeln!(out, "{:>3}: {value}", reg.name());
    }
    out
}

/// Special registers followed by the general registers under one header.
#[must_use]
pub fn all_registers(registers: &RegisterFile) -> String {
    let mut out = limb_header();
    out.push_str(&special_registers(registers, false));
    out.push('\n');
    out.push_str(&general_registers(registers, false));
    out
}

/// Flag names over their values, standard group then extended group.
#[must_use]
pub fn flags_table(flags: Flags) -> String {
    let mut names = String::from("|");
    let mut values = String::from("|");
    for flag in Flag::ALL {
        if flag == Flag::ExtCarry {
            names.push_str("  |");
            values.push_str("  |");
        }
        let width = flag.name().len();
        let _ = write!(names, "{}|", flag.name());
        let _ = write!(values, "{:>width$}|", u8::from(flags.get(flag)));
    }
    format!("{names}\n{values}\n")
}

/// Data memory rows for `range`, clamped to the memory depth. Uninitialized
/// cells are marked with `*`.
#[must_use]
pub fn dmem_table(memory: &DataMemory, range: Range<usize>) -> String {
    let mut out = limb_header();
    let end = range.end.min(DMEM_DEPTH);
    let cells = memory.cells();
    for addr in range.start.min(end)..end {
        if addr % 4 == 0 && addr > range.start {
            out.push('\n');
        }
        let cell = cells[addr];
        let mark = if cell.initialized { ' ' } else { '*' };
        let _ = writeln!(out, "{addr:>4}: {}{mark}", cell.value);
    }
    out
}

/// Loop frames from outermost to innermost.
#[must_use]
pub fn loop_stack_listing(stack: &LoopStack) -> String {
    if stack.depth() == 0 {
        return "loop stack is empty\n".to_string();
    }
    stack
        .frames()
        .iter()
        .enumerate()
        .fold(String::new(), |mut out, (depth, frame)| {
            let _ = writeln!(out, "{depth}: {frame}");
            out
        })
}

/// Return addresses from outermost to innermost.
#[must_use]
pub fn call_stack_listing(stack: &CallStack) -> String {
    format!("{:?}\n", stack.addresses())
}

/// Installed breakpoints in address order.
#[must_use]
pub fn breakpoint_list(engine: &BreakpointEngine) -> String {
    if engine.is_empty() {
        return "No breakpoints set.\n".to_string();
    }
    engine.entries().fold(String::new(), |mut out, entry| {
        let _ = writeln!(
            out,
            "Address: {}, stop at pass: {}, passed: {}",
            entry.addr, entry.passes, entry.passed
        );
        out
    })
}

/// Disassembly around `addr`.
///
/// Each row carries a `->` pc marker, an `x` for a breakpoint due on its
/// next arrival (`?` while passes remain), the address and the long form
/// indented by loop depth. Function and label names from the assembly
/// context are printed as headings.
#[must_use]
pub fn asm_window<I: Instruction>(
    sim: &Simulator<I>,
    addr: usize,
    before: usize,
    after: usize,
) -> String {
    let program = sim.program();
    let state = sim.state();
    let ctx = state.asm_context();
    let start = addr.saturating_sub(before);
    let end = addr.saturating_add(after).saturating_add(1).min(program.len());

    let mut out = String::new();
    for (index, insn) in program.iter().enumerate().take(end).skip(start) {
        if let Some(ctx) = ctx {
            if let Some(name) = ctx.functions.get(&index) {
                let _ = writeln!(out, "\nfunction {name}:");
            }
            if let Some(label) = ctx.labels.get(&index) {
                let _ = writeln!(out, "{label}:");
            }
        }
        let cursor = if index == state.pc() { " ->" } else { "   " };
        let mark = match state.breakpoints().get(index) {
            Some(bp) if bp.is_due() => " x ",
            Some(_) => " ? ",
            None => "   ",
        };
        let indent = "    ".repeat(ctx.map_or(0, |ctx| ctx.loop_depth(index)));
        let _ = writeln!(
            out,
            "{cursor}{mark}{index:04}: {indent}{}",
            insn.asm_text().long
        );
    }
    out
}
