//! Execution statistics collected while a program runs.

use std::collections::BTreeMap;

use crate::{AsmContext, FlagGroup};

/// One executed call.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct FuncCall {
    /// Address of the call instruction.
    pub call_site: usize,
    /// Entry of the function containing the call site, when known.
    pub caller_func: Option<usize>,
    /// Entry of the called function.
    pub callee_func: usize,
}

/// One loop entry.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct LoopRecord {
    /// Address of the loop instruction.
    pub loop_addr: usize,
    /// Body length in instructions.
    pub loop_len: usize,
    /// Loop-stack depth after the frame was pushed.
    pub new_loop_stack_depth: usize,
    /// Iteration count.
    pub iterations: u32,
}

/// One wide load/store with its pointer-increment options.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct WideMemOp {
    /// Operation mnemonic.
    pub op: String,
    /// Source pointer was incremented.
    pub inc_src: bool,
    /// Destination pointer was incremented.
    pub inc_dst: bool,
}

/// One explicit flag read or write.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct FlagAccess {
    /// Flag group touched.
    pub group: FlagGroup,
    /// Accessing operation.
    pub op: String,
}

/// Aggregated run statistics. Survives [`Simulator::reset`](crate::Simulator::reset).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Stats {
    /// Executions per mnemonic.
    pub instruction_histo: BTreeMap<String, u64>,
    /// Calls in execution order.
    pub func_calls: Vec<FuncCall>,
    /// Loop entries in execution order.
    pub loops: Vec<LoopRecord>,
    /// Move-immediate executions per immediate size in bits.
    pub movi: BTreeMap<u32, u64>,
    /// Wide memory operations in execution order.
    pub wide_mem_ops: Vec<WideMemOp>,
    /// Flag accesses in execution order.
    pub flag_access: Vec<FlagAccess>,
    /// Sum of cycle costs of fetched instructions.
    pub total_cycles: u64,
    /// Number of fetched instructions.
    pub instructions: u64,
}

impl Stats {
    /// Counts one fetched instruction under the first token of its long
    /// assembly form.
    pub fn record_instruction(&mut self, long_form: &str, cycles: u32) {
        let mnemonic = long_form.split_whitespace().next().unwrap_or_default();
        *self
            .instruction_histo
            .entry(mnemonic.to_string())
            .or_default() += 1;
        self.total_cycles = self.total_cycles.saturating_add(u64::from(cycles));
        self.instructions = self.instructions.saturating_add(1);
    }

    /// Records a call, resolving the caller through `ctx` when available.
    pub fn record_func_call(&mut self, call_site: usize, callee_func: usize, ctx: Option<&AsmContext>) {
        self.func_calls.push(FuncCall {
            call_site,
            caller_func: ctx.and_then(|ctx| ctx.function_containing(call_site)),
            callee_func,
        });
    }

    /// Records a loop entry.
    pub fn record_loop(&mut self, record: LoopRecord) {
        self.loops.push(record);
    }

    /// Records a move-immediate of `imm_size` bits.
    pub fn record_movi(&mut self, imm_size: u32) {
        *self.movi.entry(imm_size).or_default() += 1;
    }

    /// Records a wide memory operation.
    pub fn record_wide_mem_op(&mut self, op: &str, inc_src: bool, inc_dst: bool) {
        self.wide_mem_ops.push(WideMemOp {
            op: op.to_string(),
            inc_src,
            inc_dst,
        });
    }

    /// Records a flag access.
    pub fn record_flag_access(&mut self, group: FlagGroup, op: &str) {
        self.flag_access.push(FlagAccess {
            group,
            op: op.to_string(),
        });
    }
}
