//! Optional symbolic context produced by an assembler.

use std::collections::BTreeMap;
use std::ops::Range;

/// Function names, labels and loop bodies of an assembled program.
///
/// Only used for symbolic breakpoints, disassembly listings and call
/// statistics; execution never depends on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AsmContext {
    /// Function entry address to function name.
    pub functions: BTreeMap<usize, String>,
    /// Label address to label name.
    pub labels: BTreeMap<usize, String>,
    /// Address ranges of loop bodies.
    pub loop_ranges: Vec<Range<usize>>,
}

impl AsmContext {
    /// Resolves a function or label name. Functions win over labels.
    #[must_use]
    pub fn symbol_address(&self, name: &str) -> Option<usize> {
        find_name(&self.functions, name).or_else(|| find_name(&self.labels, name))
    }

    /// Entry address of the nearest function starting at or before `pc`.
    #[must_use]
    pub fn function_containing(&self, pc: usize) -> Option<usize> {
        self.functions.range(..=pc).next_back().map(|(addr, _)| *addr)
    }

    /// Number of loop bodies enclosing `addr`.
    #[must_use]
    pub fn loop_depth(&self, addr: usize) -> usize {
        self.loop_ranges
            .iter()
            .filter(|range| range.contains(&addr))
            .count()
    }
}

fn find_name(table: &BTreeMap<usize, String>, name: &str) -> Option<usize> {
    table
        .iter()
        .find(|(_, candidate)| candidate.as_str() == name)
        .map(|(addr, _)| *addr)
}
