//! Textual debugger command grammar.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::{AsmContext, SimError};

/// Help listing for the debugger prompt.
pub const HELP_TEXT: &str = "\
h  - show this help message
c  - continue
s  - step into
n  - step over
o  - step out
ol - step out of loop
r  - print register file
rs - print special registers
ra - print all registers
d [len] [start] - print dmem words
f  - print flags
ls - print loop stack
cs - print call stack
a  - print assembly around current instruction
b <addr> [pass] - toggle breakpoint
lp - list breakpoints
dump <length> [filename] - dump dmem content to hex file
q  - quit";

/// Breakpoint location given as an address or a symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreakTarget {
    /// Instruction address.
    Address(usize),
    /// Function or label name.
    Symbol(String),
}

impl BreakTarget {
    /// Resolves the target to an instruction address.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidIdentifier`] when a symbol cannot be
    /// resolved, including when no assembly context is available.
    pub fn resolve(&self, ctx: Option<&AsmContext>) -> Result<usize, SimError> {
        match self {
            Self::Address(addr) => Ok(*addr),
            Self::Symbol(name) => ctx
                .and_then(|ctx| ctx.symbol_address(name))
                .ok_or_else(|| SimError::InvalidIdentifier(name.clone())),
        }
    }
}

impl fmt::Display for BreakTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(addr) => write!(f, "{addr}"),
            Self::Symbol(name) => f.write_str(name),
        }
    }
}

/// Decimal and `0x` hex parse as addresses; anything else is a symbol.
impl FromStr for BreakTarget {
    type Err = CommandParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(CommandParseError::Empty);
        }
        if s.bytes().all(|b| b.is_ascii_digit()) {
            return parse_number(s, "b").map(Self::Address);
        }
        if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            return usize::from_str_radix(hex, 16)
                .map(Self::Address)
                .map_err(|_| CommandParseError::InvalidArgument {
                    command: "b",
                    arg: s.to_string(),
                });
        }
        Ok(Self::Symbol(s.to_string()))
    }
}

/// One debugger command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebugCommand {
    /// `h`
    Help,
    /// `c`
    Continue,
    /// `s`
    Step,
    /// `n`
    StepOver,
    /// `o`
    StepOut,
    /// `ol`
    StepOutOfLoop,
    /// `r`
    PrintRegisters,
    /// `rs`
    PrintSpecialRegisters,
    /// `ra`
    PrintAllRegisters,
    /// `d [len] [start]`: `len` words from `start`; all of dmem without `len`.
    PrintDmem {
        /// Number of words, or everything.
        len: Option<usize>,
        /// First address.
        start: usize,
    },
    /// `f`
    PrintFlags,
    /// `ls`
    PrintLoopStack,
    /// `cs`
    PrintCallStack,
    /// `a`
    PrintAsm,
    /// `b [target] [passes]`; no target means the current pc.
    ToggleBreakpoint {
        /// Location, or the current pc.
        target: Option<BreakTarget>,
        /// Arrival on which to fire.
        passes: u32,
    },
    /// `lp`
    ListBreakpoints,
    /// `dump <len> [filename]`
    Dump {
        /// Number of words.
        len: usize,
        /// Output file, or the default dump file.
        filename: Option<String>,
    },
    /// `q`
    Quit,
}

impl DebugCommand {
    /// Returns `true` for commands that leave the prompt and resume execution.
    #[must_use]
    pub const fn resumes(&self) -> bool {
        matches!(
            self,
            Self::Continue | Self::Step | Self::StepOver | Self::StepOut | Self::StepOutOfLoop
        )
    }
}

/// Failure to parse a debugger command line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandParseError {
    /// Blank input.
    #[error("empty command")]
    Empty,
    /// Unrecognized command word.
    #[error("invalid command `{0}`")]
    Unknown(String),
    /// Argument that is not a valid number or symbol.
    #[error("invalid argument `{arg}` for `{command}`")]
    InvalidArgument {
        /// Command word.
        command: &'static str,
        /// Rejected argument.
        arg: String,
    },
    /// Too many or too few arguments.
    #[error("wrong number of arguments for `{0}`")]
    ArgumentCount(&'static str),
}

impl FromStr for DebugCommand {
    type Err = CommandParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let Some(head) = words.next() else {
            return Err(CommandParseError::Empty);
        };
        let args: Vec<&str> = words.collect();

        let bare = |command: Self, name: &'static str| {
            if args.is_empty() {
                Ok(command)
            } else {
                Err(CommandParseError::ArgumentCount(name))
            }
        };

        match head {
            "h" => bare(Self::Help, "h"),
            "c" => bare(Self::Continue, "c"),
            "s" => bare(Self::Step, "s"),
            "n" => bare(Self::StepOver, "n"),
            "o" => bare(Self::StepOut, "o"),
            "ol" => bare(Self::StepOutOfLoop, "ol"),
            "r" => bare(Self::PrintRegisters, "r"),
            "rs" => bare(Self::PrintSpecialRegisters, "rs"),
            "ra" => bare(Self::PrintAllRegisters, "ra"),
            "f" => bare(Self::PrintFlags, "f"),
            "ls" => bare(Self::PrintLoopStack, "ls"),
            "cs" => bare(Self::PrintCallStack, "cs"),
            "a" => bare(Self::PrintAsm, "a"),
            "lp" => bare(Self::ListBreakpoints, "lp"),
            "q" => bare(Self::Quit, "q"),
            "d" => match args.as_slice() {
                [] => Ok(Self::PrintDmem {
                    len: None,
                    start: 0,
                }),
                [len] => Ok(Self::PrintDmem {
                    len: Some(parse_number(len, "d")?),
                    start: 0,
                }),
                [len, start] => Ok(Self::PrintDmem {
                    len: Some(parse_number(len, "d")?),
                    start: parse_number(start, "d")?,
                }),
                _ => Err(CommandParseError::ArgumentCount("d")),
            },
            "b" => match args.as_slice() {
                [] => Ok(Self::ToggleBreakpoint {
                    target: None,
                    passes: 1,
                }),
                [target] => Ok(Self::ToggleBreakpoint {
                    target: Some(target.parse()?),
                    passes: 1,
                }),
                [target, passes] => Ok(Self::ToggleBreakpoint {
                    target: Some(target.parse()?),
                    passes: parse_number(passes, "b")?,
                }),
                _ => Err(CommandParseError::ArgumentCount("b")),
            },
            "dump" => match args.as_slice() {
                [len] => Ok(Self::Dump {
                    len: parse_number(len, "dump")?,
                    filename: None,
                }),
                [len, filename] => Ok(Self::Dump {
                    len: parse_number(len, "dump")?,
                    filename: Some((*filename).to_string()),
                }),
                _ => Err(CommandParseError::ArgumentCount("dump")),
            },
            other => Err(CommandParseError::Unknown(other.to_string())),
        }
    }
}

fn parse_number<T: FromStr>(arg: &str, command: &'static str) -> Result<T, CommandParseError> {
    if !arg.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CommandParseError::InvalidArgument {
            command,
            arg: arg.to_string(),
        });
    }
    arg.parse().map_err(|_| CommandParseError::InvalidArgument {
        command,
        arg: arg.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{BreakTarget, CommandParseError, DebugCommand};
    use crate::{AsmContext, SimError};

    #[rstest]
    #[case("c", DebugCommand::Continue)]
    #[case(" s ", DebugCommand::Step)]
    #[case("n", DebugCommand::StepOver)]
    #[case("o", DebugCommand::StepOut)]
    #[case("ol", DebugCommand::StepOutOfLoop)]
    #[case("ra", DebugCommand::PrintAllRegisters)]
    #[case("d", DebugCommand::PrintDmem { len: None, start: 0 })]
    #[case("d 4", DebugCommand::PrintDmem { len: Some(4), start: 0 })]
    #[case("d 4 8", DebugCommand::PrintDmem { len: Some(4), start: 8 })]
    #[case("b", DebugCommand::ToggleBreakpoint { target: None, passes: 1 })]
    #[case("b 0x10 3", DebugCommand::ToggleBreakpoint {
        target: Some(BreakTarget::Address(16)),
        passes: 3,
    })]
    #[case("b modexp", DebugCommand::ToggleBreakpoint {
        target: Some(BreakTarget::Symbol("modexp".into())),
        passes: 1,
    })]
    #[case("dump 16", DebugCommand::Dump { len: 16, filename: None })]
    #[case("dump 16 out.hex", DebugCommand::Dump { len: 16, filename: Some("out.hex".into()) })]
    #[case("q", DebugCommand::Quit)]
    fn valid_commands_parse(#[case] input: &str, #[case] expected: DebugCommand) {
        assert_eq!(input.parse::<DebugCommand>(), Ok(expected));
    }

    #[rstest]
    #[case("", CommandParseError::Empty)]
    #[case("x", CommandParseError::Unknown("x".into()))]
    #[case("c now", CommandParseError::ArgumentCount("c"))]
    #[case("d a", CommandParseError::InvalidArgument { command: "d", arg: "a".into() })]
    #[case("d 1 2 3", CommandParseError::ArgumentCount("d"))]
    #[case("b 3 x", CommandParseError::InvalidArgument { command: "b", arg: "x".into() })]
    #[case("b 0xzz", CommandParseError::InvalidArgument { command: "b", arg: "0xzz".into() })]
    #[case("dump", CommandParseError::ArgumentCount("dump"))]
    #[case("dump -1", CommandParseError::InvalidArgument { command: "dump", arg: "-1".into() })]
    fn invalid_commands_are_rejected(#[case] input: &str, #[case] expected: CommandParseError) {
        assert_eq!(input.parse::<DebugCommand>(), Err(expected));
    }

    #[test]
    fn symbol_targets_need_an_assembly_context() {
        let target = BreakTarget::Symbol("loop_body".into());
        assert_eq!(
            target.resolve(None),
            Err(SimError::InvalidIdentifier("loop_body".into()))
        );

        let ctx = AsmContext {
            labels: [(6, "loop_body".to_string())].into(),
            ..AsmContext::default()
        };
        assert_eq!(target.resolve(Some(&ctx)), Ok(6));
        assert_eq!(BreakTarget::Address(3).resolve(None), Ok(3));
    }

    #[test]
    fn only_resume_commands_leave_the_prompt() {
        assert!(DebugCommand::StepOver.resumes());
        assert!(!DebugCommand::PrintFlags.resumes());
        assert!(!DebugCommand::Quit.resumes());
    }
}
