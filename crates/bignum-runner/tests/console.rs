//! Scripted debugger sessions against the console driver.

mod common;

use std::io::Cursor;

use bignum_core::Word;
use bignum_runner::{RunExit, RunReport, Runner, RunnerConfig, PROMPT};
use common::{install, square_sim, square_sim_breaking_at, Op};
use rstest::rstest;
use serde as _;
use serde_json as _;
use tempfile as _;
use thiserror as _;
use tracing as _;

fn session(runner: &mut Runner<Op>, script: &str) -> (RunReport, String) {
    let mut input = Cursor::new(script.as_bytes().to_vec());
    let mut output = Vec::new();
    let report = runner.run(&mut input, &mut output).expect("run succeeds");
    (report, String::from_utf8(output).expect("utf-8 console output"))
}

fn interactive(addr: usize) -> Runner<Op> {
    Runner::new(square_sim_breaking_at(addr), RunnerConfig::default())
}

#[test]
fn break_prints_banner_and_window_then_continues() {
    let mut runner = interactive(5);
    let (report, output) = session(&mut runner, "r\nc\nc\n");

    assert_eq!(output.matches("Breakpoint hit at address 5.").count(), 2);
    assert!(output.contains(" -> x 0005:     nop"), "{output}");
    assert!(output.contains("function square:"), "{output}");
    assert!(output.contains("body:"), "{output}");
    assert!(output.contains(PROMPT));
    assert!(output.contains(" r0: "));
    assert_eq!(report.exit, RunExit::Halted);
    assert_eq!(report.steps, 7);
    assert!(report.finished);
}

#[test]
fn step_into_breaks_at_each_instruction() {
    let mut runner = interactive(1);
    let (report, output) = session(&mut runner, "s\ns\nc\n");

    let banners: Vec<&str> = output
        .lines()
        .filter(|line| line.starts_with("Breakpoint hit"))
        .collect();
    assert_eq!(
        banners,
        [
            "Breakpoint hit at address 1.",
            "Breakpoint hit at address 4.",
            "Breakpoint hit at address 5."
        ]
    );
    assert_eq!(report.steps, 7);
}

#[test]
fn step_over_skips_the_called_function() {
    let mut runner = interactive(1);
    let (_, output) = session(&mut runner, "n\nc\n");
    assert!(output.contains("Breakpoint hit at address 2."), "{output}");
    assert!(!output.contains("Breakpoint hit at address 4."));
}

#[test]
fn step_out_returns_to_the_caller() {
    let mut runner = interactive(4);
    let (report, output) = session(&mut runner, "o\nc\n");
    assert!(output.contains("Breakpoint hit at address 2."), "{output}");
    assert_eq!(report.exit, RunExit::Halted);
}

#[test]
fn step_out_of_loop_stops_after_the_body() {
    let mut runner = interactive(4);
    let (_, output) = session(&mut runner, "s\nol\nc\n");
    assert!(output.contains("Breakpoint hit at address 5."), "{output}");
    assert!(output.contains("Breakpoint hit at address 6."), "{output}");
}

#[rstest]
#[case("o", "Nothing on call stack, can't \"step out\".")]
#[case("ol", "Nothing on loop stack, can't \"step out\".")]
fn step_out_without_frames_keeps_prompting(#[case] command: &str, #[case] message: &str) {
    let mut runner = interactive(0);
    let (report, output) = session(&mut runner, &format!("{command}\nc\n"));

    assert!(output.contains(message), "{output}");
    assert_eq!(output.matches(PROMPT).count(), 2);
    assert_eq!(report.exit, RunExit::Halted);
}

#[test]
fn quit_stops_before_the_broken_instruction() {
    let mut runner = interactive(1);
    let (report, _) = session(&mut runner, "q\n");

    assert_eq!(report.exit, RunExit::Quit);
    assert_eq!(report.steps, 1);
    assert!(!report.finished);
    assert_eq!(runner.simulator().pc(), 1);
}

#[test]
fn closed_console_counts_as_quit() {
    let mut runner = interactive(1);
    let (report, output) = session(&mut runner, "");
    assert_eq!(report.exit, RunExit::Quit);
    assert!(output.ends_with(&format!("{PROMPT}\n")));
}

#[test]
fn bad_input_is_reported_and_ignored() {
    let mut runner = interactive(0);
    let (report, output) = session(&mut runner, "zz\n\nd x\nc\n");

    assert!(output.contains("Invalid command: invalid command `zz`"), "{output}");
    assert!(output.contains("Invalid command: invalid argument `x` for `d`"));
    assert_eq!(report.exit, RunExit::Halted);
}

#[test]
fn breakpoints_toggle_and_list_from_the_prompt() {
    let mut runner = interactive(0);
    let (_, output) = session(&mut runner, "b 3\nlp\nb 3\nb nowhere\nc\n");

    assert!(output.contains("Breakpoint set at address 3"));
    assert!(output.contains("Address: 0, stop at pass: 1, passed: 0"));
    assert!(output.contains("Address: 3, stop at pass: 1, passed: 0"));
    assert!(output.contains("Breakpoint deleted at address 3"));
    assert!(output.contains("Cannot toggle breakpoint: invalid identifier `nowhere`"));
}

#[test]
fn symbolic_breakpoint_stops_at_function_entry() {
    let mut runner = interactive(0);
    let (_, output) = session(&mut runner, "b square\nc\nc\n");
    assert!(output.contains("Breakpoint set at address 4"));
    assert!(output.contains("Breakpoint hit at address 4."), "{output}");
}

#[test]
fn print_commands_render_state() {
    let mut runner = interactive(5);
    let (_, output) = session(&mut runner, "f\nls\ncs\nrs\nd 2\nh\nc\nc\n");

    assert!(output.contains("|C|Z|M|L|  |XC|XZ|XM|XL|"));
    assert!(output.contains("0: remaining=1 start=5 end=5"));
    assert!(output.contains("[2]"));
    assert!(output.contains("mod: "));
    assert!(output.contains(&format!("   0: {} ", Word::from(7_u32))), "{output}");
    assert!(output.contains("dump <length> [filename]"));
}

#[test]
fn batch_mode_runs_through_breakpoints() {
    let mut sim = square_sim(&[]);
    install(&mut sim, 5);
    let mut runner = Runner::new(sim, RunnerConfig::batch());

    let (report, output) = session(&mut runner, "");

    assert!(output.is_empty());
    assert_eq!(report.steps, 7);
    assert_eq!(report.cycles, 14);
    assert_eq!(report.traces.first().map(String::as_str), Some("dmem[0] = 7"));
    assert_eq!(report.traces.last().map(String::as_str), Some("ret (finish)"));
    assert_eq!(runner.simulator().state().diag().breaks, 2);
}
