#![cfg(not(target_arch = "wasm32"))]

use runtime::engines::native::{Runner, SharedLog};
use runtime::host::{CaptureLog, ScriptedInput};
use runtime::{CharInput, Error, HostConfig, SENTINEL};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

fn harness(input: impl CharInput + Send + 'static) -> (Runner, Arc<Mutex<CaptureLog>>) {
    let capture = Arc::new(Mutex::new(CaptureLog::new()));
    let log: SharedLog = capture.clone();
    let runner = Runner::new(HostConfig::default(), log, Arc::new(Mutex::new(input)))
        .expect("engine setup");
    (runner, capture)
}

fn module(wat: &str) -> Vec<u8> {
    wat::parse_str(wat).expect("fixture wat")
}

#[test]
fn invalid_bytes_are_an_instantiation_error() {
    let (mut runner, capture) = harness(ScriptedInput::new([]));

    assert!(matches!(
        runner.run(b"definitely not wasm"),
        Err(Error::Instantiate(_))
    ));

    assert_eq!(
        runner.run_or_sentinel(b"definitely not wasm"),
        Ok(SENTINEL)
    );
    let capture = capture.lock().unwrap();
    assert!(capture.errors()[0].contains("instantiating"));
    assert!(capture.lines().is_empty());
}

#[test]
fn missing_main_is_a_contract_error() {
    let (mut runner, capture) = harness(ScriptedInput::new([]));
    let bytes = module(r#"(module (func (export "start")))"#);

    assert_eq!(runner.run(&bytes), Err(Error::NoMain));
    assert_eq!(runner.run_or_sentinel(&bytes), Ok(SENTINEL));
    assert!(capture.lock().unwrap().errors()[0].contains("No main function"));
}

#[test]
fn wrongly_typed_main_counts_as_missing() {
    let (mut runner, _) = harness(ScriptedInput::new([]));
    let bytes = module(r#"(module (func (export "main")))"#);

    assert_eq!(runner.run(&bytes), Err(Error::NoMain));
}

#[test]
fn main_return_value_propagates_exactly() {
    let (mut runner, _) = harness(ScriptedInput::new([]));
    let bytes = module(r#"(module (func (export "main") (result i32) i32.const 42))"#);

    assert_eq!(runner.run(&bytes), Ok(42));
}

#[test]
fn legitimate_sentinel_return_is_not_an_error() {
    let (mut runner, capture) = harness(ScriptedInput::new([]));
    let bytes = module(r#"(module (func (export "main") (result i32) i32.const -1))"#);

    assert_eq!(runner.run_or_sentinel(&bytes), Ok(SENTINEL));
    assert!(capture.lock().unwrap().errors().is_empty());
}

#[test]
fn print_and_print_char_reach_the_log_sink() {
    let (mut runner, capture) = harness(ScriptedInput::new([]));
    let bytes = module(
        r#"
        (module
          (import "api" "print" (func $print (param i32)))
          (import "api" "print-char" (func $print_char (param i32)))
          (func (export "main") (result i32)
            (call $print (i32.const 7))
            (call $print_char (i32.const 65))
            (i32.const 0)))
        "#,
    );

    assert_eq!(runner.run(&bytes), Ok(0));
    assert_eq!(capture.lock().unwrap().lines(), ["7", "A"]);
}

#[test]
fn show_memory_reports_the_word_the_module_wrote() {
    let (mut runner, capture) = harness(ScriptedInput::new([]));
    let bytes = module(
        r#"
        (module
          (import "api" "mem" (memory 1))
          (import "api" "show-memory" (func $show (param i32)))
          (func (export "main") (result i32)
            (i32.store (i32.const 4) (i32.const 258))
            (call $show (i32.const 1))
            (i32.const 0)))
        "#,
    );

    assert_eq!(runner.run(&bytes), Ok(0));
    assert_eq!(capture.lock().unwrap().lines(), ["Heap[1] = 258"]);
}

#[test]
fn show_memory_flags_an_out_of_range_index() {
    let (mut runner, capture) = harness(ScriptedInput::new([]));
    let bytes = module(
        r#"
        (module
          (import "api" "show-memory" (func $show (param i32)))
          (func (export "main") (result i32)
            (call $show (i32.const 10000000))
            (i32.const 0)))
        "#,
    );

    assert_eq!(runner.run(&bytes), Ok(0));
    assert_eq!(
        capture.lock().unwrap().lines(),
        ["Heap[10000000] is out of range"]
    );
}

#[test]
fn show_memory_survives_a_huge_index() {
    let (mut runner, capture) = harness(ScriptedInput::new([]));
    let bytes = module(
        r#"
        (module
          (import "api" "show-memory" (func $show (param i32)))
          (func (export "main") (result i32)
            (call $show (i32.const 1073741824))
            (i32.const 0)))
        "#,
    );

    assert_eq!(runner.run(&bytes), Ok(0));
    assert_eq!(
        capture.lock().unwrap().lines(),
        ["Heap[1073741824] is out of range"]
    );
}

#[test]
fn read_char_pulls_from_the_injected_input() {
    let (mut runner, _) = harness(ScriptedInput::new([104]));
    let bytes = module(
        r#"
        (module
          (import "api" "read-char" (func $read (result i32)))
          (func (export "main") (result i32) (call $read)))
        "#,
    );

    assert_eq!(runner.run(&bytes), Ok(104));
}

#[test]
fn exhausted_input_reads_as_minus_one() {
    let (mut runner, _) = harness(ScriptedInput::new([]));
    let bytes = module(
        r#"
        (module
          (import "api" "read-char" (func $read (result i32)))
          (func (export "main") (result i32) (call $read)))
        "#,
    );

    assert_eq!(runner.run(&bytes), Ok(-1));
}

#[test]
fn a_trap_stays_an_error_even_under_the_sentinel_contract() {
    let (mut runner, capture) = harness(ScriptedInput::new([]));
    let bytes = module(r#"(module (func (export "main") (result i32) unreachable))"#);

    assert!(matches!(runner.run(&bytes), Err(Error::Trap(_))));
    assert!(matches!(runner.run_or_sentinel(&bytes), Err(Error::Trap(_))));
    assert!(capture.lock().unwrap().errors().is_empty());
}

#[test]
fn pause_hook_fires_before_main() {
    let fired = Arc::new(AtomicBool::new(false));
    let seen = fired.clone();
    let (runner, _) = harness(ScriptedInput::new([]));
    let mut runner = runner.with_pause_hook(move || seen.store(true, Ordering::SeqCst));
    let bytes = module(r#"(module (func (export "main") (result i32) i32.const 1))"#);

    assert_eq!(runner.run(&bytes), Ok(1));
    assert!(fired.load(Ordering::SeqCst));
}

#[test]
fn independent_runners_do_not_share_state() {
    let (mut first, first_log) = harness(ScriptedInput::new([]));
    let (mut second, second_log) = harness(ScriptedInput::new([]));
    let bytes = module(
        r#"
        (module
          (import "api" "print" (func $print (param i32)))
          (func (export "main") (result i32)
            (call $print (i32.const 9))
            (i32.const 0)))
        "#,
    );

    assert_eq!(first.run(&bytes), Ok(0));
    assert_eq!(second.run(&bytes), Ok(0));
    assert_eq!(first_log.lock().unwrap().lines(), ["9"]);
    assert_eq!(second_log.lock().unwrap().lines(), ["9"]);
}
