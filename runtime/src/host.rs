//! Capability providers for command-line hosts, plus the in-memory
//! doubles the tests run against.

use crate::{CharInput, LogSink};
use std::collections::VecDeque;
use std::io::Read;

/// Module output to stdout, diagnostics to stderr.
pub struct StdioLog;

impl LogSink for StdioLog {
    fn line(&mut self, text: &str) {
        println!("{text}");
    }

    fn error(&mut self, text: &str) {
        eprintln!("{text}");
    }
}

/// Blocking single-byte reads from stdin.
pub struct StdinInput;

impl CharInput for StdinInput {
    fn read_char(&mut self) -> i32 {
        let mut byte = [0u8; 1];
        match std::io::stdin().read(&mut byte) {
            Ok(1) => i32::from(byte[0]),
            _ => -1,
        }
    }
}

/// Records every log line in memory.
#[derive(Default)]
pub struct CaptureLog {
    lines: Vec<String>,
    errors: Vec<String>,
}

impl CaptureLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Module output recorded so far.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Diagnostics recorded so far.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

impl LogSink for CaptureLog {
    fn line(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }

    fn error(&mut self, text: &str) {
        self.errors.push(text.to_string());
    }
}

/// Serves a fixed sequence of character codes, then -1.
pub struct ScriptedInput {
    pending: VecDeque<i32>,
}

impl ScriptedInput {
    pub fn new(codes: impl IntoIterator<Item = i32>) -> Self {
        Self {
            pending: codes.into_iter().collect(),
        }
    }
}

impl CharInput for ScriptedInput {
    fn read_char(&mut self) -> i32 {
        self.pending.pop_front().unwrap_or(-1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_log_keeps_output_and_diagnostics_apart() {
        let mut log = CaptureLog::new();
        log.line("42");
        log.error("boom");
        assert_eq!(log.lines(), ["42"]);
        assert_eq!(log.errors(), ["boom"]);
    }

    #[test]
    fn scripted_input_drains_then_reports_eof() {
        let mut input = ScriptedInput::new([104, 105]);
        assert_eq!(input.read_char(), 104);
        assert_eq!(input.read_char(), 105);
        assert_eq!(input.read_char(), -1);
    }
}
