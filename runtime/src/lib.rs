// Minimal runtime harness for executing a WebAssembly module's `main` export.

use core::fmt;

/// Result alias used by the runtime.
pub type Result<T> = core::result::Result<T, Error>;

/// Sentinel the original host contract collapses recoverable failures to.
pub const SENTINEL: i32 = -1;

/// Initial size of the shared linear memory, in 64 KiB pages.
pub const DEFAULT_MEMORY_PAGES: u32 = 100;

/// Failure cases for one run of a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The bytes did not compile or instantiate (malformed binary,
    /// unresolved or mistyped import).
    Instantiate(String),
    /// The instantiated module has no `main: () -> i32` export.
    NoMain,
    /// `main` trapped while running. Never collapsed to the sentinel.
    Trap(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Instantiate(msg) => {
                write!(f, "Error while instantiating WebAssembly: {msg}")
            }
            Error::NoMain => f.write_str("No main function found in the WebAssembly module."),
            Error::Trap(msg) => write!(f, "Error while running main: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Whether the original host would have reported this as the sentinel
    /// rather than aborting the run.
    pub fn collapses_to_sentinel(&self) -> bool {
        matches!(self, Error::Instantiate(_) | Error::NoMain)
    }
}

/// Host configuration handed to a runner constructor. One value per run
/// setup; nothing here is process-global.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostConfig {
    /// Initial page count of the memory exported to the module as `api.mem`.
    pub memory_pages: u32,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            memory_pages: DEFAULT_MEMORY_PAGES,
        }
    }
}

/// Destination for everything the module (or the harness on its behalf)
/// prints. Each host supplies its own sink; the engines never touch
/// stdout or the DOM directly.
pub trait LogSink {
    /// One line of module output.
    fn line(&mut self, text: &str);
    /// One line of host diagnostics.
    fn error(&mut self, text: &str);
}

/// Blocking one-character input capability backing `api.read-char`.
pub trait CharInput {
    /// Returns the next character code, or -1 when none is available.
    fn read_char(&mut self) -> i32;
}

pub mod api;
pub mod engines;
#[cfg(not(target_arch = "wasm32"))]
pub mod host;
