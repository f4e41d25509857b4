//! The import surface a module links against, shared verbatim by both
//! engine backends so a module behaves the same under either host.
//!
//! Everything lives in the single namespace [`NAMESPACE`]; a module may
//! import any subset of the names.

/// Import namespace the module must use.
pub const NAMESPACE: &str = "api";

/// `print(value)` — logs one numeric argument.
pub const PRINT: &str = "print";
/// `print-char(code)` — logs the character for a code point.
pub const PRINT_CHAR: &str = "print-char";
/// `mem` — the shared linear memory.
pub const MEM: &str = "mem";
/// `show-memory(index)` — logs the u32 at word offset `index` of `mem`.
pub const SHOW_MEMORY: &str = "show-memory";
/// `read-char()` — blocking one-character read, -1 when unavailable.
pub const READ_CHAR: &str = "read-char";

/// Export the module must provide.
pub const MAIN_EXPORT: &str = "main";

/// Text for a `print-char` call. Codes outside the scalar-value range
/// render as U+FFFD instead of trapping.
pub fn char_text(code: i32) -> String {
    char::from_u32(code as u32)
        .unwrap_or(char::REPLACEMENT_CHARACTER)
        .to_string()
}

/// Text for a `show-memory` call.
pub fn heap_line(index: u32, value: u32) -> String {
    format!("Heap[{index}] = {value}")
}

/// Text for a `show-memory` call whose index lies past the end of memory.
pub fn heap_out_of_range(index: u32) -> String {
    format!("Heap[{index}] is out of range")
}
