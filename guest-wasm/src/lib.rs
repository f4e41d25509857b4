#![cfg_attr(target_arch = "wasm32", no_std)]

//! Smoke-test payload for the harness: prints "Hi" through the `api`
//! imports and returns 42. Build with `--target wasm32-unknown-unknown`
//! and feed the resulting .wasm to wasm-host or the browser page.

#[cfg(target_arch = "wasm32")]
#[link(wasm_import_module = "api")]
extern "C" {
    fn print(value: i32);
    #[link_name = "print-char"]
    fn print_char(code: i32);
}

#[cfg(target_arch = "wasm32")]
#[no_mangle]
pub extern "C" fn main() -> i32 {
    unsafe {
        print_char('H' as i32);
        print_char('i' as i32);
        print(42);
    }
    42
}

/// Abort-on-panic for no_std wasm builds.
#[cfg_attr(all(not(test), target_arch = "wasm32"), panic_handler)]
fn panic(_: &core::panic::PanicInfo) -> ! {
    loop {}
}
