//! Host execution backends, one per platform.

#[cfg(all(feature = "engine-wasmtime", not(target_arch = "wasm32")))]
pub mod native;
#[cfg(target_arch = "wasm32")]
pub mod browser;
