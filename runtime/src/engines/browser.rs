//! Browser runner on top of the host's `WebAssembly` namespace.
//!
//! Import shim closures are handed to the instance for its whole
//! lifetime, so they are intentionally leaked with `Closure::forget`.

use crate::{api, CharInput, Error, HostConfig, LogSink, Result, SENTINEL};
use js_sys::{Function, Object, Reflect, Uint32Array, WebAssembly};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

/// Log sink shared between the host page and the import shim closures.
pub type SharedLog = Rc<RefCell<dyn LogSink>>;
/// Character input shared the same way.
pub type SharedInput = Rc<RefCell<dyn CharInput>>;

/// Instantiates `bytes` against the `api` import shim and invokes `main`.
pub async fn run(
    bytes: &[u8],
    config: &HostConfig,
    log: SharedLog,
    input: SharedInput,
) -> Result<i32> {
    let imports = build_imports(config, &log, &input)?;

    let promise = WebAssembly::instantiate_buffer(bytes, &imports);
    let resolved = JsFuture::from(promise)
        .await
        .map_err(|e| Error::Instantiate(js_text(&e)))?;
    let instance: WebAssembly::Instance = Reflect::get(&resolved, &"instance".into())
        .map_err(|e| Error::Instantiate(js_text(&e)))?
        .dyn_into()
        .map_err(|e| Error::Instantiate(js_text(&e)))?;

    let main = Reflect::get(&instance.exports(), &api::MAIN_EXPORT.into())
        .map_err(|_| Error::NoMain)?;
    if main.is_undefined() {
        return Err(Error::NoMain);
    }
    let main: Function = main.dyn_into().map_err(|_| Error::NoMain)?;

    let value = main
        .call0(&JsValue::NULL)
        .map_err(|e| Error::Trap(js_text(&e)))?;
    // A main that returns nothing surfaces as undefined; report it as 0.
    Ok(value.as_f64().map_or(0, |v| v as i32))
}

/// Like [`run`], but reproduces the original host contract: instantiation
/// and missing-main failures are logged and collapse to the sentinel.
pub async fn run_or_sentinel(
    bytes: &[u8],
    config: &HostConfig,
    log: SharedLog,
    input: SharedInput,
) -> Result<i32> {
    match run(bytes, config, log.clone(), input).await {
        Ok(value) => Ok(value),
        Err(err) if err.collapses_to_sentinel() => {
            log.borrow_mut().error(&err.to_string());
            Ok(SENTINEL)
        }
        Err(err) => Err(err),
    }
}

/// Builds `{ api: { print, print-char, mem, show-memory, read-char } }`.
fn build_imports(config: &HostConfig, log: &SharedLog, input: &SharedInput) -> Result<Object> {
    let shim = Object::new();

    let descriptor = Object::new();
    set(&descriptor, "initial", &config.memory_pages.into())?;
    let memory =
        WebAssembly::Memory::new(&descriptor).map_err(|e| Error::Instantiate(js_text(&e)))?;
    set(&shim, api::MEM, memory.as_ref())?;

    let sink = log.clone();
    let print = Closure::<dyn FnMut(i32)>::new(move |value: i32| {
        sink.borrow_mut().line(&value.to_string());
    });
    set(&shim, api::PRINT, print.as_ref())?;
    print.forget();

    let sink = log.clone();
    let print_char = Closure::<dyn FnMut(i32)>::new(move |code: i32| {
        sink.borrow_mut().line(&api::char_text(code));
    });
    set(&shim, api::PRINT_CHAR, print_char.as_ref())?;
    print_char.forget();

    let sink = log.clone();
    let show_memory = Closure::<dyn FnMut(i32)>::new(move |index: i32| {
        let index = index as u32;
        let words = Uint32Array::new(&memory.buffer());
        let text = if index < words.length() {
            api::heap_line(index, words.get_index(index))
        } else {
            api::heap_out_of_range(index)
        };
        sink.borrow_mut().line(&text);
    });
    set(&shim, api::SHOW_MEMORY, show_memory.as_ref())?;
    show_memory.forget();

    let source = input.clone();
    let read_char =
        Closure::<dyn FnMut() -> i32>::new(move || -> i32 { source.borrow_mut().read_char() });
    set(&shim, api::READ_CHAR, read_char.as_ref())?;
    read_char.forget();

    let imports = Object::new();
    set(&imports, api::NAMESPACE, shim.as_ref())?;
    Ok(imports)
}

fn set(target: &Object, key: &str, value: &JsValue) -> Result<()> {
    Reflect::set(target, &key.into(), value)
        .map(|_| ())
        .map_err(|e| Error::Instantiate(js_text(&e)))
}

fn js_text(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}
