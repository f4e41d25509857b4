//! Page glue for the browser host: wires the `#run` button and `#file`
//! picker to the browser engine and mirrors module output into `#log`.

#![cfg(target_arch = "wasm32")]

use js_sys::Uint8Array;
use runtime::engines::browser::{run_or_sentinel, SharedInput, SharedLog};
use runtime::{CharInput, HostConfig, LogSink};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{console, Document, Element, HtmlInputElement};

/// Log sink that writes to the console and appends each line to the page's
/// log element as a text node followed by a line break.
struct PageLog {
    document: Document,
    target: Element,
}

impl LogSink for PageLog {
    fn line(&mut self, text: &str) {
        console::log_1(&text.into());
        let _ = self.target.append_child(&self.document.create_text_node(text));
        if let Ok(br) = self.document.create_element("br") {
            let _ = self.target.append_child(&br);
        }
    }

    fn error(&mut self, text: &str) {
        console::error_1(&text.into());
    }
}

/// The browser has no synchronous character source.
struct NoInput;

impl CharInput for NoInput {
    fn read_char(&mut self) -> i32 {
        console::error_1(&"read-char not implemented in browser".into());
        -1
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let run_btn = element(&document, "run")?;
    let file_input: HtmlInputElement = element(&document, "file")?
        .dyn_into()
        .map_err(|_| JsValue::from_str("#file is not a file input"))?;
    let log_el = element(&document, "log")?;

    let onclick = Closure::<dyn FnMut()>::new(move || {
        let file = file_input.files().and_then(|files| files.get(0));
        let Some(file) = file else {
            console::error_1(&"No file given".into());
            return;
        };
        console::log_1(&format!("File given ({}). Reading it…", file.name()).into());

        let log: SharedLog = Rc::new(RefCell::new(PageLog {
            document: document.clone(),
            target: log_el.clone(),
        }));
        let input: SharedInput = Rc::new(RefCell::new(NoInput));
        spawn_local(async move {
            let buffer = match JsFuture::from(file.array_buffer()).await {
                Ok(buffer) => buffer,
                Err(err) => {
                    console::error_1(&err);
                    return;
                }
            };
            let bytes = Uint8Array::new(&buffer).to_vec();
            match run_or_sentinel(&bytes, &HostConfig::default(), log.clone(), input).await {
                Ok(value) => log.borrow_mut().line(&format!("WASM returned: {value}")),
                Err(err) => log.borrow_mut().error(&err.to_string()),
            }
        });
    });
    run_btn.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
    onclick.forget();

    Ok(())
}

fn element(document: &Document, id: &str) -> Result<Element, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("no #{id} element")))
}
