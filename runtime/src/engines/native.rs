//! wasmtime-backed runner for command-line hosts.

use crate::{api, CharInput, Error, HostConfig, LogSink, Result, SENTINEL};
use std::sync::{Arc, Mutex, PoisonError};
use wasmtime::{Caller, Config, Engine, Linker, Memory, MemoryType, Module, Store};

/// Log sink shared between the host and the import shim closures.
pub type SharedLog = Arc<Mutex<dyn LogSink + Send>>;
/// Character input shared the same way.
pub type SharedInput = Arc<Mutex<dyn CharInput + Send>>;

/// Runs compiled modules against the `api` import shim.
///
/// Holds no state across runs beyond its configuration and capability
/// providers, so independent runners never contaminate each other.
pub struct Runner {
    engine: Engine,
    config: HostConfig,
    log: SharedLog,
    input: SharedInput,
    pause: Option<Box<dyn FnOnce()>>,
}

impl Runner {
    /// Creates a runner from a configuration and its capability providers.
    pub fn new(config: HostConfig, log: SharedLog, input: SharedInput) -> Result<Self> {
        let mut wt_config = Config::new();
        wt_config.cranelift_opt_level(wasmtime::OptLevel::Speed);
        let engine =
            Engine::new(&wt_config).map_err(|e| Error::Instantiate(format!("engine setup: {e}")))?;
        Ok(Self {
            engine,
            config,
            log,
            input,
            pause: None,
        })
    }

    /// Installs a hook fired once, right before the first `main` call.
    /// The CLI uses this to wait for a debugger to attach.
    pub fn with_pause_hook(mut self, hook: impl FnOnce() + 'static) -> Self {
        self.pause = Some(Box::new(hook));
        self
    }

    /// Instantiates `bytes` against the import shim and invokes `main`.
    pub fn run(&mut self, bytes: &[u8]) -> Result<i32> {
        let module = Module::from_binary(&self.engine, bytes)
            .map_err(|e| Error::Instantiate(e.to_string()))?;

        let mut store: Store<()> = Store::new(&self.engine, ());
        let linker = self.link_api(&mut store)?;

        let instance = linker
            .instantiate(&mut store, &module)
            .map_err(|e| Error::Instantiate(e.to_string()))?;
        let main = instance
            .get_func(&mut store, api::MAIN_EXPORT)
            .ok_or(Error::NoMain)?
            .typed::<(), i32>(&store)
            .map_err(|_| Error::NoMain)?;

        if let Some(pause) = self.pause.take() {
            pause();
        }

        main.call(&mut store, ())
            .map_err(|e| Error::Trap(e.to_string()))
    }

    /// Like [`run`](Self::run), but reproduces the original host contract:
    /// instantiation and missing-main failures are logged and collapse to
    /// the sentinel. Traps stay errors.
    pub fn run_or_sentinel(&mut self, bytes: &[u8]) -> Result<i32> {
        match self.run(bytes) {
            Ok(value) => Ok(value),
            Err(err) if err.collapses_to_sentinel() => {
                lock(&self.log).error(&err.to_string());
                Ok(SENTINEL)
            }
            Err(err) => Err(err),
        }
    }

    /// Builds the `api` namespace: the shared memory plus the four host
    /// functions, all routed through the injected providers.
    fn link_api(&self, store: &mut Store<()>) -> Result<Linker<()>> {
        let memory = Memory::new(&mut *store, MemoryType::new(self.config.memory_pages, None))
            .map_err(|e| Error::Instantiate(e.to_string()))?;

        let mut linker: Linker<()> = Linker::new(&self.engine);
        linker
            .define(&*store, api::NAMESPACE, api::MEM, memory)
            .map_err(|e| Error::Instantiate(e.to_string()))?;

        let log = self.log.clone();
        linker
            .func_wrap(api::NAMESPACE, api::PRINT, move |value: i32| {
                lock(&log).line(&value.to_string());
            })
            .map_err(|e| Error::Instantiate(e.to_string()))?;

        let log = self.log.clone();
        linker
            .func_wrap(api::NAMESPACE, api::PRINT_CHAR, move |code: i32| {
                lock(&log).line(&api::char_text(code));
            })
            .map_err(|e| Error::Instantiate(e.to_string()))?;

        let log = self.log.clone();
        linker
            .func_wrap(
                api::NAMESPACE,
                api::SHOW_MEMORY,
                move |caller: Caller<'_, ()>, index: i32| {
                    let index = index as u32;
                    // Word offsets can exceed usize on 32-bit hosts; an
                    // unrepresentable offset is just out of range.
                    let word = usize::try_from(u64::from(index) * 4)
                        .ok()
                        .and_then(|offset| Some(offset..offset.checked_add(4)?))
                        .and_then(|range| memory.data(&caller).get(range));
                    let text = match word {
                        Some(b) => api::heap_line(index, u32::from_le_bytes([b[0], b[1], b[2], b[3]])),
                        None => api::heap_out_of_range(index),
                    };
                    lock(&log).line(&text);
                },
            )
            .map_err(|e| Error::Instantiate(e.to_string()))?;

        let input = self.input.clone();
        linker
            .func_wrap(api::NAMESPACE, api::READ_CHAR, move || -> i32 {
                lock(&input).read_char()
            })
            .map_err(|e| Error::Instantiate(e.to_string()))?;

        Ok(linker)
    }
}

// Recover the guard from a poisoned lock instead of panicking inside a
// host call, which wasmtime would turn into a trap.
fn lock<T: ?Sized>(shared: &Arc<Mutex<T>>) -> std::sync::MutexGuard<'_, T> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}
