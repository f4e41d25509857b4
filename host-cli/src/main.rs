use clap::Parser;
use runtime::engines::native::{Runner, SharedInput, SharedLog};
use runtime::host::{StdinInput, StdioLog};
use runtime::HostConfig;
use std::fs;
use std::io::BufRead;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

#[derive(Parser, Debug)]
#[command(name = "wasm-host", about = "Runs a compiled WebAssembly module's main export.")]
struct Args {
    /// Path to the .wasm module
    path: PathBuf,

    /// Pause before calling main so a debugger can attach
    #[arg(long)]
    wait_for_debugger: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let bytes = match fs::read(&args.path) {
        Ok(bytes) if !bytes.is_empty() => bytes,
        _ => {
            eprintln!("File {} not found", args.path.display());
            return ExitCode::FAILURE;
        }
    };

    let log: SharedLog = Arc::new(Mutex::new(StdioLog));
    let input: SharedInput = Arc::new(Mutex::new(StdinInput));
    let runner = match Runner::new(HostConfig::default(), log, input) {
        Ok(runner) => runner,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    let mut runner = if args.wait_for_debugger {
        runner.with_pause_hook(wait_for_attach)
    } else {
        runner
    };

    match runner.run_or_sentinel(&bytes) {
        Ok(value) => {
            println!("WASM returned: {value}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn wait_for_attach() {
    println!(
        "Attach your debugger to pid {}, then press Enter to continue.",
        std::process::id()
    );
    let mut line = String::new();
    let _ = std::io::stdin().lock().read_line(&mut line);
}
