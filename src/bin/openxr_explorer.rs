//! Command-line entry point: one reload cycle against the installed OpenXR
//! runtime, then the requested tables on stdout.
//!
//! Diagnostics go to stderr through `tracing`; set `XR_EXPLORER_LOG` (an
//! `EnvFilter` directive, `warn` by default) to see loader resolution and tier
//! transitions.

use anyhow::{Context, Result};
use std::env;
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;
use xr_explorer::cli::{self, CliArgs};
use xr_explorer::{Explorer, GpuLog, GraphicsBackends, NativeRuntime};

const LOG_ENV: &str = "XR_EXPLORER_LOG";
const LOADER_DEBUG_ENV: &str = "XR_LOADER_DEBUG";
const LOADER_LOG_FILE_ENV: &str = "XR_LOADER_LOG_FILE";

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    init_tracing();
    let args = cli::parse_args(env::args().skip(1));
    configure_loader_env(&args);

    let backends = GraphicsBackends::new(GpuLog::new(args.gpu_log_level));
    let mut settings = args.settings();
    settings.graphics = backends.resolve_preference(settings.graphics);

    let mut explorer = Explorer::new(NativeRuntime::load(), backends);
    explorer.reload(&settings);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    cli::write_output(&explorer, &args, &mut out)?;
    out.flush().context("flushing stdout")?;

    explorer.release();
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Export loader settings before the loader library is opened.
fn configure_loader_env(args: &CliArgs) {
    // SAFETY: runs before any other thread exists.
    unsafe {
        match &args.loader_debug {
            Some(value) => env::set_var(LOADER_DEBUG_ENV, value),
            None if env::var_os(LOADER_DEBUG_ENV).is_none() => {
                env::set_var(LOADER_DEBUG_ENV, "error")
            }
            None => {}
        }
        if let Some(path) = &args.loader_log_file {
            env::set_var(LOADER_LOG_FILE_ENV, path);
        }
    }
}
