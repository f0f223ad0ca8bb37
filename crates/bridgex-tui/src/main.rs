//! `bridgex`: terminal front-end for the BridgeX backend.
//!
//! Shows backend presence, lists paired devices, runs pairing sessions and
//! sends files. All state lives in `bridgex-core`'s [`Controller`]; a data
//! bridge task streams its watch channels into the TUI action loop.
//!
//! Logs are written to a file (default `/tmp/bridgex.log`) to avoid
//! corrupting the terminal UI.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::Result;
use tokio::sync::Mutex;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use bridgex_api::BackendClient;
use bridgex_config::Config;
use bridgex_core::backend::default_binary_path;
use bridgex_core::{BackendProcess, Controller};

use crate::app::App;

/// How long a spawned backend gets to answer its first health check.
const BACKEND_STARTUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Fallback port when the backend URL carries none.
const DEFAULT_BACKEND_PORT: u16 = 8080;

/// Pair devices and send files through a local BridgeX backend.
#[derive(Parser, Debug)]
#[command(name = "bridgex", version, about)]
struct Cli {
    /// Backend base URL (e.g., http://127.0.0.1:8080)
    #[arg(short = 'u', long, env = "BRIDGEX_BACKEND_URL")]
    backend_url: Option<String>,

    /// Name this machine announces when pairing
    #[arg(short = 'n', long, env = "BRIDGEX_DEVICE_NAME")]
    device_name: Option<String>,

    /// Config file (defaults to the platform config directory)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Spawn this backend binary before starting
    #[arg(long)]
    backend_binary: Option<PathBuf>,

    /// Spawn the backend found next to this executable or on PATH
    #[arg(long, conflicts_with = "backend_binary")]
    spawn_backend: bool,

    /// Log file path (defaults to /tmp/bridgex.log)
    #[arg(long, default_value = "/tmp/bridgex.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. Nothing may log to stdout/stderr while the
/// TUI owns the terminal. The returned guard flushes logs on drop.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "bridgex_tui={log_level},bridgex_core={log_level},bridgex_api={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("bridgex.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// Config file + env, then CLI flags on top.
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => bridgex_config::load_config_from(path)?,
        None => bridgex_config::load_config()?,
    };
    if let Some(url) = &cli.backend_url {
        config.backend_url.clone_from(url);
    }
    if let Some(name) = &cli.device_name {
        config.device_name.clone_from(name);
    }
    if let Some(binary) = &cli.backend_binary {
        config.backend_binary = Some(binary.clone());
    } else if cli.spawn_backend && config.backend_binary.is_none() {
        config.backend_binary = Some(default_binary_path());
    }
    Ok(config)
}

/// Spawn the configured backend and wait for it. Failures are logged and
/// the client starts anyway; presence will report it disconnected.
async fn start_backend(
    config: &Config,
    controller: &Controller<BackendClient>,
) -> Option<BackendProcess> {
    let binary = config.backend_binary.as_ref()?;
    let port = config.backend_port().unwrap_or(DEFAULT_BACKEND_PORT);

    let mut process = match BackendProcess::spawn(binary, port) {
        Ok(process) => process,
        Err(e) => {
            warn!(binary = %binary.display(), error = %e, "could not start backend");
            return None;
        }
    };

    if let Err(e) = process
        .wait_ready(controller.gateway(), BACKEND_STARTUP_TIMEOUT)
        .await
    {
        warn!(port, error = %e, "backend not ready, continuing");
    }
    Some(process)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Install panic/error hooks BEFORE entering the terminal
    tui::install_hooks()?;

    // Tracing to file: hold the guard so logs flush on exit
    let _log_guard = setup_tracing(&cli);

    let config = resolve_config(&cli)?;
    let controller = Controller::with_http(config.to_controller_config()?)?;

    info!(
        backend_url = %controller.config().backend_url,
        device_name = %controller.config().device_name,
        "starting bridgex"
    );

    let backend = start_backend(&config, &controller)
        .await
        .map(|process| Arc::new(Mutex::new(process)));

    controller.start().await;
    let mut app = App::new(controller.clone()).with_backend(backend.clone());
    let result = app.run().await;

    controller.shutdown().await;
    if let Some(process) = backend {
        let _ = process.lock().await.stop().await;
    }

    result
}
