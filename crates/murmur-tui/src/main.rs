//! Murmur TUI entry point.

use std::{fs::File, path::PathBuf, sync::Mutex};

use clap::Parser;
use murmur_client::{
    SystemEnv,
    transport::{DEFAULT_ENDPOINT, ReconnectPolicy},
};
use murmur_tui::{App, Runtime, TerminalDriver};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Murmur terminal chat client
#[derive(Parser, Debug)]
#[command(name = "murmur-tui")]
#[command(about = "Terminal client for Socket.IO chat rooms")]
#[command(version)]
struct Args {
    /// Chat server endpoint (http, https, ws or wss)
    #[arg(short, long, env = "MURMUR_SOCKET_URL", default_value = DEFAULT_ENDPOINT)]
    server: String,

    /// Prefill the join screen with this username
    #[arg(short, long)]
    username: Option<String>,

    /// Log file; the terminal itself is taken by the UI
    #[arg(long, default_value_os_t = std::env::temp_dir().join("murmur-tui.log"))]
    log_file: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let log_file = File::create(&args.log_file)?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(log_file)))
        .with(filter)
        .init();

    tracing::info!(server = %args.server, "Murmur TUI starting");

    let app = match args.username.as_deref() {
        Some(name) => App::with_username(name),
        None => App::new(),
    };
    let driver = TerminalDriver::new(args.server, ReconnectPolicy::default())?;

    Ok(Runtime::new(driver, SystemEnv::new(), app).run().await?)
}
