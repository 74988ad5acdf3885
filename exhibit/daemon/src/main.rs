//! Exhibit Daemon - Inner Universe Room Controller
//!
//! Foreground process that wires the exhibit core to the real hardware:
//! sysfs GPIO lines for the door and reset switch, the webhook lighting
//! actuator, and the media renderer. Runs until SIGINT or SIGTERM.
//!
//! # Usage
//!
//! ```bash
//! # Start with defaults (~/.config/inner-universe/exhibit.toml if present)
//! exhibit-daemon
//!
//! # With config file
//! exhibit-daemon --config /etc/inner-universe/exhibit.toml
//!
//! # Verbose logging
//! RUST_LOG=debug exhibit-daemon
//! ```
//!
//! # Signals
//!
//! - `SIGTERM` / `SIGINT`: Graceful shutdown (watchdog, playback, session)

mod helper;
mod runtime;

use std::future::Future;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

use exhibit_core::{default_config_path, load_config_from_path, ConfigOverrides};
use helper::CursorHelper;

/// Exhibit Daemon - runs the Inner Universe installation
#[derive(Parser, Debug)]
#[command(name = "exhibit-daemon")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "EXHIBIT_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "EXHIBIT_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Sysfs GPIO root directory
    #[arg(long, value_name = "DIR")]
    gpio_root: Option<PathBuf>,

    /// Effect trigger URL template (`{trigger}` is replaced by the trigger name)
    #[arg(long, value_name = "URL")]
    effects_url: Option<String>,

    /// Soundtrack (WAV) path
    #[arg(long, value_name = "FILE")]
    audio: Option<PathBuf>,

    /// Video path
    #[arg(long, value_name = "FILE")]
    video: Option<PathBuf>,

    /// X display for the renderer and helper processes
    #[arg(long, value_name = "DISPLAY")]
    display: Option<String>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        if let Some(ref root) = self.gpio_root {
            overrides = overrides.with_gpio_root(root.clone());
        }
        if let Some(ref url) = self.effects_url {
            overrides = overrides.with_effects_url(url.clone());
        }
        if let Some(ref path) = self.audio {
            overrides = overrides.with_audio_path(path.clone());
        }
        if let Some(ref path) = self.video {
            overrides = overrides.with_video_path(path.clone());
        }
        if let Some(ref display) = self.display {
            overrides = overrides.with_display(display.clone());
        }
        overrides
    }
}

/// Initialize logging with the specified level
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("exhibit_daemon={level},exhibit_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();
}

/// Resolves on the first SIGTERM or SIGINT
fn shutdown_signal() -> Result<impl Future<Output = ()>> {
    let mut sigterm =
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to install SIGINT handler")?;

    Ok(async move {
        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM, initiating shutdown"),
            _ = sigint.recv() => info!("Received SIGINT, initiating shutdown"),
        }
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level);

    info!("Exhibit daemon starting");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("PID: {}", std::process::id());

    let config_path = args.config.clone().or_else(default_config_path);
    let mut config = load_config_from_path(config_path.as_deref())
        .await
        .context("Failed to load configuration")?;
    args.overrides().apply(&mut config);
    info!(source = %config.source(), "Configuration loaded");

    let exhibit = runtime::build(&config).context("Failed to assemble exhibit")?;
    runtime::check_assets(&config).await;

    let shutdown = shutdown_signal()?;
    let helper = CursorHelper::spawn(&config.display);

    let result = exhibit.run_until(shutdown).await;

    helper.stop().await;

    match result {
        Ok(()) => {
            info!("Exhibit daemon stopped cleanly");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Exhibit daemon stopped with error");
            Err(e.into())
        }
    }
}
