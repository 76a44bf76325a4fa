//! # Reactor Control Unit
//!
//! Tick-driven supervisory controller for a simulated reactor.
//!
//! Loads the controller TOML, connects to the plant's variable endpoint and
//! runs the tick loop under the restart supervisor until Ctrl-C.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use reactor_common::config::{ConfigError, ConfigLoader};
use reactor_common::consts::DEFAULT_CONFIG_PATH;
use reactor_common::control_unit::config::ControllerConfig;
use reactor_control_unit::channel::http::HttpChannel;
use reactor_control_unit::error::ControlError;
use reactor_control_unit::supervisor::Supervisor;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Reactor Control Unit: closed-loop reactor supervisory controller
#[derive(Parser, Debug)]
#[command(name = "reactor_control_unit")]
#[command(version)]
#[command(about = "Tick-driven supervisory controller for a simulated reactor")]
struct Args {
    /// Path to the controller configuration TOML.
    #[arg(default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Override the plant's variable endpoint URL.
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,

    /// Process a single tick, then exit.
    #[arg(long)]
    once: bool,
}

fn main() {
    let args = Args::parse();
    let loaded = load(&args);

    let default_level = loaded
        .as_ref()
        .map(|c| c.shared.log_level.as_directive())
        .unwrap_or("info");
    setup_tracing(&args, default_level);

    info!("Reactor Control Unit v{} starting...", env!("CARGO_PKG_VERSION"));

    let result = loaded
        .map_err(ControlError::from)
        .and_then(|config| run(&args, &config));
    if let Err(e) = result {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Reactor Control Unit shutdown complete");
}

/// Load the configuration file and apply CLI overrides.
fn load(args: &Args) -> Result<ControllerConfig, ConfigError> {
    let mut config = ControllerConfig::load(&args.config)?;
    if let Some(url) = &args.base_url {
        config.channel.base_url = url.clone();
    }
    config.validate()?;
    Ok(config)
}

fn run(args: &Args, config: &ControllerConfig) -> Result<(), ControlError> {
    info!(
        service = %config.shared.service_name,
        base_url = %config.channel.base_url,
        banks = config.rods.bank_count,
        "Config OK"
    );

    let mut channel = HttpChannel::new(&config.channel)?;

    // Setup signal handler for graceful shutdown.
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    }) {
        error!("Failed to install signal handler: {e}");
    }

    let mut supervisor = Supervisor::new();
    if args.once {
        supervisor = supervisor.with_tick_limit(1);
    }
    supervisor.run(&mut channel, config, &running)?;

    let stats = supervisor.stats();
    info!(
        ticks = stats.ticks,
        writes = stats.writes_issued,
        suppressed = stats.writes_suppressed,
        emergency_ticks = stats.emergency_ticks,
        restarts = supervisor.restarts(),
        "Run statistics"
    );
    Ok(())
}

fn setup_tracing(args: &Args, default_level: &str) {
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
