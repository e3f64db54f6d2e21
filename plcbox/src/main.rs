//! # plcbox
//!
//! Runs the rule engine for one I/O board until interrupted.
//!
//! # Usage
//!
//! ```bash
//! # Simulation board, rules from config/rules_board_0.json
//! plcbox --config config/plcbox.toml --simulate
//!
//! # Board 1 through a named driver, explicit rules file
//! plcbox --board 1 --driver simulation --rules my_rules.json
//!
//! # Verbose logging as JSON
//! plcbox -s -v --json
//! ```

use clap::Parser;
use plcbox_common::board::BoardDriver;
use plcbox_common::config::{ConfigLoader, LogLevel, PlcboxConfig};
use plcbox_common::consts::DEFAULT_CONFIG_PATH;
use plcbox_common::rules::{load_rules, load_rules_for_board};
use plcbox_engine::{ControlLoop, EngineHandle, EngineOptions};
use plcbox_hal::{DriverRegistry, SharedBoard};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// plcbox - rule-driven automation for K8055-class USB I/O boards
#[derive(Parser, Debug)]
#[command(name = "plcbox")]
#[command(version)]
#[command(about = "Rule-driven automation engine for USB I/O boards")]
#[command(long_about = None)]
struct Args {
    /// Path to the configuration file (plcbox.toml).
    /// Defaults are used if omitted and the default path does not exist.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Rules file; overrides rules_dir/rules_board_{id}.json
    #[arg(short, long, value_name = "FILE")]
    rules: Option<PathBuf>,

    /// Board address (0..=3); overrides the config file
    #[arg(short, long)]
    board: Option<u8>,

    /// Board driver; overrides the config file
    #[arg(short, long)]
    driver: Option<String>,

    /// Force the simulation driver
    #[arg(short = 's', long)]
    simulate: bool,

    /// Seconds between status log lines (0 disables)
    #[arg(long, default_value_t = 5)]
    status_interval: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            setup_tracing(&args, LogLevel::default());
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    setup_tracing(&args, config.shared.log_level);

    if let Err(e) = run(&args, &config) {
        error!("plcbox failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run(args: &Args, config: &PlcboxConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        "{} v{} starting...",
        config.shared.service_name,
        env!("CARGO_PKG_VERSION")
    );

    let registry = DriverRegistry::with_builtin();
    let driver_name = if args.simulate {
        info!("Simulation mode enabled");
        plcbox_hal::drivers::simulation::DRIVER_NAME
    } else {
        config.engine.driver.as_str()
    };
    debug!("Registered drivers: {:?}", registry.list_drivers());

    let board_id = config.engine.board_id;
    let mut driver = registry.create_driver(driver_name, board_id)?;
    driver.init()?;
    info!(
        "Board {} opened via '{}' v{}",
        board_id,
        driver.name(),
        driver.version()
    );
    let board = SharedBoard::new(driver);

    let rules = match &args.rules {
        Some(path) => load_rules(path)?,
        None => load_rules_for_board(&config.engine.rules_dir, board_id)?,
    };
    if rules.is_empty() {
        warn!("No rules loaded; outputs will stay off");
    }

    let engine = ControlLoop::new(board.clone(), rules, EngineOptions::from(&config.engine));
    let engine = start_with_stop_handler(engine, |running| {
        ctrlc::set_handler(move || {
            info!("Received shutdown signal");
            running.store(false, Ordering::SeqCst);
        })
    })?;

    wait_for_engine(&engine, args.status_interval);
    let result = engine.join();

    if let Err(e) = board.lock().shutdown() {
        warn!("Board shutdown failed: {}", e);
    }

    result?;
    info!("plcbox shutdown complete");
    Ok(())
}

/// Install the stop handler, then start the engine thread.
///
/// The handler goes in first so a failed install leaves the board untouched.
fn start_with_stop_handler<B, E>(
    engine: ControlLoop<B>,
    install: impl FnOnce(Arc<AtomicBool>) -> Result<(), E>,
) -> Result<EngineHandle, Box<dyn std::error::Error>>
where
    B: BoardDriver + 'static,
    E: std::error::Error + 'static,
{
    install(engine.running_flag())?;
    Ok(engine.start()?)
}

/// Block until the engine thread returns, logging its status periodically.
fn wait_for_engine(engine: &EngineHandle, status_interval: u64) {
    let poll = Duration::from_millis(100);
    let every = Duration::from_secs(status_interval);
    let mut since_status = Duration::ZERO;

    while !engine.is_finished() {
        std::thread::sleep(poll);
        since_status += poll;
        if status_interval > 0 && since_status >= every {
            since_status = Duration::ZERO;
            let snap = engine.snapshot();
            info!(
                "Status: {} cycle={} in={:05b} a1={} a2={} out={:08b} ao=({},{}) latched={:08b} blinkers={} timers={}",
                snap.state,
                snap.cycle_count,
                snap.inputs.digital.bits(),
                snap.inputs.analog1,
                snap.inputs.analog2,
                snap.outputs.digital.bits(),
                snap.outputs.analog1,
                snap.outputs.analog2,
                snap.latched.bits(),
                snap.active_blinkers,
                snap.pending_timers
            );
        }
    }
}

/// Load the config file (or defaults) and apply CLI overrides.
fn load_config(args: &Args) -> Result<PlcboxConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => PlcboxConfig::load(path)?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            PlcboxConfig::load(Path::new(DEFAULT_CONFIG_PATH))?
        }
        None => PlcboxConfig::default(),
    };

    if let Some(board) = args.board {
        config.engine.board_id = board;
    }
    if let Some(driver) = &args.driver {
        config.engine.driver = driver.clone();
    }
    config.validate()?;
    Ok(config)
}

/// Setup tracing subscriber. `RUST_LOG` wins over both `-v` and the config level.
fn setup_tracing(args: &Args, level: LogLevel) {
    let directive = if args.verbose {
        LogLevel::Debug.as_directive()
    } else {
        level.as_directive()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
