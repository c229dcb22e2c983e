//! Home security controller.
//!
//! Usage:
//!   cargo run -- --arming armed_home
//!   cargo run -- --in-memory --seed 42 --ticks 100
//!
//! Opens the state store, registers a logging listener and feeds simulated
//! sensor and camera events into the alarm controller until Ctrl+C.

use clap::Parser;
use home_security::config::{Config, load_dotenv};
use home_security::error::Result;
use home_security::image::FakeImageClassifier;
use home_security::input::simulation::run_security_simulation;
use home_security::security::{
    AlarmController, ArmingStatus, LoggingListener, Sensor, SensorType, StatusListener,
};
use home_security::store::{JsonFileStore, MemoryStore, StateStore};
use log::{error, info};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;

#[derive(Parser)]
#[command(name = "home-security")]
#[command(about = "Alarm controller for door, window and motion sensors plus a cat-aware camera")]
struct Cli {
    /// State file (defaults to the platform data directory)
    #[arg(long)]
    state_file: Option<PathBuf>,

    /// Keep all state in memory
    #[arg(long)]
    in_memory: bool,

    /// Arming status to apply at startup (DISARMED, ARMED_HOME, ARMED_AWAY)
    #[arg(long, value_parser = ArmingStatus::parse)]
    arming: Option<ArmingStatus>,

    /// Seconds between simulated events
    #[arg(long)]
    interval: Option<u64>,

    /// Seed for the simulation and the stand-in classifier
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many simulated events
    #[arg(long, env = "SECURITY_SIMULATION_TICKS")]
    ticks: Option<u64>,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(path) = &self.state_file {
            config.store.state_file = Some(path.clone());
        }
        if self.in_memory {
            config.store.in_memory = true;
        }
        if let Some(interval) = self.interval {
            config.simulation.interval_secs = interval;
        }
        if let Some(seed) = self.seed {
            config.simulation.seed = Some(seed);
        }
    }
}

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn open_store(config: &Config) -> Result<Arc<dyn StateStore>> {
    if config.store.in_memory {
        info!("Using in-memory state store");
        return Ok(Arc::new(MemoryStore::new()));
    }
    let path = config
        .store
        .state_file
        .clone()
        .unwrap_or_else(JsonFileStore::default_path);
    Ok(Arc::new(JsonFileStore::open(path)?))
}

fn seed_demo_sensors(controller: &AlarmController) -> Result<()> {
    if !controller.sensors().is_empty() {
        return Ok(());
    }
    info!("No sensors configured, adding demo sensors");
    for (name, sensor_type) in [
        ("Front door", SensorType::Door),
        ("Kitchen window", SensorType::Window),
        ("Hallway motion", SensorType::Motion),
    ] {
        controller.add_sensor(Sensor::new(name, sensor_type))?;
    }
    Ok(())
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    let store = open_store(&config)?;
    let classifier = match config.simulation.seed {
        Some(seed) => FakeImageClassifier::with_seed(seed),
        None => FakeImageClassifier::new(),
    };
    let controller = Arc::new(
        AlarmController::new(store, Arc::new(classifier))
            .with_confidence_threshold(config.camera.confidence_threshold),
    );

    let listener: Arc<dyn StatusListener> = Arc::new(LoggingListener);
    controller.add_status_listener(&listener);

    seed_demo_sensors(&controller)?;
    if let Some(arming) = cli.arming {
        controller.set_arming_status(arming)?;
    }

    info!("Home security controller is running");
    info!("  Arming status: {}", controller.arming_status());
    info!("  Alarm status: {}", controller.alarm_status());
    info!("  Sensors: {}", controller.sensors().len());
    info!("  - Press Ctrl+C to exit");

    let mut simulation = run_security_simulation(
        controller.clone(),
        Duration::from_secs(config.simulation.interval_secs.max(1)),
        config.simulation.seed,
        cli.ticks,
    );

    tokio::select! {
        result = signal::ctrl_c() => {
            match result {
                Ok(()) => info!("Received shutdown signal"),
                Err(e) => error!("Failed to listen for shutdown signal: {}", e),
            }
            simulation.abort();
        }
        _ = &mut simulation => {}
    }

    info!(
        "Home security controller stopped (arming {}, alarm {})",
        controller.arming_status(),
        controller.alarm_status()
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    // Load .env file before anything else
    load_dotenv();
    init_logger();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    cli.apply(&mut config);

    if let Err(e) = run(cli, config).await {
        error!("Home security controller failed: {}", e);
        std::process::exit(1);
    }
}
