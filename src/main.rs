//! Campus Sentinel - Smart Campus Operational Intelligence
//!
//! Runs campus evaluation cycles and prints each cycle report as JSON.
//!
//! # Usage
//!
//! ```bash
//! # One cycle over the built-in demo dataset
//! cargo run --release
//!
//! # Real inputs, one cycle every five minutes until Ctrl+C
//! ./campus-sentinel --sensors sensors.json --energy energy.json \
//!     --equipment equipment.json --history history.json --interval-secs 300
//! ```
//!
//! # Environment Variables
//!
//! - `CAMPUS_CONFIG`: Path to the campus configuration TOML
//! - `RUST_LOG`: Logging level (default: info)

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use campus_sentinel::config::{self, CampusConfig};
use campus_sentinel::demo;
use campus_sentinel::registry::{
    read_equipment_json, EquipmentRegistry, InMemoryRegistry, JsonFileRegistry,
};
use campus_sentinel::types::{EnergyReadings, EquipmentTelemetry, SensorReadings};
use campus_sentinel::{CampusPipeline, CycleReport};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "campus-sentinel")]
#[command(about = "Campus Sentinel Smart Campus Operational Intelligence")]
#[command(version)]
struct CliArgs {
    /// JSON map of sensor id -> {type, value, unit}
    #[arg(long, value_name = "FILE")]
    sensors: Option<PathBuf>,

    /// JSON map of building id -> {current_consumption, baseline}
    #[arg(long, value_name = "FILE")]
    energy: Option<PathBuf>,

    /// JSON array of equipment telemetry (current snapshot)
    #[arg(long, value_name = "FILE")]
    equipment: Option<PathBuf>,

    /// JSON array of historical equipment telemetry used to train the detector
    #[arg(long, value_name = "FILE")]
    history: Option<PathBuf>,

    /// Campus configuration TOML (overrides CAMPUS_CONFIG and ./campus_config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Repeat cycles every N seconds until Ctrl+C
    #[arg(long, value_name = "N")]
    interval_secs: Option<u64>,

    /// Stop after N cycles
    #[arg(long, value_name = "N")]
    cycles: Option<u64>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    /// Pretty-print cycle reports
    #[arg(long)]
    pretty: bool,
}

// ============================================================================
// Setup
// ============================================================================

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(path: Option<&Path>) -> Result<CampusConfig> {
    match path {
        Some(path) => CampusConfig::load_from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(CampusConfig::load()),
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
}

async fn load_sensors(path: Option<&Path>) -> Result<SensorReadings> {
    match path {
        Some(path) => read_json(path).await,
        None => Ok(demo::demo_sensors()),
    }
}

async fn load_energy(path: Option<&Path>) -> Result<EnergyReadings> {
    match path {
        Some(path) => read_json(path).await,
        None => Ok(demo::demo_energy()),
    }
}

fn build_registry(args: &CliArgs, history: &[EquipmentTelemetry]) -> Arc<dyn EquipmentRegistry> {
    match &args.equipment {
        Some(path) => {
            let mut registry = JsonFileRegistry::new(path);
            if let Some(history) = &args.history {
                registry = registry.with_history(history);
            }
            Arc::new(registry)
        }
        None => Arc::new(
            InMemoryRegistry::new(demo::demo_equipment()).with_history(history.to_vec()),
        ),
    }
}

/// Historical telemetry for explicit detector training. An unreadable file
/// leaves the detector to bootstrap lazily.
async fn load_history(path: Option<&Path>) -> Vec<EquipmentTelemetry> {
    let Some(path) = path else {
        return Vec::new();
    };
    match read_equipment_json(path).await {
        Ok(history) => history,
        Err(e) => {
            warn!(error = %e, "Ignoring unreadable equipment history");
            Vec::new()
        }
    }
}

async fn load_inputs(args: &CliArgs) -> Result<(SensorReadings, EnergyReadings)> {
    let sensors = load_sensors(args.sensors.as_deref()).await?;
    let energy = load_energy(args.energy.as_deref()).await?;
    Ok((sensors, energy))
}

fn print_report(report: &CycleReport, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(report)?
    } else {
        serde_json::to_string(report)?
    };
    println!("{json}");
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.log_json);

    config::init(load_config(args.config.as_deref())?);
    let cfg = config::get();
    info!(campus = %cfg.campus.name, "Campus Sentinel starting");

    let history = load_history(args.history.as_deref()).await;
    let registry = build_registry(&args, &history);
    info!(registry = registry.registry_name(), "Equipment registry ready");
    let pipeline = CampusPipeline::from_config(cfg, registry)?;

    if !history.is_empty() {
        match pipeline.engine().train(&history) {
            Ok(()) => info!(
                detector = %pipeline.engine().detector_name(),
                samples = history.len(),
                "Detector trained from --history"
            ),
            Err(e) => warn!(error = %e, "Training from --history failed, detector will bootstrap"),
        }
    }

    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    let repeating = args.interval_secs.is_some() || args.cycles.is_some();
    let interval = Duration::from_secs(args.interval_secs.unwrap_or(0));
    let max_cycles = args.cycles.unwrap_or(if repeating { u64::MAX } else { 1 });
    let mut completed = 0u64;

    while completed < max_cycles && !cancel_token.is_cancelled() {
        // Inputs are re-read every cycle so edited files take effect
        match load_inputs(&args).await {
            Ok((sensors, energy)) => match pipeline.process(sensors, energy).await {
                Ok(report) => print_report(&report, args.pretty)?,
                Err(failure) if !repeating => {
                    return Err(anyhow::anyhow!("{failure}"));
                }
                Err(failure) => {
                    error!(stage = %failure.stage, error = %failure.error, "Cycle failed");
                }
            },
            Err(e) if !repeating => return Err(e),
            Err(e) => {
                let reason = format!("{e:#}");
                error!(error = %reason, "Cycle inputs unreadable, skipping cycle");
            }
        }
        completed += 1;

        if completed >= max_cycles || !repeating {
            break;
        }
        tokio::select! {
            () = cancel_token.cancelled() => break,
            () = tokio::time::sleep(interval) => {}
        }
    }

    if let Some(archive) = pipeline.history().archive() {
        if let Err(e) = archive.flush() {
            warn!(error = %e, "Failed to flush run archive");
        }
    }
    info!(cycles = completed, "Campus Sentinel stopped");
    Ok(())
}
