//! System-wide default constants.
//!
//! Centralises the numbers the config layer falls back to when a section or
//! key is missing from `campus_config.toml`. Grouped by subsystem.

// ============================================================================
// Campus
// ============================================================================

pub const DEFAULT_CAMPUS_NAME: &str = "Main Campus";

// ============================================================================
// Sensor Bands
// ============================================================================

/// Acceptable temperature band (°C, inclusive).
pub const TEMPERATURE_BAND: (f64, f64) = (15.0, 30.0);

/// Acceptable relative humidity band (%, inclusive).
pub const HUMIDITY_BAND: (f64, f64) = (20.0, 80.0);

/// Acceptable meter reading band for energy sensors (kWh, inclusive).
pub const ENERGY_BAND: (f64, f64) = (0.0, 2500.0);

// ============================================================================
// Energy Optimizer
// ============================================================================

/// Buildings consuming more than this (kWh) get an optimization proposal.
pub const HIGH_CONSUMPTION_THRESHOLD_KWH: f64 = 1200.0;

/// Fraction of current consumption assumed recoverable.
pub const ENERGY_REDUCTION_FRACTION: f64 = 0.15;

/// Tariff used to price potential savings ($/kWh).
pub const COST_PER_KWH: f64 = 0.15;

// ============================================================================
// Anomaly Detector
// ============================================================================

/// |z| above this flags a telemetry row as anomalous.
pub const DEFAULT_DETECTOR_SIGMA: f64 = 3.0;

/// Relative floor applied to learned standard deviations.
pub const MIN_STD_FLOOR: f64 = 0.001;

/// Absolute floor per feature, in feature units: age (years), usage (h),
/// temperature (°C), vibration (mm/s), pressure, current draw (A), days since
/// maintenance. A constant training column otherwise turns any later
/// deviation into a huge z-score.
pub const FEATURE_STD_FLOORS: [f64; crate::types::FEATURE_COUNT] = [0.5, 500.0, 2.0, 0.5, 5.0, 2.0, 7.0];

/// Fewest rows `fit` accepts (sample std needs two).
pub const MIN_TRAINING_ROWS: usize = 2;

/// Synthetic fleet size used when no historical telemetry exists.
pub const BOOTSTRAP_SAMPLES: usize = 100;

/// RNG seed for the synthetic fleet, fixed so bootstraps are reproducible.
pub const BOOTSTRAP_SEED: u64 = 42;

// ============================================================================
// Run History
// ============================================================================

/// Completed run states retained in memory.
///
/// 1 000 cycles at one per minute is roughly 16 hours.
pub const HISTORY_CAPACITY: usize = 1_000;
