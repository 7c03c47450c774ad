//! Campus Configuration - operator-tunable thresholds as TOML values
//!
//! Each section implements `Default` with the built-in campus values, so a
//! missing file, section or key behaves exactly like the defaults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults;
use crate::types::RiskLevel;

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "CAMPUS_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "campus_config.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for a campus deployment.
///
/// Load with `CampusConfig::load()` which searches:
/// 1. `$CAMPUS_CONFIG` env var
/// 2. `./campus_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CampusConfig {
    /// Campus identification
    #[serde(default)]
    pub campus: CampusInfo,

    /// Acceptable bands per sensor type
    #[serde(default)]
    pub sensors: SensorConfig,

    /// Energy optimizer thresholds and tariff
    #[serde(default)]
    pub energy: EnergyConfig,

    /// Anomaly detector tuning
    #[serde(default)]
    pub detector: DetectorConfig,

    /// Risk floors for alerting and recommendations
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Run history retention
    #[serde(default)]
    pub history: HistoryConfig,
}

impl CampusConfig {
    /// Load configuration using the standard search order:
    /// 1. `$CAMPUS_CONFIG` environment variable
    /// 2. `./campus_config.toml` in the current working directory
    /// 3. Built-in defaults
    ///
    /// A file that fails to parse or validate is skipped with a warning.
    pub fn load() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), campus = %config.campus.name, "Loaded campus config from CAMPUS_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from CAMPUS_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "CAMPUS_CONFIG points to non-existent file, falling back");
            }
        }

        // 2. Check ./campus_config.toml
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(campus = %config.campus.name, "Loaded campus config from ./campus_config.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./campus_config.toml, using defaults");
                }
            }
        }

        // 3. Defaults
        info!("No campus_config.toml found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path and validate it.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Save config to a file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Campus config saved");
        Ok(())
    }

    /// Validate all values for internal consistency.
    ///
    /// Rules:
    /// - Sensor bands must be finite with min <= max
    /// - Energy threshold and tariff must be finite and non-negative
    /// - Reduction fraction must lie in (0, 1]
    /// - Detector sigma must be positive
    /// - Bootstrap sample count must allow fitting
    /// - History capacity must be > 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        for (sensor_type, band) in &self.sensors.bands {
            if !band.min.is_finite() || !band.max.is_finite() {
                errors.push(format!(
                    "sensors.bands.{sensor_type}: bounds must be finite (got min={}, max={})",
                    band.min, band.max
                ));
            } else if band.min > band.max {
                errors.push(format!(
                    "sensors.bands.{sensor_type}: min ({:.3}) must be <= max ({:.3})",
                    band.min, band.max
                ));
            }
        }

        let e = &self.energy;
        Self::check_non_negative(
            e.high_consumption_threshold_kwh,
            "energy.high_consumption_threshold_kwh",
            &mut errors,
        );
        Self::check_non_negative(e.cost_per_kwh, "energy.cost_per_kwh", &mut errors);
        if !(e.reduction_fraction > 0.0 && e.reduction_fraction <= 1.0) {
            errors.push(format!(
                "energy.reduction_fraction: must be in (0, 1] (got {})",
                e.reduction_fraction
            ));
        }

        let d = &self.detector;
        if !(d.sigma.is_finite() && d.sigma > 0.0) {
            errors.push(format!("detector.sigma: must be > 0 (got {})", d.sigma));
        }
        if d.bootstrap_samples < defaults::MIN_TRAINING_ROWS {
            errors.push(format!(
                "detector.bootstrap_samples: must be >= {} (got {})",
                defaults::MIN_TRAINING_ROWS,
                d.bootstrap_samples
            ));
        }

        if self.history.capacity == 0 {
            errors.push("history.capacity: must be > 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_non_negative(value: f64, name: &str, errors: &mut Vec<String>) {
        // NaN comparisons silently pass, catch them explicitly
        if !value.is_finite() || value < 0.0 {
            errors.push(format!("{name}: must be finite and >= 0 (got {value})"));
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {}", e),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Campus Info
// ============================================================================

/// Identification metadata, appears in logs only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampusInfo {
    #[serde(default = "default_campus_name")]
    pub name: String,
}

fn default_campus_name() -> String {
    defaults::DEFAULT_CAMPUS_NAME.to_string()
}

impl Default for CampusInfo {
    fn default() -> Self {
        Self {
            name: default_campus_name(),
        }
    }
}

// ============================================================================
// Sensor Bands
// ============================================================================

/// Inclusive acceptable range for one sensor type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorBand {
    pub min: f64,
    pub max: f64,
}

impl SensorBand {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// True when `value` lies inside the band, bounds included.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Strictly outside the band. NaN readings are never inside any band.
    pub fn is_violated_by(&self, value: f64) -> bool {
        !self.contains(value)
    }
}

/// Per-type sensor bands.
///
/// A `[sensors.bands]` table in the file replaces the built-in set entirely;
/// sensor types without a band are never anomalous.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorConfig {
    #[serde(default = "default_sensor_bands")]
    pub bands: BTreeMap<String, SensorBand>,
}

fn default_sensor_bands() -> BTreeMap<String, SensorBand> {
    [
        ("temperature", defaults::TEMPERATURE_BAND),
        ("humidity", defaults::HUMIDITY_BAND),
        ("energy", defaults::ENERGY_BAND),
    ]
    .into_iter()
    .map(|(name, (min, max))| (name.to_string(), SensorBand::new(min, max)))
    .collect()
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            bands: default_sensor_bands(),
        }
    }
}

impl SensorConfig {
    pub fn band(&self, sensor_type: &str) -> Option<&SensorBand> {
        self.bands.get(sensor_type)
    }
}

// ============================================================================
// Energy
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyConfig {
    /// Consumption above this (kWh) triggers an optimization proposal
    pub high_consumption_threshold_kwh: f64,

    /// Share of current consumption assumed recoverable
    pub reduction_fraction: f64,

    /// Tariff ($/kWh)
    pub cost_per_kwh: f64,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            high_consumption_threshold_kwh: defaults::HIGH_CONSUMPTION_THRESHOLD_KWH,
            reduction_fraction: defaults::ENERGY_REDUCTION_FRACTION,
            cost_per_kwh: defaults::COST_PER_KWH,
        }
    }
}

// ============================================================================
// Detector
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// |z| above which a telemetry row is anomalous
    pub sigma: f64,

    /// Synthetic fleet size when no history is available
    pub bootstrap_samples: usize,

    /// Seed for the synthetic fleet
    pub bootstrap_seed: u64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            sigma: defaults::DEFAULT_DETECTOR_SIGMA,
            bootstrap_samples: defaults::BOOTSTRAP_SAMPLES,
            bootstrap_seed: defaults::BOOTSTRAP_SEED,
        }
    }
}

// ============================================================================
// Pipeline
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Predictions at or above this risk raise an alert
    pub alert_min_risk: RiskLevel,

    /// Predictions at or above this risk produce a maintenance recommendation
    pub recommendation_min_risk: RiskLevel,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            alert_min_risk: RiskLevel::High,
            recommendation_min_risk: RiskLevel::Medium,
        }
    }
}

// ============================================================================
// History
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Completed runs kept in memory (oldest evicted first)
    pub capacity: usize,

    /// Optional sled directory mirroring every completed cycle report
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_path: Option<PathBuf>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: defaults::HISTORY_CAPACITY,
            archive_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = CampusConfig::default();
        assert!(config.validate().is_ok(), "Default config must always validate");
    }

    #[test]
    fn test_empty_toml_produces_defaults() {
        let config: CampusConfig = toml::from_str("").expect("empty TOML should parse");
        assert_eq!(config.campus.name, "Main Campus");
        assert_eq!(config.energy.high_consumption_threshold_kwh, 1200.0);
        assert_eq!(config.detector.sigma, 3.0);
        assert_eq!(config.detector.bootstrap_seed, 42);
        assert_eq!(config.pipeline.alert_min_risk, RiskLevel::High);
        assert_eq!(config.pipeline.recommendation_min_risk, RiskLevel::Medium);
        assert_eq!(
            config.sensors.band("temperature"),
            Some(&SensorBand::new(15.0, 30.0))
        );
        assert!(config.history.archive_path.is_none());
    }

    #[test]
    fn test_partial_toml_override() {
        let toml_str = r#"
[campus]
name = "North Campus"

[energy]
high_consumption_threshold_kwh = 900.0

[pipeline]
alert_min_risk = "critical"
"#;
        let config: CampusConfig = toml::from_str(toml_str).expect("partial TOML should parse");
        assert_eq!(config.campus.name, "North Campus");
        assert_eq!(config.energy.high_consumption_threshold_kwh, 900.0);
        assert_eq!(config.pipeline.alert_min_risk, RiskLevel::Critical);
        // Non-overridden values retain defaults
        assert_eq!(config.energy.reduction_fraction, 0.15);
        assert_eq!(config.pipeline.recommendation_min_risk, RiskLevel::Medium);
        assert_eq!(config.sensors.bands.len(), 3);
    }

    #[test]
    fn test_custom_bands_replace_defaults() {
        let toml_str = r#"
[sensors.bands.co2]
min = 400.0
max = 1000.0
"#;
        let config: CampusConfig = toml::from_str(toml_str).expect("band TOML should parse");
        assert!(config.sensors.band("temperature").is_none());
        let co2 = config.sensors.band("co2").expect("co2 band");
        assert!(co2.contains(1000.0));
        assert!(co2.is_violated_by(1000.5));
    }

    #[test]
    fn test_band_edges_are_inclusive() {
        let band = SensorBand::new(15.0, 30.0);
        assert!(!band.is_violated_by(15.0));
        assert!(!band.is_violated_by(30.0));
        assert!(band.is_violated_by(30.01));
        assert!(band.is_violated_by(14.99));
        assert!(band.is_violated_by(f64::NAN));
    }

    #[test]
    fn test_validation_collects_every_problem() {
        let mut config = CampusConfig::default();
        config
            .sensors
            .bands
            .insert("humidity".to_string(), SensorBand::new(80.0, 20.0));
        config.energy.reduction_fraction = 0.0;
        config.detector.sigma = -1.0;
        config.history.capacity = 0;

        match config.validate() {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors.len(), 4, "{errors:?}");
                assert!(errors[0].starts_with("sensors.bands.humidity"));
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn test_nan_threshold_rejected() {
        let mut config = CampusConfig::default();
        config.energy.high_consumption_threshold_kwh = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip_keeps_overrides() {
        let mut config = CampusConfig::default();
        config.campus.name = "Round Trip".to_string();
        config.history.archive_path = Some(PathBuf::from("/tmp/archive"));
        let text = config.to_toml().expect("serialize");
        let back: CampusConfig = toml::from_str(&text).expect("reparse");
        assert_eq!(back.campus.name, "Round Trip");
        assert_eq!(back.history.archive_path, Some(PathBuf::from("/tmp/archive")));
        assert_eq!(back.sensors.bands, config.sensors.bands);
    }
}
