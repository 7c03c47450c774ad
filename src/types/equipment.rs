//! Equipment telemetry as delivered by the equipment registry.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Number of numeric telemetry fields used for scoring and anomaly detection.
pub const FEATURE_COUNT: usize = 7;

/// Feature names, in `FeatureVector` order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "age_years",
    "usage_hours",
    "temperature",
    "vibration",
    "pressure",
    "current_draw",
    "last_maintenance_days",
];

/// Seven-element numeric telemetry tuple (see [`FEATURE_NAMES`]).
pub type FeatureVector = [f64; FEATURE_COUNT];

// ============================================================================
// Equipment Kind
// ============================================================================

/// Known equipment families. Anything else scores with the default factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentKind {
    Hvac,
    Elevator,
    Generator,
    Pump,
    Lighting,
    Other,
}

impl EquipmentKind {
    /// Parse the registry's free-form type string (case-insensitive).
    pub fn from_type_str(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "hvac" => Self::Hvac,
            "elevator" => Self::Elevator,
            "generator" => Self::Generator,
            "pump" => Self::Pump,
            "lighting" => Self::Lighting,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hvac => "hvac",
            Self::Elevator => "elevator",
            Self::Generator => "generator",
            Self::Pump => "pump",
            Self::Lighting => "lighting",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for EquipmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Telemetry
// ============================================================================

/// One maintenance or failure event in an equipment's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEvent {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Telemetry snapshot for one equipment item in one evaluation cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentTelemetry {
    pub equipment_id: String,
    /// Registry type string ("hvac", "elevator", ...)
    pub equipment_type: String,
    pub age_years: f64,
    pub usage_hours: f64,
    /// Operating temperature (°C)
    pub temperature: f64,
    /// Vibration velocity (mm/s)
    pub vibration: f64,
    pub pressure: f64,
    /// Current draw (A)
    pub current_draw: f64,
    pub last_maintenance_days: u32,
    /// Oldest first
    #[serde(default)]
    pub maintenance_history: Vec<HistoryEvent>,
    /// Oldest first
    #[serde(default)]
    pub failure_history: Vec<HistoryEvent>,
}

impl EquipmentTelemetry {
    pub fn kind(&self) -> EquipmentKind {
        EquipmentKind::from_type_str(&self.equipment_type)
    }

    /// Feature vector in [`FEATURE_NAMES`] order.
    pub fn features(&self) -> FeatureVector {
        [
            self.age_years,
            self.usage_hours,
            self.temperature,
            self.vibration,
            self.pressure,
            self.current_draw,
            f64::from(self.last_maintenance_days),
        ]
    }
}
