//! Raw sensor and energy-meter readings supplied by the ingestion collaborators.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Consumption assumed when a meter omits `current_consumption` (kWh).
pub const DEFAULT_CURRENT_CONSUMPTION_KWH: f64 = 1000.0;

/// Single IoT sensor reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Sensor family: "temperature", "humidity", "energy", ...
    #[serde(rename = "type")]
    pub sensor_type: String,
    pub value: f64,
    #[serde(default)]
    pub unit: String,
}

impl SensorReading {
    pub fn new(sensor_type: &str, value: f64, unit: &str) -> Self {
        Self {
            sensor_type: sensor_type.to_string(),
            value,
            unit: unit.to_string(),
        }
    }
}

/// Building-level energy meter figures (kWh).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyReading {
    #[serde(default = "default_current_consumption")]
    pub current_consumption: f64,
    #[serde(default)]
    pub baseline: f64,
}

fn default_current_consumption() -> f64 {
    DEFAULT_CURRENT_CONSUMPTION_KWH
}

/// Sensor id -> reading. Ordered so stage output is deterministic.
pub type SensorReadings = BTreeMap<String, SensorReading>;

/// Building id -> meter figures.
pub type EnergyReadings = BTreeMap<String, EnergyReading>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_consumption_uses_default() {
        let reading: EnergyReading = serde_json::from_str(r#"{"baseline": 900}"#).unwrap();
        assert_eq!(reading.current_consumption, DEFAULT_CURRENT_CONSUMPTION_KWH);
        assert_eq!(reading.baseline, 900.0);
    }

    #[test]
    fn test_sensor_reading_type_key() {
        let readings: SensorReadings = serde_json::from_str(
            r#"{"sensor-001": {"type": "temperature", "value": 35, "unit": "°C"}}"#,
        )
        .unwrap();
        assert_eq!(readings["sensor-001"].sensor_type, "temperature");
        assert_eq!(readings["sensor-001"].value, 35.0);
    }
}
