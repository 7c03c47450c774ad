//! Stage 1: flag sensor readings outside their configured band.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::SensorConfig;
use crate::pipeline::PipelineState;
use crate::types::{AlertSeverity, SensorAnomaly, SensorReading, SensorReadings};
use crate::workflow::Stage;

pub const THRESHOLD_EXCEEDED: &str = "threshold_exceeded";

pub struct SensorMonitor {
    sensors: SensorConfig,
}

impl SensorMonitor {
    pub fn new(sensors: SensorConfig) -> Self {
        Self { sensors }
    }

    /// Outside the band for its type. Types without a band never are.
    pub fn is_anomalous(&self, reading: &SensorReading) -> bool {
        self.sensors
            .band(&reading.sensor_type)
            .is_some_and(|band| band.is_violated_by(reading.value))
    }

    /// Anomalies in sensor id order.
    pub fn find_anomalies(
        &self,
        readings: &SensorReadings,
        timestamp: DateTime<Utc>,
    ) -> Vec<SensorAnomaly> {
        readings
            .iter()
            .filter(|(_, reading)| self.is_anomalous(reading))
            .map(|(sensor_id, reading)| {
                debug!(
                    sensor_id = %sensor_id,
                    sensor_type = %reading.sensor_type,
                    value = reading.value,
                    "Sensor reading outside band"
                );
                SensorAnomaly {
                    sensor_id: sensor_id.clone(),
                    sensor_type: reading.sensor_type.clone(),
                    value: reading.value,
                    unit: reading.unit.clone(),
                    anomaly_type: THRESHOLD_EXCEEDED.to_string(),
                    severity: AlertSeverity::Warning,
                    timestamp,
                }
            })
            .collect()
    }
}

#[async_trait]
impl Stage<PipelineState> for SensorMonitor {
    async fn run(&self, state: &mut PipelineState) -> anyhow::Result<()> {
        let anomalies = self.find_anomalies(&state.sensor_data, state.timestamp);
        info!(
            sensors = state.sensor_data.len(),
            anomalies = anomalies.len(),
            "Sensors checked"
        );
        state.context.sensor_anomalies = anomalies;
        Ok(())
    }
}
