//! Stage 4: turn sensor anomalies and risky predictions into alerts.

use async_trait::async_trait;
use tracing::info;

use crate::pipeline::{sequence_id, PipelineState};
use crate::types::{Alert, AlertKind, AlertSeverity, RiskLevel};
use crate::workflow::Stage;

const SENSOR_ALERT_ACTIONS: [&str; 2] = ["Investigate sensor", "Check equipment status"];

pub struct AlertGenerator {
    min_risk: RiskLevel,
}

impl AlertGenerator {
    /// Predictions at or above `min_risk` raise an alert.
    pub fn new(min_risk: RiskLevel) -> Self {
        Self { min_risk }
    }
}

#[async_trait]
impl Stage<PipelineState> for AlertGenerator {
    async fn run(&self, state: &mut PipelineState) -> anyhow::Result<()> {
        let existing = state.alerts.len();
        let mut raised: Vec<Alert> = Vec::new();

        for anomaly in &state.context.sensor_anomalies {
            raised.push(Alert {
                id: sequence_id("alert", existing + raised.len()),
                kind: AlertKind::SensorAnomaly,
                severity: anomaly.severity,
                title: "Sensor Anomaly Detected".to_string(),
                message: format!("Sensor {} showing abnormal readings", anomaly.sensor_id),
                timestamp: anomaly.timestamp,
                actions: SENSOR_ALERT_ACTIONS.iter().map(|a| a.to_string()).collect(),
            });
        }

        for prediction in &state.context.maintenance_predictions {
            if prediction.risk_level < self.min_risk {
                continue;
            }
            let severity = if prediction.risk_level == RiskLevel::Critical {
                AlertSeverity::Critical
            } else {
                AlertSeverity::Warning
            };
            raised.push(Alert {
                id: sequence_id("alert", existing + raised.len()),
                kind: AlertKind::MaintenancePrediction,
                severity,
                title: "Maintenance Required".to_string(),
                message: format!("Equipment {} requires attention", prediction.equipment_id),
                timestamp: state.timestamp,
                actions: prediction.recommended_actions.clone(),
            });
        }

        info!(
            raised = raised.len(),
            critical = raised
                .iter()
                .filter(|a| a.severity == AlertSeverity::Critical)
                .count(),
            "Alerts generated"
        );
        state.alerts.extend(raised);
        Ok(())
    }
}
