//! Pipeline State and Cycle Report
//!
//! `PipelineState` is the value the workflow executor threads through the six
//! campus stages. One is created per run, owned by the executor while the run
//! lasts and lent to each stage in turn.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{
    Alert, AlertSeverity, Decision, EnergyOptimization, EnergyReadings, MaintenancePrediction,
    MaintenanceRequest, MaintenanceSchedule, Recommendation, ScoringFailure, SensorAnomaly,
    SensorReadings,
};
use crate::workflow::WorkflowState;

// ============================================================================
// Context
// ============================================================================

/// Intermediate results passed forward between stages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineContext {
    /// Sensor monitor
    pub sensor_anomalies: Vec<SensorAnomaly>,

    /// Maintenance predictor
    pub maintenance_predictions: Vec<MaintenancePrediction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_schedule: Option<MaintenanceSchedule>,
    pub scoring_failures: Vec<ScoringFailure>,

    /// Energy optimizer
    pub energy_optimizations: Vec<EnergyOptimization>,

    /// Decision maker
    pub decisions: Vec<Decision>,

    /// Free-form values for stages added by embedders
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

// ============================================================================
// Pipeline State
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineState {
    /// Monotonic per pipeline instance
    pub run_id: u64,

    pub sensor_data: SensorReadings,
    pub energy_data: EnergyReadings,

    pub alerts: Vec<Alert>,
    pub recommendations: Vec<Recommendation>,
    pub maintenance_requests: Vec<MaintenanceRequest>,

    pub context: PipelineContext,

    /// Stage currently (or last) executing
    pub current_task: Option<String>,

    /// Fixed at run start; every record of the run carries it
    pub timestamp: DateTime<Utc>,

    /// Stages entered so far, in order
    pub visited_stages: Vec<String>,
}

impl PipelineState {
    pub fn new(run_id: u64, sensor_data: SensorReadings, energy_data: EnergyReadings) -> Self {
        Self {
            run_id,
            sensor_data,
            energy_data,
            alerts: Vec::new(),
            recommendations: Vec::new(),
            maintenance_requests: Vec::new(),
            context: PipelineContext::default(),
            current_task: None,
            timestamp: Utc::now(),
            visited_stages: Vec::new(),
        }
    }

    /// Pin the run timestamp (replays and tests).
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn next_request_id(&self) -> String {
        sequence_id("mr", self.maintenance_requests.len())
    }

    pub fn critical_alert_ids(&self) -> Vec<String> {
        self.alerts
            .iter()
            .filter(|alert| alert.severity == AlertSeverity::Critical)
            .map(|alert| alert.id.clone())
            .collect()
    }
}

/// Run-scoped record id: `{prefix}-{existing + 1}`.
pub fn sequence_id(prefix: &str, existing: usize) -> String {
    format!("{prefix}-{}", existing + 1)
}

impl WorkflowState for PipelineState {
    fn enter_stage(&mut self, name: &str) {
        self.current_task = Some(name.to_string());
        self.visited_stages.push(name.to_string());
    }
}

// ============================================================================
// Cycle Report
// ============================================================================

/// Outward result of one evaluation cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    pub run_id: u64,
    pub timestamp: DateTime<Utc>,
    pub alerts: Vec<Alert>,
    pub recommendations: Vec<Recommendation>,
    pub maintenance_requests: Vec<MaintenanceRequest>,
    pub context: PipelineContext,
}

impl From<&PipelineState> for CycleReport {
    fn from(state: &PipelineState) -> Self {
        Self {
            run_id: state.run_id,
            timestamp: state.timestamp,
            alerts: state.alerts.clone(),
            recommendations: state.recommendations.clone(),
            maintenance_requests: state.maintenance_requests.clone(),
            context: state.context.clone(),
        }
    }
}
