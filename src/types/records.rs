//! Records produced by the pipeline stages: anomalies, optimizations,
//! alerts, recommendations, decisions and maintenance requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{RiskLevel, ScheduleWindow};

// ============================================================================
// Stage intermediates
// ============================================================================

/// Sensor reading outside its configured band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorAnomaly {
    pub sensor_id: String,
    pub sensor_type: String,
    pub value: f64,
    pub unit: String,
    /// Always "threshold_exceeded" for band checks
    pub anomaly_type: String,
    pub severity: AlertSeverity,
    pub timestamp: DateTime<Utc>,
}

/// Consumption-reduction opportunity for one building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyOptimization {
    pub building_id: String,
    pub current_consumption: f64,
    pub baseline: f64,
    /// kWh
    pub potential_savings: f64,
    /// USD
    pub estimated_cost_savings: f64,
    pub recommendations: Vec<String>,
}

/// Equipment that could not be scored in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringFailure {
    pub equipment_id: String,
    pub error: String,
}

// ============================================================================
// Alerts
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Warning,
    Critical,
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertSeverity::Warning => write!(f, "WARNING"),
            AlertSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    SensorAnomaly,
    MaintenancePrediction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// "alert-N", numbered within a run
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub actions: Vec<String>,
}

// ============================================================================
// Recommendations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    EnergyOptimization,
    Maintenance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// "rec-N", numbered within a run
    pub id: String,
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub title: String,
    pub description: String,
    pub impact: Impact,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_savings: Option<f64>,
    pub actions: Vec<String>,
    /// 6-9 for maintenance, 8 for energy
    pub priority: u8,
}

// ============================================================================
// Decisions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Decision {
    AutoApproved {
        recommendation_id: String,
        reason: String,
        timestamp: DateTime<Utc>,
    },
    HumanReviewRequired {
        reason: String,
        alert_ids: Vec<String>,
        timestamp: DateTime<Utc>,
    },
}

// ============================================================================
// Maintenance Requests
// ============================================================================

/// Work request handed to the ticketing collaborator for urgent predictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceRequest {
    /// "mr-N", numbered within a run
    pub id: String,
    pub equipment_id: String,
    pub risk_level: RiskLevel,
    pub window: ScheduleWindow,
    pub days_to_failure: u32,
    pub estimated_cost: f64,
    pub actions: Vec<String>,
}
