//! Maintenance Scoring Module
//!
//! Deterministic, rule-based failure scoring for campus equipment. Every
//! output field is a fixed function of one telemetry record plus the anomaly
//! flag supplied by the detector, so identical inputs always produce identical
//! predictions.
//!
//! # Scoring Algorithm
//!
//! Failure probability is a weighted sum of five factors, each normalized to
//! [0, 1] and the total clamped to [0.01, 0.99]:
//!
//! | Factor                | Normalization              | Weight |
//! |-----------------------|----------------------------|--------|
//! | Age                   | age_years / 20             | 30%    |
//! | Usage                 | usage_hours / 50 000       | 25%    |
//! | Temperature stress    | (temperature − 25) / 50    | 20%    |
//! | Vibration             | vibration / 10             | 15%    |
//! | Maintenance recency   | last_maintenance_days / 365| 10%    |
//!
//! Days to failure, risk level, cost, confidence, contributing factors and
//! recommended actions are derived from that probability and the equipment
//! type. An anomaly flag forces `critical` risk regardless of probability.

mod recommendations;
mod schedule;

pub use recommendations::recommended_actions;
pub use schedule::build_schedule;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::types::{
    EquipmentKind, EquipmentTelemetry, MaintenancePrediction, RiskLevel, ScoringFailure,
};

// ============================================================================
// Scoring Constants
// ============================================================================

pub const AGE_NORMALIZER_YEARS: f64 = 20.0;
pub const USAGE_NORMALIZER_HOURS: f64 = 50_000.0;
/// Temperature (°C) above which thermal stress starts to count.
pub const TEMPERATURE_STRESS_ONSET_C: f64 = 25.0;
pub const TEMPERATURE_NORMALIZER_C: f64 = 50.0;
pub const VIBRATION_NORMALIZER_MM_S: f64 = 10.0;
pub const MAINTENANCE_NORMALIZER_DAYS: f64 = 365.0;

pub const WEIGHT_AGE: f64 = 0.30;
pub const WEIGHT_USAGE: f64 = 0.25;
pub const WEIGHT_TEMPERATURE: f64 = 0.20;
pub const WEIGHT_VIBRATION: f64 = 0.15;
pub const WEIGHT_MAINTENANCE: f64 = 0.10;

pub const MIN_FAILURE_PROBABILITY: f64 = 0.01;
pub const MAX_FAILURE_PROBABILITY: f64 = 0.99;

const DAYS_PER_YEAR: f64 = 365.0;

const BASE_CONFIDENCE: f64 = 0.70;
const MAX_HISTORY_CONFIDENCE: f64 = 0.20;
const SENSOR_CONSISTENCY_CONFIDENCE: f64 = 0.10;
const MAX_AGE_CONFIDENCE: f64 = 0.10;
pub const MAX_CONFIDENCE: f64 = 0.95;

/// Factor tag emitted when no threshold fires.
pub const NORMAL_CONDITIONS: &str = "Normal operating conditions";

// ============================================================================
// Errors
// ============================================================================

/// Telemetry that cannot be scored. Batch scoring isolates these per item.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error("equipment id is empty")]
    MissingId,

    #[error("{field} is not a finite number ({value})")]
    NonFinite { field: &'static str, value: f64 },

    #[error("{field} must be non-negative (got {value})")]
    Negative { field: &'static str, value: f64 },
}

// ============================================================================
// Single-item scoring
// ============================================================================

/// Score one telemetry record.
///
/// `anomaly` is the detector's verdict for the same record; it forces a
/// `critical` risk level and adds an investigation action.
pub fn score(
    equipment: &EquipmentTelemetry,
    anomaly: bool,
) -> Result<MaintenancePrediction, ScoringError> {
    validate(equipment)?;

    let kind = equipment.kind();
    let failure_probability = failure_probability(equipment);
    let days_to_failure = days_to_failure(failure_probability, kind);
    let risk_level = risk_level(failure_probability, days_to_failure, anomaly);

    Ok(MaintenancePrediction {
        equipment_id: equipment.equipment_id.clone(),
        failure_probability,
        days_to_failure,
        confidence_score: confidence(equipment),
        risk_level,
        recommended_actions: recommended_actions(equipment, risk_level, anomaly),
        estimated_cost: estimated_cost(equipment, risk_level),
        factors: contributing_factors(equipment, anomaly),
    })
}

fn validate(equipment: &EquipmentTelemetry) -> Result<(), ScoringError> {
    if equipment.equipment_id.trim().is_empty() {
        return Err(ScoringError::MissingId);
    }

    // (field, value, must be non-negative)
    let readings = [
        ("age_years", equipment.age_years, true),
        ("usage_hours", equipment.usage_hours, true),
        ("temperature", equipment.temperature, false),
        ("vibration", equipment.vibration, true),
        ("pressure", equipment.pressure, false),
        ("current_draw", equipment.current_draw, false),
    ];
    for (field, value, non_negative) in readings {
        if !value.is_finite() {
            return Err(ScoringError::NonFinite { field, value });
        }
        if non_negative && value < 0.0 {
            return Err(ScoringError::Negative { field, value });
        }
    }
    Ok(())
}

/// Weighted five-factor failure probability, clamped to [0.01, 0.99].
pub fn failure_probability(equipment: &EquipmentTelemetry) -> f64 {
    let age = unit(equipment.age_years / AGE_NORMALIZER_YEARS);
    let usage = unit(equipment.usage_hours / USAGE_NORMALIZER_HOURS);
    let temperature =
        unit((equipment.temperature - TEMPERATURE_STRESS_ONSET_C) / TEMPERATURE_NORMALIZER_C);
    let vibration = unit(equipment.vibration / VIBRATION_NORMALIZER_MM_S);
    let maintenance =
        unit(f64::from(equipment.last_maintenance_days) / MAINTENANCE_NORMALIZER_DAYS);

    let probability = age * WEIGHT_AGE
        + usage * WEIGHT_USAGE
        + temperature * WEIGHT_TEMPERATURE
        + vibration * WEIGHT_VIBRATION
        + maintenance * WEIGHT_MAINTENANCE;

    probability.clamp(MIN_FAILURE_PROBABILITY, MAX_FAILURE_PROBABILITY)
}

fn unit(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// Expected service life multiplier per equipment family.
pub fn lifetime_multiplier(kind: EquipmentKind) -> f64 {
    match kind {
        EquipmentKind::Hvac => 1.2,
        EquipmentKind::Elevator => 0.8,
        EquipmentKind::Generator => 1.5,
        EquipmentKind::Pump => 1.0,
        EquipmentKind::Lighting => 2.0,
        EquipmentKind::Other => 1.0,
    }
}

/// `round((1 - p) * 365)` scaled by the family's lifetime multiplier,
/// truncated to whole days and never below 1.
pub fn days_to_failure(failure_probability: f64, kind: EquipmentKind) -> u32 {
    let base_days = ((1.0 - failure_probability) * DAYS_PER_YEAR).round();
    let days = (base_days * lifetime_multiplier(kind)).floor().max(1.0);
    // p >= 0.01 bounds this well below u32::MAX
    days as u32
}

/// First matching rule wins, most severe first.
pub fn risk_level(failure_probability: f64, days_to_failure: u32, anomaly: bool) -> RiskLevel {
    if anomaly || failure_probability > 0.8 || days_to_failure <= 7 {
        RiskLevel::Critical
    } else if failure_probability > 0.6 || days_to_failure <= 30 {
        RiskLevel::High
    } else if failure_probability > 0.4 || days_to_failure <= 90 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Base maintenance cost (USD) per equipment family.
pub fn base_cost(kind: EquipmentKind) -> f64 {
    match kind {
        EquipmentKind::Hvac => 800.0,
        EquipmentKind::Elevator => 2500.0,
        EquipmentKind::Generator => 1500.0,
        EquipmentKind::Pump => 600.0,
        EquipmentKind::Lighting => 200.0,
        EquipmentKind::Other => 1000.0,
    }
}

pub fn risk_cost_multiplier(risk: RiskLevel) -> f64 {
    match risk {
        RiskLevel::Critical => 2.5,
        RiskLevel::High => 1.8,
        RiskLevel::Medium => 1.2,
        RiskLevel::Low => 1.0,
    }
}

/// Older equipment costs proportionally more to service.
pub fn estimated_cost(equipment: &EquipmentTelemetry, risk: RiskLevel) -> f64 {
    let age_multiplier = 1.0 + equipment.age_years / AGE_NORMALIZER_YEARS;
    base_cost(equipment.kind()) * risk_cost_multiplier(risk) * age_multiplier
}

/// Confidence grows with maintenance history and equipment age; capped at 0.95.
pub fn confidence(equipment: &EquipmentTelemetry) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let history = (equipment.maintenance_history.len() as f64 / 10.0).min(MAX_HISTORY_CONFIDENCE);
    let age = (equipment.age_years / 10.0).min(MAX_AGE_CONFIDENCE);

    (BASE_CONFIDENCE + history + SENSOR_CONSISTENCY_CONFIDENCE + age).min(MAX_CONFIDENCE)
}

/// Tags for every threshold crossed, or a single normal-conditions tag.
pub fn contributing_factors(equipment: &EquipmentTelemetry, anomaly: bool) -> Vec<String> {
    let mut factors = Vec::new();

    if equipment.age_years > 10.0 {
        factors.push("Equipment age");
    }
    if equipment.usage_hours > 30_000.0 {
        factors.push("High usage hours");
    }
    if equipment.temperature > 30.0 {
        factors.push("Elevated temperature");
    }
    if equipment.vibration > 5.0 {
        factors.push("Excessive vibration");
    }
    if equipment.last_maintenance_days > 180 {
        factors.push("Overdue maintenance");
    }
    if anomaly {
        factors.push("Anomalous sensor readings");
    }
    if equipment.failure_history.len() > 2 {
        factors.push("Previous failure history");
    }

    if factors.is_empty() {
        factors.push(NORMAL_CONDITIONS);
    }
    factors.into_iter().map(String::from).collect()
}

// ============================================================================
// Batch scoring
// ============================================================================

/// Outcome of scoring a batch: successes in input order plus isolated failures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchScore {
    pub predictions: Vec<MaintenancePrediction>,
    pub failures: Vec<ScoringFailure>,
}

/// Score every item; one item's failure never prevents scoring the rest.
///
/// `anomaly_flags[i]` belongs to `equipment[i]`; a missing flag counts as
/// "not anomalous". Items are scored in parallel and reported in input order.
pub fn score_all(equipment: &[EquipmentTelemetry], anomaly_flags: &[bool]) -> BatchScore {
    let results: Vec<Result<MaintenancePrediction, ScoringError>> = equipment
        .par_iter()
        .enumerate()
        .map(|(i, eq)| score(eq, anomaly_flags.get(i).copied().unwrap_or(false)))
        .collect();

    let mut batch = BatchScore::default();
    for (eq, result) in equipment.iter().zip(results) {
        match result {
            Ok(prediction) => {
                debug!(
                    equipment_id = %prediction.equipment_id,
                    probability = prediction.failure_probability,
                    days = prediction.days_to_failure,
                    risk = %prediction.risk_level,
                    "Equipment scored"
                );
                batch.predictions.push(prediction);
            }
            Err(e) => {
                warn!(
                    equipment_id = %eq.equipment_id,
                    error = %e,
                    "Scoring failed, skipping equipment"
                );
                batch.failures.push(ScoringFailure {
                    equipment_id: eq.equipment_id.clone(),
                    error: e.to_string(),
                });
            }
        }
    }
    batch
}
