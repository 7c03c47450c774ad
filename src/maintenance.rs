//! Predictive Maintenance Engine
//!
//! Facade over the scoring module and a shared anomaly detector. The pipeline
//! and the CLI go through this type rather than calling the detector
//! directly, so the "model not trained" condition is handled in one place:
//! the first prediction bootstraps the detector from history when available,
//! otherwise from a seeded synthetic fleet.
//!
//! The detector lives behind `Arc<RwLock<..>>`. Predictions take a shared
//! lock; training takes the exclusive lock and re-checks `is_trained()` so
//! concurrent first calls fit only once.

use std::sync::{Arc, RwLock};

use tracing::{debug, info, warn};

use crate::config::defaults::{BOOTSTRAP_SAMPLES, BOOTSTRAP_SEED};
use crate::config::DetectorConfig;
use crate::detector::{synthetic_fleet, AnomalyDetector, DetectorError, EnvelopeDetector};
use crate::scoring::{self, BatchScore, ScoringError};
use crate::types::{EquipmentTelemetry, FeatureVector, MaintenancePrediction, MaintenanceSchedule};

/// Shared, cheaply cloneable maintenance engine.
#[derive(Clone)]
pub struct MaintenanceEngine {
    detector: Arc<RwLock<Box<dyn AnomalyDetector>>>,
    bootstrap_samples: usize,
    bootstrap_seed: u64,
}

impl Default for MaintenanceEngine {
    fn default() -> Self {
        Self::new(Box::new(EnvelopeDetector::default()))
    }
}

impl MaintenanceEngine {
    pub fn new(detector: Box<dyn AnomalyDetector>) -> Self {
        Self {
            detector: Arc::new(RwLock::new(detector)),
            bootstrap_samples: BOOTSTRAP_SAMPLES,
            bootstrap_seed: BOOTSTRAP_SEED,
        }
    }

    /// Envelope detector tuned from the `[detector]` config section.
    pub fn from_config(config: &DetectorConfig) -> Self {
        Self::new(Box::new(EnvelopeDetector::new(config.sigma)))
            .with_bootstrap(config.bootstrap_samples, config.bootstrap_seed)
    }

    pub fn with_bootstrap(mut self, samples: usize, seed: u64) -> Self {
        self.bootstrap_samples = samples;
        self.bootstrap_seed = seed;
        self
    }

    pub fn detector_name(&self) -> String {
        self.detector
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .name()
            .to_string()
    }

    pub fn is_trained(&self) -> bool {
        self.detector
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_trained()
    }

    /// Fit the detector on historical telemetry, replacing any previous model.
    pub fn train(&self, history: &[EquipmentTelemetry]) -> Result<(), DetectorError> {
        let rows: Vec<FeatureVector> = history.iter().map(EquipmentTelemetry::features).collect();
        let mut detector = self.detector.write().unwrap_or_else(|e| e.into_inner());
        detector.fit(&rows)?;
        info!(
            detector = detector.name(),
            samples = rows.len(),
            "Maintenance detector trained on history"
        );
        Ok(())
    }

    /// Train from the synthetic fleet if no model exists yet.
    pub fn ensure_trained(&self) -> Result<(), DetectorError> {
        self.ensure_trained_with(&[])
    }

    /// Train if no model exists yet, preferring `history` and falling back
    /// to the synthetic fleet when history is empty or unusable.
    pub fn ensure_trained_with(&self, history: &[EquipmentTelemetry]) -> Result<(), DetectorError> {
        if self.is_trained() {
            return Ok(());
        }

        let mut detector = self.detector.write().unwrap_or_else(|e| e.into_inner());
        // Another caller may have trained while we waited for the lock
        if detector.is_trained() {
            return Ok(());
        }

        if !history.is_empty() {
            let rows: Vec<FeatureVector> =
                history.iter().map(EquipmentTelemetry::features).collect();
            match detector.fit(&rows) {
                Ok(()) => {
                    info!(samples = rows.len(), "Detector bootstrapped from equipment history");
                    return Ok(());
                }
                Err(e) => {
                    warn!(error = %e, "Equipment history unusable for training, using synthetic fleet");
                }
            }
        }

        let fleet = synthetic_fleet(self.bootstrap_samples, self.bootstrap_seed);
        let rows: Vec<FeatureVector> = fleet.iter().map(EquipmentTelemetry::features).collect();
        detector.fit(&rows)?;
        info!(
            samples = rows.len(),
            seed = self.bootstrap_seed,
            "Detector bootstrapped from synthetic fleet"
        );
        Ok(())
    }

    /// One anomaly flag per item. Detector problems degrade to "not
    /// anomalous" with a warning; they never fail the caller.
    pub fn detect(&self, equipment: &[EquipmentTelemetry]) -> Vec<bool> {
        if equipment.is_empty() {
            return Vec::new();
        }
        if let Err(e) = self.ensure_trained() {
            warn!(error = %e, "Detector bootstrap failed, treating all telemetry as normal");
            return vec![false; equipment.len()];
        }

        let rows: Vec<FeatureVector> = equipment.iter().map(EquipmentTelemetry::features).collect();
        let detector = self.detector.read().unwrap_or_else(|e| e.into_inner());
        match detector.predict(&rows) {
            Ok(flags) => {
                debug!(
                    items = flags.len(),
                    anomalous = flags.iter().filter(|f| **f).count(),
                    "Anomaly detection complete"
                );
                flags
            }
            Err(e) => {
                warn!(error = %e, "Anomaly detection failed, treating all telemetry as normal");
                vec![false; equipment.len()]
            }
        }
    }

    /// Score one equipment item.
    pub fn predict(
        &self,
        equipment: &EquipmentTelemetry,
    ) -> Result<MaintenancePrediction, ScoringError> {
        let anomaly = self
            .detect(std::slice::from_ref(equipment))
            .first()
            .copied()
            .unwrap_or(false);
        scoring::score(equipment, anomaly)
    }

    /// Score a batch, isolating per-item failures.
    pub fn batch_predict(&self, equipment: &[EquipmentTelemetry]) -> BatchScore {
        let flags = self.detect(equipment);
        scoring::score_all(equipment, &flags)
    }

    pub fn schedule(&self, predictions: &[MaintenancePrediction]) -> MaintenanceSchedule {
        scoring::build_schedule(predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RiskLevel, ScheduleWindow};

    fn equipment(id: &str, kind: &str, temperature: f64) -> EquipmentTelemetry {
        EquipmentTelemetry {
            equipment_id: id.to_string(),
            equipment_type: kind.to_string(),
            age_years: 8.5,
            usage_hours: 35_000.0,
            temperature,
            vibration: 3.2,
            pressure: 85.0,
            current_draw: 45.2,
            last_maintenance_days: 120,
            maintenance_history: Vec::new(),
            failure_history: Vec::new(),
        }
    }

    #[test]
    fn test_predict_bootstraps_lazily() {
        let engine = MaintenanceEngine::default();
        assert!(!engine.is_trained());

        let prediction = engine.predict(&equipment("eq-001", "hvac", 32.5)).unwrap();
        assert!(engine.is_trained());
        assert_eq!(prediction.equipment_id, "eq-001");
        assert_eq!(prediction.risk_level, RiskLevel::Medium);
        assert_eq!(prediction.days_to_failure, 256);
    }

    #[test]
    fn test_far_outlier_is_forced_critical() {
        let engine = MaintenanceEngine::default();
        let flags = engine.detect(&[
            equipment("normal", "hvac", 30.0),
            equipment("melting", "hvac", 400.0),
        ]);
        assert_eq!(flags, vec![false, true]);

        let prediction = engine.predict(&equipment("melting", "hvac", 400.0)).unwrap();
        assert_eq!(prediction.risk_level, RiskLevel::Critical);
        assert_eq!(
            prediction.recommended_actions.last().map(String::as_str),
            Some("Investigate unusual sensor readings")
        );
    }

    #[test]
    fn test_history_training_takes_precedence() {
        let engine = MaintenanceEngine::default();
        // History where every unit runs hot: 60-64 °C is normal here
        let history: Vec<EquipmentTelemetry> = (0..10)
            .map(|i| equipment(&format!("h-{i}"), "hvac", 60.0 + f64::from(i % 5)))
            .collect();
        engine.ensure_trained_with(&history).unwrap();

        let flags = engine.detect(&[equipment("hot", "hvac", 62.0)]);
        assert_eq!(flags, vec![false]);
    }

    #[test]
    fn test_unusable_history_falls_back_to_synthetic() {
        let engine = MaintenanceEngine::default();
        let mut bad = equipment("bad", "pump", 25.0);
        bad.vibration = f64::NAN;
        engine.ensure_trained_with(&[bad.clone(), bad]).unwrap();
        assert!(engine.is_trained());
    }

    #[test]
    fn test_batch_isolates_failures_and_keeps_order() {
        let engine = MaintenanceEngine::default();
        let mut broken = equipment("eq-bad", "pump", 25.0);
        broken.usage_hours = -5.0;
        let batch = engine.batch_predict(&[
            equipment("eq-a", "hvac", 25.0),
            broken,
            equipment("eq-c", "generator", 25.0),
        ]);

        let ids: Vec<&str> = batch
            .predictions
            .iter()
            .map(|p| p.equipment_id.as_str())
            .collect();
        assert_eq!(ids, vec!["eq-a", "eq-c"]);
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].equipment_id, "eq-bad");

        let schedule = engine.schedule(&batch.predictions);
        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule.window(ScheduleWindow::NextQuarter).len(), 2);
    }

    #[test]
    fn test_concurrent_first_use_trains_once() {
        let engine = MaintenanceEngine::default();
        std::thread::scope(|scope| {
            for i in 0..4 {
                let engine = engine.clone();
                scope.spawn(move || {
                    let batch = engine.batch_predict(&[equipment(&format!("eq-{i}"), "pump", 25.0)]);
                    assert_eq!(batch.predictions.len(), 1);
                });
            }
        });
        assert!(engine.is_trained());
    }

    #[test]
    fn test_train_replaces_bootstrapped_model() {
        let engine = MaintenanceEngine::default();
        engine.ensure_trained().unwrap();
        // Synthetic fleet runs at 20-40 °C, so 62 °C is far outside it
        assert_eq!(engine.detect(&[equipment("hot", "hvac", 62.0)]), vec![true]);

        let history: Vec<EquipmentTelemetry> = (0..10)
            .map(|i| equipment(&format!("h-{i}"), "hvac", 60.0 + f64::from(i % 5)))
            .collect();
        engine.train(&history).unwrap();
        assert_eq!(engine.detect(&[equipment("hot", "hvac", 62.0)]), vec![false]);
    }

    #[test]
    fn test_train_rejects_short_history_and_keeps_model() {
        let engine = MaintenanceEngine::default();
        engine.ensure_trained().unwrap();
        let result = engine.train(&[equipment("only", "hvac", 25.0)]);
        assert!(matches!(result, Err(DetectorError::InsufficientData { .. })));
        assert!(engine.is_trained());
        assert_eq!(engine.detector_name(), "envelope");
    }

    #[test]
    fn test_constant_history_column_does_not_force_critical() {
        let engine = MaintenanceEngine::default();
        let history: Vec<EquipmentTelemetry> = (0..10)
            .map(|i| {
                let mut eq = equipment(&format!("h-{i}"), "hvac", 30.0 + f64::from(i % 5));
                eq.pressure = 0.0;
                eq
            })
            .collect();
        engine.train(&history).unwrap();

        let mut unit = equipment("eq-001", "hvac", 32.5);
        unit.pressure = 0.5;
        let prediction = engine.predict(&unit).unwrap();
        assert_eq!(prediction.risk_level, RiskLevel::Medium);
        assert_eq!(prediction.days_to_failure, 256);
    }
}
