//! Z-score envelope detector.
//!
//! Learns a per-feature mean and standard deviation from training rows and
//! flags a row when any feature deviates from its mean by more than `sigma`
//! standard deviations, in either direction.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::info;

use super::{AnomalyDetector, DetectorError};
use crate::config::defaults::{
    DEFAULT_DETECTOR_SIGMA, FEATURE_STD_FLOORS, MIN_STD_FLOOR, MIN_TRAINING_ROWS,
};
use crate::types::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};

/// Learned distribution of one feature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureEnvelope {
    pub mean: f64,
    pub std_dev: f64,
    /// Absolute floor in feature units
    #[serde(default)]
    pub min_std: f64,
}

impl FeatureEnvelope {
    /// Standard deviation, floored by the feature's absolute minimum and by a
    /// small fraction of the mean.
    pub fn effective_std(&self) -> f64 {
        let relative = (self.mean.abs() * MIN_STD_FLOOR).max(MIN_STD_FLOOR);
        self.std_dev.max(self.min_std).max(relative)
    }

    pub fn z_score(&self, value: f64) -> f64 {
        (value - self.mean) / self.effective_std()
    }
}

/// Bidirectional z-score detector over all seven features.
#[derive(Debug, Clone)]
pub struct EnvelopeDetector {
    sigma: f64,
    envelope: Option<[FeatureEnvelope; FEATURE_COUNT]>,
}

impl Default for EnvelopeDetector {
    fn default() -> Self {
        Self::new(DEFAULT_DETECTOR_SIGMA)
    }
}

impl EnvelopeDetector {
    pub fn new(sigma: f64) -> Self {
        Self {
            sigma,
            envelope: None,
        }
    }

    /// Learned envelope, `None` until trained
    pub fn envelope(&self) -> Option<&[FeatureEnvelope; FEATURE_COUNT]> {
        self.envelope.as_ref()
    }

    /// Largest absolute z-score across the row's features.
    pub fn max_abs_z(&self, row: &FeatureVector) -> Result<f64, DetectorError> {
        let envelope = self.envelope.as_ref().ok_or(DetectorError::NotTrained)?;
        Ok(row
            .iter()
            .zip(envelope.iter())
            .map(|(value, feature)| feature.z_score(*value).abs())
            .fold(0.0, f64::max))
    }
}

impl AnomalyDetector for EnvelopeDetector {
    fn name(&self) -> &str {
        "envelope"
    }

    fn fit(&mut self, rows: &[FeatureVector]) -> Result<(), DetectorError> {
        if rows.len() < MIN_TRAINING_ROWS {
            return Err(DetectorError::InsufficientData {
                needed: MIN_TRAINING_ROWS,
                available: rows.len(),
            });
        }

        for (row_idx, row) in rows.iter().enumerate() {
            if let Some(feature_idx) = row.iter().position(|v| !v.is_finite()) {
                return Err(DetectorError::NonFinite {
                    row: row_idx,
                    feature: FEATURE_NAMES[feature_idx],
                });
            }
        }

        let mut envelope = [FeatureEnvelope::default(); FEATURE_COUNT];
        for (feature_idx, slot) in envelope.iter_mut().enumerate() {
            let column: Vec<f64> = rows.iter().map(|row| row[feature_idx]).collect();
            *slot = FeatureEnvelope {
                mean: column.iter().mean(),
                std_dev: column.iter().std_dev(),
                min_std: FEATURE_STD_FLOORS[feature_idx],
            };
        }

        info!(
            rows = rows.len(),
            sigma = self.sigma,
            "Anomaly envelope fitted"
        );
        self.envelope = Some(envelope);
        Ok(())
    }

    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<bool>, DetectorError> {
        rows.iter()
            .map(|row| self.max_abs_z(row).map(|z| z > self.sigma))
            .collect()
    }

    fn is_trained(&self) -> bool {
        self.envelope.is_some()
    }
}
