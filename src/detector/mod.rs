//! Pluggable Anomaly Detection for Equipment Telemetry
//!
//! The maintenance engine asks a detector whether each telemetry sample sits
//! outside the learned "normal" envelope. Detectors implement
//! [`AnomalyDetector`] so a statistical or rule-based model can be swapped in
//! without touching pipeline wiring.
//!
//! ## Lifecycle
//!
//! 1. `fit()` on historical feature vectors (or a synthetic bootstrap fleet)
//! 2. `predict()` returns one boolean per row
//!
//! Calling `predict()` before `fit()` returns [`DetectorError::NotTrained`].
//! The engine owning the detector bootstraps it lazily, so end users never see
//! that error.

mod bootstrap;
mod envelope;

pub use bootstrap::synthetic_fleet;
pub use envelope::{EnvelopeDetector, FeatureEnvelope};

use thiserror::Error;

use crate::types::FeatureVector;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DetectorError {
    #[error("model not trained")]
    NotTrained,

    #[error("insufficient training data: need {needed} rows, have {available}")]
    InsufficientData { needed: usize, available: usize },

    #[error("non-finite {feature} in training row {row}")]
    NonFinite { row: usize, feature: &'static str },
}

/// Outlier detector over the seven-field telemetry feature space.
///
/// Shared behind a reader-writer lock: `predict` runs under shared access,
/// `fit` under exclusive access.
pub trait AnomalyDetector: Send + Sync {
    /// Detector name for logs (e.g. "envelope")
    fn name(&self) -> &str;

    /// Learn the normal operating envelope, replacing any previous model.
    fn fit(&mut self, rows: &[FeatureVector]) -> Result<(), DetectorError>;

    /// Flag each row as anomalous (`true`) or normal.
    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<bool>, DetectorError>;

    fn is_trained(&self) -> bool;
}
