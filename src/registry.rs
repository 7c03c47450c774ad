//! Equipment registry abstraction.
//!
//! The maintenance predictor pulls the current equipment snapshot (one
//! telemetry record per item) and, when the detector is untrained, the
//! historical telemetry it can learn from. Where that data lives is up to the
//! implementation: [`InMemoryRegistry`] for embedding and tests,
//! [`JsonFileRegistry`] for the CLI.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::types::EquipmentTelemetry;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("equipment registry unavailable: {0}")]
    Unavailable(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid equipment JSON in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Source of equipment telemetry.
///
/// A snapshot error fails the maintenance predictor stage (and with it the
/// run); history is optional and defaults to empty.
#[async_trait]
pub trait EquipmentRegistry: Send + Sync {
    /// Current telemetry, one record per equipment item.
    async fn snapshot(&self) -> Result<Vec<EquipmentTelemetry>, RegistryError>;

    /// Historical telemetry for detector training.
    async fn history(&self) -> Result<Vec<EquipmentTelemetry>, RegistryError> {
        Ok(Vec::new())
    }

    /// Human-readable name for logging (e.g. "in-memory", "json-file")
    fn registry_name(&self) -> &str;
}

// ============================================================================
// In-memory registry
// ============================================================================

/// Registry backed by vectors held in memory. The snapshot can be swapped
/// between cycles.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    snapshot: RwLock<Vec<EquipmentTelemetry>>,
    history: Vec<EquipmentTelemetry>,
}

impl InMemoryRegistry {
    pub fn new(snapshot: Vec<EquipmentTelemetry>) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
            history: Vec::new(),
        }
    }

    pub fn with_history(mut self, history: Vec<EquipmentTelemetry>) -> Self {
        self.history = history;
        self
    }

    /// Replace the equipment snapshot served to subsequent cycles.
    pub fn replace_snapshot(&self, snapshot: Vec<EquipmentTelemetry>) {
        *self.snapshot.write().unwrap_or_else(|e| e.into_inner()) = snapshot;
    }
}

#[async_trait]
impl EquipmentRegistry for InMemoryRegistry {
    async fn snapshot(&self) -> Result<Vec<EquipmentTelemetry>, RegistryError> {
        Ok(self
            .snapshot
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone())
    }

    async fn history(&self) -> Result<Vec<EquipmentTelemetry>, RegistryError> {
        Ok(self.history.clone())
    }

    fn registry_name(&self) -> &str {
        "in-memory"
    }
}

// ============================================================================
// JSON file registry
// ============================================================================

/// Registry that re-reads a JSON array of telemetry records on every
/// snapshot, so edits to the file are picked up by the next cycle.
#[derive(Debug, Clone)]
pub struct JsonFileRegistry {
    snapshot_path: PathBuf,
    history_path: Option<PathBuf>,
}

impl JsonFileRegistry {
    pub fn new(snapshot_path: impl Into<PathBuf>) -> Self {
        Self {
            snapshot_path: snapshot_path.into(),
            history_path: None,
        }
    }

    pub fn with_history(mut self, history_path: impl Into<PathBuf>) -> Self {
        self.history_path = Some(history_path.into());
        self
    }
}

#[async_trait]
impl EquipmentRegistry for JsonFileRegistry {
    async fn snapshot(&self) -> Result<Vec<EquipmentTelemetry>, RegistryError> {
        read_equipment_json(&self.snapshot_path).await
    }

    async fn history(&self) -> Result<Vec<EquipmentTelemetry>, RegistryError> {
        match &self.history_path {
            Some(path) => read_equipment_json(path).await,
            None => Ok(Vec::new()),
        }
    }

    fn registry_name(&self) -> &str {
        "json-file"
    }
}

/// Read a JSON array of [`EquipmentTelemetry`] from disk.
pub async fn read_equipment_json(path: &Path) -> Result<Vec<EquipmentTelemetry>, RegistryError> {
    let shown = path.display().to_string();
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| RegistryError::Io {
            path: shown.clone(),
            source,
        })?;
    let equipment: Vec<EquipmentTelemetry> =
        serde_json::from_str(&contents).map_err(|source| RegistryError::Parse {
            path: shown.clone(),
            source,
        })?;
    debug!(path = %shown, items = equipment.len(), "Equipment file loaded");
    Ok(equipment)
}
