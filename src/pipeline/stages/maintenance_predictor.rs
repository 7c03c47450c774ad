//! Stage 2: score the equipment snapshot and schedule maintenance.
//!
//! A registry snapshot failure fails the stage. Per-item scoring failures do
//! not: they are recorded in `context.scoring_failures` and the rest of the
//! batch is scored.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use tracing::{info, warn};

use crate::maintenance::MaintenanceEngine;
use crate::pipeline::PipelineState;
use crate::registry::EquipmentRegistry;
use crate::types::{MaintenanceRequest, ScheduleWindow};
use crate::workflow::Stage;

/// Windows urgent enough to open a maintenance request.
const REQUEST_WINDOWS: [ScheduleWindow; 2] = [ScheduleWindow::Immediate, ScheduleWindow::ThisWeek];

pub struct MaintenancePredictor {
    engine: MaintenanceEngine,
    registry: Arc<dyn EquipmentRegistry>,
}

impl MaintenancePredictor {
    pub fn new(engine: MaintenanceEngine, registry: Arc<dyn EquipmentRegistry>) -> Self {
        Self { engine, registry }
    }

    /// Bootstrap the detector from registry history the first time through.
    async fn ensure_detector(&self) {
        if self.engine.is_trained() {
            return;
        }
        let history = match self.registry.history().await {
            Ok(history) => history,
            Err(e) => {
                warn!(error = %e, "Equipment history unavailable, bootstrapping from synthetic fleet");
                Vec::new()
            }
        };
        if let Err(e) = self.engine.ensure_trained_with(&history) {
            warn!(error = %e, "Detector bootstrap failed");
        }
    }
}

#[async_trait]
impl Stage<PipelineState> for MaintenancePredictor {
    async fn run(&self, state: &mut PipelineState) -> anyhow::Result<()> {
        let equipment = self.registry.snapshot().await.with_context(|| {
            format!(
                "failed to load equipment snapshot from {} registry",
                self.registry.registry_name()
            )
        })?;

        self.ensure_detector().await;

        let engine = self.engine.clone();
        let batch = tokio::task::spawn_blocking(move || engine.batch_predict(&equipment))
            .await
            .context("equipment scoring task panicked")?;
        let schedule = self.engine.schedule(&batch.predictions);

        for window in REQUEST_WINDOWS {
            for prediction in schedule.window(window) {
                let request = MaintenanceRequest {
                    id: state.next_request_id(),
                    equipment_id: prediction.equipment_id.clone(),
                    risk_level: prediction.risk_level,
                    window,
                    days_to_failure: prediction.days_to_failure,
                    estimated_cost: prediction.estimated_cost,
                    actions: prediction.recommended_actions.clone(),
                };
                state.maintenance_requests.push(request);
            }
        }

        info!(
            scored = batch.predictions.len(),
            failed = batch.failures.len(),
            immediate = schedule.immediate.len(),
            this_week = schedule.this_week.len(),
            requests = state.maintenance_requests.len(),
            "Maintenance predicted"
        );

        state.context.maintenance_predictions = batch.predictions;
        state.context.scoring_failures = batch.failures;
        state.context.maintenance_schedule = Some(schedule);
        Ok(())
    }
}
