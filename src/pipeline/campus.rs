//! Campus Pipeline
//!
//! Wires the six analysis stages into one workflow and runs evaluation
//! cycles over it. Each cycle builds a fresh `PipelineState`, lets the
//! executor thread it through the stages and, on success, appends the final
//! state to the run history. A failed cycle records nothing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use tracing::{info, warn};

use super::stages::{
    AlertGenerator, DecisionMaker, EnergyOptimizer, MaintenancePredictor, RecommendationEngine,
    SensorMonitor, ALERT_GENERATOR, DECISION_MAKER, ENERGY_OPTIMIZER, MAINTENANCE_PREDICTOR,
    RECOMMENDATION_ENGINE, SENSOR_MONITOR, STAGE_ORDER,
};
use super::{CycleReport, PipelineState, RunHistory};
use crate::config::CampusConfig;
use crate::maintenance::MaintenanceEngine;
use crate::registry::EquipmentRegistry;
use crate::storage::RunArchive;
use crate::types::{EnergyReadings, SensorReadings};
use crate::workflow::{RunFailure, Workflow, WorkflowError, END};

pub struct CampusPipeline {
    workflow: Workflow<PipelineState>,
    history: RunHistory,
    engine: MaintenanceEngine,
    next_run_id: AtomicU64,
}

impl CampusPipeline {
    pub fn new(
        config: &CampusConfig,
        engine: MaintenanceEngine,
        registry: Arc<dyn EquipmentRegistry>,
        history: RunHistory,
    ) -> Result<Self, WorkflowError> {
        let workflow = Self::build_workflow(config, engine.clone(), registry)?;
        Ok(Self {
            workflow,
            history,
            engine,
            next_run_id: AtomicU64::new(0),
        })
    }

    /// Engine, history and optional archive all derived from `config`.
    pub fn from_config(
        config: &CampusConfig,
        registry: Arc<dyn EquipmentRegistry>,
    ) -> anyhow::Result<Self> {
        let engine = MaintenanceEngine::from_config(&config.detector);
        let mut history = RunHistory::new(config.history.capacity);
        if let Some(path) = &config.history.archive_path {
            let archive = RunArchive::open(path)
                .with_context(|| format!("failed to open run archive at {}", path.display()))?;
            info!(path = %path.display(), archived = archive.count(), "Run archive opened");
            history = history.with_archive(archive);
        }
        Ok(Self::new(config, engine, registry, history)?)
    }

    /// The fixed six-stage chain ending at `END`.
    pub fn build_workflow(
        config: &CampusConfig,
        engine: MaintenanceEngine,
        registry: Arc<dyn EquipmentRegistry>,
    ) -> Result<Workflow<PipelineState>, WorkflowError> {
        let mut workflow = Workflow::new();
        workflow
            .register_stage(SENSOR_MONITOR, SensorMonitor::new(config.sensors.clone()))?
            .register_stage(
                MAINTENANCE_PREDICTOR,
                MaintenancePredictor::new(engine, registry),
            )?
            .register_stage(ENERGY_OPTIMIZER, EnergyOptimizer::new(config.energy.clone()))?
            .register_stage(
                ALERT_GENERATOR,
                AlertGenerator::new(config.pipeline.alert_min_risk),
            )?
            .register_stage(
                RECOMMENDATION_ENGINE,
                RecommendationEngine::new(config.pipeline.recommendation_min_risk),
            )?
            .register_stage(DECISION_MAKER, DecisionMaker)?;

        for pair in STAGE_ORDER.windows(2) {
            workflow.connect(pair[0], pair[1])?;
        }
        workflow.connect(DECISION_MAKER, END)?;
        workflow.set_entry(SENSOR_MONITOR);
        Ok(workflow)
    }

    pub fn workflow(&self) -> &Workflow<PipelineState> {
        &self.workflow
    }

    pub fn history(&self) -> &RunHistory {
        &self.history
    }

    pub fn engine(&self) -> &MaintenanceEngine {
        &self.engine
    }

    /// Run one evaluation cycle over fresh readings.
    pub async fn process(
        &self,
        sensors: SensorReadings,
        energy: EnergyReadings,
    ) -> Result<CycleReport, RunFailure<PipelineState>> {
        let run_id = self.next_run_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.process_state(PipelineState::new(run_id, sensors, energy))
            .await
    }

    /// Run one evaluation cycle over a caller-built state (e.g. one with a
    /// pinned timestamp).
    pub async fn process_state(
        &self,
        state: PipelineState,
    ) -> Result<CycleReport, RunFailure<PipelineState>> {
        let run_id = state.run_id;
        let started = Instant::now();
        info!(
            run_id,
            sensors = state.sensor_data.len(),
            buildings = state.energy_data.len(),
            "Campus cycle started"
        );

        let state = match self.workflow.run(state).await {
            Ok(state) => state,
            Err(failure) => {
                warn!(
                    run_id,
                    stage = %failure.stage,
                    error = %failure.error,
                    "Campus cycle failed, nothing recorded"
                );
                return Err(failure);
            }
        };

        let report = CycleReport::from(&state);
        info!(
            run_id,
            alerts = report.alerts.len(),
            recommendations = report.recommendations.len(),
            maintenance_requests = report.maintenance_requests.len(),
            decisions = report.context.decisions.len(),
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Campus cycle complete"
        );
        self.history.append(state);
        Ok(report)
    }
}
