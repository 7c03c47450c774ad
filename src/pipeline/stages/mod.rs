//! The six campus analysis stages.
//!
//! ```text
//! sensor_monitor ─► maintenance_predictor ─► energy_optimizer
//!        ─► alert_generator ─► recommendation_engine ─► decision_maker ─► END
//! ```
//!
//! Each stage reads what earlier stages left in `PipelineState::context` and
//! appends its own findings. Stages hold only configuration and shared
//! services; all per-run data lives in the state.

mod alert_generator;
mod decision_maker;
mod energy_optimizer;
mod maintenance_predictor;
mod recommendation_engine;
mod sensor_monitor;

pub use alert_generator::AlertGenerator;
pub use decision_maker::{DecisionMaker, AUTO_APPROVE_REASON};
pub use energy_optimizer::{EnergyOptimizer, ENERGY_ACTIONS};
pub use maintenance_predictor::MaintenancePredictor;
pub use recommendation_engine::RecommendationEngine;
pub use sensor_monitor::SensorMonitor;

pub const SENSOR_MONITOR: &str = "sensor_monitor";
pub const MAINTENANCE_PREDICTOR: &str = "maintenance_predictor";
pub const ENERGY_OPTIMIZER: &str = "energy_optimizer";
pub const ALERT_GENERATOR: &str = "alert_generator";
pub const RECOMMENDATION_ENGINE: &str = "recommendation_engine";
pub const DECISION_MAKER: &str = "decision_maker";

/// Fixed execution order of a campus run.
pub const STAGE_ORDER: [&str; 6] = [
    SENSOR_MONITOR,
    MAINTENANCE_PREDICTOR,
    ENERGY_OPTIMIZER,
    ALERT_GENERATOR,
    RECOMMENDATION_ENGINE,
    DECISION_MAKER,
];
