//! Campus Sentinel: Smart Campus Operational Intelligence
//!
//! Periodic analysis of a facility's sensors, equipment and energy meters.
//!
//! ## Architecture
//!
//! - **Workflow**: generic executor threading one state value through named
//!   stages along first-recorded edges
//! - **Scoring**: deterministic maintenance risk scoring for one telemetry record
//! - **Detector**: pluggable anomaly detection over the telemetry feature space
//! - **Maintenance Engine**: scoring + shared detector with lazy bootstrap
//! - **Pipeline**: the six campus stages wired into one workflow, plus run history
//! - **Storage**: optional Sled archive of completed cycle reports

pub mod config;
pub mod demo;
pub mod detector;
pub mod maintenance;
pub mod pipeline;
pub mod registry;
pub mod scoring;
pub mod storage;
pub mod types;
pub mod workflow;

// Re-export campus configuration
pub use config::CampusConfig;

// Re-export commonly used types
pub use types::{
    Alert, AlertSeverity, Decision, EnergyReading, EquipmentTelemetry, MaintenancePrediction,
    MaintenanceSchedule, Recommendation, RiskLevel, ScheduleWindow, SensorReading,
};

// Re-export the executor and pipeline entry points
pub use maintenance::MaintenanceEngine;
pub use pipeline::{CampusPipeline, CycleReport, PipelineState, RunHistory};
pub use registry::{EquipmentRegistry, InMemoryRegistry, JsonFileRegistry};
pub use workflow::{RunFailure, Stage, Workflow, WorkflowState, END};
