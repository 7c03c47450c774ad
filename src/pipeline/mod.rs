//! Campus Analysis Pipeline
//!
//! ```text
//! readings ─► PipelineState ─► Workflow (6 stages) ─► CycleReport
//!                                                 └─► RunHistory (+ archive)
//! ```
//!
//! `CampusPipeline` owns the wired workflow and the run history; `stages`
//! holds the per-stage transformations of the shared state.

mod campus;
mod history;
pub mod stages;
mod state;

pub use campus::CampusPipeline;
pub use history::RunHistory;
pub use state::*;
