//! Shared data model for campus intelligence.
//!
//! - `equipment`: registry telemetry and the seven-field feature vector
//! - `readings`: raw sensor and energy-meter inputs
//! - `prediction`: scoring output, risk levels and the maintenance schedule
//! - `records`: alerts, recommendations, decisions and other stage output

mod equipment;
mod prediction;
mod readings;
mod records;

pub use equipment::*;
pub use prediction::*;
pub use readings::*;
pub use records::*;
