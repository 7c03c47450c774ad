//! Stage 3: propose consumption reductions for high-consumption buildings.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::EnergyConfig;
use crate::pipeline::PipelineState;
use crate::types::{EnergyOptimization, EnergyReading};
use crate::workflow::Stage;

pub const ENERGY_ACTIONS: [&str; 3] = [
    "Adjust HVAC temperature setpoints",
    "Implement smart lighting schedules",
    "Optimize equipment runtime",
];

pub struct EnergyOptimizer {
    config: EnergyConfig,
}

impl EnergyOptimizer {
    pub fn new(config: EnergyConfig) -> Self {
        Self { config }
    }

    /// `None` unless consumption is strictly above the threshold.
    pub fn optimize(
        &self,
        building_id: &str,
        reading: &EnergyReading,
    ) -> Option<EnergyOptimization> {
        if reading.current_consumption <= self.config.high_consumption_threshold_kwh {
            return None;
        }
        let potential_savings = reading.current_consumption * self.config.reduction_fraction;
        Some(EnergyOptimization {
            building_id: building_id.to_string(),
            current_consumption: reading.current_consumption,
            baseline: reading.baseline,
            potential_savings,
            estimated_cost_savings: potential_savings * self.config.cost_per_kwh,
            recommendations: ENERGY_ACTIONS.iter().map(|a| a.to_string()).collect(),
        })
    }
}

#[async_trait]
impl Stage<PipelineState> for EnergyOptimizer {
    async fn run(&self, state: &mut PipelineState) -> anyhow::Result<()> {
        let optimizations: Vec<EnergyOptimization> = state
            .energy_data
            .iter()
            .filter_map(|(building_id, reading)| self.optimize(building_id, reading))
            .collect();

        for opt in &optimizations {
            debug!(
                building_id = %opt.building_id,
                consumption = opt.current_consumption,
                savings_kwh = opt.potential_savings,
                "Energy optimization opportunity"
            );
        }
        info!(
            buildings = state.energy_data.len(),
            opportunities = optimizations.len(),
            "Energy consumption analysed"
        );
        state.context.energy_optimizations = optimizations;
        Ok(())
    }
}
