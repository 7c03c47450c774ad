//! Stage 5: actionable recommendations from energy and maintenance findings.

use async_trait::async_trait;
use tracing::info;

use crate::pipeline::{sequence_id, PipelineState};
use crate::types::{
    Impact, MaintenancePrediction, Recommendation, RecommendationKind, RiskLevel, ScheduleWindow,
};
use crate::workflow::Stage;

const ENERGY_PRIORITY: u8 = 8;

/// Maintenance priority by urgency bucket.
pub fn window_priority(window: ScheduleWindow) -> u8 {
    match window {
        ScheduleWindow::Immediate => 9,
        ScheduleWindow::ThisWeek => 8,
        ScheduleWindow::ThisMonth => 7,
        ScheduleWindow::NextQuarter => 6,
    }
}

fn risk_impact(risk: RiskLevel) -> Impact {
    match risk {
        RiskLevel::Critical => Impact::Critical,
        RiskLevel::High => Impact::High,
        RiskLevel::Medium | RiskLevel::Low => Impact::Medium,
    }
}

pub struct RecommendationEngine {
    min_risk: RiskLevel,
}

impl RecommendationEngine {
    /// Predictions at or above `min_risk` produce a recommendation.
    pub fn new(min_risk: RiskLevel) -> Self {
        Self { min_risk }
    }

    fn maintenance_recommendation(
        &self,
        id: String,
        prediction: &MaintenancePrediction,
    ) -> Recommendation {
        Recommendation {
            id,
            kind: RecommendationKind::Maintenance,
            title: "Preventive Maintenance".to_string(),
            description: format!("Schedule maintenance for equipment {}", prediction.equipment_id),
            impact: risk_impact(prediction.risk_level),
            estimated_savings: None,
            actions: prediction.recommended_actions.clone(),
            priority: window_priority(ScheduleWindow::for_prediction(prediction)),
        }
    }
}

#[async_trait]
impl Stage<PipelineState> for RecommendationEngine {
    async fn run(&self, state: &mut PipelineState) -> anyhow::Result<()> {
        let existing = state.recommendations.len();
        let mut produced: Vec<Recommendation> = Vec::new();

        for opt in &state.context.energy_optimizations {
            produced.push(Recommendation {
                id: sequence_id("rec", existing + produced.len()),
                kind: RecommendationKind::EnergyOptimization,
                title: "Energy Consumption Optimization".to_string(),
                description: format!("Reduce energy consumption in building {}", opt.building_id),
                impact: Impact::High,
                estimated_savings: Some(opt.estimated_cost_savings),
                actions: opt.recommendations.clone(),
                priority: ENERGY_PRIORITY,
            });
        }

        for prediction in &state.context.maintenance_predictions {
            if prediction.risk_level < self.min_risk {
                continue;
            }
            let id = sequence_id("rec", existing + produced.len());
            produced.push(self.maintenance_recommendation(id, prediction));
        }

        info!(count = produced.len(), "Recommendations generated");
        state.recommendations.extend(produced);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EnergyOptimization, EnergyReadings, SensorReadings};

    fn prediction(id: &str, risk: RiskLevel, days: u32) -> MaintenancePrediction {
        MaintenancePrediction {
            equipment_id: id.to_string(),
            failure_probability: 0.5,
            days_to_failure: days,
            confidence_score: 0.9,
            risk_level: risk,
            recommended_actions: vec!["Monitor performance trends".to_string()],
            estimated_cost: 100.0,
            factors: vec!["Normal operating conditions".to_string()],
        }
    }

    #[tokio::test]
    async fn test_energy_then_maintenance_recommendations() {
        let mut state = PipelineState::new(1, SensorReadings::new(), EnergyReadings::new());
        state.context.energy_optimizations.push(EnergyOptimization {
            building_id: "bld-001".to_string(),
            current_consumption: 1350.0,
            baseline: 1200.0,
            potential_savings: 202.5,
            estimated_cost_savings: 30.375,
            recommendations: vec!["Optimize equipment runtime".to_string()],
        });
        state.context.maintenance_predictions = vec![
            prediction("eq-low", RiskLevel::Low, 300),
            prediction("eq-med", RiskLevel::Medium, 60),
            prediction("eq-high", RiskLevel::High, 5),
            prediction("eq-crit", RiskLevel::Critical, 200),
        ];

        RecommendationEngine::new(RiskLevel::Medium)
            .run(&mut state)
            .await
            .unwrap();

        let summary: Vec<(&str, Impact, u8)> = state
            .recommendations
            .iter()
            .map(|r| (r.id.as_str(), r.impact, r.priority))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("rec-1", Impact::High, 8),
                ("rec-2", Impact::Medium, 6),
                ("rec-3", Impact::High, 8),
                ("rec-4", Impact::Critical, 9),
            ]
        );
        assert_eq!(state.recommendations[0].estimated_savings, Some(30.375));
        assert_eq!(
            state.recommendations[0].description,
            "Reduce energy consumption in building bld-001"
        );
        assert_eq!(
            state.recommendations[3].description,
            "Schedule maintenance for equipment eq-crit"
        );
        assert!(state.recommendations[3].estimated_savings.is_none());
    }

    #[test]
    fn test_priorities_follow_urgency() {
        let ordered: Vec<u8> = ScheduleWindow::ALL.iter().map(|w| window_priority(*w)).collect();
        assert_eq!(ordered, vec![9, 8, 7, 6]);
    }
}
