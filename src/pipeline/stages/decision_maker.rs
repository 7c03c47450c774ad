//! Stage 6: autonomous decisions.
//!
//! Energy recommendations without critical impact are approved
//! automatically. Any critical alert routes the run to a human.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::pipeline::PipelineState;
use crate::types::{Decision, Impact, RecommendationKind};
use crate::workflow::Stage;

pub const AUTO_APPROVE_REASON: &str = "Low risk energy optimization";

#[derive(Debug, Default)]
pub struct DecisionMaker;

impl DecisionMaker {
    pub fn decide(state: &PipelineState) -> Vec<Decision> {
        let mut decisions: Vec<Decision> = state
            .recommendations
            .iter()
            .filter(|rec| {
                rec.kind == RecommendationKind::EnergyOptimization && rec.impact != Impact::Critical
            })
            .map(|rec| Decision::AutoApproved {
                recommendation_id: rec.id.clone(),
                reason: AUTO_APPROVE_REASON.to_string(),
                timestamp: state.timestamp,
            })
            .collect();

        let critical = state.critical_alert_ids();
        if !critical.is_empty() {
            decisions.push(Decision::HumanReviewRequired {
                reason: format!("{} critical alerts require immediate attention", critical.len()),
                alert_ids: critical,
                timestamp: state.timestamp,
            });
        }
        decisions
    }
}

#[async_trait]
impl Stage<PipelineState> for DecisionMaker {
    async fn run(&self, state: &mut PipelineState) -> anyhow::Result<()> {
        let decisions = Self::decide(state);
        let escalated = decisions
            .iter()
            .any(|d| matches!(d, Decision::HumanReviewRequired { .. }));
        if escalated {
            warn!(
                critical_alerts = state.critical_alert_ids().len(),
                "Critical alerts escalated for human review"
            );
        }
        info!(decisions = decisions.len(), "Decisions made");
        state.context.decisions = decisions;
        Ok(())
    }
}
