//! Pipeline Regression Tests
//!
//! Runs full campus cycles over the built-in demo dataset and asserts on the
//! records each stage leaves behind. The detector is trained from registry
//! history built out of the demo fleet itself, so none of the demo equipment
//! is flagged and the risk levels follow from scoring alone.

use std::sync::Arc;

use campus_sentinel::config::CampusConfig;
use campus_sentinel::demo::{demo_energy, demo_equipment, demo_sensors};
use campus_sentinel::pipeline::stages::{AUTO_APPROVE_REASON, STAGE_ORDER};
use campus_sentinel::pipeline::{CampusPipeline, PipelineState, RunHistory};
use campus_sentinel::registry::InMemoryRegistry;
use campus_sentinel::types::{
    AlertKind, Decision, EquipmentTelemetry, RecommendationKind, RiskLevel,
};
use campus_sentinel::MaintenanceEngine;
use chrono::{TimeZone, Utc};

fn demo_history() -> Vec<EquipmentTelemetry> {
    (0..10).flat_map(|_| demo_equipment()).collect()
}

fn demo_pipeline(snapshot: Vec<EquipmentTelemetry>) -> CampusPipeline {
    let registry = InMemoryRegistry::new(snapshot).with_history(demo_history());
    CampusPipeline::new(
        &CampusConfig::default(),
        MaintenanceEngine::default(),
        Arc::new(registry),
        RunHistory::new(16),
    )
    .unwrap()
}

#[tokio::test]
async fn demo_cycle_visits_every_stage_in_order() {
    let pipeline = demo_pipeline(demo_equipment());
    pipeline
        .process(demo_sensors(), demo_energy())
        .await
        .unwrap();

    let state = pipeline.history().latest().unwrap();
    assert_eq!(state.visited_stages, STAGE_ORDER.to_vec());
    assert!(pipeline.engine().is_trained());
}

#[tokio::test]
async fn demo_cycle_produces_expected_records() {
    let pipeline = demo_pipeline(demo_equipment());
    let timestamp = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    let state = PipelineState::new(1, demo_sensors(), demo_energy()).with_timestamp(timestamp);
    let report = pipeline.process_state(state).await.unwrap();

    // Only the hot temperature sensor is out of band
    let anomalies = &report.context.sensor_anomalies;
    assert_eq!(anomalies.len(), 1);
    assert_eq!(anomalies[0].sensor_id, "sensor-001");
    assert_eq!(anomalies[0].timestamp, timestamp);

    // Only bld-001 is above the consumption threshold
    let optimizations = &report.context.energy_optimizations;
    assert_eq!(optimizations.len(), 1);
    assert_eq!(optimizations[0].building_id, "bld-001");
    assert!((optimizations[0].potential_savings - 202.5).abs() < 1e-9);
    assert!((optimizations[0].estimated_cost_savings - 30.375).abs() < 1e-9);

    // Both machines score medium risk: no maintenance alerts, no work requests
    let predictions = &report.context.maintenance_predictions;
    assert_eq!(predictions.len(), 2);
    assert!(predictions.iter().all(|p| p.risk_level == RiskLevel::Medium));
    assert_eq!(predictions[0].days_to_failure, 256);
    assert_eq!(predictions[1].days_to_failure, 136);
    assert!(report.maintenance_requests.is_empty());
    let schedule = report.context.maintenance_schedule.as_ref().unwrap();
    assert_eq!(schedule.next_quarter.len(), 2);

    assert_eq!(report.alerts.len(), 1);
    assert_eq!(report.alerts[0].id, "alert-1");
    assert_eq!(report.alerts[0].kind, AlertKind::SensorAnomaly);

    let ids: Vec<&str> = report.recommendations.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["rec-1", "rec-2", "rec-3"]);
    assert_eq!(
        report.recommendations[0].kind,
        RecommendationKind::EnergyOptimization
    );
    assert!(report.recommendations[1..]
        .iter()
        .all(|r| r.kind == RecommendationKind::Maintenance && r.priority == 6));

    // Energy recommendation is auto-approved; nothing is critical
    assert_eq!(report.context.decisions.len(), 1);
    match &report.context.decisions[0] {
        Decision::AutoApproved {
            recommendation_id,
            reason,
            ..
        } => {
            assert_eq!(recommendation_id, "rec-1");
            assert_eq!(reason, AUTO_APPROVE_REASON);
        }
        other => panic!("unexpected decision {other:?}"),
    }
}

#[tokio::test]
async fn bad_equipment_is_skipped_without_failing_the_cycle() {
    let mut snapshot = demo_equipment();
    let mut broken = snapshot[0].clone();
    broken.equipment_id = "eq-bad".to_string();
    broken.temperature = f64::NAN;
    snapshot.push(broken);

    let pipeline = demo_pipeline(snapshot);
    let report = pipeline
        .process(demo_sensors(), demo_energy())
        .await
        .unwrap();

    assert_eq!(report.context.maintenance_predictions.len(), 2);
    assert_eq!(report.context.scoring_failures.len(), 1);
    assert_eq!(report.context.scoring_failures[0].equipment_id, "eq-bad");
    assert_eq!(pipeline.history().len(), 1);
}

#[tokio::test]
async fn critical_equipment_requires_human_review() {
    let mut snapshot = demo_equipment();
    let worn = &mut snapshot[1];
    worn.age_years = 40.0;
    worn.usage_hours = 120_000.0;
    worn.vibration = 18.0;
    worn.last_maintenance_days = 900;

    let pipeline = demo_pipeline(snapshot);
    let report = pipeline
        .process(demo_sensors(), demo_energy())
        .await
        .unwrap();

    let critical = report
        .context
        .maintenance_predictions
        .iter()
        .find(|p| p.equipment_id == "eq-002")
        .unwrap();
    assert_eq!(critical.risk_level, RiskLevel::Critical);

    assert_eq!(report.maintenance_requests.len(), 1);
    assert_eq!(report.maintenance_requests[0].id, "mr-1");
    assert_eq!(report.maintenance_requests[0].equipment_id, "eq-002");

    let review = report
        .context
        .decisions
        .iter()
        .find_map(|d| match d {
            Decision::HumanReviewRequired { alert_ids, .. } => Some(alert_ids.clone()),
            Decision::AutoApproved { .. } => None,
        })
        .unwrap();
    assert_eq!(review, vec!["alert-2".to_string()]);
}

#[tokio::test]
async fn run_ids_increase_across_cycles() {
    let pipeline = demo_pipeline(demo_equipment());
    for expected in 1..=3 {
        let report = pipeline
            .process(demo_sensors(), demo_energy())
            .await
            .unwrap();
        assert_eq!(report.run_id, expected);
    }
    let ids: Vec<u64> = pipeline.history().recent(3).iter().map(|s| s.run_id).collect();
    assert_eq!(ids, vec![3, 2, 1]);
}
