//! Property tests: scoring bounds and orderings hold for arbitrary telemetry.
//!
//! Covers probability and day bounds, anomaly forcing critical risk, risk
//! monotonicity in failure probability, the schedule partition and per-item
//! failure isolation in batches.

use campus_sentinel::scoring::{self, ScoringError};
use campus_sentinel::types::{EquipmentKind, EquipmentTelemetry, RiskLevel, ScheduleWindow};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_equipment_type() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("hvac"),
        Just("elevator"),
        Just("generator"),
        Just("pump"),
        Just("lighting"),
        Just("boiler"),
    ]
}

fn arb_kind() -> impl Strategy<Value = EquipmentKind> {
    prop_oneof![
        Just(EquipmentKind::Hvac),
        Just(EquipmentKind::Elevator),
        Just(EquipmentKind::Generator),
        Just(EquipmentKind::Pump),
        Just(EquipmentKind::Lighting),
        Just(EquipmentKind::Other),
    ]
}

/// Valid telemetry spanning well past every normalizer.
fn arb_equipment() -> impl Strategy<Value = EquipmentTelemetry> {
    (
        arb_equipment_type(),
        0.0f64..60.0,
        0.0f64..200_000.0,
        -20.0f64..150.0,
        0.0f64..40.0,
        -10.0f64..300.0,
        0.0f64..200.0,
        0u32..2000,
    )
        .prop_map(
            |(kind, age, usage, temperature, vibration, pressure, current, last)| {
                EquipmentTelemetry {
                    equipment_id: "eq".to_string(),
                    equipment_type: kind.to_string(),
                    age_years: age,
                    usage_hours: usage,
                    temperature,
                    vibration,
                    pressure,
                    current_draw: current,
                    last_maintenance_days: last,
                    maintenance_history: Vec::new(),
                    failure_history: Vec::new(),
                }
            },
        )
}

/// A fleet with unique ids and one anomaly flag per item.
fn arb_fleet(max: usize) -> impl Strategy<Value = (Vec<EquipmentTelemetry>, Vec<bool>)> {
    prop::collection::vec((arb_equipment(), any::<bool>()), 1..max).prop_map(|items| {
        items
            .into_iter()
            .enumerate()
            .map(|(i, (mut eq, flag))| {
                eq.equipment_id = format!("eq-{i:04}");
                (eq, flag)
            })
            .unzip()
    })
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// Every prediction stays within its documented ranges.
    #[test]
    fn predictions_stay_within_bounds(equipment in arb_equipment(), anomaly in any::<bool>()) {
        let p = scoring::score(&equipment, anomaly).unwrap();
        prop_assert!((0.01..=0.99).contains(&p.failure_probability));
        prop_assert!(p.days_to_failure >= 1);
        prop_assert!((0.0..=0.95).contains(&p.confidence_score));
        prop_assert!(p.estimated_cost >= 0.0);
        prop_assert!(!p.factors.is_empty());
        prop_assert!(!p.recommended_actions.is_empty());
    }

    /// A detector flag always yields critical risk.
    #[test]
    fn anomaly_always_forces_critical(equipment in arb_equipment()) {
        let p = scoring::score(&equipment, true).unwrap();
        prop_assert_eq!(p.risk_level, RiskLevel::Critical);
    }

    /// Higher failure probability never lowers the risk level.
    #[test]
    fn risk_is_monotone_in_probability(
        a in 0.01f64..=0.99,
        b in 0.01f64..=0.99,
        kind in arb_kind(),
    ) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let low_risk = scoring::risk_level(low, scoring::days_to_failure(low, kind), false);
        let high_risk = scoring::risk_level(high, scoring::days_to_failure(high, kind), false);
        prop_assert!(low_risk <= high_risk, "{} at p={} vs {} at p={}", low_risk, low, high_risk, high);
    }

    /// Each prediction lands in exactly one window, the one its rule picks.
    #[test]
    fn schedule_partitions_predictions((equipment, flags) in arb_fleet(40)) {
        let batch = scoring::score_all(&equipment, &flags);
        prop_assert_eq!(batch.predictions.len(), equipment.len());

        let schedule = scoring::build_schedule(&batch.predictions);
        prop_assert_eq!(schedule.len(), batch.predictions.len());

        for window in ScheduleWindow::ALL {
            for p in schedule.window(window) {
                prop_assert_eq!(ScheduleWindow::for_prediction(p), window);
                if p.risk_level == RiskLevel::Critical || p.days_to_failure <= 3 {
                    prop_assert_eq!(window, ScheduleWindow::Immediate);
                }
            }
        }

        for p in &batch.predictions {
            let hits = ScheduleWindow::ALL
                .iter()
                .filter(|w| schedule.window(**w).iter().any(|s| s.equipment_id == p.equipment_id))
                .count();
            prop_assert_eq!(hits, 1);
        }
    }

    /// One unscoreable item out of N leaves N-1 predictions in input order.
    #[test]
    fn batch_isolates_one_bad_item(
        (mut equipment, flags) in arb_fleet(30),
        pick in any::<prop::sample::Index>(),
    ) {
        let bad = pick.index(equipment.len());
        equipment[bad].vibration = f64::NAN;

        let batch = scoring::score_all(&equipment, &flags);
        prop_assert_eq!(batch.predictions.len(), equipment.len() - 1);
        prop_assert_eq!(batch.failures.len(), 1);
        prop_assert_eq!(&batch.failures[0].equipment_id, &equipment[bad].equipment_id);

        let ids: Vec<&str> = batch.predictions.iter().map(|p| p.equipment_id.as_str()).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        prop_assert_eq!(ids, sorted);
    }
}

#[test]
fn invalid_readings_name_the_field() {
    let mut equipment = EquipmentTelemetry {
        equipment_id: "eq-1".to_string(),
        equipment_type: "pump".to_string(),
        age_years: 3.0,
        usage_hours: 1_000.0,
        temperature: 25.0,
        vibration: 1.0,
        pressure: 10.0,
        current_draw: 5.0,
        last_maintenance_days: 30,
        maintenance_history: Vec::new(),
        failure_history: Vec::new(),
    };
    equipment.usage_hours = -1.0;
    assert_eq!(
        scoring::score(&equipment, false),
        Err(ScoringError::Negative {
            field: "usage_hours",
            value: -1.0
        })
    );
}
