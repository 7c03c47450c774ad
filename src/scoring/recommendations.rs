//! Recommended maintenance actions per risk level and equipment family.

use crate::types::{EquipmentKind, EquipmentTelemetry, RiskLevel};

const CRITICAL_ACTIONS: &[&str] = &[
    "Schedule immediate inspection",
    "Prepare replacement parts",
    "Consider temporary shutdown if safe",
    "Notify maintenance team urgently",
];

const HIGH_ACTIONS: &[&str] = &[
    "Schedule maintenance within 1 week",
    "Order replacement parts",
    "Increase monitoring frequency",
    "Plan for potential downtime",
];

const MEDIUM_ACTIONS: &[&str] = &[
    "Schedule preventive maintenance",
    "Review maintenance procedures",
    "Monitor performance trends",
];

const LOW_ACTIONS: &[&str] = &["Continue regular monitoring", "Maintain current schedule"];

const ELEVATOR_ACTIONS: &[&str] = &[
    "Inspect cables and pulleys",
    "Check safety systems",
    "Lubricate moving parts",
];

const GENERATOR_ACTIONS: &[&str] = &[
    "Test under load conditions",
    "Check fuel system",
    "Inspect electrical connections",
];

const HVAC_HOT_RUNNING_ACTION: &str = "Check cooling system efficiency";
const HVAC_FILTER_ACTION: &str = "Inspect and replace filters if needed";

/// Appended last when the detector flagged the telemetry.
pub const INVESTIGATE_ACTION: &str = "Investigate unusual sensor readings";

/// HVAC units running above this temperature (°C) get a cooling check.
const HVAC_HOT_RUNNING_C: f64 = 30.0;

fn base_actions(risk: RiskLevel) -> &'static [&'static str] {
    match risk {
        RiskLevel::Critical => CRITICAL_ACTIONS,
        RiskLevel::High => HIGH_ACTIONS,
        RiskLevel::Medium => MEDIUM_ACTIONS,
        RiskLevel::Low => LOW_ACTIONS,
    }
}

/// Ordered action list: risk-level base actions, then equipment-specific
/// actions, then the investigation action when anomalous.
pub fn recommended_actions(
    equipment: &EquipmentTelemetry,
    risk: RiskLevel,
    anomaly: bool,
) -> Vec<String> {
    let mut actions: Vec<&str> = base_actions(risk).to_vec();

    match equipment.kind() {
        EquipmentKind::Hvac => {
            if equipment.temperature > HVAC_HOT_RUNNING_C {
                actions.push(HVAC_HOT_RUNNING_ACTION);
            }
            actions.push(HVAC_FILTER_ACTION);
        }
        EquipmentKind::Elevator => actions.extend_from_slice(ELEVATOR_ACTIONS),
        EquipmentKind::Generator => actions.extend_from_slice(GENERATOR_ACTIONS),
        EquipmentKind::Pump | EquipmentKind::Lighting | EquipmentKind::Other => {}
    }

    if anomaly {
        actions.push(INVESTIGATE_ACTION);
    }

    actions.into_iter().map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn equipment(kind: &str, temperature: f64) -> EquipmentTelemetry {
        EquipmentTelemetry {
            equipment_id: "eq-x".to_string(),
            equipment_type: kind.to_string(),
            age_years: 1.0,
            usage_hours: 1.0,
            temperature,
            vibration: 1.0,
            pressure: 1.0,
            current_draw: 1.0,
            last_maintenance_days: 1,
            maintenance_history: Vec::new(),
            failure_history: Vec::new(),
        }
    }

    #[test]
    fn test_cool_hvac_skips_cooling_check() {
        let actions = recommended_actions(&equipment("hvac", 22.0), RiskLevel::Low, false);
        assert_eq!(
            actions,
            vec![
                "Continue regular monitoring",
                "Maintain current schedule",
                "Inspect and replace filters if needed",
            ]
        );
    }

    #[test]
    fn test_elevator_critical_with_anomaly() {
        let actions = recommended_actions(&equipment("elevator", 22.0), RiskLevel::Critical, true);
        assert_eq!(actions.len(), CRITICAL_ACTIONS.len() + ELEVATOR_ACTIONS.len() + 1);
        assert_eq!(actions[0], "Schedule immediate inspection");
        assert_eq!(actions[4], "Inspect cables and pulleys");
        assert_eq!(actions.last().map(String::as_str), Some(INVESTIGATE_ACTION));
    }

    #[test]
    fn test_pump_gets_base_actions_only() {
        let actions = recommended_actions(&equipment("pump", 50.0), RiskLevel::High, false);
        assert_eq!(actions, HIGH_ACTIONS.to_vec());
    }
}
