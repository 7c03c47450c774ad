//! Built-in demo dataset.
//!
//! Used by the CLI for any input not supplied on the command line, so a bare
//! `campus-sentinel` run exercises every stage: one hot temperature sensor,
//! one building above the consumption threshold and two pieces of equipment.

use chrono::NaiveDate;

use crate::types::{
    EnergyReading, EnergyReadings, EquipmentTelemetry, HistoryEvent, SensorReading,
    SensorReadings,
};

pub fn demo_sensors() -> SensorReadings {
    [
        ("sensor-001", SensorReading::new("temperature", 35.0, "°C")),
        ("sensor-002", SensorReading::new("humidity", 45.0, "%")),
        ("sensor-003", SensorReading::new("energy", 1800.0, "kWh")),
    ]
    .into_iter()
    .map(|(id, reading)| (id.to_string(), reading))
    .collect()
}

pub fn demo_energy() -> EnergyReadings {
    [("bld-001", 1350.0, 1200.0), ("bld-002", 980.0, 1000.0)]
        .into_iter()
        .map(|(id, current, baseline)| {
            (
                id.to_string(),
                EnergyReading {
                    current_consumption: current,
                    baseline,
                },
            )
        })
        .collect()
}

fn event(year: i32, month: u32, day: u32, kind: &str) -> Vec<HistoryEvent> {
    NaiveDate::from_ymd_opt(year, month, day)
        .map(|date| HistoryEvent {
            date,
            kind: kind.to_string(),
        })
        .into_iter()
        .collect()
}

pub fn demo_equipment() -> Vec<EquipmentTelemetry> {
    vec![
        EquipmentTelemetry {
            equipment_id: "eq-001".to_string(),
            equipment_type: "hvac".to_string(),
            age_years: 8.5,
            usage_hours: 35_000.0,
            temperature: 32.5,
            vibration: 3.2,
            pressure: 85.0,
            current_draw: 45.2,
            last_maintenance_days: 120,
            maintenance_history: event(2024, 1, 15, "filter_change"),
            failure_history: Vec::new(),
        },
        EquipmentTelemetry {
            equipment_id: "eq-002".to_string(),
            equipment_type: "elevator".to_string(),
            age_years: 12.0,
            usage_hours: 45_000.0,
            temperature: 28.0,
            vibration: 6.8,
            pressure: 0.0,
            current_draw: 78.5,
            last_maintenance_days: 45,
            maintenance_history: event(2024, 2, 1, "safety_inspection"),
            failure_history: event(2023, 8, 15, "cable_wear"),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_histories_are_populated() {
        let equipment = demo_equipment();
        assert_eq!(equipment.len(), 2);
        assert_eq!(equipment[0].maintenance_history.len(), 1);
        assert_eq!(equipment[1].failure_history[0].kind, "cable_wear");
    }
}
