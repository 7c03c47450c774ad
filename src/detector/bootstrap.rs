//! Synthetic equipment fleet for bootstrapping an untrained detector.
//!
//! Used only when the registry has no historical telemetry. The RNG is seeded
//! so two bootstraps with the same seed learn the same envelope.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::EquipmentTelemetry;

const SYNTHETIC_TYPES: [&str; 4] = ["hvac", "elevator", "generator", "pump"];

/// Generate `count` plausible telemetry records from fixed uniform ranges.
pub fn synthetic_fleet(count: usize, seed: u64) -> Vec<EquipmentTelemetry> {
    let mut rng = StdRng::seed_from_u64(seed);

    (0..count)
        .map(|i| EquipmentTelemetry {
            equipment_id: format!("synthetic-{i:03}"),
            equipment_type: SYNTHETIC_TYPES[rng.gen_range(0..SYNTHETIC_TYPES.len())].to_string(),
            age_years: rng.gen_range(1.0..20.0),
            usage_hours: rng.gen_range(1_000.0..50_000.0),
            temperature: rng.gen_range(20.0..40.0),
            vibration: rng.gen_range(0.0..10.0),
            pressure: rng.gen_range(0.0..100.0),
            current_draw: rng.gen_range(10.0..100.0),
            last_maintenance_days: rng.gen_range(1..365),
            maintenance_history: Vec::new(),
            failure_history: Vec::new(),
        })
        .collect()
}
