//! Maintenance schedule bucketing.

use crate::types::{MaintenancePrediction, MaintenanceSchedule, ScheduleWindow};

/// Partition predictions into the four schedule windows.
///
/// Every prediction lands in exactly one window (see
/// [`ScheduleWindow::for_prediction`]); input order is kept within a window.
pub fn build_schedule(predictions: &[MaintenancePrediction]) -> MaintenanceSchedule {
    let mut schedule = MaintenanceSchedule::default();
    for prediction in predictions {
        schedule
            .window_mut(ScheduleWindow::for_prediction(prediction))
            .push(prediction.clone());
    }
    schedule
}
