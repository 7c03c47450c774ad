//! Maintenance predictions and the four-window maintenance schedule.

use serde::{Deserialize, Serialize};

// ============================================================================
// Risk Level
// ============================================================================

/// Ordinal maintenance urgency. Ordering follows severity (`Low < Critical`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "LOW"),
            RiskLevel::Medium => write!(f, "MEDIUM"),
            RiskLevel::High => write!(f, "HIGH"),
            RiskLevel::Critical => write!(f, "CRITICAL"),
        }
    }
}

// ============================================================================
// Prediction
// ============================================================================

/// Scoring output for one equipment item. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenancePrediction {
    pub equipment_id: String,
    /// Clamped to [0.01, 0.99]
    pub failure_probability: f64,
    /// Always >= 1
    pub days_to_failure: u32,
    /// In [0, 0.95]
    pub confidence_score: f64,
    pub risk_level: RiskLevel,
    pub recommended_actions: Vec<String>,
    /// USD, >= 0
    pub estimated_cost: f64,
    /// Never empty
    pub factors: Vec<String>,
}

// ============================================================================
// Schedule
// ============================================================================

/// Maintenance window a prediction is scheduled into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleWindow {
    Immediate,
    ThisWeek,
    ThisMonth,
    NextQuarter,
}

impl ScheduleWindow {
    pub const ALL: [ScheduleWindow; 4] = [
        ScheduleWindow::Immediate,
        ScheduleWindow::ThisWeek,
        ScheduleWindow::ThisMonth,
        ScheduleWindow::NextQuarter,
    ];

    /// Classify one prediction. First matching rule wins:
    /// critical or <= 3 days, <= 7 days, <= 30 days, everything else.
    pub fn for_prediction(prediction: &MaintenancePrediction) -> Self {
        let days = prediction.days_to_failure;
        if prediction.risk_level == RiskLevel::Critical || days <= 3 {
            ScheduleWindow::Immediate
        } else if days <= 7 {
            ScheduleWindow::ThisWeek
        } else if days <= 30 {
            ScheduleWindow::ThisMonth
        } else {
            ScheduleWindow::NextQuarter
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleWindow::Immediate => "immediate",
            ScheduleWindow::ThisWeek => "this_week",
            ScheduleWindow::ThisMonth => "this_month",
            ScheduleWindow::NextQuarter => "next_quarter",
        }
    }
}

impl std::fmt::Display for ScheduleWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Predictions partitioned into four disjoint, exhaustive windows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceSchedule {
    pub immediate: Vec<MaintenancePrediction>,
    pub this_week: Vec<MaintenancePrediction>,
    pub this_month: Vec<MaintenancePrediction>,
    pub next_quarter: Vec<MaintenancePrediction>,
}

impl MaintenanceSchedule {
    pub fn window(&self, window: ScheduleWindow) -> &[MaintenancePrediction] {
        match window {
            ScheduleWindow::Immediate => &self.immediate,
            ScheduleWindow::ThisWeek => &self.this_week,
            ScheduleWindow::ThisMonth => &self.this_month,
            ScheduleWindow::NextQuarter => &self.next_quarter,
        }
    }

    pub(crate) fn window_mut(&mut self, window: ScheduleWindow) -> &mut Vec<MaintenancePrediction> {
        match window {
            ScheduleWindow::Immediate => &mut self.immediate,
            ScheduleWindow::ThisWeek => &mut self.this_week,
            ScheduleWindow::ThisMonth => &mut self.this_month,
            ScheduleWindow::NextQuarter => &mut self.next_quarter,
        }
    }

    /// Total predictions across all windows
    pub fn len(&self) -> usize {
        ScheduleWindow::ALL.iter().map(|w| self.window(*w).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_ordering() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
        assert!(RiskLevel::High < RiskLevel::Critical);
    }

    #[test]
    fn test_risk_serde_is_lowercase() {
        assert_eq!(serde_json::to_string(&RiskLevel::Critical).unwrap(), "\"critical\"");
        let parsed: RiskLevel = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(parsed, RiskLevel::Medium);
        assert_eq!(format!("{}", RiskLevel::High), "HIGH");
    }

    #[test]
    fn test_window_serde_names() {
        assert_eq!(
            serde_json::to_string(&ScheduleWindow::NextQuarter).unwrap(),
            "\"next_quarter\""
        );
    }
}
