use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityTier {
    Safe,
    Low,
    Medium,
    High,
    ImminentFailure,
}

impl SeverityTier {
    pub const ALL: [Self; 5] = [
        Self::Safe,
        Self::Low,
        Self::Medium,
        Self::High,
        Self::ImminentFailure,
    ];

    /// Total over every index: bands are lower-bound inclusive.
    pub fn from_index(index: u8) -> Self {
        match index {
            0..=19 => Self::Safe,
            20..=34 => Self::Low,
            35..=49 => Self::Medium,
            50..=79 => Self::High,
            _ => Self::ImminentFailure,
        }
    }

    /// Inclusive index band covered by the tier.
    pub fn band(self) -> (u8, u8) {
        match self {
            Self::Safe => (0, 19),
            Self::Low => (20, 34),
            Self::Medium => (35, 49),
            Self::High => (50, 79),
            Self::ImminentFailure => (80, 100),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::ImminentFailure => "imminent_failure",
        }
    }

    pub fn action(self) -> RecommendedAction {
        match self {
            Self::Safe => RecommendedAction::InformationalOnly,
            Self::Low => RecommendedAction::WorkOrderWithin30Days,
            Self::Medium => RecommendedAction::UrgentWorkOrderWithin7Days,
            Self::High => RecommendedAction::PlannedShutdownWithin48Hours,
            Self::ImminentFailure => RecommendedAction::ImmediateShutdownAndOverhaul,
        }
    }
}

impl fmt::Display for SeverityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Safe => "Safe",
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::ImminentFailure => "Imminent failure",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    InformationalOnly,
    WorkOrderWithin30Days,
    UrgentWorkOrderWithin7Days,
    PlannedShutdownWithin48Hours,
    ImmediateShutdownAndOverhaul,
}

impl RecommendedAction {
    pub fn description(self) -> &'static str {
        match self {
            Self::InformationalOnly => "No operational risk. No technical intervention required.",
            Self::WorkOrderWithin30Days => {
                "Issue a maintenance work order within 30 days before the risk escalates."
            }
            Self::UrgentWorkOrderWithin7Days => {
                "Issue an urgent work order within 7 days and stage spare parts in advance."
            }
            Self::PlannedShutdownWithin48Hours => {
                "Plan a shutdown of the unit within 48 hours."
            }
            Self::ImmediateShutdownAndOverhaul => {
                "Shut the pump down immediately and overhaul or replace the damaged components."
            }
        }
    }
}
