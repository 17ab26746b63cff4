use std::fmt;

use serde::Serialize;

use crate::attribution::ContributionShares;
use crate::augment::{
    FLOW_HIGH_LIMIT, FLOW_LOW_LIMIT, LUBE_LOW_LIMIT, REMAINING_LIFE_LOW_LIMIT, STRESS_HIGH_LIMIT,
};
use crate::reading::SensorReading;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DominantFactor {
    /// Historical corrosion and metal integrity.
    Corrosion,
    /// Instantaneous mechanical load: vibration and bearing temperature.
    Mechanical,
    /// Rate of performance degradation.
    RateOfDegradation,
}

impl DominantFactor {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Corrosion => "corrosion",
            Self::Mechanical => "mechanical",
            Self::RateOfDegradation => "rate_of_degradation",
        }
    }

    pub fn share(self, shares: &ContributionShares) -> u8 {
        match self {
            Self::Corrosion => shares.corrosion,
            Self::Mechanical => shares.mechanical,
            Self::RateOfDegradation => shares.rate,
        }
    }
}

impl fmt::Display for DominantFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Corrosion => "historical corrosion and metal integrity",
            Self::Mechanical => "mechanical stress (vibration / temperature)",
            Self::RateOfDegradation => "rate of performance degradation",
        };
        f.write_str(label)
    }
}

/// Corrosion share above which field work targets metal integrity.
pub const INTEGRITY_FOCUS_SHARE: u8 = 50;

/// Field work recommended alongside the tier action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceFocus {
    IntegrityInspection,
    RotorBalancing,
}

impl MaintenanceFocus {
    pub fn description(self) -> &'static str {
        match self {
            Self::IntegrityInspection => {
                "ultrasonic (UT) testing or a detailed in-line / on-stream inspection"
            }
            Self::RotorBalancing => {
                "precision balancing and shaft alignment, or bearing replacement"
            }
        }
    }
}

/// Integrity inspection when corrosion holds the majority of the dynamic
/// share, rotor work otherwise. A rate-dominated pump still gets rotor work.
pub fn maintenance_focus(shares: &ContributionShares) -> MaintenanceFocus {
    if shares.corrosion > INTEGRITY_FOCUS_SHARE {
        MaintenanceFocus::IntegrityInspection
    } else {
        MaintenanceFocus::RotorBalancing
    }
}

/// Largest share wins; ties go to corrosion, then mechanical, then rate.
pub fn dominant_factor(shares: &ContributionShares) -> DominantFactor {
    if shares.corrosion >= shares.mechanical && shares.corrosion >= shares.rate {
        DominantFactor::Corrosion
    } else if shares.mechanical >= shares.rate {
        DominantFactor::Mechanical
    } else {
        DominantFactor::RateOfDegradation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    LowFlow,
    HighFlow,
    PoorLubrication,
    HighTensileStress,
    LowRemainingLife,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Advisory,
    Critical,
}

impl AlertKind {
    pub fn severity(self) -> AlertSeverity {
        match self {
            Self::PoorLubrication | Self::HighTensileStress => AlertSeverity::Critical,
            Self::LowFlow | Self::HighFlow | Self::LowRemainingLife => AlertSeverity::Advisory,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::LowFlow => "low_flow",
            Self::HighFlow => "high_flow",
            Self::PoorLubrication => "poor_lubrication",
            Self::HighTensileStress => "high_tensile_stress",
            Self::LowRemainingLife => "low_remaining_life",
        }
    }

    fn describe(self) -> (&'static str, &'static str) {
        match self {
            Self::LowFlow => (
                "Low operating flow rate",
                "Pump runs below its duty point, increasing load on internal parts.",
            ),
            Self::HighFlow => (
                "High operating flow rate",
                "Over-flow raises the risk of erosion corrosion.",
            ),
            Self::PoorLubrication => (
                "Poor lubricant quality",
                "Accelerates bearing wear sharply. Change the oil immediately.",
            ),
            Self::HighTensileStress => (
                "High tensile stress",
                "Raises the risk of structural stress corrosion cracking. Schedule non-destructive testing.",
            ),
            Self::LowRemainingLife => (
                "Low remaining useful life",
                "Equipment is nearing end of service life. Prepare a replacement plan.",
            ),
        }
    }
}

/// A threshold-triggered note on a factor the classifier does not see.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubordinateAlert {
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    /// Raw reading that crossed the threshold.
    pub value: f64,
    pub threshold: f64,
    pub title: &'static str,
    pub follow_up: &'static str,
}

impl SubordinateAlert {
    fn new(kind: AlertKind, value: f64, threshold: f64) -> Self {
        let (title, follow_up) = kind.describe();
        Self {
            kind,
            severity: kind.severity(),
            value,
            threshold,
            title,
            follow_up,
        }
    }
}

impl fmt::Display for SubordinateAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.title, self.value, self.follow_up)
    }
}

/// Outcome of the secondary-factor checks. `Clear` is an explicit result, not
/// the absence of one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "alerts", rename_all = "snake_case")]
pub enum SubordinateFindings {
    Clear,
    Alerts(Vec<SubordinateAlert>),
}

impl SubordinateFindings {
    pub fn alerts(&self) -> &[SubordinateAlert] {
        match self {
            Self::Clear => &[],
            Self::Alerts(alerts) => alerts,
        }
    }

    pub fn is_clear(&self) -> bool {
        matches!(self, Self::Clear)
    }

    pub fn contains(&self, kind: AlertKind) -> bool {
        self.alerts().iter().any(|alert| alert.kind == kind)
    }
}

impl fmt::Display for SubordinateFindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clear => {
                f.write_str("No additional mechanical or operational concerns.")
            }
            Self::Alerts(alerts) => {
                for (i, alert) in alerts.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "- {alert}")?;
                }
                Ok(())
            }
        }
    }
}

/// Checks the same bands the augmenter penalizes.
pub fn subordinate_findings(reading: &SensorReading) -> SubordinateFindings {
    let mut alerts = Vec::new();

    if reading.flow_rate < FLOW_LOW_LIMIT {
        alerts.push(SubordinateAlert::new(
            AlertKind::LowFlow,
            reading.flow_rate,
            FLOW_LOW_LIMIT,
        ));
    }
    if reading.flow_rate > FLOW_HIGH_LIMIT {
        alerts.push(SubordinateAlert::new(
            AlertKind::HighFlow,
            reading.flow_rate,
            FLOW_HIGH_LIMIT,
        ));
    }
    if reading.lube_health < LUBE_LOW_LIMIT {
        alerts.push(SubordinateAlert::new(
            AlertKind::PoorLubrication,
            reading.lube_health,
            LUBE_LOW_LIMIT,
        ));
    }
    if reading.tensile_stress > STRESS_HIGH_LIMIT {
        alerts.push(SubordinateAlert::new(
            AlertKind::HighTensileStress,
            reading.tensile_stress,
            STRESS_HIGH_LIMIT,
        ));
    }
    if reading.remaining_life < REMAINING_LIFE_LOW_LIMIT {
        alerts.push(SubordinateAlert::new(
            AlertKind::LowRemainingLife,
            reading.remaining_life,
            REMAINING_LIFE_LOW_LIMIT,
        ));
    }

    if alerts.is_empty() {
        SubordinateFindings::Clear
    } else {
        SubordinateFindings::Alerts(alerts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_needs_a_corrosion_majority() {
        assert_eq!(
            maintenance_focus(&shares(51, 20, 29)),
            MaintenanceFocus::IntegrityInspection
        );
        assert_eq!(
            maintenance_focus(&shares(50, 10, 40)),
            MaintenanceFocus::RotorBalancing
        );
        assert_eq!(
            maintenance_focus(&shares(31, 37, 32)),
            MaintenanceFocus::RotorBalancing
        );
    }

    fn shares(corrosion: u8, rate: u8, mechanical: u8) -> ContributionShares {
        ContributionShares {
            corrosion,
            rate,
            mechanical,
        }
    }

    #[test]
    fn largest_share_dominates() {
        assert_eq!(dominant_factor(&shares(20, 50, 30)), DominantFactor::RateOfDegradation);
        assert_eq!(dominant_factor(&shares(20, 30, 50)), DominantFactor::Mechanical);
        assert_eq!(dominant_factor(&shares(50, 30, 20)), DominantFactor::Corrosion);
    }

    #[test]
    fn ties_follow_fixed_precedence() {
        assert_eq!(dominant_factor(&shares(40, 40, 20)), DominantFactor::Corrosion);
        assert_eq!(dominant_factor(&shares(20, 40, 40)), DominantFactor::Mechanical);
        assert_eq!(dominant_factor(&shares(40, 20, 40)), DominantFactor::Corrosion);
        assert_eq!(dominant_factor(&ContributionShares::ZERO), DominantFactor::Corrosion);
    }

    #[test]
    fn safe_reading_is_explicitly_clear() {
        let findings = subordinate_findings(&SensorReading::default());
        assert!(findings.is_clear());
        assert!(findings.alerts().is_empty());
        assert!(findings.to_string().contains("No additional"));
    }

    #[test]
    fn lubrication_alert_references_value() {
        let findings = subordinate_findings(&SensorReading {
            lube_health: 0.1,
            ..SensorReading::default()
        });
        assert!(findings.contains(AlertKind::PoorLubrication));
        let alert = &findings.alerts()[0];
        assert_eq!(alert.value, 0.1);
        assert_eq!(alert.severity, AlertSeverity::Critical);
        assert!(alert.to_string().contains("0.1"));
    }

    #[test]
    fn stress_alert_only_above_limit() {
        let high = subordinate_findings(&SensorReading {
            tensile_stress: 0.9,
            ..SensorReading::default()
        });
        assert!(high.contains(AlertKind::HighTensileStress));

        let moderate = subordinate_findings(&SensorReading {
            tensile_stress: 0.5,
            ..SensorReading::default()
        });
        assert!(moderate.is_clear());
    }

    #[test]
    fn flow_alerts_on_both_sides() {
        let low = subordinate_findings(&SensorReading {
            flow_rate: 0.6,
            ..SensorReading::default()
        });
        assert!(low.contains(AlertKind::LowFlow));
        assert!(!low.contains(AlertKind::HighFlow));

        let high = subordinate_findings(&SensorReading {
            flow_rate: 1.3,
            ..SensorReading::default()
        });
        assert!(high.contains(AlertKind::HighFlow));
        assert_eq!(high.alerts()[0].severity, AlertSeverity::Advisory);

        let edge = subordinate_findings(&SensorReading {
            flow_rate: 1.1,
            ..SensorReading::default()
        });
        assert!(edge.is_clear());
    }

    #[test]
    fn alerts_keep_check_order() {
        let findings = subordinate_findings(&SensorReading {
            flow_rate: 0.5,
            lube_health: 0.2,
            tensile_stress: 0.8,
            remaining_life: 0.1,
            ..SensorReading::default()
        });
        let kinds: Vec<_> = findings.alerts().iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![
                AlertKind::LowFlow,
                AlertKind::PoorLubrication,
                AlertKind::HighTensileStress,
                AlertKind::LowRemainingLife,
            ]
        );
    }
}
