use std::fmt;

use serde::Serialize;

use crate::attribution::{attribute, ContributionShares};
use crate::augment::{augment, AugmentationBreakdown};
use crate::explain::{
    dominant_factor, maintenance_focus, subordinate_findings, DominantFactor, MaintenanceFocus,
    SubordinateFindings,
};
use crate::finalize::{base_score, finalize_index};
use crate::normalize::normalize;
use crate::reading::SensorReading;
use crate::tier::{RecommendedAction, SeverityTier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Recommendation {
    pub action: RecommendedAction,
    /// Field work chosen from the contribution shares. Absent when no
    /// intervention is needed, and when the prescription is an overhaul
    /// regardless of cause.
    pub focus: Option<MaintenanceFocus>,
}

impl Recommendation {
    pub fn for_tier(tier: SeverityTier, shares: &ContributionShares) -> Self {
        let focus = match tier {
            SeverityTier::Low | SeverityTier::Medium | SeverityTier::High => {
                Some(maintenance_focus(shares))
            }
            SeverityTier::Safe | SeverityTier::ImminentFailure => None,
        };
        Self {
            action: tier.action(),
            focus,
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.action.description())?;
        if let Some(focus) = self.focus {
            write!(f, " Focus: {}.", focus.description())?;
        }
        Ok(())
    }
}

/// How the index was assembled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub failure_probability: f64,
    pub base_score: i64,
    pub augmentation: AugmentationBreakdown,
    pub augmentation_points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub risk_index: u8,
    pub tier: SeverityTier,
    pub shares: ContributionShares,
    pub dominant_factor: DominantFactor,
    pub findings: SubordinateFindings,
    pub recommendation: Recommendation,
    pub breakdown: ScoreBreakdown,
}

impl RiskAssessment {
    pub fn summary(&self) -> String {
        format!(
            "ARIS index {}% ({}). Dominant factor: {} ({}%).",
            self.risk_index,
            self.tier,
            self.dominant_factor,
            self.dominant_factor.share(&self.shares)
        )
    }
}

impl fmt::Display for RiskAssessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.summary())?;
        writeln!(f, "Recommendation: {}", self.recommendation)?;
        writeln!(
            f,
            "Contributions: corrosion {}%, rate {}%, mechanical {}%",
            self.shares.corrosion, self.shares.rate, self.shares.mechanical
        )?;
        write!(f, "{}", self.findings)
    }
}

/// Runs every stage after the classifier: augmentation, finalization,
/// attribution, tiering and explanation.
pub fn assess(reading: &SensorReading, failure_probability: f64) -> RiskAssessment {
    let normalized = normalize(reading);
    let base = base_score(failure_probability);
    let augmentation = augment(reading, &normalized);
    let augmentation_points = augmentation.total();
    let risk_index = finalize_index(base, augmentation_points);
    let tier = SeverityTier::from_index(risk_index);

    let shares = attribute(&normalized);
    let dominant = dominant_factor(&shares);

    RiskAssessment {
        risk_index,
        tier,
        shares,
        dominant_factor: dominant,
        findings: subordinate_findings(reading),
        recommendation: Recommendation::for_tier(tier, &shares),
        breakdown: ScoreBreakdown {
            failure_probability,
            base_score: base,
            augmentation,
            augmentation_points,
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnavailableReason {
    /// The classifier artifact was missing or failed to load.
    ModelUnavailable { detail: String },
    /// The classifier rejected or failed on this particular input.
    PredictionFailure { detail: String },
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModelUnavailable { detail } => write!(f, "model unavailable: {detail}"),
            Self::PredictionFailure { detail } => write!(f, "prediction failed: {detail}"),
        }
    }
}

/// Result of one scoring call. `Unavailable` is never folded into a
/// zero-risk `Assessed` value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum AssessmentOutcome {
    Assessed(RiskAssessment),
    Unavailable(UnavailableReason),
}

impl AssessmentOutcome {
    pub fn assessment(&self) -> Option<&RiskAssessment> {
        match self {
            Self::Assessed(assessment) => Some(assessment),
            Self::Unavailable(_) => None,
        }
    }

    pub fn unavailable_reason(&self) -> Option<&UnavailableReason> {
        match self {
            Self::Assessed(_) => None,
            Self::Unavailable(reason) => Some(reason),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Assessed(_))
    }

    /// Legacy numeric view: 0 when no assessment could be made. Prefer
    /// matching on the outcome.
    pub fn risk_index_or_zero(&self) -> u8 {
        self.assessment().map_or(0, |a| a.risk_index)
    }

    pub fn shares_or_zero(&self) -> ContributionShares {
        self.assessment()
            .map_or(ContributionShares::ZERO, |a| a.shares)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explain::AlertKind;

    fn quiet_reading() -> SensorReading {
        SensorReading {
            vibration: 1.0,
            bearing_temp: 30.0,
            corrosion_score: 0.1,
            vibration_change_rate: 0.0,
            flow_rate: 1.0,
            lube_health: 0.8,
            tensile_stress: 0.4,
            remaining_life: 0.7,
        }
    }

    #[test]
    fn nominal_pump_lands_in_medium() {
        let out = assess(&SensorReading::default(), 0.1);
        assert_eq!(out.breakdown.base_score, 12);
        assert!((out.breakdown.augmentation.temperature - 23.18).abs() < 0.01);
        assert_eq!(out.breakdown.augmentation.vibration, 0.0);
        assert_eq!(out.risk_index, 35);
        assert_eq!(out.tier, SeverityTier::Medium);
        assert!(out.findings.is_clear());
        assert_eq!(
            out.recommendation.action,
            RecommendedAction::UrgentWorkOrderWithin7Days
        );
        assert_eq!(out.dominant_factor, DominantFactor::RateOfDegradation);
        assert_eq!(
            out.recommendation.focus,
            Some(MaintenanceFocus::RotorBalancing)
        );
        assert!(out.summary().contains("35%"));
    }

    #[test]
    fn poor_lubrication_adds_thirty_points_and_alert() {
        let good = assess(&quiet_reading(), 0.1);
        let bad = assess(
            &SensorReading {
                lube_health: 0.1,
                ..quiet_reading()
            },
            0.1,
        );
        assert_eq!(good.risk_index, 12);
        assert_eq!(bad.risk_index, 42);
        assert_eq!(bad.risk_index - good.risk_index, 30);
        assert!(bad.findings.contains(AlertKind::PoorLubrication));
        assert!(good.findings.is_clear());
    }

    #[test]
    fn high_stress_adds_twenty_four_points() {
        let stressed = assess(
            &SensorReading {
                tensile_stress: 0.9,
                ..quiet_reading()
            },
            0.1,
        );
        assert_eq!(stressed.risk_index, 36);
        assert!(stressed.findings.contains(AlertKind::HighTensileStress));

        let moderate = assess(
            &SensorReading {
                tensile_stress: 0.5,
                ..quiet_reading()
            },
            0.1,
        );
        assert_eq!(moderate.risk_index, 12);
        assert!(!moderate.findings.contains(AlertKind::HighTensileStress));
    }

    #[test]
    fn certain_failure_caps_at_one_hundred() {
        let out = assess(
            &SensorReading {
                vibration: 25.0,
                bearing_temp: 85.0,
                ..SensorReading::default()
            },
            1.0,
        );
        assert_eq!(out.risk_index, 100);
        assert_eq!(out.tier, SeverityTier::ImminentFailure);
        assert_eq!(out.recommendation.focus, None);
    }

    #[test]
    fn out_of_range_probability_stays_bounded() {
        assert_eq!(assess(&quiet_reading(), -0.5).risk_index, 0);
        assert_eq!(assess(&quiet_reading(), 3.0).risk_index, 100);
    }

    #[test]
    fn recommendation_focus_follows_corrosion_majority() {
        let corroded = ContributionShares {
            corrosion: 60,
            rate: 25,
            mechanical: 15,
        };
        let rec = Recommendation::for_tier(SeverityTier::Medium, &corroded);
        assert_eq!(rec.focus, Some(MaintenanceFocus::IntegrityInspection));
        assert_eq!(
            Recommendation::for_tier(SeverityTier::Safe, &corroded).focus,
            None
        );
    }

    #[test]
    fn unavailable_is_distinct_from_zero_risk() {
        let zero = AssessmentOutcome::Assessed(assess(&quiet_reading(), 0.0));
        let down = AssessmentOutcome::Unavailable(UnavailableReason::ModelUnavailable {
            detail: "missing artifact".to_string(),
        });
        assert_eq!(zero.risk_index_or_zero(), 0);
        assert_eq!(down.risk_index_or_zero(), 0);
        assert_ne!(zero, down);
        assert!(zero.is_available());
        assert!(!down.is_available());
        assert_eq!(down.shares_or_zero(), ContributionShares::ZERO);
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let down = AssessmentOutcome::Unavailable(UnavailableReason::PredictionFailure {
            detail: "nan feature".to_string(),
        });
        let json = serde_json::to_value(&down).unwrap_or_default();
        assert_eq!(json["status"], "unavailable");
        assert_eq!(json["detail"]["kind"], "prediction_failure");

        let ok = AssessmentOutcome::Assessed(assess(&SensorReading::default(), 0.1));
        let json = serde_json::to_value(&ok).unwrap_or_default();
        assert_eq!(json["status"], "assessed");
        assert_eq!(json["detail"]["risk_index"], 35);
        assert_eq!(json["detail"]["tier"], "medium");
        assert_eq!(json["detail"]["findings"]["status"], "clear");
    }
}
