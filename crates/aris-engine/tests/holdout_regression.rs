use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use aris_engine::{FixedProbabilityClassifier, RiskEngine, SensorReading};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Case {
    name: String,
    failure_probability: f64,
    reading: SensorReading,
    expected: Expected,
}

#[derive(Debug, Deserialize)]
struct Expected {
    risk_index: u8,
    tier: String,
    shares: Shares,
    dominant_factor: String,
    alerts: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Shares {
    corrosion: u8,
    rate: u8,
    mechanical: u8,
}

#[test]
fn holdout_cases_pass() {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let fixture = root
        .join("..")
        .join("..")
        .join("data")
        .join("holdout")
        .join("assessment_cases.json");

    let content = fs::read_to_string(&fixture)
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", fixture.display()));
    let cases: Vec<Case> = serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("failed to parse fixture {}: {e}", fixture.display()));
    assert!(!cases.is_empty());

    for case in cases {
        let classifier = FixedProbabilityClassifier::new(case.failure_probability)
            .unwrap_or_else(|e| panic!("case {}: {e}", case.name));
        let engine = RiskEngine::new(Arc::new(classifier));

        let outcome = engine.compute_risk(&case.reading);
        let assessment = outcome
            .assessment()
            .unwrap_or_else(|| panic!("case {} was not assessed", case.name));

        assert_eq!(
            assessment.risk_index, case.expected.risk_index,
            "case {} risk index",
            case.name
        );
        assert_eq!(
            assessment.tier.as_str(),
            case.expected.tier,
            "case {} tier",
            case.name
        );
        assert_eq!(
            (
                assessment.shares.corrosion,
                assessment.shares.rate,
                assessment.shares.mechanical
            ),
            (
                case.expected.shares.corrosion,
                case.expected.shares.rate,
                case.expected.shares.mechanical
            ),
            "case {} shares",
            case.name
        );
        assert_eq!(
            assessment.dominant_factor.as_str(),
            case.expected.dominant_factor,
            "case {} dominant factor",
            case.name
        );

        let alerts: Vec<&str> = assessment
            .findings
            .alerts()
            .iter()
            .map(|a| a.kind.as_str())
            .collect();
        assert_eq!(alerts, case.expected.alerts, "case {} alerts", case.name);
        assert_eq!(
            assessment.findings.is_clear(),
            case.expected.alerts.is_empty(),
            "case {} clear marker",
            case.name
        );
    }
}
