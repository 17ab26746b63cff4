use std::fs;
use std::path::PathBuf;

use aris_classifier::{
    build_classifier, ClassifierConfig, ClassifierError, FeatureVector, LogisticModelConfig,
};

fn bundled_model() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("data")
        .join("aris_model.json")
}

fn nominal() -> FeatureVector {
    FeatureVector {
        vibration: 7.0,
        bearing_temp: 55.0,
        corrosion_score: 0.2,
        vibration_change_rate: 0.15,
    }
}

#[test]
fn bundled_model_loads_and_predicts() {
    let classifier = build_classifier(ClassifierConfig::Logistic(LogisticModelConfig::new(
        bundled_model(),
    )))
    .unwrap_or_else(|e| panic!("failed to load bundled model: {e}"));

    assert_eq!(classifier.name(), "logistic");
    assert_eq!(classifier.model_id(), Some("aris-logreg-v1"));
    let p = classifier
        .predict_failure_probability(&nominal())
        .expect("predict nominal");
    assert!((0.0..=1.0).contains(&p));

    let worn = classifier
        .predict_failure_probability(&FeatureVector {
            vibration: 22.0,
            bearing_temp: 80.0,
            corrosion_score: 0.9,
            vibration_change_rate: 0.8,
        })
        .expect("predict worn");
    assert!(worn > p);
}

#[test]
fn malformed_artifact_fails_to_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("aris_model.json");
    fs::write(&path, b"{ not json").expect("write artifact");

    let err = build_classifier(ClassifierConfig::Logistic(LogisticModelConfig::new(&path)))
        .err()
        .expect("load must fail");
    assert!(matches!(err, ClassifierError::Serde(_)));
}

#[test]
fn artifact_with_wrong_columns_fails_to_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("aris_model.json");
    let body = serde_json::json!({
        "model": "wrong",
        "features": ["Vibration_X", "Bearing_Temp", "Flow_Rate", "Vibration_Change_Rate"],
        "weights": [1.0, 1.0, 1.0, 1.0],
        "intercept": 0.0
    });
    fs::write(&path, body.to_string()).expect("write artifact");

    let err = build_classifier(ClassifierConfig::Logistic(LogisticModelConfig::new(&path)))
        .err()
        .expect("load must fail");
    assert!(matches!(err, ClassifierError::InvalidArtifact(_)));
}
