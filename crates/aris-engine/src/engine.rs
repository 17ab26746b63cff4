use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use aris_classifier::{build_classifier, ClassifierConfig, FailureClassifier, FeatureVector};
use aris_core::{assess, AssessmentOutcome, SensorReading, UnavailableReason};
use tracing::{debug, warn};

/// The four classifier inputs, taken from the raw reading in training-column
/// order.
pub fn feature_vector(reading: &SensorReading) -> FeatureVector {
    FeatureVector {
        vibration: reading.vibration,
        bearing_temp: reading.bearing_temp,
        corrosion_score: reading.corrosion_score,
        vibration_change_rate: reading.vibration_change_rate,
    }
}

#[derive(Clone)]
enum ClassifierState {
    Ready(Arc<dyn FailureClassifier>),
    Unavailable(String),
}

/// Scores sensor readings against a classifier loaded once at construction.
///
/// A failed load leaves the engine permanently degraded: every call returns
/// [`AssessmentOutcome::Unavailable`] and loading is never retried. Cloning is
/// cheap and clones share the same classifier.
#[derive(Clone)]
pub struct RiskEngine {
    state: ClassifierState,
}

impl RiskEngine {
    pub fn new(classifier: Arc<dyn FailureClassifier>) -> Self {
        Self {
            state: ClassifierState::Ready(classifier),
        }
    }

    pub fn unavailable(detail: impl Into<String>) -> Self {
        Self {
            state: ClassifierState::Unavailable(detail.into()),
        }
    }

    /// Builds the classifier from `cfg`. Never fails: a load error is logged
    /// and turns into a degraded engine.
    pub fn load(cfg: ClassifierConfig) -> Self {
        match build_classifier(cfg) {
            Ok(classifier) => Self::new(classifier),
            Err(err) => {
                warn!(error = %err, "failure classifier unavailable, risk engine is degraded");
                Self::unavailable(err.to_string())
            }
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.state, ClassifierState::Ready(_))
    }

    pub fn classifier_name(&self) -> Option<&'static str> {
        match &self.state {
            ClassifierState::Ready(classifier) => Some(classifier.name()),
            ClassifierState::Unavailable(_) => None,
        }
    }

    pub fn model_id(&self) -> Option<&str> {
        match &self.state {
            ClassifierState::Ready(classifier) => classifier.model_id(),
            ClassifierState::Unavailable(_) => None,
        }
    }

    pub fn unavailable_detail(&self) -> Option<&str> {
        match &self.state {
            ClassifierState::Ready(_) => None,
            ClassifierState::Unavailable(detail) => Some(detail),
        }
    }

    /// Scores one reading. Classifier failures, including a panic inside the
    /// classifier, come back as `Unavailable` rather than an error.
    pub fn compute_risk(&self, reading: &SensorReading) -> AssessmentOutcome {
        let classifier = match &self.state {
            ClassifierState::Ready(classifier) => classifier,
            ClassifierState::Unavailable(detail) => {
                return AssessmentOutcome::Unavailable(UnavailableReason::ModelUnavailable {
                    detail: detail.clone(),
                });
            }
        };

        let probability = match predict(classifier.as_ref(), reading) {
            Ok(p) => p,
            Err(detail) => {
                warn!(classifier = classifier.name(), %detail, "failure prediction failed");
                return AssessmentOutcome::Unavailable(UnavailableReason::PredictionFailure {
                    detail,
                });
            }
        };

        let assessment = assess(reading, probability);
        debug!(
            probability,
            risk_index = assessment.risk_index,
            tier = assessment.tier.as_str(),
            dominant = assessment.dominant_factor.as_str(),
            "assessed reading"
        );
        AssessmentOutcome::Assessed(assessment)
    }
}

fn predict(classifier: &dyn FailureClassifier, reading: &SensorReading) -> Result<f64, String> {
    let features = feature_vector(reading);
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        classifier.predict_failure_probability(&features)
    }))
    .map_err(|_| format!("classifier {} panicked", classifier.name()))?;

    let probability = result.map_err(|err| err.to_string())?;
    if probability.is_finite() {
        Ok(probability)
    } else {
        Err(format!("classifier returned non-finite probability {probability}"))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use aris_classifier::{ClassifierError, FixedProbabilityClassifier, LogisticModelConfig};
    use aris_core::{AlertKind, ContributionShares, SeverityTier};

    use super::*;

    struct FailingClassifier;

    impl FailureClassifier for FailingClassifier {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn predict_failure_probability(&self, _: &FeatureVector) -> Result<f64, ClassifierError> {
            Err(ClassifierError::InvalidInput("unexpected shape".to_string()))
        }
    }

    struct PanickingClassifier;

    impl FailureClassifier for PanickingClassifier {
        fn name(&self) -> &'static str {
            "panicking"
        }

        #[allow(clippy::panic)]
        fn predict_failure_probability(&self, _: &FeatureVector) -> Result<f64, ClassifierError> {
            panic!("model blew up")
        }
    }

    struct NanClassifier;

    impl FailureClassifier for NanClassifier {
        fn name(&self) -> &'static str {
            "nan"
        }

        fn predict_failure_probability(&self, _: &FeatureVector) -> Result<f64, ClassifierError> {
            Ok(f64::NAN)
        }
    }

    /// Counts calls so tests can check the classifier is consulted per call.
    struct CountingClassifier {
        calls: AtomicUsize,
        probability: f64,
    }

    impl FailureClassifier for CountingClassifier {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn predict_failure_probability(&self, _: &FeatureVector) -> Result<f64, ClassifierError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.probability)
        }
    }

    fn fixed(p: f64) -> RiskEngine {
        RiskEngine::new(Arc::new(
            FixedProbabilityClassifier::new(p).expect("valid probability"),
        ))
    }

    #[test]
    fn nominal_reading_scores_thirty_five() {
        let engine = fixed(0.1);
        assert!(engine.is_available());
        let out = engine.compute_risk(&SensorReading::default());
        let assessment = out.assessment().expect("assessed");
        assert_eq!(assessment.risk_index, 35);
        assert_eq!(assessment.tier, SeverityTier::Medium);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let engine = fixed(0.37);
        let reading = SensorReading {
            flow_rate: 1.3,
            lube_health: 0.2,
            ..SensorReading::default()
        };
        assert_eq!(engine.compute_risk(&reading), engine.compute_risk(&reading));
    }

    #[test]
    fn unloaded_engine_reports_model_unavailable() {
        let engine = RiskEngine::load(ClassifierConfig::Logistic(LogisticModelConfig::new(
            "/nonexistent/aris_model.json",
        )));
        assert!(!engine.is_available());
        assert!(engine.classifier_name().is_none());
        assert!(engine.model_id().is_none());
        assert!(engine
            .unavailable_detail()
            .is_some_and(|d| d.contains("not found")));

        let out = engine.compute_risk(&SensorReading::default());
        assert!(matches!(
            out.unavailable_reason(),
            Some(UnavailableReason::ModelUnavailable { .. })
        ));
        assert_eq!(out.risk_index_or_zero(), 0);
        assert_eq!(out.shares_or_zero(), ContributionShares::ZERO);
    }

    #[test]
    fn classifier_error_becomes_prediction_failure() {
        let engine = RiskEngine::new(Arc::new(FailingClassifier));
        let out = engine.compute_risk(&SensorReading::default());
        assert!(matches!(
            out.unavailable_reason(),
            Some(UnavailableReason::PredictionFailure { detail }) if detail.contains("unexpected shape")
        ));
        // A per-call failure does not take the engine down.
        assert!(engine.is_available());
    }

    #[test]
    fn classifier_panic_is_contained() {
        let engine = RiskEngine::new(Arc::new(PanickingClassifier));
        let out = engine.compute_risk(&SensorReading::default());
        assert!(matches!(
            out.unavailable_reason(),
            Some(UnavailableReason::PredictionFailure { detail }) if detail.contains("panicked")
        ));
    }

    #[test]
    fn non_finite_probability_is_rejected() {
        let engine = RiskEngine::new(Arc::new(NanClassifier));
        assert!(!engine.compute_risk(&SensorReading::default()).is_available());
    }

    #[test]
    fn classifier_is_consulted_on_every_call() {
        let classifier = Arc::new(CountingClassifier {
            calls: AtomicUsize::new(0),
            probability: 0.2,
        });
        let engine = RiskEngine::new(classifier.clone());
        engine.compute_risk(&SensorReading::default());
        engine.compute_risk(&SensorReading::default());
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn engines_with_different_stubs_do_not_interfere() {
        let low = fixed(0.0);
        let high = fixed(1.0);
        let reading = SensorReading::default();

        std::thread::scope(|s| {
            let a = s.spawn(|| low.compute_risk(&reading));
            let b = s.spawn(|| high.compute_risk(&reading));
            let a = a.join().expect("join low");
            let b = b.join().expect("join high");
            assert_eq!(a.risk_index_or_zero(), 23);
            assert_eq!(b.risk_index_or_zero(), 100);
        });
    }

    #[test]
    fn shared_engine_is_consistent_across_threads() {
        let engine = fixed(0.42);
        let reading = SensorReading {
            lube_health: 0.1,
            tensile_stress: 0.9,
            ..SensorReading::default()
        };
        let expected = engine.compute_risk(&reading);
        assert!(expected
            .assessment()
            .is_some_and(|a| a.findings.contains(AlertKind::PoorLubrication)));

        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| engine.compute_risk(&reading)))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().expect("join"), expected);
            }
        });
    }

    #[test]
    fn feature_vector_follows_training_columns() {
        let features = feature_vector(&SensorReading::default());
        assert_eq!(features.as_array(), [7.0, 55.0, 0.2, 0.15]);
    }
}
