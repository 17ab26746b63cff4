use crate::error::ClassifierError;
use crate::traits::FailureClassifier;
use crate::types::FeatureVector;

#[derive(Debug, Clone, Copy)]
pub struct FixedProbabilityClassifier {
    probability: f64,
}

impl FixedProbabilityClassifier {
    pub fn new(probability: f64) -> Result<Self, ClassifierError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(ClassifierError::Config(format!(
                "fixed probability must be within [0, 1], got {probability}"
            )));
        }
        Ok(Self { probability })
    }
}

impl FailureClassifier for FixedProbabilityClassifier {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn predict_failure_probability(&self, features: &FeatureVector) -> Result<f64, ClassifierError> {
        if let Some(name) = features.first_non_finite() {
            return Err(ClassifierError::InvalidInput(format!(
                "feature {name} is not a finite number"
            )));
        }
        Ok(self.probability)
    }
}
