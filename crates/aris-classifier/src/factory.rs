use std::sync::Arc;

use crate::config::ClassifierConfig;
use crate::error::ClassifierError;
use crate::providers::{FixedProbabilityClassifier, LogisticClassifier};
use crate::traits::FailureClassifier;

pub fn build_classifier(
    cfg: ClassifierConfig,
) -> Result<Arc<dyn FailureClassifier>, ClassifierError> {
    match cfg {
        ClassifierConfig::Logistic(c) => Ok(Arc::new(LogisticClassifier::load(&c)?)),
        ClassifierConfig::Fixed(p) => Ok(Arc::new(FixedProbabilityClassifier::new(p)?)),
    }
}
