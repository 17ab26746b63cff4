use crate::error::ClassifierError;
use crate::types::FeatureVector;

/// A loaded, read-only binary failure classifier. Implementations are shared
/// across threads without locking, so prediction must not mutate state.
pub trait FailureClassifier: Send + Sync {
    fn name(&self) -> &'static str;

    /// Identifier of the loaded model artifact, when there is one.
    fn model_id(&self) -> Option<&str> {
        None
    }

    /// Probability of the failure class, nominally in [0, 1].
    fn predict_failure_probability(&self, features: &FeatureVector) -> Result<f64, ClassifierError>;
}
