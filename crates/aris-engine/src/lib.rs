pub mod engine;

pub use aris_core::*;
pub use aris_classifier::{
    build_classifier, ClassifierConfig, ClassifierError, FailureClassifier, FeatureVector,
    FixedProbabilityClassifier, LogisticClassifier, LogisticModelConfig, DEFAULT_MODEL_PATH,
    FEATURE_COLUMNS,
};
pub use engine::*;
