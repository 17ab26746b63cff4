pub mod fixed;
pub mod logistic;

pub use fixed::FixedProbabilityClassifier;
pub use logistic::{
    LogisticClassifier, ModelArtifact, StandardScaler, StandardScalerArtifact,
};
