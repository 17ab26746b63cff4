pub mod config;
pub mod error;
pub mod factory;
pub mod providers;
pub mod traits;
pub mod types;

pub use config::*;
pub use error::ClassifierError;
pub use factory::*;
pub use providers::{FixedProbabilityClassifier, LogisticClassifier, ModelArtifact};
pub use traits::*;
pub use types::*;
