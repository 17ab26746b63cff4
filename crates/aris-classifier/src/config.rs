use std::path::PathBuf;

pub const DEFAULT_MODEL_PATH: &str = "./data/aris_model.json";

#[derive(Debug, Clone)]
pub struct LogisticModelConfig {
    pub path: PathBuf,
}

impl LogisticModelConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for LogisticModelConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL_PATH)
    }
}

#[derive(Debug, Clone)]
pub enum ClassifierConfig {
    /// Logistic model loaded from a JSON artifact.
    Logistic(LogisticModelConfig),
    /// Always answers with the given probability. Useful for dry runs and
    /// calibration checks.
    Fixed(f64),
}
