use std::fs;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::LogisticModelConfig;
use crate::error::ClassifierError;
use crate::traits::FailureClassifier;
use crate::types::{FeatureVector, FEATURE_COLUMNS};

/// On-disk form of a trained logistic failure model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub model: String,
    pub features: Vec<String>,
    pub weights: Vec<f64>,
    pub intercept: f64,
    #[serde(default)]
    pub scaler: Option<StandardScalerArtifact>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScalerArtifact {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardScaler {
    mean: [f64; 4],
    scale: [f64; 4],
}

impl StandardScaler {
    fn transform(&self, values: [f64; 4]) -> [f64; 4] {
        let mut out = values;
        for ((v, mean), scale) in out.iter_mut().zip(self.mean).zip(self.scale) {
            *v = (*v - mean) / scale;
        }
        out
    }
}

#[derive(Debug, Clone)]
pub struct LogisticClassifier {
    model: String,
    weights: [f64; 4],
    intercept: f64,
    scaler: Option<StandardScaler>,
}

fn four(name: &str, values: &[f64]) -> Result<[f64; 4], ClassifierError> {
    let arr: [f64; 4] = values.try_into().map_err(|_| {
        ClassifierError::InvalidArtifact(format!(
            "{name} must have {} entries, got {}",
            FEATURE_COLUMNS.len(),
            values.len()
        ))
    })?;
    if arr.iter().any(|v| !v.is_finite()) {
        return Err(ClassifierError::InvalidArtifact(format!(
            "{name} contains a non-finite value"
        )));
    }
    Ok(arr)
}

impl LogisticClassifier {
    pub fn load(config: &LogisticModelConfig) -> Result<Self, ClassifierError> {
        if !config.path.exists() {
            return Err(ClassifierError::ArtifactMissing(config.path.clone()));
        }
        let bytes = fs::read(&config.path)?;
        let artifact: ModelArtifact = serde_json::from_slice(&bytes)?;
        let classifier = Self::from_artifact(artifact)?;
        info!(
            model = %classifier.model,
            path = %config.path.display(),
            scaled = classifier.scaler.is_some(),
            "loaded failure classifier"
        );
        Ok(classifier)
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ClassifierError> {
        let columns_match = artifact.features.len() == FEATURE_COLUMNS.len()
            && artifact
                .features
                .iter()
                .zip(FEATURE_COLUMNS)
                .all(|(got, want)| got == want);
        if !columns_match {
            return Err(ClassifierError::InvalidArtifact(format!(
                "feature columns {:?} do not match expected {:?}",
                artifact.features, FEATURE_COLUMNS
            )));
        }

        let weights = four("weights", &artifact.weights)?;
        if !artifact.intercept.is_finite() {
            return Err(ClassifierError::InvalidArtifact(
                "intercept is not finite".to_string(),
            ));
        }

        let scaler = match artifact.scaler {
            Some(s) => {
                let mean = four("scaler.mean", &s.mean)?;
                let scale = four("scaler.scale", &s.scale)?;
                if scale.iter().any(|v| *v == 0.0) {
                    return Err(ClassifierError::InvalidArtifact(
                        "scaler.scale contains zero".to_string(),
                    ));
                }
                Some(StandardScaler { mean, scale })
            }
            None => None,
        };

        Ok(Self {
            model: artifact.model,
            weights,
            intercept: artifact.intercept,
            scaler,
        })
    }
}

impl FailureClassifier for LogisticClassifier {
    fn name(&self) -> &'static str {
        "logistic"
    }

    fn model_id(&self) -> Option<&str> {
        Some(&self.model)
    }

    fn predict_failure_probability(&self, features: &FeatureVector) -> Result<f64, ClassifierError> {
        if let Some(name) = features.first_non_finite() {
            return Err(ClassifierError::InvalidInput(format!(
                "feature {name} is not a finite number"
            )));
        }

        let raw = features.as_array();
        let inputs = match &self.scaler {
            Some(scaler) => scaler.transform(raw),
            None => raw,
        };
        let logit = self.intercept
            + self
                .weights
                .iter()
                .zip(inputs)
                .map(|(w, x)| w * x)
                .sum::<f64>();
        let probability = 1.0 / (1.0 + (-logit).exp());

        if probability.is_finite() {
            Ok(probability)
        } else {
            Err(ClassifierError::InvalidProbability(probability))
        }
    }
}
