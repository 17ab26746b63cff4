use aris_engine::{ClassifierConfig, LogisticModelConfig, DEFAULT_MODEL_PATH};

pub const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:8797";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Stdio,
    Http,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub transport: Transport,
    pub http_addr: String,
    pub classifier: ClassifierConfig,
}

impl ServerConfig {
    /// Reads `ARIS_*` variables. Unknown transport or classifier kinds are
    /// errors; a classifier that cannot be built from otherwise valid settings
    /// is left for the engine to report as unavailability.
    pub fn from_env() -> Result<Self, String> {
        let transport = match env_trimmed("ARIS_TRANSPORT")
            .map(|v| v.to_ascii_lowercase())
            .as_deref()
        {
            None | Some("stdio") => Transport::Stdio,
            Some("http") => Transport::Http,
            Some(other) => {
                return Err(format!(
                    "ARIS_TRANSPORT must be stdio or http, got {other:?}"
                ))
            }
        };
        let http_addr =
            env_trimmed("ARIS_HTTP_ADDR").unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string());

        Ok(Self {
            transport,
            http_addr,
            classifier: classifier_config_from_env()?,
        })
    }
}

fn classifier_config_from_env() -> Result<ClassifierConfig, String> {
    let kind = env_trimmed("ARIS_CLASSIFIER").map(|v| v.to_ascii_lowercase());

    match kind.as_deref() {
        None | Some("logistic") => {
            let path =
                env_trimmed("ARIS_MODEL_PATH").unwrap_or_else(|| DEFAULT_MODEL_PATH.to_string());
            Ok(ClassifierConfig::Logistic(LogisticModelConfig::new(path)))
        }
        Some("fixed") => {
            // Unparsable maps to NaN, which the fixed classifier rejects when
            // the engine loads it.
            let probability = env_trimmed("ARIS_FIXED_PROBABILITY")
                .and_then(|v| v.parse::<f64>().ok())
                .unwrap_or(f64::NAN);
            Ok(ClassifierConfig::Fixed(probability))
        }
        Some(other) => Err(format!(
            "ARIS_CLASSIFIER must be logistic or fixed, got {other:?}"
        )),
    }
}

fn env_trimmed(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
