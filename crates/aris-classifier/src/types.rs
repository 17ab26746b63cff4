use serde::{Deserialize, Serialize};

/// Column names the classifier was trained on, in input order.
pub const FEATURE_COLUMNS: [&str; 4] = [
    "Vibration_X",
    "Bearing_Temp",
    "Historical_Corrosion_Score",
    "Vibration_Change_Rate",
];

/// The four raw readings the classifier sees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub vibration: f64,
    pub bearing_temp: f64,
    pub corrosion_score: f64,
    pub vibration_change_rate: f64,
}

impl FeatureVector {
    pub fn as_array(&self) -> [f64; 4] {
        [
            self.vibration,
            self.bearing_temp,
            self.corrosion_score,
            self.vibration_change_rate,
        ]
    }

    /// Name of the first non-finite feature, if any.
    pub fn first_non_finite(&self) -> Option<&'static str> {
        FEATURE_COLUMNS
            .iter()
            .zip(self.as_array())
            .find(|(_, value)| !value.is_finite())
            .map(|(name, _)| *name)
    }
}
