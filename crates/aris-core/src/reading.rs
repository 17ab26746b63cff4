use serde::{Deserialize, Serialize};

/// One snapshot of sensor and inspection values for a single pump.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Vibration velocity in mm/s.
    pub vibration: f64,
    /// Bearing temperature in °C.
    pub bearing_temp: f64,
    /// Historical corrosion / inspection score, higher is worse.
    pub corrosion_score: f64,
    /// Rate of change of vibration, 1.0 means rapid degradation.
    pub vibration_change_rate: f64,
    /// Operational flow ratio, 1.0 is the design point.
    pub flow_rate: f64,
    /// Lubricant condition, 1.0 is best.
    pub lube_health: f64,
    /// Tensile / structural stress level.
    pub tensile_stress: f64,
    /// Remaining useful life fraction, 1.0 is new.
    pub remaining_life: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingField {
    Vibration,
    BearingTemp,
    CorrosionScore,
    VibrationChangeRate,
    FlowRate,
    LubeHealth,
    TensileStress,
    RemainingLife,
}

impl ReadingField {
    pub const ALL: [Self; 8] = [
        Self::Vibration,
        Self::BearingTemp,
        Self::CorrosionScore,
        Self::VibrationChangeRate,
        Self::FlowRate,
        Self::LubeHealth,
        Self::TensileStress,
        Self::RemainingLife,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vibration => "vibration",
            Self::BearingTemp => "bearing_temp",
            Self::CorrosionScore => "corrosion_score",
            Self::VibrationChangeRate => "vibration_change_rate",
            Self::FlowRate => "flow_rate",
            Self::LubeHealth => "lube_health",
            Self::TensileStress => "tensile_stress",
            Self::RemainingLife => "remaining_life",
        }
    }

    /// Inclusive bounds inside which scoring behavior is defined.
    pub fn documented_range(self) -> (f64, f64) {
        match self {
            Self::Vibration => (1.0, 25.0),
            Self::BearingTemp => (30.0, 85.0),
            Self::CorrosionScore => (0.1, 1.0),
            Self::FlowRate => (0.5, 1.5),
            Self::VibrationChangeRate
            | Self::LubeHealth
            | Self::TensileStress
            | Self::RemainingLife => (0.0, 1.0),
        }
    }
}

impl SensorReading {
    pub fn value(&self, field: ReadingField) -> f64 {
        match field {
            ReadingField::Vibration => self.vibration,
            ReadingField::BearingTemp => self.bearing_temp,
            ReadingField::CorrosionScore => self.corrosion_score,
            ReadingField::VibrationChangeRate => self.vibration_change_rate,
            ReadingField::FlowRate => self.flow_rate,
            ReadingField::LubeHealth => self.lube_health,
            ReadingField::TensileStress => self.tensile_stress,
            ReadingField::RemainingLife => self.remaining_life,
        }
    }

    /// Fields that are non-finite or fall outside their documented range.
    ///
    /// Scoring never calls this; it exists for callers that collect input and
    /// must keep it inside the ranges the scoring constants were calibrated on.
    pub fn out_of_range_fields(&self) -> Vec<ReadingField> {
        ReadingField::ALL
            .into_iter()
            .filter(|field| {
                let value = self.value(*field);
                let (min, max) = field.documented_range();
                !value.is_finite() || value < min || value > max
            })
            .collect()
    }

    pub fn is_within_documented_ranges(&self) -> bool {
        self.out_of_range_fields().is_empty()
    }
}

impl Default for SensorReading {
    /// Nominal pump at its design point.
    fn default() -> Self {
        Self {
            vibration: 7.0,
            bearing_temp: 55.0,
            corrosion_score: SiteEnvironment::InlandDry.default_corrosion_score(),
            vibration_change_rate: 0.15,
            flow_rate: 1.0,
            lube_health: 0.8,
            tensile_stress: 0.4,
            remaining_life: 0.7,
        }
    }
}

/// Installation environment of a pump, used to seed the historical corrosion
/// score when an inspection value is not supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteEnvironment {
    InlandDry,
    CoastalMarine,
    IndustrialChemical,
    SalineMarine,
}

impl SiteEnvironment {
    pub fn default_corrosion_score(self) -> f64 {
        match self {
            Self::InlandDry => 0.20,
            Self::CoastalMarine => 0.55,
            Self::IndustrialChemical => 0.60,
            Self::SalineMarine => 0.70,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InlandDry => "inland_dry",
            Self::CoastalMarine => "coastal_marine",
            Self::IndustrialChemical => "industrial_chemical",
            Self::SalineMarine => "saline_marine",
        }
    }
}
