use serde::Serialize;

use crate::reading::SensorReading;

// Calibration of the dimensionless proxies. Changing any of these shifts every
// index computed so far.
pub const TEMP_BASELINE_C: f64 = 30.0;
pub const TEMP_SPAN_C: f64 = 55.0;
pub const VIBRATION_BASELINE_MM_S: f64 = 1.0;
pub const VIBRATION_SPAN_MM_S: f64 = 24.0;
pub const CORROSION_BASELINE: f64 = 0.1;
pub const CORROSION_SPAN: f64 = 0.9;
pub const CHANGE_RATE_SPAN: f64 = 1.0;

/// Readings rescaled onto a roughly [0, 1] scale. Values are not clamped:
/// anything beyond the calibrated range stays visible to later stages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalizedFeatures {
    pub temperature: f64,
    pub vibration: f64,
    pub corrosion: f64,
    pub change_rate: f64,
}

pub fn normalize(reading: &SensorReading) -> NormalizedFeatures {
    NormalizedFeatures {
        temperature: (reading.bearing_temp - TEMP_BASELINE_C) / TEMP_SPAN_C,
        vibration: (reading.vibration - VIBRATION_BASELINE_MM_S) / VIBRATION_SPAN_MM_S,
        corrosion: (reading.corrosion_score - CORROSION_BASELINE) / CORROSION_SPAN,
        change_rate: reading.vibration_change_rate / CHANGE_RATE_SPAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_calibration_bounds_to_unit_interval() {
        let low = normalize(&SensorReading {
            vibration: 1.0,
            bearing_temp: 30.0,
            corrosion_score: 0.1,
            vibration_change_rate: 0.0,
            ..SensorReading::default()
        });
        assert_eq!(low.temperature, 0.0);
        assert_eq!(low.vibration, 0.0);
        assert_eq!(low.corrosion, 0.0);
        assert_eq!(low.change_rate, 0.0);

        let high = normalize(&SensorReading {
            vibration: 25.0,
            bearing_temp: 85.0,
            corrosion_score: 1.0,
            vibration_change_rate: 1.0,
            ..SensorReading::default()
        });
        assert!((high.temperature - 1.0).abs() < 1e-12);
        assert!((high.vibration - 1.0).abs() < 1e-12);
        assert!((high.corrosion - 1.0).abs() < 1e-12);
        assert!((high.change_rate - 1.0).abs() < 1e-12);
    }

    #[test]
    fn does_not_clamp_out_of_band_values() {
        let out = normalize(&SensorReading {
            bearing_temp: 140.0,
            vibration: 0.0,
            ..SensorReading::default()
        });
        assert!(out.temperature > 1.0);
        assert!(out.vibration < 0.0);
    }

    #[test]
    fn nominal_reading() {
        let out = normalize(&SensorReading::default());
        assert!((out.temperature - 25.0 / 55.0).abs() < 1e-12);
        assert!((out.vibration - 0.25).abs() < 1e-12);
    }
}
