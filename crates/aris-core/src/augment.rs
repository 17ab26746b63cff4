//! Heuristic risk points for factors outside their safe operating band.
//!
//! The classifier only sees vibration, temperature, corrosion and rate of
//! change. Each rule here can push the index toward the critical band on its
//! own, independently of the predicted probability.

use serde::Serialize;

use crate::normalize::NormalizedFeatures;
use crate::reading::SensorReading;

/// Normalized temperature / vibration above which points accrue.
pub const MECHANICAL_SOFT_LIMIT: f64 = 0.3;
pub const MECHANICAL_SLOPE: f64 = 150.0;

pub const FLOW_LOW_LIMIT: f64 = 0.7;
pub const FLOW_LOW_SLOPE: f64 = 50.0;
pub const FLOW_HIGH_LIMIT: f64 = 1.1;
pub const FLOW_HIGH_SLOPE: f64 = 75.0;

pub const LUBE_LOW_LIMIT: f64 = 0.4;
pub const LUBE_SLOPE: f64 = 100.0;

pub const STRESS_HIGH_LIMIT: f64 = 0.6;
pub const STRESS_SLOPE: f64 = 80.0;

pub const REMAINING_LIFE_LOW_LIMIT: f64 = 0.3;
pub const REMAINING_LIFE_SLOPE: f64 = 120.0;

/// Points added per factor. Every field is zero when its factor is in band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AugmentationBreakdown {
    pub temperature: f64,
    pub vibration: f64,
    pub flow_rate: f64,
    pub lube_health: f64,
    pub tensile_stress: f64,
    pub remaining_life: f64,
}

impl AugmentationBreakdown {
    pub fn total(&self) -> f64 {
        self.temperature
            + self.vibration
            + self.flow_rate
            + self.lube_health
            + self.tensile_stress
            + self.remaining_life
    }
}

fn above(value: f64, limit: f64, slope: f64) -> f64 {
    if value > limit {
        (value - limit) * slope
    } else {
        0.0
    }
}

fn below(value: f64, limit: f64, slope: f64) -> f64 {
    if value < limit {
        (limit - value) * slope
    } else {
        0.0
    }
}

/// Starved and over-driven flow are penalized on separate slopes; at most
/// one band applies.
pub fn flow_rate_points(flow_rate: f64) -> f64 {
    below(flow_rate, FLOW_LOW_LIMIT, FLOW_LOW_SLOPE)
        + above(flow_rate, FLOW_HIGH_LIMIT, FLOW_HIGH_SLOPE)
}

pub fn augment(reading: &SensorReading, normalized: &NormalizedFeatures) -> AugmentationBreakdown {
    AugmentationBreakdown {
        temperature: above(
            normalized.temperature,
            MECHANICAL_SOFT_LIMIT,
            MECHANICAL_SLOPE,
        ),
        vibration: above(normalized.vibration, MECHANICAL_SOFT_LIMIT, MECHANICAL_SLOPE),
        flow_rate: flow_rate_points(reading.flow_rate),
        lube_health: below(reading.lube_health, LUBE_LOW_LIMIT, LUBE_SLOPE),
        tensile_stress: above(reading.tensile_stress, STRESS_HIGH_LIMIT, STRESS_SLOPE),
        remaining_life: below(
            reading.remaining_life,
            REMAINING_LIFE_LOW_LIMIT,
            REMAINING_LIFE_SLOPE,
        ),
    }
}
