//! Splits the dynamic portion of risk into corrosion, rate-of-degradation and
//! mechanical shares. Heuristic augmentation points are never attributed here;
//! they only show up in the index.

use serde::Serialize;

use crate::normalize::NormalizedFeatures;

pub const CORROSION_WEIGHT: f64 = 0.45;
pub const RATE_WEIGHT: f64 = 0.40;
pub const MECHANICAL_WEIGHT: f64 = 0.15;

/// Below this total influence the ratios are numerically meaningless and the
/// fallback shares are used instead.
pub const MIN_DYNAMIC_INFLUENCE: f64 = 0.01;

pub const FALLBACK_CORROSION_SHARE: i64 = 45;
pub const FALLBACK_RATE_SHARE: i64 = 40;

const FULL_SHARE: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DynamicInfluence {
    pub corrosion: f64,
    pub rate: f64,
    pub mechanical: f64,
}

impl DynamicInfluence {
    pub fn total(&self) -> f64 {
        self.corrosion + self.rate + self.mechanical
    }
}

/// Integer percentage shares of the dynamic influence. Each is in [0, 100]
/// and the three never sum past 100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ContributionShares {
    pub corrosion: u8,
    pub rate: u8,
    pub mechanical: u8,
}

impl ContributionShares {
    pub const ZERO: Self = Self {
        corrosion: 0,
        rate: 0,
        mechanical: 0,
    };

    pub fn sum(&self) -> u16 {
        u16::from(self.corrosion) + u16::from(self.rate) + u16::from(self.mechanical)
    }
}

pub fn dynamic_influence(normalized: &NormalizedFeatures) -> DynamicInfluence {
    DynamicInfluence {
        corrosion: CORROSION_WEIGHT * normalized.corrosion,
        rate: RATE_WEIGHT * normalized.change_rate,
        mechanical: MECHANICAL_WEIGHT * (normalized.temperature + normalized.vibration) / 2.0,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn round_share(value: f64) -> i64 {
    value.round_ties_even() as i64
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_share(value: i64) -> u8 {
    value.clamp(0, FULL_SHARE) as u8
}

/// Rounds first, rescales second, derives the mechanical remainder last.
/// Reference outputs depend on that order.
#[allow(clippy::cast_precision_loss)]
pub fn attribute(normalized: &NormalizedFeatures) -> ContributionShares {
    let influence = dynamic_influence(normalized);
    let total = influence.total();

    let (mut corrosion, mut rate) = if total > MIN_DYNAMIC_INFLUENCE {
        (
            round_share(influence.corrosion / total * 100.0).max(0),
            round_share(influence.rate / total * 100.0).max(0),
        )
    } else {
        (FALLBACK_CORROSION_SHARE, FALLBACK_RATE_SHARE)
    };

    let combined = corrosion + rate;
    if combined > FULL_SHARE {
        corrosion = round_share((corrosion * FULL_SHARE) as f64 / combined as f64);
        rate = round_share((rate * FULL_SHARE) as f64 / combined as f64);
    }

    let mechanical = (FULL_SHARE - corrosion - rate).max(0);

    ContributionShares {
        corrosion: to_share(corrosion),
        rate: to_share(rate),
        mechanical: to_share(mechanical),
    }
}
