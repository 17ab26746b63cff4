/// Probability-to-points scale. Deliberately above 100 so the clamp in
/// [`finalize_index`] leaves headroom near the top of the range.
pub const PROBABILITY_SCALE: f64 = 120.0;

pub const MAX_RISK_INDEX: u8 = 100;

/// Base score from the classifier's failure probability, rounded half to even.
///
/// The float-to-int cast saturates; probabilities are checked for finiteness
/// before they get here.
#[allow(clippy::cast_possible_truncation)]
pub fn base_score(probability: f64) -> i64 {
    (probability * PROBABILITY_SCALE).round_ties_even() as i64
}

/// Merges base score and heuristic points into the bounded integer index.
/// The sum is capped at 100 first and then truncated toward zero.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn finalize_index(base: i64, augmentation_points: f64) -> u8 {
    let ceiling = f64::from(MAX_RISK_INDEX);
    let raw = (base as f64 + augmentation_points).min(ceiling);
    raw.trunc().clamp(0.0, ceiling) as u8
}
