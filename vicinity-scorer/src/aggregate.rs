//! Weighted aggregation of category scores.

use std::collections::BTreeMap;

use vicinity_core::{Category, CategoryScore, Profile};

/// Weighted sum of category scores over the profile's categories.
///
/// Categories outside the profile are ignored. A profile category without
/// a score contributes zero.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "aggregation is a weighted sum"
)]
pub fn aggregate(scores: &BTreeMap<Category, CategoryScore>, profile: &Profile) -> f64 {
    profile
        .weights()
        .iter()
        .map(|(category, weight)| {
            scores
                .get(category)
                .map_or(0.0, |entry| entry.score * weight)
        })
        .sum()
}

/// Subtract the noise penalty and clamp into `0..=100`.
///
/// # Examples
/// ```
/// use vicinity_scorer::apply_noise;
///
/// assert_eq!(apply_noise(72.0, 10.0), 62.0);
/// assert_eq!(apply_noise(5.0, 12.0), 0.0);
/// ```
#[must_use]
#[expect(clippy::float_arithmetic, reason = "the noise penalty is subtracted")]
pub fn apply_noise(base: f64, penalty: f64) -> f64 {
    let total = base - penalty;
    if total.is_finite() {
        total.clamp(0.0, 100.0)
    } else {
        0.0
    }
}
