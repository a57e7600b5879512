//! Distance-decay category scoring.
//!
//! Every POI within the radius contributes a weight between zero and one:
//! full weight on a plateau near the subject point, then a power-law
//! fall-off reaching zero at the radius. The ten nearest contributions are
//! summed and saturated into `0..=100`; the nearest POI alone guarantees a
//! floor so a single close amenity is never scored as nothing.

use vicinity_core::{CategoryEvaluation, CategoryScorer, CategorySnapshot, DecayMode, Poi};

/// Only this many of the nearest POIs contribute to the utility sum.
pub const MAX_CONTRIBUTORS: usize = 10;

/// Rate at which summed contributions saturate towards 100.
pub const SATURATION_RATE: f64 = 0.4;

/// Score guaranteed by a nearest POI standing on the plateau.
pub const NEAREST_FLOOR: f64 = 50.0;

/// Weight of a POI at `distance_m` within `radius_m`.
///
/// Returns `1.0` on the plateau, `0.0` at or beyond the radius, and `0.0`
/// for unusable inputs.
///
/// # Examples
/// ```
/// use vicinity_core::DecayMode;
/// use vicinity_scorer::decay;
///
/// assert_eq!(decay(100.0, 800.0, DecayMode::Daily), 1.0);
/// assert_eq!(decay(800.0, 800.0, DecayMode::Daily), 0.0);
/// assert!(decay(500.0, 800.0, DecayMode::Daily) < 1.0);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "decay curves are defined over distance ratios"
)]
pub fn decay(distance_m: f64, radius_m: f64, mode: DecayMode) -> f64 {
    if !distance_m.is_finite() || !radius_m.is_finite() || radius_m <= 0.0 {
        return 0.0;
    }
    if distance_m >= radius_m {
        return 0.0;
    }
    let ratio = (distance_m / radius_m).max(0.0);
    let plateau = mode.plateau();
    if ratio <= plateau {
        return 1.0;
    }
    ((1.0 - ratio) / (1.0 - plateau)).powf(mode.exponent())
}

#[expect(
    clippy::float_arithmetic,
    reason = "utility saturates the summed contributions"
)]
fn utility(contributions: f64) -> f64 {
    100.0 * (1.0 - (-SATURATION_RATE * contributions).exp())
}

#[expect(
    clippy::float_arithmetic,
    reason = "the floor scales the nearest POI's decay"
)]
fn nearest_floor(nearest: Option<&Poi>, radius_m: f64, mode: DecayMode) -> f64 {
    nearest.map_or(0.0, |poi| NEAREST_FLOOR * decay(poi.distance_m(), radius_m, mode))
}

/// Default [`CategoryScorer`] built on [`decay`].
///
/// # Examples
/// ```
/// use vicinity_core::{Category, CategoryScorer, DecayMode};
/// use vicinity_core::test_support::snapshot_at;
/// use vicinity_scorer::DecayScorer;
///
/// let snapshot = snapshot_at(Category::Shops, &[50.0, 90.0, 120.0, 150.0, 200.0], 800.0);
/// let evaluation = DecayScorer.evaluate(&snapshot, 800.0, DecayMode::Daily);
/// assert!(evaluation.score >= 80.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecayScorer;

impl CategoryScorer for DecayScorer {
    fn evaluate(
        &self,
        snapshot: &CategorySnapshot,
        radius_m: f64,
        mode: DecayMode,
    ) -> CategoryEvaluation {
        let kept: Vec<&Poi> = snapshot
            .pois()
            .iter()
            .take_while(|poi| poi.distance_m() <= radius_m)
            .collect();
        let Some(nearest) = kept.first().copied() else {
            return CategoryEvaluation::NONE;
        };
        let contributions: f64 = kept
            .iter()
            .take(MAX_CONTRIBUTORS)
            .map(|poi| decay(poi.distance_m(), radius_m, mode))
            .sum();
        let utility = Self::sanitise(utility(contributions));
        let floor = nearest_floor(Some(nearest), radius_m, mode);
        CategoryEvaluation {
            score: Self::sanitise(utility.max(floor)),
            utility,
            kept_count: kept.len(),
            nearest_m: Some(nearest.distance_m()),
        }
    }
}
