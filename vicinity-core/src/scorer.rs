//! Score one POI category from its snapshot.
//!
//! The `CategoryScorer` trait turns a [`CategorySnapshot`] into a
//! [`CategoryEvaluation`] for a given radius and decay curve.

use crate::{CategorySnapshot, DecayMode};

/// Outcome of scoring one category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryEvaluation {
    /// Category score in `0..=100`.
    pub score: f64,
    /// Saturating utility of the summed decay contributions.
    pub utility: f64,
    /// POIs within the radius.
    pub kept_count: usize,
    /// Distance to the nearest POI within the radius.
    pub nearest_m: Option<f64>,
}

impl CategoryEvaluation {
    /// Evaluation of a category with nothing within reach.
    pub const NONE: Self = Self {
        score: 0.0,
        utility: 0.0,
        kept_count: 0,
        nearest_m: None,
    };
}

/// Calculate a proximity score for a category snapshot.
///
/// Higher scores mean more, closer POIs. Implementations must be
/// thread-safe (`Send` + `Sync`) and infallible; a snapshot with nothing
/// inside `radius_m` scores `0.0`, which is a valid signal.
///
/// Implementations must:
/// - Ignore POIs farther than `radius_m`.
/// - Produce finite scores within `0.0..=100.0`.
/// - Be deterministic for equal inputs.
///
/// Use [`CategoryScorer::sanitise`] to apply the range guard.
///
/// # Examples
///
/// ```rust
/// use vicinity_core::{
///     Category, CategoryEvaluation, CategoryScorer, CategorySnapshot, DecayMode,
/// };
///
/// struct Flat;
///
/// impl CategoryScorer for Flat {
///     fn evaluate(
///         &self,
///         snapshot: &CategorySnapshot,
///         _radius_m: f64,
///         _mode: DecayMode,
///     ) -> CategoryEvaluation {
///         CategoryEvaluation {
///             score: Self::sanitise(500.0),
///             utility: 100.0,
///             kept_count: snapshot.kept_count(),
///             nearest_m: snapshot.nearest_distance(),
///         }
///     }
/// }
///
/// let snapshot = CategorySnapshot::empty(Category::Shops, 500.0).expect("valid radius");
/// assert_eq!(Flat.evaluate(&snapshot, 500.0, DecayMode::Daily).score, 100.0);
/// ```
pub trait CategoryScorer: Send + Sync {
    /// Score `snapshot` within `radius_m` using the `mode` decay curve.
    fn evaluate(
        &self,
        snapshot: &CategorySnapshot,
        radius_m: f64,
        mode: DecayMode,
    ) -> CategoryEvaluation;

    /// Clamp and validate a raw score.
    ///
    /// Returns `0.0` for non-finite values and clamps to `0.0..=100.0`.
    fn sanitise(score: f64) -> f64
    where
        Self: Sized,
    {
        if !score.is_finite() {
            return 0.0;
        }
        score.clamp(0.0, 100.0)
    }
}
