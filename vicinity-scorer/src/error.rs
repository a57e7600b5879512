//! Error types raised while scoring a location.

use thiserror::Error;
use vicinity_core::Category;

/// Errors raised by [`score`](crate::score) on inconsistent input.
///
/// Valid but empty input never errors: a category with no POIs scores zero.
#[derive(Debug, Error, PartialEq)]
pub enum ScoreError {
    /// A snapshot was filed under a different category.
    #[error("snapshot filed under {key} holds {found} POIs")]
    CategoryMismatch {
        /// Map key the snapshot was found under.
        key: Category,
        /// Category the snapshot actually holds.
        found: Category,
    },
    /// The profile supplied no usable radius for a weighted category.
    #[error("radius for {category} must be positive, got {radius:?}")]
    InvalidRadius {
        /// Weighted category.
        category: Category,
        /// Radius found in the profile, if any.
        radius: Option<f64>,
    },
}
