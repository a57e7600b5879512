//! Contract for the external collaborator that fetches POIs.
//!
//! Retrieval protocols, caching, and rate limiting live behind
//! [`PoiProvider`]. The engine only sees the snapshots, noise sources, and
//! the trace describing how the fetch went.

use std::collections::BTreeMap;

use geo::Coord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Category, CategorySnapshot, NoiseSource};

/// Overall health of the POI provider during a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderHealth {
    /// Every query succeeded.
    #[default]
    Healthy,
    /// Some queries failed or timed out.
    Degraded,
    /// The provider was unreachable.
    Failed,
}

/// Whether the fallback provider was consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FallbackTrace {
    /// The fallback was queried.
    pub started: bool,
    /// The fallback supplied at least one kept POI.
    pub contributed: bool,
}

/// How a fetch went, independent of what it returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FetchTrace {
    /// Provider health.
    pub provider_health: ProviderHealth,
    /// At least one query was retried.
    pub had_retry: bool,
    /// Results came from a cache.
    pub from_cache: bool,
    /// Fallback provider usage.
    pub fallback: FallbackTrace,
}

/// Everything a provider returns for one subject point.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FetchOutcome {
    /// One snapshot per queried category.
    pub snapshots: BTreeMap<Category, CategorySnapshot>,
    /// Noise emitters near the subject point.
    #[serde(default)]
    pub noise: Vec<NoiseSource>,
    /// Fetch trace.
    #[serde(default)]
    pub trace: FetchTrace,
}

/// Errors a provider reports when it cannot return any outcome.
///
/// Partial failures are data: report them through [`FetchTrace`] and the
/// per-snapshot provider status instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider could not be reached.
    #[error("POI provider unavailable: {message}")]
    Unavailable {
        /// Provider-specific detail.
        message: String,
    },
    /// The provider answered with something unusable.
    #[error("POI provider returned an invalid response: {message}")]
    InvalidResponse {
        /// Provider-specific detail.
        message: String,
    },
}

/// Fetch POIs and noise sources around a subject point.
///
/// Implementations must be thread-safe (`Send` + `Sync`).
///
/// # Examples
/// ```
/// use std::collections::BTreeMap;
/// use geo::Coord;
/// use vicinity_core::{Category, FetchOutcome, PoiProvider, ProviderError};
///
/// struct Nothing;
///
/// impl PoiProvider for Nothing {
///     fn fetch(
///         &self,
///         _subject: Coord<f64>,
///         _radii: &BTreeMap<Category, f64>,
///     ) -> Result<FetchOutcome, ProviderError> {
///         Ok(FetchOutcome::default())
///     }
/// }
///
/// let outcome = Nothing.fetch(Coord { x: 21.0, y: 52.2 }, &BTreeMap::new());
/// assert!(outcome.expect("fetch succeeds").snapshots.is_empty());
/// ```
pub trait PoiProvider: Send + Sync {
    /// Fetch snapshots for the categories in `radii`, each within its
    /// radius in metres.
    fn fetch(
        &self,
        subject: Coord<f64>,
        radii: &BTreeMap<Category, f64>,
    ) -> Result<FetchOutcome, ProviderError>;
}
