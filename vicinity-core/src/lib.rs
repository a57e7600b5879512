//! Core domain types for the Vicinity location-scoring engine.
//!
//! The crate holds the vocabulary shared by the scorer, the report layer,
//! and the command line:
//! - **Inputs**: [`Poi`], [`CategorySnapshot`], and [`NoiseSource`], validated
//!   at construction so invalid distances never reach scoring code.
//! - **Profiles**: [`Profile`] weighting schemes and the [`ProfileRegistry`]
//!   holding the built-in catalogue.
//! - **Results**: [`ScoreBreakdown`], [`Verdict`], and [`DataQuality`].
//! - **Collaborator seams**: [`PoiProvider`], [`Narrator`], and
//!   [`CategoryScorer`].
//!
//! # Examples
//!
//! ```
//! use vicinity_core::{Category, CategorySnapshot, Poi, ProfileRegistry};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = ProfileRegistry::builtin()?;
//! let family = registry.get("family")?;
//! let radius = family.radius(Category::Education).unwrap_or(1_000.0);
//!
//! let school = Poi::new("Primary School No. 3", Category::Education, "school", 240.0)?;
//! let snapshot = CategorySnapshot::new(Category::Education, vec![school], radius)?;
//! assert_eq!(snapshot.kept_count(), 1);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod breakdown;
mod category;
mod narrative;
mod noise;
mod poi;
mod profile;
mod provider;
mod quality;
mod registry;
mod scorer;
mod snapshot;
mod verdict;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use breakdown::{AppliedCap, CategoryScore, DealbreakerHit, ScoreBreakdown};
pub use category::{Category, DecayMode};
pub use narrative::{Narrative, NarrativeError, Narrator};
pub use noise::{NoiseAssessment, NoiseKind, NoiseLevel, NoiseSource, NoiseSourceError};
pub use poi::{Poi, PoiError};
pub use profile::{
    CUSTOM_PROFILE_KEY, DEFAULT_CUSTOM_RADIUS_M, Profile, ProfileDefinition, ProfileError, Rule,
    VerdictThresholds, WEIGHT_SUM_TOLERANCE,
};
pub use provider::{
    FallbackTrace, FetchOutcome, FetchTrace, PoiProvider, ProviderError, ProviderHealth,
};
pub use quality::{
    CategoryCoverage, ConfidenceComponents, CoverageStatus, DataQuality,
};
pub use registry::{ProfileRegistry, ProfileRequest};
pub use scorer::{CategoryEvaluation, CategoryScorer};
pub use snapshot::{CategorySnapshot, DataSource, ProviderStatus, Rejections, SnapshotError};
pub use verdict::{
    FactorKind, KeyFactor, LOW_COVERAGE_PENALTY, ProfileMatch, Verdict, VerdictLevel,
};
