//! Facade crate for the Vicinity location-scoring engine.
//!
//! This crate re-exports the core domain types and the scoring pipeline, and
//! exposes report assembly and bounded rescoring behind the `report` feature.
//!
//! # Examples
//!
//! ```
//! use std::collections::BTreeMap;
//! use vicinity::{Category, ProfileRegistry, generate_verdict, score};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = ProfileRegistry::builtin()?;
//! let urban = registry.get("urban")?;
//! let breakdown = score(&BTreeMap::new(), &[], &urban)?;
//! let verdict = generate_verdict(&breakdown, &urban);
//! assert_eq!(breakdown.category_score(Category::Transport), Some(0.0));
//! assert!(verdict.confidence <= 100);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use vicinity_core::{
    Category, CategoryScorer, CategorySnapshot, CoverageStatus, DataQuality, FetchOutcome,
    FetchTrace, KeyFactor, Narrative, Narrator, NoiseKind, NoiseSource, Poi, PoiProvider,
    Profile, ProfileDefinition, ProfileError, ProfileRegistry, ProfileRequest, ProviderError,
    ScoreBreakdown, Verdict, VerdictLevel,
};
pub use vicinity_scorer::{
    DecayScorer, Engine, ScoreError, assess_noise, assess_quality, generate_verdict, score,
};

#[cfg(feature = "report")]
#[cfg_attr(docsrs, doc(cfg(feature = "report")))]
pub use vicinity_report::{
    AnalysisError, AnalysisRequest, Analyzer, DEFAULT_RESCORE_LIMIT, Report, RescoreController,
    RescoreError, RescoreOutcome, RescoreState, SharedReport,
};
