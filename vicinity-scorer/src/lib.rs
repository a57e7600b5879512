//! Scoring and verdicts for locations.
//!
//! The crate turns category snapshots and noise sources into a
//! [`ScoreBreakdown`](vicinity_core::ScoreBreakdown) and a
//! [`Verdict`](vicinity_core::Verdict):
//! - **Category scoring** applies a plateau and power-law decay to the ten
//!   nearest POIs of each category ([`DecayScorer`]).
//! - **Noise assessment** sums quadratic fall-off penalties from nearby
//!   sources and scales them by the profile's sensitivity.
//! - **Aggregation and rules** form the weighted base score, subtract the
//!   noise penalty, apply critical caps, and record dealbreakers.
//! - **Verdicts** classify the total against profile thresholds and derive
//!   confidence, a match band, and key factors.
//! - **Data quality** grades the fetch that produced the snapshots.
//!
//! # Examples
//!
//! ```
//! use std::collections::BTreeMap;
//! use vicinity_core::{Category, ProfileRegistry};
//! use vicinity_core::test_support::snapshot_at;
//! use vicinity_scorer::{generate_verdict, score};
//!
//! let registry = ProfileRegistry::builtin().expect("built-in profiles are valid");
//! let remote = registry.get("remote_work").expect("registered profile");
//! let snapshots = BTreeMap::from([(
//!     Category::Food,
//!     snapshot_at(Category::Food, &[120.0, 240.0, 310.0], 800.0),
//! )]);
//! let breakdown = score(&snapshots, &[], &remote).expect("consistent input");
//! let verdict = generate_verdict(&breakdown, &remote);
//! assert!(verdict.confidence <= 100);
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod aggregate;
mod decay;
mod engine;
mod error;
mod noise;
mod quality;
mod rules;
mod verdict;

pub use aggregate::{aggregate, apply_noise};
pub use decay::{DecayScorer, MAX_CONTRIBUTORS, NEAREST_FLOOR, SATURATION_RATE, decay};
pub use engine::{Engine, STRENGTH_THRESHOLD, WEAKNESS_THRESHOLD, score};
pub use error::ScoreError;
pub use noise::{MAX_NOISE_PENALTY, assess_noise, noise_level};
pub use quality::{MAX_REASONS, assess_quality};
pub use rules::{RuleOutcome, apply_rules};
pub use verdict::{
    DEALBREAKER_CONFIDENCE_CEILING, MAX_KEY_FACTORS, consistency_gate, generate_verdict,
    permitted_level,
};
