//! Score breakdown produced by the scoring pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Category, NoiseAssessment};

/// Score of a single POI category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    /// Final category score in `0..=100`.
    pub score: f64,
    /// Kept POIs within the radius.
    pub kept_count: usize,
    /// Distance to the nearest kept POI in metres.
    pub nearest_m: Option<f64>,
    /// Radius applied in metres.
    pub radius_m: f64,
    /// Saturating utility of the summed decay contributions.
    pub utility: f64,
    /// Profile weight of the category.
    pub weight: f64,
}

/// A critical cap that fired.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AppliedCap {
    /// Category that fell short.
    pub category: Category,
    /// Its score.
    pub score: f64,
    /// Score it needed to reach.
    pub min_score: f64,
    /// Ceiling imposed on the total.
    pub ceiling: f64,
}

/// The first dealbreaker that fired.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DealbreakerHit {
    /// Category that fell short.
    pub category: Category,
    /// Its score.
    pub score: f64,
    /// Score it needed to reach.
    pub threshold: f64,
}

/// Everything the scoring pipeline computed for one profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Key of the profile scored against.
    pub profile_key: String,
    /// Configuration version of that profile.
    pub profile_version: u32,
    /// Weighted sum of category scores before noise and rules.
    pub base_score: f64,
    /// Noise outcome.
    pub noise: NoiseAssessment,
    /// Per-category scores for every weighted category.
    pub categories: BTreeMap<Category, CategoryScore>,
    /// Total after noise and rules, in `0..=100`.
    pub total_score: f64,
    /// Total after noise but before rules.
    pub pre_rule_total: f64,
    /// Critical caps that fired, in rule order.
    pub applied_caps: Vec<AppliedCap>,
    /// First dealbreaker that fired.
    pub dealbreaker: Option<DealbreakerHit>,
    /// Tracked categories scoring 70 or more.
    pub strengths: Vec<Category>,
    /// Tracked categories scoring below 40.
    pub weaknesses: Vec<Category>,
}

impl ScoreBreakdown {
    /// Score of `category`, reading the quiet score for [`Category::Quiet`].
    #[must_use]
    pub fn category_score(&self, category: Category) -> Option<f64> {
        if category == Category::Quiet {
            return Some(self.noise.quiet_score);
        }
        self.categories.get(&category).map(|entry| entry.score)
    }

    /// Report whether any critical cap fired.
    #[must_use]
    pub fn is_capped(&self) -> bool {
        !self.applied_caps.is_empty()
    }

    /// Tightest ceiling among the applied caps.
    #[must_use]
    pub fn tightest_ceiling(&self) -> Option<f64> {
        self.applied_caps
            .iter()
            .map(|cap| cap.ceiling)
            .min_by(f64::total_cmp)
    }
}
