//! Three-level verdict with confidence and explanatory key factors.

use serde::{Deserialize, Serialize};

use crate::{Category, DataQuality};

/// Confidence deducted per low-coverage category when merging data quality.
pub const LOW_COVERAGE_PENALTY: u8 = 5;

/// Recommendation level, ordered from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictLevel {
    /// The location does not suit the profile.
    NotRecommended,
    /// The location suits the profile with reservations.
    Conditional,
    /// The location suits the profile.
    Recommended,
}

impl VerdictLevel {
    /// Return the level as a lowercase `&str`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotRecommended => "not_recommended",
            Self::Conditional => "conditional",
            Self::Recommended => "recommended",
        }
    }
}

impl std::fmt::Display for VerdictLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How closely the location matches what the profile looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileMatch {
    /// Well above the recommended threshold.
    Excellent,
    /// At or around the recommended threshold.
    Good,
    /// Between the thresholds.
    Acceptable,
    /// Around the conditional threshold.
    Poor,
    /// Well below the conditional threshold or blocked by a dealbreaker.
    Mismatch,
}

/// Kind of a key factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorKind {
    /// A cap or dealbreaker fired.
    Warning,
    /// A tracked category scored 70 or more.
    Strength,
    /// A tracked category scored below 40.
    Weakness,
}

/// A short statement supporting the verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyFactor {
    /// Factor kind.
    pub kind: FactorKind,
    /// Category the factor is about.
    pub category: Category,
    /// Display text.
    pub message: String,
}

/// Verdict for one location and profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Recommendation level.
    pub level: VerdictLevel,
    /// Total score the verdict is based on.
    pub score: f64,
    /// Confidence percent.
    pub confidence: u8,
    /// Profile match band.
    pub profile_match: ProfileMatch,
    /// At most five key factors, warnings first.
    pub key_factors: Vec<KeyFactor>,
    /// One-paragraph explanation.
    pub explanation: String,
}

impl Verdict {
    /// Lower confidence for categories with weak data coverage.
    ///
    /// Each category with error or single-POI partial coverage costs
    /// [`LOW_COVERAGE_PENALTY`] points. Empty categories cost nothing.
    ///
    /// # Examples
    /// ```
    /// use vicinity_core::{ProfileMatch, Verdict, VerdictLevel};
    /// # use vicinity_core::{ConfidenceComponents, DataQuality, FallbackTrace, ProviderHealth};
    /// # use std::collections::BTreeMap;
    /// # let quality = DataQuality {
    /// #     coverage: BTreeMap::new(),
    /// #     confidence: 100,
    /// #     components: ConfidenceComponents::default(),
    /// #     reasons: Vec::new(),
    /// #     provider_health: ProviderHealth::Healthy,
    /// #     had_retry: false,
    /// #     from_cache: false,
    /// #     fallback: FallbackTrace::default(),
    /// #     empty_categories: Vec::new(),
    /// #     error_categories: Vec::new(),
    /// # };
    ///
    /// let verdict = Verdict {
    ///     level: VerdictLevel::Recommended,
    ///     score: 82.0,
    ///     confidence: 70,
    ///     profile_match: ProfileMatch::Good,
    ///     key_factors: Vec::new(),
    ///     explanation: String::new(),
    /// };
    /// assert_eq!(verdict.with_data_quality(&quality).confidence, 70);
    /// ```
    #[must_use]
    pub fn with_data_quality(mut self, quality: &DataQuality) -> Self {
        let low = u8::try_from(quality.low_coverage_count()).unwrap_or(u8::MAX);
        self.confidence = self
            .confidence
            .saturating_sub(low.saturating_mul(LOW_COVERAGE_PENALTY))
            .min(100);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        CategoryCoverage, ConfidenceComponents, CoverageStatus, FallbackTrace, ProviderHealth,
    };
    use std::collections::BTreeMap;

    fn quality(entries: &[(Category, CoverageStatus, usize)]) -> DataQuality {
        DataQuality {
            coverage: entries
                .iter()
                .map(|(category, status, kept)| {
                    (
                        *category,
                        CategoryCoverage {
                            status: *status,
                            kept_count: *kept,
                            ..CategoryCoverage::not_queried()
                        },
                    )
                })
                .collect(),
            confidence: 100,
            components: ConfidenceComponents::default(),
            reasons: Vec::new(),
            provider_health: ProviderHealth::Healthy,
            had_retry: false,
            from_cache: false,
            fallback: FallbackTrace::default(),
            empty_categories: Vec::new(),
            error_categories: Vec::new(),
        }
    }

    fn verdict(confidence: u8) -> Verdict {
        Verdict {
            level: VerdictLevel::Conditional,
            score: 50.0,
            confidence,
            profile_match: ProfileMatch::Acceptable,
            key_factors: Vec::new(),
            explanation: String::new(),
        }
    }

    #[test]
    fn levels_are_ordered() {
        assert!(VerdictLevel::NotRecommended < VerdictLevel::Conditional);
        assert!(VerdictLevel::Conditional < VerdictLevel::Recommended);
    }

    #[test]
    fn low_coverage_lowers_confidence() {
        let merged = verdict(70).with_data_quality(&quality(&[
            (Category::Shops, CoverageStatus::Error, 0),
            (Category::Food, CoverageStatus::Partial, 1),
            (Category::Health, CoverageStatus::Partial, 2),
            (Category::Finance, CoverageStatus::Empty, 0),
        ]));
        assert_eq!(merged.confidence, 60);
    }

    #[test]
    fn confidence_never_underflows() {
        let entries: Vec<_> = Category::POI_CATEGORIES
            .iter()
            .map(|category| (*category, CoverageStatus::Error, 0))
            .collect();
        assert_eq!(verdict(30).with_data_quality(&quality(&entries)).confidence, 0);
    }

    #[test]
    fn level_serialises_snake_case() {
        let json = serde_json::to_string(&VerdictLevel::NotRecommended).expect("serialise");
        assert_eq!(json, "\"not_recommended\"");
    }
}
