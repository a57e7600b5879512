//! Data-quality report separating "nothing nearby" from "provider failed".

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Category, DataSource, FallbackTrace, ProviderHealth, Rejections};

/// Coverage status of one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageStatus {
    /// Three or more POIs kept.
    Ok,
    /// One or two POIs kept.
    Partial,
    /// Queried successfully with nothing kept.
    Empty,
    /// The provider failed and nothing was kept.
    Error,
    /// The category was never queried.
    NotQueried,
}

/// Coverage detail for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCoverage {
    /// Coverage status.
    pub status: CoverageStatus,
    /// POIs returned before filtering.
    pub raw_count: usize,
    /// POIs kept.
    pub kept_count: usize,
    /// Radius used in metres, absent when never queried.
    pub radius_m: Option<f64>,
    /// Rejection breakdown.
    pub rejections: Rejections,
    /// Kept POIs per subcategory.
    pub subcategories: BTreeMap<String, usize>,
    /// Provider error codes.
    pub provider_errors: Vec<String>,
    /// Upstream that produced the POIs.
    pub source: DataSource,
}

impl CategoryCoverage {
    /// Coverage entry for a category that was never queried.
    #[must_use]
    pub const fn not_queried() -> Self {
        Self {
            status: CoverageStatus::NotQueried,
            raw_count: 0,
            kept_count: 0,
            radius_m: None,
            rejections: Rejections {
                radius: 0,
                membership: 0,
                other: 0,
            },
            subcategories: BTreeMap::new(),
            provider_errors: Vec::new(),
            source: DataSource::None,
        }
    }

    /// Report whether the entry lowers confidence in the verdict.
    ///
    /// Errors and single-POI partial coverage count; empty results do not.
    #[must_use]
    pub const fn is_low_coverage(&self) -> bool {
        match self.status {
            CoverageStatus::Error => true,
            CoverageStatus::Partial => self.kept_count == 1,
            CoverageStatus::Ok | CoverageStatus::Empty | CoverageStatus::NotQueried => false,
        }
    }
}

/// Components combined into the data-quality confidence, each in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceComponents {
    /// Provider health.
    pub provider: u8,
    /// Absence of category errors.
    pub data: u8,
    /// Depth of partial coverage.
    pub coverage: u8,
}

impl Default for ConfidenceComponents {
    fn default() -> Self {
        Self {
            provider: 100,
            data: 100,
            coverage: 100,
        }
    }
}

/// Data-quality assessment for one fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQuality {
    /// Coverage per POI category.
    pub coverage: BTreeMap<Category, CategoryCoverage>,
    /// Combined confidence percent.
    pub confidence: u8,
    /// Components behind the confidence.
    pub components: ConfidenceComponents,
    /// Human-readable reasons for reduced confidence, at most five.
    pub reasons: Vec<String>,
    /// Provider health during the fetch.
    pub provider_health: ProviderHealth,
    /// At least one query was retried.
    pub had_retry: bool,
    /// Results came from a cache.
    pub from_cache: bool,
    /// Fallback provider usage.
    pub fallback: FallbackTrace,
    /// Categories queried successfully with nothing kept.
    pub empty_categories: Vec<Category>,
    /// Categories whose queries failed with nothing kept.
    pub error_categories: Vec<Category>,
}

impl DataQuality {
    /// Categories with error or single-POI partial coverage.
    #[must_use]
    pub fn low_coverage_count(&self) -> usize {
        self.coverage
            .values()
            .filter(|entry| entry.is_low_coverage())
            .count()
    }

    /// Coverage status of `category`.
    #[must_use]
    pub fn status(&self, category: Category) -> CoverageStatus {
        self.coverage
            .get(&category)
            .map_or(CoverageStatus::NotQueried, |entry| entry.status)
    }
}
