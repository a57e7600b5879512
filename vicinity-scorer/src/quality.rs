//! Data-quality assessment.
//!
//! Confidence combines three components that all start at 100:
//! - provider: 15 off when degraded, 30 off when failed;
//! - data: 20 off per category whose query failed with nothing kept;
//! - coverage: 5 off per partial category holding a single POI.
//!
//! Categories queried successfully with nothing nearby are legitimate
//! results. They never reduce confidence and never produce a reason.

use std::collections::BTreeMap;

use log::warn;
use vicinity_core::{
    Category, CategoryCoverage, CategorySnapshot, ConfidenceComponents, CoverageStatus,
    DataQuality, FetchTrace, ProviderHealth,
};

/// Most reasons reported with an assessment.
pub const MAX_REASONS: usize = 5;

/// Kept POIs needed for `ok` coverage.
const OK_COVERAGE: usize = 3;

const DEGRADED_PENALTY: u8 = 15;
const FAILED_PENALTY: u8 = 30;
const ERROR_CATEGORY_PENALTY: u8 = 20;
const THIN_COVERAGE_PENALTY: u8 = 5;

fn status(snapshot: &CategorySnapshot) -> CoverageStatus {
    let kept = snapshot.kept_count();
    if snapshot.provider().is_error() && kept == 0 {
        CoverageStatus::Error
    } else if kept >= OK_COVERAGE {
        CoverageStatus::Ok
    } else if kept > 0 {
        CoverageStatus::Partial
    } else {
        CoverageStatus::Empty
    }
}

fn category_coverage(snapshot: &CategorySnapshot) -> CategoryCoverage {
    CategoryCoverage {
        status: status(snapshot),
        raw_count: snapshot.raw_count(),
        kept_count: snapshot.kept_count(),
        radius_m: Some(snapshot.radius_m()),
        rejections: snapshot.rejections(),
        subcategories: snapshot.subcategory_distribution(),
        provider_errors: snapshot.provider().codes().to_vec(),
        source: snapshot.source(),
    }
}

fn count_penalty(count: usize, per_item: u8) -> u8 {
    u8::try_from(count)
        .unwrap_or(u8::MAX)
        .saturating_mul(per_item)
}

fn confidence_components(
    coverage: &BTreeMap<Category, CategoryCoverage>,
    health: ProviderHealth,
) -> ConfidenceComponents {
    let provider_penalty = match health {
        ProviderHealth::Healthy => 0,
        ProviderHealth::Degraded => DEGRADED_PENALTY,
        ProviderHealth::Failed => FAILED_PENALTY,
    };
    let errors = coverage
        .values()
        .filter(|entry| entry.status == CoverageStatus::Error)
        .count();
    let thin = coverage
        .values()
        .filter(|entry| entry.status == CoverageStatus::Partial && entry.kept_count == 1)
        .count();
    ConfidenceComponents {
        provider: 100_u8.saturating_sub(provider_penalty),
        data: 100_u8.saturating_sub(count_penalty(errors, ERROR_CATEGORY_PENALTY)),
        coverage: 100_u8.saturating_sub(count_penalty(thin, THIN_COVERAGE_PENALTY)),
    }
}

/// Combine components as `floor(0.4 * provider + 0.3 * data + 0.3 * coverage)`.
fn combine(components: ConfidenceComponents) -> u8 {
    let weighted = u32::from(components.provider) * 4
        + u32::from(components.data) * 3
        + u32::from(components.coverage) * 3;
    u8::try_from(weighted.div_euclid(10))
        .unwrap_or(100)
        .min(100)
}

fn collect_reasons(
    coverage: &BTreeMap<Category, CategoryCoverage>,
    trace: &FetchTrace,
) -> Vec<String> {
    let mut reasons = Vec::new();
    match trace.provider_health {
        ProviderHealth::Healthy => {}
        ProviderHealth::Degraded => {
            reasons.push("POI provider was degraded during the fetch".to_owned());
        }
        ProviderHealth::Failed => reasons.push("POI provider failed during the fetch".to_owned()),
    }
    if trace.had_retry {
        reasons.push("Some provider queries had to be retried".to_owned());
    }
    for (category, entry) in coverage {
        if entry.status != CoverageStatus::Error {
            continue;
        }
        let codes = if entry.provider_errors.is_empty() {
            "unknown error".to_owned()
        } else {
            entry.provider_errors.join(", ")
        };
        reasons.push(format!("{}: provider error ({codes})", category.label()));
    }
    if trace.fallback.contributed {
        reasons.push("Fallback provider supplied part of the data".to_owned());
    } else if trace.fallback.started {
        reasons.push("Fallback provider was queried without results".to_owned());
    }
    reasons.truncate(MAX_REASONS);
    reasons
}

fn categories_with(
    coverage: &BTreeMap<Category, CategoryCoverage>,
    status: CoverageStatus,
) -> Vec<Category> {
    coverage
        .iter()
        .filter(|(_, entry)| entry.status == status)
        .map(|(category, _)| *category)
        .collect()
}

/// Assess data quality for the snapshots of one fetch.
///
/// Every POI category appears in the coverage map; categories without a
/// snapshot are reported as `not_queried`.
///
/// # Examples
/// ```
/// use std::collections::BTreeMap;
/// use vicinity_core::{Category, CategorySnapshot, CoverageStatus, FetchTrace};
/// use vicinity_scorer::assess_quality;
///
/// let snapshots = BTreeMap::from([(
///     Category::Finance,
///     CategorySnapshot::empty(Category::Finance, 800.0).expect("valid radius"),
/// )]);
/// let quality = assess_quality(&snapshots, &FetchTrace::default());
/// assert_eq!(quality.confidence, 100);
/// assert!(quality.reasons.is_empty());
/// assert_eq!(quality.status(Category::Finance), CoverageStatus::Empty);
/// assert_eq!(quality.status(Category::Shops), CoverageStatus::NotQueried);
/// ```
#[must_use]
pub fn assess_quality(
    snapshots: &BTreeMap<Category, CategorySnapshot>,
    trace: &FetchTrace,
) -> DataQuality {
    let coverage: BTreeMap<Category, CategoryCoverage> = Category::POI_CATEGORIES
        .iter()
        .map(|category| {
            let entry = snapshots
                .get(category)
                .map_or_else(CategoryCoverage::not_queried, category_coverage);
            (*category, entry)
        })
        .collect();
    let components = confidence_components(&coverage, trace.provider_health);
    let error_categories = categories_with(&coverage, CoverageStatus::Error);
    if trace.provider_health != ProviderHealth::Healthy || !error_categories.is_empty() {
        warn!(
            "degraded POI data: provider {:?}, {} failed categories",
            trace.provider_health,
            error_categories.len()
        );
    }
    DataQuality {
        confidence: combine(components),
        components,
        reasons: collect_reasons(&coverage, trace),
        provider_health: trace.provider_health,
        had_retry: trace.had_retry,
        from_cache: trace.from_cache,
        fallback: trace.fallback,
        empty_categories: categories_with(&coverage, CoverageStatus::Empty),
        error_categories,
        coverage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use vicinity_core::FallbackTrace;
    use vicinity_core::test_support::snapshot_at;

    fn all_empty() -> BTreeMap<Category, CategorySnapshot> {
        Category::POI_CATEGORIES
            .iter()
            .map(|category| (*category, snapshot_at(*category, &[], 1_000.0)))
            .collect()
    }

    #[rstest]
    fn all_empty_is_full_confidence() {
        let quality = assess_quality(&all_empty(), &FetchTrace::default());
        assert_eq!(quality.confidence, 100);
        assert!(quality.reasons.is_empty());
        assert_eq!(quality.empty_categories.len(), Category::POI_CATEGORIES.len());
    }

    #[rstest]
    #[case(&[], CoverageStatus::Empty)]
    #[case(&[100.0], CoverageStatus::Partial)]
    #[case(&[100.0, 200.0], CoverageStatus::Partial)]
    #[case(&[100.0, 200.0, 300.0], CoverageStatus::Ok)]
    fn status_follows_kept_count(#[case] distances: &[f64], #[case] expected: CoverageStatus) {
        let snapshots = BTreeMap::from([(
            Category::Food,
            snapshot_at(Category::Food, distances, 1_000.0),
        )]);
        let quality = assess_quality(&snapshots, &FetchTrace::default());
        assert_eq!(quality.status(Category::Food), expected);
    }

    #[rstest]
    fn provider_error_with_results_is_not_an_error() {
        let snapshot = snapshot_at(Category::Food, &[100.0], 1_000.0).with_provider_errors(["timeout"]);
        let snapshots = BTreeMap::from([(Category::Food, snapshot)]);
        let quality = assess_quality(&snapshots, &FetchTrace::default());
        assert_eq!(quality.status(Category::Food), CoverageStatus::Partial);
        assert!(quality.error_categories.is_empty());
    }

    #[rstest]
    fn components_combine_with_floor() {
        let mut snapshots = all_empty();
        snapshots.insert(
            Category::Shops,
            snapshot_at(Category::Shops, &[], 1_000.0).with_provider_errors(["http_429"]),
        );
        snapshots.insert(Category::Food, snapshot_at(Category::Food, &[50.0], 1_000.0));
        let trace = FetchTrace {
            provider_health: ProviderHealth::Degraded,
            had_retry: true,
            from_cache: false,
            fallback: FallbackTrace {
                started: true,
                contributed: true,
            },
        };
        let quality = assess_quality(&snapshots, &trace);
        assert_eq!(
            quality.components,
            ConfidenceComponents {
                provider: 85,
                data: 80,
                coverage: 95
            }
        );
        // 0.4 * 85 + 0.3 * 80 + 0.3 * 95 = 86.5
        assert_eq!(quality.confidence, 86);
        assert_eq!(quality.error_categories, [Category::Shops]);
        assert_eq!(
            quality.reasons,
            [
                "POI provider was degraded during the fetch",
                "Some provider queries had to be retried",
                "Shops: provider error (http_429)",
                "Fallback provider supplied part of the data",
            ]
        );
    }

    #[rstest]
    fn retry_alone_does_not_reduce_confidence() {
        let trace = FetchTrace {
            had_retry: true,
            ..FetchTrace::default()
        };
        let quality = assess_quality(&all_empty(), &trace);
        assert_eq!(quality.confidence, 100);
        assert_eq!(quality.reasons.len(), 1);
    }

    #[rstest]
    fn reasons_are_bounded() {
        let snapshots: BTreeMap<Category, CategorySnapshot> = Category::POI_CATEGORIES
            .iter()
            .map(|category| {
                (
                    *category,
                    snapshot_at(*category, &[], 1_000.0).with_provider_errors(["timeout"]),
                )
            })
            .collect();
        let trace = FetchTrace {
            provider_health: ProviderHealth::Failed,
            ..FetchTrace::default()
        };
        let quality = assess_quality(&snapshots, &trace);
        assert_eq!(quality.reasons.len(), MAX_REASONS);
        assert_eq!(quality.components.data, 0);
        // 0.4 * 70 + 0.3 * 0 + 0.3 * 100 = 58
        assert_eq!(quality.confidence, 58);
    }
}
