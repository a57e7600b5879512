//! Property-based tests for the scoring pipeline.
//!
//! # Invariants tested
//!
//! - **Bounds:** category, base, and total scores stay within `0..=100`.
//! - **Caps:** the total never exceeds the pre-rule total or a fired ceiling.
//! - **Monotonicity:** adding a POI never lowers a category score.
//! - **Gate:** dealbreakers force `not_recommended` with capped confidence,
//!   and caps forbid `recommended`.
//! - **Quality:** confidence stays within `0..=100` and reasons are bounded.


use std::collections::BTreeMap;

use proptest::prelude::*;
use vicinity_core::test_support::snapshot_at;
use vicinity_core::{
    Category, CategoryScorer, CategorySnapshot, DecayMode, FetchTrace, ProfileRegistry, VerdictLevel,
};
use vicinity_scorer::{
    DEALBREAKER_CONFIDENCE_CEILING, DecayScorer, MAX_KEY_FACTORS, MAX_REASONS, assess_quality,
    generate_verdict, score,
};

use proptest_support::{
    FETCH_RADIUS_M, distances_strategy, noise_strategy, profile_key_strategy, snapshots_strategy,
};

fn in_unit_range(value: f64) -> bool {
    (0.0..=100.0).contains(&value)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Property: every score in a breakdown lies within `0..=100`.
    #[test]
    fn scores_stay_in_range(
        key in profile_key_strategy(),
        snapshots in snapshots_strategy(),
        noise in noise_strategy(),
    ) {
        let registry = ProfileRegistry::builtin().expect("built-in profiles are valid");
        let profile = registry.get(key).expect("registered profile");
        let breakdown = score(&snapshots, &noise, &profile).expect("consistent input");
        prop_assert!(in_unit_range(breakdown.base_score));
        prop_assert!(in_unit_range(breakdown.total_score));
        prop_assert!(breakdown.categories.values().all(|entry| in_unit_range(entry.score)));
        prop_assert!(in_unit_range(breakdown.noise.quiet_score));
    }

    /// Property: rules only lower the total, and only through a fired ceiling.
    #[test]
    fn caps_never_raise_the_total(
        key in profile_key_strategy(),
        snapshots in snapshots_strategy(),
        noise in noise_strategy(),
    ) {
        let registry = ProfileRegistry::builtin().expect("built-in profiles are valid");
        let profile = registry.get(key).expect("registered profile");
        let breakdown = score(&snapshots, &noise, &profile).expect("consistent input");
        prop_assert!(breakdown.total_score <= breakdown.pre_rule_total);
        if let Some(ceiling) = breakdown.tightest_ceiling() {
            prop_assert!(breakdown.total_score <= ceiling);
        } else {
            prop_assert_eq!(breakdown.total_score, breakdown.pre_rule_total);
        }
    }

    /// Property: an extra POI never lowers a category score.
    #[test]
    fn extra_poi_never_lowers_score(
        distances in distances_strategy(12),
        extra in 0.0_f64..FETCH_RADIUS_M,
        radius in 200.0_f64..FETCH_RADIUS_M,
    ) {
        let before = snapshot_at(Category::Shops, &distances, FETCH_RADIUS_M);
        let mut more = distances.clone();
        more.push(extra);
        let after = snapshot_at(Category::Shops, &more, FETCH_RADIUS_M);
        let first = DecayScorer.evaluate(&before, radius, DecayMode::Daily);
        let second = DecayScorer.evaluate(&after, radius, DecayMode::Daily);
        prop_assert!(second.score >= first.score);
    }

    /// Property: verdict levels respect the rule outcome.
    #[test]
    fn verdict_respects_rule_outcome(
        key in profile_key_strategy(),
        snapshots in snapshots_strategy(),
        noise in noise_strategy(),
    ) {
        let registry = ProfileRegistry::builtin().expect("built-in profiles are valid");
        let profile = registry.get(key).expect("registered profile");
        let breakdown = score(&snapshots, &noise, &profile).expect("consistent input");
        let verdict = generate_verdict(&breakdown, &profile);
        if breakdown.dealbreaker.is_some() {
            prop_assert_eq!(verdict.level, VerdictLevel::NotRecommended);
            prop_assert!(verdict.confidence <= DEALBREAKER_CONFIDENCE_CEILING);
        }
        if breakdown.is_capped() {
            prop_assert!(verdict.level != VerdictLevel::Recommended);
        }
        prop_assert!(verdict.confidence <= 100);
        prop_assert!(verdict.key_factors.len() <= MAX_KEY_FACTORS);
        prop_assert_eq!(verdict.score, breakdown.total_score);
    }

    /// Property: the assessment is bounded however many categories fail.
    #[test]
    fn quality_is_bounded(snapshots in snapshots_strategy(), failing in 0_usize..=10) {
        let degraded: BTreeMap<Category, CategorySnapshot> = snapshots
            .into_iter()
            .enumerate()
            .map(|(index, (category, snapshot))| {
                if index < failing {
                    (category, snapshot.with_provider_errors(["timeout"]))
                } else {
                    (category, snapshot)
                }
            })
            .collect();
        let quality = assess_quality(&degraded, &FetchTrace::default());
        prop_assert!(quality.confidence <= 100);
        prop_assert!(quality.reasons.len() <= MAX_REASONS);
        prop_assert_eq!(quality.coverage.len(), Category::POI_CATEGORIES.len());
    }
}
