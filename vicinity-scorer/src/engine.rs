//! The scoring pipeline: categories, noise, aggregation, rules.

use std::collections::BTreeMap;

use log::{debug, info};
use vicinity_core::{
    Category, CategoryEvaluation, CategoryScore, CategoryScorer, CategorySnapshot, NoiseSource,
    Profile, ScoreBreakdown,
};

use crate::{DecayScorer, ScoreError, aggregate, apply_noise, apply_rules, assess_noise};

/// Category score at or above which a tracked category is a strength.
pub const STRENGTH_THRESHOLD: f64 = 70.0;

/// Category score below which a tracked category is a weakness.
pub const WEAKNESS_THRESHOLD: f64 = 40.0;

/// Scoring pipeline parameterised by the category scorer.
///
/// # Examples
/// ```
/// use std::collections::BTreeMap;
/// use vicinity_core::{Category, ProfileRegistry};
/// use vicinity_core::test_support::snapshot_at;
/// use vicinity_scorer::{DecayScorer, Engine};
///
/// let registry = ProfileRegistry::builtin().expect("built-in profiles are valid");
/// let urban = registry.get("urban").expect("registered profile");
/// let snapshots = BTreeMap::from([(
///     Category::Transport,
///     snapshot_at(Category::Transport, &[80.0, 150.0, 300.0], 700.0),
/// )]);
/// let breakdown = Engine::<DecayScorer>::default()
///     .score(&snapshots, &[], &urban)
///     .expect("consistent input");
/// assert!(breakdown.total_score <= 100.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Engine<S = DecayScorer> {
    scorer: S,
}

impl<S: CategoryScorer> Engine<S> {
    /// Build an engine around `scorer`.
    pub const fn new(scorer: S) -> Self {
        Self { scorer }
    }

    /// Score `snapshots` and `noise` against `profile`.
    ///
    /// # Errors
    /// Returns [`ScoreError`] when a snapshot is filed under the wrong
    /// category or a weighted category lacks a positive radius.
    pub fn score(
        &self,
        snapshots: &BTreeMap<Category, CategorySnapshot>,
        noise: &[NoiseSource],
        profile: &Profile,
    ) -> Result<ScoreBreakdown, ScoreError> {
        let categories = self.score_categories(snapshots, profile)?;
        let assessment = assess_noise(noise, profile.noise_sensitivity());
        let base_score = aggregate(&categories, profile);
        let pre_rule_total = apply_noise(base_score, assessment.penalty);
        let outcome = apply_rules(profile, pre_rule_total, |category| {
            if category == Category::Quiet {
                assessment.quiet_score
            } else {
                categories.get(&category).map_or(0.0, |entry| entry.score)
            }
        });

        let mut breakdown = ScoreBreakdown {
            profile_key: profile.key().to_owned(),
            profile_version: profile.version(),
            base_score,
            noise: assessment,
            categories,
            total_score: outcome.total,
            pre_rule_total,
            applied_caps: outcome.applied_caps,
            dealbreaker: outcome.dealbreaker,
            strengths: Vec::new(),
            weaknesses: Vec::new(),
        };
        breakdown.strengths = ranked(&breakdown, profile, |score| score >= STRENGTH_THRESHOLD);
        breakdown.weaknesses = ranked(&breakdown, profile, |score| score < WEAKNESS_THRESHOLD);
        breakdown.weaknesses.reverse();

        info!(
            "scored profile '{}': base {:.1}, noise -{:.1}, total {:.1}, {} caps, dealbreaker {}",
            breakdown.profile_key,
            breakdown.base_score,
            breakdown.noise.penalty,
            breakdown.total_score,
            breakdown.applied_caps.len(),
            breakdown.dealbreaker.is_some()
        );
        Ok(breakdown)
    }

    fn score_categories(
        &self,
        snapshots: &BTreeMap<Category, CategorySnapshot>,
        profile: &Profile,
    ) -> Result<BTreeMap<Category, CategoryScore>, ScoreError> {
        if let Some((key, snapshot)) = snapshots
            .iter()
            .find(|(key, snapshot)| snapshot.category() != **key)
        {
            return Err(ScoreError::CategoryMismatch {
                key: *key,
                found: snapshot.category(),
            });
        }

        let mut scores = BTreeMap::new();
        for (category, weight) in profile.weights() {
            let radius = match profile.radius(*category) {
                Some(radius) if radius.is_finite() && radius > 0.0 => radius,
                other => {
                    return Err(ScoreError::InvalidRadius {
                        category: *category,
                        radius: other,
                    });
                }
            };
            let evaluation = snapshots.get(category).map_or(
                CategoryEvaluation::NONE,
                |snapshot| {
                    self.scorer
                        .evaluate(snapshot, radius, profile.decay_mode(*category))
                },
            );
            debug!(
                "{category}: {} kept within {radius} m, score {:.1}",
                evaluation.kept_count, evaluation.score
            );
            scores.insert(
                *category,
                CategoryScore {
                    score: evaluation.score,
                    kept_count: evaluation.kept_count,
                    nearest_m: evaluation.nearest_m,
                    radius_m: radius,
                    utility: evaluation.utility,
                    weight: *weight,
                },
            );
        }
        Ok(scores)
    }
}

/// Tracked categories whose score passes `keep`, best first.
fn ranked<F>(breakdown: &ScoreBreakdown, profile: &Profile, keep: F) -> Vec<Category>
where
    F: Fn(f64) -> bool,
{
    let mut picked: Vec<(Category, f64)> = breakdown
        .categories
        .keys()
        .copied()
        .chain(std::iter::once(Category::Quiet))
        .filter(|category| profile.tracks(*category))
        .filter_map(|category| {
            breakdown
                .category_score(category)
                .filter(|score| keep(*score))
                .map(|score| (category, score))
        })
        .collect();
    picked.sort_by(|a, b| b.1.total_cmp(&a.1));
    picked.into_iter().map(|(category, _)| category).collect()
}

/// Score with the default [`DecayScorer`].
///
/// # Errors
/// See [`Engine::score`].
pub fn score(
    snapshots: &BTreeMap<Category, CategorySnapshot>,
    noise: &[NoiseSource],
    profile: &Profile,
) -> Result<ScoreBreakdown, ScoreError> {
    Engine::<DecayScorer>::default().score(snapshots, noise, profile)
}
