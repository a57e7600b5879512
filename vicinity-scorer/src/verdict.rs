//! Verdict generation from a score breakdown.
//!
//! The level follows the total and the rule outcome, then passes through a
//! consistency gate: a dealbreaker permits at most `not_recommended` and an
//! applied cap at most `conditional`. The gate never raises a level.

use log::warn;
use vicinity_core::{
    Category, FactorKind, KeyFactor, Profile, ProfileMatch, ScoreBreakdown, Verdict,
    VerdictLevel, VerdictThresholds,
};

/// Most key factors reported with a verdict.
pub const MAX_KEY_FACTORS: usize = 5;

/// Highest confidence a dealbreaker verdict may carry.
pub const DEALBREAKER_CONFIDENCE_CEILING: u8 = 30;

/// Confidence deducted per applied cap.
const CAP_CONFIDENCE_PENALTY: u8 = 10;

/// Points around a threshold separating neighbouring match bands.
const MATCH_MARGIN: f64 = 10.0;

/// Highest level the rule outcome permits.
///
/// # Examples
/// ```
/// # use std::collections::BTreeMap;
/// use vicinity_core::{NoiseAssessment, ScoreBreakdown, VerdictLevel};
/// use vicinity_scorer::permitted_level;
///
/// let breakdown = ScoreBreakdown {
///     profile_key: "urban".into(),
///     profile_version: 1,
///     base_score: 80.0,
///     noise: NoiseAssessment::SILENT,
///     categories: BTreeMap::new(),
///     total_score: 80.0,
///     pre_rule_total: 80.0,
///     applied_caps: Vec::new(),
///     dealbreaker: None,
///     strengths: Vec::new(),
///     weaknesses: Vec::new(),
/// };
/// assert_eq!(permitted_level(&breakdown), VerdictLevel::Recommended);
/// ```
#[must_use]
pub fn permitted_level(breakdown: &ScoreBreakdown) -> VerdictLevel {
    if breakdown.dealbreaker.is_some() {
        VerdictLevel::NotRecommended
    } else if breakdown.is_capped() {
        VerdictLevel::Conditional
    } else {
        VerdictLevel::Recommended
    }
}

/// Clamp `level` to what the rule outcome permits.
///
/// Logs a warning when the level had to be lowered.
#[must_use]
pub fn consistency_gate(level: VerdictLevel, breakdown: &ScoreBreakdown) -> VerdictLevel {
    let permitted = permitted_level(breakdown);
    if level > permitted {
        warn!(
            "verdict for profile '{}' lowered from {level} to {permitted} by rule outcome",
            breakdown.profile_key
        );
        permitted
    } else {
        level
    }
}

fn classify(breakdown: &ScoreBreakdown, thresholds: VerdictThresholds) -> VerdictLevel {
    let total = breakdown.total_score;
    if breakdown.dealbreaker.is_some() {
        VerdictLevel::NotRecommended
    } else if total >= thresholds.recommended && !breakdown.is_capped() {
        VerdictLevel::Recommended
    } else if total >= thresholds.conditional || breakdown.is_capped() {
        VerdictLevel::Conditional
    } else {
        VerdictLevel::NotRecommended
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "the margin is the distance between the total and a threshold"
)]
fn threshold_margin(total: f64, thresholds: VerdictThresholds) -> f64 {
    (total - thresholds.recommended)
        .abs()
        .min((total - thresholds.conditional).abs())
}

fn baseline_confidence(margin: f64) -> u8 {
    if margin >= 20.0 {
        90
    } else if margin >= 15.0 {
        80
    } else if margin >= 10.0 {
        70
    } else if margin >= 5.0 {
        55
    } else {
        45
    }
}

fn confidence(breakdown: &ScoreBreakdown, thresholds: VerdictThresholds) -> u8 {
    let caps = u8::try_from(breakdown.applied_caps.len()).unwrap_or(u8::MAX);
    let reduced = baseline_confidence(threshold_margin(breakdown.total_score, thresholds))
        .saturating_sub(caps.saturating_mul(CAP_CONFIDENCE_PENALTY));
    if breakdown.dealbreaker.is_some() {
        reduced.min(DEALBREAKER_CONFIDENCE_CEILING)
    } else {
        reduced.min(100)
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "match bands sit a fixed margin around the thresholds"
)]
fn profile_match(breakdown: &ScoreBreakdown, thresholds: VerdictThresholds) -> ProfileMatch {
    let total = breakdown.total_score;
    if breakdown.dealbreaker.is_some() {
        return ProfileMatch::Mismatch;
    }
    let band = if total >= thresholds.recommended + MATCH_MARGIN {
        ProfileMatch::Excellent
    } else if total >= thresholds.recommended {
        ProfileMatch::Good
    } else if total >= thresholds.conditional {
        ProfileMatch::Acceptable
    } else if total >= thresholds.conditional - MATCH_MARGIN {
        ProfileMatch::Poor
    } else {
        ProfileMatch::Mismatch
    };
    match band {
        ProfileMatch::Excellent | ProfileMatch::Good if breakdown.is_capped() => {
            ProfileMatch::Acceptable
        }
        other => other,
    }
}

fn score_text(breakdown: &ScoreBreakdown, category: Category) -> String {
    format!("{:.0}", breakdown.category_score(category).unwrap_or(0.0))
}

fn warnings(breakdown: &ScoreBreakdown) -> Vec<KeyFactor> {
    let mut factors = Vec::new();
    if let Some(hit) = breakdown.dealbreaker {
        factors.push(KeyFactor {
            kind: FactorKind::Warning,
            category: hit.category,
            message: format!(
                "{} scores {:.0}, below the dealbreaker threshold of {:.0}",
                hit.category.label(),
                hit.score,
                hit.threshold
            ),
        });
    }
    factors.extend(breakdown.applied_caps.iter().map(|cap| KeyFactor {
        kind: FactorKind::Warning,
        category: cap.category,
        message: format!(
            "{} scores {:.0}, below the required {:.0}; total capped at {:.0}",
            cap.category.label(),
            cap.score,
            cap.min_score,
            cap.ceiling
        ),
    }));
    factors
}

fn strength(breakdown: &ScoreBreakdown, category: Category) -> KeyFactor {
    KeyFactor {
        kind: FactorKind::Strength,
        category,
        message: format!(
            "{} is a strength ({}/100)",
            category.label(),
            score_text(breakdown, category)
        ),
    }
}

fn weakness(breakdown: &ScoreBreakdown, category: Category) -> KeyFactor {
    KeyFactor {
        kind: FactorKind::Weakness,
        category,
        message: format!(
            "{} is weak ({}/100)",
            category.label(),
            score_text(breakdown, category)
        ),
    }
}

fn key_factors(breakdown: &ScoreBreakdown, level: VerdictLevel) -> Vec<KeyFactor> {
    let (strengths, weaknesses) = match level {
        VerdictLevel::Recommended => (3, 0),
        VerdictLevel::Conditional => (2, 2),
        VerdictLevel::NotRecommended => (0, 3),
    };
    let mut factors = warnings(breakdown);
    factors.extend(
        breakdown
            .strengths
            .iter()
            .take(strengths)
            .map(|category| strength(breakdown, *category)),
    );
    factors.extend(
        breakdown
            .weaknesses
            .iter()
            .take(weaknesses)
            .map(|category| weakness(breakdown, *category)),
    );
    factors.truncate(MAX_KEY_FACTORS);
    factors
}

fn explanation(
    breakdown: &ScoreBreakdown,
    profile: &Profile,
    level: VerdictLevel,
    thresholds: VerdictThresholds,
) -> String {
    let name = profile.name();
    let total = breakdown.total_score;
    let mut text = if let Some(hit) = breakdown.dealbreaker {
        format!(
            "Not recommended for {name}: {} scores {:.0}, below the dealbreaker threshold of {:.0}.",
            hit.category.label(),
            hit.score,
            hit.threshold
        )
    } else {
        match level {
            VerdictLevel::Recommended => format!(
                "Recommended for {name}: total score {total:.1} meets the {:.0} threshold.",
                thresholds.recommended
            ),
            VerdictLevel::Conditional if breakdown.is_capped() => {
                let short: Vec<&str> = breakdown
                    .applied_caps
                    .iter()
                    .map(|cap| cap.category.label())
                    .collect();
                format!(
                    "Conditionally suitable for {name}: total score {total:.1} is capped at {:.0} because {} falls short.",
                    breakdown.tightest_ceiling().unwrap_or(total),
                    short.join(", ")
                )
            }
            VerdictLevel::Conditional => format!(
                "Conditionally suitable for {name}: total score {total:.1} lies between {:.0} and {:.0}.",
                thresholds.conditional, thresholds.recommended
            ),
            VerdictLevel::NotRecommended => format!(
                "Not recommended for {name}: total score {total:.1} is below the {:.0} threshold.",
                thresholds.conditional
            ),
        }
    };
    if breakdown.noise.level >= vicinity_core::NoiseLevel::High {
        text.push_str(" The surroundings are noisy.");
    }
    text
}

/// Generate the verdict for `breakdown` under `profile`'s thresholds.
///
/// The function is pure: equal inputs always produce equal verdicts.
#[must_use]
pub fn generate_verdict(breakdown: &ScoreBreakdown, profile: &Profile) -> Verdict {
    let thresholds = profile.thresholds();
    let level = consistency_gate(classify(breakdown, thresholds), breakdown);
    Verdict {
        level,
        score: breakdown.total_score,
        confidence: confidence(breakdown, thresholds),
        profile_match: profile_match(breakdown, thresholds),
        key_factors: key_factors(breakdown, level),
        explanation: explanation(breakdown, profile, level, thresholds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use vicinity_core::{AppliedCap, DealbreakerHit, NoiseAssessment, ProfileRegistry};

    #[fixture]
    fn urban() -> Arc<Profile> {
        ProfileRegistry::builtin()
            .expect("built-in profiles are valid")
            .get("urban")
            .expect("registered profile")
    }

    fn breakdown(total: f64) -> ScoreBreakdown {
        ScoreBreakdown {
            profile_key: "urban".into(),
            profile_version: 1,
            base_score: total,
            noise: NoiseAssessment::SILENT,
            categories: BTreeMap::new(),
            total_score: total,
            pre_rule_total: total,
            applied_caps: Vec::new(),
            dealbreaker: None,
            strengths: vec![Category::Quiet],
            weaknesses: Vec::new(),
        }
    }

    fn cap() -> AppliedCap {
        AppliedCap {
            category: Category::Transport,
            score: 20.0,
            min_score: 35.0,
            ceiling: 65.0,
        }
    }

    #[rstest]
    #[case(90.0, VerdictLevel::Recommended, 90)]
    #[case(65.0, VerdictLevel::Recommended, 45)]
    #[case(55.0, VerdictLevel::Conditional, 70)]
    #[case(44.0, VerdictLevel::NotRecommended, 45)]
    #[case(10.0, VerdictLevel::NotRecommended, 90)]
    fn level_and_confidence_follow_total(
        urban: Arc<Profile>,
        #[case] total: f64,
        #[case] level: VerdictLevel,
        #[case] confidence: u8,
    ) {
        let verdict = generate_verdict(&breakdown(total), &urban);
        assert_eq!(verdict.level, level);
        assert_eq!(verdict.confidence, confidence);
        assert_eq!(verdict.score, total);
    }

    #[rstest]
    fn cap_forces_conditional_even_when_low(urban: Arc<Profile>) {
        let mut scored = breakdown(30.0);
        scored.applied_caps.push(cap());
        let verdict = generate_verdict(&scored, &urban);
        assert_eq!(verdict.level, VerdictLevel::Conditional);
        assert_eq!(verdict.key_factors.first().map(|f| f.kind), Some(FactorKind::Warning));
    }

    #[rstest]
    fn caps_reduce_confidence(urban: Arc<Profile>) {
        let mut scored = breakdown(90.0);
        scored.applied_caps = vec![cap(), cap()];
        assert_eq!(generate_verdict(&scored, &urban).confidence, 70);
    }

    #[rstest]
    fn dealbreaker_overrides_a_high_total(urban: Arc<Profile>) {
        let mut scored = breakdown(95.0);
        scored.dealbreaker = Some(DealbreakerHit {
            category: Category::Transport,
            score: 4.0,
            threshold: 10.0,
        });
        let verdict = generate_verdict(&scored, &urban);
        assert_eq!(verdict.level, VerdictLevel::NotRecommended);
        assert!(verdict.confidence <= DEALBREAKER_CONFIDENCE_CEILING);
        assert_eq!(verdict.profile_match, ProfileMatch::Mismatch);
        assert!(verdict.explanation.contains("Public transport"));
    }

    #[rstest]
    fn gate_lowers_but_never_raises() {
        let mut scored = breakdown(90.0);
        scored.applied_caps.push(cap());
        assert_eq!(
            consistency_gate(VerdictLevel::Recommended, &scored),
            VerdictLevel::Conditional
        );
        assert_eq!(
            consistency_gate(VerdictLevel::NotRecommended, &scored),
            VerdictLevel::NotRecommended
        );
    }

    #[rstest]
    #[case(80.0, ProfileMatch::Excellent)]
    #[case(70.0, ProfileMatch::Good)]
    #[case(50.0, ProfileMatch::Acceptable)]
    #[case(40.0, ProfileMatch::Poor)]
    #[case(20.0, ProfileMatch::Mismatch)]
    fn match_bands(urban: Arc<Profile>, #[case] total: f64, #[case] expected: ProfileMatch) {
        assert_eq!(generate_verdict(&breakdown(total), &urban).profile_match, expected);
    }

    #[rstest]
    fn key_factors_are_bounded(urban: Arc<Profile>) {
        let mut scored = breakdown(50.0);
        scored.applied_caps = vec![cap(), cap(), cap()];
        scored.strengths = vec![Category::Food, Category::Shops, Category::Leisure];
        scored.weaknesses = vec![Category::Finance, Category::Health];
        let verdict = generate_verdict(&scored, &urban);
        assert_eq!(verdict.key_factors.len(), MAX_KEY_FACTORS);
        let kinds: Vec<FactorKind> = verdict.key_factors.iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            [
                FactorKind::Warning,
                FactorKind::Warning,
                FactorKind::Warning,
                FactorKind::Strength,
                FactorKind::Strength
            ]
        );
    }

    #[rstest]
    fn verdicts_are_deterministic(urban: Arc<Profile>) {
        let scored = breakdown(61.5);
        assert_eq!(
            generate_verdict(&scored, &urban),
            generate_verdict(&scored, &urban)
        );
    }
}
