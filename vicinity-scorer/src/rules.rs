//! Critical caps and dealbreakers.
//!
//! Rules are evaluated in declaration order. Every failing cap is recorded
//! and the tightest ceiling bounds the total. Only the first failing
//! dealbreaker is recorded.

use vicinity_core::{AppliedCap, Category, DealbreakerHit, Profile, Rule};

/// Result of evaluating a profile's rules.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOutcome {
    /// Total after caps.
    pub total: f64,
    /// Caps that fired, in rule order.
    pub applied_caps: Vec<AppliedCap>,
    /// First dealbreaker that fired.
    pub dealbreaker: Option<DealbreakerHit>,
}

/// Apply `profile`'s rules to `pre_rule_total`.
///
/// `score_of` returns the score of a category; the quiet category reads
/// the quiet score.
///
/// # Examples
/// ```
/// use vicinity_core::{Category, ProfileRegistry};
/// use vicinity_scorer::apply_rules;
///
/// let registry = ProfileRegistry::builtin().expect("built-in profiles are valid");
/// let urban = registry.get("urban").expect("registered profile");
/// let outcome = apply_rules(&urban, 80.0, |category| match category {
///     Category::Transport => 20.0,
///     _ => 90.0,
/// });
/// assert_eq!(outcome.total, 65.0);
/// assert_eq!(outcome.applied_caps.len(), 1);
/// assert!(outcome.dealbreaker.is_none());
/// ```
#[must_use]
pub fn apply_rules<F>(profile: &Profile, pre_rule_total: f64, score_of: F) -> RuleOutcome
where
    F: Fn(Category) -> f64,
{
    let mut outcome = RuleOutcome {
        total: pre_rule_total,
        applied_caps: Vec::new(),
        dealbreaker: None,
    };
    for rule in profile.rules() {
        let category = rule.category();
        let score = score_of(category);
        if !rule.fails(score) {
            continue;
        }
        match *rule {
            Rule::CriticalCap {
                min_score, ceiling, ..
            } => {
                outcome.total = outcome.total.min(ceiling);
                outcome.applied_caps.push(AppliedCap {
                    category,
                    score,
                    min_score,
                    ceiling,
                });
            }
            Rule::Dealbreaker { threshold, .. } => {
                if outcome.dealbreaker.is_none() {
                    outcome.dealbreaker = Some(DealbreakerHit {
                        category,
                        score,
                        threshold,
                    });
                }
            }
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use vicinity_core::ProfileRegistry;

    #[fixture]
    fn registry() -> ProfileRegistry {
        ProfileRegistry::builtin().expect("built-in profiles are valid")
    }

    #[rstest]
    fn passing_rules_leave_total_untouched(registry: ProfileRegistry) {
        let family = registry.get("family").expect("registered profile");
        let outcome = apply_rules(&family, 88.0, |_| 90.0);
        assert_eq!(outcome.total, 88.0);
        assert!(outcome.applied_caps.is_empty());
        assert!(outcome.dealbreaker.is_none());
    }

    #[rstest]
    fn tightest_ceiling_wins(registry: ProfileRegistry) {
        let family = registry.get("family").expect("registered profile");
        let outcome = apply_rules(&family, 90.0, |category| match category {
            Category::Education | Category::NaturePlace => 20.0,
            _ => 90.0,
        });
        assert_eq!(outcome.total, 70.0);
        let capped: Vec<Category> = outcome.applied_caps.iter().map(|c| c.category).collect();
        assert_eq!(capped, [Category::Education, Category::NaturePlace]);
    }

    #[rstest]
    fn caps_never_raise_the_total(registry: ProfileRegistry) {
        let urban = registry.get("urban").expect("registered profile");
        let outcome = apply_rules(&urban, 30.0, |_| 0.0);
        assert_eq!(outcome.total, 30.0);
        assert_eq!(outcome.applied_caps.len(), 2);
    }

    #[rstest]
    fn quiet_dealbreaker_reads_quiet_score(registry: ProfileRegistry) {
        let quiet = registry.get("quiet_green").expect("registered profile");
        let outcome = apply_rules(&quiet, 75.0, |category| match category {
            Category::Quiet => 10.0,
            _ => 80.0,
        });
        assert_eq!(
            outcome.dealbreaker,
            Some(DealbreakerHit {
                category: Category::Quiet,
                score: 10.0,
                threshold: 15.0
            })
        );
        assert_eq!(outcome.total, 60.0);
    }

    #[rstest]
    fn threshold_score_passes(registry: ProfileRegistry) {
        let car = registry.get("car_first").expect("registered profile");
        let outcome = apply_rules(&car, 80.0, |_| 35.0);
        assert!(outcome.applied_caps.is_empty());
    }
}
