//! Location profiles: weighting schemes, search radii, and hard requirements.
//!
//! A [`Profile`] is validated once when it is built or loaded. Scoring code
//! can then rely on weights summing to one, every weighted category carrying
//! a positive radius, and rule bounds lying in `0..=100`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Category, DecayMode};

/// Key reserved for profiles whose weights come from the request.
pub const CUSTOM_PROFILE_KEY: &str = "custom";

/// Radius applied to custom-profile categories without an explicit radius.
pub const DEFAULT_CUSTOM_RADIUS_M: f64 = 1_000.0;

/// Tolerance accepted on the sum of profile weights.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Score thresholds separating verdict levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VerdictThresholds {
    /// Minimum total for a recommended verdict.
    pub recommended: f64,
    /// Minimum total for a conditional verdict.
    pub conditional: f64,
}

impl Default for VerdictThresholds {
    fn default() -> Self {
        Self {
            recommended: 70.0,
            conditional: 45.0,
        }
    }
}

/// A declarative hard requirement evaluated after aggregation.
///
/// # Examples
/// ```
/// use vicinity_core::{Category, Rule};
///
/// let rule = Rule::CriticalCap {
///     category: Category::Education,
///     min_score: 35.0,
///     ceiling: 70.0,
/// };
/// assert!(rule.fails(20.0));
/// assert!(!rule.fails(35.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rule {
    /// Clamp the total to `ceiling` when the category scores below
    /// `min_score`.
    CriticalCap {
        /// Category the rule inspects.
        category: Category,
        /// Score the category must reach.
        min_score: f64,
        /// Highest total allowed when the rule fails.
        ceiling: f64,
    },
    /// Force a negative verdict when the category scores below `threshold`.
    Dealbreaker {
        /// Category the rule inspects.
        category: Category,
        /// Score the category must reach.
        threshold: f64,
    },
}

impl Rule {
    /// Category the rule inspects.
    #[must_use]
    pub const fn category(&self) -> Category {
        match self {
            Self::CriticalCap { category, .. } | Self::Dealbreaker { category, .. } => *category,
        }
    }

    /// Score the category must reach for the rule to pass.
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        match self {
            Self::CriticalCap { min_score, .. } => *min_score,
            Self::Dealbreaker { threshold, .. } => *threshold,
        }
    }

    /// Report whether `score` breaks the rule.
    #[must_use]
    pub fn fails(&self, score: f64) -> bool {
        score < self.threshold()
    }
}

/// Errors raised while validating a [`Profile`].
#[derive(Debug, Error, PartialEq)]
pub enum ProfileError {
    /// The profile key was blank.
    #[error("profile key must not be empty")]
    EmptyKey,
    /// No registered profile has the requested key.
    #[error("unknown profile '{key}'")]
    Unknown {
        /// Requested key.
        key: String,
    },
    /// The key is reserved for request-defined profiles.
    #[error("profile key '{key}' is reserved for request-defined weights")]
    ReservedKey {
        /// Reserved key.
        key: String,
    },
    /// A weight was outside `0..=1` or not finite.
    #[error("profile '{key}': weight {weight} for {category} must be within 0..=1")]
    InvalidWeight {
        /// Profile key.
        key: String,
        /// Category carrying the weight.
        category: Category,
        /// Offending weight.
        weight: f64,
    },
    /// Weights did not sum to one.
    #[error("profile '{key}': weights sum to {sum}, expected 1")]
    WeightSum {
        /// Profile key.
        key: String,
        /// Actual sum.
        sum: f64,
    },
    /// The derived quiet category was weighted.
    #[error("profile '{key}': quiet is derived from noise and cannot be weighted")]
    QuietWeighted {
        /// Profile key.
        key: String,
    },
    /// A weighted category has no radius.
    #[error("profile '{key}': no radius for weighted category {category}")]
    MissingRadius {
        /// Profile key.
        key: String,
        /// Category without a radius.
        category: Category,
    },
    /// A radius was zero, negative, or not finite.
    #[error("profile '{key}': radius {radius} for {category} must be positive")]
    InvalidRadius {
        /// Profile key.
        key: String,
        /// Category carrying the radius.
        category: Category,
        /// Offending radius in metres.
        radius: f64,
    },
    /// Verdict thresholds were out of range or inverted.
    #[error(
        "profile '{key}': thresholds must satisfy 0 <= conditional ({conditional}) < recommended ({recommended}) <= 100"
    )]
    InvalidThresholds {
        /// Profile key.
        key: String,
        /// Recommended threshold.
        recommended: f64,
        /// Conditional threshold.
        conditional: f64,
    },
    /// A rule bound was outside `0..=100`.
    #[error("profile '{key}': rule bound {value} for {category} must be within 0..=100")]
    InvalidRuleBound {
        /// Profile key.
        key: String,
        /// Category the rule inspects.
        category: Category,
        /// Offending bound.
        value: f64,
    },
    /// A rule targets a category the profile neither weights nor derives.
    #[error("profile '{key}': rule targets untracked category {category}")]
    UntrackedRuleCategory {
        /// Profile key.
        key: String,
        /// Untracked category.
        category: Category,
    },
    /// The noise sensitivity was negative or not finite.
    #[error("profile '{key}': noise sensitivity {value} must be finite and non-negative")]
    InvalidSensitivity {
        /// Profile key.
        key: String,
        /// Offending multiplier.
        value: f64,
    },
}

/// Unvalidated profile fields, as stored in profile files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileDefinition {
    /// Registry key, for example `family`.
    pub key: String,
    /// Display name.
    pub name: String,
    /// One-line description.
    #[serde(default)]
    pub description: String,
    /// Category weights summing to one.
    pub weights: BTreeMap<Category, f64>,
    /// Search radius per category in metres.
    pub radii: BTreeMap<Category, f64>,
    /// Decay curve overrides.
    #[serde(default)]
    pub decay_modes: BTreeMap<Category, DecayMode>,
    /// Multiplier applied to the raw noise penalty.
    #[serde(default = "default_sensitivity")]
    pub noise_sensitivity: f64,
    /// Verdict thresholds.
    #[serde(default)]
    pub thresholds: VerdictThresholds,
    /// Hard requirements in evaluation order.
    #[serde(default)]
    pub rules: Vec<Rule>,
    /// Configuration version recorded in breakdowns.
    #[serde(default = "default_version")]
    pub version: u32,
}

const fn default_sensitivity() -> f64 {
    1.0
}

const fn default_version() -> u32 {
    1
}

/// A validated location profile.
///
/// # Examples
/// ```
/// use std::collections::BTreeMap;
/// use vicinity_core::{Category, Profile};
///
/// # fn main() -> Result<(), vicinity_core::ProfileError> {
/// let weights = BTreeMap::from([(Category::Shops, 0.6), (Category::Transport, 0.4)]);
/// let profile = Profile::custom(weights, BTreeMap::new())?;
/// assert_eq!(profile.radius(Category::Shops), Some(1_000.0));
/// assert!(profile.is_custom());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ProfileDefinition", into = "ProfileDefinition")]
pub struct Profile {
    definition: ProfileDefinition,
}

impl TryFrom<ProfileDefinition> for Profile {
    type Error = ProfileError;

    fn try_from(definition: ProfileDefinition) -> Result<Self, Self::Error> {
        Self::new(definition)
    }
}

impl From<Profile> for ProfileDefinition {
    fn from(profile: Profile) -> Self {
        profile.definition
    }
}

impl Profile {
    /// Validate a definition.
    pub fn new(definition: ProfileDefinition) -> Result<Self, ProfileError> {
        if definition.key.trim().is_empty() {
            return Err(ProfileError::EmptyKey);
        }
        validate_weights(&definition)?;
        validate_radii(&definition)?;
        validate_thresholds(&definition)?;
        validate_rules(&definition)?;
        let sensitivity = definition.noise_sensitivity;
        if !sensitivity.is_finite() || sensitivity < 0.0 {
            return Err(ProfileError::InvalidSensitivity {
                key: definition.key,
                value: sensitivity,
            });
        }
        Ok(Self { definition })
    }

    /// Build the request-defined `custom` profile.
    ///
    /// Weighted categories without a radius use
    /// [`DEFAULT_CUSTOM_RADIUS_M`].
    pub fn custom(
        weights: BTreeMap<Category, f64>,
        radii: BTreeMap<Category, f64>,
    ) -> Result<Self, ProfileError> {
        let resolved = weights
            .keys()
            .map(|category| {
                let radius = radii
                    .get(category)
                    .copied()
                    .unwrap_or(DEFAULT_CUSTOM_RADIUS_M);
                (*category, radius)
            })
            .collect();
        Self::new(ProfileDefinition {
            key: CUSTOM_PROFILE_KEY.to_owned(),
            name: "Custom".to_owned(),
            description: "Weights supplied with the request".to_owned(),
            weights,
            radii: resolved,
            decay_modes: BTreeMap::new(),
            noise_sensitivity: default_sensitivity(),
            thresholds: VerdictThresholds::default(),
            rules: Vec::new(),
            version: default_version(),
        })
    }

    /// Return a copy with radii replaced for tracked categories.
    ///
    /// Overrides for categories the profile does not weight are ignored.
    pub fn with_radius_overrides(
        &self,
        overrides: &BTreeMap<Category, f64>,
    ) -> Result<Self, ProfileError> {
        let mut definition = self.definition.clone();
        for (category, radius) in overrides {
            if definition.weights.contains_key(category) {
                definition.radii.insert(*category, *radius);
            }
        }
        Self::new(definition)
    }

    /// Registry key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.definition.key
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// One-line description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.definition.description
    }

    /// Report whether this is the request-defined `custom` profile.
    #[must_use]
    pub fn is_custom(&self) -> bool {
        self.definition.key == CUSTOM_PROFILE_KEY
    }

    /// Weight for `category`, if the profile weights it.
    #[must_use]
    pub fn weight(&self, category: Category) -> Option<f64> {
        self.definition.weights.get(&category).copied()
    }

    /// All category weights.
    #[must_use]
    pub const fn weights(&self) -> &BTreeMap<Category, f64> {
        &self.definition.weights
    }

    /// Search radius for `category` in metres.
    #[must_use]
    pub fn radius(&self, category: Category) -> Option<f64> {
        self.definition.radii.get(&category).copied()
    }

    /// All search radii.
    #[must_use]
    pub const fn radii(&self) -> &BTreeMap<Category, f64> {
        &self.definition.radii
    }

    /// Decay curve for `category`, honouring overrides.
    #[must_use]
    pub fn decay_mode(&self, category: Category) -> DecayMode {
        self.definition
            .decay_modes
            .get(&category)
            .copied()
            .unwrap_or_else(|| category.default_decay_mode())
    }

    /// Multiplier applied to the raw noise penalty.
    #[must_use]
    pub const fn noise_sensitivity(&self) -> f64 {
        self.definition.noise_sensitivity
    }

    /// Verdict thresholds.
    #[must_use]
    pub const fn thresholds(&self) -> VerdictThresholds {
        self.definition.thresholds
    }

    /// Hard requirements in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.definition.rules
    }

    /// Configuration version.
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.definition.version
    }

    /// Report whether the category contributes to strengths and weaknesses.
    ///
    /// Weighted categories and the derived quiet category are tracked.
    #[must_use]
    pub fn tracks(&self, category: Category) -> bool {
        category == Category::Quiet || self.definition.weights.contains_key(&category)
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "weight sums are compared against a tolerance"
)]
fn weight_sum_matches(sum: f64) -> bool {
    (sum - 1.0).abs() <= WEIGHT_SUM_TOLERANCE
}

fn validate_weights(definition: &ProfileDefinition) -> Result<(), ProfileError> {
    if definition.weights.contains_key(&Category::Quiet) {
        return Err(ProfileError::QuietWeighted {
            key: definition.key.clone(),
        });
    }
    if let Some((category, weight)) = definition
        .weights
        .iter()
        .find(|(_, weight)| !weight.is_finite() || !(0.0..=1.0).contains(*weight))
    {
        return Err(ProfileError::InvalidWeight {
            key: definition.key.clone(),
            category: *category,
            weight: *weight,
        });
    }
    let sum: f64 = definition.weights.values().sum();
    if weight_sum_matches(sum) {
        Ok(())
    } else {
        Err(ProfileError::WeightSum {
            key: definition.key.clone(),
            sum,
        })
    }
}

fn validate_radii(definition: &ProfileDefinition) -> Result<(), ProfileError> {
    if let Some(category) = definition
        .weights
        .keys()
        .find(|category| !definition.radii.contains_key(category))
    {
        return Err(ProfileError::MissingRadius {
            key: definition.key.clone(),
            category: *category,
        });
    }
    match definition
        .radii
        .iter()
        .find(|(_, radius)| !radius.is_finite() || **radius <= 0.0)
    {
        Some((category, radius)) => Err(ProfileError::InvalidRadius {
            key: definition.key.clone(),
            category: *category,
            radius: *radius,
        }),
        None => Ok(()),
    }
}

fn validate_thresholds(definition: &ProfileDefinition) -> Result<(), ProfileError> {
    let VerdictThresholds {
        recommended,
        conditional,
    } = definition.thresholds;
    let in_range = (0.0..=100.0).contains(&recommended) && (0.0..=100.0).contains(&conditional);
    if in_range && conditional < recommended {
        Ok(())
    } else {
        Err(ProfileError::InvalidThresholds {
            key: definition.key.clone(),
            recommended,
            conditional,
        })
    }
}

fn validate_rules(definition: &ProfileDefinition) -> Result<(), ProfileError> {
    for rule in &definition.rules {
        let category = rule.category();
        if category != Category::Quiet && !definition.weights.contains_key(&category) {
            return Err(ProfileError::UntrackedRuleCategory {
                key: definition.key.clone(),
                category,
            });
        }
        let bounds = match rule {
            Rule::CriticalCap {
                min_score, ceiling, ..
            } => [*min_score, *ceiling],
            Rule::Dealbreaker { threshold, .. } => [*threshold, *threshold],
        };
        if let Some(value) = bounds.into_iter().find(|v| !(0.0..=100.0).contains(v)) {
            return Err(ProfileError::InvalidRuleBound {
                key: definition.key.clone(),
                category,
                value,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn definition() -> ProfileDefinition {
        ProfileDefinition {
            key: "walker".into(),
            name: "Walker".into(),
            description: String::new(),
            weights: BTreeMap::from([(Category::Shops, 0.5), (Category::NaturePlace, 0.5)]),
            radii: BTreeMap::from([(Category::Shops, 800.0), (Category::NaturePlace, 1_200.0)]),
            decay_modes: BTreeMap::new(),
            noise_sensitivity: 1.0,
            thresholds: VerdictThresholds::default(),
            rules: vec![Rule::Dealbreaker {
                category: Category::Quiet,
                threshold: 10.0,
            }],
            version: 1,
        }
    }

    #[rstest]
    fn accepts_valid_definition(definition: ProfileDefinition) {
        let profile = Profile::new(definition).expect("valid profile");
        assert_eq!(profile.weight(Category::Shops), Some(0.5));
        assert!(profile.tracks(Category::Quiet));
        assert!(!profile.tracks(Category::Finance));
    }

    #[rstest]
    fn rejects_weights_not_summing_to_one(mut definition: ProfileDefinition) {
        definition.weights.insert(Category::Shops, 0.6);
        assert!(matches!(
            Profile::new(definition),
            Err(ProfileError::WeightSum { .. })
        ));
    }

    #[rstest]
    fn accepts_sum_within_tolerance(mut definition: ProfileDefinition) {
        definition.weights.insert(Category::Shops, 0.500_000_5);
        assert!(Profile::new(definition).is_ok());
    }

    #[rstest]
    #[case(-0.1)]
    #[case(1.5)]
    #[case(f64::NAN)]
    fn rejects_out_of_range_weight(mut definition: ProfileDefinition, #[case] weight: f64) {
        definition.weights.insert(Category::Food, weight);
        definition.radii.insert(Category::Food, 500.0);
        assert!(matches!(
            Profile::new(definition),
            Err(ProfileError::InvalidWeight { .. })
        ));
    }

    #[rstest]
    fn rejects_missing_radius(mut definition: ProfileDefinition) {
        definition.radii.remove(&Category::NaturePlace);
        assert_eq!(
            Profile::new(definition),
            Err(ProfileError::MissingRadius {
                key: "walker".into(),
                category: Category::NaturePlace
            })
        );
    }

    #[rstest]
    fn rejects_weighted_quiet(mut definition: ProfileDefinition) {
        definition.weights.insert(Category::Quiet, 0.0);
        assert!(matches!(
            Profile::new(definition),
            Err(ProfileError::QuietWeighted { .. })
        ));
    }

    #[rstest]
    fn rejects_inverted_thresholds(mut definition: ProfileDefinition) {
        definition.thresholds = VerdictThresholds {
            recommended: 40.0,
            conditional: 60.0,
        };
        assert!(matches!(
            Profile::new(definition),
            Err(ProfileError::InvalidThresholds { .. })
        ));
    }

    #[rstest]
    fn rejects_rule_on_untracked_category(mut definition: ProfileDefinition) {
        definition.rules.push(Rule::CriticalCap {
            category: Category::Education,
            min_score: 30.0,
            ceiling: 70.0,
        });
        assert!(matches!(
            Profile::new(definition),
            Err(ProfileError::UntrackedRuleCategory { .. })
        ));
    }

    #[rstest]
    fn rejects_ceiling_above_hundred(mut definition: ProfileDefinition) {
        definition.rules.push(Rule::CriticalCap {
            category: Category::Shops,
            min_score: 30.0,
            ceiling: 120.0,
        });
        assert!(matches!(
            Profile::new(definition),
            Err(ProfileError::InvalidRuleBound { value, .. }) if value == 120.0
        ));
    }

    #[rstest]
    fn rejects_negative_sensitivity(mut definition: ProfileDefinition) {
        definition.noise_sensitivity = -1.0;
        assert!(matches!(
            Profile::new(definition),
            Err(ProfileError::InvalidSensitivity { .. })
        ));
    }

    #[rstest]
    fn radius_overrides_skip_untracked(definition: ProfileDefinition) {
        let profile = Profile::new(definition).expect("valid profile");
        let overrides = BTreeMap::from([(Category::Shops, 400.0), (Category::Finance, 300.0)]);
        let narrowed = profile
            .with_radius_overrides(&overrides)
            .expect("valid overrides");
        assert_eq!(narrowed.radius(Category::Shops), Some(400.0));
        assert_eq!(narrowed.radius(Category::Finance), None);
        assert_eq!(profile.radius(Category::Shops), Some(800.0));
    }

    #[rstest]
    fn custom_fills_default_radius() {
        let weights = BTreeMap::from([(Category::Health, 1.0)]);
        let profile = Profile::custom(weights, BTreeMap::new()).expect("valid custom profile");
        assert_eq!(profile.radius(Category::Health), Some(DEFAULT_CUSTOM_RADIUS_M));
        assert_eq!(profile.key(), CUSTOM_PROFILE_KEY);
    }

    #[rstest]
    fn decay_mode_defaults_per_category(definition: ProfileDefinition) {
        let profile = Profile::new(definition).expect("valid profile");
        assert_eq!(profile.decay_mode(Category::Shops), DecayMode::Daily);
    }

    #[rstest]
    fn deserialisation_validates() {
        let json = r#"{"key":"bad","name":"Bad","weights":{"shops":0.2},"radii":{"shops":500}}"#;
        let err = serde_json::from_str::<Profile>(json).expect_err("weights must sum to one");
        assert!(err.to_string().contains("weights sum to"));
    }
}
