//! Keyed store of validated profiles plus the built-in catalogue.
//!
//! The registry is read-only once built and is shared between threads
//! behind `Arc`. Profiles loaded from files are validated before they are
//! registered, so lookups never return a profile that could fail at scoring
//! time.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    CUSTOM_PROFILE_KEY, Category, Profile, ProfileDefinition, ProfileError, Rule,
    VerdictThresholds,
};

/// How a caller selects the profile to score with.
///
/// # Examples
/// ```
/// use vicinity_core::ProfileRequest;
///
/// let request: ProfileRequest = serde_json::from_str(r#"{"type":"named","key":"urban"}"#)
///     .expect("valid request");
/// assert_eq!(request.key(), "urban");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProfileRequest {
    /// A registered profile.
    Named {
        /// Registry key.
        key: String,
    },
    /// Weights and radii supplied with the request.
    Custom {
        /// Category weights summing to one.
        weights: BTreeMap<Category, f64>,
        /// Optional radii; missing entries use the default custom radius.
        #[serde(default)]
        radii: BTreeMap<Category, f64>,
    },
}

impl ProfileRequest {
    /// Request a registered profile by key.
    pub fn named(key: impl Into<String>) -> Self {
        Self::Named { key: key.into() }
    }

    /// Key of the requested profile.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Named { key } => key,
            Self::Custom { .. } => CUSTOM_PROFILE_KEY,
        }
    }
}

/// Validated profiles keyed by name.
#[derive(Debug, Clone, Default)]
pub struct ProfileRegistry {
    profiles: BTreeMap<String, Arc<Profile>>,
}

impl ProfileRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the seven built-in profiles.
    ///
    /// # Examples
    /// ```
    /// use vicinity_core::ProfileRegistry;
    ///
    /// let registry = ProfileRegistry::builtin().expect("built-in profiles are valid");
    /// assert!(registry.get("family").is_ok());
    /// assert!(registry.get("nomad").is_err());
    /// ```
    pub fn builtin() -> Result<Self, ProfileError> {
        let mut registry = Self::new();
        for definition in builtin_definitions() {
            registry.register(Profile::new(definition)?)?;
        }
        Ok(registry)
    }

    /// Add or replace a profile.
    ///
    /// The `custom` key is reserved and rejected.
    pub fn register(&mut self, profile: Profile) -> Result<(), ProfileError> {
        if profile.is_custom() {
            return Err(ProfileError::ReservedKey {
                key: CUSTOM_PROFILE_KEY.to_owned(),
            });
        }
        let key = profile.key().to_owned();
        if self.profiles.insert(key.clone(), Arc::new(profile)).is_some() {
            debug!("profile '{key}' replaced an earlier definition");
        }
        Ok(())
    }

    /// Look up a registered profile.
    pub fn get(&self, key: &str) -> Result<Arc<Profile>, ProfileError> {
        self.profiles
            .get(key)
            .cloned()
            .ok_or_else(|| ProfileError::Unknown { key: key.to_owned() })
    }

    /// Resolve a request into a validated profile.
    pub fn resolve(&self, request: &ProfileRequest) -> Result<Arc<Profile>, ProfileError> {
        match request {
            ProfileRequest::Named { key } => self.get(key),
            ProfileRequest::Custom { weights, radii } => {
                Ok(Arc::new(Profile::custom(weights.clone(), radii.clone())?))
            }
        }
    }

    /// Registered profiles ordered by key.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Profile>> {
        self.profiles.values()
    }

    /// Number of registered profiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Report whether no profile is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

struct Seed {
    key: &'static str,
    name: &'static str,
    description: &'static str,
    /// `(category, weight, radius_m)`
    categories: &'static [(Category, f64, f64)],
    noise_sensitivity: f64,
    thresholds: VerdictThresholds,
    rules: &'static [Rule],
}

impl Seed {
    fn into_definition(self) -> ProfileDefinition {
        ProfileDefinition {
            key: self.key.to_owned(),
            name: self.name.to_owned(),
            description: self.description.to_owned(),
            weights: self.categories.iter().map(|(c, w, _)| (*c, *w)).collect(),
            radii: self.categories.iter().map(|(c, _, r)| (*c, *r)).collect(),
            decay_modes: BTreeMap::new(),
            noise_sensitivity: self.noise_sensitivity,
            thresholds: self.thresholds,
            rules: self.rules.to_vec(),
            version: 1,
        }
    }
}

const LIVING: VerdictThresholds = VerdictThresholds {
    recommended: 65.0,
    conditional: 45.0,
};

const INVESTING: VerdictThresholds = VerdictThresholds {
    recommended: 60.0,
    conditional: 40.0,
};

fn builtin_definitions() -> Vec<ProfileDefinition> {
    use Category::{
        CarAccess, Education, Finance, Food, Health, Leisure, NatureBackground, NaturePlace,
        Quiet, Shops, Transport,
    };

    let seeds = [
        Seed {
            key: "urban",
            name: "City Life",
            description: "Everything on foot; transport and food are critical",
            categories: &[
                (Transport, 0.26, 700.0),
                (Food, 0.19, 800.0),
                (Shops, 0.17, 600.0),
                (Leisure, 0.13, 800.0),
                (Health, 0.08, 1_200.0),
                (NaturePlace, 0.06, 900.0),
                (Finance, 0.05, 800.0),
                (NatureBackground, 0.03, 450.0),
                (Education, 0.03, 900.0),
            ],
            noise_sensitivity: 1.1,
            thresholds: LIVING,
            rules: &[
                Rule::CriticalCap {
                    category: Transport,
                    min_score: 35.0,
                    ceiling: 65.0,
                },
                Rule::CriticalCap {
                    category: Food,
                    min_score: 25.0,
                    ceiling: 75.0,
                },
                Rule::Dealbreaker {
                    category: Transport,
                    threshold: 10.0,
                },
            ],
        },
        Seed {
            key: "family",
            name: "Family with Children",
            description: "Schools, health care, and a park come first",
            categories: &[
                (Education, 0.24, 1_200.0),
                (Health, 0.15, 1_500.0),
                (NaturePlace, 0.15, 900.0),
                (Shops, 0.14, 700.0),
                (Transport, 0.10, 900.0),
                (Leisure, 0.08, 700.0),
                (NatureBackground, 0.06, 450.0),
                (CarAccess, 0.04, 1_200.0),
                (Food, 0.02, 700.0),
                (Finance, 0.02, 900.0),
            ],
            noise_sensitivity: 1.3,
            thresholds: LIVING,
            rules: &[
                Rule::CriticalCap {
                    category: Education,
                    min_score: 35.0,
                    ceiling: 70.0,
                },
                Rule::CriticalCap {
                    category: NaturePlace,
                    min_score: 30.0,
                    ceiling: 75.0,
                },
                Rule::CriticalCap {
                    category: CarAccess,
                    min_score: 35.0,
                    ceiling: 70.0,
                },
                Rule::Dealbreaker {
                    category: Education,
                    threshold: 10.0,
                },
            ],
        },
        Seed {
            key: "quiet_green",
            name: "Quiet and Green",
            description: "Silence and greenery over services",
            categories: &[
                (NaturePlace, 0.24, 1_200.0),
                (NatureBackground, 0.22, 500.0),
                (Shops, 0.13, 900.0),
                (Health, 0.10, 2_000.0),
                (Leisure, 0.10, 1_200.0),
                (Transport, 0.08, 1_200.0),
                (Food, 0.05, 1_200.0),
                (Education, 0.05, 1_500.0),
                (Finance, 0.03, 1_000.0),
            ],
            noise_sensitivity: 2.0,
            thresholds: LIVING,
            rules: &[
                Rule::CriticalCap {
                    category: Quiet,
                    min_score: 40.0,
                    ceiling: 60.0,
                },
                Rule::CriticalCap {
                    category: NatureBackground,
                    min_score: 35.0,
                    ceiling: 75.0,
                },
                Rule::Dealbreaker {
                    category: Quiet,
                    threshold: 15.0,
                },
            ],
        },
        Seed {
            key: "remote_work",
            name: "Home Office",
            description: "Quiet days with the basics close by",
            categories: &[
                (Shops, 0.20, 700.0),
                (Health, 0.15, 1_500.0),
                (NatureBackground, 0.13, 450.0),
                (NaturePlace, 0.11, 900.0),
                (Transport, 0.11, 1_000.0),
                (Leisure, 0.11, 900.0),
                (Food, 0.09, 900.0),
                (Finance, 0.06, 800.0),
                (Education, 0.04, 1_200.0),
            ],
            noise_sensitivity: 2.0,
            thresholds: LIVING,
            rules: &[
                Rule::CriticalCap {
                    category: Quiet,
                    min_score: 45.0,
                    ceiling: 70.0,
                },
                Rule::Dealbreaker {
                    category: Quiet,
                    threshold: 20.0,
                },
            ],
        },
        Seed {
            key: "active_sport",
            name: "Active and Sporty",
            description: "Trails, greenery, and sports grounds",
            categories: &[
                (Leisure, 0.24, 1_200.0),
                (NaturePlace, 0.20, 1_200.0),
                (NatureBackground, 0.15, 500.0),
                (Shops, 0.12, 800.0),
                (Health, 0.10, 1_800.0),
                (Transport, 0.08, 1_000.0),
                (Food, 0.06, 900.0),
                (Finance, 0.05, 1_000.0),
            ],
            noise_sensitivity: 1.5,
            thresholds: LIVING,
            rules: &[],
        },
        Seed {
            key: "car_first",
            name: "Car First",
            description: "Public transport matters little; access and calm matter most",
            categories: &[
                (CarAccess, 0.20, 1_000.0),
                (Shops, 0.16, 1_200.0),
                (Health, 0.12, 2_500.0),
                (NaturePlace, 0.10, 1_500.0),
                (NatureBackground, 0.10, 600.0),
                (Leisure, 0.10, 1_500.0),
                (Education, 0.10, 2_000.0),
                (Transport, 0.06, 1_500.0),
                (Food, 0.04, 1_200.0),
                (Finance, 0.02, 1_200.0),
            ],
            noise_sensitivity: 2.0,
            thresholds: LIVING,
            rules: &[
                Rule::CriticalCap {
                    category: CarAccess,
                    min_score: 35.0,
                    ceiling: 70.0,
                },
                Rule::Dealbreaker {
                    category: CarAccess,
                    threshold: 5.0,
                },
            ],
        },
        Seed {
            key: "investor",
            name: "Investor",
            description: "Rental potential: transport, amenities, and universities",
            categories: &[
                (Transport, 0.26, 800.0),
                (Shops, 0.19, 700.0),
                (Education, 0.15, 1_500.0),
                (Food, 0.12, 900.0),
                (Health, 0.08, 1_500.0),
                (Finance, 0.08, 800.0),
                (Leisure, 0.06, 1_000.0),
                (NaturePlace, 0.04, 1_200.0),
                (NatureBackground, 0.02, 500.0),
            ],
            noise_sensitivity: 0.9,
            thresholds: INVESTING,
            rules: &[
                Rule::CriticalCap {
                    category: Transport,
                    min_score: 30.0,
                    ceiling: 65.0,
                },
                Rule::Dealbreaker {
                    category: Transport,
                    threshold: 10.0,
                },
            ],
        },
    ];
    seeds.into_iter().map(Seed::into_definition).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn registry() -> ProfileRegistry {
        ProfileRegistry::builtin().expect("built-in profiles are valid")
    }

    #[rstest]
    fn holds_seven_profiles(registry: ProfileRegistry) {
        let keys: Vec<&str> = registry.iter().map(|p| p.key()).collect();
        assert_eq!(
            keys,
            [
                "active_sport",
                "car_first",
                "family",
                "investor",
                "quiet_green",
                "remote_work",
                "urban"
            ]
        );
    }

    #[rstest]
    #[case("urban", 65.0, 45.0)]
    #[case("investor", 60.0, 40.0)]
    fn thresholds_follow_profile(
        registry: ProfileRegistry,
        #[case] key: &str,
        #[case] recommended: f64,
        #[case] conditional: f64,
    ) {
        let profile = registry.get(key).expect("registered profile");
        assert_eq!(
            profile.thresholds(),
            VerdictThresholds {
                recommended,
                conditional
            }
        );
    }

    #[rstest]
    fn quiet_green_is_most_noise_sensitive(registry: ProfileRegistry) {
        let max = registry
            .iter()
            .map(|p| p.noise_sensitivity())
            .fold(0.0_f64, f64::max);
        let quiet = registry.get("quiet_green").expect("registered profile");
        assert_eq!(quiet.noise_sensitivity(), max);
    }

    #[rstest]
    fn unknown_key_is_an_error(registry: ProfileRegistry) {
        assert_eq!(
            registry.get("nomad"),
            Err(ProfileError::Unknown {
                key: "nomad".into()
            })
        );
    }

    #[rstest]
    fn custom_key_cannot_be_registered(mut registry: ProfileRegistry) {
        let custom = Profile::custom(BTreeMap::from([(Category::Shops, 1.0)]), BTreeMap::new())
            .expect("valid custom profile");
        assert!(matches!(
            registry.register(custom),
            Err(ProfileError::ReservedKey { .. })
        ));
    }

    #[rstest]
    fn resolves_custom_requests(registry: ProfileRegistry) {
        let request = ProfileRequest::Custom {
            weights: BTreeMap::from([(Category::Food, 0.5), (Category::Leisure, 0.5)]),
            radii: BTreeMap::from([(Category::Food, 300.0)]),
        };
        let profile = registry.resolve(&request).expect("valid custom request");
        assert_eq!(profile.radius(Category::Food), Some(300.0));
        assert_eq!(profile.radius(Category::Leisure), Some(1_000.0));
    }

    #[rstest]
    fn invalid_custom_request_is_rejected(registry: ProfileRegistry) {
        let request = ProfileRequest::Custom {
            weights: BTreeMap::from([(Category::Food, 0.3)]),
            radii: BTreeMap::new(),
        };
        assert!(matches!(
            registry.resolve(&request),
            Err(ProfileError::WeightSum { .. })
        ));
    }
}
