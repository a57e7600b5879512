//! Invariants every built-in profile must satisfy.

use rstest::{fixture, rstest};
use vicinity_core::{Category, ProfileRegistry, Rule, WEIGHT_SUM_TOLERANCE};

#[fixture]
fn registry() -> ProfileRegistry {
    ProfileRegistry::builtin().expect("built-in profiles are valid")
}

#[rstest]
#[case("urban")]
#[case("family")]
#[case("quiet_green")]
#[case("remote_work")]
#[case("active_sport")]
#[case("car_first")]
#[case("investor")]
fn weights_sum_to_one(registry: ProfileRegistry, #[case] key: &str) {
    let profile = registry.get(key).expect("registered profile");
    let sum: f64 = profile.weights().values().sum();
    assert!((sum - 1.0).abs() <= WEIGHT_SUM_TOLERANCE, "{key} sums to {sum}");
    assert!(profile.weight(Category::Quiet).is_none());
}

#[rstest]
#[case("urban", Category::Transport)]
#[case("family", Category::Education)]
#[case("quiet_green", Category::Quiet)]
#[case("remote_work", Category::Quiet)]
#[case("car_first", Category::CarAccess)]
#[case("investor", Category::Transport)]
fn dealbreakers_guard_the_key_category(
    registry: ProfileRegistry,
    #[case] key: &str,
    #[case] category: Category,
) {
    let profile = registry.get(key).expect("registered profile");
    assert!(
        profile
            .rules()
            .iter()
            .any(|rule| matches!(rule, Rule::Dealbreaker { category: c, .. } if *c == category))
    );
}

#[rstest]
fn active_sport_has_no_rules(registry: ProfileRegistry) {
    let profile = registry.get("active_sport").expect("registered profile");
    assert!(profile.rules().is_empty());
}

#[rstest]
fn family_caps_car_access(registry: ProfileRegistry) {
    let profile = registry.get("family").expect("registered profile");
    assert!(profile.rules().contains(&Rule::CriticalCap {
        category: Category::CarAccess,
        min_score: 35.0,
        ceiling: 70.0,
    }));
}

#[rstest]
fn profiles_serialise_and_reload(registry: ProfileRegistry) {
    for profile in registry.iter() {
        let json = serde_json::to_string(profile.as_ref()).expect("serialise profile");
        let reloaded: vicinity_core::Profile = serde_json::from_str(&json).expect("reload");
        assert_eq!(&reloaded, profile.as_ref());
    }
}
