//! Focused unit tests covering profile loading and the profiles command.

use super::helpers::{Scratch, write_utf8};
use super::*;
use rstest::rstest;
use serde_json::Value;
use vicinity_core::{Category, ProfileError, ProfileRequest};

use crate::profiles::{ProfileChoice, ProfilesArgs, load_registry, run_profiles_with};

const STUDENT: &[u8] = br#"[
  {
    "key": "student",
    "name": "Student Budget",
    "weights": { "education": 0.5, "food": 0.3, "transport": 0.2 },
    "radii": { "education": 1500, "food": 600, "transport": 500 }
  }
]"#;

#[rstest]
fn builtin_catalogue_loads_without_extra_file() {
    let registry = load_registry(None).expect("built-in profiles are valid");
    assert_eq!(registry.len(), 7);
    assert!(registry.get("family").is_ok());
}

#[rstest]
fn extra_profiles_join_the_catalogue() {
    let scratch = Scratch::new();
    let path = scratch.path("profiles.json");
    write_utf8(&path, STUDENT);

    let registry = load_registry(Some(&path)).expect("profiles load");
    assert_eq!(registry.len(), 8);
    let student = registry.get("student").expect("student registered");
    assert_eq!(student.radius(Category::Education), Some(1_500.0));
}

#[rstest]
#[case::weights_do_not_sum(
    br#"[{ "key": "half", "name": "Half", "weights": { "food": 0.5 }, "radii": { "food": 500 } }]"#
)]
#[case::reserved_key(
    br#"[{ "key": "custom", "name": "Mine", "weights": { "food": 1.0 }, "radii": { "food": 500 } }]"#
)]
fn invalid_extra_profiles_name_the_file(#[case] contents: &[u8]) {
    let scratch = Scratch::new();
    let path = scratch.path("profiles.json");
    write_utf8(&path, contents);

    match load_registry(Some(&path)) {
        Err(CliError::InvalidProfile { path: reported, source }) => {
            assert_eq!(reported, path);
            assert!(matches!(
                source,
                ProfileError::WeightSum { .. } | ProfileError::ReservedKey { .. }
            ));
        }
        other => panic!("expected InvalidProfile, found {other:?}"),
    }
}

#[rstest]
fn custom_weights_file_becomes_a_custom_request() {
    let scratch = Scratch::new();
    let path = scratch.path("weights.json");
    write_utf8(&path, br#"{ "weights": { "shops": 0.6, "transport": 0.4 } }"#);

    let request = ProfileChoice::Custom(path)
        .into_request()
        .expect("weights load");
    match request {
        ProfileRequest::Custom { weights, radii } => {
            assert_eq!(weights.get(&Category::Shops), Some(&0.6));
            assert!(radii.is_empty());
        }
        other => panic!("expected a custom request, found {other:?}"),
    }
}

#[rstest]
fn missing_custom_weights_file_is_reported() {
    let scratch = Scratch::new();
    let choice = ProfileChoice::Custom(scratch.path("absent.json"));
    match choice.into_request() {
        Err(CliError::LoadCustomWeights(vicinity_fs::JsonFileError::Open { .. })) => {}
        other => panic!("expected LoadCustomWeights, found {other:?}"),
    }
}

#[rstest]
fn profiles_command_lists_every_profile() {
    let scratch = Scratch::new();
    let path = scratch.path("profiles.json");
    write_utf8(&path, STUDENT);
    let args = ProfilesArgs {
        profiles_file: Some(path),
    };

    let mut stdout = Vec::new();
    run_profiles_with(args, &mut stdout).expect("profiles listed");

    let listed: Value = serde_json::from_slice(&stdout).expect("output should be JSON");
    let keys: Vec<&str> = listed
        .as_array()
        .expect("a JSON array")
        .iter()
        .filter_map(|profile| profile.get("key").and_then(Value::as_str))
        .collect();
    assert_eq!(keys.len(), 8);
    assert!(keys.contains(&"student"));
    assert!(keys.contains(&"investor"));
}
