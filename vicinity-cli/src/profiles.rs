//! Profile catalogue loading and the `profiles` command.

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use vicinity_core::{Category, Profile, ProfileDefinition, ProfileRegistry, ProfileRequest};
use vicinity_fs::read_json;

use crate::{ARG_CUSTOM_WEIGHTS, ARG_PROFILE, ARG_PROFILES_FILE, CliError, write_output};

/// CLI arguments for the `profiles` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "List the built-in profiles and any loaded from a file")]
#[ortho_config(prefix = "VICINITY")]
pub(crate) struct ProfilesArgs {
    /// JSON file holding additional profile definitions.
    #[arg(long = ARG_PROFILES_FILE, value_name = "path")]
    #[serde(default)]
    pub(crate) profiles_file: Option<Utf8PathBuf>,
}

/// How the profile to score with was chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ProfileChoice {
    /// A registered profile key.
    Named(String),
    /// A JSON file with custom weights and optional radii.
    Custom(Utf8PathBuf),
}

impl ProfileChoice {
    /// Pick between a named profile and a custom weights file.
    pub(crate) fn from_options(
        named: Option<String>,
        custom: Option<Utf8PathBuf>,
    ) -> Result<Option<Self>, CliError> {
        match (named, custom) {
            (Some(_), Some(_)) => Err(CliError::ConflictingProfiles {
                named: ARG_PROFILE,
                custom: ARG_CUSTOM_WEIGHTS,
            }),
            (Some(key), None) => Ok(Some(Self::Named(key))),
            (None, Some(path)) => Ok(Some(Self::Custom(path))),
            (None, None) => Ok(None),
        }
    }

    /// Turn the choice into a registry request, reading custom weights.
    pub(crate) fn into_request(self) -> Result<ProfileRequest, CliError> {
        match self {
            Self::Named(key) => Ok(ProfileRequest::Named { key }),
            Self::Custom(path) => {
                let custom: CustomWeights =
                    read_json(&path).map_err(CliError::LoadCustomWeights)?;
                Ok(ProfileRequest::Custom {
                    weights: custom.weights,
                    radii: custom.radii,
                })
            }
        }
    }
}

/// Contents of a custom weights file.
#[derive(Debug, Clone, Deserialize)]
struct CustomWeights {
    weights: BTreeMap<Category, f64>,
    #[serde(default)]
    radii: BTreeMap<Category, f64>,
}

/// Built-in profiles plus those defined in `extra`.
///
/// Definitions in `extra` replace built-in profiles with the same key.
pub(crate) fn load_registry(extra: Option<&Utf8Path>) -> Result<ProfileRegistry, CliError> {
    let mut registry = ProfileRegistry::builtin()?;
    let Some(path) = extra else {
        return Ok(registry);
    };
    let definitions: Vec<ProfileDefinition> =
        read_json(path).map_err(CliError::LoadProfiles)?;
    let loaded = definitions.len();
    for definition in definitions {
        Profile::new(definition)
            .and_then(|profile| registry.register(profile))
            .map_err(|source| CliError::InvalidProfile {
                path: path.to_path_buf(),
                source,
            })?;
    }
    info!("loaded {loaded} profile(s) from {path}");
    Ok(registry)
}

pub(super) fn run_profiles(args: ProfilesArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_profiles_with(args, &mut stdout)
}

pub(super) fn run_profiles_with(
    args: ProfilesArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let registry = load_registry(merged.profiles_file.as_deref())?;
    let profiles: Vec<&Profile> = registry.iter().map(Arc::as_ref).collect();
    write_output(writer, &profiles)
}
