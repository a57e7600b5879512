//! Rescore command implementation for the Vicinity CLI.
//!
//! The report file carries its own rescore budget, so the limit holds
//! across invocations. Each rescore holds the report's document lock from
//! the read to the write, so concurrent invocations cannot both spend the
//! last rescore. A refused rescore leaves the file untouched.

use std::io::Write;
use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use vicinity_fs::{lock_document, read_json, write_json};
use vicinity_report::{Report, RescoreController};

use crate::profiles::{ProfileChoice, load_registry};
use crate::{
    ARG_CUSTOM_WEIGHTS, ARG_OUTPUT, ARG_PROFILE, ARG_PROFILES_FILE, ARG_RESCORE_REPORT, CliError,
    ENV_RESCORE_PROFILE, ENV_RESCORE_REPORT, ReportSummary, require_existing, write_output,
};

/// CLI arguments for the `rescore` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Recompute a saved report for another profile using the POI \
                 data it already holds. Each report allows a limited number \
                 of rescores; the updated report is written back in place \
                 unless --output names another file.",
    about = "Rescore a saved report under a different profile"
)]
#[ortho_config(prefix = "VICINITY")]
pub(crate) struct RescoreArgs {
    /// Path to a report written by `analyse --output`.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) report_path: Option<Utf8PathBuf>,
    /// Registered profile to rescore with.
    #[arg(long = ARG_PROFILE, value_name = "key")]
    #[serde(default)]
    pub(crate) profile: Option<String>,
    /// JSON file with custom `weights` and optional `radii`.
    #[arg(long = ARG_CUSTOM_WEIGHTS, value_name = "path")]
    #[serde(default)]
    pub(crate) custom_weights: Option<Utf8PathBuf>,
    /// JSON file holding additional profile definitions.
    #[arg(long = ARG_PROFILES_FILE, value_name = "path")]
    #[serde(default)]
    pub(crate) profiles_file: Option<Utf8PathBuf>,
    /// Write the updated report here instead of replacing the input.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
}

impl RescoreArgs {
    pub(crate) fn into_config(self) -> Result<RescoreConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RescoreConfig::try_from(merged)
    }
}

/// Resolved `rescore` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RescoreConfig {
    pub(crate) report_path: Utf8PathBuf,
    pub(crate) profile: ProfileChoice,
    pub(crate) profiles_file: Option<Utf8PathBuf>,
    pub(crate) output: Utf8PathBuf,
}

impl RescoreConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.report_path, ARG_RESCORE_REPORT)?;
        if let ProfileChoice::Custom(path) = &self.profile {
            require_existing(path, ARG_CUSTOM_WEIGHTS)?;
        }
        if let Some(path) = &self.profiles_file {
            require_existing(path, ARG_PROFILES_FILE)?;
        }
        Ok(())
    }
}

impl TryFrom<RescoreArgs> for RescoreConfig {
    type Error = CliError;

    fn try_from(args: RescoreArgs) -> Result<Self, Self::Error> {
        let report_path = args.report_path.ok_or(CliError::MissingArgument {
            field: ARG_RESCORE_REPORT,
            env: ENV_RESCORE_REPORT,
        })?;
        let profile = ProfileChoice::from_options(args.profile, args.custom_weights)?.ok_or(
            CliError::MissingArgument {
                field: ARG_PROFILE,
                env: ENV_RESCORE_PROFILE,
            },
        )?;
        let output = args.output.unwrap_or_else(|| report_path.clone());
        Ok(Self {
            report_path,
            profile,
            profiles_file: args.profiles_file,
            output,
        })
    }
}

pub(super) fn run_rescore(args: RescoreArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_rescore_with(args, &mut stdout)
}

pub(super) fn run_rescore_with(args: RescoreArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    execute_rescore(config, writer)
}

pub(super) fn execute_rescore(
    config: RescoreConfig,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let registry = Arc::new(load_registry(config.profiles_file.as_deref())?);
    let request = config.profile.into_request()?;

    let lock = lock_document(&config.report_path).map_err(|source| CliError::LockReport {
        path: config.report_path.clone(),
        source,
    })?;
    let mut report: Report = read_json(&config.report_path).map_err(CliError::LoadReport)?;
    RescoreController::new(registry).rescore(&mut report, &request)?;
    write_json(&config.output, &report).map_err(CliError::SaveReport)?;
    drop(lock);
    write_output(writer, &ReportSummary::from(&report))
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<RescoreConfig, CliError> {
    let merged = RescoreArgs::merge_from_layers(layers).map_err(CliError::from)?;
    RescoreConfig::try_from(merged)
}
