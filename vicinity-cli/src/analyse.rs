//! Analyse command implementation for the Vicinity CLI.

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::Parser;
use geo::Coord;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use vicinity_core::Category;
use vicinity_report::{AnalysisRequest, Analyzer, DEFAULT_RESCORE_LIMIT};
use vicinity_fs::write_json;

use crate::profiles::{ProfileChoice, load_registry};
use crate::provider::RecordedProvider;
use crate::{
    ARG_ANALYSE_FETCH, ARG_CUSTOM_WEIGHTS, ARG_LATITUDE, ARG_LONGITUDE, ARG_OUTPUT, ARG_PROFILE,
    ARG_PROFILES_FILE, ARG_RADIUS, ARG_REPORT_ID, ARG_RESCORE_LIMIT, CliError, DEFAULT_PROFILE,
    ENV_ANALYSE_FETCH, ENV_LATITUDE, ENV_LONGITUDE, ReportSummary, require_existing, write_output,
};

/// CLI arguments for the `analyse` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Score the surroundings of a point from a recorded POI fetch \
                 (a JSON FetchOutcome with snapshots, noise sources, and the \
                 provider trace). The report is printed, or saved with \
                 --output so it can be rescored later.",
    about = "Score a location and build a report"
)]
#[ortho_config(prefix = "VICINITY")]
pub(crate) struct AnalyseArgs {
    /// Path to the recorded POI fetch.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) fetch_path: Option<Utf8PathBuf>,
    /// Latitude of the analysed point.
    #[arg(long = ARG_LATITUDE, value_name = "degrees", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) lat: Option<f64>,
    /// Longitude of the analysed point.
    #[arg(long = ARG_LONGITUDE, value_name = "degrees", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) lon: Option<f64>,
    /// Registered profile to score with (defaults to `family`).
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
    /// Radius override as `category=metres`; repeatable.
    #[arg(long = ARG_RADIUS, value_name = "category=metres")]
    #[serde(default)]
    pub(crate) radius: Option<Vec<String>>,
    /// Report identifier (defaults to the fetch file stem).
    #[arg(long = ARG_REPORT_ID, value_name = "id")]
    #[serde(default)]
    pub(crate) id: Option<String>,
    /// Rescores allowed on the new report.
    #[arg(long = ARG_RESCORE_LIMIT, value_name = "count")]
    #[serde(default)]
    pub(crate) rescore_limit: Option<u32>,
    /// Save the report here and print a summary instead.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
}

impl AnalyseArgs {
    pub(crate) fn into_config(self) -> Result<AnalyseConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        AnalyseConfig::try_from(merged)
    }
}

/// Resolved `analyse` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AnalyseConfig {
    /// Recorded POI fetch.
    pub(crate) fetch_path: Utf8PathBuf,
    /// Analysed point, `x = longitude`, `y = latitude`.
    pub(crate) subject: Coord<f64>,
    /// Profile to score with.
    pub(crate) profile: ProfileChoice,
    /// Additional profile definitions.
    pub(crate) profiles_file: Option<Utf8PathBuf>,
    /// Radius overrides by category.
    pub(crate) radius_overrides: BTreeMap<Category, f64>,
    /// Identifier given to the report.
    pub(crate) report_id: String,
    /// Rescore budget of the report.
    pub(crate) rescore_limit: u32,
    /// Where to save the report.
    pub(crate) output: Option<Utf8PathBuf>,
}

impl AnalyseConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.fetch_path, ARG_ANALYSE_FETCH)?;
        if let ProfileChoice::Custom(path) = &self.profile {
            require_existing(path, ARG_CUSTOM_WEIGHTS)?;
        }
        if let Some(path) = &self.profiles_file {
            require_existing(path, ARG_PROFILES_FILE)?;
        }
        Ok(())
    }
}

impl TryFrom<AnalyseArgs> for AnalyseConfig {
    type Error = CliError;

    fn try_from(args: AnalyseArgs) -> Result<Self, Self::Error> {
        let fetch_path = args.fetch_path.ok_or(CliError::MissingArgument {
            field: ARG_ANALYSE_FETCH,
            env: ENV_ANALYSE_FETCH,
        })?;
        let lat = args.lat.ok_or(CliError::MissingArgument {
            field: ARG_LATITUDE,
            env: ENV_LATITUDE,
        })?;
        let lon = args.lon.ok_or(CliError::MissingArgument {
            field: ARG_LONGITUDE,
            env: ENV_LONGITUDE,
        })?;
        let subject = subject(lat, lon)?;

        let profile = ProfileChoice::from_options(args.profile, args.custom_weights)?
            .unwrap_or_else(|| ProfileChoice::Named(DEFAULT_PROFILE.to_owned()));
        let radius_overrides = args
            .radius
            .unwrap_or_default()
            .iter()
            .map(|entry| parse_radius_override(entry))
            .collect::<Result<_, _>>()?;
        let report_id = match args.id {
            Some(id) => id,
            None => fetch_path.file_stem().unwrap_or("report").to_owned(),
        };

        Ok(Self {
            fetch_path,
            subject,
            profile,
            profiles_file: args.profiles_file,
            radius_overrides,
            report_id,
            rescore_limit: args.rescore_limit.unwrap_or(DEFAULT_RESCORE_LIMIT),
            output: args.output,
        })
    }
}

fn subject(lat: f64, lon: f64) -> Result<Coord<f64>, CliError> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(CliError::InvalidCoordinate {
            field: ARG_LATITUDE,
            value: lat,
        });
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(CliError::InvalidCoordinate {
            field: ARG_LONGITUDE,
            value: lon,
        });
    }
    Ok(Coord { x: lon, y: lat })
}

/// Parse `category=metres`.
pub(crate) fn parse_radius_override(entry: &str) -> Result<(Category, f64), CliError> {
    let invalid = |reason: String| CliError::InvalidRadiusOverride {
        value: entry.to_owned(),
        reason,
    };
    let (category, metres) = entry
        .split_once('=')
        .ok_or_else(|| invalid("expected category=metres".to_owned()))?;
    let parsed_category = category.trim().parse::<Category>().map_err(invalid)?;
    let radius = metres
        .trim()
        .parse::<f64>()
        .map_err(|err| invalid(err.to_string()))?;
    Ok((parsed_category, radius))
}

pub(super) fn run_analyse(args: AnalyseArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_analyse_with(args, &mut stdout)
}

pub(super) fn run_analyse_with(args: AnalyseArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    execute_analyse(config, writer)
}

pub(super) fn execute_analyse(
    config: AnalyseConfig,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let registry = Arc::new(load_registry(config.profiles_file.as_deref())?);
    let provider = RecordedProvider::load(&config.fetch_path)?;
    let mut request = AnalysisRequest::new(
        config.report_id,
        config.subject,
        config.profile.into_request()?,
    );
    request.radius_overrides = config.radius_overrides;

    let report = Analyzer::new(provider, registry)
        .with_rescore_limit(config.rescore_limit)
        .analyse(&request)?;
    match config.output {
        Some(path) => {
            write_json(&path, &report).map_err(CliError::SaveReport)?;
            write_output(writer, &ReportSummary::from(&report))
        }
        None => write_output(writer, &report),
    }
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<AnalyseConfig, CliError> {
    let merged = AnalyseArgs::merge_from_layers(layers).map_err(CliError::from)?;
    AnalyseConfig::try_from(merged)
}
