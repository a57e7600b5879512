//! Command-line interface for the Vicinity location-scoring engine.
//!
//! `analyse` scores a recorded POI fetch and stores the report, `rescore`
//! re-evaluates a stored report under another profile, and `profiles`
//! lists the profile catalogue. Options layer from configuration files,
//! `VICINITY_*` environment variables, and flags.
#![forbid(unsafe_code)]

use std::io::Write;

use camino::Utf8Path;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use vicinity_core::VerdictLevel;
use vicinity_report::Report;

mod analyse;
mod error;
mod profiles;
mod provider;
mod rescore;

pub use error::CliError;

use analyse::{AnalyseArgs, run_analyse};
use profiles::{ProfilesArgs, run_profiles};
use rescore::{RescoreArgs, run_rescore};

const ARG_ANALYSE_FETCH: &str = "fetch";
const ARG_LATITUDE: &str = "lat";
const ARG_LONGITUDE: &str = "lon";
const ARG_PROFILE: &str = "profile";
const ARG_CUSTOM_WEIGHTS: &str = "custom-weights";
const ARG_PROFILES_FILE: &str = "profiles-file";
const ARG_RADIUS: &str = "radius";
const ARG_REPORT_ID: &str = "id";
const ARG_RESCORE_LIMIT: &str = "rescore-limit";
const ARG_OUTPUT: &str = "output";
const ARG_RESCORE_REPORT: &str = "report";
const ENV_ANALYSE_FETCH: &str = "VICINITY_CMDS_ANALYSE_FETCH_PATH";
const ENV_LATITUDE: &str = "VICINITY_CMDS_ANALYSE_LAT";
const ENV_LONGITUDE: &str = "VICINITY_CMDS_ANALYSE_LON";
const ENV_RESCORE_REPORT: &str = "VICINITY_CMDS_RESCORE_REPORT_PATH";
const ENV_RESCORE_PROFILE: &str = "VICINITY_CMDS_RESCORE_PROFILE";

/// Profile scored when neither a named profile nor custom weights are given.
const DEFAULT_PROFILE: &str = "family";

/// Run the Vicinity CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when arguments or configuration are invalid, an
/// input cannot be read, the analysis or rescore fails, or output cannot be
/// written.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse()?;
    match cli.command {
        Command::Analyse(args) => run_analyse(args),
        Command::Rescore(args) => run_rescore(args),
        Command::Profiles(args) => run_profiles(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "vicinity",
    about = "Score locations against living profiles and explain the verdict",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Score a recorded POI fetch and build a report.
    Analyse(AnalyseArgs),
    /// Re-evaluate a stored report under a different profile.
    Rescore(RescoreArgs),
    /// List the available profiles.
    Profiles(ProfilesArgs),
}

/// Condensed view of a report printed after it has been saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct ReportSummary {
    pub(crate) id: String,
    pub(crate) profile: String,
    pub(crate) total_score: f64,
    pub(crate) verdict: VerdictLevel,
    pub(crate) confidence: u8,
    pub(crate) rescore_count: u32,
    pub(crate) rescore_limit: u32,
}

impl From<&Report> for ReportSummary {
    fn from(report: &Report) -> Self {
        let rescore = report.rescore_state();
        Self {
            id: report.id().to_owned(),
            profile: report.profile().key().to_owned(),
            total_score: report.scoring().total_score,
            verdict: report.verdict().level,
            confidence: report.verdict().confidence,
            rescore_count: rescore.count,
            rescore_limit: rescore.limit,
        }
    }
}

/// Check that `path` names an existing regular file.
fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match vicinity_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn write_output<T: Serialize + ?Sized>(writer: &mut dyn Write, value: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
mod tests;
