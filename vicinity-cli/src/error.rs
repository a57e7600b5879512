//! Error types emitted by the Vicinity CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;
use vicinity_core::ProfileError;
use vicinity_fs::JsonFileError;
use vicinity_report::{AnalysisError, RescoreError};

/// Errors emitted by the Vicinity CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A named profile and a custom weights file were both supplied.
    #[error("--{named} and --{custom} cannot be combined")]
    ConflictingProfiles {
        named: &'static str,
        custom: &'static str,
    },
    /// A coordinate lies outside its valid range.
    #[error("{field} {value} is out of range")]
    InvalidCoordinate { field: &'static str, value: f64 },
    /// A radius override is not of the form `category=metres`.
    #[error("invalid radius override {value:?}: {reason}")]
    InvalidRadiusOverride { value: String, reason: String },
    /// A referenced input path does not exist on disk or is not a file.
    #[error("{field} path {path:?} does not exist or is not a file")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The recorded POI fetch could not be loaded.
    #[error("failed to load POI fetch: {0}")]
    LoadFetch(#[source] JsonFileError),
    /// The additional profiles file could not be loaded.
    #[error("failed to load profiles: {0}")]
    LoadProfiles(#[source] JsonFileError),
    /// A profile in the additional profiles file failed validation.
    #[error("profile in {path:?} is invalid: {source}")]
    InvalidProfile {
        path: Utf8PathBuf,
        #[source]
        source: ProfileError,
    },
    /// The custom weights file could not be loaded.
    #[error("failed to load custom weights: {0}")]
    LoadCustomWeights(#[source] JsonFileError),
    /// Building the profile registry failed.
    #[error(transparent)]
    Profiles(#[from] ProfileError),
    /// The stored report could not be locked for update.
    #[error("failed to lock report {path:?}: {source}")]
    LockReport {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The stored report could not be loaded.
    #[error("failed to load report: {0}")]
    LoadReport(#[source] JsonFileError),
    /// The report could not be saved.
    #[error("failed to save report: {0}")]
    SaveReport(#[source] JsonFileError),
    /// The analysis failed.
    #[error("analysis failed: {0}")]
    Analysis(#[from] AnalysisError),
    /// The rescore was refused or failed.
    #[error("rescore failed: {0}")]
    Rescore(#[from] RescoreError),
    /// Serialising command output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
