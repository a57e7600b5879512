//! Errors raised while building or rescoring a report.

use thiserror::Error;
use vicinity_core::{ProfileError, ProviderError, SnapshotError};
use vicinity_scorer::ScoreError;

/// Errors returned by [`Analyzer::analyse`](crate::Analyzer::analyse).
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The requested profile could not be resolved.
    #[error("failed to resolve profile")]
    Profile(#[from] ProfileError),
    /// The POI provider failed outright.
    #[error("POI provider failed")]
    Provider(#[from] ProviderError),
    /// A fetched snapshot could not be narrowed to the profile radius.
    #[error("invalid snapshot from provider")]
    Snapshot(#[from] SnapshotError),
    /// The fetched data could not be scored.
    #[error("failed to score location")]
    Score(#[from] ScoreError),
}

/// Errors returned by [`RescoreController`](crate::RescoreController).
///
/// A failed rescore never consumes the report's budget.
#[derive(Debug, Error)]
pub enum RescoreError {
    /// The report has used its whole rescore budget.
    #[error("rescore limit reached ({count}/{limit})")]
    LimitExceeded {
        /// Rescores already performed.
        count: u32,
        /// Rescores allowed for the report.
        limit: u32,
    },
    /// The report is already scored for the requested profile.
    #[error("report already uses profile '{key}'")]
    SameProfile {
        /// Key of the current profile.
        key: String,
    },
    /// The report holds no POI snapshots to rescore.
    #[error("report {id} holds no POI data to rescore")]
    DataMissing {
        /// Identifier of the report.
        id: String,
    },
    /// The requested profile could not be resolved.
    #[error("failed to resolve profile")]
    Profile(#[from] ProfileError),
    /// A stored snapshot could not be narrowed to the new profile radius.
    #[error("invalid stored snapshot")]
    Snapshot(#[from] SnapshotError),
    /// The stored data could not be scored.
    #[error("failed to score location")]
    Score(#[from] ScoreError),
    /// A thread panicked while holding the shared report.
    #[error("shared report lock was poisoned")]
    Poisoned,
}
