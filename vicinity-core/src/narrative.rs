//! Optional prose layered on top of a verdict.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Profile, ScoreBreakdown, Verdict};

/// Prose summary attached to a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Narrative {
    /// Short headline.
    pub headline: String,
    /// Body paragraphs.
    pub body: String,
}

/// Errors a narrator may report. Callers log and drop them.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NarrativeError {
    /// The narrator backend could not be reached.
    #[error("narrator unavailable: {message}")]
    Unavailable {
        /// Backend-specific detail.
        message: String,
    },
    /// The narrator declined to describe this result.
    #[error("narrator rejected the input: {message}")]
    Rejected {
        /// Backend-specific detail.
        message: String,
    },
}

/// Produce prose for a scored location.
///
/// Implementations must be thread-safe (`Send` + `Sync`). A failure never
/// affects scores or the verdict.
pub trait Narrator: Send + Sync {
    /// Describe `verdict` for `profile` using the details in `breakdown`.
    fn narrate(
        &self,
        profile: &Profile,
        breakdown: &ScoreBreakdown,
        verdict: &Verdict,
    ) -> Result<Narrative, NarrativeError>;
}
