//! The persisted analysis report.

use std::collections::BTreeMap;

use geo::Coord;
use serde::{Deserialize, Serialize};
use vicinity_core::{
    Category, CategorySnapshot, DataQuality, FetchTrace, Narrative, NoiseSource, Profile,
    ScoreBreakdown, Verdict,
};

/// Rescores allowed per report unless configured otherwise.
pub const DEFAULT_RESCORE_LIMIT: u32 = 3;

/// Rescore budget of one report.
///
/// Persisted flat as `rescore_count` and `rescore_limit`.
///
/// # Examples
/// ```
/// use vicinity_report::RescoreState;
///
/// let state = RescoreState::default();
/// assert_eq!(state.remaining(), 3);
/// assert!(!state.is_exhausted());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RescoreState {
    /// Successful rescores performed so far.
    #[serde(rename = "rescore_count")]
    pub count: u32,
    /// Rescores allowed.
    #[serde(rename = "rescore_limit")]
    pub limit: u32,
}

impl RescoreState {
    /// Fresh state allowing `limit` rescores.
    #[must_use]
    pub const fn with_limit(limit: u32) -> Self {
        Self { count: 0, limit }
    }

    /// Rescores still available.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.count)
    }

    /// Whether the budget is used up.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.count >= self.limit
    }
}

impl Default for RescoreState {
    fn default() -> Self {
        Self::with_limit(DEFAULT_RESCORE_LIMIT)
    }
}

/// Parameters the current scoring was generated with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Effective radius per weighted category.
    pub radii: BTreeMap<Category, f64>,
    /// Quality of the data behind the scoring.
    pub data_quality: DataQuality,
}

/// Scoring results recomputed on analysis and on every rescore.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Profile the results were computed for.
    pub profile: Profile,
    /// Category, noise, and rule breakdown.
    pub breakdown: ScoreBreakdown,
    /// Verdict merged with the data-quality confidence.
    pub verdict: Verdict,
    /// Quality of the data behind the breakdown.
    pub data_quality: DataQuality,
    /// Optional narrative from the configured narrator.
    pub narrative: Option<Narrative>,
}

/// A scored location.
///
/// POI snapshots, noise sources, and the fetch trace are fixed when the
/// report is built. Scoring, verdict, profile, generation parameters, and
/// narrative are replaced as a unit by each rescore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    id: String,
    subject: Coord<f64>,
    profile: Profile,
    snapshots: BTreeMap<Category, CategorySnapshot>,
    noise: Vec<NoiseSource>,
    trace: FetchTrace,
    scoring: ScoreBreakdown,
    verdict: Verdict,
    generation_params: GenerationParams,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    narrative: Option<Narrative>,
    #[serde(flatten)]
    rescore: RescoreState,
}

impl Report {
    /// Assemble a report from fetched data and its first evaluation.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        subject: Coord<f64>,
        snapshots: BTreeMap<Category, CategorySnapshot>,
        noise: Vec<NoiseSource>,
        trace: FetchTrace,
        evaluation: Evaluation,
        rescore: RescoreState,
    ) -> Self {
        let radii = evaluation.profile.radii().clone();
        Self {
            id: id.into(),
            subject,
            profile: evaluation.profile,
            snapshots,
            noise,
            trace,
            scoring: evaluation.breakdown,
            verdict: evaluation.verdict,
            generation_params: GenerationParams {
                radii,
                data_quality: evaluation.data_quality,
            },
            narrative: evaluation.narrative,
            rescore,
        }
    }

    /// Replace the scoring results, leaving POI data untouched.
    pub(crate) fn replace_evaluation(&mut self, evaluation: Evaluation) {
        self.generation_params = GenerationParams {
            radii: evaluation.profile.radii().clone(),
            data_quality: evaluation.data_quality,
        };
        self.profile = evaluation.profile;
        self.scoring = evaluation.breakdown;
        self.verdict = evaluation.verdict;
        self.narrative = evaluation.narrative;
    }

    /// Record one successful rescore.
    pub(crate) const fn record_rescore(&mut self) {
        self.rescore.count = self.rescore.count.saturating_add(1);
    }

    /// Report identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Analysed point as `x = longitude`, `y = latitude`.
    #[must_use]
    pub const fn subject(&self) -> Coord<f64> {
        self.subject
    }

    /// Profile the current scoring uses.
    #[must_use]
    pub const fn profile(&self) -> &Profile {
        &self.profile
    }

    /// POI snapshots as fetched.
    #[must_use]
    pub const fn snapshots(&self) -> &BTreeMap<Category, CategorySnapshot> {
        &self.snapshots
    }

    /// Noise sources as fetched.
    #[must_use]
    pub fn noise(&self) -> &[NoiseSource] {
        &self.noise
    }

    /// Provider trace of the fetch.
    #[must_use]
    pub const fn trace(&self) -> FetchTrace {
        self.trace
    }

    /// Current score breakdown.
    #[must_use]
    pub const fn scoring(&self) -> &ScoreBreakdown {
        &self.scoring
    }

    /// Current verdict.
    #[must_use]
    pub const fn verdict(&self) -> &Verdict {
        &self.verdict
    }

    /// Parameters behind the current scoring.
    #[must_use]
    pub const fn generation_params(&self) -> &GenerationParams {
        &self.generation_params
    }

    /// Current data-quality assessment.
    #[must_use]
    pub const fn data_quality(&self) -> &DataQuality {
        &self.generation_params.data_quality
    }

    /// Current narrative, when a narrator supplied one.
    #[must_use]
    pub const fn narrative(&self) -> Option<&Narrative> {
        self.narrative.as_ref()
    }

    /// Rescore budget.
    #[must_use]
    pub const fn rescore_state(&self) -> RescoreState {
        self.rescore
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 3, 3, false)]
    #[case(2, 3, 1, false)]
    #[case(3, 3, 0, true)]
    #[case(5, 3, 0, true)]
    fn budget_arithmetic(
        #[case] count: u32,
        #[case] limit: u32,
        #[case] remaining: u32,
        #[case] exhausted: bool,
    ) {
        let state = RescoreState { count, limit };
        assert_eq!(state.remaining(), remaining);
        assert_eq!(state.is_exhausted(), exhausted);
    }

    #[rstest]
    fn state_persists_flat() {
        let json = serde_json::to_value(RescoreState::default()).expect("serialise state");
        assert_eq!(
            json,
            serde_json::json!({ "rescore_count": 0, "rescore_limit": 3 })
        );
    }
}
