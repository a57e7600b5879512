//! Shared evaluation pass for analysis and rescoring.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use log::{debug, warn};
use vicinity_core::{
    Category, CategoryScorer, CategorySnapshot, FetchTrace, Narrative, Narrator, NoiseSource,
    Profile, ProfileError, SnapshotError,
};
use vicinity_scorer::{Engine, ScoreError, assess_quality, generate_verdict};

use crate::Evaluation;

/// Scoring engine plus the optional narrator.
#[derive(Clone)]
pub(crate) struct Pipeline<S> {
    engine: Engine<S>,
    narrator: Option<Arc<dyn Narrator>>,
}

impl<S: fmt::Debug> fmt::Debug for Pipeline<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("engine", &self.engine)
            .field("narrator", &self.narrator.is_some())
            .finish()
    }
}

impl<S: CategoryScorer> Pipeline<S> {
    pub(crate) const fn new(engine: Engine<S>) -> Self {
        Self {
            engine,
            narrator: None,
        }
    }

    pub(crate) fn set_narrator(&mut self, narrator: Arc<dyn Narrator>) {
        self.narrator = Some(narrator);
    }

    /// Score, judge, and grade `snapshots` under `profile`.
    ///
    /// Snapshots fetched wider than the profile radius are narrowed first so
    /// coverage reflects what the profile actually sees. A profile radius
    /// wider than the fetched one is lowered to it, and the evaluation
    /// carries that effective profile.
    pub(crate) fn evaluate<E>(
        &self,
        profile: &Profile,
        snapshots: &BTreeMap<Category, CategorySnapshot>,
        noise: &[NoiseSource],
        trace: &FetchTrace,
    ) -> Result<Evaluation, E>
    where
        E: From<ProfileError> + From<SnapshotError> + From<ScoreError>,
    {
        let effective = within_fetched_radius(profile, snapshots)?;
        let scoped = scope(&effective, snapshots)?;
        let breakdown = self.engine.score(&scoped, noise, &effective)?;
        let data_quality = assess_quality(&scoped, trace);
        let verdict = generate_verdict(&breakdown, &effective).with_data_quality(&data_quality);
        let mut evaluation = Evaluation {
            profile: effective,
            breakdown,
            verdict,
            data_quality,
            narrative: None,
        };
        evaluation.narrative = self.narrate(&evaluation);
        Ok(evaluation)
    }

    fn narrate(&self, evaluation: &Evaluation) -> Option<Narrative> {
        let narrator = self.narrator.as_ref()?;
        narrator
            .narrate(&evaluation.profile, &evaluation.breakdown, &evaluation.verdict)
            .inspect_err(|err| {
                warn!(
                    "narrative for profile '{}' skipped: {err}",
                    evaluation.profile.key()
                );
            })
            .ok()
    }
}

/// Lower radii that reach past the data fetched for their category.
fn within_fetched_radius(
    profile: &Profile,
    snapshots: &BTreeMap<Category, CategorySnapshot>,
) -> Result<Profile, ProfileError> {
    let lowered: BTreeMap<Category, f64> = snapshots
        .iter()
        .filter(|(category, snapshot)| {
            profile
                .radius(**category)
                .is_some_and(|radius| radius > snapshot.radius_m())
        })
        .map(|(category, snapshot)| (*category, snapshot.radius_m()))
        .collect();
    if lowered.is_empty() {
        return Ok(profile.clone());
    }
    for (category, radius) in &lowered {
        debug!(
            "{category}: radius for '{}' lowered to the fetched {radius} m",
            profile.key()
        );
    }
    profile.with_radius_overrides(&lowered)
}

fn scope(
    profile: &Profile,
    snapshots: &BTreeMap<Category, CategorySnapshot>,
) -> Result<BTreeMap<Category, CategorySnapshot>, SnapshotError> {
    snapshots
        .iter()
        .map(|(category, snapshot)| {
            let narrowed = match profile.radius(*category) {
                Some(radius) if radius < snapshot.radius_m() => snapshot.restrict(radius)?,
                _ => snapshot.clone(),
            };
            Ok((*category, narrowed))
        })
        .collect()
}
