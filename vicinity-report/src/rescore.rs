//! Bounded rescoring of an existing report under another profile.
//!
//! A rescore reuses the report's POI snapshots and noise sources; no
//! provider is consulted. The budget check, the computation, and the
//! increment happen under one exclusive borrow of the report, so a budget
//! of `n` admits exactly `n` successful rescores however callers race.

use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, info};
use vicinity_core::{
    CategoryScorer, DataQuality, Narrator, ProfileRegistry, ProfileRequest, ScoreBreakdown,
    Verdict,
};
use vicinity_scorer::{DecayScorer, Engine};

use crate::evaluate::Pipeline;
use crate::{Report, RescoreError, RescoreState};

/// Results of a successful rescore.
#[derive(Debug, Clone, PartialEq)]
pub struct RescoreOutcome {
    /// New score breakdown.
    pub breakdown: ScoreBreakdown,
    /// New verdict.
    pub verdict: Verdict,
    /// Quality of the reused data under the new profile's radii.
    pub data_quality: DataQuality,
    /// Budget after the rescore.
    pub rescore: RescoreState,
}

/// A report shared between threads.
///
/// # Examples
/// ```
/// # use std::collections::BTreeMap;
/// # use std::sync::Arc;
/// # use geo::Coord;
/// # use vicinity_core::test_support::{MemoryProvider, snapshot_at};
/// # use vicinity_core::{Category, FetchOutcome, ProfileRegistry, ProfileRequest};
/// use vicinity_report::{AnalysisRequest, Analyzer, RescoreController, SharedReport};
///
/// # let outcome = FetchOutcome {
/// #     snapshots: BTreeMap::from([(
/// #         Category::Shops,
/// #         snapshot_at(Category::Shops, &[50.0, 120.0], 3_000.0),
/// #     )]),
/// #     ..FetchOutcome::default()
/// # };
/// let registry = Arc::new(ProfileRegistry::builtin().expect("built-in profiles are valid"));
/// let analyzer = Analyzer::new(MemoryProvider::new(outcome), Arc::clone(&registry));
/// let request = AnalysisRequest::new("r-1", Coord { x: 0.0, y: 0.0 }, ProfileRequest::named("urban"));
/// let shared = SharedReport::new(analyzer.analyse(&request).expect("analysis succeeds"));
///
/// let controller = RescoreController::new(registry);
/// let outcome = controller
///     .rescore_shared(&shared, &ProfileRequest::named("family"))
///     .expect("budget available");
/// assert_eq!(outcome.rescore.count, 1);
/// assert_eq!(shared.snapshot().expect("lock is healthy").profile().key(), "family");
/// ```
#[derive(Debug, Clone)]
pub struct SharedReport {
    inner: Arc<Mutex<Report>>,
}

impl SharedReport {
    /// Wrap `report` for shared access.
    #[must_use]
    pub fn new(report: Report) -> Self {
        Self {
            inner: Arc::new(Mutex::new(report)),
        }
    }

    /// Lock the report for exclusive access.
    ///
    /// # Errors
    /// Returns [`RescoreError::Poisoned`] when a previous holder panicked.
    pub fn lock(&self) -> Result<MutexGuard<'_, Report>, RescoreError> {
        self.inner.lock().map_err(|_| RescoreError::Poisoned)
    }

    /// Clone the current state of the report.
    ///
    /// # Errors
    /// Returns [`RescoreError::Poisoned`] when a previous holder panicked.
    pub fn snapshot(&self) -> Result<Report, RescoreError> {
        self.lock().map(|guard| guard.clone())
    }
}

/// Recomputes a report's scoring for a different profile.
#[derive(Debug, Clone)]
pub struct RescoreController<S = DecayScorer> {
    registry: Arc<ProfileRegistry>,
    pipeline: Pipeline<S>,
}

impl RescoreController {
    /// Controller using the default decay scorer.
    #[must_use]
    pub const fn new(registry: Arc<ProfileRegistry>) -> Self {
        Self::with_scorer(registry, DecayScorer)
    }
}

impl<S: CategoryScorer> RescoreController<S> {
    /// Controller using a custom category scorer.
    pub const fn with_scorer(registry: Arc<ProfileRegistry>, scorer: S) -> Self {
        Self {
            registry,
            pipeline: Pipeline::new(Engine::new(scorer)),
        }
    }

    /// Attach a narrator; its failures are logged and skipped.
    #[must_use]
    pub fn with_narrator(mut self, narrator: Arc<dyn Narrator>) -> Self {
        self.pipeline.set_narrator(narrator);
        self
    }

    /// Rescore `report` for the profile `request` names.
    ///
    /// Checks run in order: budget, same profile (custom requests are
    /// always accepted), stored data. The count only grows once the new
    /// results have replaced the old ones.
    ///
    /// # Errors
    /// Returns [`RescoreError::LimitExceeded`] once the budget is used up,
    /// [`RescoreError::SameProfile`] when the report already uses the named
    /// profile, [`RescoreError::DataMissing`] when the report holds no
    /// snapshots, and profile or scoring errors otherwise.
    pub fn rescore(
        &self,
        report: &mut Report,
        request: &ProfileRequest,
    ) -> Result<RescoreOutcome, RescoreError> {
        let state = report.rescore_state();
        if state.is_exhausted() {
            return Err(RescoreError::LimitExceeded {
                count: state.count,
                limit: state.limit,
            });
        }
        let current = report.profile().key();
        if matches!(request, ProfileRequest::Named { key } if key == current) {
            return Err(RescoreError::SameProfile {
                key: current.to_owned(),
            });
        }
        if report.snapshots().is_empty() {
            return Err(RescoreError::DataMissing {
                id: report.id().to_owned(),
            });
        }

        let profile = self.registry.resolve(request)?;
        debug!(
            "rescoring report {} from '{current}' to '{}'",
            report.id(),
            profile.key()
        );
        let trace = report.trace();
        let evaluation = self.pipeline.evaluate::<RescoreError>(
            &profile,
            report.snapshots(),
            report.noise(),
            &trace,
        )?;
        report.replace_evaluation(evaluation);
        report.record_rescore();

        let rescore = report.rescore_state();
        info!(
            "report {} rescored for '{}': {:.1}, verdict {} ({}/{})",
            report.id(),
            profile.key(),
            report.scoring().total_score,
            report.verdict().level,
            rescore.count,
            rescore.limit
        );
        Ok(RescoreOutcome {
            breakdown: report.scoring().clone(),
            verdict: report.verdict().clone(),
            data_quality: report.data_quality().clone(),
            rescore,
        })
    }

    /// Rescore a shared report while holding its lock throughout.
    ///
    /// # Errors
    /// As [`rescore`](Self::rescore), plus [`RescoreError::Poisoned`].
    pub fn rescore_shared(
        &self,
        report: &SharedReport,
        request: &ProfileRequest,
    ) -> Result<RescoreOutcome, RescoreError> {
        let mut guard = report.lock()?;
        self.rescore(&mut guard, request)
    }
}
