//! Initial analysis: fetch, score, judge, and assemble a report.

use std::collections::BTreeMap;
use std::sync::Arc;

use geo::Coord;
use log::info;
use vicinity_core::{
    Category, CategoryScorer, DEFAULT_CUSTOM_RADIUS_M, Narrator, PoiProvider, Profile,
    ProfileRegistry, ProfileRequest,
};
use vicinity_scorer::{DecayScorer, Engine};

use crate::evaluate::Pipeline;
use crate::{AnalysisError, DEFAULT_RESCORE_LIMIT, Report, RescoreState};

/// Parameters of one analysis.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use vicinity_core::ProfileRequest;
/// use vicinity_report::AnalysisRequest;
///
/// let request = AnalysisRequest::new("r-1", Coord { x: 21.01, y: 52.23 }, ProfileRequest::named("urban"));
/// assert!(request.radius_overrides.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    /// Identifier given to the report.
    pub id: String,
    /// Point to analyse, `x = longitude`, `y = latitude`.
    pub subject: Coord<f64>,
    /// Profile to score with.
    pub profile: ProfileRequest,
    /// Radius overrides for categories the profile tracks.
    pub radius_overrides: BTreeMap<Category, f64>,
}

impl AnalysisRequest {
    /// Request with no radius overrides.
    pub fn new(id: impl Into<String>, subject: Coord<f64>, profile: ProfileRequest) -> Self {
        Self {
            id: id.into(),
            subject,
            profile,
            radius_overrides: BTreeMap::new(),
        }
    }
}

/// Builds reports from a POI provider and the profile registry.
///
/// The provider is asked once per analysis, with radii wide enough for
/// every registered profile so later rescores never need to fetch again.
///
/// # Examples
/// ```
/// use std::collections::BTreeMap;
/// use std::sync::Arc;
/// use geo::Coord;
/// use vicinity_core::test_support::{MemoryProvider, snapshot_at};
/// use vicinity_core::{Category, FetchOutcome, ProfileRegistry, ProfileRequest};
/// use vicinity_report::{AnalysisRequest, Analyzer};
///
/// let outcome = FetchOutcome {
///     snapshots: BTreeMap::from([(
///         Category::Shops,
///         snapshot_at(Category::Shops, &[50.0, 120.0, 200.0], 3_000.0),
///     )]),
///     ..FetchOutcome::default()
/// };
/// let registry = Arc::new(ProfileRegistry::builtin().expect("built-in profiles are valid"));
/// let analyzer = Analyzer::new(MemoryProvider::new(outcome), registry);
/// let request = AnalysisRequest::new("r-1", Coord { x: 0.0, y: 0.0 }, ProfileRequest::named("urban"));
/// let report = analyzer.analyse(&request).expect("analysis succeeds");
/// assert_eq!(report.profile().key(), "urban");
/// assert_eq!(report.rescore_state().count, 0);
/// ```
#[derive(Debug, Clone)]
pub struct Analyzer<P, S = DecayScorer> {
    provider: P,
    registry: Arc<ProfileRegistry>,
    pipeline: Pipeline<S>,
    rescore_limit: u32,
}

impl<P: PoiProvider> Analyzer<P> {
    /// Analyzer using the default decay scorer.
    pub const fn new(provider: P, registry: Arc<ProfileRegistry>) -> Self {
        Self::with_scorer(provider, registry, DecayScorer)
    }
}

impl<P, S> Analyzer<P, S>
where
    P: PoiProvider,
    S: CategoryScorer,
{
    /// Analyzer using a custom category scorer.
    pub const fn with_scorer(provider: P, registry: Arc<ProfileRegistry>, scorer: S) -> Self {
        Self {
            provider,
            registry,
            pipeline: Pipeline::new(Engine::new(scorer)),
            rescore_limit: DEFAULT_RESCORE_LIMIT,
        }
    }

    /// Attach a narrator; its failures are logged and skipped.
    #[must_use]
    pub fn with_narrator(mut self, narrator: Arc<dyn Narrator>) -> Self {
        self.pipeline.set_narrator(narrator);
        self
    }

    /// Set the rescore budget given to new reports.
    #[must_use]
    pub const fn with_rescore_limit(mut self, limit: u32) -> Self {
        self.rescore_limit = limit;
        self
    }

    /// Fetch POI data around the subject and build the first report.
    ///
    /// Provider degradation is folded into data quality; only an outright
    /// provider failure aborts the analysis.
    ///
    /// # Errors
    /// Returns [`AnalysisError`] when the profile cannot be resolved, the
    /// provider fails, or the fetched data is inconsistent.
    pub fn analyse(&self, request: &AnalysisRequest) -> Result<Report, AnalysisError> {
        let resolved = self.registry.resolve(&request.profile)?;
        let profile = if request.radius_overrides.is_empty() {
            Profile::clone(&resolved)
        } else {
            resolved.with_radius_overrides(&request.radius_overrides)?
        };

        let radii = fetch_radii(&self.registry, &profile);
        let outcome = self.provider.fetch(request.subject, &radii)?;
        let evaluation = self.pipeline.evaluate::<AnalysisError>(
            &profile,
            &outcome.snapshots,
            &outcome.noise,
            &outcome.trace,
        )?;
        info!(
            "report {}: profile '{}' scored {:.1}, verdict {}, confidence {}%",
            request.id,
            profile.key(),
            evaluation.breakdown.total_score,
            evaluation.verdict.level,
            evaluation.verdict.confidence
        );
        Ok(Report::new(
            request.id.clone(),
            request.subject,
            outcome.snapshots,
            outcome.noise,
            outcome.trace,
            evaluation,
            RescoreState::with_limit(self.rescore_limit),
        ))
    }
}

/// Widest radius per POI category across `profile` and the registry.
fn fetch_radii(registry: &ProfileRegistry, profile: &Profile) -> BTreeMap<Category, f64> {
    Category::POI_CATEGORIES
        .iter()
        .map(|category| {
            let widest = registry
                .iter()
                .map(Arc::as_ref)
                .chain(std::iter::once(profile))
                .filter_map(|candidate| candidate.radius(*category))
                .fold(DEFAULT_CUSTOM_RADIUS_M, f64::max);
            (*category, widest)
        })
        .collect()
}
