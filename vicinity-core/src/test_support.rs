//! Test-only collaborators and builders used by unit and behaviour tests.

use std::collections::BTreeMap;

use geo::Coord;

use crate::{
    Category, CategoryEvaluation, CategoryScorer, CategorySnapshot, DecayMode, FetchOutcome,
    Narrative, NarrativeError, Narrator, Poi, PoiProvider, Profile, ProviderError,
    ScoreBreakdown, Verdict,
};

/// Build a snapshot with one POI per distance, named after its position.
///
/// # Panics
///
/// Panics when a distance or the radius is invalid.
#[must_use]
#[expect(clippy::expect_used, reason = "test builders fail fast on bad input")]
pub fn snapshot_at(category: Category, distances: &[f64], radius_m: f64) -> CategorySnapshot {
    let pois = distances
        .iter()
        .enumerate()
        .map(|(index, distance)| {
            Poi::new(format!("{category} #{index}"), category, "generic", *distance)
                .expect("test distances are valid")
        })
        .collect();
    CategorySnapshot::new(category, pois, radius_m).expect("test snapshots are valid")
}

/// In-memory `PoiProvider` returning a stored outcome.
///
/// Only snapshots for requested categories are returned, and each is
/// restricted to the requested radius when that radius is narrower.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    outcome: FetchOutcome,
}

impl MemoryProvider {
    /// Create a provider that serves `outcome`.
    #[must_use]
    pub const fn new(outcome: FetchOutcome) -> Self {
        Self { outcome }
    }
}

impl PoiProvider for MemoryProvider {
    fn fetch(
        &self,
        _subject: Coord<f64>,
        radii: &BTreeMap<Category, f64>,
    ) -> Result<FetchOutcome, ProviderError> {
        let mut snapshots = BTreeMap::new();
        for (category, radius) in radii {
            let Some(snapshot) = self.outcome.snapshots.get(category) else {
                continue;
            };
            let served = if *radius < snapshot.radius_m() {
                snapshot
                    .restrict(*radius)
                    .map_err(|err| ProviderError::InvalidResponse {
                        message: err.to_string(),
                    })?
            } else {
                snapshot.clone()
            };
            snapshots.insert(*category, served);
        }
        Ok(FetchOutcome {
            snapshots,
            noise: self.outcome.noise.clone(),
            trace: self.outcome.trace,
        })
    }
}

/// `PoiProvider` that always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableProvider;

impl PoiProvider for UnavailableProvider {
    fn fetch(
        &self,
        _subject: Coord<f64>,
        _radii: &BTreeMap<Category, f64>,
    ) -> Result<FetchOutcome, ProviderError> {
        Err(ProviderError::Unavailable {
            message: "offline".to_owned(),
        })
    }
}

/// `Narrator` echoing the verdict level.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoNarrator;

impl Narrator for EchoNarrator {
    fn narrate(
        &self,
        profile: &Profile,
        _breakdown: &ScoreBreakdown,
        verdict: &Verdict,
    ) -> Result<Narrative, NarrativeError> {
        Ok(Narrative {
            headline: format!("{}: {}", profile.name(), verdict.level),
            body: verdict.explanation.clone(),
        })
    }
}

/// `Narrator` that always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingNarrator;

impl Narrator for FailingNarrator {
    fn narrate(
        &self,
        _profile: &Profile,
        _breakdown: &ScoreBreakdown,
        _verdict: &Verdict,
    ) -> Result<Narrative, NarrativeError> {
        Err(NarrativeError::Unavailable {
            message: "quota exhausted".to_owned(),
        })
    }
}

/// `CategoryScorer` returning the same score for every non-empty category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedScorer(pub f64);

impl CategoryScorer for FixedScorer {
    fn evaluate(
        &self,
        snapshot: &CategorySnapshot,
        radius_m: f64,
        _mode: DecayMode,
    ) -> CategoryEvaluation {
        let kept = snapshot
            .pois()
            .iter()
            .filter(|poi| poi.distance_m() <= radius_m)
            .count();
        if kept == 0 {
            return CategoryEvaluation::NONE;
        }
        CategoryEvaluation {
            score: Self::sanitise(self.0),
            utility: Self::sanitise(self.0),
            kept_count: kept,
            nearest_m: snapshot.nearest_distance(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_provider_serves_requested_categories_only() {
        let provider = MemoryProvider::new(FetchOutcome {
            snapshots: BTreeMap::from([
                (
                    Category::Shops,
                    snapshot_at(Category::Shops, &[100.0, 900.0], 1_000.0),
                ),
                (Category::Food, snapshot_at(Category::Food, &[50.0], 1_000.0)),
            ]),
            ..FetchOutcome::default()
        });
        let radii = BTreeMap::from([(Category::Shops, 500.0)]);
        let outcome = provider
            .fetch(Coord { x: 0.0, y: 0.0 }, &radii)
            .expect("memory fetch succeeds");
        assert_eq!(outcome.snapshots.len(), 1);
        let shops = outcome.snapshots.get(&Category::Shops).expect("shops served");
        assert_eq!(shops.kept_count(), 1);
        assert_eq!(shops.rejections().radius, 1);
    }

    #[test]
    fn fixed_scorer_sanitises() {
        let snapshot = snapshot_at(Category::Leisure, &[10.0], 100.0);
        let evaluation = FixedScorer(f64::NAN).evaluate(&snapshot, 100.0, DecayMode::Destination);
        assert_eq!(evaluation.score, 0.0);
    }
}
