//! POI provider backed by a fetch recorded to disk.

use std::collections::BTreeMap;

use camino::Utf8Path;
use geo::Coord;
use log::debug;
use vicinity_core::{Category, FetchOutcome, PoiProvider, ProviderError, SnapshotError};
use vicinity_fs::read_json;

use crate::CliError;

/// Serves a [`FetchOutcome`] previously written as JSON.
///
/// Only requested categories are served. Snapshots recorded wider than the
/// requested radius are narrowed; narrower ones are served as recorded and
/// their coverage reflects that.
#[derive(Debug, Clone)]
pub(crate) struct RecordedProvider {
    outcome: FetchOutcome,
}

impl RecordedProvider {
    pub(crate) const fn new(outcome: FetchOutcome) -> Self {
        Self { outcome }
    }

    /// Load a recorded fetch from `path`.
    pub(crate) fn load(path: &Utf8Path) -> Result<Self, CliError> {
        let outcome: FetchOutcome = read_json(path).map_err(CliError::LoadFetch)?;
        debug!(
            "loaded {} snapshot(s) and {} noise source(s) from {path}",
            outcome.snapshots.len(),
            outcome.noise.len()
        );
        Ok(Self::new(outcome))
    }
}

impl PoiProvider for RecordedProvider {
    fn fetch(
        &self,
        _subject: Coord<f64>,
        radii: &BTreeMap<Category, f64>,
    ) -> Result<FetchOutcome, ProviderError> {
        let snapshots = radii
            .iter()
            .filter_map(|(category, radius)| {
                let recorded = self.outcome.snapshots.get(category)?;
                let served = if *radius < recorded.radius_m() {
                    recorded.restrict(*radius)
                } else {
                    Ok(recorded.clone())
                };
                Some(served.map(|snapshot| (*category, snapshot)))
            })
            .collect::<Result<BTreeMap<_, _>, SnapshotError>>()
            .map_err(|err| ProviderError::InvalidResponse {
                message: err.to_string(),
            })?;
        Ok(FetchOutcome {
            snapshots,
            noise: self.outcome.noise.clone(),
            trace: self.outcome.trace,
        })
    }
}
