//! Test helpers for writing recorded fetches, profiles, and reports.

use super::*;
use camino::Utf8PathBuf;
use tempfile::TempDir;
use vicinity_core::test_support::snapshot_at;
use vicinity_core::{Category, FetchOutcome, NoiseKind, NoiseSource};

use crate::analyse::{AnalyseConfig, execute_analyse};
use crate::profiles::ProfileChoice;

/// Scratch directory removed when dropped.
pub(super) struct Scratch {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Scratch {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path.as_std_path(), contents).expect("write file");
}

pub(super) fn write_json_fixture<T: Serialize>(path: &Utf8Path, value: &T) {
    let payload = serde_json::to_vec_pretty(value).expect("serialise fixture");
    write_utf8(path, &payload);
}

/// Every POI category stocked at the same distances, plus a tram line.
pub(super) fn recorded_fetch() -> FetchOutcome {
    FetchOutcome {
        snapshots: Category::POI_CATEGORIES
            .iter()
            .map(|category| {
                (
                    *category,
                    snapshot_at(*category, &[60.0, 140.0, 260.0, 1_400.0], 3_000.0),
                )
            })
            .collect(),
        noise: vec![NoiseSource::new("Tram 4", NoiseKind::Tramway, 90.0).expect("valid source")],
        ..FetchOutcome::default()
    }
}

pub(super) fn analyse_config(fetch_path: Utf8PathBuf) -> AnalyseConfig {
    AnalyseConfig {
        fetch_path,
        subject: geo::Coord { x: 21.01, y: 52.23 },
        profile: ProfileChoice::Named("family".to_owned()),
        profiles_file: None,
        radius_overrides: std::collections::BTreeMap::new(),
        report_id: "warsaw-centre".to_owned(),
        rescore_limit: 3,
        output: None,
    }
}

/// Record a fetch and save a family report built from it.
pub(super) fn saved_report(scratch: &Scratch, rescore_limit: u32) -> Utf8PathBuf {
    let fetch_path = scratch.path("fetch.json");
    write_json_fixture(&fetch_path, &recorded_fetch());
    let report_path = scratch.path("reports/warsaw-centre.json");
    let config = AnalyseConfig {
        rescore_limit,
        output: Some(report_path.clone()),
        ..analyse_config(fetch_path)
    };
    let mut stdout = Vec::new();
    execute_analyse(config, &mut stdout).expect("analysis succeeds");
    report_path
}

pub(super) fn summary_from(stdout: &[u8]) -> ReportSummary {
    serde_json::from_slice(stdout).expect("output should be a JSON summary")
}
