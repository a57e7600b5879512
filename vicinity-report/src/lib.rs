//! Location reports built from one POI fetch and rescored without another.
//!
//! [`Analyzer`] asks a [`PoiProvider`](vicinity_core::PoiProvider) for the
//! surroundings of a point, scores them for the requested profile, and
//! returns a serialisable [`Report`]. [`RescoreController`] later scores the
//! same snapshots for a different profile, within a per-report budget
//! (three rescores by default).
//!
//! # Examples
//!
//! ```
//! use std::collections::BTreeMap;
//! use std::sync::Arc;
//! use geo::Coord;
//! use vicinity_core::test_support::{MemoryProvider, snapshot_at};
//! use vicinity_core::{Category, FetchOutcome, ProfileRegistry, ProfileRequest};
//! use vicinity_report::{AnalysisRequest, Analyzer, RescoreController, RescoreError};
//!
//! let outcome = FetchOutcome {
//!     snapshots: BTreeMap::from([(
//!         Category::Education,
//!         snapshot_at(Category::Education, &[300.0, 650.0], 3_000.0),
//!     )]),
//!     ..FetchOutcome::default()
//! };
//! let registry = Arc::new(ProfileRegistry::builtin().expect("built-in profiles are valid"));
//! let analyzer = Analyzer::new(MemoryProvider::new(outcome), Arc::clone(&registry))
//!     .with_rescore_limit(1);
//! let request = AnalysisRequest::new("r-1", Coord { x: 0.0, y: 0.0 }, ProfileRequest::named("family"));
//! let mut report = analyzer.analyse(&request).expect("analysis succeeds");
//!
//! let controller = RescoreController::new(registry);
//! controller
//!     .rescore(&mut report, &ProfileRequest::named("investor"))
//!     .expect("budget available");
//! let refused = controller.rescore(&mut report, &ProfileRequest::named("urban"));
//! assert!(matches!(refused, Err(RescoreError::LimitExceeded { count: 1, limit: 1 })));
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod analysis;
mod error;
mod evaluate;
mod report;
mod rescore;

pub use analysis::{AnalysisRequest, Analyzer};
pub use error::{AnalysisError, RescoreError};
pub use report::{DEFAULT_RESCORE_LIMIT, Evaluation, GenerationParams, Report, RescoreState};
pub use rescore::{RescoreController, RescoreOutcome, SharedReport};
