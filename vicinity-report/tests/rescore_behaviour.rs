//! Behaviour tests for the rescore budget and its guards.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::Arc;

use geo::Coord;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use vicinity_core::test_support::{MemoryProvider, snapshot_at};
use vicinity_core::{
    Category, CategorySnapshot, FetchOutcome, ProfileRegistry, ProfileRequest,
};
use vicinity_report::{
    AnalysisRequest, Analyzer, Report, RescoreController, RescoreError, RescoreOutcome,
};

#[derive(Default)]
struct Desk {
    report: Option<Report>,
    fetched: BTreeMap<Category, CategorySnapshot>,
    last: Option<Result<RescoreOutcome, RescoreError>>,
}

#[fixture]
fn desk() -> RefCell<Desk> {
    RefCell::new(Desk::default())
}

fn registry() -> Arc<ProfileRegistry> {
    Arc::new(ProfileRegistry::builtin().expect("built-in profiles are valid"))
}

fn fetched() -> BTreeMap<Category, CategorySnapshot> {
    Category::POI_CATEGORIES
        .iter()
        .map(|category| {
            (
                *category,
                snapshot_at(*category, &[80.0, 210.0, 480.0, 1_900.0], 3_000.0),
            )
        })
        .collect()
}

fn analyse(desk: &RefCell<Desk>, snapshots: BTreeMap<Category, CategorySnapshot>) {
    let outcome = FetchOutcome {
        snapshots: snapshots.clone(),
        ..FetchOutcome::default()
    };
    let analyzer = Analyzer::new(MemoryProvider::new(outcome), registry());
    let request = AnalysisRequest::new(
        "report-7",
        Coord { x: 16.93, y: 52.41 },
        ProfileRequest::named("family"),
    );
    let report = analyzer.analyse(&request).expect("analysis succeeds");
    let mut state = desk.borrow_mut();
    state.report = Some(report);
    state.fetched = snapshots;
}

fn rescore(desk: &RefCell<Desk>, request: &ProfileRequest) {
    let controller = RescoreController::new(registry());
    let mut state = desk.borrow_mut();
    let report = state.report.as_mut().expect("report was analysed");
    let result = controller.rescore(report, request);
    state.last = Some(result);
}

fn report_of(desk: &RefCell<Desk>) -> Report {
    desk.borrow().report.clone().expect("report was analysed")
}

#[given("a family report with fetched POI data")]
fn given_report(#[from(desk)] desk: &RefCell<Desk>) {
    analyse(desk, fetched());
}

#[given("a family report without POI data")]
fn given_empty_report(#[from(desk)] desk: &RefCell<Desk>) {
    analyse(desk, BTreeMap::new());
}

#[when("I rescore for investor, urban, and remote_work in turn")]
fn when_three_rescores(#[from(desk)] desk: &RefCell<Desk>) {
    for key in ["investor", "urban", "remote_work"] {
        rescore(desk, &ProfileRequest::named(key));
        assert!(matches!(desk.borrow().last, Some(Ok(_))));
    }
}

#[when("I rescore for active_sport")]
fn when_active_sport(#[from(desk)] desk: &RefCell<Desk>) {
    rescore(desk, &ProfileRequest::named("active_sport"));
}

#[when("I rescore for family")]
fn when_family(#[from(desk)] desk: &RefCell<Desk>) {
    rescore(desk, &ProfileRequest::named("family"));
}

#[when("I rescore for investor")]
fn when_investor(#[from(desk)] desk: &RefCell<Desk>) {
    rescore(desk, &ProfileRequest::named("investor"));
}

#[when("I rescore with custom weights for food and leisure")]
fn when_custom(#[from(desk)] desk: &RefCell<Desk>) {
    let request = ProfileRequest::Custom {
        weights: BTreeMap::from([(Category::Food, 0.6), (Category::Leisure, 0.4)]),
        radii: BTreeMap::from([(Category::Food, 500.0)]),
    };
    rescore(desk, &request);
}

#[then("the rescore count is 3")]
fn then_count_three(#[from(desk)] desk: &RefCell<Desk>) {
    assert_eq!(report_of(desk).rescore_state().count, 3);
}

#[then("the rescore count is 1")]
fn then_count_one(#[from(desk)] desk: &RefCell<Desk>) {
    assert_eq!(report_of(desk).rescore_state().count, 1);
}

#[then("the rescore count is 0")]
fn then_count_zero(#[from(desk)] desk: &RefCell<Desk>) {
    assert_eq!(report_of(desk).rescore_state().count, 0);
}

#[then("the rescore is refused with the limit 3 of 3")]
fn then_limit(#[from(desk)] desk: &RefCell<Desk>) {
    assert!(matches!(
        desk.borrow().last,
        Some(Err(RescoreError::LimitExceeded { count: 3, limit: 3 }))
    ));
}

#[then("the rescore is refused as the same profile")]
fn then_same_profile(#[from(desk)] desk: &RefCell<Desk>) {
    assert!(matches!(
        desk.borrow().last,
        Some(Err(RescoreError::SameProfile { .. }))
    ));
}

#[then("the rescore is refused for missing data")]
fn then_data_missing(#[from(desk)] desk: &RefCell<Desk>) {
    assert!(matches!(
        desk.borrow().last,
        Some(Err(RescoreError::DataMissing { .. }))
    ));
}

#[then("the report still uses remote_work")]
fn then_remote_work(#[from(desk)] desk: &RefCell<Desk>) {
    let report = report_of(desk);
    assert_eq!(report.profile().key(), "remote_work");
    assert_eq!(report.scoring().profile_key, "remote_work");
}

#[then("the report uses the custom profile")]
fn then_custom(#[from(desk)] desk: &RefCell<Desk>) {
    let report = report_of(desk);
    assert!(report.profile().is_custom());
    assert_eq!(
        report.generation_params().radii,
        BTreeMap::from([(Category::Food, 500.0), (Category::Leisure, 1_000.0)])
    );
}

#[then("the POI snapshots are unchanged")]
fn then_snapshots_unchanged(#[from(desk)] desk: &RefCell<Desk>) {
    let state = desk.borrow();
    let report = state.report.as_ref().expect("report was analysed");
    assert_eq!(report.snapshots(), &state.fetched);
}

#[scenario(path = "tests/features/rescore.feature", index = 0)]
fn budget_admits_three(desk: RefCell<Desk>) {
    let _ = desk;
}

#[scenario(path = "tests/features/rescore.feature", index = 1)]
fn same_profile_is_refused(desk: RefCell<Desk>) {
    let _ = desk;
}

#[scenario(path = "tests/features/rescore.feature", index = 2)]
fn custom_weights_reuse_data(desk: RefCell<Desk>) {
    let _ = desk;
}

#[scenario(path = "tests/features/rescore.feature", index = 3)]
fn missing_data_is_refused(desk: RefCell<Desk>) {
    let _ = desk;
}
