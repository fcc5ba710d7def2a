use arlo_core::model::{
    Audit, Choice, ChoiceId, Contest, ContestId, EndMeasurements, Jurisdiction, JurisdictionId,
    Round, RoundContest, Vote,
};
use dioxus::prelude::*;

use super::VoteGroup;
use super::test_harness::setup_view_harness;

fn audit(rounds: Vec<Round>) -> Audit {
    let contest = Contest::new(
        ContestId::new("contest-1"),
        "Mayor",
        Some(1000),
        vec![
            Choice::new(ChoiceId::new("candidate-1"), "Alice", 600),
            Choice::new(ChoiceId::new("candidate-2"), "Bob", 400),
        ],
    )
    .unwrap();
    Audit::new(
        5,
        vec![Jurisdiction::new(JurisdictionId::new("jur-1"), "County")],
        vec![contest],
        rounds,
    )
    .unwrap()
}

fn round(measurements: Option<EndMeasurements>) -> Round {
    Round::new(vec![RoundContest::new(
        ContestId::new("contest-1"),
        Some(80),
        measurements,
    )])
}

#[tokio::test(flavor = "current_thread")]
async fn audit_view_renders_ready_round_with_calculate_button() {
    let mut harness = setup_view_harness(Some(audit(vec![round(Some(
        EndMeasurements::new(None, false),
    ))])));
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Round 1"), "missing title in {html}");
    assert!(html.contains("80 Ballots"), "missing sample size in {html}");
    assert!(
        html.contains("Download Ballot Retrieval List for Round 1"),
        "missing download in {html}"
    );
    assert!(html.contains("Alice"), "missing first choice in {html}");
    assert!(html.contains("Bob"), "missing second choice in {html}");
    assert!(
        html.contains("Calculate Risk Measurement"),
        "missing calculate button in {html}"
    );
    assert!(!html.contains("Audit Status"), "unexpected completion in {html}");
    assert!(harness.api.fetch_count() >= 1);
}

#[tokio::test(flavor = "current_thread")]
async fn audit_view_renders_completion_panel() {
    let mut harness = setup_view_harness(Some(audit(vec![round(Some(
        EndMeasurements::new(Some(0.03), true),
    ))])));
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Audit Status: COMPLETE"), "missing status in {html}");
    assert!(html.contains("Risk Limit: 5%"), "missing risk limit in {html}");
    assert!(html.contains("P-value: 0.03"), "missing p-value in {html}");
    assert!(html.contains("Download Audit Report"), "missing report in {html}");
    assert!(html.contains("round-card complete"), "missing phase class in {html}");
    assert!(
        !html.contains("Calculate Risk Measurement"),
        "unexpected calculate button in {html}"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn audit_view_hides_button_for_unscored_and_earlier_rounds() {
    let mut harness = setup_view_harness(Some(audit(vec![
        round(Some(EndMeasurements::new(Some(0.2), false))),
        round(None),
    ])));
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Round 2"), "missing second round in {html}");
    assert!(
        !html.contains("Calculate Risk Measurement"),
        "unexpected calculate button in {html}"
    );
    assert!(!html.contains("Audit Status"), "unexpected completion in {html}");
    assert!(harness.link_opener.opened().is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn audit_view_surfaces_fetch_errors() {
    let mut harness = setup_view_harness(None);
    harness.api.fail_fetches(Some("server down"));
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("server down"), "missing error in {html}");
}

#[component]
fn VoteGroupHarness() -> Element {
    rsx! {
        VoteGroup {
            name: "ballot-1",
            selected: Vote::No,
            on_change: move |_| {},
        }
    }
}

#[test]
fn vote_group_exposes_test_ids_per_vote() {
    let mut dom = VirtualDom::new(VoteGroupHarness);
    dom.rebuild_in_place();
    let html = dioxus_ssr::render(&dom);

    for vote in Vote::ALL {
        let test_id = format!("data-testid=\"{vote}\"");
        assert!(html.contains(&test_id), "missing {test_id} in {html}");
    }
    assert_eq!(html.matches("name=\"ballot-1\"").count(), Vote::ALL.len());
}
