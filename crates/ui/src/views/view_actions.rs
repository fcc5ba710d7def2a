use arlo_core::ChoiceSlot;
use arlo_core::model::{
    Audit, Choice, ChoiceId, Contest, ContestId, EndMeasurements, Jurisdiction, JurisdictionId,
    Round, RoundContest, RoundNumber,
};

use super::AuditIntent;
use super::test_harness::{ViewHarness, setup_view_harness};

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

fn ready_audit() -> Audit {
    audit(vec![round(Some(EndMeasurements::new(None, false)))])
}

fn second_round_audit() -> Audit {
    audit(vec![
        round(Some(EndMeasurements::new(Some(0.2), false))),
        round(Some(EndMeasurements::new(None, false))),
    ])
}

fn first_round() -> RoundNumber {
    RoundNumber::new(1).unwrap()
}

fn enter_counts(harness: &mut ViewHarness, first: &str, second: &str) {
    for (slot, value) in [(ChoiceSlot::First, first), (ChoiceSlot::Second, second)] {
        harness.dispatch(AuditIntent::EditCount {
            round: first_round(),
            slot,
            value: value.to_string(),
        });
    }
}

#[tokio::test(flavor = "current_thread")]
async fn calculate_posts_counts_and_renders_refreshed_audit() {
    let mut harness = setup_view_harness(Some(ready_audit()));
    harness.api.set_audit_after_submit(second_round_audit());
    harness.settle().await;

    enter_counts(&mut harness, "45", "35");
    harness.dispatch(AuditIntent::Calculate(first_round()));
    harness.drive().await;

    let submissions = harness.api.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].round, first_round());
    assert_eq!(submissions[0].jurisdiction, JurisdictionId::new("jur-1"));

    let html = harness.render();
    assert!(html.contains("Round 2"), "missing next round in {html}");
    assert!(!html.contains("role=\"alert\""), "unexpected notice in {html}");
    assert!(
        html.contains("Calculate Risk Measurement"),
        "missing calculate button for round 2 in {html}"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn in_flight_submission_shows_loading_until_released() {
    let mut harness = setup_view_harness(Some(ready_audit()));
    harness.api.set_audit_after_submit(second_round_audit());
    harness.api.hold_submissions();
    harness.settle().await;

    enter_counts(&mut harness, "45", "35");
    harness.dispatch(AuditIntent::Calculate(first_round()));
    harness.drive().await;

    let html = harness.render();
    assert!(html.contains("Loading..."), "missing loading text in {html}");
    assert!(html.contains("round-card submitting"), "missing phase class in {html}");
    assert!(
        !html.contains("Calculate Risk Measurement"),
        "calculate button visible while submitting in {html}"
    );

    harness.api.release_submissions();
    harness.drive().await;

    let html = harness.render();
    assert!(!html.contains("Loading..."), "loading text left behind in {html}");
    assert!(html.contains("Round 2"), "missing next round in {html}");
    assert_eq!(harness.api.submissions().len(), 1);
}

#[tokio::test(flavor = "current_thread")]
async fn rejected_submission_shows_dismissible_notice() {
    let mut harness = setup_view_harness(Some(ready_audit()));
    harness.api.fail_submissions(Some("counts rejected"));
    harness.settle().await;

    enter_counts(&mut harness, "45", "35");
    harness.dispatch(AuditIntent::Calculate(first_round()));
    harness.drive().await;

    let html = harness.render();
    assert!(html.contains("counts rejected"), "missing notice in {html}");
    assert!(html.contains("role=\"alert\""), "notice not announced in {html}");
    assert!(
        html.contains("Calculate Risk Measurement"),
        "calculate button should return after failure in {html}"
    );

    harness.dispatch(AuditIntent::DismissNotice);
    harness.drive().await;

    let html = harness.render();
    assert!(!html.contains("counts rejected"), "notice not dismissed in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn invalid_counts_never_reach_the_server() {
    let mut harness = setup_view_harness(Some(ready_audit()));
    harness.settle().await;

    enter_counts(&mut harness, "forty", "35");
    harness.dispatch(AuditIntent::Calculate(first_round()));
    harness.drive().await;

    assert!(harness.api.submissions().is_empty());
    let html = harness.render();
    assert!(html.contains("non-negative whole number"), "missing notice in {html}");
    assert!(html.contains("forty"), "missing rejected value in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn refresh_failure_after_post_refetches_instead_of_resubmitting() {
    let mut harness = setup_view_harness(Some(ready_audit()));
    harness.settle().await;
    let fetches_before = harness.api.fetch_count();

    enter_counts(&mut harness, "45", "35");
    harness.api.fail_fetches(Some("server down"));
    harness.dispatch(AuditIntent::Calculate(first_round()));
    harness.drive().await;

    assert_eq!(harness.api.submissions().len(), 1);
    // One refetch from the service, one from the restarted resource.
    assert!(harness.api.fetch_count() >= fetches_before + 2);
    let html = harness.render();
    assert!(html.contains("were recorded"), "missing recorded notice in {html}");

    // Nothing left to resubmit while the audit is unavailable.
    harness.dispatch(AuditIntent::Calculate(first_round()));
    harness.drive().await;
    assert_eq!(harness.api.submissions().len(), 1);

    harness.api.fail_fetches(None);
    harness.api.set_audit(second_round_audit());
    harness.dispatch(AuditIntent::DownloadReport);
    harness.drive().await;
    let html = harness.render();
    assert!(html.contains("Round 2"), "audit not reloaded in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn download_round_opens_retrieval_list() {
    let mut harness = setup_view_harness(Some(ready_audit()));
    harness.settle().await;

    harness.dispatch(AuditIntent::DownloadRound(first_round()));
    harness.drive().await;

    assert_eq!(
        harness.link_opener.opened(),
        vec!["memory://jurisdiction/jur-1/1/retrieval-list".to_string()]
    );
}

#[tokio::test(flavor = "current_thread")]
async fn download_report_opens_report_and_refetches() {
    let mut harness = setup_view_harness(Some(audit(vec![round(Some(
        EndMeasurements::new(Some(0.03), true),
    ))])));
    harness.settle().await;
    let fetches_before = harness.api.fetch_count();

    harness.dispatch(AuditIntent::DownloadReport);
    harness.drive().await;

    assert_eq!(
        harness.link_opener.opened(),
        vec!["memory://audit/report".to_string()]
    );
    assert!(harness.api.fetch_count() > fetches_before);
}

#[tokio::test(flavor = "current_thread")]
async fn download_report_refetches_even_when_link_fails() {
    let mut harness = setup_view_harness(Some(audit(vec![round(Some(
        EndMeasurements::new(Some(0.03), true),
    ))])));
    harness.settle().await;
    harness.api.fail_links(Some("report unavailable"));
    let fetches_before = harness.api.fetch_count();

    harness.dispatch(AuditIntent::DownloadReport);
    harness.drive().await;

    assert!(harness.link_opener.opened().is_empty());
    assert!(harness.api.fetch_count() > fetches_before);
    let html = harness.render();
    assert!(html.contains("report unavailable"), "missing notice in {html}");
    assert!(html.contains("Audit Status: COMPLETE"), "audit lost in {html}");
}
