use arlo_core::model::{Audit, Round, RoundNumber};
use arlo_core::rounds::{RoundState, derive_round_state};

use crate::vm::time_fmt::format_timestamp;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionVm {
    pub status_label: String,
    pub risk_limit_label: String,
    pub pvalue_label: String,
}

/// Everything one round's panel renders, with labels resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct RoundCardVm {
    pub number: RoundNumber,
    pub title: String,
    pub ballots_label: String,
    pub download_label: String,
    pub results_label: String,
    pub results_description: String,
    pub choice_labels: [String; 2],
    pub timeline_label: Option<String>,
    pub show_calculate_button: bool,
    pub completion: Option<CompletionVm>,
    pub state: RoundState,
}

#[must_use]
pub fn map_round_cards(audit: &Audit) -> Vec<RoundCardVm> {
    let choice_labels = choice_labels(audit);
    audit
        .rounds()
        .iter()
        .map(|round| map_round_card(audit, round, &choice_labels))
        .collect()
}

fn choice_labels(audit: &Audit) -> [String; 2] {
    let name = |index: usize| {
        audit
            .primary_contest()
            .and_then(|contest| contest.choices().get(index))
            .map(|choice| choice.name().to_string())
            .unwrap_or_default()
    };
    [name(0), name(1)]
}

fn map_round_card(audit: &Audit, round: &Round, choice_labels: &[String; 2]) -> RoundCardVm {
    let state = derive_round_state(audit, round);
    let number = state.number;

    let ballots_label = state
        .sample_size
        .map(|size| format!("{size} Ballots"))
        .unwrap_or_default();

    let timeline_label = match (round.started_at(), round.ended_at()) {
        (Some(start), Some(end)) => Some(format!(
            "Started {} · Ended {}",
            format_timestamp(start),
            format_timestamp(end)
        )),
        (Some(start), None) => Some(format!("Started {}", format_timestamp(start))),
        _ => None,
    };

    let completion = state.show_completion_panel().then(|| CompletionVm {
        status_label: "Audit Status: COMPLETE".to_string(),
        risk_limit_label: format!("Risk Limit: {}%", audit.risk_limit()),
        pvalue_label: format!(
            "P-value: {}",
            state.pvalue.map(format_pvalue).unwrap_or_default()
        ),
    });

    RoundCardVm {
        number,
        title: format!("Round {number}"),
        ballots_label,
        download_label: format!("Download Ballot Retrieval List for Round {number}"),
        results_label: format!("Audited Results: Round {number}"),
        results_description: format!(
            "Enter the number of votes recorded for each candidate/choice in the audited ballots for Round {number}"
        ),
        choice_labels: choice_labels.clone(),
        timeline_label,
        show_calculate_button: state.show_calculate_button,
        completion,
        state,
    }
}

/// Shortest round-trip rendering, switching to exponent form below 1e-6
/// and from 1e21 up, as browsers print numbers.
fn format_pvalue(pvalue: f64) -> String {
    let magnitude = pvalue.abs();
    if pvalue == 0.0 || !pvalue.is_finite() || (1e-6..1e21).contains(&magnitude) {
        return pvalue.to_string();
    }
    let scientific = format!("{pvalue:e}");
    match scientific.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => scientific,
    }
}
