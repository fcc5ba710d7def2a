use crate::model::{Audit, Round, RoundNumber};

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

/// Lifecycle of a round's calculate action.
///
/// `Pending → Ready → Submitting → Complete`; a failed submission falls back to
/// `Ready` once the round is no longer in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// Not yet scored by the server.
    Pending,
    /// Scored but incomplete; results can be entered.
    Ready,
    /// A results submission is outstanding.
    Submitting,
    /// Risk limit met. Terminal.
    Complete,
}

//
// ─── ROUND STATE ───────────────────────────────────────────────────────────────
//

/// Display state projected from one round of an audit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundState {
    pub number: RoundNumber,
    pub sample_size: Option<u32>,
    pub has_contest: bool,
    pub has_end_measurements: bool,
    pub show_calculate_button: bool,
    pub is_complete: bool,
    pub pvalue: Option<f64>,
}

impl RoundState {
    /// Risk limit, p-value and report download are shown only for a scored, complete round.
    #[must_use]
    pub fn show_completion_panel(&self) -> bool {
        self.pvalue.is_some() && self.is_complete
    }

    #[must_use]
    pub fn phase(&self, submitting: bool) -> RoundPhase {
        if self.is_complete {
            RoundPhase::Complete
        } else if submitting {
            RoundPhase::Submitting
        } else if self.has_end_measurements {
            RoundPhase::Ready
        } else {
            RoundPhase::Pending
        }
    }
}

/// Projects every round of `audit` into its display state, in round order.
#[must_use]
pub fn derive_round_states(audit: &Audit) -> Vec<RoundState> {
    audit
        .rounds()
        .iter()
        .map(|round| derive_round_state(audit, round))
        .collect()
}

/// Projects a single round. Only the audit's last round can offer the calculate action.
#[must_use]
pub fn derive_round_state(audit: &Audit, round: &Round) -> RoundState {
    let contest = round.primary_contest();
    let measurements = contest.and_then(|c| c.end_measurements());
    let is_complete = measurements.is_some_and(|m| m.is_complete);
    let is_current = audit.is_current_round(round.number());

    RoundState {
        number: round.number(),
        sample_size: contest.and_then(|c| c.sample_size()),
        has_contest: contest.is_some(),
        has_end_measurements: measurements.is_some(),
        show_calculate_button: is_current && measurements.is_some() && !is_complete,
        is_complete,
        pvalue: measurements.and_then(|m| m.pvalue),
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
