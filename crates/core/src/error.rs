use thiserror::Error;

use crate::model::{ContestId, RoundNumber};

/// Reasons an audit received from the server is rejected before it reaches a view.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum AuditError {
    #[error("audit has no risk limit configured")]
    MissingRiskLimit,

    #[error("risk limit must be between 1 and 100 percent, got {0}")]
    InvalidRiskLimit(u32),

    #[error("contest {contest} needs at least two choices, got {count}")]
    TooFewChoices { contest: ContestId, count: usize },

    #[error("round {round} references unknown contest {contest}")]
    UnknownContest {
        round: RoundNumber,
        contest: ContestId,
    },

    #[error("round {round} has an invalid p-value {pvalue}")]
    InvalidPValue { round: RoundNumber, pvalue: f64 },

    #[error("round {round} has an invalid timestamp {raw:?}")]
    InvalidTimestamp { round: RoundNumber, raw: String },
}
