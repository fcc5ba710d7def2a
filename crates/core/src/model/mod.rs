mod audit;
mod ids;
mod vote;

pub use audit::{Audit, Choice, Contest, EndMeasurements, Jurisdiction, Round, RoundContest};
pub use ids::{ChoiceId, ContestId, JurisdictionId, RoundNumber, ZeroRoundNumber};
pub use vote::{ParseVoteError, Vote};
