#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod results;
pub mod rounds;

pub use error::AuditError;
pub use results::{ChoiceSlot, CountError, CountPolicy, ResultsForm, ResultsPayload, Tally};
pub use rounds::{RoundPhase, RoundState, derive_round_states};
