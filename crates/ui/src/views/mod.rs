mod audit;
mod block_radio;
mod state;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_actions;
#[cfg(test)]
mod view_smoke;

pub use audit::{AuditIntent, AuditView};
#[cfg(test)]
pub(crate) use audit::AuditTestHandles;
pub use block_radio::{BlockRadio, VoteGroup};
pub use state::{ViewError, ViewState, view_state_from_resource};
