mod round_vm;
mod time_fmt;

pub use round_vm::{CompletionVm, RoundCardVm, map_round_cards};
pub use time_fmt::format_timestamp;
