use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How an audit board read one sampled ballot.
///
/// The wire form is the SCREAMING_SNAKE name, which is also the value exposed on
/// the ballot-mark control for UI tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Vote {
    /// Mark for the first choice.
    Yes,
    /// Mark for the second choice.
    No,
    /// The board could not agree on the mark.
    NoConsensus,
    /// Blank or invalid mark.
    NoVote,
}

impl Vote {
    pub const ALL: [Vote; 4] = [Vote::Yes, Vote::No, Vote::NoConsensus, Vote::NoVote];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Vote::Yes => "YES",
            Vote::No => "NO",
            Vote::NoConsensus => "NO_CONSENSUS",
            Vote::NoVote => "NO_VOTE",
        }
    }
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseVoteError(String);

impl fmt::Display for ParseVoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown vote value: {}", self.0)
    }
}

impl std::error::Error for ParseVoteError {}

impl FromStr for Vote {
    type Err = ParseVoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Vote::ALL
            .into_iter()
            .find(|vote| vote.as_str() == s)
            .ok_or_else(|| ParseVoteError(s.to_string()))
    }
}
