use chrono::NaiveDateTime;

use crate::error::AuditError;
use crate::model::ids::{ChoiceId, ContestId, JurisdictionId, RoundNumber};

//
// ─── CONTESTS ──────────────────────────────────────────────────────────────────
//

/// One candidate or choice on a contest, with its reported vote total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    id: ChoiceId,
    name: String,
    num_votes: u64,
}

impl Choice {
    #[must_use]
    pub fn new(id: ChoiceId, name: impl Into<String>, num_votes: u64) -> Self {
        Self {
            id,
            name: name.into(),
            num_votes,
        }
    }

    #[must_use]
    pub fn id(&self) -> &ChoiceId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn num_votes(&self) -> u64 {
        self.num_votes
    }
}

/// A contest under audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contest {
    id: ContestId,
    name: String,
    total_ballots_cast: Option<u64>,
    choices: Vec<Choice>,
}

impl Contest {
    /// Creates a contest.
    ///
    /// # Errors
    ///
    /// Returns `AuditError::TooFewChoices` when fewer than two choices are given.
    pub fn new(
        id: ContestId,
        name: impl Into<String>,
        total_ballots_cast: Option<u64>,
        choices: Vec<Choice>,
    ) -> Result<Self, AuditError> {
        if choices.len() < 2 {
            return Err(AuditError::TooFewChoices {
                contest: id,
                count: choices.len(),
            });
        }
        Ok(Self {
            id,
            name: name.into(),
            total_ballots_cast,
            choices,
        })
    }

    #[must_use]
    pub fn id(&self) -> &ContestId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn total_ballots_cast(&self) -> Option<u64> {
        self.total_ballots_cast
    }

    #[must_use]
    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }
}

/// A jurisdiction taking part in the audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Jurisdiction {
    id: JurisdictionId,
    name: String,
}

impl Jurisdiction {
    #[must_use]
    pub fn new(id: JurisdictionId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &JurisdictionId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

//
// ─── ROUNDS ────────────────────────────────────────────────────────────────────
//

/// Server-computed measurements attached to a round contest once it has been scored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EndMeasurements {
    pub pvalue: Option<f64>,
    pub is_complete: bool,
}

impl EndMeasurements {
    #[must_use]
    pub fn new(pvalue: Option<f64>, is_complete: bool) -> Self {
        Self {
            pvalue,
            is_complete,
        }
    }
}

/// The state of one contest within one round.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundContest {
    contest_id: ContestId,
    sample_size: Option<u32>,
    end_measurements: Option<EndMeasurements>,
}

impl RoundContest {
    #[must_use]
    pub fn new(
        contest_id: ContestId,
        sample_size: Option<u32>,
        end_measurements: Option<EndMeasurements>,
    ) -> Self {
        Self {
            contest_id,
            sample_size,
            end_measurements,
        }
    }

    #[must_use]
    pub fn contest_id(&self) -> &ContestId {
        &self.contest_id
    }

    #[must_use]
    pub fn sample_size(&self) -> Option<u32> {
        self.sample_size
    }

    #[must_use]
    pub fn end_measurements(&self) -> Option<&EndMeasurements> {
        self.end_measurements.as_ref()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.end_measurements.is_some_and(|m| m.is_complete)
    }
}

/// One round of ballot sampling and tallying.
///
/// The round number is assigned from the round's position when the owning
/// `Audit` is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Round {
    number: RoundNumber,
    started_at: Option<NaiveDateTime>,
    ended_at: Option<NaiveDateTime>,
    contests: Vec<RoundContest>,
}

impl Round {
    #[must_use]
    pub fn new(contests: Vec<RoundContest>) -> Self {
        Self {
            number: RoundNumber::from_index(0),
            started_at: None,
            ended_at: None,
            contests,
        }
    }

    #[must_use]
    pub fn with_timestamps(
        mut self,
        started_at: Option<NaiveDateTime>,
        ended_at: Option<NaiveDateTime>,
    ) -> Self {
        self.started_at = started_at;
        self.ended_at = ended_at;
        self
    }

    #[must_use]
    pub fn number(&self) -> RoundNumber {
        self.number
    }

    #[must_use]
    pub fn started_at(&self) -> Option<NaiveDateTime> {
        self.started_at
    }

    #[must_use]
    pub fn ended_at(&self) -> Option<NaiveDateTime> {
        self.ended_at
    }

    #[must_use]
    pub fn contests(&self) -> &[RoundContest] {
        &self.contests
    }

    /// The contest scored by this round's calculate action.
    #[must_use]
    pub fn primary_contest(&self) -> Option<&RoundContest> {
        self.contests.first()
    }
}

//
// ─── AUDIT ─────────────────────────────────────────────────────────────────────
//

/// A validated snapshot of the audit state returned by the server.
///
/// Immutable once built; a refetch produces a new value.
#[derive(Debug, Clone, PartialEq)]
pub struct Audit {
    name: Option<String>,
    random_seed: Option<String>,
    risk_limit: u32,
    jurisdictions: Vec<Jurisdiction>,
    contests: Vec<Contest>,
    rounds: Vec<Round>,
}

impl Audit {
    /// Builds an audit, numbering rounds by position.
    ///
    /// # Errors
    ///
    /// Returns `AuditError` when the risk limit is out of range, a round references
    /// a contest that is not declared, or a p-value is not a probability.
    pub fn new(
        risk_limit: u32,
        jurisdictions: Vec<Jurisdiction>,
        contests: Vec<Contest>,
        rounds: Vec<Round>,
    ) -> Result<Self, AuditError> {
        if !(1..=100).contains(&risk_limit) {
            return Err(AuditError::InvalidRiskLimit(risk_limit));
        }

        let mut numbered = Vec::with_capacity(rounds.len());
        for (index, mut round) in rounds.into_iter().enumerate() {
            round.number = RoundNumber::from_index(index);
            for round_contest in &round.contests {
                if !contests.iter().any(|c| c.id() == round_contest.contest_id()) {
                    return Err(AuditError::UnknownContest {
                        round: round.number,
                        contest: round_contest.contest_id().clone(),
                    });
                }
                let pvalue = round_contest.end_measurements().and_then(|m| m.pvalue);
                if let Some(pvalue) = pvalue {
                    if !pvalue.is_finite() || !(0.0..=1.0).contains(&pvalue) {
                        return Err(AuditError::InvalidPValue {
                            round: round.number,
                            pvalue,
                        });
                    }
                }
            }
            numbered.push(round);
        }

        Ok(Self {
            name: None,
            random_seed: None,
            risk_limit,
            jurisdictions,
            contests,
            rounds: numbered,
        })
    }

    #[must_use]
    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    #[must_use]
    pub fn with_random_seed(mut self, random_seed: Option<String>) -> Self {
        self.random_seed = random_seed;
        self
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn random_seed(&self) -> Option<&str> {
        self.random_seed.as_deref()
    }

    /// Risk limit as a whole percentage.
    #[must_use]
    pub fn risk_limit(&self) -> u32 {
        self.risk_limit
    }

    #[must_use]
    pub fn jurisdictions(&self) -> &[Jurisdiction] {
        &self.jurisdictions
    }

    /// The jurisdiction that results are reported for.
    #[must_use]
    pub fn first_jurisdiction(&self) -> Option<&Jurisdiction> {
        self.jurisdictions.first()
    }

    #[must_use]
    pub fn contests(&self) -> &[Contest] {
        &self.contests
    }

    /// The contest whose choices label the results form.
    #[must_use]
    pub fn primary_contest(&self) -> Option<&Contest> {
        self.contests.first()
    }

    #[must_use]
    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    #[must_use]
    pub fn round(&self, number: RoundNumber) -> Option<&Round> {
        self.rounds.get(number.index())
    }

    /// The last round; the only one eligible for result calculation.
    #[must_use]
    pub fn current_round(&self) -> Option<&Round> {
        self.rounds.last()
    }

    #[must_use]
    pub fn is_current_round(&self, number: RoundNumber) -> bool {
        self.current_round().is_some_and(|round| round.number() == number)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
