use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{info, warn};

use arlo_core::model::{Audit, JurisdictionId, RoundNumber};
use arlo_core::{CountPolicy, ResultsForm, ResultsPayload};

use crate::api::AuditApi;
use crate::error::SubmitError;

/// Submits operator-entered tallies for the current round and refetches the audit.
///
/// Tracks outstanding submissions per round, so a slow request for one round
/// never blocks another.
pub struct RoundResultsService {
    api: Arc<dyn AuditApi>,
    policy: CountPolicy,
    in_flight: Arc<Mutex<HashSet<RoundNumber>>>,
}

/// A validated submission, ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsRequest {
    pub jurisdiction: JurisdictionId,
    pub round: RoundNumber,
    pub payload: ResultsPayload,
}

impl RoundResultsService {
    #[must_use]
    pub fn new(api: Arc<dyn AuditApi>, policy: CountPolicy) -> Self {
        Self {
            api,
            policy,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    #[must_use]
    pub fn policy(&self) -> CountPolicy {
        self.policy
    }

    #[must_use]
    pub fn is_submitting(&self, round: RoundNumber) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&round)
    }

    /// Check that `round` accepts results and convert the form into a payload.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError` if the audit has no jurisdiction, the round is unknown,
    /// not current or already complete, or a count is rejected by the policy.
    pub fn prepare(
        &self,
        audit: &Audit,
        round: RoundNumber,
        form: &ResultsForm,
    ) -> Result<ResultsRequest, SubmitError> {
        let jurisdiction = audit
            .first_jurisdiction()
            .ok_or(SubmitError::NoJurisdiction)?
            .id()
            .clone();
        let target = audit.round(round).ok_or(SubmitError::UnknownRound(round))?;
        if !audit.is_current_round(round) {
            return Err(SubmitError::NotCurrentRound(round));
        }
        if target.primary_contest().is_some_and(|c| c.is_complete()) {
            return Err(SubmitError::AlreadyComplete(round));
        }
        let payload = ResultsPayload::from_form(form, self.policy)?;
        Ok(ResultsRequest {
            jurisdiction,
            round,
            payload,
        })
    }

    /// Submit results for `round` and return the refreshed audit.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::prepare`], `SubmitError::InFlight` if the round
    /// already has a submission outstanding, `SubmitError::Api` if the post fails, or
    /// `SubmitError::Refresh` if the post succeeded but the refetch did not.
    pub async fn submit(
        &self,
        audit: &Audit,
        round: RoundNumber,
        form: &ResultsForm,
    ) -> Result<Audit, SubmitError> {
        let request = self.prepare(audit, round, form)?;
        let _guard = InFlightGuard::acquire(&self.in_flight, round)?;

        info!(round = %round, jurisdiction = %request.jurisdiction, "submitting round results");
        if let Err(err) = self
            .api
            .submit_results(&request.jurisdiction, round, &request.payload)
            .await
        {
            warn!(round = %round, error = %err, "round results rejected");
            return Err(err.into());
        }

        info!(round = %round, "round results recorded");
        self.api.fetch_audit().await.map_err(|source| {
            warn!(round = %round, error = %source, "audit refresh after submission failed");
            SubmitError::Refresh { round, source }
        })
    }
}

/// Marks a round as in flight until dropped.
struct InFlightGuard {
    rounds: Arc<Mutex<HashSet<RoundNumber>>>,
    round: RoundNumber,
}

impl InFlightGuard {
    fn acquire(
        rounds: &Arc<Mutex<HashSet<RoundNumber>>>,
        round: RoundNumber,
    ) -> Result<Self, SubmitError> {
        let inserted = rounds
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(round);
        if !inserted {
            return Err(SubmitError::InFlight(round));
        }
        Ok(Self {
            rounds: Arc::clone(rounds),
            round,
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.rounds
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.round);
    }
}
