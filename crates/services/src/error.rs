//! Shared error types for the services crate.

use thiserror::Error;

use arlo_core::model::RoundNumber;
use arlo_core::{AuditError, CountError};

/// Errors emitted by `AuditApi` implementations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuditApiError {
    #[error("invalid audit API base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("invalid request timeout: {0:?} (expected a positive number of seconds)")]
    InvalidTimeout(String),
    #[error("{message}")]
    HttpStatus {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("audit response rejected: {0}")]
    Invalid(#[from] AuditError),
}

/// Errors emitted by `AuditService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuditServiceError {
    #[error("audit has no jurisdiction")]
    NoJurisdiction,
    #[error(transparent)]
    Api(#[from] AuditApiError),
}

/// Errors emitted by `RoundResultsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SubmitError {
    #[error("audit has no jurisdiction to report results for")]
    NoJurisdiction,
    #[error("round {0} does not exist")]
    UnknownRound(RoundNumber),
    #[error("round {0} is not the current round")]
    NotCurrentRound(RoundNumber),
    #[error("round {0} is already complete")]
    AlreadyComplete(RoundNumber),
    #[error("results for round {0} are already being submitted")]
    InFlight(RoundNumber),
    #[error(transparent)]
    Count(#[from] CountError),
    #[error(transparent)]
    Api(#[from] AuditApiError),
    #[error("round {round} results were recorded but the audit refresh failed: {source}")]
    Refresh {
        round: RoundNumber,
        source: AuditApiError,
    },
}

impl SubmitError {
    /// Whether the server accepted the results despite the error.
    #[must_use]
    pub fn results_recorded(&self) -> bool {
        matches!(self, Self::Refresh { .. })
    }
}
