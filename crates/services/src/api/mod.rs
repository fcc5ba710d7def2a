mod http;
mod memory;
pub mod wire;

use async_trait::async_trait;

use arlo_core::ResultsPayload;
use arlo_core::model::{Audit, JurisdictionId, RoundNumber};

use crate::error::AuditApiError;

pub use http::{
    AuditApiConfig, BASE_URL_VAR, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, HttpAuditApi,
    TIMEOUT_SECS_VAR, parse_timeout_secs,
};
pub use memory::InMemoryAuditApi;

/// Contract for the external audit server.
#[async_trait]
pub trait AuditApi: Send + Sync {
    /// Fetch and validate the current audit state.
    ///
    /// # Errors
    ///
    /// Returns `AuditApiError` if the request fails or the response is rejected.
    async fn fetch_audit(&self) -> Result<Audit, AuditApiError>;

    /// Record audited results for one round of one jurisdiction.
    ///
    /// # Errors
    ///
    /// Returns `AuditApiError` if the request fails or the server refuses the results.
    async fn submit_results(
        &self,
        jurisdiction: &JurisdictionId,
        round: RoundNumber,
        payload: &ResultsPayload,
    ) -> Result<(), AuditApiError>;

    /// Address of the ballot retrieval list for a round, meant to be opened externally.
    ///
    /// # Errors
    ///
    /// Returns `AuditApiError::InvalidBaseUrl` if the address cannot be built.
    fn retrieval_list_url(
        &self,
        jurisdiction: &JurisdictionId,
        round: RoundNumber,
    ) -> Result<String, AuditApiError>;

    /// Address of the audit report, meant to be opened externally.
    ///
    /// # Errors
    ///
    /// Returns `AuditApiError::InvalidBaseUrl` if the address cannot be built.
    fn report_url(&self) -> Result<String, AuditApiError>;
}
