use std::sync::Arc;

use tracing::{info, warn};

use arlo_core::model::{Audit, RoundNumber};

use crate::api::AuditApi;
use crate::error::AuditServiceError;

/// Read-side access to the audit: status, retrieval lists and the final report.
#[derive(Clone)]
pub struct AuditService {
    api: Arc<dyn AuditApi>,
}

impl AuditService {
    #[must_use]
    pub fn new(api: Arc<dyn AuditApi>) -> Self {
        Self { api }
    }

    /// Fetch the latest audit state.
    ///
    /// # Errors
    ///
    /// Returns `AuditServiceError::Api` if the request fails or the response is rejected.
    pub async fn fetch_audit(&self) -> Result<Audit, AuditServiceError> {
        match self.api.fetch_audit().await {
            Ok(audit) => {
                info!(rounds = audit.rounds().len(), "audit refreshed");
                Ok(audit)
            }
            Err(err) => {
                warn!(error = %err, "audit refresh failed");
                Err(err.into())
            }
        }
    }

    /// Where to download the ballot retrieval list for `round`.
    ///
    /// Lists are scoped to the audit's first jurisdiction.
    ///
    /// # Errors
    ///
    /// Returns `AuditServiceError::NoJurisdiction` if the audit has no jurisdictions.
    pub fn retrieval_list_url(
        &self,
        audit: &Audit,
        round: RoundNumber,
    ) -> Result<String, AuditServiceError> {
        let jurisdiction = audit
            .first_jurisdiction()
            .ok_or(AuditServiceError::NoJurisdiction)?;
        Ok(self.api.retrieval_list_url(jurisdiction.id(), round)?)
    }

    /// Where to download the audit report.
    ///
    /// # Errors
    ///
    /// Returns `AuditServiceError::Api` if the address cannot be built.
    pub fn report_url(&self) -> Result<String, AuditServiceError> {
        Ok(self.api.report_url()?)
    }
}
