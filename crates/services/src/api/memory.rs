use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::Notify;

use arlo_core::ResultsPayload;
use arlo_core::model::{Audit, JurisdictionId, RoundNumber};

use super::AuditApi;
use crate::error::AuditApiError;
use crate::results_service::ResultsRequest;

/// In-process `AuditApi` for tests and offline runs.
///
/// Serves a fixed audit, records every submission, and can be told to fail.
#[derive(Clone, Default)]
pub struct InMemoryAuditApi {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    audit: Option<Audit>,
    after_submit: Option<Audit>,
    submissions: Vec<ResultsRequest>,
    fetches: usize,
    submit_failure: Option<String>,
    fetch_failure: Option<String>,
    link_failure: Option<String>,
    submit_gate: Option<Arc<Notify>>,
}

impl InMemoryAuditApi {
    #[must_use]
    pub fn new(audit: Audit) -> Self {
        let api = Self::default();
        api.set_audit(audit);
        api
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_audit(&self, audit: Audit) {
        self.state().audit = Some(audit);
    }

    /// The audit served once the next submission succeeds.
    pub fn set_audit_after_submit(&self, audit: Audit) {
        self.state().after_submit = Some(audit);
    }

    pub fn fail_submissions(&self, message: Option<&str>) {
        self.state().submit_failure = message.map(str::to_string);
    }

    pub fn fail_fetches(&self, message: Option<&str>) {
        self.state().fetch_failure = message.map(str::to_string);
    }

    /// Makes link builders fail with `InvalidBaseUrl(message)`.
    pub fn fail_links(&self, message: Option<&str>) {
        self.state().link_failure = message.map(str::to_string);
    }

    /// Parks submissions until [`Self::release_submissions`] is called.
    pub fn hold_submissions(&self) {
        self.state().submit_gate = Some(Arc::new(Notify::new()));
    }

    pub fn release_submissions(&self) {
        if let Some(gate) = self.state().submit_gate.take() {
            gate.notify_one();
        }
    }

    fn check_links(&self) -> Result<(), AuditApiError> {
        match self.state().link_failure.clone() {
            Some(message) => Err(AuditApiError::InvalidBaseUrl(message)),
            None => Ok(()),
        }
    }

    #[must_use]
    pub fn submissions(&self) -> Vec<ResultsRequest> {
        self.state().submissions.clone()
    }

    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.state().fetches
    }
}

#[async_trait]
impl AuditApi for InMemoryAuditApi {
    async fn fetch_audit(&self) -> Result<Audit, AuditApiError> {
        let mut state = self.state();
        state.fetches += 1;
        if let Some(message) = state.fetch_failure.clone() {
            return Err(AuditApiError::HttpStatus {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message,
            });
        }
        state.audit.clone().ok_or_else(|| AuditApiError::HttpStatus {
            status: StatusCode::NOT_FOUND,
            message: "audit not found".to_string(),
        })
    }

    async fn submit_results(
        &self,
        jurisdiction: &JurisdictionId,
        round: RoundNumber,
        payload: &ResultsPayload,
    ) -> Result<(), AuditApiError> {
        let gate = self.state().submit_gate.clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let mut state = self.state();
        state.submissions.push(ResultsRequest {
            jurisdiction: jurisdiction.clone(),
            round,
            payload: payload.clone(),
        });
        if let Some(message) = state.submit_failure.clone() {
            return Err(AuditApiError::HttpStatus {
                status: StatusCode::BAD_REQUEST,
                message,
            });
        }
        if let Some(next) = state.after_submit.take() {
            state.audit = Some(next);
        }
        Ok(())
    }

    fn retrieval_list_url(
        &self,
        jurisdiction: &JurisdictionId,
        round: RoundNumber,
    ) -> Result<String, AuditApiError> {
        self.check_links()?;
        Ok(format!("memory://jurisdiction/{jurisdiction}/{round}/retrieval-list"))
    }

    fn report_url(&self) -> Result<String, AuditApiError> {
        self.check_links()?;
        Ok("memory://audit/report".to_string())
    }
}
