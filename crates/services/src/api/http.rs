use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::{debug, info, warn};
use url::Url;

use arlo_core::ResultsPayload;
use arlo_core::model::{Audit, JurisdictionId, RoundNumber};

use super::AuditApi;
use super::wire::{AuditStatusDto, ErrorBody};
use crate::error::AuditApiError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const BASE_URL_VAR: &str = "ARLO_BASE_URL";
pub const TIMEOUT_SECS_VAR: &str = "ARLO_TIMEOUT_SECS";

#[derive(Clone, Debug)]
pub struct AuditApiConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

impl AuditApiConfig {
    /// # Errors
    ///
    /// Returns `AuditApiError::InvalidBaseUrl` unless `base_url` is an absolute
    /// http(s) URL.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AuditApiError> {
        let invalid = || AuditApiError::InvalidBaseUrl(base_url.to_string());
        let parsed = Url::parse(base_url.trim()).map_err(|_| invalid())?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid());
        }
        Ok(Self {
            base_url: parsed,
            timeout,
        })
    }

    /// Reads `ARLO_BASE_URL` and `ARLO_TIMEOUT_SECS`, falling back to defaults when unset.
    ///
    /// # Errors
    ///
    /// Returns `AuditApiError::InvalidBaseUrl` or `AuditApiError::InvalidTimeout` if a
    /// variable is set but unusable.
    pub fn from_env() -> Result<Self, AuditApiError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`Self::from_env`], reading values through `lookup`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AuditApiError> {
        let base_url = lookup(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let timeout = match lookup(TIMEOUT_SECS_VAR) {
            Some(raw) => parse_timeout_secs(&raw)?,
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };
        Self::new(&base_url, timeout)
    }
}

/// Parses a positive number of seconds.
///
/// # Errors
///
/// Returns `AuditApiError::InvalidTimeout` for zero or non-numeric input.
pub fn parse_timeout_secs(raw: &str) -> Result<Duration, AuditApiError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(AuditApiError::InvalidTimeout(raw.to_string())),
    }
}

/// `AuditApi` over HTTP with JSON bodies.
#[derive(Clone)]
pub struct HttpAuditApi {
    client: Client,
    config: AuditApiConfig,
}

impl HttpAuditApi {
    /// # Errors
    ///
    /// Returns `AuditApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: AuditApiConfig) -> Result<Self, AuditApiError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &AuditApiConfig {
        &self.config
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, AuditApiError> {
        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| AuditApiError::InvalidBaseUrl(self.config.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn results_endpoint(
        &self,
        jurisdiction: &JurisdictionId,
        round: RoundNumber,
    ) -> Result<Url, AuditApiError> {
        let round = round.to_string();
        self.endpoint(&["jurisdiction", jurisdiction.as_str(), &round, "results"])
    }
}

async fn ensure_success(response: Response) -> Result<Response, AuditApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = ErrorBody::first_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or(status.as_str())
            .to_string()
    });
    warn!(%status, %message, "audit API request failed");
    Err(AuditApiError::HttpStatus { status, message })
}

#[async_trait]
impl AuditApi for HttpAuditApi {
    async fn fetch_audit(&self) -> Result<Audit, AuditApiError> {
        let url = self.endpoint(&["audit", "status"])?;
        debug!(%url, "fetching audit status");
        let response = ensure_success(self.client.get(url).send().await?).await?;
        let status: AuditStatusDto = response.json().await?;
        let audit = status.into_audit()?;
        info!(rounds = audit.rounds().len(), "audit status loaded");
        Ok(audit)
    }

    async fn submit_results(
        &self,
        jurisdiction: &JurisdictionId,
        round: RoundNumber,
        payload: &ResultsPayload,
    ) -> Result<(), AuditApiError> {
        let url = self.results_endpoint(jurisdiction, round)?;
        debug!(%url, "posting round results");
        ensure_success(self.client.post(url).json(payload).send().await?).await?;
        Ok(())
    }

    fn retrieval_list_url(
        &self,
        jurisdiction: &JurisdictionId,
        round: RoundNumber,
    ) -> Result<String, AuditApiError> {
        let round = round.to_string();
        self.endpoint(&["jurisdiction", jurisdiction.as_str(), &round, "retrieval-list"])
            .map(String::from)
    }

    fn report_url(&self) -> Result<String, AuditApiError> {
        self.endpoint(&["audit", "report"]).map(String::from)
    }
}
