#![forbid(unsafe_code)]

pub mod api;
pub mod audit_service;
pub mod error;
pub mod results_service;

pub use api::{AuditApi, AuditApiConfig, HttpAuditApi, InMemoryAuditApi};
pub use audit_service::AuditService;
pub use error::{AuditApiError, AuditServiceError, SubmitError};
pub use results_service::{ResultsRequest, RoundResultsService};
