use std::sync::Arc;

use services::{AuditService, RoundResultsService};

use crate::platform::LinkOpenerRef;

pub trait UiApp: Send + Sync {
    fn audit_service(&self) -> Arc<AuditService>;
    fn round_results(&self) -> Arc<RoundResultsService>;
    fn link_opener(&self) -> LinkOpenerRef;
}

#[derive(Clone)]
pub struct AppContext {
    audit_service: Arc<AuditService>,
    round_results: Arc<RoundResultsService>,
    link_opener: LinkOpenerRef,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            audit_service: app.audit_service(),
            round_results: app.round_results(),
            link_opener: app.link_opener(),
        }
    }

    #[must_use]
    pub fn audit_service(&self) -> Arc<AuditService> {
        Arc::clone(&self.audit_service)
    }

    #[must_use]
    pub fn round_results(&self) -> Arc<RoundResultsService> {
        Arc::clone(&self.round_results)
    }

    #[must_use]
    pub fn link_opener(&self) -> LinkOpenerRef {
        Arc::clone(&self.link_opener)
    }
}

// Provided by the composition root in `crates/app`.

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
