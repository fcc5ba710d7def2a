use std::sync::{Arc, Mutex};
use std::time::Duration;

use arlo_core::CountPolicy;
use arlo_core::model::Audit;
use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use services::{AuditService, InMemoryAuditApi, RoundResultsService};

use crate::context::{UiApp, build_app_context};
use crate::platform::{LinkOpenerRef, UiLinkOpener};
use crate::views::{AuditIntent, AuditTestHandles, AuditView};

#[derive(Default)]
pub struct RecordingLinkOpener {
    opened: Mutex<Vec<String>>,
}

impl RecordingLinkOpener {
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

impl UiLinkOpener for RecordingLinkOpener {
    fn open_url(&self, url: &str) {
        self.opened.lock().unwrap().push(url.to_string());
    }
}

struct TestApp {
    audit_service: Arc<AuditService>,
    round_results: Arc<RoundResultsService>,
    link_opener: Arc<RecordingLinkOpener>,
}

impl UiApp for TestApp {
    fn audit_service(&self) -> Arc<AuditService> {
        Arc::clone(&self.audit_service)
    }

    fn round_results(&self) -> Arc<RoundResultsService> {
        Arc::clone(&self.round_results)
    }

    fn link_opener(&self) -> LinkOpenerRef {
        self.link_opener.clone()
    }
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    handles: AuditTestHandles,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.handles.clone());
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    rsx! { AuditView {} }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub api: InMemoryAuditApi,
    pub link_opener: Arc<RecordingLinkOpener>,
    pub handles: AuditTestHandles,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(Duration::from_millis(50), self.dom.wait_for_work()).await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Rebuild and let the audit fetch resolve.
    pub async fn settle(&mut self) {
        self.rebuild();
        self.drive().await;
    }

    /// Send an intent to the mounted view, as a click would.
    pub fn dispatch(&mut self, intent: AuditIntent) {
        let dispatch = self.handles.dispatch();
        self.dom.in_runtime(|| dispatch.call(intent));
    }

    /// Let spawned work and any resource restarts finish.
    pub async fn drive(&mut self) {
        for _ in 0..4 {
            self.drive_async().await;
        }
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn setup_view_harness(audit: Option<Audit>) -> ViewHarness {
    let api = audit.map_or_else(InMemoryAuditApi::default, InMemoryAuditApi::new);
    let shared: Arc<InMemoryAuditApi> = Arc::new(api.clone());
    let link_opener = Arc::new(RecordingLinkOpener::default());

    let app = Arc::new(TestApp {
        audit_service: Arc::new(AuditService::new(shared.clone())),
        round_results: Arc::new(RoundResultsService::new(shared, CountPolicy::Strict)),
        link_opener: Arc::clone(&link_opener),
    });

    let handles = AuditTestHandles::default();
    let dom = VirtualDom::new_with_props(
        ViewRouterHarness,
        ViewHarnessProps {
            app,
            handles: handles.clone(),
        },
    );

    ViewHarness {
        dom,
        api,
        link_opener,
        handles,
    }
}
