#[cfg(test)]
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
#[cfg(test)]
use std::rc::Rc;

use arlo_core::model::{Audit, RoundNumber};
use arlo_core::{ChoiceSlot, ResultsForm, RoundPhase};
use dioxus::prelude::*;
use tracing::warn;

use crate::context::AppContext;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{RoundCardVm, map_round_cards};

/// Operator actions on the audit page.
#[derive(Clone, Debug, PartialEq)]
pub enum AuditIntent {
    EditCount {
        round: RoundNumber,
        slot: ChoiceSlot,
        value: String,
    },
    Calculate(RoundNumber),
    DownloadRound(RoundNumber),
    DownloadReport,
    DismissNotice,
}

#[component]
pub fn AuditView() -> Element {
    let ctx = use_context::<AppContext>();
    let audits = ctx.audit_service();
    let round_results = ctx.round_results();
    let link_opener = ctx.link_opener();

    let mut resource = use_resource(move || {
        let audits = audits.clone();
        async move {
            audits
                .fetch_audit()
                .await
                .map_err(|err| ViewError::from_error(&err))
        }
    });

    // Latest audit returned by a submission; takes precedence over the resource.
    let mut refreshed = use_signal(|| None::<Audit>);
    let mut forms = use_signal(HashMap::<RoundNumber, ResultsForm>::new);
    let submitting = use_signal(HashSet::<RoundNumber>::new);
    let mut notice = use_signal(|| None::<String>);

    let state = match refreshed() {
        Some(audit) => ViewState::Ready(audit),
        None => view_state_from_resource(resource),
    };

    let on_count_change = use_callback(
        move |(round, slot, value): (RoundNumber, ChoiceSlot, String)| {
            let next = forms
                .peek()
                .get(&round)
                .cloned()
                .unwrap_or_default()
                .with_count(slot, value);
            forms.write().insert(round, next);
        },
    );

    let on_calculate = {
        let round_results = round_results.clone();
        use_callback(move |round: RoundNumber| {
            let Some(audit) = latest_audit(refreshed, resource) else {
                return;
            };
            let form = forms.peek().get(&round).cloned().unwrap_or_default();
            let round_results = round_results.clone();
            let mut submitting = submitting;
            let mut refreshed = refreshed;
            let mut forms = forms;
            let mut notice = notice;
            let mut resource = resource;
            submitting.write().insert(round);
            notice.set(None);
            spawn(async move {
                match round_results.submit(&audit, round, &form).await {
                    Ok(next) => {
                        forms.write().remove(&round);
                        refreshed.set(Some(next));
                    }
                    Err(err) if err.results_recorded() => {
                        warn!(
                            round = %round,
                            error = %err,
                            "round results recorded without refresh"
                        );
                        forms.write().remove(&round);
                        notice.set(Some(err.to_string()));
                        refreshed.set(None);
                        resource.restart();
                    }
                    Err(err) => {
                        warn!(round = %round, error = %err, "round results not recorded");
                        notice.set(Some(err.to_string()));
                    }
                }
                submitting.write().remove(&round);
            });
        })
    };

    let on_download_round = {
        let audits = ctx.audit_service();
        let link_opener = link_opener.clone();
        use_callback(move |round: RoundNumber| {
            let Some(audit) = latest_audit(refreshed, resource) else {
                return;
            };
            match audits.retrieval_list_url(&audit, round) {
                Ok(url) => link_opener.open_url(&url),
                Err(err) => {
                    warn!(round = %round, error = %err, "retrieval list unavailable");
                    notice.set(Some(err.to_string()));
                }
            }
        })
    };

    let on_download_report = {
        let audits = ctx.audit_service();
        let link_opener = link_opener.clone();
        use_callback(move |()| {
            match audits.report_url() {
                Ok(url) => link_opener.open_url(&url),
                Err(err) => {
                    warn!(error = %err, "audit report unavailable");
                    notice.set(Some(err.to_string()));
                }
            }
            refreshed.set(None);
            resource.restart();
        })
    };

    let dispatch = use_callback(move |intent: AuditIntent| match intent {
        AuditIntent::EditCount { round, slot, value } => {
            on_count_change.call((round, slot, value));
        }
        AuditIntent::Calculate(round) => on_calculate.call(round),
        AuditIntent::DownloadRound(round) => on_download_round.call(round),
        AuditIntent::DownloadReport => on_download_report.call(()),
        AuditIntent::DismissNotice => notice.set(None),
    });

    #[cfg(test)]
    {
        let mut registered = use_signal(|| false);
        if !registered() {
            registered.set(true);
            if let Some(handles) = try_consume_context::<AuditTestHandles>() {
                handles.register(dispatch);
            }
        }
    }

    let notice_message = notice();

    rsx! {
        div { class: "page audit-page",
            if let Some(message) = notice_message {
                div { class: "notice", role: "alert",
                    span { "{message}" }
                    button {
                        r#type: "button",
                        "aria-label": "Dismiss",
                        onclick: move |_| dispatch.call(AuditIntent::DismissNotice),
                        "×"
                    }
                }
            }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(audit) => {
                    let cards = map_round_cards(&audit);
                    let in_flight = submitting();
                    let forms_value = forms();
                    rsx! {
                        if let Some(name) = audit.name() {
                            h2 { "{name}" }
                        }
                        if cards.is_empty() {
                            p { class: "muted", "No rounds have started yet." }
                        }
                        for card in cards {
                            RoundCard {
                                key: "{card.number}",
                                submitting: in_flight.contains(&card.number),
                                form: forms_value.get(&card.number).cloned().unwrap_or_default(),
                                card: card.clone(),
                                on_count_change,
                                on_calculate,
                                on_download_round,
                                on_download_report,
                            }
                        }
                    }
                },
                ViewState::Error(err) => rsx! {
                    p { class: "notice", "{err.message()}" }
                },
            }
        }
    }
}

#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct AuditTestHandles {
    dispatch: Rc<RefCell<Option<Callback<AuditIntent>>>>,
}

#[cfg(test)]
impl AuditTestHandles {
    pub(crate) fn register(&self, dispatch: Callback<AuditIntent>) {
        *self.dispatch.borrow_mut() = Some(dispatch);
    }

    pub(crate) fn dispatch(&self) -> Callback<AuditIntent> {
        (*self.dispatch.borrow()).expect("audit dispatch registered")
    }
}

fn latest_audit(
    refreshed: Signal<Option<Audit>>,
    resource: Resource<Result<Audit, ViewError>>,
) -> Option<Audit> {
    if let Some(audit) = refreshed.peek().as_ref() {
        return Some(audit.clone());
    }
    resource
        .value()
        .peek()
        .as_ref()
        .and_then(|result| result.as_ref().ok())
        .cloned()
}

#[component]
fn RoundCard(
    card: RoundCardVm,
    form: ResultsForm,
    submitting: bool,
    on_count_change: Callback<(RoundNumber, ChoiceSlot, String)>,
    on_calculate: Callback<RoundNumber>,
    on_download_round: Callback<RoundNumber>,
    on_download_report: Callback<()>,
) -> Element {
    let number = card.number;
    let [first_label, second_label] = card.choice_labels.clone();
    let first_value = form.value(ChoiceSlot::First).to_string();
    let second_value = form.value(ChoiceSlot::Second).to_string();
    let first_name = format!("round-{number}-{}", ChoiceSlot::First.key());
    let second_name = format!("round-{number}-{}", ChoiceSlot::Second.key());
    let phase_class = match card.state.phase(submitting) {
        RoundPhase::Pending => "pending",
        RoundPhase::Ready => "ready",
        RoundPhase::Submitting => "submitting",
        RoundPhase::Complete => "complete",
    };

    rsx! {
        section { class: "round-card {phase_class}",
            h3 { "{card.title}" }
            if let Some(timeline) = card.timeline_label.clone() {
                p { class: "muted", "{timeline}" }
            }

            p { class: "section-label", "Ballot Retrieval List" }
            p { class: "ballots", "{card.ballots_label}" }
            button {
                class: "secondary",
                r#type: "button",
                onclick: move |_| on_download_round.call(number),
                "{card.download_label}"
            }

            p { class: "section-label", "{card.results_label}" }
            p { class: "muted", "{card.results_description}" }
            div { class: "results-inputs",
                label {
                    span { "{first_label}" }
                    input {
                        r#type: "text",
                        name: "{first_name}",
                        value: "{first_value}",
                        oninput: move |evt: FormEvent| {
                            on_count_change.call((number, ChoiceSlot::First, evt.value()));
                        },
                    }
                }
                label {
                    span { "{second_label}" }
                    input {
                        r#type: "text",
                        name: "{second_name}",
                        value: "{second_value}",
                        oninput: move |evt: FormEvent| {
                            on_count_change.call((number, ChoiceSlot::Second, evt.value()));
                        },
                    }
                }
            }

            if submitting {
                p { class: "loading", "Loading..." }
            } else if card.show_calculate_button {
                button {
                    class: "primary",
                    r#type: "button",
                    onclick: move |_| on_calculate.call(number),
                    "Calculate Risk Measurement"
                }
            }

            if let Some(completion) = card.completion.clone() {
                div { class: "completion",
                    p { strong { "{completion.status_label}" } }
                    p { "{completion.risk_limit_label}" }
                    p { "{completion.pvalue_label}" }
                    button {
                        class: "primary",
                        r#type: "button",
                        onclick: move |_| on_download_report.call(()),
                        "Download Audit Report"
                    }
                }
            }
        }
    }
}
