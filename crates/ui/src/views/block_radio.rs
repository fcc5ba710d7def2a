use arlo_core::model::Vote;
use dioxus::prelude::*;
use tracing::warn;

/// One selectable vote option. Exclusivity comes from the shared `name`.
///
/// `locked` is accepted for call-site compatibility and does not change rendering
/// or input handling.
#[component]
pub fn BlockRadio(
    name: String,
    value: Vote,
    #[props(default)] checked: bool,
    #[props(default)] locked: bool,
    #[props(default)] gray: bool,
    #[props(default)] class: Option<String>,
    on_change: Option<Callback<Vote>>,
) -> Element {
    let _ = locked;
    let extra = class.unwrap_or_default();
    let checked_class = if checked { "checked" } else { "" };
    let indicator_class = if gray {
        "block-radio-indicator gray"
    } else {
        "block-radio-indicator"
    };

    rsx! {
        label { class: "block-radio {checked_class} {extra}",
            input {
                r#type: "radio",
                name: "{name}",
                value: "{value}",
                "data-testid": "{value}",
                checked,
                onchange: move |evt: FormEvent| {
                    let Some(handler) = on_change else {
                        return;
                    };
                    match evt.value().parse::<Vote>() {
                        Ok(vote) => handler.call(vote),
                        Err(err) => warn!(error = %err, "ignoring unknown vote value"),
                    }
                },
            }
            span { class: "{indicator_class}",
                span { class: "radio-text", "{value}" }
            }
        }
    }
}

/// A radio group with one `BlockRadio` per vote value.
#[component]
pub fn VoteGroup(
    name: String,
    selected: Option<Vote>,
    #[props(default)] locked: bool,
    on_change: Callback<Vote>,
) -> Element {
    rsx! {
        div { class: "vote-group",
            for vote in Vote::ALL {
                BlockRadio {
                    key: "{vote}",
                    name: name.clone(),
                    value: vote,
                    checked: selected == Some(vote),
                    locked,
                    gray: vote == Vote::NoVote,
                    on_change,
                }
            }
        }
    }
}
