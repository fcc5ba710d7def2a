use dioxus::prelude::*;
use dioxus_router::{Outlet, Routable};

use crate::views::AuditView;

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", AuditView)] Audit {},
}

#[component]
fn Layout() -> Element {
    rsx! {
        div { class: "app",
            header { class: "topbar",
                h1 { "Arlo" }
                span { class: "topbar-subtitle", "Risk-limiting audit" }
            }
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}
