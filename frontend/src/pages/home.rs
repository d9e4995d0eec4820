use leptos::prelude::*;

use timeline_core::nav::View;

use crate::app::Ctx;

/// The section menu, one card per timeline.
#[component]
pub fn HomePage() -> impl IntoView {
    let ctx = expect_context::<Ctx>();
    let cards = ctx.state.with_untracked(|s| s.store.part.timeline_cards.clone());
    let hidden = move || ctx.state.with(|s| s.nav.view() != &View::Home);

    view! {
        <div id="timeline-selection" class:hidden=hidden>
            {if cards.is_empty() {
                view! { <p class="empty">"No timelines available."</p> }.into_any()
            } else {
                cards.into_iter().map(|card| {
                    let target = card.target.clone();
                    let on_key = {
                        let target = target.clone();
                        move |ev: leptos::web_sys::KeyboardEvent| {
                            if ev.key() == "Enter" || ev.key() == " " {
                                ev.prevent_default();
                                ctx.select_section(&target);
                            }
                        }
                    };
                    let aria_label = format!("Select timeline: {}", card.subtitle);
                    view! {
                        <div
                            class="timeline-card"
                            role="button"
                            tabindex="0"
                            aria-label=aria_label
                            on:click=move |_| ctx.select_section(&target)
                            on:keydown=on_key
                        >
                            <span class="timeline-title">{card.title}</span>
                            <span class="timeline-subtitle">{card.subtitle}</span>
                            <span class="timeline-period">{card.period}</span>
                        </div>
                    }
                }).collect_view().into_any()
            }}
        </div>
    }
}
