use std::time::Duration;

use leptos::prelude::*;

use timeline_core::nav::View;
use timeline_core::query::{NO_RESULTS, SearchHit, SearchOutcome};

use crate::app::Ctx;

/// Search input; evaluation waits for a quiet period after the last keystroke.
#[component]
pub fn SearchBar() -> impl IntoView {
    let ctx = expect_context::<Ctx>();
    let (placeholder, debounce_ms) = ctx.state.with_untracked(|s| {
        (
            s.store.part.search_placeholder.clone(),
            s.config.search_debounce_ms,
        )
    });

    let on_input = move |ev| {
        let value = event_target_value(&ev);
        ctx.query.set(value.clone());
        ctx.cancel_search();
        let handle = set_timeout_with_handle(
            move || {
                ctx.debounce.set_value(None);
                ctx.search(&value);
            },
            Duration::from_millis(debounce_ms.into()),
        )
        .ok();
        ctx.debounce.set_value(handle);
    };

    view! {
        <div class="search-row">
            <input
                id="search-bar"
                type="search"
                placeholder=placeholder
                prop:value=move || ctx.query.get()
                on:input=on_input
            />
        </div>
    }
}

fn hit_view(ctx: Ctx, hit: SearchHit) -> impl IntoView {
    let SearchHit { record, snippet } = hit;
    let section_label = record.section_label().to_string();
    let (section, target) = (record.timeline_id.clone(), record.id.clone());

    view! {
        <button class="search-result-item" on:click=move |_| ctx.jump(&section, &target)>
            <div class="search-result-path">{section_label}</div>
            <div class="search-result-title">{record.title}</div>
            <div class="search-result-snippet">
                {snippet.pieces.into_iter().map(|piece| {
                    if piece.highlighted {
                        view! { <mark>{piece.text}</mark> }.into_any()
                    } else {
                        piece.text.into_any()
                    }
                }).collect_view()}
            </div>
        </button>
    }
}

#[component]
pub fn SearchResults() -> impl IntoView {
    let ctx = expect_context::<Ctx>();
    let hidden = move || {
        ctx.state
            .with(|s| !matches!(s.nav.view(), View::SearchResults { .. }))
    };

    view! {
        <div id="search-results-container" class:hidden=hidden>
            {move || match ctx.outcome.get() {
                SearchOutcome::Inactive => view! { <span/> }.into_any(),
                SearchOutcome::Results(hits) if hits.is_empty() => {
                    view! { <p class="empty">{NO_RESULTS}</p> }.into_any()
                }
                SearchOutcome::Results(hits) => {
                    let count = hits.len();
                    view! {
                        <div>
                            <p class="search-count">{count} " results"</p>
                            {hits.into_iter().map(|hit| hit_view(ctx, hit)).collect_view()}
                        </div>
                    }
                    .into_any()
                }
            }}
        </div>
    }
}
