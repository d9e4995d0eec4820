use leptos::html;
use leptos::prelude::*;
use leptos::web_sys;

use timeline_core::glossary::{Dismiss, content_max_height, is_truncated, place_popover};
use timeline_core::speech::ControlId;

use crate::app::Ctx;
use crate::dom;

/// The single glossary popover, positioned against its term control.
///
/// The stylesheet clamps `.glossary-popover-content` itself, so the measured
/// element is always the clamped one. "Learn More" lifts the clamp with an
/// explicit `max-height` of the full content height.
#[component]
pub fn GlossaryPopover() -> impl IntoView {
    let ctx = expect_context::<Ctx>();
    let root: NodeRef<html::Div> = NodeRef::new();
    let body: NodeRef<html::Div> = NodeRef::new();
    let position: RwSignal<Option<(f64, f64)>> = RwSignal::new(None);
    let truncated = RwSignal::new(false);
    let full_height: RwSignal<Option<f64>> = RwSignal::new(None);

    let open = Memo::new(move |_| {
        ctx.state.with(|s| {
            s.popover_term()
                .map(|(popover, term)| (popover.clone(), term.clone()))
        })
    });

    // Measure after the popover is laid out, then place it. Re-runs when a
    // different term opens or the language switches.
    Effect::new(move |_| {
        let shown = open.with(|o| o.as_ref().map(|(p, _)| (p.term.clone(), p.lang)));
        let anchor = ctx.anchor.get();
        position.set(None);
        let (Some(_), Some(anchor)) = (shown, anchor) else {
            return;
        };
        request_animation_frame(move || {
            let Some(el) = root.get_untracked() else {
                return;
            };
            let size = dom::rect_of(&el);
            let (gap, margin) = ctx
                .state
                .with_untracked(|s| (s.config.popover_gap, s.config.popover_margin));
            position.set(Some(place_popover(
                anchor,
                (size.width, size.height),
                dom::viewport(),
                gap,
                margin,
            )));
            if let Some(content) = body.get_untracked() {
                let scroll = f64::from(content.scroll_height());
                full_height.set(Some(scroll));
                truncated.set(is_truncated(scroll, f64::from(content.client_height())));
            }
        });
    });

    let speaking = move || {
        ctx.state.with(|s| {
            matches!((s.speaking(), s.popover()),
                (Some(ControlId::Glossary(k)), Some(p)) if *k == p.term)
        })
    };

    move || {
        open.get().map(|(popover, term)| {
            let expanded = popover.expanded;
            let definition = format!("<p>{}</p>", popover.definition(&term));
            view! {
                <div
                    class="glossary-popover"
                    class:visible=move || position.get().is_some()
                    node_ref=root
                    style:left=move || position.get().map(|(l, _)| format!("{l}px")).unwrap_or_default()
                    style:top=move || position.get().map(|(_, t)| format!("{t}px")).unwrap_or_default()
                >
                    <div class="glossary-popover-header">
                        <div class="glossary-titles">
                            <h3 class="glossary-popover-title">{popover.title(&term).to_string()}</h3>
                        </div>
                        <div class="glossary-controls">
                            <button
                                class="language-toggle"
                                on:click=move |_| ctx.state.update(|s| s.toggle_popover_language())
                            >
                                {popover.toggle_label()}
                            </button>
                            <button
                                class="read-aloud-btn"
                                class:speaking=speaking
                                aria-label="Read definition"
                                on:click=move |_: web_sys::MouseEvent| {
                                    ctx.with_speech(|s, e| s.read_aloud_glossary(e));
                                }
                            >
                                "🔊"
                            </button>
                            <button
                                class="glossary-popover-close"
                                aria-label="Close"
                                on:click=move |_| ctx.dismiss_popover(Dismiss::CloseButton)
                            >
                                "×"
                            </button>
                        </div>
                    </div>
                    <div
                        class="glossary-popover-content"
                        class:is-truncated=move || truncated.get() && !expanded
                        style:max-height={
                            let popover = popover.clone();
                            move || content_max_height(&popover, full_height.get()).unwrap_or_default()
                        }
                        node_ref=body
                        inner_html=definition
                    ></div>
                    <Show when=move || truncated.get() && !expanded>
                        <button
                            class="glossary-learn-more"
                            on:click=move |_| ctx.state.update(|s| s.expand_popover())
                        >
                            "Learn More"
                        </button>
                    </Show>
                </div>
            }
        })
    }
}
