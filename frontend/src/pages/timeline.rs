use leptos::prelude::*;
use leptos::web_sys;
use wasm_bindgen::JsCast;

use timeline_core::accordion::{AccordionNode, CONNECTIONS_TITLE, SectionView};
use timeline_core::nav::View;
use timeline_core::speech::ControlId;
use timeline_core::timeline_bar::TimelineBar;

use crate::app::Ctx;
use crate::dom;

/// Every section visited so far; only the current one is shown.
#[component]
pub fn TimelinePage() -> impl IntoView {
    let ctx = expect_context::<Ctx>();
    let hidden = move || ctx.state.with(|s| !matches!(s.nav.view(), View::Section(_)));

    // Term controls live inside injected content markup, so clicks are
    // picked up here rather than on each control.
    let on_click = move |ev: web_sys::MouseEvent| {
        let Some(term) = dom::closest(ev.target(), "button.key-term") else {
            return;
        };
        if let Some(key) = term.get_attribute("data-term") {
            ctx.open_popover(&key, dom::rect_of(&term));
        }
    };

    view! {
        <div id="timeline-content" class:hidden=hidden on:click=on_click>
            <For
                each=move || ctx.built.get()
                key=|section| section.id.clone()
                children=move |section| view! { <SectionPanel section=section/> }
            />
            {move || {
                let missing = ctx.state.with(|s| match s.nav.view() {
                    View::Section(id) => s.store.section(id).is_none(),
                    _ => false,
                });
                missing.then(|| view! { <p class="empty">"This timeline has no content."</p> })
            }}
        </div>
    }
}

#[component]
fn SectionPanel(section: SectionView) -> impl IntoView {
    let ctx = expect_context::<Ctx>();
    let id = section.id.clone();
    let hidden = {
        let id = id.clone();
        move || ctx.state.with(|s| s.nav.view() != &View::Section(id.clone()))
    };
    let bar = section.bar.map(|bar| view! { <TimelineBarView section=id.clone() bar=bar/> });

    view! {
        <section id=format!("{id}-section") class="timeline-section" class:hidden=hidden>
            <h3 class="main-section-title">{section.title}</h3>
            {bar}
            {if section.entries.is_empty() {
                view! { <p class="empty">"No entries."</p> }.into_any()
            } else {
                section
                    .entries
                    .into_iter()
                    .map(|node| entry_view(id.clone(), node))
                    .collect_view()
                    .into_any()
            }}
        </section>
    }
}

#[component]
fn TimelineBarView(section: String, bar: TimelineBar) -> impl IntoView {
    let ctx = expect_context::<Ctx>();

    view! {
        <div class="visual-timeline-container" aria-label="Visual timeline">
            <div class="visual-timeline-bar">
                {bar.blocks.into_iter().map(|block| {
                    let label = block.label();
                    let section = section.clone();
                    let target = block.target_id.clone();
                    let title = label.clone();
                    view! {
                        <button
                            class="timeline-block"
                            style=format!("width:{}%;background-color:{};", block.width_pct, block.color)
                            title=title
                            aria-label=format!("Go to {}", block.name)
                            on:click=move |_| ctx.reveal_in_section(&section, &target)
                        >
                            {label}
                        </button>
                    }
                }).collect_view()}
            </div>
        </div>
    }
}

// ── Accordion ────────────────────────────────────────────────────────────────

fn summary_view(node: &AccordionNode) -> AnyView {
    let summary = &node.summary;
    if node.level == 0 {
        let founder = summary.founder.clone().map(|f| view! {
            <span class="meta-item"><strong>"Founder:"</strong> " " {f}</span>
        });
        let capital = summary.capital.clone().map(|c| view! {
            <span class="meta-item"><strong>"Capital:"</strong> " " {c}</span>
        });
        let has_meta = founder.is_some() || capital.is_some();
        view! {
            <div class="summary-content-wrapper">
                <div class="summary-title-line">
                    <span class="summary-title">{summary.title.clone()}</span>
                    {summary.period.clone().map(|p| view! { <span class="dynasty-period">{p}</span> })}
                </div>
                {has_meta.then(|| view! { <div class="dynasty-meta">{founder}{capital}</div> })}
            </div>
        }
        .into_any()
    } else {
        view! {
            <div class="summary-content-wrapper">
                <span class="summary-title">{summary.title.clone()}</span>
                {summary.reign.clone().map(|r| view! { <span class="king-reign">{r}</span> })}
            </div>
        }
        .into_any()
    }
}

fn connections_view(node: &AccordionNode) -> Option<AnyView> {
    if node.connections.is_empty() {
        return None;
    }
    let ctx = expect_context::<Ctx>();
    let tags = node
        .connections
        .iter()
        .map(|c| {
            let target = c.target_id.clone();
            view! {
                <button class="connection-tag" on:click=move |_| ctx.follow_connection(&target)>
                    {c.label.clone()}
                </button>
            }
        })
        .collect_view();
    Some(
        view! {
            <div class="connections-hub">
                <h4 class="connections-title">{CONNECTIONS_TITLE}</h4>
                <div class="connections-tags">{tags}</div>
            </div>
        }
        .into_any(),
    )
}

/// One collapsible entry and, recursively, its children.
fn entry_view(section: String, node: AccordionNode) -> AnyView {
    let ctx = expect_context::<Ctx>();
    let id = node.id.clone();
    let level = node.level;

    let control = ControlId::Entry(id.clone());
    let speaking = move || ctx.state.with(|s| s.speaking() == Some(&control));
    let on_read = {
        let (section, id) = (section.clone(), id.clone());
        move |ev: web_sys::MouseEvent| {
            // The button sits in the summary; keep it from toggling.
            ev.prevent_default();
            ev.stop_propagation();
            ctx.read_entry(&section, &id);
        }
    };

    let focus_hidden = {
        let (section, id) = (section.clone(), id.clone());
        move || level == 0 && ctx.state.with(|s| s.focus.is_hidden(&section, &id))
    };
    let on_toggle = {
        let (section, id) = (section.clone(), id.clone());
        move |target: Option<web_sys::EventTarget>| {
            if level != 0 {
                return;
            }
            let Some(details) = target.and_then(|t| t.dyn_into::<web_sys::HtmlDetailsElement>().ok())
            else {
                return;
            };
            if details.id() == id {
                let open = details.open();
                ctx.state.update(|s| s.focus.on_toggle(&section, &id, open));
            }
        }
    };

    let body = if node.children.is_empty() {
        Some(view! { <div class="entry-body" inner_html=node.content_html()></div> })
    } else {
        None
    };
    let connections = connections_view(&node);
    let summary = summary_view(&node);
    let details_class = node.details_class();
    let summary_class = node.summary_class();
    let content_class = if level == 0 { "dynasty-content" } else { "king-content" };
    let title = node.summary.title.clone();
    let resolved = node.resolved;
    let children = node
        .children
        .into_iter()
        .map(|child| entry_view(section.clone(), child))
        .collect_view();

    view! {
        <details
            id=id
            class=details_class
            class:unresolved=!resolved
            class:focus-hidden=focus_hidden
            data-level=level.to_string()
            on:toggle=move |ev| on_toggle(ev.target())
        >
            <summary class=summary_class>
                {summary}
                <div class="summary-controls">
                    <button
                        class="read-aloud-btn"
                        class:speaking=speaking
                        aria-label=format!("Read {title} aloud")
                        on:click=on_read
                    >
                        "🔊"
                    </button>
                    <span class="arrow-inner" aria-hidden="true">"▶"</span>
                </div>
            </summary>
            <div class=content_class>
                {body}
                {children}
                {connections}
            </div>
        </details>
    }
    .into_any()
}
