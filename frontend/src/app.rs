use std::cell::RefCell;

use leptos::logging::{error, log};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos::web_sys;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::{Closure, WasmClosure};

use timeline_core::accordion::SectionView;
use timeline_core::glossary::{Dismiss, Rect};
use timeline_core::nav::Transition;
use timeline_core::query::SearchOutcome;
use timeline_core::{AppState, Config};

use crate::dom;
use crate::fetch::load_state;
use crate::pages::{
    glossary::GlossaryPopover,
    home::HomePage,
    query::{SearchBar, SearchResults},
    timeline::TimelinePage,
};
use crate::speech::WebSpeech;

// ── Shared context ───────────────────────────────────────────────────────────

/// Everything the views share. All handles are `Copy`.
#[derive(Clone, Copy)]
pub(crate) struct Ctx {
    pub state: RwSignal<AppState>,
    pub speech: StoredValue<WebSpeech, LocalStorage>,
    /// Raw search input
    pub query: RwSignal<String>,
    pub outcome: RwSignal<SearchOutcome>,
    /// Rendered sections, in first-visit order
    pub built: RwSignal<Vec<SectionView>>,
    /// Term control the popover is attached to
    pub anchor: RwSignal<Option<Rect>>,
    pub debounce: StoredValue<Option<TimeoutHandle>>,
}

impl Ctx {
    /// Run `f` against the state and the speech device together.
    pub fn with_speech<R>(&self, f: impl FnOnce(&mut AppState, &mut WebSpeech) -> R) -> Option<R> {
        let state = self.state;
        self.speech
            .try_update_value(|engine| state.try_update(|s| f(s, engine)))
            .flatten()
    }

    /// Carry out the side effects a view transition asks for.
    pub fn run(&self, t: Transition) {
        if t.clear_query {
            self.cancel_search();
            self.query.set(String::new());
            self.outcome.set(SearchOutcome::Inactive);
        }
        if let Some(section) = t.build_section {
            self.build(section);
        }
        if let Some(target) = t.reveal {
            let ctx = *self;
            request_animation_frame(move || ctx.reveal(&target));
        }
    }

    pub fn cancel_search(&self) {
        if let Some(handle) = self.debounce.get_value() {
            handle.clear();
        }
        self.debounce.set_value(None);
    }

    pub fn search(&self, query: &str) {
        if let Some((outcome, t)) = self.with_speech(|s, e| s.search(e, query)) {
            self.outcome.set(outcome);
            self.run(t);
        }
    }

    pub fn select_section(&self, id: &str) {
        if let Some(t) = self.with_speech(|s, e| s.select_section(e, id)) {
            self.run(t);
        }
    }

    pub fn go_home(&self) {
        if let Some(t) = self.with_speech(|s, e| s.go_home(e)) {
            self.run(t);
        }
    }

    pub fn jump(&self, section: &str, target: &str) {
        if let Some(t) = self.with_speech(|s, e| s.jump_to(e, section, target)) {
            self.run(t);
        }
    }

    pub fn reveal_in_section(&self, section: &str, target: &str) {
        if let Some(t) = self.with_speech(|s, e| s.reveal_in_section(e, section, target)) {
            self.run(t);
        }
    }

    pub fn follow_connection(&self, target: &str) {
        match self.with_speech(|s, e| s.follow_connection(e, target)) {
            Some(Some(t)) => self.run(t),
            _ => log!("connection target {target} is not indexed"),
        }
    }

    /// Build a section on first visit, then report it rendered once the
    /// browser has laid it out.
    fn build(&self, id: String) {
        let view = self.state.with_untracked(|s| s.build_section(&id));
        let non_empty = view.as_ref().is_some_and(|v| !v.is_empty());
        if let Some(view) = view {
            self.built.update(|built| {
                built.retain(|v| v.id != id);
                built.push(view);
            });
        }
        let ctx = *self;
        request_animation_frame(move || {
            let pending = ctx
                .state
                .try_update(|s| s.section_rendered(&id, non_empty))
                .flatten();
            if let Some(target) = pending {
                ctx.reveal(&target);
            }
        });
    }

    /// Open every collapsible above `target`, show its siblings again, then
    /// scroll it into view and highlight it.
    pub fn reveal(&self, target: &str) {
        let Some(section) = self
            .state
            .with_untracked(|s| s.nav.current_section().map(str::to_string))
        else {
            return;
        };
        let ancestors: Vec<String> = self.built.with_untracked(|built| {
            built
                .iter()
                .find(|v| v.id == section)
                .and_then(|v| v.ancestors_of(target))
                .map(|ids| ids.into_iter().map(str::to_string).collect())
                .unwrap_or_default()
        });
        self.state.update(|s| s.prepare_reveal(&section));
        dom::open_details(&ancestors);

        let highlight_ms = self.state.with_untracked(|s| s.config.highlight_ms);
        let target = target.to_string();
        request_animation_frame(move || dom::scroll_and_highlight(&target, highlight_ms));
    }

    pub fn read_entry(&self, section: &str, id: &str) {
        let node = self.built.with_untracked(|built| {
            built
                .iter()
                .find(|v| v.id == section)
                .and_then(|v| v.find(id))
                .cloned()
        });
        if let Some(node) = node {
            self.with_speech(|s, e| s.read_aloud_entry(e, &node));
        }
    }

    /// A stale key still closes whatever popover was open.
    pub fn open_popover(&self, key: &str, anchor: Rect) {
        let opened = self.with_speech(|s, e| s.open_popover(e, key)) == Some(true);
        self.anchor.set(opened.then_some(anchor));
    }

    pub fn dismiss_popover(&self, how: Dismiss) {
        if self.state.with_untracked(|s| s.popover().is_none()) {
            return;
        }
        self.with_speech(|s, e| s.dismiss_popover(e, how));
        self.anchor.set(None);
    }
}

// ── Window listeners ─────────────────────────────────────────────────────────

struct WindowBinding<E: ?Sized> {
    window: web_sys::Window,
    event: &'static str,
    capture: bool,
    _handler: Closure<E>,
}

thread_local! {
    static KEYDOWN_BINDING: RefCell<Option<WindowBinding<dyn Fn(web_sys::KeyboardEvent)>>> =
        const { RefCell::new(None) };
    static OUTSIDE_CLICK_BINDING: RefCell<Option<WindowBinding<dyn Fn(web_sys::MouseEvent)>>> =
        const { RefCell::new(None) };
}

fn unbind<E: ?Sized + WasmClosure>(old: Option<WindowBinding<E>>) {
    if let Some(old) = old {
        old.window
            .remove_event_listener_with_callback_and_bool(
                old.event,
                old._handler.as_ref().unchecked_ref(),
                old.capture,
            )
            .ok();
    }
}

/// Escape and outside clicks close the glossary popover.
fn bind_popover_dismissal(ctx: Ctx) {
    let Some(window) = web_sys::window() else {
        return;
    };

    KEYDOWN_BINDING.with(|slot| unbind(slot.borrow_mut().take()));
    let keydown = Closure::<dyn Fn(web_sys::KeyboardEvent)>::new(move |e: web_sys::KeyboardEvent| {
        if e.key() == "Escape" {
            ctx.dismiss_popover(Dismiss::Escape);
        }
    });
    if window
        .add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())
        .is_ok()
    {
        KEYDOWN_BINDING.with(|slot| {
            *slot.borrow_mut() = Some(WindowBinding {
                window: window.clone(),
                event: "keydown",
                capture: false,
                _handler: keydown,
            });
        });
    }

    // Capture phase: runs before any view handler can re-render the target.
    OUTSIDE_CLICK_BINDING.with(|slot| unbind(slot.borrow_mut().take()));
    let click = Closure::<dyn Fn(web_sys::MouseEvent)>::new(move |e: web_sys::MouseEvent| {
        let inside = dom::closest(e.target(), ".glossary-popover").is_some()
            || dom::closest(e.target(), "button.key-term").is_some();
        if !inside {
            ctx.dismiss_popover(Dismiss::OutsideClick);
        }
    });
    if window
        .add_event_listener_with_callback_and_bool("click", click.as_ref().unchecked_ref(), true)
        .is_ok()
    {
        OUTSIDE_CLICK_BINDING.with(|slot| {
            *slot.borrow_mut() = Some(WindowBinding {
                window: window.clone(),
                event: "click",
                capture: true,
                _handler: click,
            });
        });
    }
}

// ── Components ───────────────────────────────────────────────────────────────

#[component]
pub fn App() -> impl IntoView {
    let loaded: RwSignal<Option<Result<AppState, String>>> = RwSignal::new(None);

    spawn_local(async move {
        let result = load_state(Config::default()).await;
        if let Err(e) = &result {
            error!("content load failed: {e}");
        }
        loaded.set(Some(result));
    });

    view! {
        {move || match loaded.get() {
            None => view! {
                <div id="loader-overlay"><p class="loading">"Loading…"</p></div>
            }.into_any(),
            Some(Err(e)) => view! {
                <div id="app">
                    <p class="error">"Failed to load timeline data: " {e}</p>
                </div>
            }.into_any(),
            Some(Ok(state)) => view! { <Shell state=state/> }.into_any(),
        }}
    }
}

#[component]
fn Shell(state: AppState) -> impl IntoView {
    let state = RwSignal::new(state);
    let speech = StoredValue::new_local(WebSpeech::new(move |token| {
        // Deferred: the device may report while the state is borrowed.
        spawn_local(async move {
            state.update(|s| {
                s.speech_finished(token);
            });
        });
    }));
    let ctx = Ctx {
        state,
        speech,
        query: RwSignal::new(String::new()),
        outcome: RwSignal::new(SearchOutcome::Inactive),
        built: RwSignal::new(Vec::new()),
        anchor: RwSignal::new(None),
        debounce: StoredValue::new(None),
    };
    provide_context(ctx);
    bind_popover_dismissal(ctx);

    let subtitle = state.with_untracked(|s| s.store.part.subtitle.clone());

    view! {
        <div id="app">
            <header>
                <h1>"भारतीय इतिहास"</h1>
                <p id="subtitle">{subtitle}</p>
                <SearchBar/>
            </header>
            <Breadcrumbs/>
            <main id="main-content">
                <HomePage/>
                <TimelinePage/>
                <SearchResults/>
            </main>
            <GlossaryPopover/>
        </div>
    }
}

#[component]
fn Breadcrumbs() -> impl IntoView {
    let ctx = expect_context::<Ctx>();

    view! {
        <nav id="breadcrumb-nav">
            {move || {
                ctx.state
                    .with(|s| s.breadcrumbs())
                    .into_iter()
                    .enumerate()
                    .map(|(i, crumb)| {
                        let separator = (i > 0)
                            .then(|| view! { <span class="breadcrumb-separator">"/"</span> });
                        let item = if crumb.is_home {
                            view! {
                                <button class="breadcrumb-item" on:click=move |_| ctx.go_home()>
                                    {crumb.label}
                                </button>
                            }
                            .into_any()
                        } else {
                            view! { <span class="breadcrumb-item-current">{crumb.label}</span> }
                                .into_any()
                        };
                        view! { {separator} {item} }
                    })
                    .collect_view()
            }}
        </nav>
    }
}
