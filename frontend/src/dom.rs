//! Thin DOM helpers: geometry reads, collapsible opening, scroll + highlight.

use std::time::Duration;

use leptos::logging::warn;
use leptos::prelude::*;
use leptos::web_sys;
use wasm_bindgen::JsCast;

use timeline_core::glossary::{Rect, Viewport};

pub const HIGHLIGHT_CLASS: &str = "highlight-search-target";

fn document() -> Option<web_sys::Document> {
    web_sys::window()?.document()
}

pub fn rect_of(el: &web_sys::Element) -> Rect {
    let r = el.get_bounding_client_rect();
    Rect {
        left: r.left(),
        top: r.top(),
        width: r.width(),
        height: r.height(),
    }
}

pub fn viewport() -> Viewport {
    let Some(window) = web_sys::window() else {
        return Viewport::default();
    };
    let dim = |v: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
        v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
    };
    Viewport {
        width: dim(window.inner_width()),
        height: dim(window.inner_height()),
        scroll_y: window.scroll_y().unwrap_or(0.0),
    }
}

/// Nearest ancestor-or-self of the event target matching `selector`.
pub fn closest(target: Option<web_sys::EventTarget>, selector: &str) -> Option<web_sys::Element> {
    target?
        .dyn_into::<web_sys::Element>()
        .ok()?
        .closest(selector)
        .ok()
        .flatten()
}

/// Open the given collapsibles, outermost first.
pub fn open_details<S: AsRef<str>>(ids: &[S]) {
    let Some(document) = document() else {
        return;
    };
    for id in ids {
        if let Some(details) = document
            .get_element_by_id(id.as_ref())
            .and_then(|el| el.dyn_into::<web_sys::HtmlDetailsElement>().ok())
        {
            details.set_open(true);
        }
    }
}

/// Scroll `target` to the viewport centre and highlight it for a while.
pub fn scroll_and_highlight(target: &str, highlight_ms: u32) {
    let Some(el) = document().and_then(|d| d.get_element_by_id(target)) else {
        warn!("navigation target #{target} is not in the document");
        return;
    };
    let options = web_sys::ScrollIntoViewOptions::new();
    options.set_behavior(web_sys::ScrollBehavior::Smooth);
    options.set_block(web_sys::ScrollLogicalPosition::Center);
    el.scroll_into_view_with_scroll_into_view_options(&options);

    let _ = el.class_list().add_1(HIGHLIGHT_CLASS);
    set_timeout(
        move || {
            let _ = el.class_list().remove_1(HIGHLIGHT_CLASS);
        },
        Duration::from_millis(highlight_ms.into()),
    );
}
