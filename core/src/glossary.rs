//! Glossary term annotation and the single lookup popover.

use std::collections::BTreeMap;

use regex::Regex;

use crate::config::Config;
use crate::markup::{self, Markup};
use crate::model::GlossaryTerm;

// ── Term matcher ─────────────────────────────────────────────────────────

/// Word-boundary, case-sensitive matcher over every glossary key.
///
/// Keys are literal strings: each is escaped before being joined into one
/// alternation, longest first so "Maurya Empire" wins over "Maurya". A
/// boundary is only required at an edge where the key has a word character,
/// so keys like "C++" still match before a space.
#[derive(Debug, Clone)]
pub struct GlossaryMatcher {
    regex: Option<Regex>,
}

impl GlossaryMatcher {
    pub fn new<'a>(keys: impl IntoIterator<Item = &'a str>) -> Result<Self, regex::Error> {
        let mut keys: Vec<&str> = keys.into_iter().filter(|k| !k.is_empty()).collect();
        if keys.is_empty() {
            return Ok(Self { regex: None });
        }
        keys.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
        keys.dedup();

        let word = Regex::new(r"^\w$")?;
        let is_word = |c: Option<char>| c.is_some_and(|c| word.is_match(c.encode_utf8(&mut [0; 4])));
        let alternation: Vec<String> = keys
            .iter()
            .map(|k| {
                let pre = if is_word(k.chars().next()) { r"\b" } else { "" };
                let post = if is_word(k.chars().last()) { r"\b" } else { "" };
                format!("{pre}{}{post}", regex::escape(k))
            })
            .collect();
        let regex = Regex::new(&format!("(?:{})", alternation.join("|")))?;
        Ok(Self { regex: Some(regex) })
    }

    pub fn from_glossary(glossary: &BTreeMap<String, GlossaryTerm>) -> Result<Self, regex::Error> {
        Self::new(glossary.keys().map(String::as_str))
    }

    /// Split a text run into plain text and term nodes.
    pub fn split_text(&self, text: &str) -> Vec<Markup> {
        let Some(regex) = &self.regex else {
            return vec![Markup::Text(text.to_string())];
        };
        let mut out = Vec::new();
        let mut last = 0;
        for m in regex.find_iter(text) {
            if m.start() > last {
                out.push(Markup::Text(text[last..m.start()].to_string()));
            }
            out.push(Markup::Term(m.as_str().to_string()));
            last = m.end();
        }
        if last < text.len() || out.is_empty() {
            out.push(Markup::Text(text[last..].to_string()));
        }
        out
    }

    /// Rewrite every term occurrence in the tree's text nodes into a term
    /// node. Existing term controls are left untouched, so annotating twice
    /// gives the same tree.
    pub fn annotate(&self, nodes: Vec<Markup>) -> Vec<Markup> {
        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            match node {
                Markup::Text(text) => out.extend(self.split_text(&text)),
                node if node.is_term_control() => out.push(node),
                Markup::Element {
                    tag,
                    attrs,
                    children,
                } => out.push(Markup::Element {
                    tag,
                    attrs,
                    children: self.annotate(children),
                }),
                Markup::Term(key) => out.push(Markup::Term(key)),
            }
        }
        out
    }

    /// Parse, annotate and re-serialize an HTML fragment.
    pub fn annotate_html(&self, html: &str) -> String {
        markup::to_html(&self.annotate(markup::parse(html)))
    }
}

// ── Popover ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lang {
    /// Hindi
    #[default]
    Primary,
    /// English
    Secondary,
}

/// The one open glossary popover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popover {
    pub term: String,
    pub lang: Lang,
    /// Set once "Learn More" removed the height clamp.
    pub expanded: bool,
}

impl Popover {
    /// A popover for `key`, or `None` when the key has no glossary entry.
    pub fn open(glossary: &BTreeMap<String, GlossaryTerm>, key: &str) -> Option<Self> {
        glossary.contains_key(key).then(|| Popover {
            term: key.to_string(),
            lang: Lang::Primary,
            expanded: false,
        })
    }

    pub fn toggle_language(&mut self) {
        self.lang = match self.lang {
            Lang::Primary => Lang::Secondary,
            Lang::Secondary => Lang::Primary,
        };
    }

    pub fn expand(&mut self) {
        self.expanded = true;
    }

    pub fn title<'a>(&self, term: &'a GlossaryTerm) -> &'a str {
        match self.lang {
            Lang::Primary => &term.title_hi,
            Lang::Secondary => &term.title_en,
        }
    }

    pub fn definition<'a>(&self, term: &'a GlossaryTerm) -> &'a str {
        match self.lang {
            Lang::Primary => &term.definition_hi,
            Lang::Secondary => &term.definition_en,
        }
    }

    /// Label of the toggle: names the language it switches *to*.
    pub fn toggle_label(&self) -> &'static str {
        match self.lang {
            Lang::Primary => "En",
            Lang::Secondary => "हिं",
        }
    }

    pub fn speech_lang<'a>(&self, config: &'a Config) -> &'a str {
        match self.lang {
            Lang::Primary => &config.primary_lang,
            Lang::Secondary => &config.secondary_lang,
        }
    }
}

/// How a popover was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dismiss {
    CloseButton,
    /// A click outside the popover and outside every term control
    OutsideClick,
    Escape,
}

// ── Placement ────────────────────────────────────────────────────────────

/// A viewport-relative box, as from `getBoundingClientRect`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_y: f64,
}

/// Document position (`left`, `top`) for a popover of `size` anchored to
/// the term control at `anchor`.
///
/// Default is below the control, left edges aligned. A popover that would
/// cross the viewport's right margin is pulled left; one that would cross
/// the viewport bottom is flipped above the control.
pub fn place_popover(
    anchor: Rect,
    size: (f64, f64),
    viewport: Viewport,
    gap: f64,
    margin: f64,
) -> (f64, f64) {
    let (width, height) = size;
    let mut left = anchor.left;
    let mut top = anchor.bottom() + viewport.scroll_y + gap;

    if left + width > viewport.width - margin {
        left = viewport.width - width - margin;
    }
    if anchor.bottom() + gap + height > viewport.height {
        top = anchor.top + viewport.scroll_y - height - gap;
    }
    (left, top)
}

/// Whether the clamped definition hides content ("Learn More" shown).
pub fn is_truncated(scroll_height: f64, client_height: f64) -> bool {
    scroll_height > client_height
}

/// Inline `max-height` for the definition. The clamp stays until the
/// popover is expanded, which opens it to the measured full height.
pub fn content_max_height(popover: &Popover, scroll_height: Option<f64>) -> Option<String> {
    scroll_height
        .filter(|_| popover.expanded)
        .map(|h| format!("{h}px"))
}
