use serde::{Deserialize, Serialize};

// ── part.json ────────────────────────────────────────────────────────────

/// The home-menu manifest: page chrome text plus one card per section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartManifest {
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub search_placeholder: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breadcrumb_home: Option<String>,
    #[serde(default)]
    pub timeline_cards: Vec<TimelineCard>,
}

/// A selectable section card on the home menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineCard {
    /// Section id in `dynasty.json`
    pub target: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub period: String,
}

// ── dynasty.json ─────────────────────────────────────────────────────────

/// One section body: its heading and ordered level-0 entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionBody {
    pub title: String,
    #[serde(default)]
    pub items: Vec<Entry>,
}

impl SectionBody {
    /// Short display name used in breadcrumbs and search paths.
    ///
    /// Titles are written as "प्राचीन भारत (Ancient India)"; the
    /// parenthesised part is the display name. Titles without one are
    /// used whole.
    pub fn display_title(&self) -> &str {
        display_name(&self.title)
    }
}

pub(crate) fn display_name(title: &str) -> &str {
    let Some((_, rest)) = title.split_once('(') else {
        return title;
    };
    let inner = rest.split(')').next().unwrap_or(rest).trim();
    if inner.is_empty() { title } else { inner }
}

/// Heading metadata shown in an entry's collapsible summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub founder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capital: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reign: Option<String>,
}

/// The `type` field: authored either as one class-like string or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeTags {
    One(String),
    Many(Vec<String>),
}

impl TypeTags {
    /// A single string matches by substring (so "king-details enhanced-profile"
    /// carries both tags); a list matches by element.
    pub fn includes(&self, tag: &str) -> bool {
        match self {
            TypeTags::One(s) => s.contains(tag),
            TypeTags::Many(tags) => tags.iter().any(|t| t == tag),
        }
    }
}

/// A child slot: a reference into `kings.json`/`other.json`, or an inline entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubItem {
    Ref(String),
    Inline(Box<Entry>),
}

/// A dynasty, ruler or event at any nesting level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub summary: Summary,
    /// Rich-text (HTML fragment) body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(
        default,
        rename = "subItems",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub sub_items: Vec<SubItem>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub tags: Option<TypeTags>,
}

pub const TAG_RULER: &str = "king-details";
pub const TAG_INVASION_IRANIAN: &str = "invasion-type-iranian";
pub const TAG_INVASION_GREEK: &str = "invasion-type-greek";
pub const TAG_ENHANCED_PROFILE: &str = "enhanced-profile";

pub const UNKNOWN_TITLE: &str = "Unknown";

impl Entry {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.as_ref().is_some_and(|t| t.includes(tag))
    }

    /// Placeholder for a sub-item reference that resolves to nothing.
    pub fn unknown(id: &str) -> Self {
        Entry {
            id: Some(id.to_string()),
            summary: Summary {
                title: UNKNOWN_TITLE.to_string(),
                ..Summary::default()
            },
            ..Entry::default()
        }
    }

    /// The record as stored in a dictionary, with its key as id.
    pub fn with_id(&self, id: &str) -> Self {
        Entry {
            id: Some(id.to_string()),
            ..self.clone()
        }
    }

    pub fn title(&self) -> &str {
        &self.summary.title
    }
}

// ── Glossary.json ────────────────────────────────────────────────────────

/// A glossary definition in Hindi (primary) and English (secondary).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlossaryTerm {
    pub title_hi: String,
    pub title_en: String,
    pub definition_hi: String,
    pub definition_en: String,
}

// ── ConnectionsData.json ─────────────────────────────────────────────────

/// A labelled "related topic" link to another entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub label: String,
    pub target_id: String,
}

// ── TimelineData.json ────────────────────────────────────────────────────

/// Year span of a section and the sub-ranges drawn on its timeline bar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineSpan {
    pub start: i32,
    pub end: i32,
    #[serde(default)]
    pub dynasties: Vec<TimelineRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineRange {
    pub name: String,
    pub start: i32,
    pub end: i32,
    #[serde(default)]
    pub color: String,
    /// Entry id the block navigates to
    pub details_id: String,
}
