//! Entry tree → collapsible accordion tree.

use tracing::{debug, warn};

use crate::glossary::GlossaryMatcher;
use crate::markup::{self, Markup};
use crate::model::*;
use crate::speech::collapse_whitespace;
use crate::store::ContentStore;
use crate::timeline_bar::TimelineBar;

/// Number of cyclic ruler colours.
pub const COLOR_CYCLE: usize = 12;

/// Heading of the related-topics block.
pub const CONNECTIONS_TITLE: &str = "Related Topics:";

// ── Colour coding ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorCategory {
    /// 1..=12
    Cycle(u8),
    /// The final ruler in a list
    Last,
    InvasionIranian,
    InvasionGreek,
}

impl ColorCategory {
    pub fn class_name(&self) -> String {
        match self {
            ColorCategory::Cycle(n) => format!("king-color-{n}"),
            ColorCategory::Last => "king-color-last".to_string(),
            ColorCategory::InvasionIranian => TAG_INVASION_IRANIAN.to_string(),
            ColorCategory::InvasionGreek => TAG_INVASION_GREEK.to_string(),
        }
    }
}

/// Colour for an entry at `index` among `sibling_count` siblings.
///
/// Level-0 entries are never coloured. Ruler entries cycle through twelve
/// categories, except the last sibling, which always takes `Last`. The two
/// invasion tags override either.
pub fn color_category(
    entry: &Entry,
    level: usize,
    index: usize,
    sibling_count: usize,
) -> Option<ColorCategory> {
    if level == 0 {
        return None;
    }
    let mut color = None;
    if entry.has_tag(TAG_RULER) {
        color = Some(if index + 1 == sibling_count {
            ColorCategory::Last
        } else {
            ColorCategory::Cycle((index % COLOR_CYCLE) as u8 + 1)
        });
    }
    if entry.has_tag(TAG_INVASION_IRANIAN) {
        color = Some(ColorCategory::InvasionIranian);
    }
    if entry.has_tag(TAG_INVASION_GREEK) {
        color = Some(ColorCategory::InvasionGreek);
    }
    color
}

// ── Tree ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct AccordionNode {
    /// DOM anchor id: the source id, or `{parent}-{index}` when absent
    pub id: String,
    pub level: usize,
    pub summary: Summary,
    pub color: Option<ColorCategory>,
    pub enhanced: bool,
    /// False for "Unknown" stubs standing in for a dangling reference
    pub resolved: bool,
    /// Annotated content blob; empty when the entry has children
    pub content: Vec<Markup>,
    pub children: Vec<AccordionNode>,
    pub connections: Vec<Connection>,
}

impl AccordionNode {
    pub fn details_class(&self) -> String {
        if self.level == 0 {
            return "dynasty-details".to_string();
        }
        let mut class = "king-details".to_string();
        if self.enhanced {
            class.push(' ');
            class.push_str(TAG_ENHANCED_PROFILE);
        }
        if let Some(color) = self.color {
            class.push(' ');
            class.push_str(&color.class_name());
        }
        class
    }

    pub fn summary_class(&self) -> &'static str {
        if self.level == 0 {
            "dynasty-summary"
        } else {
            "king-summary"
        }
    }

    pub fn content_html(&self) -> String {
        markup::to_html(&self.content)
    }

    pub fn find(&self, id: &str) -> Option<&AccordionNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    /// Ids from this node down to (excluding) `target`, or `None` when the
    /// target is not in this subtree.
    pub fn ancestors_of(&self, target: &str) -> Option<Vec<&str>> {
        if self.id == target {
            return Some(Vec::new());
        }
        self.children.iter().find_map(|child| {
            child.ancestors_of(target).map(|mut path| {
                path.insert(0, self.id.as_str());
                path
            })
        })
    }

    /// Text read aloud for this entry: its expandable region without the
    /// nested headings, whitespace collapsed.
    pub fn read_aloud_text(&self) -> String {
        let mut parts = Vec::new();
        self.collect_body(&mut parts);
        collapse_whitespace(&parts.join(" "))
    }

    fn collect_body(&self, parts: &mut Vec<String>) {
        parts.push(markup::text_content(&self.content));
        for child in &self.children {
            child.collect_body(parts);
        }
        if !self.connections.is_empty() {
            parts.push(CONNECTIONS_TITLE.to_string());
            parts.extend(self.connections.iter().map(|c| c.label.clone()));
        }
    }
}

/// A section ready to mount: heading, timeline bar and level-0 entries.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionView {
    pub id: String,
    pub title: String,
    pub bar: Option<TimelineBar>,
    pub entries: Vec<AccordionNode>,
}

impl SectionView {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&AccordionNode> {
        self.entries.iter().find_map(|e| e.find(id))
    }

    /// Every collapsible that must be open for `target` to be visible,
    /// outermost first.
    pub fn ancestors_of(&self, target: &str) -> Option<Vec<&str>> {
        self.entries.iter().find_map(|e| e.ancestors_of(target))
    }
}

// ── Builder ──────────────────────────────────────────────────────────────

pub struct AccordionBuilder<'a> {
    store: &'a ContentStore,
    matcher: Option<&'a GlossaryMatcher>,
}

impl<'a> AccordionBuilder<'a> {
    pub fn new(store: &'a ContentStore) -> Self {
        Self {
            store,
            matcher: None,
        }
    }

    /// Annotate content blobs with glossary terms while building.
    pub fn with_glossary(mut self, matcher: &'a GlossaryMatcher) -> Self {
        self.matcher = Some(matcher);
        self
    }

    pub fn build(
        &self,
        entry: &Entry,
        level: usize,
        index: usize,
        sibling_count: usize,
    ) -> AccordionNode {
        self.build_node(entry, level, index, sibling_count, "item")
    }

    pub fn build_section(&self, section_id: &str) -> Option<SectionView> {
        let body = self.store.section(section_id)?;
        let count = body.items.len();
        let entries: Vec<AccordionNode> = body
            .items
            .iter()
            .enumerate()
            .map(|(i, entry)| self.build_node(entry, 0, i, count, section_id))
            .collect();
        debug!(section = section_id, entries = entries.len(), "built section");
        Some(SectionView {
            id: section_id.to_string(),
            title: body.title.clone(),
            bar: self.store.timeline_span(section_id).and_then(TimelineBar::build),
            entries,
        })
    }

    fn build_node(
        &self,
        entry: &Entry,
        level: usize,
        index: usize,
        sibling_count: usize,
        parent_id: &str,
    ) -> AccordionNode {
        let id = entry
            .id
            .clone()
            .unwrap_or_else(|| format!("{parent_id}-{index}"));

        let count = entry.sub_items.len();
        let children: Vec<AccordionNode> = entry
            .sub_items
            .iter()
            .enumerate()
            .map(|(i, sub)| match sub {
                SubItem::Inline(child) => self.build_node(child, level + 1, i, count, &id),
                SubItem::Ref(key) => match self.store.resolve_child(key) {
                    Some(record) => {
                        self.build_node(&record.with_id(key), level + 1, i, count, &id)
                    }
                    None => {
                        warn!(reference = %key, parent = %id, "unresolved sub-item reference");
                        let mut stub =
                            self.build_node(&Entry::unknown(key), level + 1, i, count, &id);
                        stub.resolved = false;
                        stub
                    }
                },
            })
            .collect();

        // Children replace the content blob in the expandable region.
        let content = match (&entry.content, children.is_empty()) {
            (Some(html), true) => {
                let nodes = markup::parse(html);
                match self.matcher {
                    Some(m) => m.annotate(nodes),
                    None => nodes,
                }
            }
            _ => Vec::new(),
        };

        let connections = entry
            .id
            .as_deref()
            .map(|id| self.store.connections_for(id).to_vec())
            .unwrap_or_default();

        AccordionNode {
            color: color_category(entry, level, index, sibling_count),
            enhanced: level > 0 && entry.has_tag(TAG_ENHANCED_PROFILE),
            resolved: true,
            summary: entry.summary.clone(),
            content,
            children,
            connections,
            level,
            id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ruler(title: &str) -> Entry {
        serde_json::from_value(json!({"summary": {"title": title}, "type": "king-details"})).unwrap()
    }

    fn store() -> ContentStore {
        let mut store = ContentStore::default();
        store.kings = serde_json::from_value(json!({
            "maurya-chandragupta": {"summary": {"title": "Chandragupta", "reign": "322–298 BCE"}, "type": "king-details", "content": "<p>Founder</p>"},
            "maurya-ashoka": {"summary": {"title": "Ashoka"}, "type": "king-details enhanced-profile", "content": "<p>Dharma</p>"}
        }))
        .unwrap();
        store.other = serde_json::from_value(json!({
            "kalinga-war": {"summary": {"title": "Kalinga War"}, "content": "<p>261 BCE</p>"}
        }))
        .unwrap();
        store.dynasty = serde_json::from_value(json!({
            "ancient": {"title": "प्राचीन (Ancient India)", "items": [
                {"id": "maurya", "summary": {"title": "Maurya"}, "subItems": ["maurya-chandragupta", "kalinga-war", "ghost", "maurya-ashoka"]},
                {"summary": {"title": "Untitled era"}, "content": "<p>Notes</p>"}
            ]}
        }))
        .unwrap();
        store.connections = serde_json::from_value(json!({
            "maurya-chandragupta": [{"label": "See also Ashoka", "targetId": "maurya-ashoka"}]
        }))
        .unwrap();
        store
    }

    // ── colour ───────────────────────────────────────────────────────

    #[test]
    fn test_last_ruler_takes_terminal_color() {
        for n in [1usize, 2, 12, 13, 25] {
            let entries: Vec<Entry> = (0..n).map(|i| ruler(&format!("R{i}"))).collect();
            for (i, e) in entries.iter().enumerate() {
                let color = color_category(e, 1, i, n);
                if i == n - 1 {
                    assert_eq!(color, Some(ColorCategory::Last), "n={n}");
                } else {
                    assert_eq!(color, Some(ColorCategory::Cycle((i % 12) as u8 + 1)), "n={n} i={i}");
                }
            }
        }
    }

    #[test]
    fn test_level_zero_and_untagged_uncoloured() {
        assert_eq!(color_category(&ruler("R"), 0, 0, 3), None);
        assert_eq!(color_category(&Entry::default(), 1, 0, 3), None);
    }

    #[test]
    fn test_invasion_tags_override() {
        let e: Entry = serde_json::from_value(
            json!({"summary": {"title": "X"}, "type": ["king-details", "invasion-type-greek"]}),
        )
        .unwrap();
        assert_eq!(color_category(&e, 1, 4, 5), Some(ColorCategory::InvasionGreek));
        let e: Entry = serde_json::from_value(
            json!({"summary": {"title": "Y"}, "type": "invasion-type-iranian"}),
        )
        .unwrap();
        assert_eq!(color_category(&e, 2, 0, 1), Some(ColorCategory::InvasionIranian));
    }

    #[test]
    fn test_class_names() {
        assert_eq!(ColorCategory::Cycle(3).class_name(), "king-color-3");
        assert_eq!(ColorCategory::Last.class_name(), "king-color-last");
    }

    // ── build ────────────────────────────────────────────────────────

    #[test]
    fn test_build_section_resolves_references() {
        let store = store();
        let view = AccordionBuilder::new(&store).build_section("ancient").unwrap();
        let maurya = &view.entries[0];
        let titles: Vec<&str> = maurya.children.iter().map(|c| c.summary.title.as_str()).collect();
        assert_eq!(titles, vec!["Chandragupta", "Kalinga War", "Unknown", "Ashoka"]);
        assert_eq!(maurya.children[2].id, "ghost");
        assert!(!maurya.children[2].resolved);
        assert!(maurya.children[3].enhanced);
        assert_eq!(maurya.children[3].color, Some(ColorCategory::Last));
        assert_eq!(maurya.children[0].color, Some(ColorCategory::Cycle(1)));
        assert_eq!(maurya.children[1].color, None);
        assert_eq!(
            maurya.children[3].details_class(),
            "king-details enhanced-profile king-color-last"
        );
    }

    #[test]
    fn test_generated_ids_are_stable() {
        let store = store();
        let builder = AccordionBuilder::new(&store);
        let first = builder.build_section("ancient").unwrap();
        let second = builder.build_section("ancient").unwrap();
        assert_eq!(first.entries[1].id, "ancient-1");
        assert_eq!(first, second);
    }

    #[test]
    fn test_connections_attached_by_id() {
        let store = store();
        let view = AccordionBuilder::new(&store).build_section("ancient").unwrap();
        let chandragupta = view.find("maurya-chandragupta").unwrap();
        assert_eq!(chandragupta.connections[0].target_id, "maurya-ashoka");
        assert!(view.find("maurya-ashoka").unwrap().connections.is_empty());
    }

    #[test]
    fn test_content_annotated_with_glossary() {
        let store = store();
        let matcher = GlossaryMatcher::new(["Dharma"]).unwrap();
        let view = AccordionBuilder::new(&store)
            .with_glossary(&matcher)
            .build_section("ancient")
            .unwrap();
        let ashoka = view.find("maurya-ashoka").unwrap();
        assert_eq!(ashoka.content_html(), r#"<p><button class="key-term" data-term="Dharma">Dharma</button></p>"#);
    }

    #[test]
    fn test_ancestors_of() {
        let store = store();
        let view = AccordionBuilder::new(&store).build_section("ancient").unwrap();
        assert_eq!(view.ancestors_of("maurya-ashoka"), Some(vec!["maurya"]));
        assert_eq!(view.ancestors_of("maurya"), Some(vec![]));
        assert_eq!(view.ancestors_of("nowhere"), None);
        assert_eq!(view.ancestors_of("kalinga-war").map(|a| a[0]), Some("maurya"));
    }

    #[test]
    fn test_read_aloud_text_skips_nested_titles() {
        let store = store();
        let view = AccordionBuilder::new(&store).build_section("ancient").unwrap();
        assert_eq!(
            view.entries[0].read_aloud_text(),
            "Founder Related Topics: See also Ashoka 261 BCE Dharma"
        );
    }

    #[test]
    fn test_build_single_entry() {
        let store = store();
        let node = AccordionBuilder::new(&store).build(&ruler("Solo"), 1, 0, 1);
        assert_eq!(node.id, "item-0");
        assert_eq!(node.color, Some(ColorCategory::Last));
    }

    #[test]
    fn test_missing_section() {
        assert!(AccordionBuilder::new(&store()).build_section("medieval").is_none());
    }
}
