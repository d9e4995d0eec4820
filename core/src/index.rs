//! Flat search index over every entry in every section.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::markup;
use crate::model::*;
use crate::store::ContentStore;

pub const PATH_SEPARATOR: &str = " > ";

/// One indexed entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRecord {
    /// Anchor to navigate to; id-less entries carry their nearest ancestor's
    pub id: String,
    pub title: String,
    /// Lowercased title, founder, capital and content text
    pub text: String,
    /// "Section > Dynasty > Ruler"
    pub path: String,
    /// Owning section
    pub timeline_id: String,
}

impl SearchRecord {
    /// First path component: the section's display name.
    pub fn section_label(&self) -> &str {
        self.path.split(PATH_SEPARATOR).next().unwrap_or(&self.path)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchIndex {
    records: Vec<SearchRecord>,
}

impl SearchIndex {
    /// Flatten the whole store, sections in menu order, entries depth-first.
    pub fn rebuild(store: &ContentStore) -> Self {
        let mut records = Vec::new();
        for section_id in store.section_ids() {
            let Some(body) = store.section(section_id) else {
                continue;
            };
            let root_path = vec![body.display_title().to_string()];
            for (i, entry) in body.items.iter().enumerate() {
                let fallback = format!("{section_id}-{i}");
                traverse(store, section_id, entry, &root_path, &fallback, &mut records);
            }
        }
        debug!(records = records.len(), "rebuilt search index");
        SearchIndex { records }
    }

    pub fn records(&self) -> &[SearchRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First record carrying `id`.
    pub fn find(&self, id: &str) -> Option<&SearchRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Section that owns the entry `id`.
    pub fn section_of(&self, id: &str) -> Option<&str> {
        self.find(id).map(|r| r.timeline_id.as_str())
    }
}

fn traverse(
    store: &ContentStore,
    section_id: &str,
    entry: &Entry,
    path: &[String],
    parent_id: &str,
    out: &mut Vec<SearchRecord>,
) {
    let id = entry.id.as_deref().unwrap_or(parent_id);
    let mut current_path = path.to_vec();
    current_path.push(entry.summary.title.clone());

    out.push(SearchRecord {
        id: id.to_string(),
        title: entry.summary.title.clone(),
        text: searchable_text(entry),
        path: current_path.join(PATH_SEPARATOR),
        timeline_id: section_id.to_string(),
    });

    for sub in &entry.sub_items {
        match sub {
            SubItem::Inline(child) => traverse(store, section_id, child, &current_path, id, out),
            SubItem::Ref(key) => {
                // Dangling references render as stubs but are not searchable.
                if let Some(record) = store.resolve_child(key) {
                    traverse(store, section_id, &record.with_id(key), &current_path, id, out);
                }
            }
        }
    }
}

/// Lowercased "title founder X capital Y content".
pub fn searchable_text(entry: &Entry) -> String {
    let founder = entry
        .summary
        .founder
        .as_deref()
        .map(|f| format!("founder {f}"))
        .unwrap_or_default();
    let capital = entry
        .summary
        .capital
        .as_deref()
        .map(|c| format!("capital {c}"))
        .unwrap_or_default();
    let content = entry
        .content
        .as_deref()
        .map(|html| markup::text_content(&markup::parse(html)))
        .unwrap_or_default();
    format!("{} {founder} {capital} {content}", entry.summary.title).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> ContentStore {
        let mut store = ContentStore::default();
        store.part = serde_json::from_value(json!({
            "timelineCards": [{"target": "ancient", "title": "A"}]
        }))
        .unwrap();
        store.dynasty = serde_json::from_value(json!({
            "ancient": {"title": "प्राचीन (Ancient India)", "items": [
                {"id": "maurya", "summary": {"title": "Maurya Empire", "founder": "Chandragupta", "capital": "Pataliputra"},
                 "subItems": ["maurya-ashoka", "ghost", {"summary": {"title": "Inline Event"}, "content": "<p>A <b>battle</b></p>"}]}
            ]}
        }))
        .unwrap();
        store.kings = serde_json::from_value(json!({
            "maurya-ashoka": {"summary": {"title": "Ashoka"}, "content": "<p>Edicts &amp; Dharma</p>"}
        }))
        .unwrap();
        store
    }

    #[test]
    fn test_records_in_document_order() {
        let index = SearchIndex::rebuild(&store());
        let titles: Vec<&str> = index.records().iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Maurya Empire", "Ashoka", "Inline Event"]);
    }

    #[test]
    fn test_text_includes_meta_and_flattened_content() {
        let index = SearchIndex::rebuild(&store());
        assert_eq!(
            index.records()[0].text,
            "maurya empire founder chandragupta capital pataliputra "
        );
        assert_eq!(index.records()[1].text, "ashoka   edicts & dharma");
        assert_eq!(index.records()[2].text, "inline event   a battle");
    }

    #[test]
    fn test_path_and_section() {
        let index = SearchIndex::rebuild(&store());
        let ashoka = index.find("maurya-ashoka").unwrap();
        assert_eq!(ashoka.path, "Ancient India > Maurya Empire > Ashoka");
        assert_eq!(ashoka.section_label(), "Ancient India");
        assert_eq!(index.section_of("maurya-ashoka"), Some("ancient"));
    }

    #[test]
    fn test_id_less_child_inherits_ancestor_id() {
        let index = SearchIndex::rebuild(&store());
        assert_eq!(index.records()[2].id, "maurya");
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        let store = store();
        assert_eq!(SearchIndex::rebuild(&store), SearchIndex::rebuild(&store));
    }

    #[test]
    fn test_dangling_reference_not_indexed() {
        let index = SearchIndex::rebuild(&store());
        assert!(index.find("ghost").is_none());
        assert_eq!(index.len(), 3);
    }
}
