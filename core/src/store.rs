use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ContentError;
use crate::model::*;

pub const PART_DOC: &str = "part.json";
pub const DYNASTY_DOC: &str = "dynasty.json";
pub const KINGS_DOC: &str = "kings.json";
pub const OTHER_DOC: &str = "other.json";
pub const GLOSSARY_DOC: &str = "Glossary.json";
pub const CONNECTIONS_DOC: &str = "ConnectionsData.json";
pub const TIMELINE_DOC: &str = "TimelineData.json";

/// Every document the store is assembled from, in load order.
pub const DOCUMENTS: [&str; 7] = [
    PART_DOC,
    DYNASTY_DOC,
    KINGS_DOC,
    OTHER_DOC,
    GLOSSARY_DOC,
    CONNECTIONS_DOC,
    TIMELINE_DOC,
];

pub const DEFAULT_HOME_LABEL: &str = "Home";

/// In-memory copy of the reference data. Loaded once, never mutated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentStore {
    pub part: PartManifest,
    pub dynasty: BTreeMap<String, SectionBody>,
    pub kings: HashMap<String, Entry>,
    pub other: HashMap<String, Entry>,
    pub glossary: BTreeMap<String, GlossaryTerm>,
    pub connections: HashMap<String, Vec<Connection>>,
    pub timeline_data: HashMap<String, TimelineSpan>,
}

impl ContentStore {
    /// Load all seven documents from a content directory.
    pub fn load_dir(dir: &Path) -> Result<Self, ContentError> {
        Ok(ContentStore {
            part: read_document(dir, PART_DOC)?,
            dynasty: read_document(dir, DYNASTY_DOC)?,
            kings: read_document(dir, KINGS_DOC)?,
            other: read_document(dir, OTHER_DOC)?,
            glossary: read_document(dir, GLOSSARY_DOC)?,
            connections: read_document(dir, CONNECTIONS_DOC)?,
            timeline_data: read_document(dir, TIMELINE_DOC)?,
        })
    }

    /// Section ids in menu order: cards first, then any section bodies the
    /// manifest does not list, by id.
    pub fn section_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .part
            .timeline_cards
            .iter()
            .map(|c| c.target.as_str())
            .filter(|id| self.dynasty.contains_key(*id))
            .collect();
        for id in self.dynasty.keys() {
            if !ids.contains(&id.as_str()) {
                ids.push(id.as_str());
            }
        }
        ids
    }

    pub fn section(&self, id: &str) -> Option<&SectionBody> {
        self.dynasty.get(id)
    }

    /// Breadcrumb/search-path name of a section.
    pub fn section_display_title(&self, id: &str) -> Option<&str> {
        self.section(id).map(SectionBody::display_title)
    }

    /// Resolve a sub-item reference: rulers first, then other entities.
    pub fn resolve_child(&self, key: &str) -> Option<&Entry> {
        self.kings.get(key).or_else(|| self.other.get(key))
    }

    pub fn connections_for(&self, id: &str) -> &[Connection] {
        self.connections.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn glossary_term(&self, key: &str) -> Option<&GlossaryTerm> {
        self.glossary.get(key)
    }

    pub fn timeline_span(&self, section_id: &str) -> Option<&TimelineSpan> {
        self.timeline_data.get(section_id)
    }

    pub fn home_label(&self) -> &str {
        self.part
            .breadcrumb_home
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_HOME_LABEL)
    }
}

/// Parse one named document from its JSON text.
pub fn parse_document<T: DeserializeOwned>(name: &str, json: &str) -> Result<T, ContentError> {
    serde_json::from_str(json).map_err(|source| ContentError::Parse {
        document: name.to_string(),
        source,
    })
}

fn read_document<T: DeserializeOwned>(dir: &Path, name: &str) -> Result<T, ContentError> {
    let path = dir.join(name);
    let json = std::fs::read_to_string(&path).map_err(|source| ContentError::Io {
        path: path.clone(),
        source,
    })?;
    parse_document(name, &json)
}
