use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use timeline_core::store::DOCUMENTS;
use timeline_core::timeline_bar::TimelineBar;
use timeline_core::{ContentStore, Entry, SubItem};

/// Bars are allowed this much slack (in percent) before coverage is flagged.
const COVERAGE_TOLERANCE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub severity: Severity,
    /// Where the problem sits: a document name, or a section/entry id
    pub location: String,
    pub message: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{tag}: {}: {}", self.location, self.message)
    }
}

#[derive(Debug, Default)]
pub struct Report {
    findings: Vec<Finding>,
}

impl Report {
    fn push(&mut self, severity: Severity, location: impl Into<String>, message: impl Into<String>) {
        self.findings.push(Finding {
            severity,
            location: location.into(),
            message: message.into(),
        });
    }

    fn error(&mut self, location: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Error, location, message);
    }

    fn warn(&mut self, location: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Warning, location, message);
    }

    pub fn extend(&mut self, other: Report) {
        self.findings.extend(other.findings);
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn error_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .count()
    }
}

// ── Tree walk ────────────────────────────────────────────────────────────

/// Everything a walk of the section trees turns up.
#[derive(Default)]
struct Walk {
    /// Rendered id -> sections it appears in (one per occurrence)
    ids: BTreeMap<String, Vec<String>>,
    /// (parent id, missing reference)
    unresolved: Vec<(String, String)>,
    /// Reference chains that loop back on themselves
    cycles: Vec<Vec<String>>,
}

impl Walk {
    fn of(store: &ContentStore) -> Self {
        let mut walk = Walk::default();
        for section in store.section_ids() {
            let Some(body) = store.section(section) else {
                continue;
            };
            for (i, entry) in body.items.iter().enumerate() {
                let id = entry.id.clone().unwrap_or_else(|| format!("{section}-{i}"));
                walk.entry(store, section, &id, entry, &mut Vec::new());
            }
        }
        walk
    }

    /// Ids are assigned the way the accordion builder assigns them: the
    /// reference key for dictionary records, else the explicit id, else
    /// `{parent}-{index}`.
    fn entry(
        &mut self,
        store: &ContentStore,
        section: &str,
        id: &str,
        entry: &Entry,
        chain: &mut Vec<String>,
    ) {
        self.ids
            .entry(id.to_string())
            .or_default()
            .push(section.to_string());

        for (i, sub) in entry.sub_items.iter().enumerate() {
            match sub {
                SubItem::Inline(child) => {
                    let child_id = child.id.clone().unwrap_or_else(|| format!("{id}-{i}"));
                    self.entry(store, section, &child_id, child, chain);
                }
                SubItem::Ref(key) => {
                    if let Some(pos) = chain.iter().position(|k| k == key) {
                        let mut cycle = chain[pos..].to_vec();
                        cycle.push(key.clone());
                        self.cycles.push(cycle);
                        continue;
                    }
                    match store.resolve_child(key) {
                        Some(record) => {
                            chain.push(key.clone());
                            self.entry(store, section, key, record, chain);
                            chain.pop();
                        }
                        None => self.unresolved.push((id.to_string(), key.clone())),
                    }
                }
            }
        }
    }

    fn contains(&self, id: &str) -> bool {
        self.ids.contains_key(id)
    }
}

// ── Checks ───────────────────────────────────────────────────────────────

/// Validate a loaded corpus. The stray-file scan needs the directory and
/// lives in [`stray_files`].
pub fn check_store(store: &ContentStore) -> Report {
    let walk = Walk::of(store);
    let mut report = Report::default();
    debug!(ids = walk.ids.len(), "walked section trees");

    for (id, sections) in &walk.ids {
        if sections.len() > 1 {
            let sections: BTreeSet<&str> = sections.iter().map(String::as_str).collect();
            report.error(
                id.clone(),
                format!(
                    "id rendered {} times (in {})",
                    walk.ids[id].len(),
                    sections.into_iter().collect::<Vec<_>>().join(", ")
                ),
            );
        }
    }

    for (parent, key) in &walk.unresolved {
        report.error(
            parent.clone(),
            format!("sub-item {key:?} is in neither kings.json nor other.json"),
        );
    }

    for cycle in &walk.cycles {
        report.error(
            cycle[0].clone(),
            format!("sub-item references loop: {}", cycle.join(" -> ")),
        );
    }

    for card in &store.part.timeline_cards {
        if store.section(&card.target).is_none() {
            report.error("part.json", format!("card {:?} has no section", card.target));
        }
    }

    let mut sources: Vec<&String> = store.connections.keys().collect();
    sources.sort();
    for source in sources {
        if !walk.contains(source) {
            report.warn(
                "ConnectionsData.json",
                format!("connections for {source:?}, which is never rendered"),
            );
        }
        for connection in store.connections_for(source) {
            if !walk.contains(&connection.target_id) {
                report.error(
                    source.clone(),
                    format!(
                        "connection {:?} points at unknown id {:?}",
                        connection.label, connection.target_id
                    ),
                );
            }
        }
    }

    let mut spans: Vec<_> = store.timeline_data.iter().collect();
    spans.sort_by(|a, b| a.0.cmp(b.0));
    for (section, span) in spans {
        if store.section(section).is_none() {
            report.warn(
                "TimelineData.json",
                format!("timeline for unknown section {section:?}"),
            );
        }
        for range in &span.dynasties {
            if !walk.contains(&range.details_id) {
                report.error(
                    section.clone(),
                    format!(
                        "timeline block {:?} targets unknown id {:?}",
                        range.name, range.details_id
                    ),
                );
            }
        }
        if let Some(bar) = TimelineBar::build(span) {
            let total = bar.total_width_pct();
            if (total - 100.0).abs() > COVERAGE_TOLERANCE {
                report.warn(
                    section.clone(),
                    format!("timeline blocks cover {total:.1}% of the span"),
                );
            }
        }
    }

    report
}

/// `.json` files next to the content documents that nothing loads.
pub fn stray_files(dir: &Path) -> Report {
    let mut report = Report::default();
    let mut names: Vec<String> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".json") && !DOCUMENTS.contains(&name.as_str()))
        .collect();
    names.sort();
    for name in names {
        report.warn(name, "not a content document; ignored");
    }
    report
}
