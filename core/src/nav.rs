//! View state machine, lazy section builds, pending reveals and breadcrumbs.

use std::collections::{BTreeMap, BTreeSet};

use crate::index::SearchIndex;
use crate::store::ContentStore;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Home,
    Section(String),
    /// `return_to` is the section shown before searching, if any.
    SearchResults { return_to: Option<String> },
}

/// Side effects the caller must carry out after a transition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transition {
    pub stop_speech: bool,
    pub clear_query: bool,
    /// Section whose content must be built now (first visit)
    pub build_section: Option<String>,
    /// Anchor to reveal immediately (its section is already built)
    pub reveal: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingReveal {
    section: String,
    target: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    pub label: String,
    /// Only the home crumb is a control
    pub is_home: bool,
}

/// Sole owner of the view state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Navigator {
    view: View,
    built: BTreeSet<String>,
    pending: Option<PendingReveal>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    /// The section shown in `Section`, or the one search will return to.
    pub fn current_section(&self) -> Option<&str> {
        match &self.view {
            View::Home => None,
            View::Section(id) => Some(id),
            View::SearchResults { return_to } => return_to.as_deref(),
        }
    }

    pub fn is_built(&self, section: &str) -> bool {
        self.built.contains(section)
    }

    /// Select a section card (or jump into a section).
    pub fn show_section(&mut self, id: &str) -> Transition {
        self.view = View::Section(id.to_string());
        Transition {
            stop_speech: true,
            clear_query: true,
            build_section: (!self.is_built(id)).then(|| id.to_string()),
            reveal: None,
        }
    }

    /// The home breadcrumb.
    pub fn show_home(&mut self) -> Transition {
        self.view = View::Home;
        self.pending = None;
        Transition {
            stop_speech: true,
            clear_query: true,
            ..Transition::default()
        }
    }

    /// Apply a query evaluation. An active query enters `SearchResults`;
    /// an inactive one falls back to the view search was entered from.
    pub fn apply_search(&mut self, active: bool) -> Transition {
        match (active, &self.view) {
            (true, View::SearchResults { .. }) => Transition {
                stop_speech: true,
                ..Transition::default()
            },
            (true, _) => {
                let return_to = self.current_section().map(str::to_string);
                self.view = View::SearchResults { return_to };
                Transition {
                    stop_speech: true,
                    ..Transition::default()
                }
            }
            (false, View::SearchResults { return_to }) => {
                self.view = match return_to.clone() {
                    Some(id) => View::Section(id),
                    None => View::Home,
                };
                Transition::default()
            }
            (false, _) => Transition::default(),
        }
    }

    /// Switch to `section` and reveal `target` once the section is rendered.
    pub fn jump_to(&mut self, section: &str, target: &str) -> Transition {
        let mut transition = self.show_section(section);
        if transition.build_section.is_some() {
            self.pending = Some(PendingReveal {
                section: section.to_string(),
                target: target.to_string(),
            });
        } else {
            self.pending = None;
            transition.reveal = Some(target.to_string());
        }
        transition
    }

    /// A timeline-bar block. Inside the open section this only reveals the
    /// target; the query and any read-aloud are left alone.
    pub fn reveal_in_section(&mut self, section: &str, target: &str) -> Transition {
        let in_place = matches!(&self.view, View::Section(id) if id == section);
        if in_place && self.is_built(section) {
            self.pending = None;
            Transition {
                reveal: Some(target.to_string()),
                ..Transition::default()
            }
        } else {
            self.jump_to(section, target)
        }
    }

    /// Follow a related-topic link; unknown targets are ignored.
    pub fn follow_connection(&mut self, index: &SearchIndex, target: &str) -> Option<Transition> {
        let section = index.section_of(target)?.to_string();
        Some(self.jump_to(&section, target))
    }

    /// Signal that `section`'s content finished rendering. Sections that
    /// rendered nothing are not remembered and will be rebuilt on the next
    /// visit. Returns the target waiting for this section, if any.
    pub fn section_rendered(&mut self, section: &str, non_empty: bool) -> Option<String> {
        if non_empty {
            self.built.insert(section.to_string());
        }
        match &self.pending {
            Some(p) if p.section == section => self.pending.take().map(|p| p.target),
            _ => None,
        }
    }

    /// Derived from the current view on every call.
    pub fn breadcrumbs(&self, store: &ContentStore) -> Vec<Crumb> {
        let mut crumbs = vec![Crumb {
            label: store.home_label().to_string(),
            is_home: true,
        }];
        if let View::Section(id) = &self.view {
            crumbs.push(Crumb {
                label: store.section_display_title(id).unwrap_or(id).to_string(),
                is_home: false,
            });
        }
        crumbs
    }
}

// ── Focus mode ───────────────────────────────────────────────────────────

/// Opening a level-0 entry hides its level-0 siblings until it closes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusMode {
    focused: BTreeMap<String, String>,
}

impl FocusMode {
    pub fn on_toggle(&mut self, section: &str, entry: &str, open: bool) {
        if open {
            self.focused.insert(section.to_string(), entry.to_string());
        } else if self.focused.get(section).map(String::as_str) == Some(entry) {
            self.focused.remove(section);
        }
    }

    pub fn is_hidden(&self, section: &str, entry: &str) -> bool {
        self.focused
            .get(section)
            .is_some_and(|focused| focused != entry)
    }

    /// Show every level-0 entry of `section` again.
    pub fn clear(&mut self, section: &str) {
        self.focused.remove(section);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> ContentStore {
        let mut store = ContentStore::default();
        store.part = serde_json::from_value(json!({"breadcrumbHome": "मुख्य"})).unwrap();
        store.dynasty = serde_json::from_value(json!({
            "ancient": {"title": "प्राचीन (Ancient India)", "items": [
                {"id": "maurya", "summary": {"title": "Maurya"}, "subItems": [{"id": "maurya-ashoka", "summary": {"title": "Ashoka"}}]}
            ]},
            "medieval": {"title": "Medieval", "items": [
                {"id": "maurya-chandragupta", "summary": {"title": "Chandragupta"}}
            ]}
        }))
        .unwrap();
        store
    }

    // ── view transitions ─────────────────────────────────────────────

    #[test]
    fn test_first_visit_requests_build_once() {
        let mut nav = Navigator::new();
        let t = nav.show_section("ancient");
        assert_eq!(t.build_section.as_deref(), Some("ancient"));
        assert!(t.stop_speech && t.clear_query);
        nav.section_rendered("ancient", true);

        nav.show_home();
        assert_eq!(nav.show_section("ancient").build_section, None);
    }

    #[test]
    fn test_empty_render_is_rebuilt() {
        let mut nav = Navigator::new();
        nav.show_section("empty");
        nav.section_rendered("empty", false);
        assert!(nav.show_section("empty").build_section.is_some());
    }

    #[test]
    fn test_search_falls_back_to_previous_view() {
        let mut nav = Navigator::new();
        nav.show_section("ancient");
        let t = nav.apply_search(true);
        assert!(t.stop_speech);
        assert_eq!(
            nav.view(),
            &View::SearchResults {
                return_to: Some("ancient".to_string())
            }
        );
        nav.apply_search(true);
        nav.apply_search(false);
        assert_eq!(nav.view(), &View::Section("ancient".to_string()));

        nav.show_home();
        nav.apply_search(true);
        nav.apply_search(false);
        assert_eq!(nav.view(), &View::Home);
    }

    #[test]
    fn test_inactive_query_outside_search_is_noop() {
        let mut nav = Navigator::new();
        nav.show_section("ancient");
        assert_eq!(nav.apply_search(false), Transition::default());
        assert_eq!(nav.view(), &View::Section("ancient".to_string()));
    }

    // ── pending reveals ──────────────────────────────────────────────

    #[test]
    fn test_jump_waits_for_render() {
        let mut nav = Navigator::new();
        let t = nav.jump_to("ancient", "maurya-ashoka");
        assert_eq!(t.build_section.as_deref(), Some("ancient"));
        assert_eq!(t.reveal, None);
        assert_eq!(nav.section_rendered("medieval", true), None);
        assert_eq!(
            nav.section_rendered("ancient", true).as_deref(),
            Some("maurya-ashoka")
        );
        // Released once.
        assert_eq!(nav.section_rendered("ancient", true), None);
    }

    #[test]
    fn test_jump_into_built_section_reveals_now() {
        let mut nav = Navigator::new();
        nav.show_section("ancient");
        nav.section_rendered("ancient", true);
        nav.show_home();
        let t = nav.jump_to("ancient", "maurya");
        assert_eq!(t.build_section, None);
        assert_eq!(t.reveal.as_deref(), Some("maurya"));
    }

    #[test]
    fn test_bar_block_in_open_section_only_reveals() {
        let mut nav = Navigator::new();
        nav.show_section("ancient");
        nav.section_rendered("ancient", true);
        let t = nav.reveal_in_section("ancient", "gandhara");
        assert!(!t.stop_speech);
        assert!(!t.clear_query);
        assert_eq!(t.build_section, None);
        assert_eq!(t.reveal.as_deref(), Some("gandhara"));
        assert_eq!(nav.view(), &View::Section("ancient".to_string()));

        // Anywhere else it behaves like a jump.
        nav.show_home();
        let t = nav.reveal_in_section("ancient", "gandhara");
        assert!(t.clear_query);
        assert_eq!(t.reveal.as_deref(), Some("gandhara"));
    }

    #[test]
    fn test_follow_connection_switches_section() {
        let store = store();
        let index = SearchIndex::rebuild(&store);
        let mut nav = Navigator::new();
        nav.show_section("medieval");
        nav.section_rendered("medieval", true);

        let t = nav.follow_connection(&index, "maurya-ashoka").unwrap();
        assert_eq!(nav.view(), &View::Section("ancient".to_string()));
        assert_eq!(t.build_section.as_deref(), Some("ancient"));
        assert_eq!(
            nav.section_rendered("ancient", true).as_deref(),
            Some("maurya-ashoka")
        );

        assert!(nav.follow_connection(&index, "nowhere").is_none());
    }

    #[test]
    fn test_home_drops_pending_reveal() {
        let mut nav = Navigator::new();
        nav.jump_to("ancient", "maurya");
        nav.show_home();
        assert_eq!(nav.section_rendered("ancient", true), None);
    }

    // ── breadcrumbs ──────────────────────────────────────────────────

    #[test]
    fn test_breadcrumbs_derived_from_view() {
        let store = store();
        let mut nav = Navigator::new();
        let labels = |nav: &Navigator| -> Vec<String> {
            nav.breadcrumbs(&store).into_iter().map(|c| c.label).collect()
        };
        assert_eq!(labels(&nav), vec!["मुख्य"]);
        nav.show_section("ancient");
        assert_eq!(labels(&nav), vec!["मुख्य", "Ancient India"]);
        nav.show_section("medieval");
        assert_eq!(labels(&nav), vec!["मुख्य", "Medieval"]);
        nav.apply_search(true);
        assert_eq!(labels(&nav), vec!["मुख्य"]);
    }

    // ── focus mode ───────────────────────────────────────────────────

    #[test]
    fn test_focus_mode_hides_siblings() {
        let mut focus = FocusMode::default();
        focus.on_toggle("ancient", "maurya", true);
        assert!(focus.is_hidden("ancient", "gupta"));
        assert!(!focus.is_hidden("ancient", "maurya"));
        assert!(!focus.is_hidden("medieval", "gupta"));

        // Closing a different entry leaves focus alone.
        focus.on_toggle("ancient", "gupta", false);
        assert!(focus.is_hidden("ancient", "gupta"));

        focus.on_toggle("ancient", "maurya", false);
        assert!(!focus.is_hidden("ancient", "gupta"));

        focus.on_toggle("ancient", "maurya", true);
        focus.clear("ancient");
        assert!(!focus.is_hidden("ancient", "gupta"));
    }
}
