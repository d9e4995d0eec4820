use std::path::{Path, PathBuf};

use timeline_core::accordion::{AccordionBuilder, ColorCategory};
use timeline_core::glossary::GlossaryMatcher;
use timeline_core::index::SearchIndex;
use timeline_core::nav::View;
use timeline_core::query::{QueryEngine, SearchOutcome};
use timeline_core::speech::{ControlId, SpeechChange, SpeechEngine, UtteranceToken};
use timeline_core::{AppState, Config, ContentError, ContentStore, Error};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn corpus() -> ContentStore {
    ContentStore::load_dir(&fixture("content")).unwrap()
}

#[derive(Default)]
struct NullSpeech {
    cancels: usize,
}

impl SpeechEngine for NullSpeech {
    fn speak(&mut self, _text: &str, _lang: &str, _token: UtteranceToken) {}

    fn cancel(&mut self) {
        self.cancels += 1;
    }
}

// ── loading ──────────────────────────────────────────────────────────

#[test]
fn test_load_fixture_corpus() {
    let store = corpus();
    assert_eq!(store.section_ids(), vec!["ancient", "medieval"]);
    assert_eq!(store.home_label(), "मुख्य पृष्ठ");
    assert_eq!(store.glossary.len(), 2);
    assert_eq!(store.connections_for("maurya-chandragupta").len(), 1);
}

#[test]
fn test_missing_directory_is_io_error() {
    let err = ContentStore::load_dir(&fixture("nope")).unwrap_err();
    assert!(matches!(err, ContentError::Io { .. }));
}

#[test]
fn test_app_state_error_wraps_content_error() {
    let err: Error = ContentStore::load_dir(&fixture("nope")).unwrap_err().into();
    assert!(err.to_string().contains("part.json"));
}

// ── accordion ────────────────────────────────────────────────────────

#[test]
fn test_ruler_colours_and_invasion_overrides() {
    let store = corpus();
    let view = AccordionBuilder::new(&store).build_section("ancient").unwrap();

    let colours = |parent: &str| -> Vec<Option<ColorCategory>> {
        view.find(parent)
            .unwrap()
            .children
            .iter()
            .map(|c| c.color)
            .collect()
    };
    assert_eq!(
        colours("maurya"),
        vec![
            Some(ColorCategory::Cycle(1)),
            Some(ColorCategory::Cycle(2)),
            Some(ColorCategory::Last),
        ]
    );
    assert_eq!(
        colours("invasions"),
        vec![
            Some(ColorCategory::InvasionIranian),
            Some(ColorCategory::InvasionGreek),
        ]
    );
    let ashoka = view.find("maurya-ashoka").unwrap();
    assert_eq!(ashoka.details_class(), "king-details enhanced-profile king-color-last");
}

#[test]
fn test_generated_ids_are_stable() {
    let store = corpus();
    let builder = AccordionBuilder::new(&store);
    let first = builder.build_section("medieval").unwrap();
    let second = builder.build_section("medieval").unwrap();
    assert_eq!(first, second);
    assert_eq!(first.entries[0].children[1].id, "gupta-1");
}

#[test]
fn test_section_bar_widths() {
    let store = corpus();
    let view = AccordionBuilder::new(&store).build_section("ancient").unwrap();
    let bar = view.bar.unwrap();
    assert!((bar.blocks[0].width_pct - 68.5).abs() < 1e-9);
    assert!((bar.blocks[1].width_pct - 31.5).abs() < 1e-9);
    assert!((bar.total_width_pct() - 100.0).abs() < 1e-9);
    assert!(AccordionBuilder::new(&store).build_section("medieval").unwrap().bar.is_none());
}

#[test]
fn test_annotation_idempotent_on_built_content() {
    let store = corpus();
    let matcher = GlossaryMatcher::from_glossary(&store.glossary).unwrap();
    let view = AccordionBuilder::new(&store)
        .with_glossary(&matcher)
        .build_section("ancient")
        .unwrap();
    let html = view.find("maurya-ashoka").unwrap().content_html();
    assert!(html.contains(r#"data-term="Dharma""#));
    assert!(html.contains(r#"data-term="Buddhism""#));
    assert_eq!(matcher.annotate_html(&html), html);
}

// ── search ───────────────────────────────────────────────────────────

#[test]
fn test_index_covers_every_entry() {
    let store = corpus();
    let index = SearchIndex::rebuild(&store);
    assert_eq!(index.len(), 11);
    assert_eq!(index, SearchIndex::rebuild(&store));
    let golden = index.records().iter().find(|r| r.title == "Golden Age").unwrap();
    assert_eq!(golden.id, "gupta");
    assert_eq!(golden.path, "Medieval India > Gupta Empire > Golden Age");
}

#[test]
fn test_query_results_in_index_order() {
    let index = SearchIndex::rebuild(&corpus());
    let engine = QueryEngine::default();
    let ids = |q: &str| -> Vec<String> {
        match engine.search(&index, q) {
            SearchOutcome::Results(hits) => hits.into_iter().map(|h| h.record.id).collect(),
            SearchOutcome::Inactive => vec![],
        }
    };
    assert_eq!(ids("pataliputra"), vec!["maurya", "gupta"]);
    assert_eq!(ids("DHARMA"), vec!["maurya-ashoka", "gandhara"]);
    assert_eq!(ids("dharma kalinga"), vec!["maurya-ashoka"]);
    assert!(ids("no results of match").is_empty());
}

// ── scenarios ────────────────────────────────────────────────────────

#[test]
fn test_connection_reveals_after_section_renders() {
    let mut state = AppState::new(corpus(), Config::default()).unwrap();
    let mut speech = NullSpeech::default();

    state.select_section(&mut speech, "medieval");
    state.section_rendered("medieval", true);

    let t = state.follow_connection(&mut speech, "maurya-ashoka").unwrap();
    assert_eq!(state.nav.view(), &View::Section("ancient".to_string()));
    let built = t.build_section.as_deref().unwrap();
    let view = state.build_section(built).unwrap();

    let target = state.section_rendered(built, !view.is_empty()).unwrap();
    assert_eq!(target, "maurya-ashoka");
    assert_eq!(view.ancestors_of(&target), Some(vec!["maurya"]));

    // Same-section jump reveals at once.
    let t = state.follow_connection(&mut speech, "gandhara").unwrap();
    assert_eq!(t.build_section, None);
    assert_eq!(t.reveal.as_deref(), Some("gandhara"));
}

#[test]
fn test_second_read_aloud_stops_first() {
    let mut state = AppState::new(corpus(), Config::default()).unwrap();
    let mut speech = NullSpeech::default();
    let view = state.build_section("ancient").unwrap();
    let ashoka = view.find("maurya-ashoka").unwrap();
    let bindusara = view.find("maurya-bindusara").unwrap();

    state.read_aloud_entry(&mut speech, ashoka);
    let change = state.read_aloud_entry(&mut speech, bindusara);
    assert_eq!(
        change,
        SpeechChange::Started {
            control: ControlId::Entry("maurya-bindusara".to_string()),
            stopped: Some(ControlId::Entry("maurya-ashoka".to_string())),
        }
    );
    assert_eq!(speech.cancels, 1);
}

#[test]
fn test_broken_corpus_renders_stub() {
    let store = ContentStore::load_dir(&fixture("broken")).unwrap();
    let view = AccordionBuilder::new(&store).build_section("ancient").unwrap();
    let ghost = view.find("ghost").unwrap();
    assert!(!ghost.resolved);
    assert_eq!(ghost.summary.title, "Unknown");
    assert!(SearchIndex::rebuild(&store).find("ghost").is_none());
}
