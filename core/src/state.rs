//! The application state the frontend holds for the whole session.

use tracing::debug;

use crate::accordion::{AccordionBuilder, AccordionNode, SectionView};
use crate::config::Config;
use crate::error::Result;
use crate::glossary::{Dismiss, GlossaryMatcher, Popover};
use crate::index::SearchIndex;
use crate::markup;
use crate::model::GlossaryTerm;
use crate::nav::{Crumb, FocusMode, Navigator, Transition};
use crate::query::{QueryEngine, SearchOutcome};
use crate::speech::{ControlId, ReadAloud, SpeechChange, SpeechEngine, UtteranceToken};
use crate::store::ContentStore;

#[derive(Debug, Clone)]
pub struct AppState {
    pub store: ContentStore,
    pub config: Config,
    index: SearchIndex,
    matcher: GlossaryMatcher,
    engine: QueryEngine,
    pub nav: Navigator,
    pub focus: FocusMode,
    popover: Option<Popover>,
    speech: ReadAloud<ControlId>,
}

impl AppState {
    /// Validate the config, compile the glossary matcher and index the store.
    pub fn new(store: ContentStore, config: Config) -> Result<Self> {
        config.validate()?;
        let matcher = GlossaryMatcher::from_glossary(&store.glossary)?;
        let index = SearchIndex::rebuild(&store);
        debug!(
            sections = store.section_ids().len(),
            terms = store.glossary.len(),
            "application state ready"
        );
        Ok(Self {
            engine: QueryEngine::from_config(&config),
            store,
            config,
            index,
            matcher,
            nav: Navigator::new(),
            focus: FocusMode::default(),
            popover: None,
            speech: ReadAloud::new(),
        })
    }

    pub fn index(&self) -> &SearchIndex {
        &self.index
    }

    pub fn matcher(&self) -> &GlossaryMatcher {
        &self.matcher
    }

    pub fn breadcrumbs(&self) -> Vec<Crumb> {
        self.nav.breadcrumbs(&self.store)
    }

    fn apply(&mut self, speech: &mut impl SpeechEngine, transition: Transition) -> Transition {
        if transition.stop_speech {
            self.speech.stop(speech);
        }
        transition
    }

    // ── navigation ───────────────────────────────────────────────────

    pub fn select_section(&mut self, speech: &mut impl SpeechEngine, id: &str) -> Transition {
        let t = self.nav.show_section(id);
        self.apply(speech, t)
    }

    pub fn go_home(&mut self, speech: &mut impl SpeechEngine) -> Transition {
        let t = self.nav.show_home();
        self.apply(speech, t)
    }

    /// Run `query` and move the view in or out of the results page.
    pub fn search(
        &mut self,
        speech: &mut impl SpeechEngine,
        query: &str,
    ) -> (SearchOutcome, Transition) {
        let outcome = self.engine.search(&self.index, query);
        let t = self.nav.apply_search(outcome.is_active());
        (outcome, self.apply(speech, t))
    }

    /// Jump to an entry from a search result or a timeline block.
    pub fn jump_to(
        &mut self,
        speech: &mut impl SpeechEngine,
        section: &str,
        target: &str,
    ) -> Transition {
        let t = self.nav.jump_to(section, target);
        self.apply(speech, t)
    }

    /// See [`Navigator::reveal_in_section`].
    pub fn reveal_in_section(
        &mut self,
        speech: &mut impl SpeechEngine,
        section: &str,
        target: &str,
    ) -> Transition {
        let t = self.nav.reveal_in_section(section, target);
        self.apply(speech, t)
    }

    /// Follow a related-topic tag. Unknown targets do nothing.
    pub fn follow_connection(
        &mut self,
        speech: &mut impl SpeechEngine,
        target: &str,
    ) -> Option<Transition> {
        let t = self.nav.follow_connection(&self.index, target)?;
        Some(self.apply(speech, t))
    }

    /// Build a section's accordion with glossary annotation applied.
    pub fn build_section(&self, id: &str) -> Option<SectionView> {
        AccordionBuilder::new(&self.store)
            .with_glossary(&self.matcher)
            .build_section(id)
    }

    /// See [`Navigator::section_rendered`].
    pub fn section_rendered(&mut self, id: &str, non_empty: bool) -> Option<String> {
        self.nav.section_rendered(id, non_empty)
    }

    /// Revealing an anchor shows every level-0 entry of its section again.
    pub fn prepare_reveal(&mut self, section: &str) {
        self.focus.clear(section);
    }

    // ── glossary popover ─────────────────────────────────────────────

    pub fn popover(&self) -> Option<&Popover> {
        self.popover.as_ref()
    }

    /// Open the popover for `key`. Any open popover is closed first, so a
    /// stale key leaves no popover at all.
    pub fn open_popover(&mut self, speech: &mut impl SpeechEngine, key: &str) -> bool {
        if let Some(old) = self.popover.take() {
            self.speech.stop_if(speech, &ControlId::Glossary(old.term));
        }
        self.popover = Popover::open(&self.store.glossary, key);
        if self.popover.is_none() {
            debug!(term = key, "no glossary entry");
        }
        self.popover.is_some()
    }

    pub fn popover_term(&self) -> Option<(&Popover, &GlossaryTerm)> {
        let popover = self.popover.as_ref()?;
        let term = self.store.glossary_term(&popover.term)?;
        Some((popover, term))
    }

    pub fn toggle_popover_language(&mut self) {
        if let Some(popover) = self.popover.as_mut() {
            popover.toggle_language();
        }
    }

    pub fn expand_popover(&mut self) {
        if let Some(popover) = self.popover.as_mut() {
            popover.expand();
        }
    }

    /// Close the popover and stop its read-aloud, if it was speaking.
    pub fn dismiss_popover(
        &mut self,
        speech: &mut impl SpeechEngine,
        how: Dismiss,
    ) -> Option<ControlId> {
        let popover = self.popover.take()?;
        debug!(term = %popover.term, ?how, "dismissed popover");
        self.speech
            .stop_if(speech, &ControlId::Glossary(popover.term))
    }

    // ── read-aloud ───────────────────────────────────────────────────

    pub fn speaking(&self) -> Option<&ControlId> {
        self.speech.speaking()
    }

    pub fn read_aloud_entry(
        &mut self,
        speech: &mut impl SpeechEngine,
        node: &AccordionNode,
    ) -> SpeechChange<ControlId> {
        let text = node.read_aloud_text();
        self.speech.toggle(
            speech,
            ControlId::Entry(node.id.clone()),
            &text,
            &self.config.primary_lang,
        )
    }

    /// Read the open popover's definition in its current language.
    pub fn read_aloud_glossary(
        &mut self,
        speech: &mut impl SpeechEngine,
    ) -> SpeechChange<ControlId> {
        let Some((popover, term)) = self.popover_term() else {
            return SpeechChange::Ignored;
        };
        let text = markup::text_content(&markup::parse(popover.definition(term)));
        let lang = popover.speech_lang(&self.config).to_string();
        let control = ControlId::Glossary(popover.term.clone());
        self.speech.toggle(speech, control, &text, &lang)
    }

    pub fn stop_speech(&mut self, speech: &mut impl SpeechEngine) -> Option<ControlId> {
        self.speech.stop(speech)
    }

    /// Completion or failure reported by the speech device.
    pub fn speech_finished(&mut self, token: UtteranceToken) -> Option<ControlId> {
        self.speech.finished(token)
    }
}
