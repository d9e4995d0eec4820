//! Read-aloud adapter: one speaking control at a time.

/// Text-to-speech device. `speak` starts playback and must eventually
/// report completion or failure through [`ReadAloud::finished`] with the
/// same token.
pub trait SpeechEngine {
    fn speak(&mut self, text: &str, lang: &str, token: UtteranceToken);
    fn cancel(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtteranceToken(pub u64);

/// The control that triggered playback.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ControlId {
    /// Read-aloud button in an entry summary
    Entry(String),
    /// Read-aloud button in the glossary popover for a term
    Glossary(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ActiveSpeech<C> {
    control: C,
    token: UtteranceToken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechChange<C> {
    /// Playback started; `stopped` is the control that was cut off, if any.
    Started { control: C, stopped: Option<C> },
    /// The same control was pressed again while speaking.
    Stopped(C),
    /// Nothing to read.
    Ignored,
}

/// The speech control slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadAloud<C> {
    active: Option<ActiveSpeech<C>>,
    next_token: u64,
}

impl<C> Default for ReadAloud<C> {
    fn default() -> Self {
        Self {
            active: None,
            next_token: 0,
        }
    }
}

impl<C: Clone + PartialEq> ReadAloud<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn speaking(&self) -> Option<&C> {
        self.active.as_ref().map(|a| &a.control)
    }

    pub fn is_speaking(&self, control: &C) -> bool {
        self.speaking() == Some(control)
    }

    /// Press a read-aloud control: stops it if it is the one speaking,
    /// otherwise stops whatever is speaking and starts `text`.
    pub fn toggle(
        &mut self,
        engine: &mut impl SpeechEngine,
        control: C,
        text: &str,
        lang: &str,
    ) -> SpeechChange<C> {
        if self.is_speaking(&control) {
            self.stop(engine);
            return SpeechChange::Stopped(control);
        }
        let stopped = self.stop(engine);
        if text.trim().is_empty() {
            return SpeechChange::Ignored;
        }

        let token = UtteranceToken(self.next_token);
        self.next_token += 1;
        self.active = Some(ActiveSpeech {
            control: control.clone(),
            token,
        });
        engine.speak(text, lang, token);
        SpeechChange::Started { control, stopped }
    }

    /// Cancel playback and empty the slot. Returns the control to un-mark.
    pub fn stop(&mut self, engine: &mut impl SpeechEngine) -> Option<C> {
        let active = self.active.take()?;
        engine.cancel();
        Some(active.control)
    }

    /// Stop only if `control` is the one speaking.
    pub fn stop_if(&mut self, engine: &mut impl SpeechEngine, control: &C) -> Option<C> {
        if self.is_speaking(control) {
            self.stop(engine)
        } else {
            None
        }
    }

    /// Playback ended or failed. Late callbacks from an utterance that was
    /// already replaced are ignored.
    pub fn finished(&mut self, token: UtteranceToken) -> Option<C> {
        match &self.active {
            Some(active) if active.token == token => self.active.take().map(|a| a.control),
            _ => None,
        }
    }
}

/// Trim and fold every whitespace run into one space.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingEngine {
        spoken: Vec<(String, String, UtteranceToken)>,
        cancels: usize,
    }

    impl SpeechEngine for RecordingEngine {
        fn speak(&mut self, text: &str, lang: &str, token: UtteranceToken) {
            self.spoken.push((text.to_string(), lang.to_string(), token));
        }

        fn cancel(&mut self) {
            self.cancels += 1;
        }
    }

    fn entry(id: &str) -> ControlId {
        ControlId::Entry(id.to_string())
    }

    #[test]
    fn test_second_control_stops_first() {
        let mut engine = RecordingEngine::default();
        let mut slot = ReadAloud::new();
        slot.toggle(&mut engine, entry("a"), "first", "hi-IN");
        let change = slot.toggle(&mut engine, entry("b"), "second", "hi-IN");
        assert_eq!(
            change,
            SpeechChange::Started {
                control: entry("b"),
                stopped: Some(entry("a")),
            }
        );
        assert_eq!(engine.cancels, 1);
        assert_eq!(slot.speaking(), Some(&entry("b")));
        assert_eq!(engine.spoken.len(), 2);
    }

    #[test]
    fn test_same_control_toggles_off() {
        let mut engine = RecordingEngine::default();
        let mut slot = ReadAloud::new();
        slot.toggle(&mut engine, entry("a"), "text", "hi-IN");
        assert_eq!(
            slot.toggle(&mut engine, entry("a"), "text", "hi-IN"),
            SpeechChange::Stopped(entry("a"))
        );
        assert!(slot.speaking().is_none());
        assert_eq!(engine.spoken.len(), 1);
    }

    #[test]
    fn test_empty_text_starts_nothing() {
        let mut engine = RecordingEngine::default();
        let mut slot: ReadAloud<ControlId> = ReadAloud::new();
        assert_eq!(slot.toggle(&mut engine, entry("a"), "  ", "hi-IN"), SpeechChange::Ignored);
        assert!(engine.spoken.is_empty());
    }

    #[test]
    fn test_stale_completion_ignored() {
        let mut engine = RecordingEngine::default();
        let mut slot = ReadAloud::new();
        slot.toggle(&mut engine, entry("a"), "first", "hi-IN");
        let first = engine.spoken[0].2;
        slot.toggle(&mut engine, entry("b"), "second", "en-US");
        let second = engine.spoken[1].2;

        // The cancelled utterance reports late; the new one keeps speaking.
        assert_eq!(slot.finished(first), None);
        assert_eq!(slot.speaking(), Some(&entry("b")));
        assert_eq!(slot.finished(second), Some(entry("b")));
        assert!(slot.speaking().is_none());
    }

    #[test]
    fn test_stop_if_only_matching_control() {
        let mut engine = RecordingEngine::default();
        let mut slot = ReadAloud::new();
        slot.toggle(&mut engine, entry("a"), "text", "hi-IN");
        let popover = ControlId::Glossary("Dharma".to_string());
        assert_eq!(slot.stop_if(&mut engine, &popover), None);
        assert_eq!(slot.stop_if(&mut engine, &entry("a")), Some(entry("a")));
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a\n\t b  c "), "a b c");
    }
}
