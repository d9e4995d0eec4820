use std::rc::Rc;

use leptos::logging::warn;
use leptos::web_sys;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

use timeline_core::speech::{SpeechEngine, UtteranceToken};

/// `speechSynthesis` behind the core's speech contract.
pub struct WebSpeech {
    synth: Option<web_sys::SpeechSynthesis>,
    on_done: Rc<dyn Fn(UtteranceToken)>,
}

impl WebSpeech {
    /// `on_done` runs when an utterance ends or fails.
    pub fn new(on_done: impl Fn(UtteranceToken) + 'static) -> Self {
        let synth = web_sys::window().and_then(|w| w.speech_synthesis().ok());
        if synth.is_none() {
            warn!("speech synthesis is not available");
        }
        Self {
            synth,
            on_done: Rc::new(on_done),
        }
    }
}

impl SpeechEngine for WebSpeech {
    fn speak(&mut self, text: &str, lang: &str, token: UtteranceToken) {
        let done = Rc::clone(&self.on_done);
        let Some(synth) = &self.synth else {
            done(token);
            return;
        };
        let Ok(utterance) = web_sys::SpeechSynthesisUtterance::new_with_text(text) else {
            done(token);
            return;
        };
        utterance.set_lang(lang);
        let callback = Closure::<dyn Fn()>::new(move || done(token));
        utterance.set_onend(Some(callback.as_ref().unchecked_ref()));
        utterance.set_onerror(Some(callback.as_ref().unchecked_ref()));
        callback.forget();
        synth.speak(&utterance);
    }

    fn cancel(&mut self) {
        if let Some(synth) = &self.synth {
            synth.cancel();
        }
    }
}
