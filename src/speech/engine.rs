//! The seam between the driver and whatever actually synthesizes speech.

use std::time::Instant;

use thiserror::Error;

use super::driver::PlaybackState;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpeechError {
    #[error("no speech voices available")]
    NoVoices,

    #[error("voice {0} does not exist")]
    UnknownVoice(usize),

    #[error("nothing to speak")]
    EmptyText,

    #[error("cannot {action} while {from:?}")]
    InvalidTransition {
        from: PlaybackState,
        action: &'static str,
    },

    #[error("speech engine error: {0}")]
    Engine(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    /// BCP 47 tag, empty when the backend does not say.
    pub language: String,
}

impl Voice {
    /// "Name (en-GB)", or just the name when the language is unknown.
    pub fn label(&self) -> String {
        if self.language.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.language)
        }
    }
}

/// One request to speak `text` with fixed voice parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub voice: Option<Voice>,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

/// Progress reported by an engine. Boundary offsets count characters of
/// the utterance text and are best effort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Start,
    Boundary { char_index: usize, char_length: usize },
    Pause,
    Resume,
    End,
}

/// A text-to-speech backend.
///
/// Engines are polled: `poll` returns everything that happened up to `now`.
/// Time is passed in rather than read so playback can be driven from tests.
pub trait SpeechEngine {
    fn voices(&self) -> Vec<Voice>;

    /// Begin speaking, replacing nothing: callers cancel first.
    fn speak(&mut self, utterance: Utterance, now: Instant) -> Result<(), SpeechError>;

    fn pause(&mut self, now: Instant);

    fn resume(&mut self, now: Instant);

    /// Drop the current utterance without emitting further events.
    fn cancel(&mut self);

    fn poll(&mut self, now: Instant) -> Vec<EngineEvent>;
}

impl<E: SpeechEngine + ?Sized> SpeechEngine for Box<E> {
    fn voices(&self) -> Vec<Voice> {
        (**self).voices()
    }

    fn speak(&mut self, utterance: Utterance, now: Instant) -> Result<(), SpeechError> {
        (**self).speak(utterance, now)
    }

    fn pause(&mut self, now: Instant) {
        (**self).pause(now)
    }

    fn resume(&mut self, now: Instant) {
        (**self).resume(now)
    }

    fn cancel(&mut self) {
        (**self).cancel()
    }

    fn poll(&mut self, now: Instant) -> Vec<EngineEvent> {
        (**self).poll(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_label_includes_language() {
        let voice = Voice {
            name: "Kate".to_string(),
            language: "en-GB".to_string(),
        };
        assert_eq!(voice.label(), "Kate (en-GB)");

        let bare = Voice {
            name: "Default".to_string(),
            language: String::new(),
        };
        assert_eq!(bare.label(), "Default");
    }
}
