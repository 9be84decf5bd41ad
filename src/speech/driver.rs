//! Playback state machine around a [`SpeechEngine`]
//!
//! `Idle -> Playing <-> Paused`, with `stop` and natural end returning to
//! `Idle`. Every return to `Idle` and every restart queues one clear event so
//! consumers can drop their highlight before new boundaries arrive.

use std::collections::VecDeque;
use std::ops::RangeInclusive;
use std::time::Instant;

use log::{debug, info};

use super::engine::{EngineEvent, SpeechEngine, SpeechError, Utterance, Voice};
use super::event::PlaybackEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
    Paused,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VoiceSettings {
    /// Index into the engine's voice list.
    pub voice: usize,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl VoiceSettings {
    pub const RATE_RANGE: RangeInclusive<f32> = 0.1..=10.0;
    pub const PITCH_RANGE: RangeInclusive<f32> = 0.0..=2.0;
    pub const VOLUME_RANGE: RangeInclusive<f32> = 0.0..=1.0;

    /// Copy with every parameter clamped into its range.
    pub fn clamped(&self) -> Self {
        let clamp = |value: f32, range: &RangeInclusive<f32>, fallback: f32| {
            if value.is_finite() {
                value.clamp(*range.start(), *range.end())
            } else {
                fallback
            }
        };
        Self {
            voice: self.voice,
            rate: clamp(self.rate, &Self::RATE_RANGE, 1.0),
            pitch: clamp(self.pitch, &Self::PITCH_RANGE, 1.0),
            volume: clamp(self.volume, &Self::VOLUME_RANGE, 1.0),
        }
    }
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            voice: 0,
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

pub struct SpeechDriver<E: SpeechEngine> {
    engine: E,
    text: String,
    settings: VoiceSettings,
    state: PlaybackState,
    outbox: VecDeque<PlaybackEvent>,
}

impl<E: SpeechEngine> SpeechDriver<E> {
    pub fn new(engine: E, text: impl Into<String>, settings: VoiceSettings) -> Self {
        Self {
            engine,
            text: text.into(),
            settings: settings.clamped(),
            state: PlaybackState::Idle,
            outbox: VecDeque::new(),
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn settings(&self) -> &VoiceSettings {
        &self.settings
    }

    pub fn voices(&self) -> Vec<Voice> {
        self.engine.voices()
    }

    /// Start speaking the bound text from the beginning.
    ///
    /// When already playing or paused the current utterance is cancelled and
    /// a clear event is queued before the new one starts.
    pub fn play(&mut self, now: Instant) -> Result<(), SpeechError> {
        if self.text.trim().is_empty() {
            return Err(SpeechError::EmptyText);
        }
        let voices = self.engine.voices();
        if voices.is_empty() {
            return Err(SpeechError::NoVoices);
        }

        self.engine.cancel();
        if self.state != PlaybackState::Idle {
            self.outbox.push_back(PlaybackEvent::clear());
            self.state = PlaybackState::Idle;
        }

        let voice = voices
            .get(self.settings.voice)
            .or_else(|| voices.first())
            .cloned();
        self.engine.speak(
            Utterance {
                text: self.text.clone(),
                voice,
                rate: self.settings.rate,
                pitch: self.settings.pitch,
                volume: self.settings.volume,
            },
            now,
        )?;
        self.state = PlaybackState::Playing;
        info!("speech started ({} chars)", self.text.chars().count());
        Ok(())
    }

    pub fn pause(&mut self, now: Instant) -> Result<(), SpeechError> {
        if self.state != PlaybackState::Playing {
            return Err(self.invalid("pause"));
        }
        self.engine.pause(now);
        self.state = PlaybackState::Paused;
        Ok(())
    }

    pub fn resume(&mut self, now: Instant) -> Result<(), SpeechError> {
        if self.state != PlaybackState::Paused {
            return Err(self.invalid("resume"));
        }
        self.engine.resume(now);
        self.state = PlaybackState::Playing;
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), SpeechError> {
        if self.state == PlaybackState::Idle {
            return Err(self.invalid("stop"));
        }
        self.engine.cancel();
        self.state = PlaybackState::Idle;
        self.outbox.push_back(PlaybackEvent::clear());
        info!("speech stopped");
        Ok(())
    }

    /// Bind new text. Playback in progress is stopped first.
    pub fn set_text(&mut self, text: impl Into<String>) {
        if self.state != PlaybackState::Idle {
            let _ = self.stop();
        }
        self.text = text.into();
    }

    /// Replace the voice parameters. Playback in progress is stopped first,
    /// since engines do not define mid-utterance changes.
    pub fn set_settings(&mut self, settings: VoiceSettings) -> Result<(), SpeechError> {
        let voices = self.engine.voices();
        if !voices.is_empty() && settings.voice >= voices.len() {
            return Err(SpeechError::UnknownVoice(settings.voice));
        }
        if self.state != PlaybackState::Idle {
            let _ = self.stop();
        }
        self.settings = settings.clamped();
        Ok(())
    }

    /// Pull engine progress up to `now` into the outbox.
    pub fn tick(&mut self, now: Instant) {
        for event in self.engine.poll(now) {
            match event {
                EngineEvent::Boundary {
                    char_index,
                    char_length,
                } => {
                    if self.state == PlaybackState::Idle {
                        continue;
                    }
                    let word: String = self
                        .text
                        .chars()
                        .skip(char_index)
                        .take(char_length)
                        .collect();
                    self.outbox
                        .push_back(PlaybackEvent::new(word, char_index, char_length));
                }
                EngineEvent::End => {
                    if self.state != PlaybackState::Idle {
                        self.state = PlaybackState::Idle;
                        self.outbox.push_back(PlaybackEvent::clear());
                        info!("speech ended");
                    }
                }
                other => debug!("engine event {:?}", other),
            }
        }
    }

    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        self.outbox.drain(..).collect()
    }

    fn invalid(&self, action: &'static str) -> SpeechError {
        SpeechError::InvalidTransition {
            from: self.state,
            action,
        }
    }
}
