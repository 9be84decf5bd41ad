//! Audible speech through the platform's text-to-speech service
//!
//! System synthesizers do not report word boundaries portably, so the
//! boundaries come from a [`PacedEngine`] clock started alongside the voice.
//! Synthesizers cannot pause mid-utterance either: pausing stops the sound
//! and resuming speaks the text again from the first word not yet reached.

use std::ops::RangeInclusive;
use std::time::Instant;

use log::{info, warn};

use super::engine::{EngineEvent, SpeechEngine, SpeechError, Utterance, Voice};
use super::paced::PacedEngine;
use crate::engine::config::EngineKind;
use crate::reading::Pacing;

/// Something that turns text into sound.
pub trait Synthesizer {
    fn voices(&self) -> Vec<Voice>;

    /// Start speaking `text` with the utterance's voice and parameters,
    /// interrupting anything already playing.
    fn speak(&mut self, text: &str, utterance: &Utterance) -> Result<(), SpeechError>;

    fn stop(&mut self) -> Result<(), SpeechError>;
}

pub struct SystemEngine<S: Synthesizer> {
    synth: S,
    clock: PacedEngine,
    utterance: Option<Utterance>,
    resume_from: Option<usize>,
}

impl<S: Synthesizer> SystemEngine<S> {
    pub fn new(synth: S, pacing: Pacing) -> Self {
        let clock = PacedEngine::with_voices(pacing, Vec::new());
        Self {
            synth,
            clock,
            utterance: None,
            resume_from: None,
        }
    }

    fn silence(&mut self) {
        if let Err(err) = self.synth.stop() {
            warn!("could not stop speech: {}", err);
        }
    }
}

impl<S: Synthesizer> SpeechEngine for SystemEngine<S> {
    fn voices(&self) -> Vec<Voice> {
        self.synth.voices()
    }

    fn speak(&mut self, utterance: Utterance, now: Instant) -> Result<(), SpeechError> {
        self.clock.speak(utterance.clone(), now)?;
        if let Err(err) = self.synth.speak(&utterance.text, &utterance) {
            self.clock.cancel();
            return Err(err);
        }
        self.utterance = Some(utterance);
        self.resume_from = None;
        Ok(())
    }

    fn pause(&mut self, now: Instant) {
        self.clock.pause(now);
        self.resume_from = self.clock.next_boundary(now);
        self.silence();
    }

    fn resume(&mut self, now: Instant) {
        self.clock.resume(now);
        let (Some(utterance), Some(from)) = (&self.utterance, self.resume_from.take()) else {
            return;
        };
        let rest: String = utterance.text.chars().skip(from).collect();
        if let Err(err) = self.synth.speak(&rest, utterance) {
            warn!("could not resume speech: {}", err);
        }
    }

    fn cancel(&mut self) {
        self.clock.cancel();
        if self.utterance.take().is_some() {
            self.silence();
        }
        self.resume_from = None;
    }

    fn poll(&mut self, now: Instant) -> Vec<EngineEvent> {
        let events = self.clock.poll(now);
        if events.contains(&EngineEvent::End) {
            self.utterance = None;
        }
        events
    }
}

/// Map a setting onto a backend's `min..=max` scale, with 1.0 (or the
/// middle of `ours` when 1.0 is its top) landing on `normal`.
pub fn to_backend_scale(
    value: f32,
    ours: RangeInclusive<f32>,
    min: f32,
    normal: f32,
    max: f32,
) -> f32 {
    let (low, high) = (*ours.start(), *ours.end());
    let value = value.clamp(low, high);
    let pivot = if high > 1.0 { 1.0 } else { (low + high) / 2.0 };
    let scaled = if value <= pivot {
        let t = if pivot > low {
            (value - low) / (pivot - low)
        } else {
            1.0
        };
        min + t * (normal - min)
    } else {
        let t = (value - pivot) / (high - pivot);
        normal + t * (max - normal)
    };
    scaled.clamp(min.min(max), max.max(min))
}

/// The engine for `kind`: system voices when the `speech` feature is built
/// in and the platform answers, the silent paced engine otherwise.
pub fn build_engine(kind: EngineKind, pacing: Pacing) -> Box<dyn SpeechEngine> {
    if kind == EngineKind::System {
        #[cfg(feature = "speech")]
        {
            match tts_backend::TtsSynthesizer::new() {
                Ok(synth) => {
                    info!("speaking with {} system voices", synth.voices().len());
                    return Box::new(SystemEngine::new(synth, pacing));
                }
                Err(err) => warn!("system speech unavailable, staying silent: {}", err),
            }
        }
        #[cfg(not(feature = "speech"))]
        info!("built without the speech feature, staying silent");
    }
    Box::new(PacedEngine::new(pacing))
}

#[cfg(feature = "speech")]
pub mod tts_backend {
    use tts::Tts;

    use super::{to_backend_scale, Synthesizer};
    use crate::speech::driver::VoiceSettings;
    use crate::speech::engine::{SpeechError, Utterance, Voice};

    fn engine_error(err: tts::Error) -> SpeechError {
        SpeechError::Engine(err.to_string())
    }

    /// The platform synthesizer (speech-dispatcher, SAPI/WinRT, AVFoundation).
    pub struct TtsSynthesizer {
        tts: Tts,
        voices: Vec<tts::Voice>,
    }

    impl TtsSynthesizer {
        pub fn new() -> Result<Self, SpeechError> {
            let tts = Tts::default().map_err(engine_error)?;
            let voices = if tts.supported_features().voice {
                tts.voices().map_err(engine_error)?
            } else {
                Vec::new()
            };
            Ok(Self { tts, voices })
        }
    }

    impl Synthesizer for TtsSynthesizer {
        fn voices(&self) -> Vec<Voice> {
            if self.voices.is_empty() {
                return vec![Voice {
                    name: "System default".to_string(),
                    language: String::new(),
                }];
            }
            self.voices
                .iter()
                .map(|v| Voice {
                    name: v.name(),
                    language: v.language().to_string(),
                })
                .collect()
        }

        fn speak(&mut self, text: &str, utterance: &Utterance) -> Result<(), SpeechError> {
            let features = self.tts.supported_features();
            if features.voice {
                let chosen = utterance
                    .voice
                    .as_ref()
                    .and_then(|wanted| self.voices.iter().find(|v| v.name() == wanted.name));
                if let Some(voice) = chosen {
                    self.tts.set_voice(voice).map_err(engine_error)?;
                }
            }
            if features.rate {
                let rate = to_backend_scale(
                    utterance.rate,
                    VoiceSettings::RATE_RANGE,
                    self.tts.min_rate(),
                    self.tts.normal_rate(),
                    self.tts.max_rate(),
                );
                self.tts.set_rate(rate).map_err(engine_error)?;
            }
            if features.pitch {
                let pitch = to_backend_scale(
                    utterance.pitch,
                    VoiceSettings::PITCH_RANGE,
                    self.tts.min_pitch(),
                    self.tts.normal_pitch(),
                    self.tts.max_pitch(),
                );
                self.tts.set_pitch(pitch).map_err(engine_error)?;
            }
            if features.volume {
                let volume = to_backend_scale(
                    utterance.volume,
                    VoiceSettings::VOLUME_RANGE,
                    self.tts.min_volume(),
                    self.tts.normal_volume(),
                    self.tts.max_volume(),
                );
                self.tts.set_volume(volume).map_err(engine_error)?;
            }
            self.tts.speak(text, true).map_err(engine_error)?;
            Ok(())
        }

        fn stop(&mut self) -> Result<(), SpeechError> {
            if self.tts.supported_features().stop {
                self.tts.stop().map_err(engine_error)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::VoiceSettings;
    use std::time::Duration;

    #[derive(Default)]
    struct Recorder {
        spoken: Vec<String>,
        stops: usize,
        fail: bool,
    }

    impl Synthesizer for Recorder {
        fn voices(&self) -> Vec<Voice> {
            vec![
                Voice {
                    name: "Alex".to_string(),
                    language: "en-US".to_string(),
                },
                Voice {
                    name: "Amélie".to_string(),
                    language: "fr-CA".to_string(),
                },
            ]
        }

        fn speak(&mut self, text: &str, _utterance: &Utterance) -> Result<(), SpeechError> {
            if self.fail {
                return Err(SpeechError::Engine("no audio".to_string()));
            }
            self.spoken.push(text.to_string());
            Ok(())
        }

        fn stop(&mut self) -> Result<(), SpeechError> {
            self.stops += 1;
            Ok(())
        }
    }

    fn utterance(text: &str) -> Utterance {
        Utterance {
            text: text.to_string(),
            voice: None,
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
        }
    }

    fn engine() -> SystemEngine<Recorder> {
        SystemEngine::new(
            Recorder::default(),
            Pacing {
                wpm: 300,
                ..Pacing::default()
            },
        )
    }

    #[test]
    fn test_voices_come_from_the_synthesizer() {
        let engine = engine();
        let labels: Vec<String> = engine.voices().iter().map(Voice::label).collect();
        assert_eq!(labels, vec!["Alex (en-US)", "Amélie (fr-CA)"]);
    }

    #[test]
    fn test_speak_starts_voice_and_clock() {
        let mut engine = engine();
        let t0 = Instant::now();
        engine.speak(utterance("one two"), t0).unwrap();

        assert_eq!(engine.synth.spoken, vec!["one two"]);
        let events = engine.poll(t0);
        assert_eq!(events[0], EngineEvent::Start);
        assert_eq!(
            events[1],
            EngineEvent::Boundary {
                char_index: 0,
                char_length: 3
            }
        );
    }

    #[test]
    fn test_pause_silences_and_resume_speaks_the_rest() {
        let mut engine = engine();
        let t0 = Instant::now();
        engine.speak(utterance("one two three"), t0).unwrap();
        engine.poll(t0);

        engine.pause(t0 + Duration::from_millis(250));
        assert_eq!(engine.synth.stops, 1);

        engine.resume(t0 + Duration::from_secs(3));
        assert_eq!(engine.synth.spoken, vec!["one two three", "three"]);

        let events = engine.poll(t0 + Duration::from_secs(3) + Duration::from_millis(200));
        assert!(events.contains(&EngineEvent::Boundary {
            char_index: 8,
            char_length: 5
        }));
    }

    #[test]
    fn test_cancel_stops_sound_once() {
        let mut engine = engine();
        let t0 = Instant::now();
        engine.speak(utterance("one"), t0).unwrap();
        engine.cancel();
        engine.cancel();
        assert_eq!(engine.synth.stops, 1);
        assert!(engine.poll(t0 + Duration::from_secs(5)).is_empty());
    }

    #[test]
    fn test_synthesizer_failure_leaves_clock_idle() {
        let mut engine = SystemEngine::new(
            Recorder {
                fail: true,
                ..Recorder::default()
            },
            Pacing::default(),
        );
        let t0 = Instant::now();
        assert!(engine.speak(utterance("words"), t0).is_err());
        assert!(engine.poll(t0 + Duration::from_secs(5)).is_empty());
    }

    #[test]
    fn test_backend_scale_pivots_on_normal() {
        let rate = VoiceSettings::RATE_RANGE;
        assert_eq!(to_backend_scale(1.0, rate.clone(), -100.0, 0.0, 100.0), 0.0);
        assert_eq!(to_backend_scale(10.0, rate.clone(), -100.0, 0.0, 100.0), 100.0);
        assert_eq!(to_backend_scale(0.1, rate, -100.0, 0.0, 100.0), -100.0);

        let volume = VoiceSettings::VOLUME_RANGE;
        assert_eq!(to_backend_scale(0.5, volume.clone(), 0.0, 0.5, 1.0), 0.5);
        assert_eq!(to_backend_scale(0.0, volume, 0.0, 0.5, 1.0), 0.0);
    }

    #[test]
    fn test_silent_kind_builds_paced_engine() {
        let engine = build_engine(EngineKind::Silent, Pacing::default());
        assert_eq!(engine.voices()[0].name, "Paced (silent)");
    }
}
