//! Silent engine that paces word boundaries against the clock
//!
//! Words are the whitespace-separated runs of the utterance. Each boundary
//! fires when the previous word's delay has elapsed; the delay follows the
//! reading pacing scaled by the utterance rate. Pauses stop the clock.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use log::debug;

use super::engine::{EngineEvent, SpeechEngine, SpeechError, Utterance, Voice};
use crate::reading::Pacing;

#[derive(Debug, Clone, PartialEq)]
struct Scheduled {
    at: Duration,
    event: EngineEvent,
}

#[derive(Debug)]
pub struct PacedEngine {
    pacing: Pacing,
    voices: Vec<Voice>,
    schedule: VecDeque<Scheduled>,
    pending: Vec<EngineEvent>,
    started_at: Option<Instant>,
    paused_at: Option<Instant>,
    paused_for: Duration,
}

impl PacedEngine {
    pub fn new(pacing: Pacing) -> Self {
        Self::with_voices(
            pacing,
            vec![Voice {
                name: "Paced (silent)".to_string(),
                language: "en".to_string(),
            }],
        )
    }

    pub fn with_voices(pacing: Pacing, voices: Vec<Voice>) -> Self {
        Self {
            pacing,
            voices,
            schedule: VecDeque::new(),
            pending: Vec::new(),
            started_at: None,
            paused_at: None,
            paused_for: Duration::ZERO,
        }
    }

    pub fn is_speaking(&self) -> bool {
        self.started_at.is_some()
    }

    /// Character offset of the first word not yet reached at `now`.
    pub fn next_boundary(&self, now: Instant) -> Option<usize> {
        let elapsed = self.elapsed(now);
        self.schedule.iter().find_map(|s| match s.event {
            EngineEvent::Boundary { char_index, .. } if s.at > elapsed => Some(char_index),
            _ => None,
        })
    }

    fn elapsed(&self, now: Instant) -> Duration {
        let Some(started) = self.started_at else {
            return Duration::ZERO;
        };
        let until = self.paused_at.unwrap_or(now);
        until
            .saturating_duration_since(started)
            .saturating_sub(self.paused_for)
    }
}

/// `(char_index, char_length, word)` for each whitespace-separated word.
fn word_spans(text: &str) -> Vec<(usize, usize, &str)> {
    let mut spans = Vec::new();
    let mut word_start: Option<(usize, usize)> = None;
    let mut char_pos = 0;

    for (byte_pos, ch) in text.char_indices() {
        match (ch.is_whitespace(), word_start) {
            (false, None) => word_start = Some((byte_pos, char_pos)),
            (true, Some((start_byte, start_char))) => {
                spans.push((start_char, char_pos - start_char, &text[start_byte..byte_pos]));
                word_start = None;
            }
            _ => {}
        }
        char_pos += 1;
    }
    if let Some((start_byte, start_char)) = word_start {
        spans.push((start_char, char_pos - start_char, &text[start_byte..]));
    }
    spans
}

impl SpeechEngine for PacedEngine {
    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    fn speak(&mut self, utterance: Utterance, now: Instant) -> Result<(), SpeechError> {
        let rate = if utterance.rate.is_finite() && utterance.rate > 0.0 {
            utterance.rate
        } else {
            return Err(SpeechError::Engine(format!(
                "invalid rate {}",
                utterance.rate
            )));
        };
        let pacing = Pacing {
            wpm: ((self.pacing.wpm as f32 * rate).round() as u32).max(1),
            ..self.pacing
        };

        self.schedule.clear();
        let mut at = Duration::ZERO;
        for (char_index, char_length, word) in word_spans(&utterance.text) {
            self.schedule.push_back(Scheduled {
                at,
                event: EngineEvent::Boundary {
                    char_index,
                    char_length,
                },
            });
            at += Duration::from_millis(pacing.word_delay_ms(word));
        }
        self.schedule.push_back(Scheduled {
            at,
            event: EngineEvent::End,
        });
        debug!(
            "paced engine scheduled {} boundaries over {:?} at {} wpm",
            self.schedule.len() - 1,
            at,
            pacing.wpm
        );

        self.started_at = Some(now);
        self.paused_at = None;
        self.paused_for = Duration::ZERO;
        self.pending.push(EngineEvent::Start);
        Ok(())
    }

    fn pause(&mut self, now: Instant) {
        if self.started_at.is_some() && self.paused_at.is_none() {
            self.paused_at = Some(now);
            self.pending.push(EngineEvent::Pause);
        }
    }

    fn resume(&mut self, now: Instant) {
        if let Some(paused_at) = self.paused_at.take() {
            self.paused_for += now.saturating_duration_since(paused_at);
            self.pending.push(EngineEvent::Resume);
        }
    }

    fn cancel(&mut self) {
        self.schedule.clear();
        self.pending.clear();
        self.started_at = None;
        self.paused_at = None;
        self.paused_for = Duration::ZERO;
    }

    fn poll(&mut self, now: Instant) -> Vec<EngineEvent> {
        let mut events = std::mem::take(&mut self.pending);
        if self.started_at.is_none() {
            return events;
        }

        let elapsed = self.elapsed(now);
        while self.schedule.front().is_some_and(|s| s.at <= elapsed) {
            if let Some(scheduled) = self.schedule.pop_front() {
                events.push(scheduled.event);
            }
        }
        if self.schedule.is_empty() {
            self.started_at = None;
        }
        events
    }
}
