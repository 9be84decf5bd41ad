use std::time::{Duration, Instant};

use log::info;

use super::{AudioClip, AudioError};
use crate::speech::PlaybackState;

/// Where samples go.
pub trait AudioOutput {
    /// Sound `clip` from sample `from` onward, replacing anything playing.
    fn start(&mut self, clip: &AudioClip, from: usize) -> Result<(), AudioError>;

    fn halt(&mut self);
}

/// Output used when there is no audio device; playback only keeps time.
#[derive(Debug, Default)]
pub struct SilentOutput;

impl AudioOutput for SilentOutput {
    fn start(&mut self, _clip: &AudioClip, _from: usize) -> Result<(), AudioError> {
        Ok(())
    }

    fn halt(&mut self) {}
}

/// The device output when built with the `audio` feature, silence otherwise.
pub fn build_output() -> Box<dyn AudioOutput> {
    #[cfg(feature = "audio")]
    {
        Box::new(super::device::DeviceOutput::new())
    }
    #[cfg(not(feature = "audio"))]
    {
        info!("built without the audio feature, audio files play silently");
        Box::new(SilentOutput)
    }
}

/// Play, pause and stop for one clip, with the position kept from the clock.
pub struct AudioPlayer {
    output: Box<dyn AudioOutput>,
    clip: Option<AudioClip>,
    state: PlaybackState,
    /// Position when playback last started or paused.
    offset: Duration,
    started_at: Option<Instant>,
    position: Duration,
}

impl AudioPlayer {
    pub fn new(output: Box<dyn AudioOutput>) -> Self {
        Self {
            output,
            clip: None,
            state: PlaybackState::Idle,
            offset: Duration::ZERO,
            started_at: None,
            position: Duration::ZERO,
        }
    }

    /// Replace the clip, stopping whatever was playing.
    pub fn load(&mut self, clip: Option<AudioClip>) {
        self.halt();
        self.clip = clip;
    }

    pub fn is_loaded(&self) -> bool {
        self.clip.is_some()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn position(&self) -> Duration {
        self.position
    }

    pub fn duration(&self) -> Duration {
        self.clip.as_ref().map_or(Duration::ZERO, AudioClip::duration)
    }

    /// Start from the beginning.
    pub fn play(&mut self, now: Instant) -> Result<(), AudioError> {
        let clip = self.clip.as_ref().ok_or(AudioError::NothingLoaded)?;
        self.output.start(clip, 0)?;
        self.offset = Duration::ZERO;
        self.position = Duration::ZERO;
        self.started_at = Some(now);
        self.state = PlaybackState::Playing;
        info!("audio playing ({:?})", clip.duration());
        Ok(())
    }

    pub fn pause(&mut self, now: Instant) {
        if self.state != PlaybackState::Playing {
            return;
        }
        self.tick(now);
        self.output.halt();
        self.offset = self.position;
        self.started_at = None;
        self.state = PlaybackState::Paused;
    }

    pub fn resume(&mut self, now: Instant) -> Result<(), AudioError> {
        if self.state != PlaybackState::Paused {
            return Ok(());
        }
        let clip = self.clip.as_ref().ok_or(AudioError::NothingLoaded)?;
        self.output.start(clip, clip.sample_at(self.offset))?;
        self.started_at = Some(now);
        self.state = PlaybackState::Playing;
        Ok(())
    }

    pub fn stop(&mut self) {
        if self.state != PlaybackState::Idle {
            info!("audio stopped");
        }
        self.halt();
    }

    /// Advance the position; reaching the end returns to idle.
    pub fn tick(&mut self, now: Instant) {
        let Some(started_at) = self.started_at else {
            return;
        };
        let duration = self.duration();
        self.position = (self.offset + now.saturating_duration_since(started_at)).min(duration);
        if self.position >= duration {
            info!("audio ended");
            self.halt();
        }
    }

    fn halt(&mut self) {
        self.output.halt();
        self.state = PlaybackState::Idle;
        self.offset = Duration::ZERO;
        self.position = Duration::ZERO;
        self.started_at = None;
    }
}
