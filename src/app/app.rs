use std::time::{Duration, Instant};

use log::{debug, error, info, warn};

use super::event::AppEvent;
use super::mode::AppMode;
use super::render_state::RenderState;
use super::render_state::AudioProgress;
use crate::audio::{self, AudioOutput, AudioPlayer};
use crate::document::RenderSurface;
use crate::engine::{Config, ReaderError};
use crate::input::{self, clipboard, Document, Pager};
use crate::reading::{segment, HighlightTracker};
use crate::speech::{
    build_engine, PlaybackState, SpeechDriver, SpeechEngine, SpeechError, Voice, VoiceSettings,
};
use crate::theme::{DeferredQueue, Theme, ThemeApplier};

pub const HELP_TEXT: &str = "space play/pause  s stop  n/p page  : command  q quit | \
:scheme 1-4  :size 16-24  :font 1-3  :rate x  :pitch x  :volume x  :voice N  @file  @@ clipboard";

/// How long a status message stays up when no further event replaces it.
pub const STATUS_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredTask {
    ReapplyTheme,
}

pub struct App {
    config: Config,
    mode: AppMode,
    document: Option<Box<dyn Document>>,
    pager: Pager,
    surface: RenderSurface,
    token_count: usize,
    tracker: HighlightTracker,
    driver: SpeechDriver<Box<dyn SpeechEngine>>,
    audio: AudioPlayer,
    theme: Theme,
    applier: ThemeApplier,
    deferred: DeferredQueue<DeferredTask>,
    /// Message and the time it was set; cleared by the next event or
    /// after [`STATUS_TIMEOUT`].
    status: Option<(String, Instant)>,
}

impl App {
    /// An app speaking through the configured engine and playing audio on
    /// the default output.
    pub fn new(config: Config) -> Self {
        let engine = build_engine(config.speech.engine, config.speech.pacing());
        Self::with_backends(config, engine, audio::build_output())
    }

    pub fn with_backends(
        config: Config,
        engine: Box<dyn SpeechEngine>,
        output: Box<dyn AudioOutput>,
    ) -> Self {
        let driver = SpeechDriver::new(engine, String::new(), config.speech.voice.clone());
        Self {
            mode: AppMode::Command,
            document: None,
            pager: Pager::new(config.paging.pages_per_view),
            surface: RenderSurface::new(),
            token_count: 0,
            tracker: HighlightTracker::new(),
            driver,
            audio: AudioPlayer::new(output),
            theme: config.theme.theme(),
            applier: ThemeApplier::new(),
            deferred: DeferredQueue::new(),
            status: None,
            config,
        }
    }

    pub fn mode(&self) -> AppMode {
        self.mode
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn surface(&self) -> &RenderSurface {
        &self.surface
    }

    #[cfg(test)]
    pub(crate) fn surface_mut_for_test(&mut self) -> &mut RenderSurface {
        &mut self.surface
    }

    /// Speech state, or the audio player's for audio documents.
    pub fn playback_state(&self) -> PlaybackState {
        if self.audio.is_loaded() {
            self.audio.state()
        } else {
            self.driver.state()
        }
    }

    pub fn spoken_text(&self) -> &str {
        self.driver.text()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_ref().map(|(text, _)| text.as_str())
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        self.handle_event_at(event, Instant::now());
    }

    /// Handle `event` as if it happened at `now`.
    ///
    /// Any status from an earlier event is dropped first. Failures are
    /// logged and shown in the status line. A command submitted from the
    /// deck hands focus back to the document when one is loaded, unless it
    /// was help or could not be parsed.
    pub fn handle_event_at(&mut self, event: AppEvent, now: Instant) {
        debug!("event {:?}", event);
        self.status = None;
        let from_deck = self.mode == AppMode::Command;
        let keeps_deck = matches!(
            event,
            AppEvent::EnterCommand | AppEvent::Help | AppEvent::InvalidCommand(_)
        );

        self.dispatch(event, now);

        if from_deck && !keeps_deck && self.mode == AppMode::Command && self.document.is_some() {
            self.mode = AppMode::Reading;
        }
    }

    fn dispatch(&mut self, event: AppEvent, now: Instant) {
        match event {
            AppEvent::Quit => {
                let _ = self.driver.stop();
                self.audio.stop();
                self.mode = AppMode::Quit;
            }
            AppEvent::Help => self.set_status(HELP_TEXT, now),
            AppEvent::InvalidCommand(input) => {
                self.set_status(format!("Unknown command: {}", input), now);
            }
            AppEvent::EnterCommand => self.mode = AppMode::Command,
            AppEvent::LeaveCommand => {
                if self.document.is_some() {
                    self.mode = AppMode::Reading;
                }
            }
            AppEvent::LoadFile(path) => {
                let loaded = input::open(&path, self.config.paging.lines_per_page);
                self.finish_load(loaded, now);
            }
            AppEvent::LoadClipboard => {
                let loaded = clipboard::load(self.config.paging.lines_per_page)
                    .map(|doc| Box::new(doc) as Box<dyn Document>);
                self.finish_load(loaded, now);
            }
            AppEvent::TogglePlayback if self.audio.is_loaded() => {
                let result = match self.audio.state() {
                    PlaybackState::Idle => self.audio.play(now),
                    PlaybackState::Playing => {
                        self.audio.pause(now);
                        Ok(())
                    }
                    PlaybackState::Paused => self.audio.resume(now),
                };
                if let Err(err) = result {
                    self.report(ReaderError::from(err), now);
                }
            }
            AppEvent::TogglePlayback => {
                let result = match self.driver.state() {
                    PlaybackState::Idle => self.driver.play(now),
                    PlaybackState::Playing => self.driver.pause(now),
                    PlaybackState::Paused => self.driver.resume(now),
                };
                self.report_speech(result, now);
            }
            AppEvent::Stop if self.audio.is_loaded() => self.audio.stop(),
            AppEvent::Stop => {
                if let Err(err) = self.driver.stop() {
                    debug!("stop ignored: {}", err);
                }
            }
            AppEvent::NextPage => {
                let Some(document) = &self.document else {
                    return;
                };
                if self.pager.next(document.as_ref()) {
                    self.rebuild(now);
                } else {
                    self.set_status("Already at the last page", now);
                }
            }
            AppEvent::PrevPage => {
                if self.document.is_some() {
                    if self.pager.prev() {
                        self.rebuild(now);
                    } else {
                        self.set_status("Already at the first page", now);
                    }
                }
            }
            AppEvent::SetColorScheme(index) => match self.theme.with_scheme(index) {
                Some(theme) => self.set_theme(theme, now),
                None => self.set_status(format!("No colour scheme {}", index + 1), now),
            },
            AppEvent::SetFontSize(px) => match self.theme.with_font_size(px) {
                Some(theme) => self.set_theme(theme, now),
                None => self.set_status(format!("Font size {}px is not available", px), now),
            },
            AppEvent::SetFontFamily(index) => match self.theme.with_font_family(index) {
                Some(theme) => self.set_theme(theme, now),
                None => self.set_status(format!("No font family {}", index + 1), now),
            },
            AppEvent::SetRate(rate) => self.update_voice(|s| s.rate = rate, now),
            AppEvent::SetPitch(pitch) => self.update_voice(|s| s.pitch = pitch, now),
            AppEvent::SetVolume(volume) => self.update_voice(|s| s.volume = volume, now),
            AppEvent::SelectVoice(voice) => self.update_voice(|s| s.voice = voice, now),
        }
    }

    /// Show `document` from its first page.
    pub fn load_document(&mut self, document: Box<dyn Document>, now: Instant) {
        info!(
            "showing '{}' ({} pages)",
            document.title(),
            document.page_count()
        );
        self.set_status(format!("Loaded {}", document.title()), now);
        self.audio.load(document.audio().cloned());
        self.document = Some(document);
        self.pager = Pager::new(self.config.paging.pages_per_view);
        self.rebuild(now);
        self.mode = AppMode::Reading;
    }

    /// Advance speech and audio to `now`, move the highlight, expire the
    /// status, and run deferred work that is still current.
    pub fn tick(&mut self, now: Instant) {
        if let Some((_, since)) = &self.status {
            if now.saturating_duration_since(*since) >= STATUS_TIMEOUT {
                self.status = None;
            }
        }

        self.audio.tick(now);
        self.driver.tick(now);
        for event in self.driver.drain_events() {
            self.tracker.on_playback_event(&event, &mut self.surface);
        }

        for task in self.deferred.take_due(now, self.surface.generation()) {
            match task {
                DeferredTask::ReapplyTheme => {
                    self.applier.apply(&self.theme, &mut self.surface);
                }
            }
        }
    }

    pub fn render_state(&self) -> RenderState<'_> {
        let settings = self.driver.settings();
        RenderState {
            mode: self.mode,
            surface: &self.surface,
            theme: &self.theme,
            title: self.document.as_ref().map(|d| d.title()),
            playback: self.playback_state(),
            highlighted: self.tracker.state().last_highlighted_index(),
            token_count: self.token_count,
            pages: (
                self.pager.first_page(),
                self.pager.per_view(),
                self.document.as_ref().map_or(0, |d| d.page_count()),
            ),
            voice_name: self.driver.voices().get(settings.voice).map(Voice::label),
            settings,
            status: self.status(),
            audio: self.audio.is_loaded().then(|| AudioProgress {
                position: self.audio.position(),
                duration: self.audio.duration(),
            }),
        }
    }

    fn finish_load(&mut self, loaded: Result<Box<dyn Document>, input::LoadError>, now: Instant) {
        match loaded {
            Ok(document) => self.load_document(document, now),
            Err(err) => {
                let err = ReaderError::from(err);
                error!("load failed: {}", err);
                self.set_status(err.to_string(), now);
            }
        }
    }

    /// Re-render the visible pages and bind speech to the new words.
    fn rebuild(&mut self, now: Instant) {
        let Some(document) = &self.document else {
            return;
        };

        if self.driver.state() != PlaybackState::Idle {
            let _ = self.driver.stop();
        }
        for event in self.driver.drain_events() {
            self.tracker.on_playback_event(&event, &mut self.surface);
        }

        self.pager.render(document.as_ref(), &mut self.surface);
        self.tracker.reset();
        let segmentation = segment(&mut self.surface);
        self.token_count = segmentation.tokens.len();
        self.driver.set_text(segmentation.full_text);
        debug!(
            "page {} rendered with {} words (generation {})",
            self.pager.first_page() + 1,
            self.token_count,
            self.surface.generation()
        );

        self.apply_theme(now);
    }

    fn set_theme(&mut self, theme: Theme, now: Instant) {
        self.theme = theme;
        self.apply_theme(now);
        let summary = format!(
            "{}, {}px, {}",
            self.theme.scheme_label(),
            self.theme.font_size_px,
            self.theme.family_label()
        );
        self.set_status(summary, now);
    }

    fn apply_theme(&mut self, now: Instant) {
        let report = self.applier.apply(&self.theme, &mut self.surface);
        if !report.skipped.is_empty() {
            warn!("theme skipped regions: {}", report.skipped.join(", "));
        }
        let delay = Duration::from_millis(self.config.theme.reapply_delay_ms);
        self.deferred.schedule(
            DeferredTask::ReapplyTheme,
            self.surface.generation(),
            now + delay,
        );
    }

    fn update_voice(&mut self, change: impl FnOnce(&mut VoiceSettings), now: Instant) {
        let mut settings = self.driver.settings().clone();
        change(&mut settings);
        let result = self.driver.set_settings(settings);
        self.report_speech(result, now);
        for event in self.driver.drain_events() {
            self.tracker.on_playback_event(&event, &mut self.surface);
        }
    }

    fn report_speech(&mut self, result: Result<(), SpeechError>, now: Instant) {
        match result {
            Ok(()) => {}
            Err(err @ SpeechError::InvalidTransition { .. }) => debug!("{}", err),
            Err(err) => self.report(err.into(), now),
        }
    }

    fn report(&mut self, err: ReaderError, now: Instant) {
        warn!("{}", err);
        self.set_status(err.to_string(), now);
    }

    fn set_status(&mut self, text: impl Into<String>, now: Instant) {
        self.status = Some((text.into(), now));
    }
}
