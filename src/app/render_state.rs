use std::time::Duration;

use crate::app::mode::AppMode;
use crate::document::RenderSurface;
use crate::speech::{PlaybackState, VoiceSettings};
use crate::theme::Theme;

/// Position within an audio document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioProgress {
    pub position: Duration,
    pub duration: Duration,
}

/// Render state for UI components
pub struct RenderState<'a> {
    pub mode: AppMode,
    pub surface: &'a RenderSurface,
    pub theme: &'a Theme,
    pub title: Option<&'a str>,
    pub playback: PlaybackState,
    pub highlighted: Option<usize>,
    pub token_count: usize,
    /// First visible page (0-based), pages per view and total pages.
    pub pages: (usize, usize, usize),
    pub voice_name: Option<String>,
    pub settings: &'a VoiceSettings,
    pub status: Option<&'a str>,
    /// Set when the document is audio rather than words.
    pub audio: Option<AudioProgress>,
}

impl RenderState<'_> {
    /// "Pages 3-4 of 10" style label, or `None` when nothing is loaded.
    pub fn page_label(&self) -> Option<String> {
        let (first, per_view, total) = self.pages;
        if total == 0 {
            return None;
        }
        let last = (first + per_view).min(total);
        if last - first <= 1 {
            Some(format!("Page {} of {}", first + 1, total))
        } else {
            Some(format!("Pages {}-{} of {}", first + 1, last, total))
        }
    }

    /// Spoken progress as (words reached, total words).
    pub fn progress(&self) -> (usize, usize) {
        let reached = self.highlighted.map(|i| i + 1).unwrap_or(0);
        (reached, self.token_count)
    }
}
