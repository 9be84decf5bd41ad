// Configuration for the reader, speech and theme
// Defaults below; `Config::from_env` overlays READALOUD_* variables

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::reading::Pacing;
use crate::speech::VoiceSettings;
use crate::theme::{Theme, COLOR_SCHEMES, FONT_FAMILIES, FONT_SIZES};

/// Speech configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechConfig {
    /// Voice index, rate (0.1..=10), pitch (0..=2) and volume (0..=1)
    pub voice: VoiceSettings,

    /// Pace of word boundaries at rate 1.0 (default 180)
    pub wpm: u32,

    /// Which engine speaks (default System, silent when unavailable)
    pub engine: EngineKind,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            voice: VoiceSettings::default(),
            wpm: 180,
            engine: EngineKind::System,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    /// System text-to-speech voices
    System,
    /// Boundaries on the clock, no sound
    Silent,
}

impl FromStr for EngineKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "system" => Ok(EngineKind::System),
            "silent" => Ok(EngineKind::Silent),
            other => Err(format!("unknown engine '{}'", other)),
        }
    }
}

impl SpeechConfig {
    pub fn pacing(&self) -> Pacing {
        Pacing {
            wpm: self.wpm,
            ..Pacing::default()
        }
    }
}

/// Theme configuration, as indices into the preset tables
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeConfig {
    /// Colour scheme (default 0, Black on White)
    pub scheme: usize,

    /// Font size in px (default 16)
    pub font_size_px: u16,

    /// Font family (default 0, Verdana)
    pub font_family: usize,

    /// Delay before the theme is applied a second time (default 500ms)
    pub reapply_delay_ms: u64,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            scheme: 0,
            font_size_px: FONT_SIZES[0],
            font_family: 0,
            reapply_delay_ms: 500,
        }
    }
}

impl ThemeConfig {
    pub fn theme(&self) -> Theme {
        let base = Theme::default();
        let with_scheme = base.with_scheme(self.scheme).unwrap_or(base);
        let with_size = with_scheme
            .with_font_size(self.font_size_px)
            .unwrap_or(with_scheme);
        with_size
            .with_font_family(self.font_family)
            .unwrap_or(with_size)
    }
}

/// Pagination configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PagingConfig {
    /// Pages rendered side by side (default 1)
    pub pages_per_view: usize,

    /// Lines per page for plain text and clipboard input (default 40)
    pub lines_per_page: usize,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            pages_per_view: 1,
            lines_per_page: 40,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    /// Log file; the terminal itself is owned by the UI (default readaloud.log)
    pub file: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("readaloud.log"),
        }
    }
}

/// Master configuration combining all reader settings
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
    pub speech: SpeechConfig,
    pub theme: ThemeConfig,
    pub paging: PagingConfig,
    pub log: LogConfig,
}

/// A `READALOUD_*` value that was ignored.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    #[error("ignoring {key}={value:?}: not a valid value")]
    Invalid { key: &'static str, value: String },

    #[error("ignoring {key}={value}: out of range")]
    OutOfRange { key: &'static str, value: String },
}

impl ConfigWarning {
    pub fn key(&self) -> &'static str {
        match self {
            ConfigWarning::Invalid { key, .. } | ConfigWarning::OutOfRange { key, .. } => *key,
        }
    }
}

impl Config {
    /// Defaults overlaid with the process environment.
    ///
    /// Call [`load_dotenv`] first so `.env` values are visible here. The
    /// warnings are returned rather than logged because logging is set up
    /// from this config.
    pub fn from_env() -> (Self, Vec<ConfigWarning>) {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with whatever `lookup` returns. Values that do not
    /// parse or fall outside the presets are ignored and reported.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> (Self, Vec<ConfigWarning>) {
        let mut config = Config::default();
        let mut overlay = Overlay {
            lookup,
            warnings: Vec::new(),
        };

        if let Some(rate) = overlay.checked("READALOUD_RATE", |r: &f32| {
            VoiceSettings::RATE_RANGE.contains(r)
        }) {
            config.speech.voice.rate = rate;
        }
        if let Some(pitch) = overlay.checked("READALOUD_PITCH", |p: &f32| {
            VoiceSettings::PITCH_RANGE.contains(p)
        }) {
            config.speech.voice.pitch = pitch;
        }
        if let Some(volume) = overlay.checked("READALOUD_VOLUME", |v: &f32| {
            VoiceSettings::VOLUME_RANGE.contains(v)
        }) {
            config.speech.voice.volume = volume;
        }
        if let Some(voice) = overlay.checked("READALOUD_VOICE", |_: &usize| true) {
            config.speech.voice.voice = voice;
        }
        if let Some(wpm) = overlay.checked("READALOUD_WPM", |w: &u32| *w > 0) {
            config.speech.wpm = wpm;
        }
        if let Some(engine) = overlay.checked("READALOUD_ENGINE", |_: &EngineKind| true) {
            config.speech.engine = engine;
        }
        if let Some(scheme) = overlay.checked("READALOUD_SCHEME", |s: &usize| {
            *s < COLOR_SCHEMES.len()
        }) {
            config.theme.scheme = scheme;
        }
        if let Some(size) = overlay.checked("READALOUD_FONT_SIZE", |px: &u16| {
            FONT_SIZES.contains(px)
        }) {
            config.theme.font_size_px = size;
        }
        if let Some(family) = overlay.checked("READALOUD_FONT_FAMILY", |f: &usize| {
            *f < FONT_FAMILIES.len()
        }) {
            config.theme.font_family = family;
        }
        if let Some(pages) = overlay.checked("READALOUD_PAGES_PER_VIEW", |p: &usize| *p > 0) {
            config.paging.pages_per_view = pages;
        }
        if let Some(file) = (overlay.lookup)("READALOUD_LOG_FILE").filter(|f| !f.trim().is_empty())
        {
            config.log.file = PathBuf::from(file);
        }

        (config, overlay.warnings)
    }
}

struct Overlay<F> {
    lookup: F,
    warnings: Vec<ConfigWarning>,
}

impl<F: Fn(&str) -> Option<String>> Overlay<F> {
    fn checked<T: FromStr + fmt::Debug>(
        &mut self,
        key: &'static str,
        valid: impl Fn(&T) -> bool,
    ) -> Option<T> {
        let raw = (self.lookup)(key)?;
        let Ok(value) = raw.trim().parse::<T>() else {
            self.warnings.push(ConfigWarning::Invalid { key, value: raw });
            return None;
        };
        if valid(&value) {
            Some(value)
        } else {
            self.warnings.push(ConfigWarning::OutOfRange {
                key,
                value: format!("{:?}", value),
            });
            None
        }
    }
}

/// Load `.env` from the working directory or its parent, if one exists.
/// Returns whether a file was loaded.
pub fn load_dotenv() -> bool {
    for path in [PathBuf::from(".env"), PathBuf::from("../.env")] {
        if path.exists() && dotenvy::from_path(&path).is_ok() {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.speech.voice, VoiceSettings::default());
        assert_eq!(config.theme.reapply_delay_ms, 500);
        assert_eq!(config.paging.pages_per_view, 1);
        assert_eq!(config.log.file, PathBuf::from("readaloud.log"));
        assert_eq!(config.theme.theme(), Theme::default());
    }

    #[test]
    fn test_env_overlay() {
        let (config, warnings) = Config::from_lookup(lookup(&[
            ("READALOUD_RATE", "1.5"),
            ("READALOUD_ENGINE", "Silent"),
            ("READALOUD_SCHEME", "2"),
            ("READALOUD_FONT_SIZE", "22"),
            ("READALOUD_PAGES_PER_VIEW", "2"),
            ("READALOUD_LOG_FILE", "/tmp/reader.log"),
        ]));

        assert!(warnings.is_empty());
        assert_eq!(config.speech.voice.rate, 1.5);
        assert_eq!(config.speech.engine, EngineKind::Silent);
        assert_eq!(config.theme.scheme, 2);
        assert_eq!(config.paging.pages_per_view, 2);
        assert_eq!(config.log.file, PathBuf::from("/tmp/reader.log"));

        let theme = config.theme.theme();
        assert_eq!(theme.scheme_label(), "Green on Black");
        assert_eq!(theme.font_size_px, 22);
    }

    #[test]
    fn test_invalid_values_are_ignored() {
        let (config, warnings) = Config::from_lookup(lookup(&[
            ("READALOUD_RATE", "fast"),
            ("READALOUD_VOLUME", "3"),
            ("READALOUD_FONT_SIZE", "17"),
            ("READALOUD_SCHEME", "9"),
            ("READALOUD_PAGES_PER_VIEW", "0"),
            ("READALOUD_ENGINE", "espeak"),
        ]));
        assert_eq!(config, Config::default());

        let keys: Vec<&str> = warnings.iter().map(ConfigWarning::key).collect();
        assert_eq!(
            keys,
            vec![
                "READALOUD_RATE",
                "READALOUD_VOLUME",
                "READALOUD_ENGINE",
                "READALOUD_SCHEME",
                "READALOUD_FONT_SIZE",
                "READALOUD_PAGES_PER_VIEW",
            ]
        );
        assert_eq!(
            warnings[0],
            ConfigWarning::Invalid {
                key: "READALOUD_RATE",
                value: "fast".to_string()
            }
        );
        assert_eq!(
            warnings[1].to_string(),
            "ignoring READALOUD_VOLUME=3.0: out of range"
        );
    }
}
