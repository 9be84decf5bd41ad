//! Reading themes: colour contrast, font size and font family.

pub mod applier;
pub mod deferred;

pub use applier::{effective_style, is_highlighted, ApplyReport, ThemeApplier};
pub use deferred::DeferredQueue;

use crate::document::{InlineStyle, Rgb};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorScheme {
    pub label: &'static str,
    pub background: Rgb,
    pub foreground: Rgb,
}

pub const COLOR_SCHEMES: [ColorScheme; 4] = [
    ColorScheme {
        label: "Black on White",
        background: Rgb(0xFF, 0xFF, 0xFF),
        foreground: Rgb(0x00, 0x00, 0x00),
    },
    ColorScheme {
        label: "Yellow on Dark Blue",
        background: Rgb(0x00, 0x00, 0x66),
        foreground: Rgb(0xFF, 0xFF, 0x00),
    },
    ColorScheme {
        label: "Green on Black",
        background: Rgb(0x14, 0x14, 0x14),
        foreground: Rgb(0x0B, 0xFE, 0x54),
    },
    ColorScheme {
        label: "Light Gray on Dark Gray",
        background: Rgb(0x1E, 0x1E, 0x1E),
        foreground: Rgb(0xCC, 0xCC, 0xCC),
    },
];

pub const FONT_SIZES: [u16; 5] = [16, 18, 20, 22, 24];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontFamily {
    pub label: &'static str,
    pub stack: &'static str,
}

pub const FONT_FAMILIES: [FontFamily; 3] = [
    FontFamily {
        label: "Verdana",
        stack: "Verdana, sans-serif",
    },
    FontFamily {
        label: "Times New Roman",
        stack: "'Times New Roman', serif",
    },
    FontFamily {
        label: "Arial",
        stack: "Arial, sans-serif",
    },
];

/// Colours of the word being spoken. Always wins over the theme.
pub const HIGHLIGHT_BACKGROUND: Rgb = Rgb(0xFF, 0xEB, 0x3B);
pub const HIGHLIGHT_FOREGROUND: Rgb = Rgb(0x00, 0x00, 0x00);

/// Font size the reflow width is computed against.
pub const BASE_FONT_SIZE: u16 = 16;

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub background: Rgb,
    pub foreground: Rgb,
    pub font_size_px: u16,
    pub font_family: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_scheme(&COLOR_SCHEMES[0])
    }
}

impl Theme {
    pub fn from_scheme(scheme: &ColorScheme) -> Self {
        Self {
            background: scheme.background,
            foreground: scheme.foreground,
            font_size_px: FONT_SIZES[0],
            font_family: FONT_FAMILIES[0].stack.to_string(),
        }
    }

    pub fn with_scheme(&self, index: usize) -> Option<Self> {
        COLOR_SCHEMES.get(index).map(|scheme| Self {
            background: scheme.background,
            foreground: scheme.foreground,
            ..self.clone()
        })
    }

    /// Only the preset sizes are accepted.
    pub fn with_font_size(&self, px: u16) -> Option<Self> {
        FONT_SIZES.contains(&px).then(|| Self {
            font_size_px: px,
            ..self.clone()
        })
    }

    pub fn with_font_family(&self, index: usize) -> Option<Self> {
        FONT_FAMILIES.get(index).map(|family| Self {
            font_family: family.stack.to_string(),
            ..self.clone()
        })
    }

    pub fn scheme_label(&self) -> &'static str {
        COLOR_SCHEMES
            .iter()
            .find(|s| s.background == self.background && s.foreground == self.foreground)
            .map(|s| s.label)
            .unwrap_or("Custom")
    }

    pub fn family_label(&self) -> &str {
        FONT_FAMILIES
            .iter()
            .find(|f| f.stack == self.font_family)
            .map(|f| f.label)
            .unwrap_or(self.font_family.as_str())
    }

    pub fn as_style(&self) -> InlineStyle {
        InlineStyle {
            background: Some(self.background),
            foreground: Some(self.foreground),
            font_size_px: Some(self.font_size_px),
            font_family: Some(self.font_family.clone()),
        }
    }
}
