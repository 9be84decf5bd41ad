use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// 24-bit colour, written and parsed as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid colour '{0}', expected #RRGGBB")]
pub struct ParseColorError(pub String);

impl FromStr for Rgb {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().strip_prefix('#').unwrap_or(s.trim());
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ParseColorError(s.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| ParseColorError(s.to_string()))
        };
        Ok(Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// Inline presentation properties carried by the body, a region container
/// or any node of a content tree. Unset fields inherit from the parent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InlineStyle {
    pub background: Option<Rgb>,
    pub foreground: Option<Rgb>,
    pub font_size_px: Option<u16>,
    pub font_family: Option<String>,
}

impl InlineStyle {
    /// Fill every unset field from `parent`.
    pub fn inherit_from(&mut self, parent: &InlineStyle) {
        if self.background.is_none() {
            self.background = parent.background;
        }
        if self.foreground.is_none() {
            self.foreground = parent.foreground;
        }
        if self.font_size_px.is_none() {
            self.font_size_px = parent.font_size_px;
        }
        if self.font_family.is_none() {
            self.font_family = parent.font_family.clone();
        }
    }

    /// Overwrite with every field that is set in `other`.
    pub fn override_with(&mut self, other: &InlineStyle) {
        if other.background.is_some() {
            self.background = other.background;
        }
        if other.foreground.is_some() {
            self.foreground = other.foreground;
        }
        if other.font_size_px.is_some() {
            self.font_size_px = other.font_size_px;
        }
        if other.font_family.is_some() {
            self.font_family = other.font_family.clone();
        }
    }
}
