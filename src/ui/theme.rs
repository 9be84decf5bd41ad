use ratatui::style::{Color, Modifier, Style};

use crate::document::{InlineStyle, Rgb};
use crate::theme::{Theme, BASE_FONT_SIZE};

pub fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Terminal style for a resolved content style. Font family and size have
/// no cell equivalent; size is handled by reflow instead.
pub fn style(inline: &InlineStyle) -> Style {
    let mut style = Style::default();
    if let Some(bg) = inline.background {
        style = style.bg(color(bg));
    }
    if let Some(fg) = inline.foreground {
        style = style.fg(color(fg));
    }
    style
}

/// Base style of the reading area.
pub fn page_style(theme: &Theme) -> Style {
    Style::default()
        .bg(color(theme.background))
        .fg(color(theme.foreground))
}

/// Status and title bars use the theme inverted.
pub fn bar_style(theme: &Theme) -> Style {
    Style::default()
        .bg(color(theme.foreground))
        .fg(color(theme.background))
        .add_modifier(Modifier::BOLD)
}

/// Columns available for text at the theme's font size.
///
/// Larger fonts get proportionally fewer columns, as a page would hold
/// fewer characters per line.
pub fn reflow_width(area_width: u16, theme: &Theme) -> usize {
    let size = theme.font_size_px.max(1) as usize;
    (area_width as usize * BASE_FONT_SIZE as usize / size).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflow_width_shrinks_with_font_size() {
        let theme = Theme::default();
        assert_eq!(reflow_width(80, &theme), 80);

        let large = theme.with_font_size(24).unwrap();
        assert_eq!(reflow_width(80, &large), 53);
    }

    #[test]
    fn test_style_maps_colours() {
        let inline = InlineStyle {
            background: Some(Rgb(0, 0, 0x66)),
            foreground: Some(Rgb(0xFF, 0xFF, 0)),
            ..InlineStyle::default()
        };
        let style = style(&inline);
        assert_eq!(style.bg, Some(Color::Rgb(0, 0, 0x66)));
        assert_eq!(style.fg, Some(Color::Rgb(0xFF, 0xFF, 0)));
    }
}
