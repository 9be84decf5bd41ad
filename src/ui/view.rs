//! Laying out the rendered regions as terminal lines
//!
//! Block elements start new lines, whitespace collapses to single spaces and
//! lines wrap at word boundaries within the reflow width. The line holding
//! the highlighted word is reported so the view can keep it on screen.

use ratatui::{
    layout::Alignment,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::document::html::is_block;
use crate::document::{ContentTree, NodeId, NodeKind, RegionId, RenderSurface};
use crate::theme::{effective_style, is_highlighted, Theme};
use crate::ui::theme::{bar_style, page_style, style};

#[derive(Debug, Clone, PartialEq)]
struct Segment {
    text: String,
    style: Style,
    highlighted: bool,
}

impl Segment {
    fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

pub struct PageView {
    pub lines: Vec<Line<'static>>,
    /// Index into `lines` of the line with the highlighted word.
    pub focus_line: Option<usize>,
}

/// Lay out every region of `surface` within `width` columns.
pub fn layout_surface(surface: &RenderSurface, width: usize) -> PageView {
    let mut rows: Vec<Vec<Segment>> = Vec::new();

    for (i, region) in surface.regions().iter().enumerate() {
        if i > 0 {
            rows.push(Vec::new());
        }
        match region.tree() {
            Ok(tree) => {
                let mut blocks = Vec::new();
                let mut current = Vec::new();
                collect(
                    surface,
                    region.id(),
                    tree,
                    tree.root(),
                    &mut current,
                    &mut blocks,
                );
                flush(&mut current, &mut blocks);
                for block in blocks {
                    rows.extend(wrap(block, width));
                }
            }
            Err(err) => rows.push(vec![Segment {
                text: format!("[{}]", err),
                style: Style::default().add_modifier(Modifier::ITALIC),
                highlighted: false,
            }]),
        }
    }

    let focus_line = rows
        .iter()
        .position(|row| row.iter().any(|seg| seg.highlighted));
    let lines = rows
        .into_iter()
        .map(|row| {
            Line::from(
                row.into_iter()
                    .map(|seg| Span::styled(seg.text, seg.style))
                    .collect::<Vec<_>>(),
            )
        })
        .collect();

    PageView { lines, focus_line }
}

fn collect(
    surface: &RenderSurface,
    region: RegionId,
    tree: &ContentTree,
    node: NodeId,
    current: &mut Vec<Segment>,
    blocks: &mut Vec<Vec<Segment>>,
) {
    let Some(n) = tree.node(node) else {
        return;
    };
    match &n.kind {
        NodeKind::Text(text) => {
            let style = style(&effective_style(surface, region, node));
            let highlighted = is_highlighted(tree, node);
            for run in runs(text) {
                current.push(Segment {
                    text: run,
                    style,
                    highlighted,
                });
            }
        }
        NodeKind::Element(tag) => {
            let block = is_block(tag);
            if block {
                flush(current, blocks);
            }
            for &child in n.children() {
                collect(surface, region, tree, child, current, blocks);
            }
            if block {
                flush(current, blocks);
            }
        }
    }
}

/// Whitespace runs collapse to one space; other runs are kept as they are.
fn runs(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut word = String::new();
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !word.is_empty() {
                out.push(std::mem::take(&mut word));
            }
            if !in_space {
                out.push(" ".to_string());
                in_space = true;
            }
        } else {
            in_space = false;
            word.push(ch);
        }
    }
    if !word.is_empty() {
        out.push(word);
    }
    out
}

fn flush(current: &mut Vec<Segment>, blocks: &mut Vec<Vec<Segment>>) {
    while current.last().is_some_and(Segment::is_blank) {
        current.pop();
    }
    if current.iter().any(|seg| !seg.is_blank()) {
        blocks.push(std::mem::take(current));
    }
    current.clear();
}

fn wrap(block: Vec<Segment>, width: usize) -> Vec<Vec<Segment>> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line: Vec<Segment> = Vec::new();
    let mut used = 0;

    for seg in block {
        if seg.is_blank() {
            // Spaces never start a line and are dropped at a break.
            if used > 0 && used < width {
                used += 1;
                line.push(seg);
            }
            continue;
        }

        let seg_width = UnicodeWidthStr::width(seg.text.as_str());
        if used + seg_width > width && used > 0 {
            while line.last().is_some_and(Segment::is_blank) {
                line.pop();
            }
            lines.push(std::mem::take(&mut line));
            used = 0;
        }

        if seg_width <= width {
            used += seg_width;
            line.push(seg);
            continue;
        }

        // Longer than a whole line: break between characters.
        let mut piece = String::new();
        for ch in seg.text.chars() {
            let w = ch.width().unwrap_or(0);
            if used + w > width && used > 0 {
                line.push(Segment {
                    text: std::mem::take(&mut piece),
                    ..seg.clone()
                });
                lines.push(std::mem::take(&mut line));
                used = 0;
            }
            piece.push(ch);
            used += w;
        }
        if !piece.is_empty() {
            line.push(Segment { text: piece, ..seg });
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// The reading area, scrolled so the focus line sits in the upper third.
pub fn render_page(view: PageView, theme: &Theme, height: u16) -> Paragraph<'static> {
    let offset = view
        .focus_line
        .map(|line| line.saturating_sub(height as usize / 3))
        .unwrap_or(0);
    Paragraph::new(view.lines)
        .style(page_style(theme))
        .scroll((offset.min(u16::MAX as usize) as u16, 0))
}

pub fn render_bar(text: String, theme: &Theme) -> Paragraph<'static> {
    Paragraph::new(text)
        .alignment(Alignment::Left)
        .style(bar_style(theme))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ContentRegion;
    use crate::reading::{segment, HighlightTracker};
    use crate::speech::PlaybackEvent;

    fn text_of(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn surface_with(paragraphs: &[&str]) -> RenderSurface {
        let mut tree = ContentTree::new();
        for text in paragraphs {
            let p = tree.append_element(tree.root(), "p");
            tree.append_text(p, text);
        }
        let mut surface = RenderSurface::new();
        surface.replace_regions(vec![ContentRegion::new(RegionId(0), "page", tree)]);
        surface
    }

    #[test]
    fn test_blocks_start_new_lines() {
        let mut surface = surface_with(&["first para", "second para"]);
        segment(&mut surface);
        let view = layout_surface(&surface, 80);
        let lines: Vec<String> = view.lines.iter().map(text_of).collect();
        assert_eq!(lines, vec!["first para", "second para"]);
    }

    #[test]
    fn test_wraps_at_word_boundaries() {
        let mut surface = surface_with(&["one two three four"]);
        segment(&mut surface);
        let view = layout_surface(&surface, 9);
        let lines: Vec<String> = view.lines.iter().map(text_of).collect();
        assert_eq!(lines, vec!["one two", "three", "four"]);
    }

    #[test]
    fn test_long_word_is_broken() {
        let surface = surface_with(&["abcdefghij"]);
        let view = layout_surface(&surface, 4);
        let lines: Vec<String> = view.lines.iter().map(text_of).collect();
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_focus_line_follows_highlight() {
        let mut surface = surface_with(&["alpha", "beta", "gamma"]);
        segment(&mut surface);
        let mut tracker = HighlightTracker::new();
        tracker.on_playback_event(&PlaybackEvent::new("gamma", 11, 5), &mut surface);

        let view = layout_surface(&surface, 80);
        assert_eq!(view.focus_line, Some(2));
    }

    #[test]
    fn test_isolated_region_shows_placeholder() {
        let mut surface = surface_with(&["visible"]);
        let mut regions: Vec<ContentRegion> = Vec::new();
        for region in surface.regions() {
            regions.push(ContentRegion::new(
                region.id(),
                region.label(),
                region.tree().unwrap().clone(),
            ));
        }
        regions.push(ContentRegion::isolated(RegionId(1), "embedded frame"));
        surface.replace_regions(regions);

        let view = layout_surface(&surface, 80);
        let lines: Vec<String> = view.lines.iter().map(text_of).collect();
        assert_eq!(lines[0], "visible");
        assert_eq!(lines[1], "");
        assert!(lines[2].contains("embedded frame"));
    }
}
