//! Pushing a theme into everything currently rendered

use log::{debug, warn};

use super::{Theme, HIGHLIGHT_BACKGROUND, HIGHLIGHT_FOREGROUND};
use crate::document::{ContentTree, InlineStyle, NodeId, RegionId, RenderSurface};
use crate::reading::token::HIGHLIGHT_CLASS;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Regions whose content tree received the theme.
    pub applied: usize,
    /// Labels of regions whose content could not be reached.
    pub skipped: Vec<String>,
}

#[derive(Debug, Default)]
pub struct ThemeApplier;

impl ThemeApplier {
    pub fn new() -> Self {
        Self
    }

    /// Apply `theme` to the body, every region container and every
    /// reachable region tree. Unreachable trees are logged and skipped.
    ///
    /// Marker elements are never styled here, so the highlight still wins
    /// through [`effective_style`].
    pub fn apply(&self, theme: &Theme, surface: &mut RenderSurface) -> ApplyReport {
        let style = theme.as_style();
        let mut report = ApplyReport::default();

        surface.body_style = style.clone();
        for region in surface.regions_mut() {
            region.container_style = style.clone();
            match region.tree_mut() {
                Ok(tree) => {
                    let root = tree.root();
                    if let Some(node) = tree.node_mut(root) {
                        node.style = style.clone();
                    }
                    report.applied += 1;
                }
                Err(err) => {
                    warn!("theme not applied inside region: {}", err);
                    report.skipped.push(region.label().to_string());
                }
            }
        }

        debug!(
            "applied theme '{}' {}px to {} regions ({} skipped)",
            theme.scheme_label(),
            theme.font_size_px,
            report.applied,
            report.skipped.len()
        );
        report
    }
}

/// Style a node is drawn with: the resolved theme style, with the highlight
/// colours on top when the node or one of its ancestors is the active word.
pub fn effective_style(surface: &RenderSurface, region: RegionId, node: NodeId) -> InlineStyle {
    let mut style = surface.resolved_style(region, node);
    let highlighted = surface
        .region(region)
        .and_then(|r| r.tree().ok())
        .is_some_and(|tree| is_highlighted(tree, node));

    if highlighted {
        style.background = Some(HIGHLIGHT_BACKGROUND);
        style.foreground = Some(HIGHLIGHT_FOREGROUND);
    }
    style
}

/// Whether `node` is the active word or sits inside it.
pub fn is_highlighted(tree: &ContentTree, node: NodeId) -> bool {
    let mut cursor = Some(node);
    while let Some(id) = cursor {
        let Some(current) = tree.node(id) else {
            return false;
        };
        if current.has_class(HIGHLIGHT_CLASS) {
            return true;
        }
        cursor = current.parent();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ContentRegion;
    use crate::reading::{segment, HighlightTracker};
    use crate::speech::PlaybackEvent;

    fn surface() -> RenderSurface {
        let mut tree = ContentTree::new();
        let p = tree.append_element(tree.root(), "p");
        tree.append_text(p, "read this aloud");
        let mut surface = RenderSurface::new();
        surface.replace_regions(vec![
            ContentRegion::new(RegionId(0), "page 1", tree),
            ContentRegion::isolated(RegionId(1), "frame"),
        ]);
        surface
    }

    #[test]
    fn test_apply_reaches_body_containers_and_trees() {
        let mut surface = surface();
        let theme = Theme::default().with_scheme(2).unwrap();
        let report = ThemeApplier::new().apply(&theme, &mut surface);

        assert_eq!(report.applied, 1);
        assert_eq!(report.skipped, vec!["frame".to_string()]);
        assert_eq!(surface.body_style.background, Some(theme.background));
        assert_eq!(
            surface.regions()[1].container_style.foreground,
            Some(theme.foreground)
        );
    }

    #[test]
    fn test_highlight_wins_over_theme() {
        let mut surface = surface();
        let seg = segment(&mut surface);
        let mut tracker = HighlightTracker::new();
        tracker.on_playback_event(&PlaybackEvent::new("this", 5, 4), &mut surface);

        let theme = Theme::default().with_scheme(1).unwrap();
        ThemeApplier::new().apply(&theme, &mut surface);

        let active = seg.tokens[1].location;
        let style = effective_style(&surface, active.region, active.node);
        assert_eq!(style.background, Some(HIGHLIGHT_BACKGROUND));
        assert_eq!(style.foreground, Some(HIGHLIGHT_FOREGROUND));
        assert_eq!(style.font_size_px, Some(theme.font_size_px));

        let other = seg.tokens[0].location;
        let plain = effective_style(&surface, other.region, other.node);
        assert_eq!(plain.background, Some(theme.background));
    }

    #[test]
    fn test_reapply_is_stable() {
        let mut surface = surface();
        let theme = Theme::default();
        let applier = ThemeApplier::new();
        let first = applier.apply(&theme, &mut surface);
        let second = applier.apply(&theme, &mut surface);
        assert_eq!(first, second);
    }
}
