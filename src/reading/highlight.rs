//! Karaoke highlighting of the word being spoken
//!
//! [`reduce`] is the pure step: given the tracker state, one playback event
//! and the current tokens, it picks the next token to mark. The
//! [`HighlightTracker`] applies that decision to the render surface.

use log::{debug, warn};

use super::segmenter::current_tokens;
use super::token::{WordToken, HIGHLIGHT_CLASS};
use crate::document::RenderSurface;
use crate::speech::PlaybackEvent;

/// Index of the last highlighted token in the current playback session.
/// `None` means nothing has been highlighted since the last reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighlightState {
    last_highlighted: Option<usize>,
}

impl HighlightState {
    pub fn last_highlighted_index(&self) -> Option<usize> {
        self.last_highlighted
    }

    fn admits(&self, index: usize) -> bool {
        self.last_highlighted.map_or(true, |last| index > last)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightOutcome {
    Highlighted(usize),
    NoMatch,
    Cleared,
}

/// Pick the token to mark for `event`.
///
/// A clear event resets the state. Otherwise the first token (in the given
/// order) whose trimmed text equals the trimmed word and whose index is past
/// the last highlighted one wins. No candidate leaves the state unchanged.
pub fn reduce(
    state: HighlightState,
    event: &PlaybackEvent,
    tokens: &[WordToken],
) -> (HighlightState, Option<usize>) {
    if event.is_clear() {
        return (HighlightState::default(), None);
    }

    let word = event.word.trim();
    let next = tokens
        .iter()
        .find(|token| token.text.trim() == word && state.admits(token.index));

    match next {
        Some(token) => (
            HighlightState {
                last_highlighted: Some(token.index),
            },
            Some(token.index),
        ),
        None => (state, None),
    }
}

/// Marker elements currently carrying the highlight class, across regions.
pub fn active_markers(surface: &RenderSurface) -> Vec<WordToken> {
    current_tokens(surface)
        .into_iter()
        .filter(|token| {
            surface
                .region(token.location.region)
                .and_then(|r| r.tree().ok())
                .and_then(|tree| tree.node(token.location.node))
                .map(|node| node.has_class(HIGHLIGHT_CLASS))
                .unwrap_or(false)
        })
        .collect()
}

fn clear_marks(surface: &mut RenderSurface) {
    for region in surface.regions_mut() {
        let Ok(tree) = region.tree_mut() else {
            continue;
        };
        for node in tree.find_by_class(HIGHLIGHT_CLASS) {
            tree.remove_class(node, HIGHLIGHT_CLASS);
        }
    }
}

#[derive(Debug, Default)]
pub struct HighlightTracker {
    state: HighlightState,
}

impl HighlightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> HighlightState {
        self.state
    }

    /// Forget the session position, e.g. before the token set is rebuilt.
    pub fn reset(&mut self) {
        self.state = HighlightState::default();
    }

    /// Apply one playback event to the surface.
    ///
    /// Tokens are read from the surface on every call, so a page turn between
    /// events is seen immediately.
    pub fn on_playback_event(
        &mut self,
        event: &PlaybackEvent,
        surface: &mut RenderSurface,
    ) -> HighlightOutcome {
        if event.is_clear() {
            clear_marks(surface);
            self.reset();
            return HighlightOutcome::Cleared;
        }

        let tokens = current_tokens(surface);
        let (next_state, target) = reduce(self.state, event, &tokens);
        let Some(index) = target else {
            debug!(
                "no token for '{}' after {:?}",
                event.word, self.state.last_highlighted
            );
            return HighlightOutcome::NoMatch;
        };
        let Some(token) = tokens.iter().find(|t| t.index == index) else {
            return HighlightOutcome::NoMatch;
        };

        clear_marks(surface);
        let marked = surface.region_mut(token.location.region).map(|region| {
            region
                .tree_mut()
                .map(|tree| tree.add_class(token.location.node, HIGHLIGHT_CLASS))
        });
        match marked {
            Some(Ok(())) => {
                self.state = next_state;
                HighlightOutcome::Highlighted(index)
            }
            Some(Err(err)) => {
                warn!("could not mark token {}: {}", index, err);
                HighlightOutcome::NoMatch
            }
            None => HighlightOutcome::NoMatch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ContentRegion, ContentTree, RegionId};
    use crate::reading::segmenter::segment;

    fn segmented(pages: &[&str]) -> (RenderSurface, Vec<WordToken>) {
        let regions = pages
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let mut tree = ContentTree::new();
                tree.append_text(tree.root(), text);
                ContentRegion::new(RegionId(i), format!("page {}", i + 1), tree)
            })
            .collect();
        let mut surface = RenderSurface::new();
        surface.replace_regions(regions);
        let seg = segment(&mut surface);
        (surface, seg.tokens)
    }

    fn spoken(word: &str) -> PlaybackEvent {
        PlaybackEvent::new(word, 0, word.chars().count())
    }

    #[test]
    fn test_reduce_advances_past_repeated_words() {
        let (_, tokens) = segmented(&["the cat sat on the mat"]);
        let state = HighlightState::default();

        let (state, first) = reduce(state, &spoken("the"), &tokens);
        assert_eq!(first, Some(0));
        let (state, cat) = reduce(state, &spoken("cat"), &tokens);
        assert_eq!(cat, Some(1));
        let (state, second) = reduce(state, &spoken("the"), &tokens);
        assert_eq!(second, Some(4));
        assert_eq!(state.last_highlighted_index(), Some(4));
    }

    #[test]
    fn test_reduce_unknown_word_keeps_state() {
        let (_, tokens) = segmented(&["alpha beta"]);
        let (state, _) = reduce(HighlightState::default(), &spoken("alpha"), &tokens);
        let (after, target) = reduce(state, &spoken("gamma"), &tokens);
        assert_eq!(target, None);
        assert_eq!(after, state);
    }

    #[test]
    fn test_reduce_is_case_sensitive_and_trims() {
        let (_, tokens) = segmented(&["The the"]);
        let (_, target) = reduce(HighlightState::default(), &spoken(" the "), &tokens);
        assert_eq!(target, Some(1));
    }

    #[test]
    fn test_reduce_clear_resets() {
        let (_, tokens) = segmented(&["a b"]);
        let (state, _) = reduce(HighlightState::default(), &spoken("b"), &tokens);
        let (state, target) = reduce(state, &PlaybackEvent::clear(), &tokens);
        assert_eq!(target, None);
        assert_eq!(state.last_highlighted_index(), None);
    }

    #[test]
    fn test_tracker_marks_single_token() {
        let (mut surface, _) = segmented(&["one two one"]);
        let mut tracker = HighlightTracker::new();

        assert_eq!(
            tracker.on_playback_event(&spoken("one"), &mut surface),
            HighlightOutcome::Highlighted(0)
        );
        assert_eq!(
            tracker.on_playback_event(&spoken("one"), &mut surface),
            HighlightOutcome::Highlighted(2)
        );
        let active = active_markers(&surface);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].index, 2);
    }

    #[test]
    fn test_tracker_no_match_keeps_current_mark() {
        let (mut surface, _) = segmented(&["only words"]);
        let mut tracker = HighlightTracker::new();
        tracker.on_playback_event(&spoken("only"), &mut surface);

        assert_eq!(
            tracker.on_playback_event(&spoken("stray"), &mut surface),
            HighlightOutcome::NoMatch
        );
        assert_eq!(active_markers(&surface)[0].index, 0);
        assert_eq!(tracker.state().last_highlighted_index(), Some(0));
    }

    #[test]
    fn test_tracker_searches_across_regions() {
        let (mut surface, _) = segmented(&["left page", "right page"]);
        let mut tracker = HighlightTracker::new();
        tracker.on_playback_event(&spoken("page"), &mut surface);
        let outcome = tracker.on_playback_event(&spoken("page"), &mut surface);

        assert_eq!(outcome, HighlightOutcome::Highlighted(3));
        let active = active_markers(&surface);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].location.region, RegionId(1));
    }

    #[test]
    fn test_tracker_clear_event_removes_marks() {
        let (mut surface, _) = segmented(&["hello there"]);
        let mut tracker = HighlightTracker::new();
        tracker.on_playback_event(&spoken("there"), &mut surface);

        assert_eq!(
            tracker.on_playback_event(&PlaybackEvent::clear(), &mut surface),
            HighlightOutcome::Cleared
        );
        assert!(active_markers(&surface).is_empty());
        assert_eq!(tracker.state().last_highlighted_index(), None);
    }
}
