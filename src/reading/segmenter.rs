//! Word segmentation of the render surface
//!
//! Every non-whitespace run of every text node becomes a `span.word` marker
//! with a reading-order index; whitespace runs stay as plain text nodes so
//! layout is unchanged. Indices continue across text nodes and regions.

use log::{debug, warn};

use super::token::{TokenLocation, WordToken, INDEX_ATTR, WORD_CLASS};
use crate::document::{ContentTree, RenderSurface};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segmentation {
    pub tokens: Vec<WordToken>,
    /// Token texts joined by single spaces; the text handed to speech.
    pub full_text: String,
}

#[derive(Debug, PartialEq, Eq)]
enum Run<'a> {
    Space(&'a str),
    Word(&'a str),
}

/// Split into alternating whitespace and non-whitespace runs.
fn split_runs(text: &str) -> Vec<Run<'_>> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut in_space: Option<bool> = None;

    for (offset, ch) in text.char_indices() {
        let space = ch.is_whitespace();
        match in_space {
            Some(current) if current != space => {
                runs.push(make_run(&text[start..offset], current));
                start = offset;
                in_space = Some(space);
            }
            None => in_space = Some(space),
            _ => {}
        }
    }
    if let Some(current) = in_space {
        runs.push(make_run(&text[start..], current));
    }
    runs
}

fn make_run(slice: &str, space: bool) -> Run<'_> {
    if space {
        Run::Space(slice)
    } else {
        Run::Word(slice)
    }
}

/// Undo a previous segmentation so the tree holds plain text runs again.
fn unwrap_markers(tree: &mut ContentTree) {
    let markers = tree.find_by_class(WORD_CLASS);
    if markers.is_empty() {
        return;
    }
    for marker in markers {
        tree.unwrap_element(marker);
    }
    tree.normalize();
}

/// Wrap every word of every accessible region in a marker element.
///
/// Re-running on an already segmented surface replaces the old markers and
/// numbers tokens from 0 again.
pub fn segment(surface: &mut RenderSurface) -> Segmentation {
    let mut tokens = Vec::new();

    for region in surface.regions_mut() {
        let region_id = region.id();
        let tree = match region.tree_mut() {
            Ok(tree) => tree,
            Err(err) => {
                warn!("segmenter skipped region: {}", err);
                continue;
            }
        };

        unwrap_markers(tree);

        for text_node in tree.text_nodes() {
            let Some(text) = tree
                .node(text_node)
                .and_then(|n| n.text())
                .map(str::to_string)
            else {
                continue;
            };
            if text.trim().is_empty() {
                continue;
            }

            let mut replacements = Vec::new();
            for run in split_runs(&text) {
                match run {
                    Run::Space(space) => replacements.push(tree.create_text(space)),
                    Run::Word(word) => {
                        let index = tokens.len();
                        let marker = tree.create_element("span");
                        tree.add_class(marker, WORD_CLASS);
                        tree.set_attr(marker, INDEX_ATTR, &index.to_string());
                        let inner = tree.create_text(word);
                        tree.append_child(marker, inner);
                        replacements.push(marker);

                        tokens.push(WordToken {
                            index,
                            text: word.to_string(),
                            location: TokenLocation {
                                region: region_id,
                                node: marker,
                            },
                        });
                    }
                }
            }
            tree.replace_with(text_node, &replacements);
        }
    }

    let full_text = tokens
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    debug!(
        "segmented {} tokens over {} regions",
        tokens.len(),
        surface.regions().len()
    );

    Segmentation { tokens, full_text }
}

/// Read the markers currently on the surface, in region order then
/// document order. Regions that cannot be read are skipped.
pub fn current_tokens(surface: &RenderSurface) -> Vec<WordToken> {
    let mut tokens = Vec::new();
    for region in surface.regions() {
        let Ok(tree) = region.tree() else {
            continue;
        };
        for marker in tree.find_by_class(WORD_CLASS) {
            let Some(index) = tree
                .node(marker)
                .and_then(|n| n.attr(INDEX_ATTR))
                .and_then(|v| v.parse().ok())
            else {
                continue;
            };
            tokens.push(WordToken {
                index,
                text: tree.text_content(marker),
                location: TokenLocation {
                    region: region.id(),
                    node: marker,
                },
            });
        }
    }
    tokens
}
