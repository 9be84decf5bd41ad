//! XHTML chapter markup into a [`ContentTree`]
//!
//! Built from a quick-xml event loop that tolerates the usual EPUB damage:
//! mismatched or stray end tags, unclosed void elements and HTML named
//! entities. Element structure is kept, attributes are dropped, and `head`,
//! `script`, `style` and `title` content never reaches the tree.

use log::warn;
use quick_xml::escape::resolve_html5_entity;
use quick_xml::events::Event;
use quick_xml::Reader;

use super::tree::{ContentTree, NodeId};

const SKIPPED: &[&str] = &["head", "script", "style", "title"];
const VOID: &[&str] = &[
    "br", "hr", "img", "meta", "link", "input", "col", "area", "base", "wbr", "source",
];

/// Tags that start a new visual line when rendered.
pub const BLOCK_TAGS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "li", "blockquote", "pre", "tr", "section",
    "article", "header", "footer", "figcaption", "dt", "dd", "br", "hr",
];

pub fn is_block(tag: &str) -> bool {
    BLOCK_TAGS.contains(&tag)
}

/// Skipped subtree: its tag and how deeply it is nested in itself.
struct Skip {
    tag: String,
    depth: usize,
}

struct Builder {
    tree: ContentTree,
    open: Vec<(String, NodeId)>,
    text: String,
}

impl Builder {
    fn new() -> Self {
        let tree = ContentTree::new();
        let root = tree.root();
        Self {
            tree,
            open: vec![("body".to_string(), root)],
            text: String::new(),
        }
    }

    fn parent(&self) -> NodeId {
        self.open
            .last()
            .map(|(_, id)| *id)
            .unwrap_or_else(|| self.tree.root())
    }

    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            let parent = self.parent();
            let text = std::mem::take(&mut self.text);
            self.tree.append_text(parent, &text);
        }
    }

    fn element(&mut self, tag: String, has_content: bool) {
        self.flush_text();
        let parent = self.parent();
        let element = self.tree.append_element(parent, &tag);
        if has_content && !VOID.contains(&tag.as_str()) {
            self.open.push((tag, element));
        }
    }

    fn close(&mut self, tag: &str) {
        self.flush_text();
        // Unmatched end tags are ignored; the body itself never closes.
        if let Some(depth) = self.open.iter().rposition(|(open, _)| open == tag) {
            if depth > 0 {
                self.open.truncate(depth);
            }
        }
    }

    fn finish(mut self) -> ContentTree {
        self.flush_text();
        self.tree
    }
}

pub fn parse(markup: &str) -> ContentTree {
    let mut reader = Reader::from_str(markup);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    config.allow_dangling_amp = true;

    let mut builder = Builder::new();
    let mut skip: Option<Skip> = None;

    loop {
        let event = match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(event) => event,
            Err(err) => {
                warn!(
                    "markup error at byte {}, keeping what was read: {}",
                    reader.buffer_position(),
                    err
                );
                break;
            }
        };

        if let Some(skipped) = &mut skip {
            match &event {
                Event::Start(e) if tag_name(e.name().as_ref()) == skipped.tag => {
                    skipped.depth += 1
                }
                Event::End(e) if tag_name(e.name().as_ref()) == skipped.tag => {
                    skipped.depth -= 1;
                    if skipped.depth == 0 {
                        skip = None;
                    }
                }
                _ => {}
            }
            continue;
        }

        match event {
            Event::Start(e) => {
                let tag = tag_name(e.name().as_ref());
                if SKIPPED.contains(&tag.as_str()) {
                    builder.flush_text();
                    skip = Some(Skip { tag, depth: 1 });
                } else if tag != "html" && tag != "body" {
                    builder.element(tag, true);
                }
            }
            Event::Empty(e) => {
                let tag = tag_name(e.name().as_ref());
                if !SKIPPED.contains(&tag.as_str()) && tag != "html" && tag != "body" {
                    builder.element(tag, false);
                }
            }
            Event::End(e) => builder.close(&tag_name(e.name().as_ref())),
            Event::Text(e) => builder.text.push_str(&String::from_utf8_lossy(&e)),
            Event::CData(e) => builder.text.push_str(&String::from_utf8_lossy(&e)),
            Event::GeneralRef(e) => {
                let entity = String::from_utf8_lossy(&e);
                match resolve_entity(&entity) {
                    Some(resolved) => builder.text.push_str(&resolved),
                    None => {
                        builder.text.push('&');
                        builder.text.push_str(&entity);
                        builder.text.push(';');
                    }
                }
            }
            _ => {}
        }
    }

    builder.finish()
}

/// Lowercased local name, without any namespace prefix.
fn tag_name(qualified: &[u8]) -> String {
    let local = qualified
        .iter()
        .rposition(|&b| b == b':')
        .map(|i| &qualified[i + 1..])
        .unwrap_or(qualified);
    String::from_utf8_lossy(local).to_ascii_lowercase()
}

/// Character references and the HTML5 named entity set.
fn resolve_entity(entity: &str) -> Option<String> {
    if let Some(numeric) = entity.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse().ok()?,
        };
        return char::from_u32(code).map(String::from);
    }
    resolve_html5_entity(entity).map(str::to_string)
}
