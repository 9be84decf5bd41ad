use super::{Document, FileKind, LoadError};
use crate::document::{ContentRegion, ContentTree, RegionId};
use std::path::Path;

/// Plain text split into fixed-size pages of non-blank lines.
pub struct TextDocument {
    title: String,
    pages: Vec<Vec<String>>,
}

pub fn load(path: &Path, lines_per_page: usize) -> Result<TextDocument, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    let title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("text")
        .to_string();
    TextDocument::from_text(title, &content, lines_per_page)
}

impl TextDocument {
    pub fn from_text(
        title: impl Into<String>,
        text: &str,
        lines_per_page: usize,
    ) -> Result<Self, LoadError> {
        let title = title.into();
        if text.trim().is_empty() {
            return Err(LoadError::EmptyDocument(title));
        }

        let lines: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        let pages = lines
            .chunks(lines_per_page.max(1))
            .map(<[String]>::to_vec)
            .collect();

        Ok(Self { title, pages })
    }
}

impl Document for TextDocument {
    fn title(&self) -> &str {
        &self.title
    }

    fn kind(&self) -> FileKind {
        FileKind::Text
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn render_page(&self, page: usize, id: RegionId) -> Option<ContentRegion> {
        let lines = self.pages.get(page)?;
        let mut tree = ContentTree::new();
        let root = tree.root();
        for line in lines {
            let p = tree.append_element(root, "p");
            tree.append_text(p, line);
        }
        Some(ContentRegion::new(id, format!("Page {}", page + 1), tree))
    }
}
