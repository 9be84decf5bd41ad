use super::{Document, FileKind, LoadError};
use crate::document::{html, ContentRegion, ContentTree, RegionId};
use std::path::Path;

/// An EPUB whose spine chapters are the pages.
pub struct EpubDocument {
    title: String,
    chapters: Vec<ContentTree>,
}

/// Load chapters from an EPUB file using the epub crate.
///
/// Chapters without any text (cover images, blank separators) are skipped.
pub fn load(path: &Path) -> Result<EpubDocument, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound(path.to_path_buf()));
    }

    let mut doc =
        epub::doc::EpubDoc::new(path).map_err(|e| LoadError::EpubParse(e.to_string()))?;

    let num_chapters = doc.get_num_chapters();

    if num_chapters == 0 {
        return Err(LoadError::EpubParse("No chapters found in EPUB".to_string()));
    }

    let mut markup = Vec::new();
    for chapter_idx in 0..num_chapters {
        if !doc.set_current_chapter(chapter_idx) {
            continue;
        }
        if let Some((chapter_content, _mime)) = doc.get_current_str() {
            markup.push(chapter_content);
        }
    }

    let title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("book")
        .to_string();
    EpubDocument::from_markup(title, &markup)
}

impl EpubDocument {
    pub fn from_markup(title: String, chapters: &[String]) -> Result<Self, LoadError> {
        let chapters: Vec<ContentTree> = chapters
            .iter()
            .map(|markup| html::parse(markup))
            .filter(|tree| !tree.text_content(tree.root()).trim().is_empty())
            .collect();

        if chapters.is_empty() {
            return Err(LoadError::EpubParse(
                "No extractable text content found in EPUB".to_string(),
            ));
        }
        Ok(Self { title, chapters })
    }
}

impl Document for EpubDocument {
    fn title(&self) -> &str {
        &self.title
    }

    fn kind(&self) -> FileKind {
        FileKind::Epub
    }

    fn page_count(&self) -> usize {
        self.chapters.len()
    }

    fn render_page(&self, page: usize, id: RegionId) -> Option<ContentRegion> {
        let tree = self.chapters.get(page)?.clone();
        Some(ContentRegion::new(id, format!("Chapter {}", page + 1), tree))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epub_load_nonexistent_file() {
        let result = load(Path::new("/nonexistent/path/book.epub"));
        assert!(matches!(result, Err(LoadError::FileNotFound(_))));
    }

    #[test]
    fn test_from_markup_skips_textless_chapters() {
        let chapters = vec![
            "<html><body><img src=\"cover.jpg\"/></body></html>".to_string(),
            "<html><body><p>Chapter One.</p></body></html>".to_string(),
        ];
        let doc = EpubDocument::from_markup("book".to_string(), &chapters).unwrap();
        assert_eq!(doc.page_count(), 1);

        let region = doc.render_page(0, RegionId(0)).unwrap();
        assert_eq!(region.label(), "Chapter 1");
        let tree = region.tree().unwrap();
        assert_eq!(tree.text_content(tree.root()), "Chapter One.");
    }

    #[test]
    fn test_from_markup_requires_text() {
        let result = EpubDocument::from_markup("book".to_string(), &[String::new()]);
        assert!(matches!(result, Err(LoadError::EpubParse(_))));
    }

    #[test]
    fn test_rendered_pages_are_independent_copies() {
        let doc =
            EpubDocument::from_markup("book".to_string(), &["<p>same text</p>".to_string()])
                .unwrap();
        let mut first = doc.render_page(0, RegionId(0)).unwrap();
        let tree = first.tree_mut().unwrap();
        let root = tree.root();
        tree.append_text(root, " extra");

        let second = doc.render_page(0, RegionId(0)).unwrap();
        let tree = second.tree().unwrap();
        assert_eq!(tree.text_content(tree.root()), "same text");
    }
}
