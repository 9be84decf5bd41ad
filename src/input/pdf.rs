use super::{Document, FileKind, LoadError};
use crate::document::{ContentRegion, ContentTree, RegionId};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// A PDF as extracted text, one entry per page.
pub struct PdfDocument {
    title: String,
    pages: Vec<Vec<String>>,
}

/// Load text from a PDF file using the pdf-extract crate, page by page.
pub fn load(path: &Path) -> Result<PdfDocument, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound(path.to_path_buf()));
    }

    let mut file = File::open(path).map_err(|e| LoadError::PdfParse(e.to_string()))?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)
        .map_err(|e| LoadError::PdfParse(e.to_string()))?;

    let pages = pdf_extract::extract_text_from_mem_by_pages(&buffer)
        .map_err(|e| LoadError::PdfParse(e.to_string()))?;

    PdfDocument::from_pages(title_of(path), pages)
}

fn title_of(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document")
        .to_string()
}

impl PdfDocument {
    /// Build from already extracted page texts. Blank lines are dropped.
    pub fn from_pages(title: String, pages: Vec<String>) -> Result<Self, LoadError> {
        let pages: Vec<Vec<String>> = pages
            .iter()
            .map(|page| {
                page.lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .collect();

        if pages.iter().all(|lines| lines.is_empty()) {
            return Err(LoadError::EmptyDocument(title));
        }
        Ok(Self { title, pages })
    }
}

impl Document for PdfDocument {
    fn title(&self) -> &str {
        &self.title
    }

    fn kind(&self) -> FileKind {
        FileKind::Pdf
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// A page is a `pdf-page-header` line followed by one `pdf-line` per
    /// text line.
    fn render_page(&self, page: usize, id: RegionId) -> Option<ContentRegion> {
        let lines = self.pages.get(page)?;
        let mut tree = ContentTree::new();
        let root = tree.root();

        let header = tree.append_element(root, "div");
        tree.add_class(header, "pdf-page-header");
        tree.append_text(header, &format!("Page {}", page + 1));

        for line in lines {
            let div = tree.append_element(root, "div");
            tree.add_class(div, "pdf-line");
            tree.append_text(div, line);
        }

        Some(ContentRegion::new(id, format!("Page {}", page + 1), tree))
    }
}
