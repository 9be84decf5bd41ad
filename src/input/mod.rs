//! Document loading and pagination
//!
//! Each format adapter turns a file into numbered pages and renders any page
//! as one [`ContentRegion`]. The [`Pager`] decides which pages are visible.

use std::io;
use std::path::{Path, PathBuf};

use log::info;
use thiserror::Error;

use crate::audio::{AudioClip, AudioError};
use crate::document::{ContentRegion, RegionId, RenderSurface};

pub mod audio;
pub mod clipboard;
pub mod epub;
pub mod pdf;
pub mod text;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("PDF parse error: {0}")]
    PdfParse(String),

    #[error("EPUB parse error: {0}")]
    EpubParse(String),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("No readable text in {0}")]
    EmptyDocument(String),

    #[error(transparent)]
    Audio(#[from] AudioError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Epub,
    Text,
    Audio,
    Unknown,
}

impl FileKind {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("pdf") => FileKind::Pdf,
            Some("epub") => FileKind::Epub,
            Some("txt") | Some("text") | Some("md") => FileKind::Text,
            Some("mp3") | Some("wav") => FileKind::Audio,
            _ => FileKind::Unknown,
        }
    }
}

/// A loaded document that can render any of its pages.
pub trait Document {
    fn title(&self) -> &str;

    fn kind(&self) -> FileKind;

    fn page_count(&self) -> usize;

    /// Build page `page` (0-based) as a region with the given id.
    fn render_page(&self, page: usize, id: RegionId) -> Option<ContentRegion>;

    /// Decoded sound for documents that play rather than speak.
    fn audio(&self) -> Option<&AudioClip> {
        None
    }
}

/// Open `path`, dispatching on its extension.
pub fn open(path: &str, lines_per_page: usize) -> Result<Box<dyn Document>, LoadError> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(LoadError::FileNotFound(path.to_path_buf()));
    }

    let document: Box<dyn Document> = match FileKind::from_path(path) {
        FileKind::Pdf => Box::new(pdf::load(path)?),
        FileKind::Epub => Box::new(epub::load(path)?),
        FileKind::Text => Box::new(text::load(path, lines_per_page)?),
        FileKind::Audio => Box::new(audio::load(path)?),
        FileKind::Unknown => {
            return Err(LoadError::UnsupportedFormat(path.display().to_string()));
        }
    };

    info!(
        "loaded {:?} '{}' with {} pages",
        document.kind(),
        document.title(),
        document.page_count()
    );
    Ok(document)
}

/// Which pages are on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    first: usize,
    per_view: usize,
}

impl Pager {
    pub fn new(per_view: usize) -> Self {
        Self {
            first: 0,
            per_view: per_view.max(1),
        }
    }

    pub fn first_page(&self) -> usize {
        self.first
    }

    pub fn per_view(&self) -> usize {
        self.per_view
    }

    /// Rebuild the surface with the visible pages, in page order.
    pub fn render(&self, document: &dyn Document, surface: &mut RenderSurface) {
        let last = (self.first + self.per_view).min(document.page_count());
        let regions = (self.first..last)
            .filter_map(|page| document.render_page(page, RegionId(page)))
            .collect();
        surface.replace_regions(regions);
    }

    pub fn next(&mut self, document: &dyn Document) -> bool {
        let next = self.first + self.per_view;
        if next < document.page_count() {
            self.first = next;
            true
        } else {
            false
        }
    }

    pub fn prev(&mut self) -> bool {
        if self.first == 0 {
            return false;
        }
        self.first = self.first.saturating_sub(self.per_view);
        true
    }
}
