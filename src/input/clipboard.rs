use super::text::TextDocument;
use super::LoadError;

/// Read the system clipboard as a text document.
pub fn load(lines_per_page: usize) -> Result<TextDocument, LoadError> {
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| LoadError::Clipboard(e.to_string()))?;
    let text = clipboard
        .get_text()
        .map_err(|e| LoadError::Clipboard(e.to_string()))?;

    from_clipboard_text(&text, lines_per_page)
}

fn from_clipboard_text(text: &str, lines_per_page: usize) -> Result<TextDocument, LoadError> {
    if text.trim().is_empty() {
        return Err(LoadError::Clipboard("clipboard is empty".to_string()));
    }
    TextDocument::from_text("Clipboard", text, lines_per_page)
}
