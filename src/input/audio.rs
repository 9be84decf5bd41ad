use super::{Document, FileKind, LoadError};
use crate::audio::{self, format_duration, AudioClip};
use crate::document::{ContentRegion, ContentTree, RegionId};
use std::path::Path;

/// An audio file. Its single page is the player card; playback goes
/// through the app's audio player rather than speech.
pub struct AudioDocument {
    title: String,
    clip: AudioClip,
}

pub fn load(path: &Path) -> Result<AudioDocument, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound(path.to_path_buf()));
    }
    let bytes = std::fs::read(path)?;
    let extension = path.extension().and_then(|e| e.to_str());
    let clip = audio::decode(bytes, extension)?;

    let title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("audio")
        .to_string();
    Ok(AudioDocument::new(title, clip))
}

impl AudioDocument {
    pub fn new(title: impl Into<String>, clip: AudioClip) -> Self {
        Self {
            title: title.into(),
            clip,
        }
    }
}

impl Document for AudioDocument {
    fn title(&self) -> &str {
        &self.title
    }

    fn kind(&self) -> FileKind {
        FileKind::Audio
    }

    fn page_count(&self) -> usize {
        1
    }

    fn render_page(&self, page: usize, id: RegionId) -> Option<ContentRegion> {
        if page != 0 {
            return None;
        }
        let mut tree = ContentTree::new();
        let root = tree.root();

        let heading = tree.append_element(root, "h2");
        tree.append_text(heading, "Audio Player");
        let title = tree.append_element(root, "p");
        tree.append_text(title, &self.title);
        let length = tree.append_element(root, "p");
        tree.append_text(
            length,
            &format!("Length {}", format_duration(self.clip.duration())),
        );
        let keys = tree.append_element(root, "p");
        tree.append_text(keys, "space plays and pauses, s stops");

        Some(ContentRegion::new(id, "Audio", tree))
    }

    fn audio(&self) -> Option<&AudioClip> {
        Some(&self.clip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::tests::wav_bytes;

    #[test]
    fn test_load_wav_file() {
        let path = std::env::temp_dir().join("readaloud_audio_load_test.wav");
        std::fs::write(&path, wav_bytes(8000, 1, &[0; 16_000])).unwrap();
        let doc = load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(doc.title(), "readaloud_audio_load_test");
        assert_eq!(doc.kind(), FileKind::Audio);
        assert_eq!(doc.audio().unwrap().duration().as_secs(), 2);
    }

    #[test]
    fn test_undecodable_file_is_an_audio_error() {
        let path = std::env::temp_dir().join("readaloud_audio_garbage.mp3");
        std::fs::write(&path, b"not an mp3 at all").unwrap();
        let result = load(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(LoadError::Audio(_))));
    }

    #[test]
    fn test_player_card_shows_length() {
        let doc = AudioDocument::new("talk", AudioClip::new(vec![0.0; 6_500], 100));
        let region = doc.render_page(0, RegionId(0)).unwrap();
        let tree = region.tree().unwrap();
        assert_eq!(
            tree.text_content(tree.root()),
            "Audio PlayertalkLength 1:05space plays and pauses, s stops"
        );
        assert!(doc.render_page(1, RegionId(1)).is_none());
    }
}
