/// Notification that synthesis reached a word.
///
/// An event with an empty `word` means "clear the highlight": it is sent on
/// stop, on natural end of speech and before a restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackEvent {
    pub word: String,
    pub char_index: usize,
    pub char_length: usize,
}

impl PlaybackEvent {
    pub fn new(word: impl Into<String>, char_index: usize, char_length: usize) -> Self {
        Self {
            word: word.into(),
            char_index,
            char_length,
        }
    }

    pub fn clear() -> Self {
        Self::new(String::new(), 0, 0)
    }

    pub fn is_clear(&self) -> bool {
        self.word.is_empty()
    }
}
