#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Command deck has focus; keys are typed into it.
    Command,
    /// A document is on screen; keys control playback and paging.
    Reading,
    Quit,
}
