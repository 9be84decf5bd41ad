use std::io;

use thiserror::Error;

use crate::audio::AudioError;
use crate::input::LoadError;
use crate::speech::SpeechError;

/// Any failure the reader can report to the user.
#[derive(Error, Debug)]
pub enum ReaderError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Speech(#[from] SpeechError),

    #[error(transparent)]
    Audio(#[from] AudioError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}
