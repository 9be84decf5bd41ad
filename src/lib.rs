//! Word-synchronized read-aloud highlighting for an accessible e-book reader.
//!
//! Documents are rendered into a [`document::RenderSurface`], split into word
//! markers by [`reading::segment`], and a [`speech::SpeechDriver`] reports
//! word boundaries that [`reading::HighlightTracker`] turns into exactly one
//! highlighted marker.

pub mod app;
pub mod audio;
pub mod document;
pub mod engine;
pub mod input;
pub mod reading;
pub mod speech;
pub mod theme;
pub mod ui;
