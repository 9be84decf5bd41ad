pub mod driver;
pub mod engine;
pub mod event;
pub mod paced;
pub mod system;

pub use driver::{PlaybackState, SpeechDriver, VoiceSettings};
pub use engine::{EngineEvent, SpeechEngine, SpeechError, Utterance, Voice};
pub use event::PlaybackEvent;
pub use paced::PacedEngine;
pub use system::{build_engine, Synthesizer, SystemEngine};
