pub mod highlight;
pub mod segmenter;
pub mod timing;
pub mod token;

pub use highlight::{reduce, HighlightOutcome, HighlightState, HighlightTracker};
pub use segmenter::{segment, Segmentation};
pub use timing::Pacing;
pub use token::{TokenLocation, WordToken};
