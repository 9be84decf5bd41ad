use crate::document::{NodeId, RegionId};

/// Class carried by every word marker element.
pub const WORD_CLASS: &str = "word";
/// Class carried by the single active (being spoken) word marker.
pub const HIGHLIGHT_CLASS: &str = "highlight";
/// Attribute holding the marker's token index.
pub const INDEX_ATTR: &str = "data-index";

/// Where a token's marker element lives on the render surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenLocation {
    pub region: RegionId,
    pub node: NodeId,
}

/// An indexed, addressable word of rendered text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordToken {
    /// Position in reading order, unique within one segmentation.
    pub index: usize,
    pub text: String,
    pub location: TokenLocation,
}
