pub mod html;
pub mod region;
pub mod style;
pub mod tree;

pub use region::{ContentRegion, RegionAccess, RegionError, RegionId, RenderSurface};
pub use style::{InlineStyle, Rgb};
pub use tree::{ContentTree, NodeId, NodeKind};
