//! Content regions and the render surface that holds them
//!
//! A region is one independently rendered scope (a PDF page, an EPUB
//! chapter). Isolated regions stand in for cross-origin frames: their
//! container can be styled but their tree cannot be read or written.

use thiserror::Error;

use super::style::InlineStyle;
use super::tree::{ContentTree, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionAccess {
    Open,
    Isolated,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegionError {
    #[error("content region '{0}' is isolated")]
    Isolated(String),
}

#[derive(Debug, Clone)]
pub struct ContentRegion {
    id: RegionId,
    label: String,
    access: RegionAccess,
    pub container_style: InlineStyle,
    tree: ContentTree,
}

impl ContentRegion {
    pub fn new(id: RegionId, label: impl Into<String>, tree: ContentTree) -> Self {
        Self {
            id,
            label: label.into(),
            access: RegionAccess::Open,
            container_style: InlineStyle::default(),
            tree,
        }
    }

    pub fn isolated(id: RegionId, label: impl Into<String>) -> Self {
        Self {
            access: RegionAccess::Isolated,
            ..Self::new(id, label, ContentTree::new())
        }
    }

    pub fn id(&self) -> RegionId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn access(&self) -> RegionAccess {
        self.access
    }

    pub fn tree(&self) -> Result<&ContentTree, RegionError> {
        match self.access {
            RegionAccess::Open => Ok(&self.tree),
            RegionAccess::Isolated => Err(RegionError::Isolated(self.label.clone())),
        }
    }

    pub fn tree_mut(&mut self) -> Result<&mut ContentTree, RegionError> {
        match self.access {
            RegionAccess::Open => Ok(&mut self.tree),
            RegionAccess::Isolated => Err(RegionError::Isolated(self.label.clone())),
        }
    }
}

/// Everything currently on screen: the body style plus the ordered regions.
///
/// `generation` changes whenever the region set is rebuilt, which lets
/// deferred work detect that the content it was scheduled for is gone.
#[derive(Debug, Clone, Default)]
pub struct RenderSurface {
    pub body_style: InlineStyle,
    regions: Vec<ContentRegion>,
    generation: u64,
}

impl RenderSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn regions(&self) -> &[ContentRegion] {
        &self.regions
    }

    pub fn regions_mut(&mut self) -> &mut [ContentRegion] {
        &mut self.regions
    }

    pub fn region(&self, id: RegionId) -> Option<&ContentRegion> {
        self.regions.iter().find(|r| r.id == id)
    }

    pub fn region_mut(&mut self, id: RegionId) -> Option<&mut ContentRegion> {
        self.regions.iter_mut().find(|r| r.id == id)
    }

    pub fn replace_regions(&mut self, regions: Vec<ContentRegion>) {
        self.regions = regions;
        self.generation += 1;
    }

    pub fn clear(&mut self) {
        self.replace_regions(Vec::new());
    }

    /// Effective style of a node: body, then region container, then the
    /// node's own ancestry, each level overriding the previous one.
    pub fn resolved_style(&self, region: RegionId, node: NodeId) -> InlineStyle {
        let mut style = self.body_style.clone();
        if let Some(region) = self.region(region) {
            style.override_with(&region.container_style);
            if let Ok(tree) = region.tree() {
                style.override_with(&tree.computed_style(node));
            }
        }
        style
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::style::Rgb;

    #[test]
    fn test_isolated_region_refuses_tree_access() {
        let mut region = ContentRegion::isolated(RegionId(3), "frame");
        assert!(matches!(region.tree(), Err(RegionError::Isolated(_))));
        assert!(region.tree_mut().is_err());
    }

    #[test]
    fn test_replace_regions_bumps_generation() {
        let mut surface = RenderSurface::new();
        let before = surface.generation();
        surface.replace_regions(vec![ContentRegion::new(
            RegionId(0),
            "page 1",
            ContentTree::new(),
        )]);
        assert_eq!(surface.generation(), before + 1);
        surface.clear();
        assert_eq!(surface.generation(), before + 2);
        assert!(surface.regions().is_empty());
    }

    #[test]
    fn test_resolved_style_layers_body_container_and_node() {
        let mut tree = ContentTree::new();
        let p = tree.append_element(tree.root(), "p");
        tree.node_mut(p).unwrap().style.foreground = Some(Rgb(1, 1, 1));

        let mut region = ContentRegion::new(RegionId(0), "page 1", tree);
        region.container_style.background = Some(Rgb(2, 2, 2));

        let mut surface = RenderSurface::new();
        surface.body_style.font_size_px = Some(20);
        surface.replace_regions(vec![region]);

        let style = surface.resolved_style(RegionId(0), p);
        assert_eq!(style.foreground, Some(Rgb(1, 1, 1)));
        assert_eq!(style.background, Some(Rgb(2, 2, 2)));
        assert_eq!(style.font_size_px, Some(20));
    }
}
