//! Spatial indexing for proximity queries over moving agents

pub mod index;
pub mod quadtree;
pub mod rect;

pub use index::SpatialIndex;
pub use quadtree::QuadTree;
pub use rect::Rect;
