//! Point region quadtree
//!
//! Each node covers a closed rectangle. A leaf holds up to `capacity`
//! entries; inserting into a full leaf splits it into four equal
//! quadrants at the midpoint of its width and height and pushes its
//! entries down. Points on a split line go to the right/bottom quadrant,
//! so every point in a node maps to exactly one child and interior nodes
//! never hold entries.
//!
//! Nodes live in a flat `Vec` and refer to their children by index.
//! There is no per-entry removal: callers clear and reinsert (see
//! [`crate::spatial::SpatialIndex::refresh`]).

use crate::core::error::{Result, SimError};
use crate::core::types::{AgentId, Vec2};
use crate::spatial::rect::Rect;

const ROOT: usize = 0;

#[derive(Debug, Clone)]
struct QuadNode {
    bounds: Rect,
    depth: u32,
    entries: Vec<(AgentId, Vec2)>,
    /// Top-left, top-right, bottom-left, bottom-right
    children: Option<[usize; 4]>,
}

impl QuadNode {
    fn leaf(bounds: Rect, depth: u32) -> Self {
        Self {
            bounds,
            depth,
            entries: Vec::new(),
            children: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuadTree {
    nodes: Vec<QuadNode>,
    capacity: usize,
    max_depth: u32,
    len: usize,
}

impl QuadTree {
    pub fn new(bounds: Rect, capacity: usize, max_depth: u32) -> Self {
        Self {
            nodes: vec![QuadNode::leaf(bounds, 0)],
            capacity: capacity.max(1),
            max_depth,
            len: 0,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.nodes[ROOT].bounds
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Deepest level currently in use (root is 0)
    pub fn depth(&self) -> u32 {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    /// Insert an entry at `position`
    ///
    /// Fails with `OutOfBounds` if the point lies outside the root region.
    pub fn insert(&mut self, id: AgentId, position: Vec2) -> Result<()> {
        let bounds = self.bounds();
        if !position.is_finite() || !bounds.contains(position) {
            return Err(SimError::OutOfBounds {
                x: position.x,
                y: position.y,
                size: bounds.width(),
            });
        }
        self.insert_from(ROOT, id, position);
        self.len += 1;
        Ok(())
    }

    fn insert_from(&mut self, start: usize, id: AgentId, position: Vec2) {
        let mut idx = start;
        loop {
            let node = &self.nodes[idx];
            if let Some(children) = node.children {
                idx = children[quadrant(&node.bounds, position)];
                continue;
            }
            if node.entries.len() >= self.capacity && node.depth < self.max_depth {
                self.split(idx);
                continue;
            }
            self.nodes[idx].entries.push((id, position));
            return;
        }
    }

    fn split(&mut self, idx: usize) {
        let bounds = self.nodes[idx].bounds;
        let depth = self.nodes[idx].depth + 1;
        let mid = bounds.center();

        let quadrants = [
            Rect::from_corners(bounds.min, mid),
            Rect::from_corners(Vec2::new(mid.x, bounds.min.y), Vec2::new(bounds.max.x, mid.y)),
            Rect::from_corners(Vec2::new(bounds.min.x, mid.y), Vec2::new(mid.x, bounds.max.y)),
            Rect::from_corners(mid, bounds.max),
        ];

        let first = self.nodes.len();
        self.nodes.extend(quadrants.into_iter().map(|q| QuadNode::leaf(q, depth)));

        let entries = std::mem::take(&mut self.nodes[idx].entries);
        self.nodes[idx].children = Some([first, first + 1, first + 2, first + 3]);
        for (id, position) in entries {
            self.insert_from(idx, id, position);
        }
    }

    /// Every entry whose position lies inside `area`
    ///
    /// Subtrees whose region misses `area` are skipped. Order is
    /// unspecified.
    pub fn query(&self, area: &Rect) -> Vec<AgentId> {
        let mut found = Vec::new();
        self.query_into(area, &mut found);
        found
    }

    pub fn query_into(&self, area: &Rect, out: &mut Vec<AgentId>) {
        let mut stack = vec![ROOT];
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            if !node.bounds.intersects(area) {
                continue;
            }
            match node.children {
                Some(children) => stack.extend_from_slice(&children),
                None => out.extend(
                    node.entries
                        .iter()
                        .filter(|(_, position)| area.contains(*position))
                        .map(|(id, _)| *id),
                ),
            }
        }
    }

    /// All stored entries, each exactly once
    pub fn iter(&self) -> impl Iterator<Item = (AgentId, Vec2)> + '_ {
        self.nodes.iter().flat_map(|node| node.entries.iter().copied())
    }

    /// Drop every entry and collapse back to a single root leaf
    pub fn clear(&mut self) {
        let bounds = self.bounds();
        self.nodes.clear();
        self.nodes.push(QuadNode::leaf(bounds, 0));
        self.len = 0;
    }
}

/// Child slot for `position`; split lines belong to the right/bottom side
#[inline]
fn quadrant(bounds: &Rect, position: Vec2) -> usize {
    let mid = bounds.center();
    let right = position.x >= mid.x;
    let bottom = position.y >= mid.y;
    (bottom as usize) * 2 + right as usize
}
