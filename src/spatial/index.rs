//! Agent store with a quadtree over their positions
//!
//! The index owns every agent. Movement happens through `get_mut` /
//! `iter_mut` and leaves the tree describing the old positions until
//! [`SpatialIndex::rebuild`] or [`SpatialIndex::refresh`] runs; queries
//! answer against the positions recorded at the last (re)insertion.

use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{AgentId, Vec2};
use crate::entity::agent::Agent;
use crate::entity::arena::AgentArena;
use crate::spatial::quadtree::QuadTree;
use crate::spatial::rect::Rect;

#[derive(Debug, Clone)]
pub struct SpatialIndex {
    agents: AgentArena,
    tree: QuadTree,
}

impl SpatialIndex {
    /// Index over the square `[0, size] x [0, size]`
    pub fn new(size: f32, node_capacity: usize, max_depth: u32) -> Self {
        Self {
            agents: AgentArena::new(),
            tree: QuadTree::new(Rect::new(0.0, 0.0, size, size), node_capacity, max_depth),
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        let mut index = Self::new(config.room_size, config.node_capacity, config.max_depth);
        index.agents = AgentArena::with_capacity(config.population_size);
        index
    }

    pub fn bounds(&self) -> Rect {
        self.tree.bounds()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Take ownership of `agent`, assign it an id and index its position
    ///
    /// Out-of-bounds positions are rejected and the agent is dropped
    /// without consuming an id.
    pub fn insert(&mut self, agent: Agent) -> Result<AgentId> {
        self.check_bounds(agent.position)?;
        let position = agent.position;
        let id = self.agents.insert(agent);
        self.tree.insert(id, position)?;
        Ok(id)
    }

    fn check_bounds(&self, position: Vec2) -> Result<()> {
        let bounds = self.bounds();
        if position.is_finite() && bounds.contains(position) {
            Ok(())
        } else {
            Err(SimError::OutOfBounds {
                x: position.x,
                y: position.y,
                size: bounds.width(),
            })
        }
    }

    /// Ids of agents whose indexed position lies inside `area`
    pub fn query(&self, area: &Rect) -> Vec<AgentId> {
        self.tree.query(area)
    }

    pub fn query_agents<'a>(&'a self, area: &Rect) -> impl Iterator<Item = &'a Agent> + 'a {
        self.tree.query(area).into_iter().filter_map(move |id| self.agents.get(id))
    }

    #[inline]
    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(id)
    }

    /// Every stored agent exactly once, in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = &Agent> + '_ {
        self.agents.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Agent> + '_ {
        self.agents.iter_mut()
    }

    pub fn ids(&self) -> Vec<AgentId> {
        self.agents.ids().collect()
    }

    /// Evict agents flagged `pending_removal`, then rebuild the tree
    ///
    /// Returns the evicted ids; they become available for reuse.
    pub fn refresh(&mut self) -> Result<Vec<AgentId>> {
        let removed = self.evict_pending();
        self.rebuild()?;
        Ok(removed)
    }

    /// Evict agents flagged `pending_removal` without touching the tree
    ///
    /// The tree keeps answering with the evicted ids until the next
    /// [`SpatialIndex::rebuild`]; callers must rebuild before querying.
    pub fn evict_pending(&mut self) -> Vec<AgentId> {
        self.agents.purge_pending()
    }

    /// Reinsert every agent from the root at its current position
    pub fn rebuild(&mut self) -> Result<()> {
        self.tree.clear();
        for agent in self.agents.iter() {
            self.tree.insert(agent.id(), agent.position)?;
        }
        Ok(())
    }

    /// Depth of the current tree, for diagnostics
    pub fn depth(&self) -> u32 {
        self.tree.depth()
    }
}
