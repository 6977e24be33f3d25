//! Dense slot storage for agents with id reuse
//!
//! An agent's id is its slot index. Removing an agent frees the slot and
//! the lowest free slot is handed out on the next insert, so two live
//! agents never share an id and ids stay small.

use std::collections::BTreeSet;

use crate::core::types::AgentId;
use crate::entity::agent::Agent;

#[derive(Debug, Clone, Default)]
pub struct AgentArena {
    slots: Vec<Option<Agent>>,
    free: BTreeSet<u32>,
}

impl AgentArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: BTreeSet::new(),
        }
    }

    /// Store `agent` in the lowest free slot and stamp it with that id
    pub fn insert(&mut self, mut agent: Agent) -> AgentId {
        let id = match self.free.pop_first() {
            Some(slot) => AgentId(slot),
            None => {
                self.slots.push(None);
                AgentId((self.slots.len() - 1) as u32)
            }
        };
        agent.id = id;
        self.slots[id.index()] = Some(agent);
        id
    }

    pub fn remove(&mut self, id: AgentId) -> Option<Agent> {
        let agent = self.slots.get_mut(id.index())?.take()?;
        self.free.insert(id.0);
        Some(agent)
    }

    #[inline]
    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.slots.get(id.index())?.as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.slots.get_mut(id.index())?.as_mut()
    }

    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live agents in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = &Agent> + '_ {
        self.slots.iter().filter_map(|slot| slot.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Agent> + '_ {
        self.slots.iter_mut().filter_map(|slot| slot.as_mut())
    }

    pub fn ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.iter().map(|agent| agent.id)
    }

    /// Remove every agent with `pending_removal` set, returning their ids
    pub fn purge_pending(&mut self) -> Vec<AgentId> {
        let doomed: Vec<AgentId> = self
            .iter()
            .filter(|agent| agent.pending_removal)
            .map(|agent| agent.id)
            .collect();
        for &id in &doomed {
            self.remove(id);
        }
        doomed
    }
}
