//! Read-only views of simulation state for renderers and reports

use serde::Serialize;

use crate::core::types::{AgentId, Vec2};
use crate::entity::agent::Agent;
use crate::entity::status::Status;

/// What a renderer needs to draw one agent
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AgentView {
    pub id: AgentId,
    pub position: Vec2,
    pub status: Status,
}

impl From<&Agent> for AgentView {
    fn from(agent: &Agent) -> Self {
        Self {
            id: agent.id(),
            position: agent.position,
            status: agent.status,
        }
    }
}

/// Population broken down by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub healthy: usize,
    pub infectious: usize,
    pub sick: usize,
    pub dead: usize,
}

impl StatusCounts {
    pub fn tally<'a>(agents: impl IntoIterator<Item = &'a Agent>) -> Self {
        let mut counts = Self::default();
        for agent in agents {
            counts.record(agent.status);
        }
        counts
    }

    pub fn record(&mut self, status: Status) {
        match status {
            Status::Healthy => self.healthy += 1,
            Status::Infectious => self.infectious += 1,
            Status::Sick => self.sick += 1,
            Status::Dead => self.dead += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.healthy + self.non_healthy()
    }

    /// Infectious, Sick and Dead (corpses awaiting removal included)
    pub fn non_healthy(&self) -> usize {
        self.infectious + self.sick + self.dead
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;

    #[test]
    fn test_tally() {
        let config = SimulationConfig::default();
        let mut dead = Agent::healthy(Vec2::new(1.0, 1.0), &config);
        dead.status = Status::Dead;
        let agents = vec![
            Agent::healthy(Vec2::new(1.0, 1.0), &config),
            Agent::healthy(Vec2::new(2.0, 1.0), &config),
            Agent::infectious(Vec2::new(3.0, 1.0), 0, &config),
            dead,
        ];

        let counts = StatusCounts::tally(&agents);
        assert_eq!(counts.healthy, 2);
        assert_eq!(counts.infectious, 1);
        assert_eq!(counts.dead, 1);
        assert_eq!(counts.non_healthy(), 2);
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn test_counts_serialize() {
        let counts = StatusCounts {
            healthy: 3,
            infectious: 1,
            sick: 0,
            dead: 2,
        };
        let json = serde_json::to_string(&counts).unwrap();
        assert_eq!(json, r#"{"healthy":3,"infectious":1,"sick":0,"dead":2}"#);
    }
}
