//! A single simulated individual and its per-tick state machine

use rand::Rng;
use serde::Serialize;

use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{AgentId, Tick, Vec2};
use crate::entity::status::{Direction, Status};

/// Status change produced by [`Agent::advance`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    BecameSick,
    Died,
}

/// One simulated individual
///
/// Agents are owned by the [`crate::spatial::SpatialIndex`]; the id is
/// assigned when the agent is inserted there.
#[derive(Debug, Clone, Serialize)]
pub struct Agent {
    pub(crate) id: AgentId,
    pub position: Vec2,
    pub status: Status,
    pub facing: Direction,
    /// Signed so a fresh agent can start at `-change_direction_after`
    pub(crate) last_direction_change: i64,
    pub infected_at: Option<Tick>,
    pub sick_at: Option<Tick>,
    pub died_at: Option<Tick>,
    pub pending_removal: bool,
    /// Current per-tick death probability, escalates after failed rolls
    death_rate: f32,
}

impl Agent {
    /// Create a Healthy agent at `position`
    pub fn healthy(position: Vec2, config: &SimulationConfig) -> Self {
        Self::with_status(position, Status::Healthy, config)
    }

    /// Create an agent that became Infectious at `tick`
    pub fn infectious(position: Vec2, tick: Tick, config: &SimulationConfig) -> Self {
        let mut agent = Self::with_status(position, Status::Infectious, config);
        agent.infected_at = Some(tick);
        agent
    }

    fn with_status(position: Vec2, status: Status, config: &SimulationConfig) -> Self {
        Self {
            id: AgentId(0),
            position,
            status,
            facing: Direction::Right,
            // Forces a direction pick on the very first tick
            last_direction_change: -(config.change_direction_after as i64),
            infected_at: None,
            sick_at: None,
            died_at: None,
            pending_removal: false,
            death_rate: config.die_rate,
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn death_rate(&self) -> f32 {
        self.death_rate
    }

    pub fn is_healthy(&self) -> bool {
        self.status.is_healthy()
    }

    /// Advance movement and disease progression by one tick
    ///
    /// Ambulatory agents resample their heading when the last change is
    /// at least `change_direction_after` ticks old, then step once.
    /// Afterwards at most one status transition fires.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        tick: Tick,
        config: &SimulationConfig,
        rng: &mut R,
    ) -> Result<Option<Transition>> {
        if self.status.is_ambulatory() {
            let now = tick as i64;
            let elapsed = now.saturating_sub(self.last_direction_change);
            if elapsed >= config.change_direction_after as i64 {
                self.facing = Direction::random(rng);
                self.last_direction_change = now;
            }
            self.step(config);
        }

        match self.status {
            Status::Healthy | Status::Dead => Ok(None),
            Status::Infectious => {
                let infected_at = self.require(self.infected_at, "Infectious without infected_at")?;
                if tick >= infected_at.saturating_add(config.time_infectious) {
                    self.status = Status::Sick;
                    self.sick_at = Some(tick);
                    return Ok(Some(Transition::BecameSick));
                }
                Ok(None)
            }
            Status::Sick => {
                let sick_at = self.require(self.sick_at, "Sick without sick_at")?;
                if tick < sick_at.saturating_add(config.time_sick) {
                    return Ok(None);
                }
                let roll: f32 = rng.gen();
                if roll <= self.death_rate {
                    self.status = Status::Dead;
                    self.died_at = Some(tick);
                    Ok(Some(Transition::Died))
                } else {
                    self.death_rate = (self.death_rate * config.die_rate_growth).min(1.0);
                    Ok(None)
                }
            }
        }
    }

    /// Move one step along `facing`, wrapping around the arena edges
    fn step(&mut self, config: &SimulationConfig) {
        let size = config.room_size;
        let next = self.position + self.facing.step(config.move_distance);
        self.position = Vec2::new(wrap(next.x, size), wrap(next.y, size));
    }

    /// Turn a Healthy agent Infectious. Returns false for any other status.
    pub fn infect(&mut self, tick: Tick) -> bool {
        if !self.status.is_healthy() {
            return false;
        }
        self.status = Status::Infectious;
        self.infected_at = Some(tick);
        true
    }

    /// Raise `pending_removal` once a corpse has outlived the retention window
    pub fn flag_if_expired(&mut self, tick: Tick, config: &SimulationConfig) -> Result<bool> {
        if self.status != Status::Dead || self.pending_removal {
            return Ok(false);
        }
        let died_at = self.require(self.died_at, "Dead without died_at")?;
        if tick >= died_at.saturating_add(config.remove_dead_after) {
            self.pending_removal = true;
            return Ok(true);
        }
        Ok(false)
    }

    fn require(&self, stamp: Option<Tick>, what: &str) -> Result<Tick> {
        match stamp {
            Some(t) => Ok(t),
            None => {
                debug_assert!(false, "agent {}: {}", self.id, what);
                Err(SimError::InvariantViolation(format!("agent {}: {}", self.id, what)))
            }
        }
    }
}

/// Toroidal wrap: below 0 jumps to `size`, above `size` jumps to 0
#[inline]
fn wrap(value: f32, size: f32) -> f32 {
    if value < 0.0 {
        size
    } else if value > size {
        0.0
    } else {
        value
    }
}
