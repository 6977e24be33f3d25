//! Simulation configuration with documented constants
//!
//! All magic numbers are collected here with explanations of their purpose
//! and how they interact with each other.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};

/// Deepest quadtree level accepted by [`SimulationConfig::validate`]
///
/// f32 midpoints stop being distinct well before this depth, so deeper
/// trees only add empty splits.
pub const MAX_TREE_DEPTH: u32 = 32;

/// Configuration for the epidemic simulation
///
/// Defaults reproduce the classic 1000-person, 800x800 room setup.
/// Every field may be overridden from a TOML file; missing keys fall
/// back to the default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === ARENA ===
    /// Side length of the square arena (world units)
    ///
    /// Positions live in `[0, room_size]` on both axes and wrap around
    /// toroidally when an agent steps past an edge.
    pub room_size: f32,

    /// Distance an ambulatory agent travels per tick
    pub move_distance: f32,

    /// Ticks between two direction resamples of the same agent
    pub change_direction_after: u64,

    // === POPULATION ===
    /// Number of agents created at initialization
    pub population_size: usize,

    /// How many of the initial agents start Infectious
    ///
    /// Must not exceed `population_size`.
    pub initial_infected: usize,

    /// Seed for the shared random generator
    ///
    /// Two engines with the same config (seed included) replay the same
    /// epidemic tick for tick.
    pub seed: u64,

    // === DISEASE PROGRESSION ===
    /// Ticks an agent stays Infectious before turning Sick
    pub time_infectious: u64,

    /// Ticks an agent stays Sick before death rolls start
    pub time_sick: u64,

    /// Ticks a corpse stays in the arena (and contagious) before removal
    pub remove_dead_after: u64,

    /// Initial per-tick probability that a Sick agent past `time_sick` dies
    pub die_rate: f32,

    /// Multiplier applied to an agent's death probability after each failed roll
    ///
    /// At 1.0 the rate is constant. At the default 1.1 a rate of 0.001
    /// reaches certainty after roughly 73 failed rolls, so nobody lingers
    /// Sick forever.
    pub die_rate_growth: f32,

    // === CONTAGION ===
    /// Distance within which a non-Healthy agent can infect a Healthy one
    pub influence_radius: f32,

    /// Per-tick infection probability for a Healthy neighbour of an Infectious agent
    pub infectious_infection_rate: f32,

    /// Per-tick infection probability for a Healthy neighbour of a Sick agent
    pub sick_infection_rate: f32,

    /// Per-tick infection probability for a Healthy neighbour of a corpse
    pub dead_infection_rate: f32,

    // === SPATIAL INDEX ===
    /// Occupants a quadtree leaf holds before it splits
    pub node_capacity: usize,

    /// Depth below which leaves stop splitting
    ///
    /// Once reached, `node_capacity` becomes advisory and leaves grow
    /// without bound. Keeps degenerate inputs (many agents on one point)
    /// from recursing forever. At most [`MAX_TREE_DEPTH`].
    pub max_depth: u32,

    // === PARALLELIZATION ===
    /// Minimum live population before contagion candidate search runs on rayon
    ///
    /// Below this threshold, thread overhead exceeds benefits.
    pub parallel_threshold: usize,

    // === REPORTING ===
    /// Ticks between two infected-count log lines (0 disables)
    pub report_interval: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            room_size: 800.0,
            move_distance: 2.0,
            change_direction_after: 10,

            population_size: 1000,
            initial_infected: 100,
            seed: 42,

            time_infectious: 50,
            time_sick: 50,
            remove_dead_after: 80,
            die_rate: 0.001,
            die_rate_growth: 1.1,

            // Sick > Infectious, corpses worst of all
            influence_radius: 25.0,
            infectious_infection_rate: 0.02,
            sick_infection_rate: 0.08,
            dead_infection_rate: 0.5,

            node_capacity: 32,
            max_depth: 16,

            parallel_threshold: 1000,

            report_interval: 50,
        }
    }
}

impl SimulationConfig {
    /// Parse a config from TOML text, filling missing keys with defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.initial_infected > self.population_size {
            return Err(SimError::InvalidConfig(format!(
                "initial_infected ({}) exceeds population_size ({})",
                self.initial_infected, self.population_size
            )));
        }

        if !(self.room_size.is_finite() && self.room_size > 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "room_size must be positive, got {}",
                self.room_size
            )));
        }

        if !(self.move_distance.is_finite() && self.move_distance >= 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "move_distance must be non-negative, got {}",
                self.move_distance
            )));
        }

        if !(self.influence_radius.is_finite() && self.influence_radius >= 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "influence_radius must be non-negative, got {}",
                self.influence_radius
            )));
        }

        let rates = [
            ("die_rate", self.die_rate),
            ("infectious_infection_rate", self.infectious_infection_rate),
            ("sick_infection_rate", self.sick_infection_rate),
            ("dead_infection_rate", self.dead_infection_rate),
        ];
        for (name, rate) in rates {
            if !(0.0..=1.0).contains(&rate) {
                return Err(SimError::InvalidConfig(format!(
                    "{} must be a probability in [0, 1], got {}",
                    name, rate
                )));
            }
        }

        if !(self.die_rate_growth.is_finite() && self.die_rate_growth >= 1.0) {
            return Err(SimError::InvalidConfig(format!(
                "die_rate_growth must be >= 1.0, got {}",
                self.die_rate_growth
            )));
        }

        if self.node_capacity == 0 {
            return Err(SimError::InvalidConfig("node_capacity must be at least 1".into()));
        }

        if self.max_depth > MAX_TREE_DEPTH {
            return Err(SimError::InvalidConfig(format!(
                "max_depth must be at most {}, got {}",
                MAX_TREE_DEPTH, self.max_depth
            )));
        }

        if self.change_direction_after == 0 || self.change_direction_after > i64::MAX as u64 {
            return Err(SimError::InvalidConfig(format!(
                "change_direction_after must be in [1, {}], got {}",
                i64::MAX,
                self.change_direction_after
            )));
        }

        Ok(())
    }
}
