//! Simulation engine - owns the population and drives ticks
//!
//! A `Simulation` is the single owner of all mutable state: the agent
//! population (inside the spatial index), the shared random generator and
//! the tick counter. External collaborators read snapshots between ticks
//! and inject new infectious agents; nothing else mutates the engine.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{AgentId, Tick, Vec2};
use crate::entity::agent::Agent;
use crate::simulation::snapshot::{AgentView, StatusCounts};
use crate::simulation::tick::{run_simulation_tick, SimulationEvent};
use crate::spatial::index::SpatialIndex;

pub struct Simulation {
    pub(crate) config: SimulationConfig,
    pub(crate) index: SpatialIndex,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) current_tick: Tick,
    pub(crate) finished: bool,
}

impl Simulation {
    /// Build the initial population
    ///
    /// `population_size - initial_infected` Healthy agents are placed
    /// first, then `initial_infected` Infectious ones (infected at tick 0),
    /// all at uniformly random positions drawn from the seeded generator.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut index = SpatialIndex::from_config(&config);

        let healthy = config.population_size - config.initial_infected;
        for _ in 0..healthy {
            let position = random_position(&mut rng, config.room_size);
            index.insert(Agent::healthy(position, &config))?;
        }
        for _ in 0..config.initial_infected {
            let position = random_position(&mut rng, config.room_size);
            index.insert(Agent::infectious(position, 0, &config))?;
        }

        tracing::info!(
            "Simulation created: {} agents ({} infectious) in a {}x{} arena, seed {}",
            index.len(),
            config.initial_infected,
            config.room_size,
            config.room_size,
            config.seed
        );

        Ok(Self {
            config,
            index,
            rng,
            current_tick: 0,
            finished: false,
        })
    }

    /// Add an Infectious agent at `position`, infected at the current tick
    ///
    /// This is the entry point for pointer input from a UI.
    pub fn inject_agent(&mut self, position: Vec2) -> Result<AgentId> {
        if self.finished {
            return Err(SimError::SimulationFinished {
                tick: self.current_tick,
            });
        }
        let agent = Agent::infectious(position, self.current_tick, &self.config);
        let id = self.index.insert(agent)?;
        tracing::debug!(
            "Injected agent {} at ({:.1}, {:.1}) on tick {}",
            id,
            position.x,
            position.y,
            self.current_tick
        );
        Ok(id)
    }

    /// Advance one tick; see [`run_simulation_tick`]
    pub fn tick(&mut self) -> Result<Vec<SimulationEvent>> {
        run_simulation_tick(self)
    }

    /// Tick until finished or `max_ticks` ticks have run
    ///
    /// Returns the number of ticks executed.
    pub fn run(&mut self, max_ticks: u64) -> Result<u64> {
        let mut ran = 0;
        while !self.finished && ran < max_ticks {
            self.tick()?;
            ran += 1;
        }
        Ok(ran)
    }

    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    /// True once no agent is non-Healthy or the population is empty
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn population(&self) -> usize {
        self.index.len()
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.index.get(id)
    }

    /// Point-in-time copy of every live agent, ascending id order
    pub fn snapshot(&self) -> Vec<AgentView> {
        self.index.iter().map(AgentView::from).collect()
    }

    pub fn counts(&self) -> StatusCounts {
        StatusCounts::tally(self.index.iter())
    }
}

fn random_position<R: Rng + ?Sized>(rng: &mut R, size: f32) -> Vec2 {
    Vec2::new(rng.gen::<f32>() * size, rng.gen::<f32>() * size)
}
