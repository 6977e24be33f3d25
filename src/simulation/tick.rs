//! Tick system - orchestrates simulation updates
//!
//! One tick runs, in order:
//! 1. Evict corpses flagged on an earlier tick
//! 2. Advance every agent (movement, Infectious -> Sick, Sick -> Dead), then
//!    rebuild the tree so proximity queries see this tick's positions
//! 3. Contagion: every non-Healthy agent exposes Healthy neighbours within
//!    the influence radius
//! 4. Flag corpses past the retention window for removal
//! 5. Termination check, then advance the tick counter if still running
//!
//! A corpse flagged in step 4 has already spread in step 3 of the same
//! tick and disappears in step 1 of the next.
//!
//! Steps 1 and 2 together amount to a refresh of the index taken after
//! movement, so the tree is rebuilt once per tick.

use crate::core::error::{Result, SimError};
use crate::core::types::{AgentId, Tick};
use crate::entity::agent::Transition;
use crate::simulation::contagion::{find_exposures, resolve_contagion};
use crate::simulation::engine::Simulation;
use crate::simulation::snapshot::StatusCounts;

/// Events generated during a simulation tick
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationEvent {
    /// `source` passed the disease to `target`
    Infected {
        source: AgentId,
        target: AgentId,
        tick: Tick,
    },
    BecameSick {
        agent: AgentId,
        tick: Tick,
    },
    Died {
        agent: AgentId,
        tick: Tick,
    },
    /// A corpse left the arena; its id is free again
    Removed {
        agent: AgentId,
        tick: Tick,
    },
    /// Epidemic over (or nobody left); no further ticks are accepted
    Finished {
        tick: Tick,
        counts: StatusCounts,
    },
}

/// Run a single simulation tick
///
/// Fails with `SimulationFinished` if the engine already reported the end
/// of the epidemic. Any other error is a broken invariant and leaves the
/// engine mid-tick.
pub fn run_simulation_tick(sim: &mut Simulation) -> Result<Vec<SimulationEvent>> {
    if sim.finished {
        return Err(SimError::SimulationFinished {
            tick: sim.current_tick,
        });
    }

    let Simulation {
        config,
        index,
        rng,
        current_tick,
        finished,
    } = sim;
    let tick = *current_tick;
    let mut events = Vec::new();

    // 1. Evict; the tree is rebuilt after movement
    for agent in index.evict_pending() {
        tracing::debug!("Removing agent {} on tick {}", agent, tick);
        events.push(SimulationEvent::Removed { agent, tick });
    }

    // 2. Local state machines
    for agent in index.iter_mut() {
        match agent.advance(tick, config, &mut *rng)? {
            Some(Transition::BecameSick) => {
                tracing::debug!(
                    "Agent {} became sick after {} ticks",
                    agent.id(),
                    tick - agent.infected_at.unwrap_or(tick)
                );
                events.push(SimulationEvent::BecameSick {
                    agent: agent.id(),
                    tick,
                });
            }
            Some(Transition::Died) => {
                tracing::debug!(
                    "Agent {} died after {} ticks sick",
                    agent.id(),
                    tick - agent.sick_at.unwrap_or(tick)
                );
                events.push(SimulationEvent::Died {
                    agent: agent.id(),
                    tick,
                });
            }
            None => {}
        }
    }
    index.rebuild()?;

    // 3. Contagion
    let sources: Vec<AgentId> = index
        .iter()
        .filter(|agent| !agent.is_healthy())
        .map(|agent| agent.id())
        .collect();
    let parallel = index.len() >= config.parallel_threshold;
    let exposures = find_exposures(index, &sources, config, parallel);
    for infection in resolve_contagion(index, &exposures, tick, &mut *rng) {
        tracing::debug!("Agent {} infected {}", infection.source, infection.target);
        events.push(SimulationEvent::Infected {
            source: infection.source,
            target: infection.target,
            tick,
        });
    }

    // 4. Retention window
    for agent in index.iter_mut() {
        if agent.flag_if_expired(tick, config)? {
            tracing::debug!("Agent {} flagged for removal", agent.id());
        }
    }

    // 5. Termination
    let counts = StatusCounts::tally(index.iter());
    if config.report_interval > 0 && tick % config.report_interval == 0 {
        tracing::info!(
            "#Infected at {}: {} (healthy {}, infectious {}, sick {}, dead {})",
            tick,
            counts.non_healthy(),
            counts.healthy,
            counts.infectious,
            counts.sick,
            counts.dead
        );
    }

    if counts.total() == 0 || counts.non_healthy() == 0 {
        *finished = true;
        tracing::info!(
            "Simulation finished on tick {} with {} survivors",
            tick,
            counts.healthy
        );
        events.push(SimulationEvent::Finished { tick, counts });
    } else {
        *current_tick += 1;
    }

    Ok(events)
}
