//! Proximity-based infection
//!
//! Split in two passes so the search can run in parallel:
//! 1. [`find_exposures`] reads the index and lists, per contagious
//!    source, the Healthy agents within the influence radius.
//! 2. [`resolve_contagion`] draws the infection rolls and applies them
//!    serially in source id order, so results only depend on the seed.

use rand::Rng;
use rayon::prelude::*;

use crate::core::config::SimulationConfig;
use crate::core::types::{AgentId, Tick};
use crate::spatial::index::SpatialIndex;
use crate::spatial::rect::Rect;

/// Healthy agents within reach of one contagious source
#[derive(Debug, Clone, PartialEq)]
pub struct Exposure {
    pub source: AgentId,
    /// Infection probability of the source's status
    pub rate: f32,
    /// Sorted by id
    pub targets: Vec<AgentId>,
}

/// A successful transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Infection {
    pub source: AgentId,
    pub target: AgentId,
}

/// Healthy agents within `radius` of `source`, sorted by id
///
/// The index narrows the search to the bounding square of the disc;
/// the exact distance check does the rest.
pub fn healthy_neighbours(index: &SpatialIndex, source: AgentId, radius: f32) -> Vec<AgentId> {
    let Some(origin) = index.get(source) else {
        return Vec::new();
    };
    let center = origin.position;
    let mut found: Vec<AgentId> = index
        .query_agents(&Rect::around(center, radius))
        .filter(|agent| agent.is_healthy() && agent.position.distance(&center) <= radius)
        .map(|agent| agent.id())
        .collect();
    found.sort_unstable();
    found
}

/// Collect exposures for every source, in the order given
///
/// With `parallel` set the per-source searches run on rayon; the output
/// is identical either way.
pub fn find_exposures(
    index: &SpatialIndex,
    sources: &[AgentId],
    config: &SimulationConfig,
    parallel: bool,
) -> Vec<Exposure> {
    let exposure = |&source: &AgentId| -> Option<Exposure> {
        let agent = index.get(source)?;
        if agent.is_healthy() {
            return None;
        }
        Some(Exposure {
            source,
            rate: agent.status.infection_rate(config),
            targets: healthy_neighbours(index, source, config.influence_radius),
        })
    };

    if parallel {
        sources.par_iter().filter_map(exposure).collect()
    } else {
        sources.iter().filter_map(exposure).collect()
    }
}

/// Roll every exposure and convert the unlucky targets
///
/// A target converts at most once per tick: after the first successful
/// roll it is no longer Healthy and later sources skip it without drawing.
pub fn resolve_contagion<R: Rng + ?Sized>(
    index: &mut SpatialIndex,
    exposures: &[Exposure],
    tick: Tick,
    rng: &mut R,
) -> Vec<Infection> {
    let mut infections = Vec::new();
    for exposure in exposures {
        for &target in &exposure.targets {
            let Some(agent) = index.get_mut(target) else {
                continue;
            };
            if !agent.is_healthy() {
                continue;
            }
            let roll: f32 = rng.gen();
            if roll <= exposure.rate && agent.infect(tick) {
                infections.push(Infection {
                    source: exposure.source,
                    target,
                });
            }
        }
    }
    infections
}
