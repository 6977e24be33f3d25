pub mod contagion;
pub mod engine;
pub mod snapshot;
pub mod tick;

pub use contagion::{find_exposures, healthy_neighbours, resolve_contagion, Exposure, Infection};
pub use engine::Simulation;
pub use snapshot::{AgentView, StatusCounts};
pub use tick::{run_simulation_tick, SimulationEvent};
