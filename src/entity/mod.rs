//! Simulated individuals: health status, per-tick state machine, storage

pub mod agent;
pub mod arena;
pub mod status;

pub use agent::{Agent, Transition};
pub use arena::AgentArena;
pub use status::{Direction, Status};
