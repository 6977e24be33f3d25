use thiserror::Error;

use crate::core::types::Tick;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Position ({x}, {y}) lies outside the arena [0, {size}]")]
    OutOfBounds { x: f32, y: f32, size: f32 },

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Simulation already finished at tick {tick}")]
    SimulationFinished { tick: Tick },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
