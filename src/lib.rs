//! Sickness Sim - agent-based epidemic simulation
//!
//! Agents wander a square toroidal arena and pass a disease to Healthy
//! neighbours. A point quadtree answers the per-tick proximity queries.

pub mod core;
pub mod entity;
pub mod simulation;
pub mod spatial;
