//! Health status and heading of an agent

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::types::Vec2;

/// Health status of an agent
///
/// Progression is strictly forward: Healthy -> Infectious -> Sick -> Dead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Status {
    Healthy,
    Infectious,
    Sick,
    Dead,
}

impl Status {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Status::Healthy)
    }

    /// Healthy and Infectious agents walk; Sick and Dead ones stay put
    pub fn is_ambulatory(&self) -> bool {
        matches!(self, Status::Healthy | Status::Infectious)
    }

    /// Probability that this status infects a Healthy neighbour in one tick
    pub fn infection_rate(&self, config: &SimulationConfig) -> f32 {
        match self {
            Status::Healthy => 0.0,
            Status::Infectious => config.infectious_infection_rate,
            Status::Sick => config.sick_infection_rate,
            Status::Dead => config.dead_infection_rate,
        }
    }

    /// True when `next` is this status or a later one
    pub fn can_become(&self, next: Status) -> bool {
        next >= *self
    }
}

/// Axis-aligned heading, in screen coordinates (Up is -y)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Right, Direction::Down, Direction::Left];

    /// Pick one of the four headings uniformly
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// Offset covered by a step of `distance` along this heading
    pub fn step(&self, distance: f32) -> Vec2 {
        match self {
            Direction::Up => Vec2::new(0.0, -distance),
            Direction::Right => Vec2::new(distance, 0.0),
            Direction::Down => Vec2::new(0.0, distance),
            Direction::Left => Vec2::new(-distance, 0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_status_ordering_is_progression() {
        assert!(Status::Healthy < Status::Infectious);
        assert!(Status::Infectious < Status::Sick);
        assert!(Status::Sick < Status::Dead);

        assert!(Status::Infectious.can_become(Status::Sick));
        assert!(Status::Sick.can_become(Status::Sick));
        assert!(!Status::Sick.can_become(Status::Infectious));
        assert!(!Status::Dead.can_become(Status::Healthy));
    }

    #[test]
    fn test_ambulatory() {
        assert!(Status::Healthy.is_ambulatory());
        assert!(Status::Infectious.is_ambulatory());
        assert!(!Status::Sick.is_ambulatory());
        assert!(!Status::Dead.is_ambulatory());
    }

    #[test]
    fn test_infection_rate_per_status() {
        let config = SimulationConfig::default();
        assert_eq!(Status::Healthy.infection_rate(&config), 0.0);
        assert_eq!(Status::Infectious.infection_rate(&config), 0.02);
        assert_eq!(Status::Sick.infection_rate(&config), 0.08);
        assert_eq!(Status::Dead.infection_rate(&config), 0.5);
    }

    #[test]
    fn test_direction_step() {
        assert_eq!(Direction::Up.step(2.0), Vec2::new(0.0, -2.0));
        assert_eq!(Direction::Right.step(2.0), Vec2::new(2.0, 0.0));
        assert_eq!(Direction::Down.step(2.0), Vec2::new(0.0, 2.0));
        assert_eq!(Direction::Left.step(2.0), Vec2::new(-2.0, 0.0));
    }

    #[test]
    fn test_random_direction_covers_all_headings() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut seen = [false; 4];
        for _ in 0..200 {
            let dir = Direction::random(&mut rng);
            let idx = Direction::ALL.iter().position(|d| *d == dir).unwrap();
            seen[idx] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }
}
