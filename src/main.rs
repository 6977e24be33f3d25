//! Sickness Sim - headless driver
//!
//! Alternates "read state" and "advance tick" until the epidemic burns
//! out or the tick limit is reached. Scheduled `--inject` events stand in
//! for a UI dropping new infectious agents into the arena.

use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use serde::Serialize;

use sickness_sim::core::config::SimulationConfig;
use sickness_sim::core::error::{Result, SimError};
use sickness_sim::core::types::{Tick, Vec2};
use sickness_sim::simulation::{Simulation, StatusCounts};

/// Agent-based epidemic simulation
#[derive(Parser, Debug)]
#[command(name = "sickness_sim")]
#[command(about = "Run an epidemic among wandering agents until it burns out")]
struct Args {
    /// TOML config file; missing keys use defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for deterministic runs (overrides the config)
    #[arg(long)]
    seed: Option<u64>,

    /// Population size (overrides the config)
    #[arg(long)]
    population: Option<usize>,

    /// Initially infected agents (overrides the config)
    #[arg(long)]
    initial_infected: Option<usize>,

    /// Maximum ticks before giving up
    #[arg(long, default_value_t = 100_000)]
    max_ticks: u64,

    /// Ticks between infected-count log lines (overrides the config)
    #[arg(long)]
    report_every: Option<u64>,

    /// Inject an infectious agent, as TICK:X:Y (repeatable)
    #[arg(long = "inject")]
    injections: Vec<Injection>,

    /// Print the final summary as JSON
    #[arg(long)]
    json: bool,
}

/// A scheduled "drop an infectious agent here" event
#[derive(Debug, Clone, Copy)]
struct Injection {
    tick: Tick,
    position: Vec2,
}

impl FromStr for Injection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 3 {
            return Err(format!("expected TICK:X:Y, got '{}'", s));
        }
        let tick = parts[0]
            .trim()
            .parse::<Tick>()
            .map_err(|e| format!("bad tick '{}': {}", parts[0], e))?;
        let x = parts[1]
            .trim()
            .parse::<f32>()
            .map_err(|e| format!("bad x '{}': {}", parts[1], e))?;
        let y = parts[2]
            .trim()
            .parse::<f32>()
            .map_err(|e| format!("bad y '{}': {}", parts[2], e))?;
        Ok(Self {
            tick,
            position: Vec2::new(x, y),
        })
    }
}

/// JSON output structure
#[derive(Serialize)]
struct RunSummary {
    seed: u64,
    ticks: Tick,
    finished: bool,
    population: usize,
    counts: StatusCounts,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("sickness_sim=info")),
        )
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;
    let seed = config.seed;

    let mut injections = args.injections;
    injections.sort_by_key(|i| i.tick);
    let mut pending = injections.into_iter().peekable();

    let mut sim = Simulation::new(config)?;
    let mut ticks_run = 0;

    while !sim.is_finished() && ticks_run < args.max_ticks {
        while let Some(injection) = pending.next_if(|i| i.tick <= sim.current_tick()) {
            match sim.inject_agent(injection.position) {
                Ok(id) => tracing::info!(
                    "Injected agent {} at ({}, {}) on tick {}",
                    id,
                    injection.position.x,
                    injection.position.y,
                    sim.current_tick()
                ),
                Err(SimError::OutOfBounds { x, y, size }) => {
                    tracing::warn!("Ignoring injection at ({}, {}): arena is [0, {}]", x, y, size)
                }
                Err(e) => return Err(e),
            }
        }

        sim.tick()?;
        ticks_run += 1;
    }

    if !sim.is_finished() {
        tracing::warn!("Stopped after {} ticks without the epidemic ending", ticks_run);
    }

    let summary = RunSummary {
        seed,
        ticks: sim.current_tick(),
        finished: sim.is_finished(),
        population: sim.population(),
        counts: sim.counts(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "Tick {} | population {} | healthy {} infectious {} sick {} dead {} | {}",
            summary.ticks,
            summary.population,
            summary.counts.healthy,
            summary.counts.infectious,
            summary.counts.sick,
            summary.counts.dead,
            if summary.finished { "finished" } else { "running" }
        );
    }

    Ok(())
}

fn build_config(args: &Args) -> Result<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(population) = args.population {
        config.population_size = population;
    }
    if let Some(initial) = args.initial_infected {
        config.initial_infected = initial;
    }
    if let Some(every) = args.report_every {
        config.report_interval = every;
    }

    config.validate()?;
    Ok(config)
}
