#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line driver that replays an Elemental Arena scenario.

mod scenario;
mod summary;

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use elemental_arena_core::{Command, Event};
use elemental_arena_simulation::Simulation;

use crate::{scenario::Scenario, summary::Summary};

#[derive(Debug, Parser)]
#[command(author, version, about = "Runs an Elemental Arena scenario headlessly", long_about = None)]
struct Cli {
    /// Scenario file to run instead of the bundled arena.
    #[arg(long)]
    scenario: Option<PathBuf>,
    /// Overrides the scenario seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Overrides the number of ticks derived from the scenario duration.
    #[arg(long)]
    ticks: Option<u64>,
    /// Prints only the final summary instead of every event.
    #[arg(long)]
    summary_only: bool,
}

/// Entry point for the Elemental Arena command-line interface.
fn main() -> Result<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .try_init();

    let cli = Cli::parse();
    let scenario = load(&cli)?;
    scenario.validate().context("invalid scenario")?;

    let seed = cli.seed.unwrap_or(scenario.seed());
    let ticks = cli.ticks.unwrap_or(scenario.ticks());
    log::info!("running {ticks} ticks with seed {seed:#x}");

    let mut simulation = Simulation::new(scenario.simulation_config(seed));
    let mut summary = Summary::default();
    for command in [
        Command::ConfigurePlatforms {
            platforms: scenario.platforms(),
        },
        Command::SpawnPlayer {
            position: scenario.player_spawn(),
        },
    ] {
        for event in simulation.apply(command) {
            summary.record(0, &event);
        }
    }

    let dt = scenario.tick();
    for tick in 0..ticks {
        let intent = scenario.intent(tick);
        for event in simulation.update(dt, &intent) {
            summary.record(tick, event);
            if !cli.summary_only && !matches!(event, Event::TimeAdvanced { .. }) {
                println!("{tick:>6} {event:?}");
            }
        }
    }

    println!("{summary}");
    println!(
        "wave {} at stage {:?}",
        simulation.spawning().wave(),
        simulation.spawning().stage()
    );
    Ok(())
}

fn load(cli: &Cli) -> Result<Scenario> {
    match &cli.scenario {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read scenario at {}", path.display()))?;
            Scenario::from_toml(&contents)
                .with_context(|| format!("failed to load scenario {}", path.display()))
        }
        None => Scenario::from_toml(scenario::BUILTIN).context("failed to load bundled scenario"),
    }
}
