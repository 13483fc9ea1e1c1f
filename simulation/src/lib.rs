#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-order composition of the world and the pure systems.
//!
//! Every update feeds the previous tick's events to the systems, applies the
//! commands they emit in system order and closes the tick with a
//! [`Command::Step`].

use std::time::Duration;

use elemental_arena_core::{Command, Event, Intent};
use elemental_arena_system_ai::Brain;
use elemental_arena_system_boss::BossDirector;
use elemental_arena_system_player_control::{Config as PlayerControlConfig, PlayerControl};
use elemental_arena_system_spawning::{Config as SpawningConfig, Spawning};
use elemental_arena_world::{self as world, query, Config as WorldConfig, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Seed and per-system configuration of a simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    seed: u64,
    world: WorldConfig,
    spawning: SpawningConfig,
    player_control: PlayerControlConfig,
}

impl Config {
    /// Creates a configuration with the provided seed and default systems.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            world: WorldConfig::default(),
            spawning: SpawningConfig::default(),
            player_control: PlayerControlConfig::default(),
        }
    }

    /// Returns the configuration with a different arena.
    #[must_use]
    pub const fn with_world(mut self, world: WorldConfig) -> Self {
        self.world = world;
        self
    }

    /// Returns the configuration with a different spawning cadence.
    #[must_use]
    pub const fn with_spawning(mut self, spawning: SpawningConfig) -> Self {
        self.spawning = spawning;
        self
    }

    /// Returns the configuration with different player tuning.
    #[must_use]
    pub const fn with_player_control(mut self, player_control: PlayerControlConfig) -> Self {
        self.player_control = player_control;
        self
    }

    /// Seed of the random stream shared by every system.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Arena configuration.
    #[must_use]
    pub const fn world(&self) -> WorldConfig {
        self.world
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(0)
    }
}

/// World plus the systems that drive it, advanced one tick at a time.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    player_control: PlayerControl,
    brain: Brain,
    director: BossDirector,
    spawning: Spawning,
    rng: ChaCha8Rng,
    pending: Vec<Event>,
    commands: Vec<Command>,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Simulation {
    /// Creates a simulation with an empty arena.
    #[must_use]
    pub fn new(config: Config) -> Self {
        log::debug!("simulation seeded with {:#x}", config.seed);
        Self {
            world: World::new(config.world),
            player_control: PlayerControl::new(config.player_control),
            brain: Brain::new(),
            director: BossDirector::new(),
            spawning: Spawning::new(config.spawning),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            pending: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// Applies a command outside the tick cycle, such as configuring platforms
    /// or spawning the player. The resulting events reach the systems on the
    /// next update.
    pub fn apply(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        self.pending.extend(events.iter().cloned());
        events
    }

    /// Runs one tick and returns the events it produced.
    pub fn update(&mut self, dt: Duration, intent: &Intent) -> &[Event] {
        let previous = std::mem::take(&mut self.pending);
        let combatants = query::combatant_view(&self.world);
        let projectiles = query::projectile_view(&self.world);
        let arena = query::config(&self.world).arena();
        let platforms = query::platforms(&self.world).to_vec();

        self.commands.clear();
        self.player_control
            .handle(&previous, intent, &combatants, &mut self.commands);
        self.brain.handle(
            &previous,
            &combatants,
            &projectiles,
            arena,
            &mut self.rng,
            &mut self.commands,
        );
        self.director.handle(
            &previous,
            &combatants,
            arena,
            &mut self.rng,
            &mut self.commands,
        );
        self.spawning.handle(
            &previous,
            &combatants,
            &platforms,
            &mut self.rng,
            &mut self.commands,
        );
        self.commands.push(Command::Step { dt });
        log::trace!("update: {} commands", self.commands.len());

        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.pending);
        }
        &self.pending
    }

    /// Authoritative world, for queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Spawning director, for wave and stage progress.
    #[must_use]
    pub fn spawning(&self) -> &Spawning {
        &self.spawning
    }

    /// Player controller, for weapon and cooldown state.
    #[must_use]
    pub fn player_control(&self) -> &PlayerControl {
        &self.player_control
    }
}
