#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawning director that paces hostile waves and schedules the boss sequence.

use std::time::Duration;

use elemental_arena_core::{
    Aabb, Archetype, Command, CombatantView, Event, Role, SimTime, Vec2,
};
use rand::{seq::SliceRandom, Rng, RngCore};

const BOSS_ORDER: [Archetype; 3] = [
    Archetype::BossLavaTornado,
    Archetype::BossTsunami,
    Archetype::BossSniper,
];
const EDGE_MARGIN: f32 = 30.0;
const PLACEMENT_ATTEMPTS: usize = 10;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    spawn_interval: Duration,
    kills_per_wave: u32,
    health_step: f32,
    damage_step: f32,
    boss_delay: Duration,
    min_player_distance: f32,
}

impl Config {
    /// Creates a configuration with the provided cadence and wave length.
    #[must_use]
    pub const fn new(spawn_interval: Duration, kills_per_wave: u32) -> Self {
        Self {
            spawn_interval,
            kills_per_wave,
            health_step: 0.15,
            damage_step: 0.08,
            boss_delay: Duration::from_secs(3),
            min_player_distance: 150.0,
        }
    }

    /// Returns the configuration with a different delay between bosses.
    #[must_use]
    pub const fn with_boss_delay(mut self, boss_delay: Duration) -> Self {
        self.boss_delay = boss_delay;
        self
    }

    /// Time between two regular spawns.
    #[must_use]
    pub const fn spawn_interval(&self) -> Duration {
        self.spawn_interval
    }

    /// Kills needed to finish a wave.
    #[must_use]
    pub const fn kills_per_wave(&self) -> u32 {
        self.kills_per_wave
    }

    /// Health multiplier applied to hostiles spawned in `wave`.
    #[must_use]
    pub fn health_multiplier(&self, wave: u32) -> f32 {
        1.0 + self.health_step * wave.saturating_sub(1) as f32
    }

    /// Damage multiplier applied to hostiles spawned in `wave`.
    #[must_use]
    pub fn damage_multiplier(&self, wave: u32) -> f32 {
        1.0 + self.damage_step * wave.saturating_sub(1) as f32
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Duration::from_millis(2_500), 10)
    }
}

/// Progress of the encounter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Regular hostiles spawn on a fixed cadence.
    Minions,
    /// A boss is in the arena; regular spawning is paused.
    Boss {
        /// Position of the boss in the sequence.
        index: usize,
    },
    /// Regular spawning resumes until the next boss arrives.
    Intermission {
        /// Position of the next boss in the sequence.
        index: usize,
        /// Time at which the boss arrives.
        until: SimTime,
    },
    /// The final boss fell; regular waves continue.
    Cleared,
}

/// Pure system that emits spawn commands from the simulation clock and kills.
#[derive(Debug)]
pub struct Spawning {
    config: Config,
    accumulator: Duration,
    now: SimTime,
    kills: u32,
    stage: Stage,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            accumulator: Duration::ZERO,
            now: SimTime::ZERO,
            kills: 0,
            stage: Stage::Minions,
        }
    }

    /// Current wave, starting at one.
    #[must_use]
    pub fn wave(&self) -> u32 {
        1 + self.kills / self.config.kills_per_wave.max(1)
    }

    /// Regular hostiles killed so far.
    #[must_use]
    pub const fn kills(&self) -> u32 {
        self.kills
    }

    /// Current stage of the encounter.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    /// Consumes events and immutable views to emit spawn commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        combatants: &CombatantView,
        platforms: &[Aabb],
        rng: &mut dyn RngCore,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            self.observe(event, out);
        }

        if platforms.is_empty() {
            return;
        }

        match self.stage {
            Stage::Minions if self.kills >= self.config.kills_per_wave => {
                self.summon_boss(0, combatants, platforms, out);
            }
            Stage::Intermission { index, until } if self.now >= until => {
                self.summon_boss(index, combatants, platforms, out);
            }
            Stage::Boss { .. } => {}
            Stage::Minions | Stage::Intermission { .. } | Stage::Cleared => {
                let attempts = self.resolve_spawn_attempts();
                for _ in 0..attempts {
                    self.spawn_minion(combatants, platforms, rng, out);
                }
            }
        }
    }

    fn observe(&mut self, event: &Event, out: &mut Vec<Command>) {
        match event {
            Event::TimeAdvanced { dt, now } => {
                self.now = *now;
                if !matches!(self.stage, Stage::Boss { .. }) {
                    self.accumulator = self.accumulator.saturating_add(*dt);
                }
            }
            Event::Killed { role, .. } if !role.is_boss() && *role != Role::Player => {
                self.kills += 1;
                if self.kills % self.config.kills_per_wave.max(1) == 0 {
                    log::debug!("wave {} reached after {} kills", self.wave(), self.kills);
                }
            }
            Event::BossDefeated { archetype, .. } => self.boss_fell(*archetype, out),
            Event::FellOut {
                role: Role::Hostile(archetype),
                ..
            } if archetype.is_boss() => self.boss_fell(*archetype, out),
            Event::SpawnRejected { role, reason } => {
                log::debug!("spawn of {:?} rejected: {:?}", role, reason);
            }
            Event::WorldReset => *self = Self::new(self.config),
            _ => {}
        }
    }

    fn boss_fell(&mut self, archetype: Archetype, out: &mut Vec<Command>) {
        let Stage::Boss { index } = self.stage else {
            return;
        };
        if BOSS_ORDER.get(index) != Some(&archetype) {
            return;
        }

        let next = index + 1;
        if next < BOSS_ORDER.len() {
            self.stage = Stage::Intermission {
                index: next,
                until: self.now.advanced(self.config.boss_delay),
            };
        } else {
            log::debug!("final boss defeated");
            self.stage = Stage::Cleared;
            out.push(Command::DeclareCleared);
        }
    }

    fn resolve_spawn_attempts(&mut self) -> usize {
        if self.config.spawn_interval.is_zero() {
            return 0;
        }

        let mut attempts = 0;
        while self.accumulator >= self.config.spawn_interval {
            self.accumulator -= self.config.spawn_interval;
            attempts += 1;
        }
        attempts
    }

    fn spawn_minion(
        &self,
        combatants: &CombatantView,
        platforms: &[Aabb],
        rng: &mut dyn RngCore,
        out: &mut Vec<Command>,
    ) {
        let Some(archetype) = Archetype::MINIONS.choose(rng).copied() else {
            return;
        };
        let player_x = combatants.player().map(|player| player.center().x);
        let Some((position, platform)) = self.placement(archetype, player_x, platforms, rng) else {
            return;
        };

        let wave = self.wave();
        out.push(Command::SpawnHostile {
            archetype,
            position,
            home_platform: Some(platform),
            health_multiplier: self.config.health_multiplier(wave),
            damage_multiplier: self.config.damage_multiplier(wave),
        });
    }

    fn placement(
        &self,
        archetype: Archetype,
        player_x: Option<f32>,
        platforms: &[Aabb],
        rng: &mut dyn RngCore,
    ) -> Option<(Vec2, Aabb)> {
        let size = archetype.stats().size();
        let far_enough = |x: f32| {
            player_x.map_or(true, |player_x| {
                (x + size.x * 0.5 - player_x).abs() >= self.config.min_player_distance
            })
        };

        for _ in 0..PLACEMENT_ATTEMPTS {
            let platform = *platforms.choose(rng)?;
            let min_x = platform.left() + EDGE_MARGIN;
            let max_x = platform.right() - EDGE_MARGIN - size.x;
            let x = if max_x <= min_x {
                platform.center().x - size.x * 0.5
            } else {
                rng.gen_range(min_x..=max_x)
            };
            if far_enough(x) {
                return Some((Vec2::new(x, platform.top() - size.y), platform));
            }
        }

        let away = |platform: &Aabb| {
            let left = platform.left() + EDGE_MARGIN;
            let right = (platform.right() - EDGE_MARGIN - size.x).max(left);
            match player_x {
                Some(player_x) if player_x < platform.center().x => right,
                _ => left,
            }
        };
        let distance = |platform: &Aabb| {
            player_x.map_or(0.0, |player_x| (away(platform) + size.x * 0.5 - player_x).abs())
        };
        let platform = platforms
            .iter()
            .copied()
            .max_by(|a, b| distance(a).total_cmp(&distance(b)))?;
        Some((Vec2::new(away(&platform), platform.top() - size.y), platform))
    }

    fn summon_boss(
        &mut self,
        index: usize,
        combatants: &CombatantView,
        platforms: &[Aabb],
        out: &mut Vec<Command>,
    ) {
        let Some(archetype) = BOSS_ORDER.get(index).copied() else {
            return;
        };
        let Some(ground) = ground_platform(platforms) else {
            return;
        };

        let size = archetype.stats().size();
        let player_x = combatants
            .player()
            .map_or(ground.center().x, |player| player.center().x);
        let x = if player_x < ground.center().x {
            ground.right() - EDGE_MARGIN - size.x
        } else {
            ground.left() + EDGE_MARGIN
        };

        log::debug!("summoning boss {:?} at stage {}", archetype, index + 1);
        self.stage = Stage::Boss { index };
        out.push(Command::SpawnHostile {
            archetype,
            position: Vec2::new(x, ground.top() - size.y),
            home_platform: Some(ground),
            health_multiplier: 1.0,
            damage_multiplier: 1.0,
        });
    }
}

/// Lowest platform, preferring the widest on ties.
#[must_use]
pub fn ground_platform(platforms: &[Aabb]) -> Option<Aabb> {
    platforms.iter().copied().max_by(|a, b| {
        a.top()
            .total_cmp(&b.top())
            .then_with(|| a.size().x.total_cmp(&b.size().x))
    })
}
