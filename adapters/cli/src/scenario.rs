//! TOML scenario describing the arena, the seed and a scripted intent timeline.

use std::time::Duration;

use anyhow::{Context, Result};
use elemental_arena_core::{Aabb, Facing, Intent, Vec2, WeaponKind};
use elemental_arena_simulation::Config;
use elemental_arena_system_spawning::Config as SpawningConfig;
use elemental_arena_world::Config as WorldConfig;
use serde::Deserialize;
use thiserror::Error;

/// Scenario bundled with the binary and used when no file is supplied.
pub(crate) const BUILTIN: &str = include_str!("../scenarios/arena.toml");

/// Reasons a scenario cannot be simulated.
#[derive(Debug, Error, PartialEq)]
pub(crate) enum ScenarioError {
    #[error("arena must have a positive size, got {width}x{height}")]
    NonPositiveArena { width: f32, height: f32 },
    #[error("tick rate must be at least one tick per second")]
    ZeroTickRate,
    #[error("scenario declares no platforms")]
    NoPlatforms,
    #[error("platform {index} must have a positive size")]
    DegeneratePlatform { index: usize },
    #[error("player spawn ({x}, {y}) lies outside the arena")]
    PlayerOutsideArena { x: f32, y: f32 },
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
struct Size {
    width: f32,
    height: f32,
}

impl Default for Size {
    fn default() -> Self {
        let arena = WorldConfig::default().arena();
        Self {
            width: arena.size().x,
            height: arena.size().y,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
struct Point {
    x: f32,
    y: f32,
}

impl From<Point> for Vec2 {
    fn from(point: Point) -> Self {
        Vec2::new(point.x, point.y)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
struct Platform {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
struct SpawningOverrides {
    interval_ms: Option<u64>,
    kills_per_wave: Option<u32>,
    boss_delay_ms: Option<u64>,
    max_hostiles: Option<usize>,
}

/// Intent held for every tick in `from_tick..until_tick`.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
struct Segment {
    from_tick: u64,
    until_tick: u64,
    #[serde(default)]
    horizontal: Option<Facing>,
    #[serde(default)]
    jump: bool,
    #[serde(default)]
    fire: bool,
    #[serde(default)]
    melee: bool,
    #[serde(default)]
    special: bool,
    #[serde(default)]
    aim: Option<Point>,
    #[serde(default)]
    weapon: Option<WeaponKind>,
}

impl Segment {
    fn covers(&self, tick: u64) -> bool {
        (self.from_tick..self.until_tick).contains(&tick)
    }

    fn intent(&self, fallback_aim: Vec2) -> Intent {
        Intent {
            horizontal: self.horizontal,
            jump: self.jump,
            fire: self.fire,
            melee: self.melee,
            special: self.special,
            aim: self.aim.map_or(fallback_aim, Vec2::from),
            weapon: self.weapon,
        }
    }
}

fn default_tick_rate() -> u32 {
    60
}

fn default_duration() -> f32 {
    60.0
}

/// Parsed scenario file.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub(crate) struct Scenario {
    #[serde(default)]
    seed: u64,
    #[serde(default = "default_tick_rate")]
    tick_rate: u32,
    #[serde(default = "default_duration")]
    duration_secs: f32,
    #[serde(default)]
    arena: Size,
    player: Point,
    #[serde(default)]
    platforms: Vec<Platform>,
    #[serde(default)]
    spawning: SpawningOverrides,
    #[serde(default)]
    intents: Vec<Segment>,
}

impl Scenario {
    pub(crate) fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse scenario toml contents")
    }

    pub(crate) fn validate(&self) -> Result<(), ScenarioError> {
        let Size { width, height } = self.arena;
        if width <= 0.0 || height <= 0.0 {
            return Err(ScenarioError::NonPositiveArena { width, height });
        }
        if self.tick_rate == 0 {
            return Err(ScenarioError::ZeroTickRate);
        }
        if self.platforms.is_empty() {
            return Err(ScenarioError::NoPlatforms);
        }
        if let Some(index) = self
            .platforms
            .iter()
            .position(|platform| platform.width <= 0.0 || platform.height <= 0.0)
        {
            return Err(ScenarioError::DegeneratePlatform { index });
        }
        let Point { x, y } = self.player;
        if !Aabb::from_xywh(0.0, 0.0, width, height).contains(Vec2::new(x, y)) {
            return Err(ScenarioError::PlayerOutsideArena { x, y });
        }
        Ok(())
    }

    pub(crate) const fn seed(&self) -> u64 {
        self.seed
    }

    pub(crate) fn tick(&self) -> Duration {
        Duration::from_secs(1) / self.tick_rate.max(1)
    }

    pub(crate) fn ticks(&self) -> u64 {
        (self.duration_secs.max(0.0) * self.tick_rate as f32).round() as u64
    }

    pub(crate) fn platforms(&self) -> Vec<Aabb> {
        self.platforms
            .iter()
            .map(|platform| {
                Aabb::from_xywh(platform.x, platform.y, platform.width, platform.height)
            })
            .collect()
    }

    pub(crate) fn player_spawn(&self) -> Vec2 {
        self.player.into()
    }

    /// Intent of the last segment covering `tick`, or an idle intent.
    pub(crate) fn intent(&self, tick: u64) -> Intent {
        let fallback_aim = self.player_spawn();
        self.intents
            .iter()
            .rev()
            .find(|segment| segment.covers(tick))
            .map_or(
                Intent {
                    aim: fallback_aim,
                    ..Intent::default()
                },
                |segment| segment.intent(fallback_aim),
            )
    }

    pub(crate) fn simulation_config(&self, seed: u64) -> Config {
        let mut world = WorldConfig::new(self.arena.width, self.arena.height);
        if let Some(max_hostiles) = self.spawning.max_hostiles {
            world = world.with_max_hostiles(max_hostiles);
        }

        let defaults = SpawningConfig::default();
        let interval = self
            .spawning
            .interval_ms
            .map_or(defaults.spawn_interval(), Duration::from_millis);
        let kills_per_wave = self
            .spawning
            .kills_per_wave
            .unwrap_or(defaults.kills_per_wave());
        let mut spawning = SpawningConfig::new(interval, kills_per_wave);
        if let Some(delay) = self.spawning.boss_delay_ms {
            spawning = spawning.with_boss_delay(Duration::from_millis(delay));
        }

        Config::new(seed).with_world(world).with_spawning(spawning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [player]
        x = 100.0
        y = 600.0

        [[platforms]]
        x = 0.0
        y = 700.0
        width = 1200.0
        height = 100.0
    "#;

    #[test]
    fn builtin_scenario_is_valid() {
        let scenario = Scenario::from_toml(BUILTIN).expect("builtin parses");
        assert_eq!(scenario.validate(), Ok(()));
        assert_eq!(scenario.ticks(), 5_400);
        assert_eq!(scenario.platforms().len(), 4);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let scenario = Scenario::from_toml(MINIMAL).expect("minimal parses");
        assert_eq!(scenario.seed(), 0);
        assert_eq!(scenario.ticks(), 3_600);
        assert_eq!(scenario.tick(), Duration::from_secs(1) / 60);
        assert_eq!(
            scenario.simulation_config(9).world(),
            WorldConfig::default()
        );
    }

    #[test]
    fn rejects_degenerate_scenarios() {
        let base = Scenario::from_toml(MINIMAL).expect("minimal parses");

        let mut scenario = base.clone();
        scenario.arena.height = 0.0;
        assert!(matches!(
            scenario.validate(),
            Err(ScenarioError::NonPositiveArena { .. })
        ));

        let mut scenario = base.clone();
        scenario.tick_rate = 0;
        assert_eq!(scenario.validate(), Err(ScenarioError::ZeroTickRate));

        let mut scenario = base.clone();
        scenario.platforms.clear();
        assert_eq!(scenario.validate(), Err(ScenarioError::NoPlatforms));

        let mut scenario = base.clone();
        scenario.platforms[0].width = -1.0;
        assert_eq!(
            scenario.validate(),
            Err(ScenarioError::DegeneratePlatform { index: 0 })
        );

        let mut scenario = base;
        scenario.player.x = 5_000.0;
        assert!(matches!(
            scenario.validate(),
            Err(ScenarioError::PlayerOutsideArena { .. })
        ));
    }

    #[test]
    fn later_segments_override_earlier_ones() {
        let scenario = Scenario::from_toml(BUILTIN).expect("builtin parses");

        assert!(scenario.intent(10).fire);
        assert_eq!(scenario.intent(10).horizontal, None);
        assert_eq!(scenario.intent(700).horizontal, Some(Facing::Left));
        let special = scenario.intent(1_205);
        assert!(special.special);
        assert!(!special.fire);
        assert_eq!(scenario.intent(9_000), Intent {
            aim: Vec2::new(580.0, 600.0),
            ..Intent::default()
        });
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let contents = format!("{MINIMAL}\nunknown = 1\n");
        assert!(Scenario::from_toml(&contents).is_err());
    }
}
