#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Elemental Arena combat kernel.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Systems inspect read-only views and
//! the previous tick's [`Event`] stream, then respond with [`Command`] batches.
//! The world applies those commands in order and runs the physics, projectile,
//! hazard, and damage pipeline when it receives [`Command::Step`].

use std::time::Duration;

pub use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Number of nominal frames per simulated second that per-frame tuning
/// constants are expressed against.
pub const FRAMES_PER_SECOND: f32 = 60.0;

/// Converts a simulated duration into the equivalent number of nominal frames.
#[must_use]
pub fn frame_scale(dt: Duration) -> f32 {
    dt.as_secs_f32() * FRAMES_PER_SECOND
}

/// Monotonic simulation timestamp measured from the start of the run.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SimTime(Duration);

impl SimTime {
    /// Timestamp at which every simulation starts.
    pub const ZERO: Self = Self(Duration::ZERO);

    /// Creates a timestamp located `elapsed` after the start of the run.
    #[must_use]
    pub const fn from_duration(elapsed: Duration) -> Self {
        Self(elapsed)
    }

    /// Duration elapsed since the start of the run.
    #[must_use]
    pub const fn as_duration(&self) -> Duration {
        self.0
    }

    /// Returns the timestamp advanced by the provided delta.
    #[must_use]
    pub fn advanced(self, dt: Duration) -> Self {
        Self(self.0.saturating_add(dt))
    }

    /// Duration elapsed between `earlier` and this timestamp, saturating at zero.
    #[must_use]
    pub fn since(self, earlier: SimTime) -> Duration {
        self.0.saturating_sub(earlier.0)
    }
}

/// Periodic readiness gate driven by the simulation clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cooldown {
    period: Duration,
    last: Option<SimTime>,
}

impl Cooldown {
    /// Creates a cooldown that is ready immediately and then once per `period`.
    #[must_use]
    pub const fn new(period: Duration) -> Self {
        Self { period, last: None }
    }

    /// Minimum duration between two triggers.
    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Replaces the period while keeping the last trigger time.
    pub fn set_period(&mut self, period: Duration) {
        self.period = period;
    }

    /// Reports whether the cooldown elapsed at `now`.
    #[must_use]
    pub fn ready(&self, now: SimTime) -> bool {
        self.last
            .map_or(true, |last| now.since(last) >= self.period)
    }

    /// Records a trigger at `now`.
    pub fn trigger(&mut self, now: SimTime) {
        self.last = Some(now);
    }

    /// Triggers the cooldown if it is ready, reporting whether it fired.
    pub fn try_trigger(&mut self, now: SimTime) -> bool {
        if self.ready(now) {
            self.trigger(now);
            true
        } else {
            false
        }
    }
}

/// Stable handle addressing a combatant slot in the world arena.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EntityId {
    index: u32,
    generation: u32,
}

impl EntityId {
    /// Creates a handle from an arena slot index and the slot's generation.
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Arena slot addressed by the handle.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot when the handle was issued.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

/// Stable handle addressing a projectile slot in the world arena.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ProjectileId {
    index: u32,
    generation: u32,
}

impl ProjectileId {
    /// Creates a handle from an arena slot index and the slot's generation.
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Arena slot addressed by the handle.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot when the handle was issued.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

/// Stable handle addressing a hazard slot in the world arena.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct HazardId {
    index: u32,
    generation: u32,
}

impl HazardId {
    /// Creates a handle from an arena slot index and the slot's generation.
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Arena slot addressed by the handle.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot when the handle was issued.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

/// Axis-aligned rectangle in world units. The y axis grows downward.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    min: Vec2,
    size: Vec2,
}

impl Aabb {
    /// Creates a rectangle anchored at its upper-left corner.
    #[must_use]
    pub const fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    /// Creates a rectangle from its upper-left corner and dimensions.
    #[must_use]
    pub const fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    /// Creates a rectangle centred on `center`.
    #[must_use]
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        Self {
            min: center - size * 0.5,
            size,
        }
    }

    /// Upper-left corner of the rectangle.
    #[must_use]
    pub const fn min(&self) -> Vec2 {
        self.min
    }

    /// Width and height of the rectangle.
    #[must_use]
    pub const fn size(&self) -> Vec2 {
        self.size
    }

    /// Left edge.
    #[must_use]
    pub fn left(&self) -> f32 {
        self.min.x
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.min.x + self.size.x
    }

    /// Top edge.
    #[must_use]
    pub fn top(&self) -> f32 {
        self.min.y
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.min.y + self.size.y
    }

    /// Geometric centre of the rectangle.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    /// Reports whether the rectangles share a region of positive area.
    ///
    /// Touching edges do not count as an overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Reports whether the point lies inside the rectangle, edges included.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.left()
            && point.x <= self.right()
            && point.y >= self.top()
            && point.y <= self.bottom()
    }

    /// Reports whether a circle touches the rectangle.
    #[must_use]
    pub fn intersects_circle(&self, center: Vec2, radius: f32) -> bool {
        let closest = Vec2::new(
            center.x.clamp(self.left(), self.right()),
            center.y.clamp(self.top(), self.bottom()),
        );
        closest.distance_squared(center) <= radius * radius
    }

    /// Returns the rectangle moved by `offset`.
    #[must_use]
    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            min: self.min + offset,
            size: self.size,
        }
    }
}

/// Side a combatant belongs to; projectiles only damage the opposing side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    /// The player-controlled character and its projectiles.
    Player,
    /// Autonomous hostile entities, bosses included.
    Hostile,
}

impl Faction {
    /// Reports whether the two factions are enemies.
    #[must_use]
    pub fn opposes(self, other: Faction) -> bool {
        self != other
    }
}

/// Horizontal facing of a body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    /// Facing toward decreasing x.
    Left,
    /// Facing toward increasing x.
    Right,
}

impl Facing {
    /// Unit sign of the facing along the x axis.
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }

    /// Opposite facing.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Facing that points along `dx`, or `None` when `dx` is zero.
    #[must_use]
    pub fn from_dx(dx: f32) -> Option<Self> {
        if dx > 0.0 {
            Some(Self::Right)
        } else if dx < 0.0 {
            Some(Self::Left)
        } else {
            None
        }
    }
}

/// Hit points of a combatant.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Health {
    current: f32,
    max: f32,
}

impl Health {
    /// Creates a full health pool of the provided size.
    #[must_use]
    pub const fn full(max: f32) -> Self {
        Self { current: max, max }
    }

    /// Remaining hit points.
    #[must_use]
    pub const fn current(&self) -> f32 {
        self.current
    }

    /// Size of the pool.
    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }

    /// Remaining hit points as a fraction of the pool.
    #[must_use]
    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            self.current / self.max
        }
    }

    /// Reports whether the pool is empty.
    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.current <= 0.0
    }

    /// Removes up to `amount` hit points, returning the amount removed.
    pub fn damage(&mut self, amount: f32) -> f32 {
        let applied = amount.max(0.0).min(self.current);
        self.current -= applied;
        applied
    }

    /// Restores up to `amount` hit points, returning the amount restored.
    pub fn heal(&mut self, amount: f32) -> f32 {
        let restored = amount.max(0.0).min(self.max - self.current);
        self.current += restored;
        restored
    }
}

/// Closed set of hostile archetypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Archetype {
    /// Slow brawler lobbing lava balls at mid range.
    Lava,
    /// Skirmisher that dashes and sprays fanned water bolts.
    Water,
    /// Fast evasive entity with teleports and knockback pulses.
    Tornado,
    /// Three-phase boss combining lava projectiles and tornado hazards.
    BossLavaTornado,
    /// Three-phase boss commanding storms, whirlpools and tidal walls.
    BossTsunami,
    /// Ranged boss firing tracking bolts and landing shockwaves.
    BossSniper,
}

impl Archetype {
    /// Archetypes eligible for regular wave spawns.
    pub const MINIONS: [Archetype; 3] = [Self::Lava, Self::Water, Self::Tornado];

    /// Reports whether the archetype is a boss.
    #[must_use]
    pub const fn is_boss(self) -> bool {
        matches!(
            self,
            Self::BossLavaTornado | Self::BossTsunami | Self::BossSniper
        )
    }

    /// Base statistics of the archetype before wave scaling.
    #[must_use]
    pub const fn stats(self) -> ArchetypeStats {
        match self {
            Self::Lava => ArchetypeStats::new(Vec2::new(50.0, 50.0), 3.0, 80.0, 30.0),
            Self::Water => ArchetypeStats::new(Vec2::new(45.0, 45.0), 5.0, 60.0, 25.0),
            Self::Tornado => ArchetypeStats::new(Vec2::new(40.0, 70.0), 8.0, 40.0, 35.0),
            Self::BossLavaTornado => {
                ArchetypeStats::new(Vec2::new(120.0, 150.0), 4.0, 10_000.0, 50.0)
            }
            Self::BossTsunami => ArchetypeStats::new(Vec2::new(150.0, 120.0), 3.0, 12_000.0, 60.0),
            Self::BossSniper => ArchetypeStats::new(Vec2::new(90.0, 110.0), 4.0, 3_000.0, 45.0),
        }
    }
}

/// Base statistics attached to an archetype.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArchetypeStats {
    size: Vec2,
    speed: f32,
    health: f32,
    damage: f32,
}

impl ArchetypeStats {
    /// Creates a statistics block.
    #[must_use]
    pub const fn new(size: Vec2, speed: f32, health: f32, damage: f32) -> Self {
        Self {
            size,
            speed,
            health,
            damage,
        }
    }

    /// Bounding box dimensions.
    #[must_use]
    pub const fn size(&self) -> Vec2 {
        self.size
    }

    /// Horizontal movement speed in world units per nominal frame.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Maximum hit points.
    #[must_use]
    pub const fn health(&self) -> f32 {
        self.health
    }

    /// Contact and projectile damage.
    #[must_use]
    pub const fn damage(&self) -> f32 {
        self.damage
    }
}

/// Role a combatant plays in the encounter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// The player-controlled character.
    Player,
    /// An autonomous hostile of the given archetype.
    Hostile(Archetype),
}

impl Role {
    /// Faction the role fights for.
    #[must_use]
    pub const fn faction(self) -> Faction {
        match self {
            Self::Player => Faction::Player,
            Self::Hostile(_) => Faction::Hostile,
        }
    }

    /// Archetype of a hostile role.
    #[must_use]
    pub const fn archetype(self) -> Option<Archetype> {
        match self {
            Self::Player => None,
            Self::Hostile(archetype) => Some(archetype),
        }
    }

    /// Reports whether the role is a boss.
    #[must_use]
    pub const fn is_boss(self) -> bool {
        match self {
            Self::Player => false,
            Self::Hostile(archetype) => archetype.is_boss(),
        }
    }
}

/// Kinds of timed status effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusKind {
    /// Reduces speed to `1 - intensity`.
    Slow,
    /// Prevents all voluntary movement.
    Paralysis,
}

/// Parameters of a status effect to apply.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatusEffectSpec {
    /// Kind of effect.
    pub kind: StatusKind,
    /// How long the effect stays active.
    pub duration: Duration,
    /// Strength of the effect in `0.0..=1.0`.
    pub intensity: f32,
}

impl StatusEffectSpec {
    /// Standard slow: half speed for three seconds.
    pub const SLOW: Self = Self {
        kind: StatusKind::Slow,
        duration: Duration::from_secs(3),
        intensity: 0.5,
    };

    /// Standard paralysis: no movement for two seconds.
    pub const PARALYSIS: Self = Self {
        kind: StatusKind::Paralysis,
        duration: Duration::from_secs(2),
        intensity: 1.0,
    };
}

/// States of the hostile decision machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiState {
    /// Wandering along the current facing.
    #[default]
    Patrol,
    /// Moving toward a detected target.
    Chase,
    /// Resolving an attack against the target.
    Attack,
    /// Locked into an archetype-specific manoeuvre.
    Special,
}

/// Timed manoeuvre a combatant is performing; surfaced to renderers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Horizontal burst toward the target.
    Dashing,
    /// Spinning whirlwind animation.
    Spinning,
    /// Telegraphing a charged attack.
    Charging,
    /// Airborne ahead of a landing shockwave.
    Leaping,
    /// Evading incoming projectiles.
    Dodging,
}

/// Player bullet weapons.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    /// Low damage, single bullet.
    #[default]
    MachineGun,
    /// High damage, single bullet.
    AssaultRifle,
    /// Medium damage, five-pellet spread.
    Shotgun,
    /// Very high damage, single bullet.
    Sniper,
}

impl WeaponKind {
    /// Damage dealt by each bullet.
    #[must_use]
    pub const fn damage(self) -> f32 {
        match self {
            Self::MachineGun => 15.0,
            Self::AssaultRifle => 40.0,
            Self::Shotgun => 25.0,
            Self::Sniper => 100.0,
        }
    }

    /// Number of bullets released per trigger pull.
    #[must_use]
    pub const fn pellets(self) -> u32 {
        match self {
            Self::Shotgun => 5,
            Self::MachineGun | Self::AssaultRifle | Self::Sniper => 1,
        }
    }
}

/// Discrete intents supplied by the input collaborator for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Intent {
    /// Horizontal movement request; `None` lets friction slow the player.
    pub horizontal: Option<Facing>,
    /// Jump button is held.
    pub jump: bool,
    /// Fire button is held.
    pub fire: bool,
    /// Melee button is held.
    pub melee: bool,
    /// Special button is held.
    pub special: bool,
    /// World-space point aimed at by ranged actions.
    pub aim: Vec2,
    /// Weapon selection change, if any.
    pub weapon: Option<WeaponKind>,
}

/// Parameters of a phased homing volley.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VolleySpec {
    /// Number of projectiles in the volley.
    pub count: u32,
    /// Damage dealt by each projectile.
    pub damage: f32,
    /// Launch speed in world units per nominal frame.
    pub speed: f32,
    /// Angular spacing of the ascending fan in radians.
    pub spread: f32,
    /// Distance flown along the fan before tracking starts.
    pub ascend_distance: f32,
    /// Speed multiplier applied when tracking starts.
    pub tracking_speed_multiplier: f32,
    /// Fraction of the target bearing blended into the heading per frame.
    pub turn_rate: f32,
    /// Distance below which the projectile snaps onto its target.
    pub snap_distance: f32,
    /// Radius searched when re-acquiring a lost target.
    pub tracking_range: f32,
    /// Maximum flight time.
    pub lifetime: Duration,
}

impl Default for VolleySpec {
    fn default() -> Self {
        Self {
            count: 6,
            damage: 60.0,
            speed: 9.0,
            spread: 0.35,
            ascend_distance: 120.0,
            tracking_speed_multiplier: 1.6,
            turn_rate: 0.15,
            snap_distance: 24.0,
            tracking_range: 600.0,
            lifetime: Duration::from_secs(6),
        }
    }
}

/// Attack payloads spawned by hostiles; each variant carries fixed fields.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Payload {
    /// Ballistic lava ball.
    LavaBall {
        /// Launch point.
        origin: Vec2,
        /// Velocity per nominal frame.
        velocity: Vec2,
        /// Damage on hit.
        damage: f32,
    },
    /// Lava ball falling from the top of the arena.
    RainBall {
        /// Launch point.
        origin: Vec2,
        /// Velocity per nominal frame.
        velocity: Vec2,
        /// Damage on hit.
        damage: f32,
    },
    /// One bolt of a fanned water splash.
    WaterSplash {
        /// Launch point.
        origin: Vec2,
        /// Velocity per nominal frame.
        velocity: Vec2,
        /// Damage on hit.
        damage: f32,
    },
    /// One bolt of a radial water barrage.
    WaterBolt {
        /// Launch point.
        origin: Vec2,
        /// Velocity per nominal frame.
        velocity: Vec2,
        /// Damage on hit.
        damage: f32,
    },
    /// Bolt that continuously steers toward a target.
    TrackingBolt {
        /// Launch point.
        origin: Vec2,
        /// Target the bolt follows.
        target: EntityId,
        /// Launch heading, kept when no target can be tracked.
        direction: Vec2,
        /// Speed per nominal frame.
        speed: f32,
        /// Fraction of the target bearing blended in each frame.
        strength: f32,
        /// Damage on hit.
        damage: f32,
    },
    /// Expanding ring emitted on landing.
    Shockwave {
        /// Ring centre.
        center: Vec2,
        /// Radius at which the ring dissipates.
        max_radius: f32,
        /// Radius growth per nominal frame.
        expansion: f32,
        /// Damage on contact.
        damage: f32,
        /// Outward knockback applied on contact.
        knockback: f32,
    },
    /// Instant knockback pulse around the attacker.
    Whirlwind {
        /// Pulse centre.
        center: Vec2,
        /// Pulse radius.
        radius: f32,
        /// Horizontal push magnitude; vertical lift is fixed.
        push: f32,
        /// Damage on contact.
        damage: f32,
    },
    /// Ground zone that warns before erupting.
    Eruption {
        /// Zone centre.
        center: Vec2,
        /// Zone radius.
        radius: f32,
        /// Damage when active.
        damage: f32,
    },
    /// Growing vortex that pushes targets outward.
    MegaTornado {
        /// Vortex centre.
        center: Vec2,
        /// Damage per second while inside.
        damage_per_second: f32,
    },
    /// Vortex pulling targets toward its centre.
    Whirlpool {
        /// Vortex centre.
        center: Vec2,
        /// Pull radius.
        radius: f32,
        /// Damage per second near the centre.
        damage_per_second: f32,
    },
    /// Telegraphed lightning strike that paralyses.
    ThunderStrike {
        /// Strike point.
        center: Vec2,
        /// Strike radius.
        radius: f32,
        /// Damage on strike.
        damage: f32,
    },
    /// Screen-spanning moving wall of water.
    TsunamiWall {
        /// Initial wall rectangle.
        area: Aabb,
        /// Velocity in world units per second.
        velocity: Vec2,
        /// Damage on contact.
        damage: f32,
        /// Time until the wall recedes.
        lifetime: Duration,
    },
}

/// Kinds of projectiles, surfaced to renderers and hit reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Player bullet from the given weapon.
    Bullet(WeaponKind),
    /// Player phased homing shard.
    HomingShard,
    /// Hostile lava ball.
    LavaBall,
    /// Hostile falling lava ball.
    RainBall,
    /// Hostile water splash bolt.
    WaterSplash,
    /// Hostile water barrage bolt.
    WaterBolt,
    /// Hostile tracking bolt.
    TrackingBolt,
}

/// Kinds of area hazards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HazardKind {
    /// Expanding landing ring.
    Shockwave,
    /// Lava eruption zone.
    Eruption,
    /// Growing push vortex.
    MegaTornado,
    /// Pulling vortex.
    Whirlpool,
    /// Lightning strike.
    ThunderStrike,
    /// Moving wall of water.
    TsunamiWall,
}

/// Timing stage of a hazard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HazardStage {
    /// Telegraphed, harmless.
    Warning,
    /// Dealing damage.
    Active,
    /// Expired and awaiting removal.
    Finished,
}

/// Source of a damage instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HitSource {
    /// A projectile struck the target.
    Projectile {
        /// Handle of the projectile.
        projectile: ProjectileId,
        /// Kind of the projectile.
        kind: ProjectileKind,
    },
    /// A melee swing struck the target.
    Melee,
    /// A hostile struck the target on contact.
    Contact,
    /// An instant pulse struck the target.
    Pulse,
    /// An area hazard struck the target.
    Hazard {
        /// Handle of the hazard.
        hazard: HazardId,
        /// Kind of the hazard.
        kind: HazardKind,
    },
}

/// Reasons a spawn request may be dropped by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnRejection {
    /// The maximum number of concurrent hostiles is alive.
    AtCapacity,
    /// A player already exists.
    PlayerPresent,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the static platform colliders.
    ConfigurePlatforms {
        /// Platform rectangles.
        platforms: Vec<Aabb>,
    },
    /// Spawns the player with its upper-left corner at `position`.
    SpawnPlayer {
        /// Upper-left corner of the player body.
        position: Vec2,
    },
    /// Spawns a hostile combatant.
    SpawnHostile {
        /// Archetype to spawn.
        archetype: Archetype,
        /// Upper-left corner of the body.
        position: Vec2,
        /// Platform the hostile patrols without walking off.
        home_platform: Option<Aabb>,
        /// Multiplier applied to base health.
        health_multiplier: f32,
        /// Multiplier applied to base damage.
        damage_multiplier: f32,
    },
    /// Sets a combatant's horizontal velocity.
    Steer {
        /// Combatant to steer.
        entity: EntityId,
        /// New horizontal velocity per nominal frame.
        horizontal: f32,
    },
    /// Launches a combatant upward, optionally overriding horizontal velocity.
    Jump {
        /// Combatant that jumps.
        entity: EntityId,
        /// Vertical velocity after the jump.
        vertical: f32,
        /// Horizontal velocity after the jump, if overridden.
        horizontal: Option<f32>,
    },
    /// Adds an instantaneous velocity change.
    Impulse {
        /// Combatant affected.
        entity: EntityId,
        /// Velocity change per nominal frame.
        delta: Vec2,
    },
    /// Turns a combatant.
    Face {
        /// Combatant to turn.
        entity: EntityId,
        /// New facing.
        facing: Facing,
    },
    /// Records the decision-machine state for views.
    SetAiState {
        /// Combatant whose state changed.
        entity: EntityId,
        /// New state.
        state: AiState,
    },
    /// Starts or clears a timed manoeuvre.
    SetAction {
        /// Combatant performing the manoeuvre.
        entity: EntityId,
        /// Manoeuvre, or `None` to clear.
        action: Option<Action>,
    },
    /// Applies decaying horizontal knockback.
    Knockback {
        /// Combatant pushed.
        entity: EntityId,
        /// Initial knockback force.
        force: f32,
        /// Direction of the push.
        direction: Facing,
    },
    /// Swings a melee attack covering `area`.
    Melee {
        /// Attacking combatant.
        attacker: EntityId,
        /// Region struck.
        area: Aabb,
        /// Damage dealt to each opponent struck.
        damage: f32,
        /// Knockback force applied to each opponent struck.
        knockback: f32,
    },
    /// Strikes a single target on contact.
    ContactStrike {
        /// Attacking combatant.
        attacker: EntityId,
        /// Combatant struck.
        target: EntityId,
        /// Damage dealt.
        damage: f32,
        /// Knockback force applied away from the attacker.
        knockback: f32,
    },
    /// Fires a player bullet.
    FireBullet {
        /// Shooting combatant.
        shooter: EntityId,
        /// Weapon used.
        weapon: WeaponKind,
        /// Muzzle position.
        origin: Vec2,
        /// Normalized travel direction.
        direction: Vec2,
    },
    /// Launches a phased homing volley at the current hostile roster.
    LaunchVolley {
        /// Shooting combatant.
        shooter: EntityId,
        /// Launch point.
        origin: Vec2,
        /// Volley parameters.
        volley: VolleySpec,
    },
    /// Spawns a hostile attack payload.
    Launch {
        /// Combatant that produced the payload.
        owner: EntityId,
        /// Payload to spawn.
        payload: Payload,
    },
    /// Relocates a combatant instantly.
    Teleport {
        /// Combatant relocated.
        entity: EntityId,
        /// New upper-left corner.
        position: Vec2,
    },
    /// Restores hit points.
    Heal {
        /// Combatant healed.
        entity: EntityId,
        /// Hit points restored.
        amount: f32,
    },
    /// Attaches a status effect.
    ApplyStatus {
        /// Combatant affected.
        entity: EntityId,
        /// Effect to attach.
        effect: StatusEffectSpec,
    },
    /// Scales a combatant's damage and speed.
    BuffStats {
        /// Combatant buffed.
        entity: EntityId,
        /// Damage multiplier.
        damage_multiplier: f32,
        /// Speed multiplier.
        speed_multiplier: f32,
    },
    /// Announces that the final boss of the encounter fell.
    DeclareCleared,
    /// Advances the simulation by `dt`, running the full tick pipeline.
    Step {
        /// Simulated time that elapsed since the previous step.
        dt: Duration,
    },
    /// Clears every combatant, projectile and hazard.
    Reset,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// The simulation clock advanced.
    TimeAdvanced {
        /// Simulated time that elapsed.
        dt: Duration,
        /// Clock reading after the advance.
        now: SimTime,
    },
    /// A combatant entered the arena.
    Spawned {
        /// Handle of the new combatant.
        entity: EntityId,
        /// Role of the new combatant.
        role: Role,
    },
    /// A spawn request was dropped.
    SpawnRejected {
        /// Role requested.
        role: Role,
        /// Why the request was dropped.
        reason: SpawnRejection,
    },
    /// A boss entered the arena.
    BossSpawned {
        /// Handle of the boss.
        entity: EntityId,
        /// Boss archetype.
        archetype: Archetype,
    },
    /// A combatant lost hit points.
    Hit {
        /// Combatant struck.
        target: EntityId,
        /// Combatant responsible, if still known.
        attacker: Option<EntityId>,
        /// What struck the target.
        source: HitSource,
        /// Hit points removed.
        amount: f32,
    },
    /// A combatant's health reached zero.
    Killed {
        /// Combatant killed.
        entity: EntityId,
        /// Role of the combatant.
        role: Role,
        /// Centre of the body at death.
        position: Vec2,
    },
    /// A combatant fell out of the arena.
    FellOut {
        /// Combatant lost.
        entity: EntityId,
        /// Role of the combatant.
        role: Role,
    },
    /// A boss began a phase transition.
    PhaseTransitionStarted {
        /// Boss transitioning.
        entity: EntityId,
        /// Phase being entered.
        phase: u8,
    },
    /// A boss completed a phase transition.
    PhaseChanged {
        /// Boss that changed phase.
        entity: EntityId,
        /// Phase now active.
        phase: u8,
    },
    /// A boss was defeated.
    BossDefeated {
        /// Boss defeated.
        entity: EntityId,
        /// Boss archetype.
        archetype: Archetype,
        /// Centre of the body at death.
        position: Vec2,
    },
    /// A projectile entered the arena.
    ProjectileLaunched {
        /// Handle of the projectile.
        projectile: ProjectileId,
        /// Kind of projectile.
        kind: ProjectileKind,
        /// Target assigned at launch, for homing projectiles.
        target: Option<EntityId>,
    },
    /// A hazard entered the arena.
    HazardSpawned {
        /// Handle of the hazard.
        hazard: HazardId,
        /// Kind of hazard.
        kind: HazardKind,
    },
    /// A combatant's status effects changed.
    StatusApplied {
        /// Combatant affected.
        entity: EntityId,
        /// Kind of effect attached.
        kind: StatusKind,
    },
    /// A command referenced a combatant that no longer exists.
    CommandIgnored {
        /// Stale handle.
        entity: EntityId,
    },
    /// The final boss fell and the encounter is over.
    EncounterCleared,
    /// The world was cleared.
    WorldReset,
}

/// Boss-specific state surfaced in combatant views.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BossStatus {
    /// Current phase, starting at one.
    pub phase: u8,
    /// Number of phases the encounter has.
    pub phase_count: u8,
    /// Damage is ignored.
    pub invulnerable: bool,
    /// A phase transition animation is running.
    pub transitioning: bool,
}

/// Visual state flags consumed by renderers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VisualFlags {
    /// Boss is ignoring damage.
    pub invulnerable: bool,
    /// Boss is between phases.
    pub transitioning: bool,
    /// Combatant is dodging.
    pub dodging: bool,
    /// Combatant is spinning.
    pub spinning: bool,
    /// Combatant is charging an attack.
    pub charging: bool,
    /// Combatant is sliding down a wall.
    pub wall_sliding: bool,
    /// A slow effect is active.
    pub slowed: bool,
    /// A paralysis effect is active.
    pub paralyzed: bool,
}

/// Immutable representation of a single combatant used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct CombatantSnapshot {
    /// Handle of the combatant.
    pub id: EntityId,
    /// Role the combatant plays.
    pub role: Role,
    /// Current bounding box.
    pub aabb: Aabb,
    /// Current velocity per nominal frame.
    pub velocity: Vec2,
    /// Current facing.
    pub facing: Facing,
    /// Resting on a platform top.
    pub grounded: bool,
    /// Side of a wall the combatant is sliding against.
    pub wall_contact: Option<Facing>,
    /// Hit points.
    pub health: Health,
    /// Damage dealt by the combatant's attacks.
    pub damage: f32,
    /// Base movement speed per nominal frame.
    pub speed: f32,
    /// Multiplier from active status effects, in `0.0..=1.0`.
    pub speed_multiplier: f32,
    /// Last recorded decision-machine state.
    pub ai_state: AiState,
    /// Manoeuvre in progress.
    pub action: Option<Action>,
    /// Boss phase state, for bosses.
    pub boss: Option<BossStatus>,
    /// Platform the combatant patrols.
    pub home_platform: Option<Aabb>,
    /// Renderer flags.
    pub flags: VisualFlags,
}

impl CombatantSnapshot {
    /// Centre of the bounding box.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.aabb.center()
    }

    /// Movement speed after status effects.
    #[must_use]
    pub fn effective_speed(&self) -> f32 {
        self.speed * self.speed_multiplier
    }

    /// Faction of the combatant.
    #[must_use]
    pub fn faction(&self) -> Faction {
        self.role.faction()
    }
}

/// Read-only snapshot describing all live combatants.
#[derive(Clone, Debug, Default)]
pub struct CombatantView {
    snapshots: Vec<CombatantSnapshot>,
}

impl CombatantView {
    /// Creates a new view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<CombatantSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &CombatantSnapshot> {
        self.snapshots.iter()
    }

    /// Snapshot of the combatant with the provided handle.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&CombatantSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Snapshot of the player, if alive.
    #[must_use]
    pub fn player(&self) -> Option<&CombatantSnapshot> {
        self.snapshots
            .iter()
            .find(|snapshot| snapshot.role == Role::Player)
    }

    /// Iterator over hostile snapshots.
    pub fn hostiles(&self) -> impl Iterator<Item = &CombatantSnapshot> {
        self.snapshots
            .iter()
            .filter(|snapshot| snapshot.faction() == Faction::Hostile)
    }

    /// Number of captured snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<CombatantSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single projectile used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Handle of the projectile.
    pub id: ProjectileId,
    /// Kind of projectile.
    pub kind: ProjectileKind,
    /// Side the projectile fights for.
    pub faction: Faction,
    /// Current bounding box.
    pub aabb: Aabb,
    /// Current velocity per nominal frame.
    pub velocity: Vec2,
    /// Damage on hit.
    pub damage: f32,
    /// Target currently tracked, for homing projectiles.
    pub target: Option<EntityId>,
    /// Still climbing along its launch fan.
    pub ascending: bool,
}

/// Read-only snapshot describing all live projectiles.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ProjectileSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single hazard used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HazardSnapshot {
    /// Handle of the hazard.
    pub id: HazardId,
    /// Kind of hazard.
    pub kind: HazardKind,
    /// Timing stage.
    pub stage: HazardStage,
    /// Centre of the affected region.
    pub center: Vec2,
    /// Radius of circular hazards; zero for walls.
    pub radius: f32,
    /// Bounding box of the affected region.
    pub area: Aabb,
}

/// Read-only snapshot describing all live hazards.
#[derive(Clone, Debug, Default)]
pub struct HazardView {
    snapshots: Vec<HazardSnapshot>,
}

impl HazardView {
    /// Creates a new view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<HazardSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &HazardSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<HazardSnapshot> {
        self.snapshots
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{
        Aabb, Archetype, Cooldown, EntityId, Facing, Health, Role, SimTime, SpawnRejection, Vec2,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn entity_id_round_trips_through_bincode() {
        assert_round_trip(&EntityId::new(7, 3));
    }

    #[test]
    fn role_round_trips_through_bincode() {
        assert_round_trip(&Role::Hostile(Archetype::BossTsunami));
        assert_round_trip(&SpawnRejection::AtCapacity);
    }

    #[test]
    fn aabb_round_trips_through_bincode() {
        assert_round_trip(&Aabb::from_xywh(1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn touching_rectangles_do_not_overlap() {
        let floor = Aabb::from_xywh(0.0, 110.0, 50.0, 20.0);
        let resting = Aabb::from_xywh(0.0, 90.0, 20.0, 20.0);
        let sunk = Aabb::from_xywh(0.0, 91.0, 20.0, 20.0);

        assert!(!floor.overlaps(&resting));
        assert!(floor.overlaps(&sunk));
        assert!(sunk.overlaps(&floor));
    }

    #[test]
    fn circle_intersection_uses_closest_point() {
        let block = Aabb::from_xywh(0.0, 0.0, 10.0, 10.0);
        assert!(block.intersects_circle(Vec2::new(15.0, 5.0), 5.0));
        assert!(!block.intersects_circle(Vec2::new(15.0, 15.0), 5.0));
    }

    #[test]
    fn health_damage_saturates_at_zero() {
        let mut health = Health::full(50.0);
        assert_eq!(health.damage(30.0), 30.0);
        assert_eq!(health.damage(30.0), 20.0);
        assert!(health.is_depleted());
        assert_eq!(health.heal(-5.0), 0.0);
    }

    #[test]
    fn cooldown_is_ready_until_first_trigger() {
        let mut cooldown = Cooldown::new(Duration::from_secs(2));
        let start = SimTime::ZERO;
        assert!(cooldown.try_trigger(start));
        assert!(!cooldown.ready(start.advanced(Duration::from_millis(1_999))));
        assert!(cooldown.ready(start.advanced(Duration::from_secs(2))));
    }

    #[test]
    fn facing_from_zero_dx_is_undefined() {
        assert_eq!(Facing::from_dx(0.0), None);
        assert_eq!(Facing::from_dx(-3.0), Some(Facing::Left));
        assert_eq!(Facing::Left.flipped(), Facing::Right);
    }

    #[test]
    fn only_boss_archetypes_report_boss() {
        assert!(Archetype::MINIONS.iter().all(|archetype| !archetype.is_boss()));
        assert!(Archetype::BossSniper.is_boss());
        assert!(Role::Hostile(Archetype::BossLavaTornado).is_boss());
        assert!(!Role::Player.is_boss());
    }
}
