#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Projectile motion, homing guidance, volley target assignment and hit
//! detection.
//!
//! The world owns projectile storage; this crate provides the value type and
//! the pure rules that move it, steer it and decide what it strikes.

use std::{f32::consts::FRAC_PI_2, time::Duration};

use elemental_arena_core::{
    frame_scale, Aabb, EntityId, Faction, Payload, ProjectileId, ProjectileKind,
    ProjectileSnapshot, Vec2, VolleySpec, WeaponKind,
};

/// Distance past the arena edges at which projectiles are discarded.
pub const OUT_OF_BOUNDS_MARGIN: f32 = 100.0;

/// Player bullet speed in world units per nominal frame.
pub const BULLET_SPEED: f32 = 15.0;

/// Edge length of a player bullet.
pub const BULLET_SIZE: f32 = 8.0;

/// Angular spacing between shotgun pellets in radians.
pub const PELLET_SPACING: f32 = 0.1;

const LAVA_BALL_SIZE: f32 = 16.0;
const LAVA_BALL_LIFETIME: Duration = Duration::from_secs(3);
const RAIN_BALL_LIFETIME: Duration = Duration::from_secs(5);
const WATER_SPLASH_SIZE: f32 = 10.0;
const WATER_SPLASH_LIFETIME: Duration = Duration::from_secs(2);
const WATER_BOLT_SIZE: f32 = 14.0;
const WATER_BOLT_LIFETIME: Duration = Duration::from_secs(4);
const TRACKING_BOLT_SIZE: f32 = 12.0;
const TRACKING_BOLT_LIFETIME: Duration = Duration::from_secs(7);
const TRACKING_BOLT_RANGE: f32 = 1_000.0;
const SHARD_SIZE: f32 = 12.0;

/// Body a projectile may home onto or strike.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Target {
    /// Handle of the combatant.
    pub id: EntityId,
    /// Side the combatant fights for.
    pub faction: Faction,
    /// Current bounding box.
    pub aabb: Aabb,
    /// Combatant is a boss.
    pub is_boss: bool,
    /// Remaining hit points, used to rank bosses.
    pub health: f32,
}

impl Target {
    /// Centre of the bounding box.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.aabb.center()
    }
}

/// Flight stage of a homing projectile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HomingPhase {
    /// Flying along the launch heading, ignoring targets.
    Ascending {
        /// Distance left before tracking starts.
        remaining: f32,
        /// Speed multiplier applied once tracking starts.
        speed_multiplier: f32,
    },
    /// Steering toward the assigned target.
    Tracking,
}

/// Steering parameters of a homing projectile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homing {
    target: Option<EntityId>,
    speed: f32,
    turn_rate: f32,
    snap_distance: f32,
    tracking_range: f32,
    phase: HomingPhase,
}

impl Homing {
    /// Target currently tracked.
    #[must_use]
    pub const fn target(&self) -> Option<EntityId> {
        self.target
    }

    /// Current flight stage.
    #[must_use]
    pub const fn phase(&self) -> HomingPhase {
        self.phase
    }

    /// Reports whether the projectile is still flying its launch heading.
    #[must_use]
    pub const fn is_ascending(&self) -> bool {
        matches!(self.phase, HomingPhase::Ascending { .. })
    }
}

/// How a projectile chooses its velocity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Guidance {
    /// Fixed velocity.
    Ballistic,
    /// Steers toward a target.
    Homing(Homing),
}

/// Projectile in flight.
#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    kind: ProjectileKind,
    faction: Faction,
    owner: Option<EntityId>,
    center: Vec2,
    size: Vec2,
    velocity: Vec2,
    damage: f32,
    elapsed: Duration,
    lifetime: Option<Duration>,
    guidance: Guidance,
    active: bool,
}

impl Projectile {
    /// Creates a ballistic projectile centred on `center`.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn ballistic(
        kind: ProjectileKind,
        faction: Faction,
        owner: Option<EntityId>,
        center: Vec2,
        size: Vec2,
        velocity: Vec2,
        damage: f32,
        lifetime: Option<Duration>,
    ) -> Self {
        Self {
            kind,
            faction,
            owner,
            center,
            size,
            velocity,
            damage,
            elapsed: Duration::ZERO,
            lifetime,
            guidance: Guidance::Ballistic,
            active: true,
        }
    }

    /// Fires the bullets of one trigger pull from `weapon`.
    ///
    /// A zero-length direction fires straight right.
    #[must_use]
    pub fn bullets(
        owner: EntityId,
        weapon: WeaponKind,
        origin: Vec2,
        direction: Vec2,
    ) -> Vec<Self> {
        pellet_directions(weapon, direction)
            .into_iter()
            .map(|heading| {
                Self::ballistic(
                    ProjectileKind::Bullet(weapon),
                    Faction::Player,
                    Some(owner),
                    origin,
                    Vec2::splat(BULLET_SIZE),
                    heading * BULLET_SPEED,
                    weapon.damage(),
                    None,
                )
            })
            .collect()
    }

    /// Builds the projectile described by a hostile payload.
    ///
    /// Returns `None` for payloads that become hazards instead.
    #[must_use]
    pub fn from_payload(owner: EntityId, payload: &Payload) -> Option<Self> {
        let hostile = |kind, origin, size: f32, velocity, damage, lifetime| {
            Self::ballistic(
                kind,
                Faction::Hostile,
                Some(owner),
                origin,
                Vec2::splat(size),
                velocity,
                damage,
                Some(lifetime),
            )
        };

        match *payload {
            Payload::LavaBall {
                origin,
                velocity,
                damage,
            } => Some(hostile(
                ProjectileKind::LavaBall,
                origin,
                LAVA_BALL_SIZE,
                velocity,
                damage,
                LAVA_BALL_LIFETIME,
            )),
            Payload::RainBall {
                origin,
                velocity,
                damage,
            } => Some(hostile(
                ProjectileKind::RainBall,
                origin,
                LAVA_BALL_SIZE,
                velocity,
                damage,
                RAIN_BALL_LIFETIME,
            )),
            Payload::WaterSplash {
                origin,
                velocity,
                damage,
            } => Some(hostile(
                ProjectileKind::WaterSplash,
                origin,
                WATER_SPLASH_SIZE,
                velocity,
                damage,
                WATER_SPLASH_LIFETIME,
            )),
            Payload::WaterBolt {
                origin,
                velocity,
                damage,
            } => Some(hostile(
                ProjectileKind::WaterBolt,
                origin,
                WATER_BOLT_SIZE,
                velocity,
                damage,
                WATER_BOLT_LIFETIME,
            )),
            Payload::TrackingBolt {
                origin,
                target,
                direction,
                speed,
                strength,
                damage,
            } => {
                let mut bolt = hostile(
                    ProjectileKind::TrackingBolt,
                    origin,
                    TRACKING_BOLT_SIZE,
                    direction.try_normalize().unwrap_or(Vec2::X) * speed,
                    damage,
                    TRACKING_BOLT_LIFETIME,
                );
                bolt.guidance = Guidance::Homing(Homing {
                    target: Some(target),
                    speed,
                    turn_rate: strength,
                    snap_distance: 0.0,
                    tracking_range: TRACKING_BOLT_RANGE,
                    phase: HomingPhase::Tracking,
                });
                Some(bolt)
            }
            Payload::Shockwave { .. }
            | Payload::Whirlwind { .. }
            | Payload::Eruption { .. }
            | Payload::MegaTornado { .. }
            | Payload::Whirlpool { .. }
            | Payload::ThunderStrike { .. }
            | Payload::TsunamiWall { .. } => None,
        }
    }

    /// Launches a phased homing volley against `candidates`.
    ///
    /// Shards fan upward from `origin`, then track the targets chosen by
    /// [`assign_targets`].
    #[must_use]
    pub fn volley(
        owner: EntityId,
        origin: Vec2,
        spec: &VolleySpec,
        candidates: &[Target],
    ) -> Vec<Self> {
        let count = spec.count as usize;
        let targets = assign_targets(count, candidates);
        volley_headings(count, spec.spread)
            .into_iter()
            .zip(targets)
            .map(|(heading, target)| Self {
                kind: ProjectileKind::HomingShard,
                faction: Faction::Player,
                owner: Some(owner),
                center: origin,
                size: Vec2::splat(SHARD_SIZE),
                velocity: heading * spec.speed,
                damage: spec.damage,
                elapsed: Duration::ZERO,
                lifetime: Some(spec.lifetime),
                guidance: Guidance::Homing(Homing {
                    target,
                    speed: spec.speed,
                    turn_rate: spec.turn_rate,
                    snap_distance: spec.snap_distance,
                    tracking_range: spec.tracking_range,
                    phase: HomingPhase::Ascending {
                        remaining: spec.ascend_distance,
                        speed_multiplier: spec.tracking_speed_multiplier,
                    },
                }),
                active: true,
            })
            .collect()
    }

    /// Kind of the projectile.
    #[must_use]
    pub const fn kind(&self) -> ProjectileKind {
        self.kind
    }

    /// Side the projectile fights for.
    #[must_use]
    pub const fn faction(&self) -> Faction {
        self.faction
    }

    /// Combatant that fired the projectile.
    #[must_use]
    pub const fn owner(&self) -> Option<EntityId> {
        self.owner
    }

    /// Centre of the projectile.
    #[must_use]
    pub const fn center(&self) -> Vec2 {
        self.center
    }

    /// Bounding box of the projectile.
    #[must_use]
    pub fn aabb(&self) -> Aabb {
        Aabb::centered(self.center, self.size)
    }

    /// Velocity per nominal frame.
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Damage dealt on hit.
    #[must_use]
    pub const fn damage(&self) -> f32 {
        self.damage
    }

    /// Guidance mode and homing state.
    #[must_use]
    pub const fn guidance(&self) -> &Guidance {
        &self.guidance
    }

    /// Target currently tracked, for homing projectiles.
    #[must_use]
    pub const fn target(&self) -> Option<EntityId> {
        match &self.guidance {
            Guidance::Ballistic => None,
            Guidance::Homing(homing) => homing.target,
        }
    }

    /// Reports whether the projectile still flies.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Marks the projectile for removal.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Advances the projectile by `dt`.
    ///
    /// `targets` lists every live combatant in deterministic order; homing
    /// projectiles only consider opposing ones. The projectile deactivates
    /// when its lifetime expires or it leaves `bounds` by more than
    /// [`OUT_OF_BOUNDS_MARGIN`].
    pub fn advance(&mut self, dt: Duration, bounds: &Aabb, targets: &[Target]) {
        if !self.active {
            return;
        }

        self.elapsed = self.elapsed.saturating_add(dt);
        if self
            .lifetime
            .is_some_and(|lifetime| self.elapsed >= lifetime)
        {
            self.active = false;
            return;
        }

        let frames = frame_scale(dt);
        let faction = self.faction;
        match &mut self.guidance {
            Guidance::Ballistic => self.center += self.velocity * frames,
            Guidance::Homing(homing) => {
                steer(
                    homing,
                    &mut self.center,
                    &mut self.velocity,
                    frames,
                    faction,
                    targets,
                );
            }
        }

        if !within_margin(bounds, self.center) {
            self.active = false;
        }
    }

    /// Strikes the first opposing target the projectile overlaps.
    ///
    /// A projectile hits at most once; it deactivates on the hit even when
    /// several targets overlap it.
    pub fn strike(&mut self, targets: &[Target]) -> Option<EntityId> {
        if !self.active {
            return None;
        }

        let aabb = self.aabb();
        let hit = targets
            .iter()
            .find(|target| self.faction.opposes(target.faction) && target.aabb.overlaps(&aabb))
            .map(|target| target.id)?;
        self.active = false;
        Some(hit)
    }

    /// Captures the projectile for read-only views.
    #[must_use]
    pub fn snapshot(&self, id: ProjectileId) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id,
            kind: self.kind,
            faction: self.faction,
            aabb: self.aabb(),
            velocity: self.velocity,
            damage: self.damage,
            target: self.target(),
            ascending: matches!(&self.guidance, Guidance::Homing(homing) if homing.is_ascending()),
        }
    }
}

fn steer(
    homing: &mut Homing,
    center: &mut Vec2,
    velocity: &mut Vec2,
    frames: f32,
    faction: Faction,
    targets: &[Target],
) {
    if let HomingPhase::Ascending {
        remaining,
        speed_multiplier,
    } = homing.phase
    {
        let step = *velocity * frames;
        *center += step;
        let remaining = remaining - step.length();
        if remaining > 0.0 {
            homing.phase = HomingPhase::Ascending {
                remaining,
                speed_multiplier,
            };
        } else {
            homing.speed *= speed_multiplier;
            *velocity = velocity.normalize_or_zero() * homing.speed;
            homing.phase = HomingPhase::Tracking;
        }
        return;
    }

    let tracked = homing
        .target
        .and_then(|id| targets.iter().find(|target| target.id == id))
        .filter(|target| faction.opposes(target.faction))
        .or_else(|| nearest_within(*center, homing.tracking_range, faction, targets));
    homing.target = tracked.map(|target| target.id);

    let Some(target) = tracked else {
        *center += *velocity * frames;
        return;
    };

    let offset = target.center() - *center;
    let distance = offset.length();
    let step = homing.speed * frames;
    if distance <= homing.snap_distance.max(step) {
        if distance > 0.0 {
            *velocity = offset / distance * homing.speed;
        }
        *center = target.center();
        return;
    }

    let bearing = offset / distance;
    let blend = 1.0 - (1.0 - homing.turn_rate.clamp(0.0, 1.0)).powf(frames);
    let heading = velocity.try_normalize().unwrap_or(bearing);
    let blended = heading.lerp(bearing, blend).try_normalize().unwrap_or(bearing);
    *velocity = blended * homing.speed;
    *center += *velocity * frames;
}

fn nearest_within<'a>(
    point: Vec2,
    range: f32,
    faction: Faction,
    targets: &'a [Target],
) -> Option<&'a Target> {
    let range_squared = range * range;
    let mut best: Option<(&Target, f32)> = None;
    for target in targets.iter().filter(|target| faction.opposes(target.faction)) {
        let distance = target.center().distance_squared(point);
        if distance > range_squared {
            continue;
        }
        if best.map_or(true, |(_, closest)| distance < closest) {
            best = Some((target, distance));
        }
    }
    best.map(|(target, _)| target)
}

fn within_margin(bounds: &Aabb, point: Vec2) -> bool {
    point.x >= bounds.left() - OUT_OF_BOUNDS_MARGIN
        && point.x <= bounds.right() + OUT_OF_BOUNDS_MARGIN
        && point.y >= bounds.top() - OUT_OF_BOUNDS_MARGIN
        && point.y <= bounds.bottom() + OUT_OF_BOUNDS_MARGIN
}

/// Chooses a target for each of `count` volley projectiles.
///
/// When any candidate is a boss, every projectile locks onto the boss with the
/// most remaining health (lowest handle on ties) and minions are ignored.
/// Otherwise candidates are dealt round-robin, projectile `i` taking candidate
/// `i mod M`, which sends the whole volley at a lone candidate. An empty
/// candidate list leaves every projectile untargeted.
#[must_use]
pub fn assign_targets(count: usize, candidates: &[Target]) -> Vec<Option<EntityId>> {
    if let Some(boss) = priority_boss(candidates) {
        return vec![Some(boss.id); count];
    }
    if candidates.is_empty() {
        return vec![None; count];
    }
    (0..count)
        .map(|index| Some(candidates[index % candidates.len()].id))
        .collect()
}

fn priority_boss(candidates: &[Target]) -> Option<&Target> {
    candidates
        .iter()
        .filter(|candidate| candidate.is_boss)
        .min_by(|a, b| {
            b.health
                .total_cmp(&a.health)
                .then_with(|| a.id.cmp(&b.id))
        })
}

/// Unit launch headings of an upward fan of `count` projectiles.
///
/// The fan is centred on straight up with `spread` radians between
/// neighbours.
#[must_use]
pub fn volley_headings(count: usize, spread: f32) -> Vec<Vec2> {
    let middle = (count as f32 - 1.0) / 2.0;
    (0..count)
        .map(|index| {
            let angle = -FRAC_PI_2 + (index as f32 - middle) * spread;
            Vec2::new(angle.cos(), angle.sin())
        })
        .collect()
}

/// Unit directions of the bullets released by one trigger pull.
///
/// Shotgun pellets fan out at `(i - 2) * 0.1` radians around the aim.
#[must_use]
pub fn pellet_directions(weapon: WeaponKind, direction: Vec2) -> Vec<Vec2> {
    let aim = direction.try_normalize().unwrap_or(Vec2::X);
    let pellets = weapon.pellets();
    if pellets <= 1 {
        return vec![aim];
    }

    let base = aim.y.atan2(aim.x);
    let middle = (pellets as f32 - 1.0) / 2.0;
    (0..pellets)
        .map(|index| {
            let angle = base + (index as f32 - middle) * PELLET_SPACING;
            Vec2::new(angle.cos(), angle.sin())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ballistic_projectiles_move_in_a_straight_line() {
        let mut ball = lava_ball(Vec2::new(100.0, 100.0), Vec2::new(8.0, 0.0));
        for _ in 0..10 {
            ball.advance(frame(), &arena(), &[]);
        }
        assert!((ball.center().x - 180.0).abs() < 1e-2);
        assert_eq!(ball.center().y, 100.0);
        assert!(ball.is_active());
    }

    #[test]
    fn lifetime_expiry_deactivates() {
        let mut ball = lava_ball(Vec2::new(100.0, 100.0), Vec2::ZERO);
        ball.advance(Duration::from_millis(2_999), &arena(), &[]);
        assert!(ball.is_active());
        ball.advance(Duration::from_millis(1), &arena(), &[]);
        assert!(!ball.is_active());
    }

    #[test]
    fn leaving_the_arena_deactivates_past_the_margin() {
        let mut bullets = Projectile::bullets(
            id(0),
            WeaponKind::Sniper,
            Vec2::new(790.0, 300.0),
            Vec2::X,
        );
        let bullet = &mut bullets[0];
        for _ in 0..6 {
            bullet.advance(frame(), &arena(), &[]);
        }
        assert!(bullet.is_active(), "still inside the margin at x=880");
        for _ in 0..2 {
            bullet.advance(frame(), &arena(), &[]);
        }
        assert!(!bullet.is_active());
    }

    #[test]
    fn zero_length_aim_falls_back_to_a_unit_heading() {
        let bullets = Projectile::bullets(id(0), WeaponKind::MachineGun, Vec2::ZERO, Vec2::ZERO);
        assert_eq!(bullets.len(), 1);
        assert_eq!(bullets[0].velocity(), Vec2::new(BULLET_SPEED, 0.0));
    }

    #[test]
    fn shotgun_fans_five_pellets_around_the_aim() {
        let directions = pellet_directions(WeaponKind::Shotgun, Vec2::new(0.0, -3.0));
        assert_eq!(directions.len(), 5);
        assert!((directions[2] - Vec2::new(0.0, -1.0)).length() < 1e-5);
        let outer = directions[0].angle_between(directions[4]);
        assert!((outer.abs() - 0.4).abs() < 1e-4);
    }

    #[test]
    fn projectile_hits_once_even_when_targets_overlap() {
        let mut ball = lava_ball(Vec2::new(50.0, 50.0), Vec2::ZERO);
        let targets = [
            player_target(1, Vec2::new(30.0, 30.0)),
            player_target(2, Vec2::new(35.0, 35.0)),
            player_target(3, Vec2::new(40.0, 40.0)),
        ];

        assert_eq!(ball.strike(&targets), Some(id(1)));
        assert!(!ball.is_active());
        assert_eq!(ball.strike(&targets), None);
    }

    #[test]
    fn projectiles_ignore_their_own_faction() {
        let mut ball = lava_ball(Vec2::new(50.0, 50.0), Vec2::ZERO);
        let mut ally = player_target(4, Vec2::new(30.0, 30.0));
        ally.faction = Faction::Hostile;
        assert_eq!(ball.strike(&[ally]), None);
        assert!(ball.is_active());
    }

    #[test]
    fn volley_fan_is_centred_on_straight_up() {
        let headings = volley_headings(6, 0.35);
        assert_eq!(headings.len(), 6);
        for heading in &headings {
            assert!(heading.y < 0.0, "every heading climbs");
            assert!((heading.length() - 1.0).abs() < 1e-5);
        }
        let sum: Vec2 = headings.iter().copied().sum();
        assert!(sum.x.abs() < 1e-4, "fan is symmetric");
        assert!(volley_headings(0, 0.35).is_empty());
    }

    #[test]
    fn ascending_shards_switch_to_tracking_with_boost() {
        let spec = VolleySpec {
            count: 1,
            ascend_distance: 50.0,
            ..VolleySpec::default()
        };
        let mut shards = Projectile::volley(id(0), Vec2::new(400.0, 500.0), &spec, &[]);
        let shard = &mut shards[0];

        for _ in 0..5 {
            shard.advance(frame(), &arena(), &[]);
        }
        assert!(shard.snapshot(ProjectileId::new(0, 0)).ascending);

        shard.advance(frame(), &arena(), &[]);
        let Guidance::Homing(homing) = shard.guidance() else {
            panic!("volley shards home");
        };
        assert_eq!(homing.phase(), HomingPhase::Tracking);
        let speed = shard.velocity().length();
        assert!((speed - spec.speed * spec.tracking_speed_multiplier).abs() < 1e-3);
    }

    #[test]
    fn untargeted_homing_keeps_heading() {
        let spec = VolleySpec {
            count: 1,
            ascend_distance: 0.0,
            ..VolleySpec::default()
        };
        let mut shards = Projectile::volley(id(0), Vec2::new(400.0, 500.0), &spec, &[]);
        let shard = &mut shards[0];
        shard.advance(frame(), &arena(), &[]);
        let heading = shard.velocity();

        for _ in 0..5 {
            shard.advance(frame(), &arena(), &[]);
        }
        assert_eq!(shard.target(), None);
        assert!(shard.velocity().is_finite());
        assert!((shard.velocity() - heading).length() < 1e-4);
    }

    #[test]
    fn lost_target_is_replaced_by_nearest_candidate_in_range() {
        let spec = VolleySpec {
            count: 1,
            ascend_distance: 0.0,
            ..VolleySpec::default()
        };
        let origin = Vec2::new(400.0, 500.0);
        let doomed = hostile_target(1, Vec2::new(100.0, 100.0), false, 40.0);
        let mut shards = Projectile::volley(id(0), origin, &spec, &[doomed]);
        let shard = &mut shards[0];
        assert_eq!(shard.target(), Some(id(1)));
        shard.advance(frame(), &arena(), &[doomed]);

        let near = hostile_target(2, Vec2::new(450.0, 300.0), false, 40.0);
        let far = hostile_target(3, Vec2::new(1_200.0, 300.0), false, 40.0);
        shard.advance(frame(), &arena(), &[near, far]);
        assert_eq!(shard.target(), Some(id(2)));
    }

    #[test]
    fn tracking_bolt_follows_its_target() {
        let payload = Payload::TrackingBolt {
            origin: Vec2::new(100.0, 100.0),
            target: id(7),
            direction: Vec2::X,
            speed: 8.0,
            strength: 0.1,
            damage: 45.0,
        };
        let mut bolt = Projectile::from_payload(id(9), &payload).expect("bolt payload");
        let player = player_target(7, Vec2::new(300.0, 100.0));

        bolt.advance(frame(), &arena(), &[player]);

        assert_eq!(bolt.faction(), Faction::Hostile);
        assert!(bolt.velocity().x > 7.9, "starts flying at the target");
    }

    #[test]
    fn orphaned_tracking_bolt_keeps_its_launch_heading() {
        let payload = Payload::TrackingBolt {
            origin: Vec2::new(400.0, 300.0),
            target: id(7),
            direction: Vec2::new(-3.0, 4.0),
            speed: 6.0,
            strength: 0.1,
            damage: 45.0,
        };
        let mut bolt = Projectile::from_payload(id(9), &payload).expect("bolt payload");

        for _ in 0..60 {
            bolt.advance(frame(), &arena(), &[]);
        }

        assert!(bolt.is_active());
        assert_eq!(bolt.target(), None);
        let travelled = bolt.center() - Vec2::new(400.0, 300.0);
        assert!(travelled.length() > 300.0, "bolt stalled: {travelled:?}");
        assert!(travelled.x < 0.0 && travelled.y > 0.0);
    }

    #[test]
    fn degenerate_bolt_heading_still_moves() {
        let payload = Payload::TrackingBolt {
            origin: Vec2::new(400.0, 300.0),
            target: id(7),
            direction: Vec2::ZERO,
            speed: 6.0,
            strength: 0.1,
            damage: 45.0,
        };
        let bolt = Projectile::from_payload(id(9), &payload).expect("bolt payload");

        assert_eq!(bolt.velocity(), Vec2::new(6.0, 0.0));
    }

    #[test]
    fn hazard_payloads_do_not_become_projectiles() {
        let payload = Payload::Eruption {
            center: Vec2::ZERO,
            radius: 60.0,
            damage: 75.0,
        };
        assert!(Projectile::from_payload(id(0), &payload).is_none());
    }

    #[test]
    fn boss_priority_prefers_health_then_handle() {
        let candidates = [
            hostile_target(1, Vec2::ZERO, false, 900.0),
            hostile_target(2, Vec2::ZERO, true, 500.0),
            hostile_target(3, Vec2::ZERO, true, 800.0),
            hostile_target(4, Vec2::ZERO, true, 800.0),
        ];
        assert_eq!(assign_targets(3, &candidates), vec![Some(id(3)); 3]);
    }

    #[test]
    fn empty_candidates_leave_projectiles_untargeted() {
        assert_eq!(assign_targets(2, &[]), vec![None, None]);
    }

    fn lava_ball(center: Vec2, velocity: Vec2) -> Projectile {
        Projectile::from_payload(
            id(99),
            &Payload::LavaBall {
                origin: center,
                velocity,
                damage: 30.0,
            },
        )
        .expect("lava balls are projectiles")
    }

    fn player_target(index: u32, min: Vec2) -> Target {
        Target {
            id: id(index),
            faction: Faction::Player,
            aabb: Aabb::new(min, Vec2::new(40.0, 60.0)),
            is_boss: false,
            health: 300.0,
        }
    }

    fn hostile_target(index: u32, center: Vec2, is_boss: bool, health: f32) -> Target {
        Target {
            id: id(index),
            faction: Faction::Hostile,
            aabb: Aabb::centered(center, Vec2::new(50.0, 50.0)),
            is_boss,
            health,
        }
    }

    fn arena() -> Aabb {
        Aabb::from_xywh(0.0, 0.0, 800.0, 600.0)
    }

    fn frame() -> Duration {
        Duration::from_secs_f32(1.0 / 60.0)
    }

    fn id(index: u32) -> EntityId {
        EntityId::new(index, 0)
    }
}
