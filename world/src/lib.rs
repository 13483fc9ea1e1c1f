#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Elemental Arena.
//!
//! The world owns every combatant, projectile and hazard. Systems never touch
//! it directly: they push [`Command`]s that [`apply`] executes in order, and
//! read the state back through the [`query`] module.

mod arena;
mod combatant;
mod step;

use elemental_arena_core::{
    Aabb, Archetype, Command, EntityId, Event, Payload, Role, SimTime, SpawnRejection,
    StatusEffectSpec, Vec2, VolleySpec,
};
use elemental_arena_system_boss::Hazard;
use elemental_arena_system_physics::Config as PhysicsConfig;
use elemental_arena_system_projectiles::Projectile;

use arena::Arena;
use combatant::Combatant;

const DEFAULT_WIDTH: f32 = 1_200.0;
const DEFAULT_HEIGHT: f32 = 800.0;
const DEFAULT_MAX_HOSTILES: usize = 9;
const FALL_MARGIN: f32 = 100.0;
const EDGE_MARGIN: f32 = 20.0;

/// Configuration of the arena the world simulates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    width: f32,
    height: f32,
    max_hostiles: usize,
    fall_margin: f32,
    edge_margin: f32,
    physics: PhysicsConfig,
}

impl Config {
    /// Creates a configuration for an arena of the provided dimensions.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            max_hostiles: DEFAULT_MAX_HOSTILES,
            fall_margin: FALL_MARGIN,
            edge_margin: EDGE_MARGIN,
            physics: PhysicsConfig::new(1.2, 20.0),
        }
    }

    /// Returns the configuration with a different cap on concurrent regular
    /// hostiles. Bosses never count against the cap.
    #[must_use]
    pub const fn with_max_hostiles(mut self, max_hostiles: usize) -> Self {
        self.max_hostiles = max_hostiles;
        self
    }

    /// Returns the configuration with different body integration constants.
    #[must_use]
    pub const fn with_physics(mut self, physics: PhysicsConfig) -> Self {
        self.physics = physics;
        self
    }

    /// Arena rectangle anchored at the origin.
    #[must_use]
    pub const fn arena(&self) -> Aabb {
        Aabb::from_xywh(0.0, 0.0, self.width, self.height)
    }

    /// Maximum number of concurrent regular hostiles.
    #[must_use]
    pub const fn max_hostiles(&self) -> usize {
        self.max_hostiles
    }

    /// Body integration constants.
    #[must_use]
    pub const fn physics(&self) -> PhysicsConfig {
        self.physics
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

/// Melee, contact and pulse attacks queued until the hit phase of the next step.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Strike {
    Melee {
        attacker: EntityId,
        area: Aabb,
        damage: f32,
        knockback: f32,
    },
    Contact {
        attacker: EntityId,
        target: EntityId,
        damage: f32,
        knockback: f32,
    },
    Pulse {
        owner: EntityId,
        center: Vec2,
        radius: f32,
        push: f32,
        damage: f32,
    },
}

/// Represents the authoritative Elemental Arena world state.
#[derive(Debug)]
pub struct World {
    config: Config,
    platforms: Vec<Aabb>,
    clock: SimTime,
    tick_index: u64,
    combatants: Arena<Combatant>,
    projectiles: Arena<Projectile>,
    hazards: Arena<Hazard>,
    pending_projectiles: Vec<Projectile>,
    pending_hazards: Vec<Hazard>,
    pending_strikes: Vec<Strike>,
}

impl Default for World {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl World {
    /// Creates an empty world for the provided arena.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            platforms: Vec::new(),
            clock: SimTime::ZERO,
            tick_index: 0,
            combatants: Arena::default(),
            projectiles: Arena::default(),
            hazards: Arena::default(),
            pending_projectiles: Vec::new(),
            pending_hazards: Vec::new(),
            pending_strikes: Vec::new(),
        }
    }

    fn combatant_mut(
        &mut self,
        entity: EntityId,
        out_events: &mut Vec<Event>,
    ) -> Option<&mut Combatant> {
        let combatant = self.combatants.get_mut(entity);
        if combatant.is_none() {
            out_events.push(Event::CommandIgnored { entity });
        }
        combatant
    }

    fn regular_hostiles(&self) -> usize {
        self.combatants
            .iter::<EntityId>()
            .filter(|(_, combatant)| {
                matches!(combatant.role, Role::Hostile(archetype) if !archetype.is_boss())
            })
            .count()
    }

    fn spawn_player(&mut self, position: Vec2, out_events: &mut Vec<Event>) {
        let present = self
            .combatants
            .iter::<EntityId>()
            .any(|(_, combatant)| combatant.role == Role::Player);
        if present {
            log::debug!("player spawn rejected: already present");
            out_events.push(Event::SpawnRejected {
                role: Role::Player,
                reason: SpawnRejection::PlayerPresent,
            });
            return;
        }

        let entity = self.combatants.insert(Combatant::player(position));
        log::debug!("player spawned as {:?}", entity);
        out_events.push(Event::Spawned {
            entity,
            role: Role::Player,
        });
    }

    fn spawn_hostile(
        &mut self,
        archetype: Archetype,
        position: Vec2,
        home_platform: Option<Aabb>,
        health_multiplier: f32,
        damage_multiplier: f32,
        out_events: &mut Vec<Event>,
    ) -> Option<EntityId> {
        let role = Role::Hostile(archetype);
        if !archetype.is_boss() && self.regular_hostiles() >= self.config.max_hostiles {
            log::debug!("{:?} spawn rejected at capacity", archetype);
            out_events.push(Event::SpawnRejected {
                role,
                reason: SpawnRejection::AtCapacity,
            });
            return None;
        }

        let combatant = Combatant::hostile(
            archetype,
            position,
            home_platform,
            health_multiplier,
            damage_multiplier,
        );
        let entity = self.combatants.insert(combatant);
        log::debug!("{:?} spawned as {:?}", archetype, entity);
        out_events.push(Event::Spawned { entity, role });
        if archetype.is_boss() {
            out_events.push(Event::BossSpawned { entity, archetype });
        }
        Some(entity)
    }

    fn fire_volley(
        &mut self,
        shooter: EntityId,
        origin: Vec2,
        volley: &VolleySpec,
        out_events: &mut Vec<Event>,
    ) {
        let Some(faction) = self
            .combatant_mut(shooter, out_events)
            .map(|combatant| combatant.role.faction())
        else {
            return;
        };
        let candidates: Vec<_> = self
            .targets()
            .into_iter()
            .filter(|target| faction.opposes(target.faction))
            .collect();
        self.pending_projectiles
            .extend(Projectile::volley(shooter, origin, volley, &candidates));
    }

    fn launch(&mut self, owner: EntityId, payload: Payload, out_events: &mut Vec<Event>) {
        let Some(faction) = self
            .combatant_mut(owner, out_events)
            .map(|combatant| combatant.role.faction())
        else {
            return;
        };

        if let Some(projectile) = Projectile::from_payload(owner, &payload) {
            self.pending_projectiles.push(projectile);
        } else if let Some(hazard) = Hazard::from_payload(owner, faction, &payload) {
            self.pending_hazards.push(hazard);
        } else if let Payload::Whirlwind {
            center,
            radius,
            push,
            damage,
        } = payload
        {
            self.pending_strikes.push(Strike::Pulse {
                owner,
                center,
                radius,
                push,
                damage,
            });
        }
    }

    fn apply_status(
        &mut self,
        entity: EntityId,
        effect: StatusEffectSpec,
        out_events: &mut Vec<Event>,
    ) {
        let now = self.clock;
        if let Some(combatant) = self.combatant_mut(entity, out_events) {
            combatant.status.add(effect, now);
            out_events.push(Event::StatusApplied {
                entity,
                kind: effect.kind,
            });
        }
    }

    fn reset(&mut self) {
        self.combatants.clear();
        self.projectiles.clear();
        self.hazards.clear();
        self.pending_projectiles.clear();
        self.pending_hazards.clear();
        self.pending_strikes.clear();
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigurePlatforms { platforms } => {
            log::debug!("configured {} platforms", platforms.len());
            world.platforms = platforms;
        }
        Command::SpawnPlayer { position } => world.spawn_player(position, out_events),
        Command::SpawnHostile {
            archetype,
            position,
            home_platform,
            health_multiplier,
            damage_multiplier,
        } => {
            let _ = world.spawn_hostile(
                archetype,
                position,
                home_platform,
                health_multiplier,
                damage_multiplier,
                out_events,
            );
        }
        Command::Steer { entity, horizontal } => {
            if let Some(combatant) = world.combatant_mut(entity, out_events) {
                combatant.body.set_horizontal_velocity(horizontal);
            }
        }
        Command::Jump {
            entity,
            vertical,
            horizontal,
        } => {
            if let Some(combatant) = world.combatant_mut(entity, out_events) {
                combatant.body.set_vertical_velocity(vertical);
                if let Some(horizontal) = horizontal {
                    combatant.body.set_horizontal_velocity(horizontal);
                }
            }
        }
        Command::Impulse { entity, delta } => {
            if let Some(combatant) = world.combatant_mut(entity, out_events) {
                combatant.body.add_velocity(delta);
            }
        }
        Command::Face { entity, facing } => {
            if let Some(combatant) = world.combatant_mut(entity, out_events) {
                combatant.body.set_facing(facing);
            }
        }
        Command::SetAiState { entity, state } => {
            if let Some(combatant) = world.combatant_mut(entity, out_events) {
                combatant.ai_state = state;
            }
        }
        Command::SetAction { entity, action } => {
            if let Some(combatant) = world.combatant_mut(entity, out_events) {
                combatant.action = action;
            }
        }
        Command::Knockback {
            entity,
            force,
            direction,
        } => {
            if let Some(combatant) = world.combatant_mut(entity, out_events) {
                combatant.body.apply_knockback(force, direction);
            }
        }
        Command::Melee {
            attacker,
            area,
            damage,
            knockback,
        } => {
            if world.combatant_mut(attacker, out_events).is_some() {
                world.pending_strikes.push(Strike::Melee {
                    attacker,
                    area,
                    damage,
                    knockback,
                });
            }
        }
        Command::ContactStrike {
            attacker,
            target,
            damage,
            knockback,
        } => {
            if world.combatant_mut(attacker, out_events).is_some() {
                world.pending_strikes.push(Strike::Contact {
                    attacker,
                    target,
                    damage,
                    knockback,
                });
            }
        }
        Command::FireBullet {
            shooter,
            weapon,
            origin,
            direction,
        } => {
            if world.combatant_mut(shooter, out_events).is_some() {
                world
                    .pending_projectiles
                    .extend(Projectile::bullets(shooter, weapon, origin, direction));
            }
        }
        Command::LaunchVolley {
            shooter,
            origin,
            volley,
        } => world.fire_volley(shooter, origin, &volley, out_events),
        Command::Launch { owner, payload } => world.launch(owner, payload, out_events),
        Command::Teleport { entity, position } => {
            if let Some(combatant) = world.combatant_mut(entity, out_events) {
                combatant.body.teleport(position);
            }
        }
        Command::Heal { entity, amount } => {
            if let Some(combatant) = world.combatant_mut(entity, out_events) {
                let _ = combatant.health.heal(amount);
            }
        }
        Command::ApplyStatus { entity, effect } => world.apply_status(entity, effect, out_events),
        Command::BuffStats {
            entity,
            damage_multiplier,
            speed_multiplier,
        } => {
            if let Some(combatant) = world.combatant_mut(entity, out_events) {
                combatant.damage *= damage_multiplier;
                combatant.speed *= speed_multiplier;
                log::debug!(
                    "{:?} buffed to damage {} speed {}",
                    entity,
                    combatant.damage,
                    combatant.speed
                );
            }
        }
        Command::DeclareCleared => {
            log::debug!("encounter cleared at {:?}", world.clock);
            out_events.push(Event::EncounterCleared);
        }
        Command::Step { dt } => world.step(dt, out_events),
        Command::Reset => {
            world.reset();
            out_events.push(Event::WorldReset);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use elemental_arena_core::{
        Aabb, CombatantSnapshot, CombatantView, EntityId, HazardId, HazardView, ProjectileId,
        ProjectileView, Role, SimTime,
    };

    use super::{Config, World};

    /// Captures a read-only view of every live combatant.
    #[must_use]
    pub fn combatant_view(world: &World) -> CombatantView {
        CombatantView::from_snapshots(
            world
                .combatants
                .iter::<EntityId>()
                .map(|(id, combatant)| combatant.snapshot(id))
                .collect(),
        )
    }

    /// Captures a read-only view of every projectile in flight.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        ProjectileView::from_snapshots(
            world
                .projectiles
                .iter::<ProjectileId>()
                .map(|(id, projectile)| projectile.snapshot(id))
                .collect(),
        )
    }

    /// Captures a read-only view of every hazard.
    #[must_use]
    pub fn hazard_view(world: &World) -> HazardView {
        HazardView::from_snapshots(
            world
                .hazards
                .iter::<HazardId>()
                .map(|(id, hazard)| hazard.snapshot(id))
                .collect(),
        )
    }

    /// Snapshot of the player, if alive.
    #[must_use]
    pub fn player(world: &World) -> Option<CombatantSnapshot> {
        world
            .combatants
            .iter::<EntityId>()
            .find(|(_, combatant)| combatant.role == Role::Player)
            .map(|(id, combatant)| combatant.snapshot(id))
    }

    /// Current reading of the simulation clock.
    #[must_use]
    pub fn clock(world: &World) -> SimTime {
        world.clock
    }

    /// Number of steps executed since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Static platform colliders.
    #[must_use]
    pub fn platforms(world: &World) -> &[Aabb] {
        &world.platforms
    }

    /// Arena configuration.
    #[must_use]
    pub fn config(world: &World) -> &Config {
        &world.config
    }

    /// Number of live combatants, the player included.
    #[must_use]
    pub fn combatant_count(world: &World) -> usize {
        world.combatants.len()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use elemental_arena_core::{AiState, StatusKind, WeaponKind};

    use super::*;

    fn frame() -> Duration {
        Duration::from_millis(16)
    }

    fn arena_world() -> World {
        let mut world = World::default();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigurePlatforms {
                platforms: vec![Aabb::from_xywh(0.0, 700.0, 1_200.0, 100.0)],
            },
            &mut events,
        );
        world
    }

    fn spawned(events: &[Event]) -> Option<EntityId> {
        events.iter().find_map(|event| match event {
            Event::Spawned { entity, .. } => Some(*entity),
            _ => None,
        })
    }

    #[test]
    fn stale_handles_are_reported_and_ignored() {
        let mut world = arena_world();
        let mut events = Vec::new();
        let ghost = EntityId::new(4, 2);

        apply(
            &mut world,
            Command::Steer {
                entity: ghost,
                horizontal: 3.0,
            },
            &mut events,
        );

        assert_eq!(events, vec![Event::CommandIgnored { entity: ghost }]);
    }

    #[test]
    fn second_player_is_rejected() {
        let mut world = arena_world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnPlayer {
                position: Vec2::new(100.0, 640.0),
            },
            &mut events,
        );
        events.clear();
        apply(
            &mut world,
            Command::SpawnPlayer {
                position: Vec2::new(200.0, 640.0),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::SpawnRejected {
                role: Role::Player,
                reason: SpawnRejection::PlayerPresent,
            }]
        );
        assert_eq!(query::combatant_count(&world), 1);
    }

    #[test]
    fn snapshot_reports_status_and_action_flags() {
        let mut world = arena_world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnHostile {
                archetype: Archetype::Water,
                position: Vec2::new(500.0, 655.0),
                home_platform: None,
                health_multiplier: 1.0,
                damage_multiplier: 1.0,
            },
            &mut events,
        );
        let water = spawned(&events).expect("water spawned");

        apply(
            &mut world,
            Command::ApplyStatus {
                entity: water,
                effect: StatusEffectSpec::SLOW,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SetAction {
                entity: water,
                action: Some(elemental_arena_core::Action::Dodging),
            },
            &mut events,
        );
        apply(&mut world, Command::Step { dt: frame() }, &mut events);

        let view = query::combatant_view(&world);
        let snapshot = view.get(water).expect("water snapshot");
        assert!(snapshot.flags.slowed);
        assert!(snapshot.flags.dodging);
        assert!(!snapshot.flags.paralyzed);
        assert_eq!(snapshot.speed_multiplier, 0.5);
        assert!(events.contains(&Event::StatusApplied {
            entity: water,
            kind: StatusKind::Slow,
        }));
    }

    #[test]
    fn bullets_fired_before_a_step_launch_during_it() {
        let mut world = arena_world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnPlayer {
                position: Vec2::new(100.0, 640.0),
            },
            &mut events,
        );
        let player = spawned(&events).expect("player spawned");
        events.clear();

        apply(
            &mut world,
            Command::FireBullet {
                shooter: player,
                weapon: WeaponKind::Shotgun,
                origin: Vec2::new(120.0, 670.0),
                direction: Vec2::X,
            },
            &mut events,
        );
        assert!(query::projectile_view(&world).iter().next().is_none());

        apply(&mut world, Command::Step { dt: frame() }, &mut events);

        let launched = events
            .iter()
            .filter(|event| matches!(event, Event::ProjectileLaunched { .. }))
            .count();
        assert_eq!(launched, 5);
        assert_eq!(query::projectile_view(&world).into_vec().len(), 5);
    }

    #[test]
    fn ai_state_is_recorded_for_views() {
        let mut world = arena_world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnHostile {
                archetype: Archetype::Lava,
                position: Vec2::new(500.0, 650.0),
                home_platform: None,
                health_multiplier: 1.0,
                damage_multiplier: 1.0,
            },
            &mut events,
        );
        let lava = spawned(&events).expect("lava spawned");

        apply(
            &mut world,
            Command::SetAiState {
                entity: lava,
                state: AiState::Chase,
            },
            &mut events,
        );

        let view = query::combatant_view(&world);
        assert_eq!(view.get(lava).map(|snapshot| snapshot.ai_state), Some(AiState::Chase));
    }

    #[test]
    fn declare_cleared_is_broadcast() {
        let mut world = arena_world();
        let mut events = Vec::new();
        apply(&mut world, Command::DeclareCleared, &mut events);
        assert_eq!(events, vec![Event::EncounterCleared]);
    }
}
