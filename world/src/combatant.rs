//! Authoritative state of a single combatant.

use elemental_arena_core::{
    Aabb, Action, AiState, Archetype, CombatantSnapshot, EntityId, Facing, Health, Role, SimTime,
    StatusKind, Vec2, VisualFlags,
};
use elemental_arena_system_boss::{BossProfile, DamageReport, PhaseController};
use elemental_arena_system_physics::{KinematicBody, SideResponse};
use elemental_arena_system_status_effects::StatusEffects;

pub(crate) const PLAYER_SIZE: Vec2 = Vec2::new(40.0, 60.0);
pub(crate) const PLAYER_HEALTH: f32 = 300.0;
pub(crate) const PLAYER_SPEED: f32 = 8.0;

#[derive(Clone, Debug)]
pub(crate) struct Combatant {
    pub(crate) role: Role,
    pub(crate) body: KinematicBody,
    pub(crate) health: Health,
    pub(crate) damage: f32,
    pub(crate) speed: f32,
    pub(crate) speed_multiplier: f32,
    pub(crate) status: StatusEffects,
    pub(crate) ai_state: AiState,
    pub(crate) action: Option<Action>,
    pub(crate) phase: Option<PhaseController>,
    pub(crate) home_platform: Option<Aabb>,
}

impl Combatant {
    pub(crate) fn player(position: Vec2) -> Self {
        Self {
            role: Role::Player,
            body: KinematicBody::new(position, PLAYER_SIZE, Facing::Right, SideResponse::WallSlide),
            health: Health::full(PLAYER_HEALTH),
            damage: 0.0,
            speed: PLAYER_SPEED,
            speed_multiplier: 1.0,
            status: StatusEffects::new(),
            ai_state: AiState::default(),
            action: None,
            phase: None,
            home_platform: None,
        }
    }

    pub(crate) fn hostile(
        archetype: Archetype,
        position: Vec2,
        home_platform: Option<Aabb>,
        health_multiplier: f32,
        damage_multiplier: f32,
    ) -> Self {
        let stats = archetype.stats();
        Self {
            role: Role::Hostile(archetype),
            body: KinematicBody::new(
                position,
                stats.size(),
                Facing::Left,
                SideResponse::TurnAround,
            ),
            health: Health::full(stats.health() * health_multiplier.max(0.0)),
            damage: stats.damage() * damage_multiplier.max(0.0),
            speed: stats.speed(),
            speed_multiplier: 1.0,
            status: StatusEffects::new(),
            ai_state: AiState::default(),
            action: None,
            phase: BossProfile::of(archetype)
                .map(|profile| PhaseController::new(profile.thresholds())),
            home_platform,
        }
    }

    /// Routes damage through the phase controller for bosses.
    pub(crate) fn take_damage(&mut self, amount: f32) -> DamageReport {
        match &mut self.phase {
            Some(phase) => phase.take_damage(&mut self.health, amount),
            None => DamageReport {
                applied: self.health.damage(amount),
                transition: None,
            },
        }
    }

    pub(crate) fn refresh_status(&mut self, now: SimTime) {
        self.speed_multiplier = self.status.speed_multiplier(now);
    }

    pub(crate) fn is_dead(&self) -> bool {
        self.health.is_depleted()
    }

    pub(crate) fn snapshot(&self, id: EntityId) -> CombatantSnapshot {
        let boss = self.phase.as_ref().map(PhaseController::status);
        CombatantSnapshot {
            id,
            role: self.role,
            aabb: self.body.aabb(),
            velocity: self.body.velocity(),
            facing: self.body.facing(),
            grounded: self.body.grounded(),
            wall_contact: self.body.wall_contact(),
            health: self.health,
            damage: self.damage,
            speed: self.speed,
            speed_multiplier: self.speed_multiplier,
            ai_state: self.ai_state,
            action: self.action,
            boss,
            home_platform: self.home_platform,
            flags: VisualFlags {
                invulnerable: boss.is_some_and(|status| status.invulnerable),
                transitioning: boss.is_some_and(|status| status.transitioning),
                dodging: self.action == Some(Action::Dodging),
                spinning: self.action == Some(Action::Spinning),
                charging: self.action == Some(Action::Charging),
                wall_sliding: self.body.wall_contact().is_some(),
                slowed: self.status.has(StatusKind::Slow),
                paralyzed: self.status.has(StatusKind::Paralysis),
            },
        }
    }
}
