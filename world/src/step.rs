//! Tick pipeline run by [`Command::Step`](elemental_arena_core::Command::Step).

use std::time::Duration;

use elemental_arena_core::{
    AiState, EntityId, Event, Facing, HazardId, HitSource, ProjectileId, Role, StatusEffectSpec, Vec2,
};
use elemental_arena_system_boss::Exposure;
use elemental_arena_system_projectiles::Target;

use crate::{Strike, World};

const PULSE_SCALE: f32 = 0.3;
const PULSE_LIFT: f32 = -50.0;

/// Damage instance detected during a step and applied once detection ends.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Hit {
    target: EntityId,
    attacker: Option<EntityId>,
    source: HitSource,
    damage: f32,
    impulse: Vec2,
    knockback: Option<(f32, Facing)>,
    status: Option<StatusEffectSpec>,
}

impl Hit {
    fn new(target: EntityId, attacker: Option<EntityId>, source: HitSource, damage: f32) -> Self {
        Self {
            target,
            attacker,
            source,
            damage,
            impulse: Vec2::ZERO,
            knockback: None,
            status: None,
        }
    }
}

impl World {
    pub(crate) fn step(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        self.clock = self.clock.advanced(dt);
        out_events.push(Event::TimeAdvanced {
            dt,
            now: self.clock,
        });
        log::trace!("step: dt={:?} tick={}", dt, self.tick_index);

        self.flush_pending(out_events);
        self.move_bodies(dt, out_events);
        self.refresh_statuses();
        self.advance_phases(dt, out_events);

        let mut hits = Vec::new();
        self.advance_projectiles(dt, &mut hits);
        self.advance_hazards(dt, &mut hits);
        self.resolve_strikes(&mut hits);
        self.apply_hits(hits, out_events);
        self.remove_dead(out_events);
    }

    /// Live combatants as projectile targets, in handle order.
    pub(crate) fn targets(&self) -> Vec<Target> {
        self.combatants
            .iter::<EntityId>()
            .filter(|(_, combatant)| !combatant.is_dead())
            .map(|(id, combatant)| Target {
                id,
                faction: combatant.role.faction(),
                aabb: combatant.body.aabb(),
                is_boss: combatant.role.is_boss(),
                health: combatant.health.current(),
            })
            .collect()
    }

    fn flush_pending(&mut self, out_events: &mut Vec<Event>) {
        for projectile in std::mem::take(&mut self.pending_projectiles) {
            let kind = projectile.kind();
            let target = projectile.target();
            let projectile: ProjectileId = self.projectiles.insert(projectile);
            out_events.push(Event::ProjectileLaunched {
                projectile,
                kind,
                target,
            });
        }

        for hazard in std::mem::take(&mut self.pending_hazards) {
            let kind = hazard.kind();
            let hazard: HazardId = self.hazards.insert(hazard);
            log::debug!("{:?} hazard spawned as {:?}", kind, hazard);
            out_events.push(Event::HazardSpawned { hazard, kind });
        }
    }

    fn move_bodies(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let physics = self.config.physics;
        let arena = self.config.arena();
        let fall_line = arena.bottom() + self.config.fall_margin;
        let edge_margin = self.config.edge_margin;

        let mut fallen = Vec::new();
        for (id, combatant) in self.combatants.iter_mut::<EntityId>() {
            let body = &mut combatant.body;
            body.integrate(dt, &physics);
            let _ = body.resolve_against_platforms(&self.platforms, &physics);

            if combatant.ai_state == AiState::Patrol {
                if let Some(platform) = combatant.home_platform {
                    let _ = body.confine_to_platform(&platform, edge_margin);
                }
            }

            let facing = body.facing();
            if body.clamp_horizontal(arena.left(), arena.right()) && combatant.role == Role::Player
            {
                body.set_facing(facing);
            }

            if body.aabb().top() > fall_line {
                fallen.push((id, combatant.role));
            }
        }

        for (entity, role) in fallen {
            let _ = self.combatants.remove(entity);
            log::debug!("{:?} {:?} fell out of the arena", role, entity);
            out_events.push(Event::FellOut { entity, role });
        }
    }

    fn refresh_statuses(&mut self) {
        let now = self.clock;
        for (_, combatant) in self.combatants.iter_mut::<EntityId>() {
            combatant.refresh_status(now);
        }
    }

    fn advance_phases(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        for (entity, combatant) in self.combatants.iter_mut::<EntityId>() {
            let Some(controller) = &mut combatant.phase else {
                continue;
            };
            if let Some(phase) = controller.update(dt) {
                log::debug!("{:?} entered phase {}", entity, phase);
                out_events.push(Event::PhaseChanged { entity, phase });
            }
        }
    }

    fn advance_projectiles(&mut self, dt: Duration, hits: &mut Vec<Hit>) {
        let targets = self.targets();
        let bounds = self.config.arena();

        for (projectile, body) in self.projectiles.iter_mut::<ProjectileId>() {
            body.advance(dt, &bounds, &targets);
            if let Some(target) = body.strike(&targets) {
                hits.push(Hit::new(
                    target,
                    body.owner(),
                    HitSource::Projectile {
                        projectile,
                        kind: body.kind(),
                    },
                    body.damage(),
                ));
            }
        }
    }

    fn advance_hazards(&mut self, dt: Duration, hits: &mut Vec<Hit>) {
        let exposed: Vec<Exposure> = self
            .combatants
            .iter::<EntityId>()
            .map(|(id, combatant)| Exposure {
                id,
                faction: combatant.role.faction(),
                aabb: combatant.body.aabb(),
            })
            .collect();

        for (hazard, area) in self.hazards.iter_mut::<HazardId>() {
            let source = HitSource::Hazard {
                hazard,
                kind: area.kind(),
            };
            let owner = area.owner();
            for contact in area.advance(dt, &exposed) {
                hits.push(Hit {
                    impulse: contact.impulse,
                    knockback: contact.knockback,
                    status: contact.status,
                    ..Hit::new(contact.target, owner, source, contact.damage)
                });
            }
        }
    }

    fn resolve_strikes(&mut self, hits: &mut Vec<Hit>) {
        for strike in std::mem::take(&mut self.pending_strikes) {
            match strike {
                Strike::Melee {
                    attacker,
                    area,
                    damage,
                    knockback,
                } => {
                    let Some(origin) = self.combatants.get(attacker) else {
                        continue;
                    };
                    let faction = origin.role.faction();
                    let center = origin.body.center();
                    let facing = origin.body.facing();
                    for (target, combatant) in self.combatants.iter::<EntityId>() {
                        if !faction.opposes(combatant.role.faction())
                            || !combatant.body.aabb().overlaps(&area)
                        {
                            continue;
                        }
                        let direction = Facing::from_dx(combatant.body.center().x - center.x)
                            .unwrap_or(facing);
                        hits.push(Hit {
                            knockback: Some((knockback, direction)),
                            ..Hit::new(target, Some(attacker), HitSource::Melee, damage)
                        });
                    }
                }
                Strike::Contact {
                    attacker,
                    target,
                    damage,
                    knockback,
                } => {
                    let (Some(origin), Some(struck)) =
                        (self.combatants.get(attacker), self.combatants.get(target))
                    else {
                        continue;
                    };
                    let direction = Facing::from_dx(struck.body.center().x - origin.body.center().x)
                        .unwrap_or(origin.body.facing());
                    hits.push(Hit {
                        knockback: Some((knockback, direction)),
                        ..Hit::new(target, Some(attacker), HitSource::Contact, damage)
                    });
                }
                Strike::Pulse {
                    owner,
                    center,
                    radius,
                    push,
                    damage,
                } => {
                    let Some(faction) = self
                        .combatants
                        .get(owner)
                        .map(|combatant| combatant.role.faction())
                    else {
                        continue;
                    };
                    for (target, combatant) in self.combatants.iter::<EntityId>() {
                        if !faction.opposes(combatant.role.faction())
                            || !combatant.body.aabb().intersects_circle(center, radius)
                        {
                            continue;
                        }
                        let side = Facing::from_dx(combatant.body.center().x - center.x)
                            .unwrap_or(Facing::Right);
                        hits.push(Hit {
                            impulse: Vec2::new(side.sign() * push, PULSE_LIFT) * PULSE_SCALE,
                            ..Hit::new(target, Some(owner), HitSource::Pulse, damage)
                        });
                    }
                }
            }
        }
    }

    fn apply_hits(&mut self, hits: Vec<Hit>, out_events: &mut Vec<Event>) {
        let now = self.clock;
        for hit in hits {
            let attacker = hit
                .attacker
                .filter(|attacker| self.combatants.get(*attacker).is_some());
            let Some(combatant) = self.combatants.get_mut(hit.target) else {
                continue;
            };
            if combatant.is_dead() {
                continue;
            }

            let report = combatant.take_damage(hit.damage);
            if hit.impulse != Vec2::ZERO {
                combatant.body.add_velocity(hit.impulse);
            }
            if let Some((force, direction)) = hit.knockback {
                combatant.body.apply_knockback(force, direction);
            }
            if let Some(effect) = hit.status {
                combatant.status.add(effect, now);
                out_events.push(Event::StatusApplied {
                    entity: hit.target,
                    kind: effect.kind,
                });
            }
            if let Some(phase) = report.transition {
                log::debug!("{:?} transitioning into phase {}", hit.target, phase);
                out_events.push(Event::PhaseTransitionStarted {
                    entity: hit.target,
                    phase,
                });
            }
            if report.applied > 0.0 {
                out_events.push(Event::Hit {
                    target: hit.target,
                    attacker,
                    source: hit.source,
                    amount: report.applied,
                });
            }
        }
    }

    fn remove_dead(&mut self, out_events: &mut Vec<Event>) {
        for entity in self.combatants.handles::<EntityId>() {
            if !self.combatants.get(entity).is_some_and(|c| c.is_dead()) {
                continue;
            }
            let Some(combatant) = self.combatants.remove(entity) else {
                continue;
            };
            let position = combatant.body.center();
            log::debug!("{:?} {:?} killed", combatant.role, entity);
            out_events.push(Event::Killed {
                entity,
                role: combatant.role,
                position,
            });
            if let Role::Hostile(archetype) = combatant.role {
                if archetype.is_boss() {
                    log::debug!("boss {:?} defeated", archetype);
                    out_events.push(Event::BossDefeated {
                        entity,
                        archetype,
                        position,
                    });
                }
            }
        }

        for projectile in self.projectiles.handles::<ProjectileId>() {
            if self
                .projectiles
                .get(projectile)
                .is_some_and(|body| !body.is_active())
            {
                let _ = self.projectiles.remove(projectile);
            }
        }

        for hazard in self.hazards.handles::<HazardId>() {
            if self.hazards.get(hazard).is_some_and(|area| area.is_finished()) {
                let _ = self.hazards.remove(hazard);
            }
        }
    }
}
