#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that drives hostile combatants through the patrol, chase,
//! attack and special states.
//!
//! The base machine evaluates attack, chase and patrol in that priority order.
//! Archetypes plug in through [`Behavior`], whose default methods are the
//! shared base behavior.

mod archetypes;
mod behavior;

use std::collections::BTreeMap;

use elemental_arena_core::{
    frame_scale, Aabb, AiState, Command, CombatantSnapshot, CombatantView, EntityId, Event,
    ProjectileView, SimTime,
};
use rand::RngCore;

pub use archetypes::{behavior_for, Lava, Scripted, Sniper, Tornado, Water};
pub use behavior::{
    Behavior, Context, Control, Leap, Memory, Profile, TimedAction, CHASE_JUMP,
    CONTACT_KNOCKBACK, CONTACT_RANGE,
};

use behavior::turn_toward;

/// Hostile decision system holding per-combatant memory.
#[derive(Debug, Default)]
pub struct Brain {
    memories: BTreeMap<EntityId, Memory>,
    now: SimTime,
    frames: f32,
}

impl Brain {
    /// Creates a brain with no memories.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Memory of the provided combatant, if it has decided at least once.
    #[must_use]
    pub fn memory(&self, entity: EntityId) -> Option<&Memory> {
        self.memories.get(&entity)
    }

    /// Consumes the previous tick's events and emits one decision per hostile.
    pub fn handle(
        &mut self,
        events: &[Event],
        combatants: &CombatantView,
        projectiles: &ProjectileView,
        arena: Aabb,
        rng: &mut dyn RngCore,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::TimeAdvanced { dt, now } => {
                    self.now = *now;
                    self.frames += frame_scale(*dt);
                }
                Event::Killed { entity, .. } | Event::FellOut { entity, .. } => {
                    let _ = self.memories.remove(entity);
                }
                Event::WorldReset => self.memories.clear(),
                _ => {}
            }
        }

        let target = combatants.player();
        for me in combatants.hostiles() {
            let Some(archetype) = me.role.archetype() else {
                continue;
            };
            let behavior = behavior_for(archetype);
            let now = self.now;
            let memory = self
                .memories
                .entry(me.id)
                .or_insert_with(|| Memory::new(&behavior.profile(), now));

            let mut ctx = Context {
                me,
                target,
                memory,
                now,
                frames: self.frames,
                arena,
                projectiles,
                rng: &mut *rng,
                out: &mut *out,
            };
            let state = think(behavior, &mut ctx);
            if ctx.memory.state != Some(state) {
                ctx.memory.state = Some(state);
                ctx.emit(Command::SetAiState {
                    entity: me.id,
                    state,
                });
            }
        }

        self.frames = 0.0;
    }
}

fn think(behavior: &dyn Behavior, ctx: &mut Context<'_>) -> AiState {
    if let Some(action) = ctx.memory.action {
        if ctx.now >= action.until {
            ctx.memory.action = None;
            ctx.emit(Command::SetAction {
                entity: ctx.me.id,
                action: None,
            });
        }
    }

    if let Some(state) = behavior.override_state(ctx) {
        steer(ctx, 0.0);
        return state;
    }

    if let Control::Hold { horizontal } = behavior.on_special_update(ctx) {
        if let Some(horizontal) = horizontal {
            steer(ctx, horizontal);
        }
        return AiState::Special;
    }

    if let Some(horizontal) = ctx.memory.action.and_then(|action| action.horizontal) {
        steer(ctx, horizontal * ctx.me.speed_multiplier);
        return AiState::Special;
    }

    let Some(target) = ctx.target else {
        let horizontal = behavior.patrol(ctx);
        steer(ctx, horizontal);
        return AiState::Patrol;
    };

    let distance = ctx.me.center().distance(target.center());
    let (state, horizontal) =
        if behavior.wants_attack(ctx, distance) && behavior.attack(ctx, target, distance) {
            ctx.memory.attack.trigger(ctx.now);
            (AiState::Attack, None)
        } else if distance <= behavior.profile().detection_range {
            (AiState::Chase, Some(behavior.chase(ctx, target)))
        } else {
            (AiState::Patrol, Some(behavior.patrol(ctx)))
        };

    if let Some(horizontal) = behavior.adjust_steering(ctx, target, state, horizontal) {
        steer(ctx, horizontal);
    }
    log::trace!("{:?} decided {:?} at distance {distance:.1}", ctx.me.id, state);
    state
}

fn steer(ctx: &mut Context<'_>, horizontal: f32) {
    let me: &CombatantSnapshot = ctx.me;
    if let Some(facing) = turn_toward(me.facing, horizontal) {
        ctx.emit(Command::Face {
            entity: me.id,
            facing,
        });
    }
    ctx.emit(Command::Steer {
        entity: me.id,
        horizontal,
    });
}
