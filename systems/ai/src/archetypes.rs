//! Archetype overrides of the base behavior.

use std::{f32::consts::TAU, time::Duration};

use elemental_arena_core::{
    Action, AiState, Archetype, Command, CombatantSnapshot, Facing, Payload, ProjectileKind, Vec2,
};
use rand::Rng;

use crate::behavior::{Behavior, Context, Control, Leap, Profile, CONTACT_RANGE};

/// Behavior driving hostiles of `archetype`.
#[must_use]
pub fn behavior_for(archetype: Archetype) -> &'static dyn Behavior {
    match archetype {
        Archetype::Lava => &Lava,
        Archetype::Water => &Water,
        Archetype::Tornado => &Tornado,
        Archetype::BossSniper => &Sniper,
        Archetype::BossLavaTornado | Archetype::BossTsunami => &Scripted,
    }
}

/// Mid-range lobber.
#[derive(Clone, Copy, Debug, Default)]
pub struct Lava;

const LAVA_BALL_RANGE: f32 = 150.0;
const LAVA_BALL_SPEED: f32 = 8.0;

impl Behavior for Lava {
    fn profile(&self) -> Profile {
        Profile {
            attack_range: LAVA_BALL_RANGE,
            primary_cooldown: Duration::from_secs(3),
            ..Profile::BASE
        }
    }

    fn attack(&self, ctx: &mut Context<'_>, target: &CombatantSnapshot, distance: f32) -> bool {
        if distance <= CONTACT_RANGE {
            ctx.contact_strike(target);
            return true;
        }
        if distance > LAVA_BALL_RANGE || !ctx.memory.primary.try_trigger(ctx.now) {
            return false;
        }

        let direction = ctx.aim_at(target.center());
        ctx.emit(Command::Launch {
            owner: ctx.me.id,
            payload: Payload::LavaBall {
                origin: ctx.me.center(),
                velocity: direction * LAVA_BALL_SPEED,
                damage: ctx.me.damage,
            },
        });
        true
    }
}

/// Skirmisher with a fanned splash and a dash.
#[derive(Clone, Copy, Debug, Default)]
pub struct Water;

const SPLASH_RANGE: f32 = 120.0;
const SPLASH_BOLTS: i32 = 5;
const SPLASH_SPACING: f32 = 0.3;
const SPLASH_SPEED: f32 = 6.0;
const DASH_RANGE: f32 = 200.0;
const DASH_SPEED: f32 = 15.0;
const DASH_DURATION: Duration = Duration::from_millis(250);

impl Behavior for Water {
    fn profile(&self) -> Profile {
        Profile {
            attack_range: DASH_RANGE,
            primary_cooldown: Duration::from_millis(2_500),
            secondary_cooldown: Duration::from_secs(4),
            ..Profile::BASE
        }
    }

    fn attack(&self, ctx: &mut Context<'_>, target: &CombatantSnapshot, distance: f32) -> bool {
        if distance <= CONTACT_RANGE {
            ctx.contact_strike(target);
            return true;
        }

        let direction = ctx.aim_at(target.center());
        if distance <= SPLASH_RANGE {
            if !ctx.memory.primary.try_trigger(ctx.now) {
                return false;
            }
            let base = direction.y.atan2(direction.x);
            for index in 0..SPLASH_BOLTS {
                let angle = base + (index - SPLASH_BOLTS / 2) as f32 * SPLASH_SPACING;
                ctx.emit(Command::Launch {
                    owner: ctx.me.id,
                    payload: Payload::WaterSplash {
                        origin: ctx.me.center(),
                        velocity: Vec2::new(angle.cos(), angle.sin()) * SPLASH_SPEED,
                        damage: ctx.me.damage / 2.0,
                    },
                });
            }
            return true;
        }

        if distance <= DASH_RANGE && ctx.memory.secondary.try_trigger(ctx.now) {
            ctx.begin_action(
                Action::Dashing,
                DASH_DURATION,
                Some(direction.x * DASH_SPEED),
            );
            return true;
        }
        false
    }
}

/// Evasive spinner that closes distance by teleporting.
#[derive(Clone, Copy, Debug, Default)]
pub struct Tornado;

const WHIRLWIND_RANGE: f32 = 80.0;
const WHIRLWIND_PUSH: f32 = 150.0;
const WHIRLWIND_SPIN: Duration = Duration::from_millis(1_500);
const TELEPORT_TRIGGER: f32 = 200.0;
const TELEPORT_ATTEMPTS: usize = 10;
const TELEPORT_MIN: f32 = 100.0;
const TELEPORT_MAX: f32 = 150.0;
const CHASE_JITTER: f32 = 2.0;

impl Behavior for Tornado {
    fn profile(&self) -> Profile {
        Profile {
            attack_range: WHIRLWIND_RANGE,
            primary_cooldown: Duration::from_secs(3),
            secondary_cooldown: Duration::from_secs(8),
            ..Profile::BASE
        }
    }

    fn attack(&self, ctx: &mut Context<'_>, target: &CombatantSnapshot, distance: f32) -> bool {
        if distance <= CONTACT_RANGE {
            ctx.contact_strike(target);
            return true;
        }
        if distance > WHIRLWIND_RANGE || !ctx.memory.primary.try_trigger(ctx.now) {
            return false;
        }

        ctx.emit(Command::Launch {
            owner: ctx.me.id,
            payload: Payload::Whirlwind {
                center: ctx.me.center(),
                radius: WHIRLWIND_RANGE,
                push: WHIRLWIND_PUSH,
                damage: ctx.me.damage,
            },
        });
        ctx.begin_action(Action::Spinning, WHIRLWIND_SPIN, None);
        true
    }

    fn on_special_update(&self, ctx: &mut Context<'_>) -> Control {
        let Some(target) = ctx.target else {
            return Control::Proceed;
        };
        let far = ctx.me.center().distance(target.center()) > TELEPORT_TRIGGER;
        if !far || !ctx.memory.secondary.ready(ctx.now) {
            return Control::Proceed;
        }

        let size = ctx.me.aabb.size();
        for _ in 0..TELEPORT_ATTEMPTS {
            let angle = ctx.rng.gen_range(0.0..TAU);
            let distance = ctx.rng.gen_range(TELEPORT_MIN..TELEPORT_MAX);
            let position = target.aabb.min() + Vec2::new(angle.cos(), angle.sin()) * distance;
            let inside = position.x >= ctx.arena.left()
                && position.x <= ctx.arena.right() - size.x
                && position.y >= ctx.arena.top()
                && position.y <= ctx.arena.bottom() - size.y;
            if inside {
                ctx.memory.secondary.trigger(ctx.now);
                ctx.emit(Command::Teleport {
                    entity: ctx.me.id,
                    position,
                });
                break;
            }
        }
        Control::Proceed
    }

    fn adjust_steering(
        &self,
        ctx: &mut Context<'_>,
        _target: &CombatantSnapshot,
        state: AiState,
        horizontal: Option<f32>,
    ) -> Option<f32> {
        if state != AiState::Chase || ctx.me.speed_multiplier <= 0.0 {
            return horizontal;
        }
        let jitter = ctx.rng.gen_range(-CHASE_JITTER..=CHASE_JITTER);
        horizontal.map(|horizontal| horizontal + jitter)
    }
}

/// Ranged boss with tracking bolts, landing shockwaves and bullet dodging.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sniper;

const SNIPER_DETECTION: f32 = 300.0;
const SNIPER_ATTACK_RANGE: f32 = 250.0;
const BOLT_SPEED: f32 = 8.0;
const BOLT_STRENGTH: f32 = 0.1;
const SHOCKWAVE_MIN: f32 = 50.0;
const SHOCKWAVE_MAX: f32 = 300.0;
const SHOCKWAVE_WINDUP: Duration = Duration::from_millis(500);
const SHOCKWAVE_JUMP: f32 = -25.0;
const SHOCKWAVE_RADIUS: f32 = 150.0;
const SHOCKWAVE_EXPANSION: f32 = 8.0;
const SHOCKWAVE_DAMAGE: f32 = 1.2;
const SHOCKWAVE_KNOCKBACK: f32 = 200.0;
const TAKE_OFF_GRACE: Duration = Duration::from_millis(500);
const DODGE_RANGE: f32 = 150.0;
const DODGE_SPEED: f32 = 2.0;
const DODGE_DURATION: Duration = Duration::from_millis(800);
const HEAL_AMOUNT: f32 = 2.0;
const RETREAT_RANGE: f32 = 80.0;
const RETREAT_SPEED: f32 = 0.8;

impl Sniper {
    fn can_leap(ctx: &Context<'_>, distance: f32) -> bool {
        (SHOCKWAVE_MIN..=SHOCKWAVE_MAX).contains(&distance)
            && ctx.me.grounded
            && ctx.memory.leap == Leap::Idle
            && ctx.memory.secondary.ready(ctx.now)
    }

    fn incoming_bullet(ctx: &Context<'_>) -> Option<Facing> {
        let center = ctx.me.center();
        ctx.projectiles.iter().find_map(|projectile| {
            if !matches!(projectile.kind, ProjectileKind::Bullet(_))
                || !projectile.faction.opposes(ctx.me.faction())
            {
                return None;
            }
            let offset = projectile.aabb.center() - center;
            let velocity = projectile.velocity;
            let approaching = offset.x * velocity.x < 0.0;
            if offset.length() > DODGE_RANGE || !approaching {
                return None;
            }
            let time_to_impact = (offset.x / velocity.x).abs();
            let predicted = offset.y + velocity.y * time_to_impact;
            (predicted.abs() < ctx.me.aabb.size().y).then(|| {
                if velocity.x > 0.0 {
                    Facing::Left
                } else {
                    Facing::Right
                }
            })
        })
    }

    fn land(ctx: &mut Context<'_>) {
        let aabb = ctx.me.aabb;
        ctx.emit(Command::Launch {
            owner: ctx.me.id,
            payload: Payload::Shockwave {
                center: Vec2::new(aabb.center().x, aabb.bottom()),
                max_radius: SHOCKWAVE_RADIUS,
                expansion: SHOCKWAVE_EXPANSION,
                damage: ctx.me.damage * SHOCKWAVE_DAMAGE,
                knockback: SHOCKWAVE_KNOCKBACK,
            },
        });
        ctx.emit(Command::SetAction {
            entity: ctx.me.id,
            action: None,
        });
        ctx.memory.leap = Leap::Idle;
    }
}

impl Behavior for Sniper {
    fn profile(&self) -> Profile {
        Profile {
            detection_range: SNIPER_DETECTION,
            attack_range: SNIPER_ATTACK_RANGE,
            primary_cooldown: Duration::from_secs(2),
            secondary_cooldown: Duration::from_secs(6),
            recovery_cooldown: Duration::from_secs(5),
            ..Profile::BASE
        }
    }

    fn wants_attack(&self, ctx: &Context<'_>, distance: f32) -> bool {
        if distance > SNIPER_DETECTION {
            return false;
        }
        ctx.memory.primary.ready(ctx.now)
            || Self::can_leap(ctx, distance)
            || (distance <= SNIPER_ATTACK_RANGE && ctx.memory.attack.ready(ctx.now))
    }

    fn attack(&self, ctx: &mut Context<'_>, target: &CombatantSnapshot, distance: f32) -> bool {
        if ctx.memory.primary.try_trigger(ctx.now) {
            let direction = ctx.aim_at(target.center());
            ctx.emit(Command::Launch {
                owner: ctx.me.id,
                payload: Payload::TrackingBolt {
                    origin: ctx.me.center(),
                    target: target.id,
                    direction,
                    speed: BOLT_SPEED,
                    strength: BOLT_STRENGTH,
                    damage: ctx.me.damage,
                },
            });
            return true;
        }

        if Self::can_leap(ctx, distance) {
            ctx.memory.secondary.trigger(ctx.now);
            ctx.memory.leap = Leap::Windup {
                until: ctx.now.advanced(SHOCKWAVE_WINDUP),
            };
            ctx.emit(Command::SetAction {
                entity: ctx.me.id,
                action: Some(Action::Leaping),
            });
            return true;
        }

        if distance <= CONTACT_RANGE && ctx.memory.attack.ready(ctx.now) {
            ctx.contact_strike(target);
            return true;
        }
        false
    }

    fn on_special_update(&self, ctx: &mut Context<'_>) -> Control {
        let wounded = ctx.me.health.current() < ctx.me.health.max();
        if ctx.memory.recovery.try_trigger(ctx.now) && wounded {
            ctx.emit(Command::Heal {
                entity: ctx.me.id,
                amount: HEAL_AMOUNT,
            });
        }

        match ctx.memory.leap {
            Leap::Windup { until } => {
                if ctx.now < until {
                    return Control::Hold {
                        horizontal: Some(0.0),
                    };
                }
                ctx.emit(Command::Jump {
                    entity: ctx.me.id,
                    vertical: SHOCKWAVE_JUMP,
                    horizontal: None,
                });
                ctx.memory.leap = Leap::Airborne {
                    since: ctx.now,
                    lifted: false,
                };
                return Control::Hold { horizontal: None };
            }
            Leap::Airborne { since, lifted } => {
                let lifted = lifted || !ctx.me.grounded;
                if lifted && ctx.me.grounded && ctx.me.velocity.y >= 0.0 {
                    Self::land(ctx);
                } else if !lifted && ctx.now.since(since) > TAKE_OFF_GRACE {
                    ctx.memory.leap = Leap::Idle;
                    ctx.emit(Command::SetAction {
                        entity: ctx.me.id,
                        action: None,
                    });
                } else {
                    ctx.memory.leap = Leap::Airborne { since, lifted };
                }
            }
            Leap::Idle => {}
        }

        let dodging = ctx.memory.action.is_some();
        if !dodging && ctx.memory.leap == Leap::Idle {
            if let Some(direction) = Self::incoming_bullet(ctx) {
                let horizontal = direction.sign() * ctx.me.speed * DODGE_SPEED;
                ctx.begin_action(Action::Dodging, DODGE_DURATION, Some(horizontal));
                return Control::Hold {
                    horizontal: Some(horizontal * ctx.me.speed_multiplier),
                };
            }
        }
        Control::Proceed
    }

    fn adjust_steering(
        &self,
        ctx: &mut Context<'_>,
        target: &CombatantSnapshot,
        _state: AiState,
        horizontal: Option<f32>,
    ) -> Option<f32> {
        let dx = target.center().x - ctx.me.center().x;
        let close = ctx.me.center().distance(target.center()) < RETREAT_RANGE;
        if !close || ctx.memory.leap != Leap::Idle {
            return horizontal;
        }
        let away = if dx > 0.0 { -1.0 } else { 1.0 };
        Some(away * ctx.me.effective_speed() * RETREAT_SPEED)
    }
}

/// Bosses whose specials come from the boss director; they fight with the
/// base behavior in between.
#[derive(Clone, Copy, Debug, Default)]
pub struct Scripted;

impl Behavior for Scripted {}
