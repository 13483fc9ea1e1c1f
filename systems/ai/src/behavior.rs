//! Capability trait implemented by every archetype and the shared base behavior.

use std::time::Duration;

use elemental_arena_core::{
    Aabb, Action, AiState, Command, CombatantSnapshot, Cooldown, Facing, ProjectileView, SimTime,
    Vec2,
};
use rand::{Rng, RngCore};

/// Velocity applied by a chase jump.
pub const CHASE_JUMP: f32 = -12.0;

/// Knockback force a contact strike applies to its target.
pub const CONTACT_KNOCKBACK: f32 = 20.0;

/// Distance at which a hostile strikes its target on contact.
pub const CONTACT_RANGE: f32 = 60.0;

const PATROL_FLIP_CHANCE: f32 = 0.01;

/// Detection and cooldown tuning of an archetype.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Profile {
    /// Distance at which the target is noticed.
    pub detection_range: f32,
    /// Distance at which attacks are attempted.
    pub attack_range: f32,
    /// Minimum time between two successful attacks.
    pub attack_cooldown: Duration,
    /// Cooldown of the archetype's first ability.
    pub primary_cooldown: Duration,
    /// Cooldown of the archetype's second ability.
    pub secondary_cooldown: Duration,
    /// Cooldown of the archetype's passive recovery.
    pub recovery_cooldown: Duration,
}

impl Profile {
    /// Shared base tuning.
    pub const BASE: Self = Self {
        detection_range: 200.0,
        attack_range: CONTACT_RANGE,
        attack_cooldown: Duration::from_secs(2),
        primary_cooldown: Duration::from_secs(3),
        secondary_cooldown: Duration::from_secs(4),
        recovery_cooldown: Duration::from_secs(5),
    };
}

/// Manoeuvre that runs until a deadline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimedAction {
    /// Manoeuvre surfaced to renderers.
    pub action: Action,
    /// Time at which the manoeuvre ends.
    pub until: SimTime,
    /// Horizontal velocity held for the whole manoeuvre, before status effects.
    pub horizontal: Option<f32>,
}

/// Progress of a leap that ends in a landing attack.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Leap {
    /// No leap in progress.
    #[default]
    Idle,
    /// Crouching before take-off.
    Windup {
        /// Time of take-off.
        until: SimTime,
    },
    /// Jump issued; waiting for the landing.
    Airborne {
        /// Time of take-off.
        since: SimTime,
        /// The body left the ground at least once.
        lifted: bool,
    },
}

/// Per-combatant decision memory.
#[derive(Clone, Debug, PartialEq)]
pub struct Memory {
    /// Gate of the base attack.
    pub attack: Cooldown,
    /// Gate of the archetype's first ability.
    pub primary: Cooldown,
    /// Gate of the archetype's second ability.
    pub secondary: Cooldown,
    /// Gate of the archetype's passive recovery.
    pub recovery: Cooldown,
    /// Manoeuvre in progress.
    pub action: Option<TimedAction>,
    /// Leap in progress.
    pub leap: Leap,
    pub(crate) state: Option<AiState>,
}

impl Memory {
    /// Creates a memory whose cooldowns follow `profile`.
    #[must_use]
    pub fn new(profile: &Profile, now: SimTime) -> Self {
        let mut recovery = Cooldown::new(profile.recovery_cooldown);
        recovery.trigger(now);
        Self {
            attack: Cooldown::new(profile.attack_cooldown),
            primary: Cooldown::new(profile.primary_cooldown),
            secondary: Cooldown::new(profile.secondary_cooldown),
            recovery,
            action: None,
            leap: Leap::Idle,
            state: None,
        }
    }
}

/// Whether an archetype's special update left the base machine in charge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Control {
    /// Run the base state machine.
    Proceed,
    /// Skip the base machine this tick, optionally steering.
    Hold {
        /// Horizontal velocity to apply, if any.
        horizontal: Option<f32>,
    },
}

/// Everything an archetype may read or emit while deciding.
pub struct Context<'a> {
    /// Combatant deciding.
    pub me: &'a CombatantSnapshot,
    /// Player, if alive.
    pub target: Option<&'a CombatantSnapshot>,
    /// Decision memory of the combatant.
    pub memory: &'a mut Memory,
    /// Current simulation time.
    pub now: SimTime,
    /// Nominal frames elapsed since the previous decision.
    pub frames: f32,
    /// Arena bounds.
    pub arena: Aabb,
    /// Live projectiles.
    pub projectiles: &'a ProjectileView,
    /// Seeded randomness.
    pub rng: &'a mut dyn RngCore,
    /// Commands emitted this tick.
    pub out: &'a mut Vec<Command>,
}

impl Context<'_> {
    /// Emits `command`.
    pub fn emit(&mut self, command: Command) {
        self.out.push(command);
    }

    /// Starts a timed manoeuvre.
    pub fn begin_action(&mut self, action: Action, duration: Duration, horizontal: Option<f32>) {
        self.memory.action = Some(TimedAction {
            action,
            until: self.now.advanced(duration),
            horizontal,
        });
        self.emit(Command::SetAction {
            entity: self.me.id,
            action: Some(action),
        });
    }

    /// Unit vector from the combatant toward `point`, falling back to its facing.
    #[must_use]
    pub fn aim_at(&self, point: Vec2) -> Vec2 {
        let direction = (point - self.me.center()).normalize_or_zero();
        if direction == Vec2::ZERO {
            Vec2::new(self.me.facing.sign(), 0.0)
        } else {
            direction
        }
    }

    /// Strikes `target` on contact.
    pub fn contact_strike(&mut self, target: &CombatantSnapshot) {
        self.emit(Command::ContactStrike {
            attacker: self.me.id,
            target: target.id,
            damage: self.me.damage,
            knockback: CONTACT_KNOCKBACK,
        });
    }

    /// Rolls an event that happens with `per_frame` probability each nominal frame.
    pub fn roll_per_frame(&mut self, per_frame: f32) -> bool {
        let chance = f64::from((per_frame * self.frames).clamp(0.0, 1.0));
        self.rng.gen_bool(chance)
    }
}

/// Capability set of an archetype.
///
/// Every method has a default that implements the shared base behavior, so
/// an archetype only overrides what it does differently.
pub trait Behavior {
    /// Detection and cooldown tuning.
    fn profile(&self) -> Profile {
        Profile::BASE
    }

    /// Reports whether the attack state should be tried this tick.
    fn wants_attack(&self, ctx: &Context<'_>, distance: f32) -> bool {
        distance <= self.profile().attack_range && ctx.memory.attack.ready(ctx.now)
    }

    /// Horizontal velocity while wandering; flips stochastically.
    fn patrol(&self, ctx: &mut Context<'_>) -> f32 {
        let mut facing = ctx.me.facing;
        if ctx.roll_per_frame(PATROL_FLIP_CHANCE) {
            facing = facing.flipped();
        }
        facing.sign() * ctx.me.effective_speed()
    }

    /// Horizontal velocity while pursuing `target`; jumps toward targets above.
    fn chase(&self, ctx: &mut Context<'_>, target: &CombatantSnapshot) -> f32 {
        let offset = target.center() - ctx.me.center();
        let above = offset.y < -50.0 && offset.x.abs() < 100.0;
        if above && ctx.me.grounded && ctx.me.speed_multiplier > 0.0 {
            ctx.emit(Command::Jump {
                entity: ctx.me.id,
                vertical: CHASE_JUMP,
                horizontal: None,
            });
        }
        offset.normalize_or_zero().x * ctx.me.effective_speed()
    }

    /// Attacks `target`, reporting whether anything was launched.
    fn attack(&self, ctx: &mut Context<'_>, target: &CombatantSnapshot, distance: f32) -> bool {
        if distance <= CONTACT_RANGE {
            ctx.contact_strike(target);
            true
        } else {
            false
        }
    }

    /// Archetype bookkeeping that runs before the base machine every tick.
    fn on_special_update(&self, _ctx: &mut Context<'_>) -> Control {
        Control::Proceed
    }

    /// State forced regardless of distances, if any.
    fn override_state(&self, ctx: &Context<'_>) -> Option<AiState> {
        (ctx.me.action == Some(Action::Charging)).then_some(AiState::Special)
    }

    /// Final adjustment of the chosen horizontal velocity.
    fn adjust_steering(
        &self,
        _ctx: &mut Context<'_>,
        _target: &CombatantSnapshot,
        _state: AiState,
        horizontal: Option<f32>,
    ) -> Option<f32> {
        horizontal
    }
}

/// Facing that matches a horizontal velocity, if it differs from `current`.
pub(crate) fn turn_toward(current: Facing, horizontal: f32) -> Option<Facing> {
    Facing::from_dx(horizontal).filter(|facing| *facing != current)
}
