#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns the player's per-tick intents into world commands.

use std::time::Duration;

use elemental_arena_core::{
    frame_scale, Aabb, Command, CombatantSnapshot, CombatantView, Cooldown, Event, Facing, Intent,
    SimTime, Vec2, VolleySpec, WeaponKind,
};

/// Tuning of the player's movement and attacks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    move_speed: f32,
    friction: f32,
    jump: f32,
    double_jump: f32,
    wall_jump: f32,
    wall_push: f32,
    fire_interval: Duration,
    melee_damage: f32,
    melee_knockback: f32,
    melee_reach: f32,
    melee_cooldown: Duration,
    volley: VolleySpec,
    volley_cooldown: Duration,
}

impl Config {
    /// Creates a configuration with the provided movement tuning and the
    /// default attacks.
    #[must_use]
    pub const fn new(move_speed: f32, friction: f32, jump: f32, double_jump: f32) -> Self {
        Self {
            move_speed,
            friction,
            jump,
            double_jump,
            wall_jump: -17.0,
            wall_push: 12.0,
            fire_interval: Duration::from_millis(300),
            melee_damage: 40.0,
            melee_knockback: 100.0,
            melee_reach: 80.0,
            melee_cooldown: Duration::from_millis(500),
            volley: VolleySpec {
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
            },
            volley_cooldown: Duration::from_secs(8),
        }
    }

    /// Returns the configuration with a different volley.
    #[must_use]
    pub fn with_volley(mut self, volley: VolleySpec, cooldown: Duration) -> Self {
        self.volley = volley;
        self.volley_cooldown = cooldown;
        self
    }

    /// Horizontal speed per nominal frame before status effects.
    #[must_use]
    pub const fn move_speed(&self) -> f32 {
        self.move_speed
    }

    /// Minimum time between two trigger pulls.
    #[must_use]
    pub const fn fire_interval(&self) -> Duration {
        self.fire_interval
    }

    /// Parameters of the special volley.
    #[must_use]
    pub const fn volley(&self) -> VolleySpec {
        self.volley
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(8.0, 0.8, -20.0, -15.0)
    }
}

/// Player controller holding jump and weapon state between ticks.
#[derive(Debug)]
pub struct PlayerControl {
    config: Config,
    weapon: WeaponKind,
    fire: Cooldown,
    melee: Cooldown,
    special: Cooldown,
    double_jump_ready: bool,
    jump_held: bool,
    melee_held: bool,
    now: SimTime,
    frames: f32,
}

impl Default for PlayerControl {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl PlayerControl {
    /// Creates a controller using the provided configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            weapon: WeaponKind::default(),
            fire: Cooldown::new(config.fire_interval),
            melee: Cooldown::new(config.melee_cooldown),
            special: Cooldown::new(config.volley_cooldown),
            double_jump_ready: true,
            jump_held: false,
            melee_held: false,
            now: SimTime::ZERO,
            frames: 0.0,
        }
    }

    /// Weapon currently selected.
    #[must_use]
    pub const fn weapon(&self) -> WeaponKind {
        self.weapon
    }

    /// Reports whether the special volley can be launched at `now`.
    #[must_use]
    pub fn special_ready(&self, now: SimTime) -> bool {
        self.special.ready(now)
    }

    /// Consumes the previous tick's events and emits the player's commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        intent: &Intent,
        combatants: &CombatantView,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::TimeAdvanced { dt, now } => {
                    self.now = *now;
                    self.frames += frame_scale(*dt);
                }
                Event::WorldReset => self.reset(),
                _ => {}
            }
        }

        if let Some(weapon) = intent.weapon {
            if weapon != self.weapon {
                log::debug!("weapon switched to {:?}", weapon);
            }
            self.weapon = weapon;
        }

        let Some(player) = combatants.player() else {
            self.jump_held = intent.jump;
            self.melee_held = intent.melee;
            self.frames = 0.0;
            return;
        };

        if player.grounded {
            self.double_jump_ready = true;
        }

        self.steer(intent, player, out);
        if intent.jump && !self.jump_held {
            self.jump(player, out);
        }
        if intent.fire {
            self.fire(intent, player, out);
        }
        if intent.melee && !self.melee_held {
            self.swing(player, out);
        }
        if intent.special && self.special.try_trigger(self.now) {
            out.push(Command::LaunchVolley {
                shooter: player.id,
                origin: player.center(),
                volley: self.config.volley,
            });
        }

        self.jump_held = intent.jump;
        self.melee_held = intent.melee;
        self.frames = 0.0;
    }

    fn reset(&mut self) {
        *self = Self {
            weapon: self.weapon,
            ..Self::new(self.config)
        };
    }

    fn steer(&self, intent: &Intent, player: &CombatantSnapshot, out: &mut Vec<Command>) {
        let horizontal = match intent.horizontal {
            Some(facing) => {
                if facing != player.facing {
                    out.push(Command::Face {
                        entity: player.id,
                        facing,
                    });
                }
                facing.sign() * self.config.move_speed * player.speed_multiplier
            }
            None => player.velocity.x * self.config.friction.powf(self.frames),
        };
        out.push(Command::Steer {
            entity: player.id,
            horizontal,
        });
    }

    fn jump(&mut self, player: &CombatantSnapshot, out: &mut Vec<Command>) {
        if player.speed_multiplier <= 0.0 {
            return;
        }

        let (vertical, horizontal) = if player.grounded {
            self.double_jump_ready = true;
            (self.config.jump, None)
        } else if self.double_jump_ready {
            self.double_jump_ready = false;
            (self.config.double_jump, None)
        } else if let Some(wall) = player.wall_contact {
            self.double_jump_ready = true;
            (
                self.config.wall_jump,
                Some(wall.flipped().sign() * self.config.wall_push),
            )
        } else {
            return;
        };

        out.push(Command::Jump {
            entity: player.id,
            vertical,
            horizontal,
        });
    }

    fn fire(&mut self, intent: &Intent, player: &CombatantSnapshot, out: &mut Vec<Command>) {
        if !self.fire.try_trigger(self.now) {
            return;
        }

        let origin = player.center();
        let direction = aim_direction(origin, intent.aim, player.facing);
        let turn = Facing::from_dx(direction.x).filter(|facing| *facing != player.facing);
        if let Some(facing) = turn {
            out.push(Command::Face {
                entity: player.id,
                facing,
            });
        }
        out.push(Command::FireBullet {
            shooter: player.id,
            weapon: self.weapon,
            origin,
            direction,
        });
    }

    fn swing(&mut self, player: &CombatantSnapshot, out: &mut Vec<Command>) {
        if !self.melee.try_trigger(self.now) {
            return;
        }

        out.push(Command::Melee {
            attacker: player.id,
            area: melee_area(&player.aabb, player.facing, self.config.melee_reach),
            damage: self.config.melee_damage,
            knockback: self.config.melee_knockback,
        });
    }
}

/// Unit vector from `origin` toward `aim`, or along `facing` when they coincide.
#[must_use]
pub fn aim_direction(origin: Vec2, aim: Vec2, facing: Facing) -> Vec2 {
    let direction = (aim - origin).normalize_or_zero();
    if direction == Vec2::ZERO {
        Vec2::new(facing.sign(), 0.0)
    } else {
        direction
    }
}

/// Rectangle swept by a melee swing on the `facing` side of `body`.
#[must_use]
pub fn melee_area(body: &Aabb, facing: Facing, reach: f32) -> Aabb {
    let x = match facing {
        Facing::Right => body.right(),
        Facing::Left => body.left() - reach,
    };
    Aabb::from_xywh(x, body.top(), reach, body.size().y)
}
