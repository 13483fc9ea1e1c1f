#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Boss encounters: phase progression, area hazards and the director system
//! that schedules scripted special attacks.

mod hazard;
mod phase;
mod profile;

use std::{
    collections::BTreeMap,
    f32::consts::{FRAC_PI_4, TAU},
    time::Duration,
};

use elemental_arena_core::{
    frame_scale, Aabb, Action, Archetype, Command, CombatantSnapshot, CombatantView, EntityId,
    Event, Payload, SimTime, Vec2,
};
use rand::{seq::SliceRandom, Rng, RngCore};

pub use hazard::{Contact, Exposure, Hazard};
pub use phase::{
    DamageReport, PhaseController, SpecialScheduler, DEFAULT_TRANSITION,
    TRANSITION_DAMAGE_FACTOR,
};
pub use profile::{BossProfile, PhaseBuff, Special};

const LAVA_BALL_COUNT: usize = 3;
const LAVA_BALL_SPEED: f32 = 8.0;
const LAVA_BALL_JITTER: f32 = 0.3;
const LAVA_RAIN_DURATION: Duration = Duration::from_secs(3);
const LAVA_RAIN_CHANCE_PER_FRAME: f64 = 0.3;
const LAVA_RAIN_DAMAGE: f32 = 0.8;
const SPIN_DURATION: Duration = Duration::from_secs(2);
const SPIN_RADIUS: f32 = 150.0;
const SPIN_PUSH: f32 = 150.0;
const TELEPORT_MIN: f32 = 100.0;
const TELEPORT_MAX: f32 = 200.0;
const TELEPORT_EDGE: f32 = 50.0;
const TELEPORT_FLOOR: f32 = 100.0;
const COMBO_TELEPORT_DELAY: Duration = Duration::from_secs(1);
const MEGA_TORNADO_CHARGE: Duration = Duration::from_secs(2);
const MEGA_TORNADO_DAMAGE: f32 = 2.0;
const ERUPTION_COUNT: usize = 8;
const ERUPTION_RADIUS: f32 = 60.0;
const ERUPTION_DAMAGE: f32 = 1.5;
const BARRAGE_COUNT: usize = 8;
const BARRAGE_JITTER: f32 = 0.2;
const BARRAGE_SPEED: f32 = 12.0;
const BARRAGE_DAMAGE: f32 = 0.8;
const THUNDER_COUNT: usize = 5;
const THUNDER_RADIUS: f32 = 30.0;
const THUNDER_DAMAGE: f32 = 1.5;
const WHIRLPOOL_RADIUS: f32 = 80.0;
const MINI_TSUNAMI_HEIGHT: f32 = 100.0;
const MINI_TSUNAMI_RISE: f32 = -50.0;
const MINI_TSUNAMI_DAMAGE: f32 = 1.2;
const MINI_TSUNAMI_LIFETIME: Duration = Duration::from_secs(3);
const MEGA_TSUNAMI_WAVES: usize = 3;
const MEGA_TSUNAMI_LIFETIME: Duration = Duration::from_secs(6);

#[derive(Clone, Debug)]
struct Encounter {
    profile: BossProfile,
    scheduler: SpecialScheduler,
    lava_rain_until: Option<SimTime>,
    spin_until: Option<SimTime>,
    charge_until: Option<SimTime>,
    teleport_at: Option<SimTime>,
}

impl Encounter {
    fn new(profile: BossProfile, now: SimTime) -> Self {
        Self {
            profile,
            scheduler: SpecialScheduler::starting_at(profile.special_interval(), now),
            lava_rain_until: None,
            spin_until: None,
            charge_until: None,
            teleport_at: None,
        }
    }
}

/// Pure system that schedules boss specials and phase buffs.
///
/// The director tracks each boss announced through [`Event::BossSpawned`],
/// buffs it when [`Event::PhaseChanged`] reports a completed transition and
/// releases one special per interval while the boss is not transitioning.
#[derive(Debug, Default)]
pub struct BossDirector {
    encounters: BTreeMap<EntityId, Encounter>,
    now: SimTime,
    frames: f32,
}

impl BossDirector {
    /// Creates a director with no tracked bosses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bosses currently tracked.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.encounters.len()
    }

    /// Consumes the previous tick's events and emits boss commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        combatants: &CombatantView,
        arena: Aabb,
        rng: &mut dyn RngCore,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            self.observe(event, out);
        }

        let Some(player) = combatants.player() else {
            self.frames = 0.0;
            return;
        };

        for (id, encounter) in &mut self.encounters {
            let Some(boss) = combatants.get(*id) else {
                continue;
            };
            let mut cast = Cast {
                boss,
                player,
                arena,
                now: self.now,
                rng: &mut *rng,
                out: &mut *out,
            };
            cast.continue_effects(encounter, self.frames);

            let transitioning = boss.boss.is_some_and(|status| status.transitioning);
            if !encounter.scheduler.poll(self.now, transitioning) {
                continue;
            }
            let phase = boss.boss.map_or(1, |status| status.phase);
            let specials = encounter.profile.specials(phase);
            let Some(special) = specials.choose(&mut *cast.rng).copied() else {
                continue;
            };
            log::debug!("boss {:?} casts {:?} in phase {}", id, special, phase);
            cast.perform(encounter, special);
        }

        self.frames = 0.0;
    }

    fn observe(&mut self, event: &Event, out: &mut Vec<Command>) {
        match event {
            Event::TimeAdvanced { dt, now } => {
                self.now = *now;
                self.frames += frame_scale(*dt);
            }
            Event::BossSpawned { entity, archetype } => {
                if let Some(profile) = BossProfile::of(*archetype) {
                    let _ = self
                        .encounters
                        .insert(*entity, Encounter::new(profile, self.now));
                }
            }
            Event::PhaseChanged { entity, phase } => {
                let Some(encounter) = self.encounters.get_mut(entity) else {
                    return;
                };
                let Some(buff) = encounter.profile.buff(*phase) else {
                    return;
                };
                encounter.scheduler.set_interval(buff.special_interval);
                out.push(Command::BuffStats {
                    entity: *entity,
                    damage_multiplier: buff.damage_multiplier,
                    speed_multiplier: buff.speed_multiplier,
                });
            }
            Event::Killed { entity, .. } | Event::FellOut { entity, .. } => {
                let _ = self.encounters.remove(entity);
            }
            Event::WorldReset => self.encounters.clear(),
            _ => {}
        }
    }
}

struct Cast<'a> {
    boss: &'a CombatantSnapshot,
    player: &'a CombatantSnapshot,
    arena: Aabb,
    now: SimTime,
    rng: &'a mut dyn RngCore,
    out: &'a mut Vec<Command>,
}

impl Cast<'_> {
    fn continue_effects(&mut self, encounter: &mut Encounter, frames: f32) {
        if let Some(until) = encounter.lava_rain_until {
            if self.now >= until {
                encounter.lava_rain_until = None;
            } else {
                let chance = 1.0 - (1.0 - LAVA_RAIN_CHANCE_PER_FRAME).powf(f64::from(frames));
                if self.rng.gen_bool(chance.clamp(0.0, 1.0)) {
                    self.rain_ball();
                }
            }
        }

        if encounter.spin_until.is_some_and(|until| self.now >= until) {
            encounter.spin_until = None;
            self.set_action(None);
        }

        if encounter.charge_until.is_some_and(|until| self.now >= until) {
            encounter.charge_until = None;
            self.set_action(None);
            self.launch(Payload::MegaTornado {
                center: self.boss.center(),
                damage_per_second: self.boss.damage * MEGA_TORNADO_DAMAGE,
            });
        }

        if encounter.teleport_at.is_some_and(|at| self.now >= at) {
            encounter.teleport_at = None;
            self.teleport();
        }
    }

    fn perform(&mut self, encounter: &mut Encounter, special: Special) {
        match special {
            Special::LavaBalls => self.lava_balls(),
            Special::LavaRain => {
                encounter.lava_rain_until = Some(self.now.advanced(LAVA_RAIN_DURATION));
            }
            Special::TornadoSpin => self.spin(encounter),
            Special::Teleport => self.teleport(),
            Special::MegaTornado => {
                encounter.charge_until = Some(self.now.advanced(MEGA_TORNADO_CHARGE));
                self.set_action(Some(Action::Charging));
            }
            Special::LavaEruption => self.eruptions(),
            Special::Combo => {
                self.lava_balls();
                self.spin(encounter);
                encounter.teleport_at = Some(self.now.advanced(COMBO_TELEPORT_DELAY));
            }
            Special::WaterBarrage => self.water_barrage(),
            Special::ThunderStorm => self.thunder_storm(),
            Special::Whirlpool => self.launch(Payload::Whirlpool {
                center: self.player.center(),
                radius: WHIRLPOOL_RADIUS,
                damage_per_second: self.boss.damage,
            }),
            Special::MiniTsunami => self.mini_tsunami(),
            Special::MegaTsunami => self.mega_tsunami(),
        }
    }

    fn launch(&mut self, payload: Payload) {
        self.out.push(Command::Launch {
            owner: self.boss.id,
            payload,
        });
    }

    fn set_action(&mut self, action: Option<Action>) {
        self.out.push(Command::SetAction {
            entity: self.boss.id,
            action,
        });
    }

    fn lava_balls(&mut self) {
        let origin = self.boss.center();
        let aim = self.player.center() - origin;
        let base = aim.y.atan2(aim.x);
        for _ in 0..LAVA_BALL_COUNT {
            let angle = base + self.rng.gen_range(-LAVA_BALL_JITTER..=LAVA_BALL_JITTER);
            self.launch(Payload::LavaBall {
                origin,
                velocity: Vec2::new(angle.cos(), angle.sin()) * LAVA_BALL_SPEED,
                damage: self.boss.damage,
            });
        }
    }

    fn rain_ball(&mut self) {
        let x = self.rng.gen_range(self.arena.left()..=self.arena.right());
        let velocity = Vec2::new(self.rng.gen_range(-2.0..=2.0), self.rng.gen_range(6.0..=10.0));
        self.launch(Payload::RainBall {
            origin: Vec2::new(x, self.arena.top() - 50.0),
            velocity,
            damage: self.boss.damage * LAVA_RAIN_DAMAGE,
        });
    }

    fn spin(&mut self, encounter: &mut Encounter) {
        encounter.spin_until = Some(self.now.advanced(SPIN_DURATION));
        self.set_action(Some(Action::Spinning));
        self.launch(Payload::Whirlwind {
            center: self.boss.center(),
            radius: SPIN_RADIUS,
            push: SPIN_PUSH,
            damage: self.boss.damage,
        });
    }

    fn teleport(&mut self) {
        let angle = self.rng.gen_range(0.0..TAU);
        let distance = self.rng.gen_range(TELEPORT_MIN..=TELEPORT_MAX);
        let size = self.boss.aabb.size();
        let center = self.player.center() + Vec2::new(angle.cos(), angle.sin()) * distance;
        let min = Vec2::new(
            self.arena.left() + TELEPORT_EDGE,
            self.arena.top() + TELEPORT_EDGE,
        );
        let max = Vec2::new(
            self.arena.right() - TELEPORT_EDGE - size.x,
            self.arena.bottom() - TELEPORT_FLOOR - size.y,
        )
        .max(min);
        self.out.push(Command::Teleport {
            entity: self.boss.id,
            position: (center - size * 0.5).clamp(min, max),
        });
    }

    fn eruptions(&mut self) {
        for _ in 0..ERUPTION_COUNT {
            let center = Vec2::new(
                self.rng.gen_range(self.arena.left()..=self.arena.right()),
                self.rng
                    .gen_range(self.arena.bottom() - 200.0..=self.arena.bottom() - 50.0),
            );
            self.launch(Payload::Eruption {
                center,
                radius: ERUPTION_RADIUS,
                damage: self.boss.damage * ERUPTION_DAMAGE,
            });
        }
    }

    fn water_barrage(&mut self) {
        let origin = self.boss.center();
        for index in 0..BARRAGE_COUNT {
            let angle = index as f32 * FRAC_PI_4
                + self.rng.gen_range(-BARRAGE_JITTER..=BARRAGE_JITTER);
            self.launch(Payload::WaterBolt {
                origin,
                velocity: Vec2::new(angle.cos(), angle.sin()) * BARRAGE_SPEED,
                damage: self.boss.damage * BARRAGE_DAMAGE,
            });
        }
    }

    fn thunder_storm(&mut self) {
        for _ in 0..THUNDER_COUNT {
            let center = Vec2::new(
                self.rng.gen_range(self.arena.left()..=self.arena.right()),
                self.rng.gen_range(self.arena.top()..=self.arena.bottom()),
            );
            self.launch(Payload::ThunderStrike {
                center,
                radius: THUNDER_RADIUS,
                damage: self.boss.damage * THUNDER_DAMAGE,
            });
        }
    }

    fn mini_tsunami(&mut self) {
        self.launch(Payload::TsunamiWall {
            area: Aabb::from_xywh(
                self.arena.left(),
                self.arena.bottom() - 150.0,
                self.arena.size().x,
                MINI_TSUNAMI_HEIGHT,
            ),
            velocity: Vec2::new(0.0, MINI_TSUNAMI_RISE),
            damage: self.boss.damage * MINI_TSUNAMI_DAMAGE,
            lifetime: MINI_TSUNAMI_LIFETIME,
        });
    }

    fn mega_tsunami(&mut self) {
        for wave in 0..MEGA_TSUNAMI_WAVES {
            let wave = wave as f32;
            self.launch(Payload::TsunamiWall {
                area: Aabb::from_xywh(
                    self.arena.left() - 200.0 - wave * 100.0,
                    self.arena.bottom() - 200.0 - wave * 30.0,
                    self.arena.size().x + 400.0,
                    150.0 + wave * 20.0,
                ),
                velocity: Vec2::new(200.0 + wave * 50.0, 0.0),
                damage: self.boss.damage * (1.5 + wave * 0.3),
                lifetime: MEGA_TSUNAMI_LIFETIME,
            });
        }
    }
}

/// Reports whether the archetype's scripted specials are driven by the
/// director rather than its behavior.
#[must_use]
pub fn has_scripted_specials(archetype: Archetype) -> bool {
    BossProfile::of(archetype).is_some_and(|profile| !profile.specials(1).is_empty())
}
