//! Area hazards spawned by boss specials.

use std::{collections::BTreeSet, time::Duration};

use elemental_arena_core::{
    Aabb, EntityId, Facing, Faction, HazardId, HazardKind, HazardSnapshot, HazardStage, Payload,
    StatusEffectSpec, Vec2, FRAMES_PER_SECOND,
};

const ERUPTION_WARNING: Duration = Duration::from_secs(1);
const ERUPTION_ACTIVE: Duration = Duration::from_secs(2);
const MEGA_TORNADO_RADIUS: f32 = 100.0;
const MEGA_TORNADO_MAX_RADIUS: f32 = 200.0;
const MEGA_TORNADO_GROWTH: f32 = 50.0;
const MEGA_TORNADO_LIFETIME: Duration = Duration::from_secs(5);
const MEGA_TORNADO_PUSH: f32 = 300.0;
const WHIRLPOOL_LIFETIME: Duration = Duration::from_secs(4);
const WHIRLPOOL_PULL: f32 = 150.0;
const WHIRLPOOL_CORE: f32 = 20.0;
const THUNDER_WARNING: Duration = Duration::from_millis(800);
const THUNDER_ACTIVE: Duration = Duration::from_millis(200);
const TSUNAMI_PUSH_FACTOR: f32 = 0.5;

/// Body exposed to hazards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Exposure {
    /// Handle of the combatant.
    pub id: EntityId,
    /// Side the combatant fights for.
    pub faction: Faction,
    /// Current bounding box.
    pub aabb: Aabb,
}

/// Effect of a hazard on one combatant during one step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    /// Combatant affected.
    pub target: EntityId,
    /// Hit points to remove.
    pub damage: f32,
    /// Velocity change per nominal frame.
    pub impulse: Vec2,
    /// Decaying knockback to start.
    pub knockback: Option<(f32, Facing)>,
    /// Status effect to attach.
    pub status: Option<StatusEffectSpec>,
}

impl Contact {
    fn damage(target: EntityId, damage: f32) -> Self {
        Self {
            target,
            damage,
            impulse: Vec2::ZERO,
            knockback: None,
            status: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Shape {
    Circle {
        center: Vec2,
        radius: f32,
        growth: f32,
        max_radius: f32,
    },
    Wall {
        area: Aabb,
        velocity: Vec2,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Behavior {
    Shockwave { knockback: f32 },
    Eruption,
    MegaTornado,
    Whirlpool,
    Thunder,
    Tsunami { velocity: Vec2 },
}

/// Area effect with warning, active and finished stages.
///
/// Shockwaves, eruptions, thunder strikes and tsunami walls strike each
/// combatant once; mega tornadoes and whirlpools apply damage per second and
/// a push or pull every step.
#[derive(Clone, Debug, PartialEq)]
pub struct Hazard {
    kind: HazardKind,
    faction: Faction,
    owner: Option<EntityId>,
    shape: Shape,
    behavior: Behavior,
    damage: f32,
    elapsed: Duration,
    warning: Duration,
    active: Duration,
    struck: BTreeSet<EntityId>,
    dissipated: bool,
}

impl Hazard {
    /// Builds the hazard described by a payload launched by `owner`.
    ///
    /// Returns `None` for payloads that are projectiles or instant pulses.
    #[must_use]
    pub fn from_payload(owner: EntityId, faction: Faction, payload: &Payload) -> Option<Self> {
        let hazard = |kind, shape, behavior, damage, warning, active| Self {
            kind,
            faction,
            owner: Some(owner),
            shape,
            behavior,
            damage,
            elapsed: Duration::ZERO,
            warning,
            active,
            struck: BTreeSet::new(),
            dissipated: false,
        };

        match *payload {
            Payload::Shockwave {
                center,
                max_radius,
                expansion,
                damage,
                knockback,
            } => Some(hazard(
                HazardKind::Shockwave,
                Shape::Circle {
                    center,
                    radius: 0.0,
                    growth: expansion * FRAMES_PER_SECOND,
                    max_radius,
                },
                Behavior::Shockwave { knockback },
                damage,
                Duration::ZERO,
                Duration::MAX,
            )),
            Payload::Eruption {
                center,
                radius,
                damage,
            } => Some(hazard(
                HazardKind::Eruption,
                circle(center, radius),
                Behavior::Eruption,
                damage,
                ERUPTION_WARNING,
                ERUPTION_ACTIVE,
            )),
            Payload::MegaTornado {
                center,
                damage_per_second,
            } => Some(hazard(
                HazardKind::MegaTornado,
                Shape::Circle {
                    center,
                    radius: MEGA_TORNADO_RADIUS,
                    growth: MEGA_TORNADO_GROWTH,
                    max_radius: MEGA_TORNADO_MAX_RADIUS,
                },
                Behavior::MegaTornado,
                damage_per_second,
                Duration::ZERO,
                MEGA_TORNADO_LIFETIME,
            )),
            Payload::Whirlpool {
                center,
                radius,
                damage_per_second,
            } => Some(hazard(
                HazardKind::Whirlpool,
                circle(center, radius),
                Behavior::Whirlpool,
                damage_per_second,
                Duration::ZERO,
                WHIRLPOOL_LIFETIME,
            )),
            Payload::ThunderStrike {
                center,
                radius,
                damage,
            } => Some(hazard(
                HazardKind::ThunderStrike,
                circle(center, radius),
                Behavior::Thunder,
                damage,
                THUNDER_WARNING,
                THUNDER_ACTIVE,
            )),
            Payload::TsunamiWall {
                area,
                velocity,
                damage,
                lifetime,
            } => Some(hazard(
                HazardKind::TsunamiWall,
                Shape::Wall { area, velocity },
                Behavior::Tsunami { velocity },
                damage,
                Duration::ZERO,
                lifetime,
            )),
            Payload::LavaBall { .. }
            | Payload::RainBall { .. }
            | Payload::WaterSplash { .. }
            | Payload::WaterBolt { .. }
            | Payload::TrackingBolt { .. }
            | Payload::Whirlwind { .. } => None,
        }
    }

    /// Kind of the hazard.
    #[must_use]
    pub const fn kind(&self) -> HazardKind {
        self.kind
    }

    /// Combatant that produced the hazard.
    #[must_use]
    pub const fn owner(&self) -> Option<EntityId> {
        self.owner
    }

    /// Current timing stage.
    #[must_use]
    pub fn stage(&self) -> HazardStage {
        if self.elapsed < self.warning {
            HazardStage::Warning
        } else if self.elapsed.saturating_sub(self.warning) < self.active
            && !self.dissipated
        {
            HazardStage::Active
        } else {
            HazardStage::Finished
        }
    }

    /// Reports whether the hazard expired and can be removed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.stage() == HazardStage::Finished
    }

    /// Centre of the affected region.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        match self.shape {
            Shape::Circle { center, .. } => center,
            Shape::Wall { area, .. } => area.center(),
        }
    }

    /// Radius of circular hazards; zero for walls.
    #[must_use]
    pub fn radius(&self) -> f32 {
        match self.shape {
            Shape::Circle { radius, .. } => radius,
            Shape::Wall { .. } => 0.0,
        }
    }

    /// Bounding box of the affected region.
    #[must_use]
    pub fn area(&self) -> Aabb {
        match self.shape {
            Shape::Circle { center, radius, .. } => {
                Aabb::centered(center, Vec2::splat(radius * 2.0))
            }
            Shape::Wall { area, .. } => area,
        }
    }

    /// A shockwave sweeps its outermost band on the step it reaches full size.
    fn ring_at_full_size(&self) -> bool {
        matches!(
            (self.behavior, self.shape),
            (Behavior::Shockwave { .. }, Shape::Circle { radius, max_radius, .. })
                if radius >= max_radius
        )
    }

    /// Advances timers and geometry by `dt`, then reports the combatants the
    /// hazard affects during this step.
    pub fn advance(&mut self, dt: Duration, exposed: &[Exposure]) -> Vec<Contact> {
        if self.is_finished() {
            return Vec::new();
        }
        self.elapsed = self.elapsed.saturating_add(dt);
        let seconds = dt.as_secs_f32();

        match &mut self.shape {
            Shape::Circle {
                radius,
                growth,
                max_radius,
                ..
            } => {
                if *radius < *max_radius {
                    *radius = (*radius + *growth * seconds).min(*max_radius);
                }
            }
            Shape::Wall { area, velocity } => {
                *area = area.translated(*velocity * seconds);
            }
        }

        if self.stage() != HazardStage::Active {
            return Vec::new();
        }

        let mut contacts = Vec::new();
        for body in exposed {
            if !self.faction.opposes(body.faction) || !self.touches(&body.aabb) {
                continue;
            }
            if let Some(contact) = self.contact(body, dt) {
                contacts.push(contact);
            }
        }
        self.dissipated = self.ring_at_full_size();
        contacts
    }

    fn touches(&self, aabb: &Aabb) -> bool {
        match self.shape {
            Shape::Circle { center, radius, .. } => aabb.center().distance(center) <= radius,
            Shape::Wall { area, .. } => area.overlaps(aabb),
        }
    }

    fn contact(&mut self, body: &Exposure, dt: Duration) -> Option<Contact> {
        let seconds = dt.as_secs_f32();
        let offset = body.aabb.center() - self.center();
        let outward = offset.normalize_or_zero();

        match self.behavior {
            Behavior::Shockwave { knockback } => {
                self.strike_once(body.id)?;
                let direction = Facing::from_dx(offset.x).unwrap_or(Facing::Right);
                Some(Contact {
                    knockback: Some((knockback, direction)),
                    ..Contact::damage(body.id, self.damage)
                })
            }
            Behavior::Eruption => {
                self.strike_once(body.id)?;
                Some(Contact::damage(body.id, self.damage))
            }
            Behavior::Thunder => {
                self.strike_once(body.id)?;
                Some(Contact {
                    status: Some(StatusEffectSpec::PARALYSIS),
                    ..Contact::damage(body.id, self.damage)
                })
            }
            Behavior::Tsunami { velocity } => {
                self.strike_once(body.id)?;
                Some(Contact {
                    impulse: velocity * TSUNAMI_PUSH_FACTOR * seconds,
                    ..Contact::damage(body.id, self.damage)
                })
            }
            Behavior::MegaTornado => Some(Contact {
                impulse: outward * MEGA_TORNADO_PUSH * seconds,
                ..Contact::damage(body.id, self.damage * seconds)
            }),
            Behavior::Whirlpool => {
                let distance = offset.length();
                let damage = if distance <= WHIRLPOOL_CORE {
                    self.damage * seconds
                } else {
                    0.0
                };
                Some(Contact {
                    impulse: -outward * WHIRLPOOL_PULL * seconds,
                    ..Contact::damage(body.id, damage)
                })
            }
        }
    }

    fn strike_once(&mut self, target: EntityId) -> Option<()> {
        self.struck.insert(target).then_some(())
    }

    /// Captures the hazard for read-only views.
    #[must_use]
    pub fn snapshot(&self, id: HazardId) -> HazardSnapshot {
        HazardSnapshot {
            id,
            kind: self.kind,
            stage: self.stage(),
            center: self.center(),
            radius: self.radius(),
            area: self.area(),
        }
    }
}

fn circle(center: Vec2, radius: f32) -> Shape {
    Shape::Circle {
        center,
        radius,
        growth: 0.0,
        max_radius: radius,
    }
}
