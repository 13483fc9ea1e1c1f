#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Kinematic bodies, gravity integration and platform collision resolution.
//!
//! Every moving combatant owns a [`KinematicBody`]. The world integrates the
//! body once per step and then resolves it against the static platform
//! colliders along the axis of minimum penetration.

use std::time::Duration;

use elemental_arena_core::{frame_scale, Aabb, Facing, Vec2};

/// Distance within which a body's feet count as resting on a platform top.
const SUPPORT_TOLERANCE: f32 = 0.01;

/// Tuning constants for body integration. Velocities are per nominal frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    gravity: f32,
    max_fall_speed: f32,
    wall_slide_damping: f32,
    knockback_decay: f32,
    knockback_floor: f32,
}

impl Config {
    /// Creates a configuration with the provided gravity and terminal velocity.
    #[must_use]
    pub const fn new(gravity: f32, max_fall_speed: f32) -> Self {
        Self {
            gravity,
            max_fall_speed,
            wall_slide_damping: 0.7,
            knockback_decay: 0.8,
            knockback_floor: 1.0,
        }
    }

    /// Downward acceleration added to `vy` per nominal frame.
    #[must_use]
    pub const fn gravity(&self) -> f32 {
        self.gravity
    }

    /// Terminal downward velocity.
    #[must_use]
    pub const fn max_fall_speed(&self) -> f32 {
        self.max_fall_speed
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(1.2, 20.0)
    }
}

/// How a body reacts when it runs into the side of a platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SideResponse {
    /// Keep facing; cling to the wall while falling through the air.
    WallSlide,
    /// Turn around to walk away from the wall.
    TurnAround,
}

/// Face of a platform a body was pushed out of.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContactSide {
    /// Pushed up onto the platform top.
    Top,
    /// Pushed down below the platform underside.
    Bottom,
    /// Pushed out to the left of the platform.
    Left,
    /// Pushed out to the right of the platform.
    Right,
}

impl ContactSide {
    /// Resolution order used to break ties between equal penetration depths.
    pub const ORDER: [ContactSide; 4] = [Self::Top, Self::Bottom, Self::Left, Self::Right];

    /// Reports whether a body moving with `velocity` is heading into this face.
    #[must_use]
    pub fn opposes(self, velocity: Vec2) -> bool {
        match self {
            Self::Top => velocity.y > 0.0,
            Self::Bottom => velocity.y < 0.0,
            Self::Left => velocity.x > 0.0,
            Self::Right => velocity.x < 0.0,
        }
    }
}

/// Penetration depths of a body into a platform, measured per face.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Penetration {
    top: f32,
    bottom: f32,
    left: f32,
    right: f32,
}

impl Penetration {
    /// Computes the depths when the rectangles overlap with positive area.
    #[must_use]
    pub fn between(body: &Aabb, platform: &Aabb) -> Option<Self> {
        if !body.overlaps(platform) {
            return None;
        }

        Some(Self {
            top: body.bottom() - platform.top(),
            bottom: platform.bottom() - body.top(),
            left: body.right() - platform.left(),
            right: platform.right() - body.left(),
        })
    }

    /// Depth through the given face.
    #[must_use]
    pub const fn depth(&self, side: ContactSide) -> f32 {
        match side {
            ContactSide::Top => self.top,
            ContactSide::Bottom => self.bottom,
            ContactSide::Left => self.left,
            ContactSide::Right => self.right,
        }
    }

    /// Smallest of the four depths.
    #[must_use]
    pub fn minimum(&self) -> f32 {
        self.top.min(self.bottom).min(self.left).min(self.right)
    }

    /// Face to resolve through for a body moving with `velocity`.
    ///
    /// Candidates are the faces of minimum depth in [`ContactSide::ORDER`];
    /// the first one the velocity points into wins.
    #[must_use]
    pub fn resolving_side(&self, velocity: Vec2) -> Option<ContactSide> {
        let minimum = self.minimum();
        ContactSide::ORDER
            .into_iter()
            .find(|side| self.depth(*side) == minimum && side.opposes(velocity))
    }
}

/// Summary of the contacts produced by one resolution pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Body landed on or rests on a platform top.
    pub landed: bool,
    /// Body hit a platform underside.
    pub bumped_head: bool,
    /// Side of the body that hit a wall, if any.
    pub blocked: Option<Facing>,
}

/// Decaying horizontal push applied on top of voluntary movement.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Knockback {
    force: f32,
    direction: f32,
}

/// Moving rectangle subject to gravity and platform collisions.
#[derive(Clone, Debug, PartialEq)]
pub struct KinematicBody {
    position: Vec2,
    velocity: Vec2,
    size: Vec2,
    grounded: bool,
    facing: Facing,
    wall_contact: Option<Facing>,
    knockback: Knockback,
    side_response: SideResponse,
}

impl KinematicBody {
    /// Creates a resting body with its upper-left corner at `position`.
    #[must_use]
    pub fn new(position: Vec2, size: Vec2, facing: Facing, side_response: SideResponse) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            size,
            grounded: false,
            facing,
            wall_contact: None,
            knockback: Knockback::default(),
            side_response,
        }
    }

    /// Upper-left corner of the body.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Velocity per nominal frame.
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Dimensions of the bounding box.
    #[must_use]
    pub const fn size(&self) -> Vec2 {
        self.size
    }

    /// Bounding box derived from the current position and size.
    #[must_use]
    pub const fn aabb(&self) -> Aabb {
        Aabb::new(self.position, self.size)
    }

    /// Centre of the bounding box.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }

    /// Reports whether the last resolution left the body on a platform top.
    #[must_use]
    pub const fn grounded(&self) -> bool {
        self.grounded
    }

    /// Current facing.
    #[must_use]
    pub const fn facing(&self) -> Facing {
        self.facing
    }

    /// Side of the wall the body is sliding against.
    #[must_use]
    pub const fn wall_contact(&self) -> Option<Facing> {
        self.wall_contact
    }

    /// Reports whether knockback is still pushing the body.
    #[must_use]
    pub fn is_knocked_back(&self) -> bool {
        self.knockback.force > 0.0
    }

    /// Replaces the horizontal velocity.
    pub fn set_horizontal_velocity(&mut self, vx: f32) {
        self.velocity.x = vx;
    }

    /// Replaces the vertical velocity; upward launches leave the ground.
    pub fn set_vertical_velocity(&mut self, vy: f32) {
        self.velocity.y = vy;
        if vy < 0.0 {
            self.grounded = false;
            self.wall_contact = None;
        }
    }

    /// Adds an instantaneous velocity change.
    pub fn add_velocity(&mut self, delta: Vec2) {
        self.velocity += delta;
        if delta.y < 0.0 {
            self.grounded = false;
        }
    }

    /// Turns the body.
    pub fn set_facing(&mut self, facing: Facing) {
        self.facing = facing;
    }

    /// Moves the body instantly; contacts are re-evaluated on the next pass.
    pub fn teleport(&mut self, position: Vec2) {
        self.position = position;
        self.grounded = false;
        self.wall_contact = None;
    }

    /// Starts a decaying horizontal push.
    pub fn apply_knockback(&mut self, force: f32, direction: Facing) {
        self.knockback = Knockback {
            force: force.max(0.0),
            direction: direction.sign(),
        };
    }

    /// Applies knockback and gravity, then moves the body by its velocity.
    ///
    /// Gravity only accumulates while the body is airborne and the fall speed
    /// is clamped to the configured terminal velocity.
    pub fn integrate(&mut self, dt: Duration, config: &Config) {
        let frames = frame_scale(dt);

        if self.knockback.force > 0.0 {
            self.velocity.x += self.knockback.direction * self.knockback.force;
            self.knockback.force *= config.knockback_decay;
            if self.knockback.force < config.knockback_floor {
                self.knockback.force = 0.0;
            }
        }

        if !self.grounded {
            self.velocity.y = (self.velocity.y + config.gravity * frames).min(config.max_fall_speed);
        }

        self.position += self.velocity * frames;
    }

    /// Pushes the body out of every overlapping platform.
    ///
    /// Each overlap resolves through the face of minimum penetration, ties
    /// broken top, bottom, left, right, and only when the body moves into that
    /// face. The resolved velocity component is zeroed.
    pub fn resolve_against_platforms(&mut self, platforms: &[Aabb], config: &Config) -> Resolution {
        self.grounded = false;
        self.wall_contact = None;
        let mut resolution = Resolution::default();

        for platform in platforms {
            let Some(penetration) = Penetration::between(&self.aabb(), platform) else {
                continue;
            };
            let Some(side) = penetration.resolving_side(self.velocity) else {
                continue;
            };
            self.resolve_side(side, platform, config, &mut resolution);
        }

        if !self.grounded
            && self.velocity.y >= 0.0
            && platforms.iter().any(|platform| self.rests_on(platform))
        {
            self.grounded = true;
            self.velocity.y = 0.0;
            resolution.landed = true;
        }

        resolution
    }

    fn resolve_side(
        &mut self,
        side: ContactSide,
        platform: &Aabb,
        config: &Config,
        resolution: &mut Resolution,
    ) {
        match side {
            ContactSide::Top => {
                self.position.y = platform.top() - self.size.y;
                self.velocity.y = 0.0;
                self.grounded = true;
                resolution.landed = true;
            }
            ContactSide::Bottom => {
                self.position.y = platform.bottom();
                self.velocity.y = 0.0;
                resolution.bumped_head = true;
            }
            ContactSide::Left => {
                self.position.x = platform.left() - self.size.x;
                self.velocity.x = 0.0;
                self.touch_wall(Facing::Right, config);
                resolution.blocked = Some(Facing::Right);
            }
            ContactSide::Right => {
                self.position.x = platform.right();
                self.velocity.x = 0.0;
                self.touch_wall(Facing::Left, config);
                resolution.blocked = Some(Facing::Left);
            }
        }
    }

    fn touch_wall(&mut self, wall: Facing, config: &Config) {
        match self.side_response {
            SideResponse::TurnAround => self.facing = wall.flipped(),
            SideResponse::WallSlide => {
                if !self.grounded && self.velocity.y > 0.0 {
                    self.wall_contact = Some(wall);
                    self.velocity.y *= config.wall_slide_damping;
                }
            }
        }
    }

    fn rests_on(&self, platform: &Aabb) -> bool {
        let body = self.aabb();
        (body.bottom() - platform.top()).abs() <= SUPPORT_TOLERANCE
            && body.left() < platform.right()
            && platform.left() < body.right()
    }

    /// Keeps a grounded body at least `margin` away from its home platform's edges.
    ///
    /// Returns `true` when the body had to turn around.
    pub fn confine_to_platform(&mut self, platform: &Aabb, margin: f32) -> bool {
        if !self.grounded || !self.rests_on(platform) {
            return false;
        }

        if self.position.x <= platform.left() + margin {
            self.position.x = platform.left() + margin;
            self.facing = Facing::Right;
            self.velocity.x = 0.0;
            true
        } else if self.position.x + self.size.x >= platform.right() - margin {
            self.position.x = platform.right() - margin - self.size.x;
            self.facing = Facing::Left;
            self.velocity.x = 0.0;
            true
        } else {
            false
        }
    }

    /// Clamps the body horizontally inside `min_x..=max_x`.
    ///
    /// Returns `true` when the body was clamped.
    pub fn clamp_horizontal(&mut self, min_x: f32, max_x: f32) -> bool {
        if self.position.x < min_x {
            self.position.x = min_x;
            self.velocity.x = 0.0;
            self.facing = Facing::Right;
            true
        } else if self.position.x + self.size.x > max_x {
            self.position.x = max_x - self.size.x;
            self.velocity.x = 0.0;
            self.facing = Facing::Left;
            true
        } else {
            false
        }
    }
}
