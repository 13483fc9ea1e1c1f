//! Phase progression, invulnerability windows and the special-attack gate.

use std::time::Duration;

use elemental_arena_core::{BossStatus, Cooldown, Health, SimTime};

/// Fraction of incoming damage a boss takes while a transition animation runs.
pub const TRANSITION_DAMAGE_FACTOR: f32 = 0.3;

/// Default length of the phase transition animation.
pub const DEFAULT_TRANSITION: Duration = Duration::from_secs(2);

/// Outcome of a damage instance applied through [`PhaseController::take_damage`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DamageReport {
    /// Hit points actually removed.
    pub applied: f32,
    /// Phase entered when the damage crossed a threshold.
    pub transition: Option<u8>,
}

/// Tracks a boss through its health-threshold phases.
///
/// Crossing the next threshold starts a transition: the phase advances at
/// once, damage is ignored for the invulnerability window and scaled by
/// [`TRANSITION_DAMAGE_FACTOR`] for the rest of the animation. The phase index
/// never decreases.
#[derive(Clone, Debug, PartialEq)]
pub struct PhaseController {
    phase: u8,
    thresholds: Vec<f32>,
    transition_duration: Duration,
    invulnerable_window: Duration,
    transition: Option<Duration>,
}

impl PhaseController {
    /// Creates a controller whose invulnerability covers the whole transition.
    ///
    /// Only thresholds above zero start a transition, so the boss has one
    /// phase more than it has positive thresholds.
    #[must_use]
    pub fn new(thresholds: &[f32]) -> Self {
        Self::with_timing(thresholds, DEFAULT_TRANSITION, DEFAULT_TRANSITION)
    }

    /// Creates a controller with explicit transition and invulnerability
    /// durations. The window is capped at the transition length.
    #[must_use]
    pub fn with_timing(
        thresholds: &[f32],
        transition_duration: Duration,
        invulnerable_window: Duration,
    ) -> Self {
        let mut thresholds: Vec<f32> = thresholds
            .iter()
            .copied()
            .filter(|threshold| *threshold > 0.0)
            .collect();
        thresholds.sort_by(|a, b| b.total_cmp(a));

        Self {
            phase: 1,
            thresholds,
            transition_duration,
            invulnerable_window: invulnerable_window.min(transition_duration),
            transition: None,
        }
    }

    /// Current phase, starting at one.
    #[must_use]
    pub const fn phase(&self) -> u8 {
        self.phase
    }

    /// Number of phases the boss goes through.
    #[must_use]
    pub fn phase_count(&self) -> u8 {
        u8::try_from(self.thresholds.len() + 1).unwrap_or(u8::MAX)
    }

    /// Reports whether a transition animation is running.
    #[must_use]
    pub const fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// Reports whether damage is currently ignored.
    #[must_use]
    pub fn is_invulnerable(&self) -> bool {
        self.transition
            .is_some_and(|elapsed| elapsed < self.invulnerable_window)
    }

    /// Applies `amount` damage to `health`, starting a transition when the
    /// remaining fraction falls to the next threshold.
    pub fn take_damage(&mut self, health: &mut Health, amount: f32) -> DamageReport {
        if self.is_invulnerable() {
            return DamageReport::default();
        }

        let amount = if self.is_transitioning() {
            amount * TRANSITION_DAMAGE_FACTOR
        } else {
            amount
        };
        let applied = health.damage(amount);

        let mut report = DamageReport {
            applied,
            transition: None,
        };
        if self.is_transitioning() || health.is_depleted() {
            return report;
        }

        let crossed = self
            .thresholds
            .get(usize::from(self.phase) - 1)
            .is_some_and(|threshold| health.fraction() <= *threshold);
        if crossed {
            self.phase += 1;
            self.transition = Some(Duration::ZERO);
            report.transition = Some(self.phase);
        }
        report
    }

    /// Advances the transition timer, returning the phase whose transition
    /// completed during this step.
    pub fn update(&mut self, dt: Duration) -> Option<u8> {
        let elapsed = self.transition?.saturating_add(dt);
        if elapsed >= self.transition_duration {
            self.transition = None;
            Some(self.phase)
        } else {
            self.transition = Some(elapsed);
            None
        }
    }

    /// Captures the phase state for views.
    #[must_use]
    pub fn status(&self) -> BossStatus {
        BossStatus {
            phase: self.phase,
            phase_count: self.phase_count(),
            invulnerable: self.is_invulnerable(),
            transitioning: self.is_transitioning(),
        }
    }
}

/// Gate that releases at most one special attack per interval and stays
/// closed while the boss transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpecialScheduler {
    cooldown: Cooldown,
}

impl SpecialScheduler {
    /// Creates a scheduler whose first release comes one interval after `now`.
    #[must_use]
    pub fn starting_at(interval: Duration, now: SimTime) -> Self {
        let mut cooldown = Cooldown::new(interval);
        cooldown.trigger(now);
        Self { cooldown }
    }

    /// Minimum time between two specials.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.cooldown.period()
    }

    /// Replaces the interval, keeping the time of the last release.
    pub fn set_interval(&mut self, interval: Duration) {
        self.cooldown.set_period(interval);
    }

    /// Releases a special at `now` when the interval elapsed and the boss is
    /// not transitioning.
    pub fn poll(&mut self, now: SimTime, transitioning: bool) -> bool {
        !transitioning && self.cooldown.try_trigger(now)
    }
}
