#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Timed status effects and the speed multiplier they impose.

use std::time::Duration;

use elemental_arena_core::{SimTime, StatusEffectSpec, StatusKind};

/// Single timed modifier attached to a combatant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatusEffect {
    kind: StatusKind,
    intensity: f32,
    duration: Duration,
    started: SimTime,
}

impl StatusEffect {
    /// Creates an effect starting at `started`; intensity is clamped to `0.0..=1.0`.
    #[must_use]
    pub fn new(kind: StatusKind, duration: Duration, intensity: f32, started: SimTime) -> Self {
        Self {
            kind,
            intensity: intensity.clamp(0.0, 1.0),
            duration,
            started,
        }
    }

    /// Kind of the effect.
    #[must_use]
    pub const fn kind(&self) -> StatusKind {
        self.kind
    }

    /// Strength of the effect.
    #[must_use]
    pub const fn intensity(&self) -> f32 {
        self.intensity
    }

    /// Reports whether the effect is still running at `now`.
    #[must_use]
    pub fn is_active(&self, now: SimTime) -> bool {
        now.since(self.started) < self.duration
    }

    /// Speed multiplier contributed by the effect while active.
    #[must_use]
    pub fn speed_modifier(&self) -> f32 {
        match self.kind {
            StatusKind::Slow => 1.0 - self.intensity,
            StatusKind::Paralysis => 0.0,
        }
    }
}

/// Collection of effects attached to one combatant.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatusEffects {
    effects: Vec<StatusEffect>,
}

impl StatusEffects {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new effect. Effects of the same kind stack side by side.
    pub fn add(&mut self, spec: StatusEffectSpec, now: SimTime) {
        self.effects.push(StatusEffect::new(
            spec.kind,
            spec.duration,
            spec.intensity,
            now,
        ));
    }

    /// Drops every effect that expired by `now`.
    pub fn purge(&mut self, now: SimTime) {
        self.effects.retain(|effect| effect.is_active(now));
    }

    /// Purges expired effects and folds the rest into a multiplier in `0.0..=1.0`.
    ///
    /// The most restrictive effect wins; no effects yields exactly `1.0`.
    pub fn speed_multiplier(&mut self, now: SimTime) -> f32 {
        self.purge(now);
        self.effects
            .iter()
            .fold(1.0_f32, |multiplier, effect| {
                multiplier.min(effect.speed_modifier())
            })
            .clamp(0.0, 1.0)
    }

    /// Reports whether an effect of `kind` is attached.
    #[must_use]
    pub fn has(&self, kind: StatusKind) -> bool {
        self.effects.iter().any(|effect| effect.kind == kind)
    }

    /// Number of attached effects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Reports whether no effect is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Iterator over the attached effects in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    /// Removes every effect.
    pub fn clear(&mut self) {
        self.effects.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_effects_yield_full_speed() {
        let mut effects = StatusEffects::new();
        assert_eq!(effects.speed_multiplier(SimTime::ZERO), 1.0);
    }

    #[test]
    fn most_restrictive_effect_wins() {
        let mut effects = StatusEffects::new();
        effects.add(slow(0.3, 5), SimTime::ZERO);
        effects.add(slow(0.6, 5), SimTime::ZERO);
        let multiplier = effects.speed_multiplier(at_millis(100));
        assert!((multiplier - 0.4).abs() < 1e-6);
        assert_eq!(effects.len(), 2, "slows stack instead of merging");
    }

    #[test]
    fn paralysis_stops_movement_until_it_expires() {
        let mut effects = StatusEffects::new();
        effects.add(StatusEffectSpec::PARALYSIS, SimTime::ZERO);
        effects.add(slow(0.5, 10), SimTime::ZERO);

        assert_eq!(effects.speed_multiplier(at_millis(1_999)), 0.0);
        assert_eq!(effects.speed_multiplier(at_millis(2_000)), 0.5);
        assert!(!effects.has(StatusKind::Paralysis), "expired effects are purged");
    }

    #[test]
    fn out_of_range_intensity_is_clamped() {
        let mut effects = StatusEffects::new();
        effects.add(slow(1.7, 5), SimTime::ZERO);
        effects.add(slow(-0.4, 5), SimTime::ZERO);
        assert_eq!(effects.speed_multiplier(SimTime::ZERO), 0.0);
        assert!(effects.iter().all(|effect| (0.0..=1.0).contains(&effect.intensity())));
    }

    #[test]
    fn multiplier_stays_within_bounds_for_mixed_stacks() {
        let mut effects = StatusEffects::new();
        let mut seed = 0x9e37_79b9_u32;
        for step in 0..64_u64 {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let intensity = (seed >> 8) as f32 / (1u32 << 24) as f32 * 1.5 - 0.25;
            let kind = if seed % 5 == 0 {
                StatusKind::Paralysis
            } else {
                StatusKind::Slow
            };
            effects.add(
                StatusEffectSpec {
                    kind,
                    duration: Duration::from_millis(u64::from(seed % 3_000)),
                    intensity,
                },
                at_millis(step * 50),
            );

            let multiplier = effects.speed_multiplier(at_millis(step * 50 + 25));
            assert!((0.0..=1.0).contains(&multiplier), "multiplier {multiplier}");
        }
    }

    fn slow(intensity: f32, seconds: u64) -> StatusEffectSpec {
        StatusEffectSpec {
            kind: StatusKind::Slow,
            duration: Duration::from_secs(seconds),
            intensity,
        }
    }

    fn at_millis(millis: u64) -> SimTime {
        SimTime::from_duration(Duration::from_millis(millis))
    }
}
