//! Per-archetype boss tuning: phase thresholds, phase buffs and special sets.

use std::time::Duration;

use elemental_arena_core::Archetype;

/// Stat changes applied when a boss completes the transition into a phase.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseBuff {
    /// Multiplier applied to the current damage.
    pub damage_multiplier: f32,
    /// Multiplier applied to the current speed.
    pub speed_multiplier: f32,
    /// Special interval from this phase on.
    pub special_interval: Duration,
}

/// Scripted special attacks a boss may perform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Special {
    /// Three jittered lava balls aimed at the target.
    LavaBalls,
    /// Lava falling from the top of the arena for a while.
    LavaRain,
    /// Spin that releases a knockback pulse.
    TornadoSpin,
    /// Teleport into a ring around the target.
    Teleport,
    /// Charge up, then release a growing push vortex.
    MegaTornado,
    /// Telegraphed eruption zones across the floor.
    LavaEruption,
    /// Lava balls and a spin, followed by a delayed teleport.
    Combo,
    /// Radial burst of water bolts.
    WaterBarrage,
    /// Telegraphed lightning strikes across the arena.
    ThunderStorm,
    /// Pulling vortex under the target.
    Whirlpool,
    /// Rising wall of water along the floor.
    MiniTsunami,
    /// Three walls of water sweeping across the arena.
    MegaTsunami,
}

/// Tuning of one boss archetype.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BossProfile {
    thresholds: &'static [f32],
    special_interval: Duration,
    buffs: &'static [PhaseBuff],
    specials: &'static [&'static [Special]],
}

const LAVA_TORNADO: BossProfile = BossProfile {
    thresholds: &[0.66, 0.33, 0.0],
    special_interval: Duration::from_secs(3),
    buffs: &[
        PhaseBuff {
            damage_multiplier: 1.3,
            speed_multiplier: 1.2,
            special_interval: Duration::from_millis(2_500),
        },
        PhaseBuff {
            damage_multiplier: 1.5,
            speed_multiplier: 1.4,
            special_interval: Duration::from_secs(2),
        },
    ],
    specials: &[
        &[Special::LavaBalls],
        &[Special::LavaRain, Special::TornadoSpin, Special::Teleport],
        &[Special::MegaTornado, Special::LavaEruption, Special::Combo],
    ],
};

const TSUNAMI: BossProfile = BossProfile {
    thresholds: &[0.66, 0.33, 0.0],
    special_interval: Duration::from_secs(3),
    buffs: &[],
    specials: &[
        &[Special::WaterBarrage],
        &[Special::ThunderStorm, Special::Whirlpool, Special::MiniTsunami],
        &[Special::MegaTsunami],
    ],
};

const SNIPER: BossProfile = BossProfile {
    thresholds: &[],
    special_interval: Duration::from_secs(3),
    buffs: &[],
    specials: &[],
};

impl BossProfile {
    /// Profile of a boss archetype, or `None` for minions.
    #[must_use]
    pub const fn of(archetype: Archetype) -> Option<Self> {
        match archetype {
            Archetype::BossLavaTornado => Some(LAVA_TORNADO),
            Archetype::BossTsunami => Some(TSUNAMI),
            Archetype::BossSniper => Some(SNIPER),
            Archetype::Lava | Archetype::Water | Archetype::Tornado => None,
        }
    }

    /// Health fractions at which the boss advances phase.
    #[must_use]
    pub const fn thresholds(&self) -> &'static [f32] {
        self.thresholds
    }

    /// Special interval in the first phase.
    #[must_use]
    pub const fn special_interval(&self) -> Duration {
        self.special_interval
    }

    /// Buff applied on entering `phase`, if any.
    #[must_use]
    pub fn buff(&self, phase: u8) -> Option<PhaseBuff> {
        let index = usize::from(phase).checked_sub(2)?;
        self.buffs.get(index).copied()
    }

    /// Specials available in `phase`; the last set repeats for later phases.
    #[must_use]
    pub fn specials(&self, phase: u8) -> &'static [Special] {
        let index = usize::from(phase.max(1)) - 1;
        self.specials
            .get(index)
            .or_else(|| self.specials.last())
            .copied()
            .unwrap_or(&[])
    }
}
