//! Aggregates the event stream of a headless run into a printable report.

use std::fmt;

use elemental_arena_core::{EntityId, Event, Role};

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Summary {
    player: Option<EntityId>,
    ticks: u64,
    hostiles_spawned: u32,
    spawns_rejected: u32,
    bosses_spawned: u32,
    bosses_defeated: u32,
    kills: u32,
    fell_out: u32,
    projectiles: u32,
    hazards: u32,
    phase_changes: u32,
    damage_dealt: f32,
    damage_taken: f32,
    player_lost_at: Option<u64>,
    cleared_at: Option<u64>,
}

impl Summary {
    pub(crate) fn record(&mut self, tick: u64, event: &Event) {
        match event {
            Event::TimeAdvanced { .. } => self.ticks = self.ticks.max(tick + 1),
            Event::Spawned {
                entity,
                role: Role::Player,
            } => self.player = Some(*entity),
            Event::Spawned { .. } => self.hostiles_spawned += 1,
            Event::SpawnRejected { .. } => self.spawns_rejected += 1,
            Event::BossSpawned { .. } => self.bosses_spawned += 1,
            Event::BossDefeated { .. } => self.bosses_defeated += 1,
            Event::Killed { role, .. } => {
                if *role == Role::Player {
                    self.player_lost_at = self.player_lost_at.or(Some(tick));
                } else {
                    self.kills += 1;
                }
            }
            Event::FellOut { role, .. } => {
                self.fell_out += 1;
                if *role == Role::Player {
                    self.player_lost_at = self.player_lost_at.or(Some(tick));
                }
            }
            Event::ProjectileLaunched { .. } => self.projectiles += 1,
            Event::HazardSpawned { .. } => self.hazards += 1,
            Event::PhaseChanged { .. } => self.phase_changes += 1,
            Event::Hit { target, amount, .. } => {
                if self.player == Some(*target) {
                    self.damage_taken += amount;
                } else {
                    self.damage_dealt += amount;
                }
            }
            Event::EncounterCleared => self.cleared_at = self.cleared_at.or(Some(tick)),
            _ => {}
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ticks: {}", self.ticks)?;
        writeln!(
            f,
            "hostiles: {} spawned, {} rejected, {} killed, {} fell out",
            self.hostiles_spawned, self.spawns_rejected, self.kills, self.fell_out
        )?;
        writeln!(
            f,
            "bosses: {} spawned, {} defeated, {} phase changes",
            self.bosses_spawned, self.bosses_defeated, self.phase_changes
        )?;
        writeln!(
            f,
            "projectiles: {}, hazards: {}",
            self.projectiles, self.hazards
        )?;
        writeln!(
            f,
            "damage: {:.0} dealt, {:.0} taken",
            self.damage_dealt, self.damage_taken
        )?;
        match self.player_lost_at {
            Some(tick) => writeln!(f, "player lost at tick {tick}")?,
            None => writeln!(f, "player survived")?,
        }
        match self.cleared_at {
            Some(tick) => write!(f, "encounter cleared at tick {tick}"),
            None => write!(f, "encounter not cleared"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use elemental_arena_core::{Archetype, HitSource, Vec2};

    #[test]
    fn splits_damage_between_the_player_and_hostiles() {
        let player = EntityId::new(0, 0);
        let hostile = EntityId::new(1, 0);
        let mut summary = Summary::default();

        summary.record(
            0,
            &Event::Spawned {
                entity: player,
                role: Role::Player,
            },
        );
        summary.record(
            3,
            &Event::Hit {
                target: hostile,
                attacker: Some(player),
                source: HitSource::Melee,
                amount: 40.0,
            },
        );
        summary.record(
            4,
            &Event::Hit {
                target: player,
                attacker: Some(hostile),
                source: HitSource::Contact,
                amount: 30.0,
            },
        );
        summary.record(
            5,
            &Event::Killed {
                entity: hostile,
                role: Role::Hostile(Archetype::Lava),
                position: Vec2::ZERO,
            },
        );

        assert_eq!(summary.damage_dealt, 40.0);
        assert_eq!(summary.damage_taken, 30.0);
        assert_eq!(summary.kills, 1);
        assert_eq!(summary.hostiles_spawned, 0);
        assert_eq!(summary.player_lost_at, None);
    }

    #[test]
    fn first_loss_and_clear_ticks_are_kept() {
        let mut summary = Summary::default();
        summary.record(10, &Event::EncounterCleared);
        summary.record(20, &Event::EncounterCleared);
        summary.record(
            30,
            &Event::FellOut {
                entity: EntityId::new(0, 0),
                role: Role::Player,
            },
        );

        assert_eq!(summary.cleared_at, Some(10));
        assert_eq!(summary.player_lost_at, Some(30));
        assert!(summary.to_string().ends_with("encounter cleared at tick 10"));
    }
}
