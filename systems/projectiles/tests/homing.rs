use std::time::Duration;

use elemental_arena_core::{Aabb, EntityId, Faction, Vec2, VolleySpec};
use elemental_arena_system_projectiles::{assign_targets, Projectile, Target};

#[test]
fn volley_locks_onto_the_boss_and_ignores_minions() {
    let boss = hostile(1, Vec2::new(600.0, 300.0), Vec2::new(120.0, 150.0), true);
    let minion = hostile(2, Vec2::new(200.0, 400.0), Vec2::new(50.0, 50.0), false);

    let spec = VolleySpec {
        count: 5,
        ..VolleySpec::default()
    };
    let shards = Projectile::volley(player(), Vec2::new(100.0, 500.0), &spec, &[boss, minion]);

    assert_eq!(shards.len(), 5);
    assert!(shards.iter().all(|shard| shard.target() == Some(boss.id)));
}

#[test]
fn lone_candidate_receives_the_whole_volley() {
    let minion = hostile(3, Vec2::new(200.0, 400.0), Vec2::new(50.0, 50.0), false);
    assert_eq!(assign_targets(4, &[minion]), vec![Some(minion.id); 4]);
}

#[test]
fn round_robin_covers_every_candidate() {
    for candidates in 2..=6_u32 {
        let roster: Vec<Target> = (0..candidates)
            .map(|index| {
                hostile(
                    index,
                    Vec2::new(100.0 + index as f32 * 60.0, 200.0),
                    Vec2::new(40.0, 40.0),
                    false,
                )
            })
            .collect();

        for count in candidates as usize..=12 {
            let assigned = assign_targets(count, &roster);
            assert_eq!(assigned.len(), count);
            for (index, target) in assigned.iter().enumerate() {
                assert_eq!(*target, Some(roster[index % roster.len()].id));
            }
            for candidate in &roster {
                assert!(
                    assigned.contains(&Some(candidate.id)),
                    "{count} shards skipped candidate {:?}",
                    candidate.id
                );
            }
        }
    }
}

#[test]
fn shards_reach_a_stationary_target_before_expiring() {
    let spec = VolleySpec::default();
    let bounds = Aabb::from_xywh(0.0, 0.0, 1_600.0, 800.0);
    let target = hostile(5, Vec2::new(1_100.0, 650.0), Vec2::new(50.0, 50.0), false);
    let mut shards = Projectile::volley(player(), Vec2::new(300.0, 600.0), &spec, &[target]);
    let dt = Duration::from_secs_f32(1.0 / 60.0);

    let mut hits = 0;
    let mut frames = 0;
    while shards.iter().any(Projectile::is_active) {
        frames += 1;
        assert!(frames <= 60 * 6 + 1, "shards outlived their lifetime");
        for shard in shards.iter_mut().filter(|shard| shard.is_active()) {
            shard.advance(dt, &bounds, &[target]);
            if shard.is_active() && shard.strike(&[target]) == Some(target.id) {
                hits += 1;
            }
        }
    }

    assert_eq!(hits, spec.count, "every shard reached the target");
}

#[test]
fn tracking_starts_only_after_the_ascent() {
    let spec = VolleySpec {
        count: 1,
        ..VolleySpec::default()
    };
    let bounds = Aabb::from_xywh(0.0, 0.0, 1_600.0, 800.0);
    let below = hostile(6, Vec2::new(400.0, 700.0), Vec2::new(50.0, 50.0), false);
    let origin = Vec2::new(400.0, 500.0);
    let mut shards = Projectile::volley(player(), origin, &spec, &[below]);
    let shard = &mut shards[0];
    let dt = Duration::from_secs_f32(1.0 / 60.0);

    for _ in 0..10 {
        shard.advance(dt, &bounds, &[below]);
    }

    assert!(shard.center().y < origin.y - 80.0, "climbs despite the target below");
}

fn hostile(index: u32, center: Vec2, size: Vec2, is_boss: bool) -> Target {
    Target {
        id: EntityId::new(index, 0),
        faction: Faction::Hostile,
        aabb: Aabb::centered(center, size),
        is_boss,
        health: if is_boss { 10_000.0 } else { 80.0 },
    }
}

fn player() -> EntityId {
    EntityId::new(100, 0)
}
