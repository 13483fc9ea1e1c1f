use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use elemental_arena_core::{
    Aabb, Archetype, Command, CombatantSnapshot, CombatantView, EntityId, Event, Role, SimTime,
    Vec2,
};
use elemental_arena_system_spawning::{Config, Spawning, Stage};
use elemental_arena_world::{self as world, query, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const GROUND: Aabb = Aabb::from_xywh(0.0, 700.0, 1_200.0, 100.0);

#[test]
fn emits_one_spawn_per_interval_for_large_dt() {
    let mut spawning = Spawning::new(Config::new(Duration::from_millis(500), 10));
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut commands = Vec::new();

    spawning.handle(
        &[advanced(Duration::from_secs(2), Duration::from_secs(2))],
        &CombatantView::default(),
        &[GROUND],
        &mut rng,
        &mut commands,
    );

    assert_eq!(commands.len(), 4, "expected one spawn per interval");
    for command in &commands {
        match command {
            Command::SpawnHostile {
                archetype,
                position,
                home_platform,
                health_multiplier,
                ..
            } => {
                assert!(Archetype::MINIONS.contains(archetype));
                assert_eq!(*home_platform, Some(GROUND));
                assert_eq!(position.y, GROUND.top() - archetype.stats().size().y);
                assert_eq!(*health_multiplier, 1.0);
            }
            other => panic!("unexpected command emitted: {other:?}"),
        }
    }
}

#[test]
fn no_spawn_before_full_interval_or_without_platforms() {
    let mut spawning = Spawning::new(Config::default());
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let mut commands = Vec::new();

    spawning.handle(
        &[advanced(Duration::from_secs(2), Duration::from_secs(2))],
        &CombatantView::default(),
        &[GROUND],
        &mut rng,
        &mut commands,
    );
    assert!(commands.is_empty(), "no spawn before full interval");

    spawning.handle(
        &[advanced(Duration::from_secs(1), Duration::from_secs(3))],
        &CombatantView::default(),
        &[],
        &mut rng,
        &mut commands,
    );
    assert!(commands.is_empty(), "nothing to stand on");
}

#[test]
fn spawns_keep_their_distance_from_the_player() {
    let mut world = World::default();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigurePlatforms {
            platforms: vec![GROUND],
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::SpawnPlayer {
            position: Vec2::new(580.0, 640.0),
        },
        &mut events,
    );
    let view = query::combatant_view(&world);
    let player_x = view.player().expect("player spawned").center().x;

    let mut spawning = Spawning::new(Config::new(Duration::from_millis(100), 1_000));
    let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
    let mut commands = Vec::new();
    spawning.handle(
        &[advanced(Duration::from_secs(5), Duration::from_secs(5))],
        &view,
        query::platforms(&world),
        &mut rng,
        &mut commands,
    );

    assert_eq!(commands.len(), 50);
    for command in commands {
        let Command::SpawnHostile {
            archetype,
            position,
            ..
        } = command
        else {
            panic!("unexpected command emitted: {command:?}");
        };
        let center = position.x + archetype.stats().size().x * 0.5;
        assert!(
            (center - player_x).abs() >= 150.0,
            "{archetype:?} spawned at {center} next to the player at {player_x}",
        );
        assert!(position.x >= GROUND.left() + 30.0);
    }
}

#[test]
fn boss_arrives_after_a_wave_of_kills_and_pauses_minions() {
    let mut spawning = Spawning::new(Config::default());
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut commands = Vec::new();

    let kills: Vec<Event> = (0..10).map(|index| killed(index, Archetype::Water)).collect();
    spawning.handle(
        &kills,
        &CombatantView::default(),
        &[GROUND],
        &mut rng,
        &mut commands,
    );

    assert_eq!(spawning.kills(), 10);
    assert_eq!(spawning.wave(), 2);
    assert_eq!(spawning.stage(), Stage::Boss { index: 0 });
    assert_eq!(bosses(&commands), vec![Archetype::BossLavaTornado]);

    commands.clear();
    spawning.handle(
        &[advanced(Duration::from_secs(10), Duration::from_secs(10))],
        &CombatantView::default(),
        &[GROUND],
        &mut rng,
        &mut commands,
    );
    assert!(commands.is_empty(), "regular spawning pauses during a boss");
}

#[test]
fn bosses_follow_each_other_after_a_delay_and_clear_the_encounter() {
    let mut spawning = Spawning::new(Config::new(Duration::from_secs(60), 10));
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let mut commands = Vec::new();
    let mut now = Duration::ZERO;

    let kills: Vec<Event> = (0..10).map(|index| killed(index, Archetype::Lava)).collect();
    spawning.handle(
        &kills,
        &CombatantView::default(),
        &[GROUND],
        &mut rng,
        &mut commands,
    );

    for (index, (fallen, next)) in [
        (Archetype::BossLavaTornado, Archetype::BossTsunami),
        (Archetype::BossTsunami, Archetype::BossSniper),
    ]
    .into_iter()
    .enumerate()
    {
        commands.clear();
        spawning.handle(
            &[boss_defeated(fallen)],
            &CombatantView::default(),
            &[GROUND],
            &mut rng,
            &mut commands,
        );
        assert!(matches!(
            spawning.stage(),
            Stage::Intermission { index: next_index, .. } if next_index == index + 1
        ));

        now += Duration::from_secs(2);
        spawning.handle(
            &[advanced(Duration::from_secs(2), now)],
            &CombatantView::default(),
            &[GROUND],
            &mut rng,
            &mut commands,
        );
        assert!(bosses(&commands).is_empty(), "boss arrived early");

        now += Duration::from_secs(1);
        spawning.handle(
            &[advanced(Duration::from_secs(1), now)],
            &CombatantView::default(),
            &[GROUND],
            &mut rng,
            &mut commands,
        );
        assert_eq!(bosses(&commands), vec![next]);
    }

    commands.clear();
    spawning.handle(
        &[boss_defeated(Archetype::BossSniper)],
        &CombatantView::default(),
        &[GROUND],
        &mut rng,
        &mut commands,
    );
    assert_eq!(commands, vec![Command::DeclareCleared]);
    assert_eq!(spawning.stage(), Stage::Cleared);
}

#[test]
fn boss_spawns_on_the_far_side_of_the_ground() {
    let mut spawning = Spawning::new(Config::default());
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let mut commands = Vec::new();
    let view = CombatantView::from_snapshots(vec![player_at(100.0)]);

    let kills: Vec<Event> = (0..10).map(|index| killed(index, Archetype::Tornado)).collect();
    spawning.handle(&kills, &view, &[GROUND], &mut rng, &mut commands);

    let Some(Command::SpawnHostile { position, .. }) = commands.first() else {
        panic!("expected the boss to spawn, got {commands:?}");
    };
    let size = Archetype::BossLavaTornado.stats().size();
    assert_eq!(position.x, GROUND.right() - 30.0 - size.x);
    assert_eq!(position.y, GROUND.top() - size.y);
}

#[test]
fn reset_restarts_the_schedule() {
    let mut spawning = Spawning::new(Config::default());
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut commands = Vec::new();

    let mut events: Vec<Event> = (0..10).map(|index| killed(index, Archetype::Lava)).collect();
    events.push(Event::WorldReset);
    spawning.handle(
        &events,
        &CombatantView::default(),
        &[],
        &mut rng,
        &mut commands,
    );

    assert_eq!(spawning.kills(), 0);
    assert_eq!(spawning.stage(), Stage::Minions);
    assert!(commands.is_empty());
}

#[test]
fn deterministic_replay_produces_identical_sequence() {
    let first = replay(scripted_commands(), 0x4d59_5df4_d0f3_3173);
    let second = replay(scripted_commands(), 0x4d59_5df4_d0f3_3173);

    assert!(!first.spawns.is_empty(), "replay spawned nothing");
    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
}

fn replay(commands: Vec<Command>, seed: u64) -> ReplayOutcome {
    let mut world = World::default();
    let mut spawning = Spawning::new(Config::new(Duration::from_millis(750), 10));
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut log = Vec::new();

    for command in commands {
        let mut events = Vec::new();
        world::apply(&mut world, command, &mut events);
        process_spawning(&mut world, &mut spawning, &mut rng, events, &mut log);
    }

    let combatants = query::combatant_view(&world)
        .iter()
        .map(CombatantState::from)
        .collect();

    ReplayOutcome {
        combatants,
        spawns: log,
    }
}

fn process_spawning(
    world: &mut World,
    spawning: &mut Spawning,
    rng: &mut ChaCha8Rng,
    pending_events: Vec<Event>,
    log: &mut Vec<SpawnRecord>,
) {
    let mut events = pending_events;

    loop {
        if events.is_empty() {
            break;
        }

        let view = query::combatant_view(world);
        let platforms = query::platforms(world).to_vec();
        let mut commands = Vec::new();
        spawning.handle(&events, &view, &platforms, rng, &mut commands);

        if commands.is_empty() {
            break;
        }

        events.clear();

        for command in commands {
            if let Command::SpawnHostile {
                archetype,
                position,
                ..
            } = command
            {
                log.push(SpawnRecord {
                    archetype,
                    x: position.x.to_bits(),
                    y: position.y.to_bits(),
                });
            }
            world::apply(world, command, &mut events);
        }
    }
}

fn scripted_commands() -> Vec<Command> {
    let mut commands = vec![
        Command::ConfigurePlatforms {
            platforms: vec![
                GROUND,
                Aabb::from_xywh(150.0, 520.0, 250.0, 20.0),
                Aabb::from_xywh(750.0, 420.0, 300.0, 20.0),
            ],
        },
        Command::SpawnPlayer {
            position: Vec2::new(560.0, 640.0),
        },
    ];
    commands.extend((0..240).map(|_| Command::Step {
        dt: Duration::from_millis(16),
    }));
    commands
}

fn advanced(dt: Duration, now: Duration) -> Event {
    Event::TimeAdvanced {
        dt,
        now: SimTime::ZERO.advanced(now),
    }
}

fn killed(index: u32, archetype: Archetype) -> Event {
    Event::Killed {
        entity: EntityId::new(index, 0),
        role: Role::Hostile(archetype),
        position: Vec2::ZERO,
    }
}

fn boss_defeated(archetype: Archetype) -> Event {
    Event::BossDefeated {
        entity: EntityId::new(99, 0),
        archetype,
        position: Vec2::ZERO,
    }
}

fn bosses(commands: &[Command]) -> Vec<Archetype> {
    commands
        .iter()
        .filter_map(|command| match command {
            Command::SpawnHostile { archetype, .. } if archetype.is_boss() => Some(*archetype),
            _ => None,
        })
        .collect()
}

fn player_at(x: f32) -> CombatantSnapshot {
    let mut world = World::default();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnPlayer {
            position: Vec2::new(x, 640.0),
        },
        &mut events,
    );
    query::player(&world).expect("player spawned")
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ReplayOutcome {
    combatants: Vec<CombatantState>,
    spawns: Vec<SpawnRecord>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct SpawnRecord {
    archetype: Archetype,
    x: u32,
    y: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct CombatantState {
    id: EntityId,
    role: Role,
    x: u32,
    y: u32,
}

impl From<&CombatantSnapshot> for CombatantState {
    fn from(snapshot: &CombatantSnapshot) -> Self {
        Self {
            id: snapshot.id,
            role: snapshot.role,
            x: snapshot.aabb.min().x.to_bits(),
            y: snapshot.aabb.min().y.to_bits(),
        }
    }
}
