use std::time::Duration;

use elemental_arena_core::{Aabb, Facing, Vec2};
use elemental_arena_system_physics::{
    Config, ContactSide, KinematicBody, Penetration, SideResponse,
};

#[test]
fn falling_body_lands_on_platform_top() {
    let platform = Aabb::from_xywh(0.0, 110.0, 50.0, 20.0);
    let mut body = KinematicBody::new(
        Vec2::new(0.0, 100.0),
        Vec2::new(20.0, 20.0),
        Facing::Right,
        SideResponse::WallSlide,
    );
    body.set_vertical_velocity(10.0);

    let resolution = body.resolve_against_platforms(&[platform], &Config::default());

    assert!(resolution.landed);
    assert!(body.grounded());
    assert_eq!(body.position().y, 90.0);
    assert_eq!(body.velocity().y, 0.0);
}

#[test]
fn resolution_removes_overlap_or_zeroes_resolved_axis() {
    let config = Config::default();
    let platforms = [
        Aabb::from_xywh(0.0, 300.0, 400.0, 40.0),
        Aabb::from_xywh(150.0, 180.0, 100.0, 20.0),
        Aabb::from_xywh(380.0, 0.0, 20.0, 300.0),
    ];

    let mut seed = 0x2545_f491_u32;
    for _ in 0..500 {
        let x = next_unit(&mut seed) * 420.0 - 20.0;
        let y = next_unit(&mut seed) * 320.0;
        let vx = next_unit(&mut seed) * 24.0 - 12.0;
        let vy = next_unit(&mut seed) * 40.0 - 20.0;

        let mut body = KinematicBody::new(
            Vec2::new(x, y),
            Vec2::new(20.0, 20.0),
            Facing::Right,
            SideResponse::WallSlide,
        );
        body.set_horizontal_velocity(vx);
        body.set_vertical_velocity(vy);

        let velocity = body.velocity();
        for platform in &platforms {
            let mut trial = body.clone();
            let Some(side) = Penetration::between(&trial.aabb(), platform)
                .and_then(|penetration| penetration.resolving_side(velocity))
            else {
                continue;
            };
            let _ = trial.resolve_against_platforms(std::slice::from_ref(platform), &config);

            let still_overlaps = trial.aabb().overlaps(platform);
            let axis_stopped = match side {
                ContactSide::Top | ContactSide::Bottom => trial.velocity().y == 0.0,
                ContactSide::Left | ContactSide::Right => trial.velocity().x == 0.0,
            };
            assert!(
                !still_overlaps && axis_stopped,
                "body at ({x}, {y}) moving ({vx}, {vy}) left inside {platform:?}"
            );
        }
    }
}

#[test]
fn bodies_dropped_from_any_height_come_to_rest_on_the_floor() {
    let config = Config::default();
    let floor = Aabb::from_xywh(-100.0, 500.0, 1000.0, 60.0);
    let dt = Duration::from_secs_f32(1.0 / 60.0);

    for start in (0..480).step_by(37) {
        let mut body = KinematicBody::new(
            Vec2::new(100.0, start as f32),
            Vec2::new(30.0, 20.0),
            Facing::Left,
            SideResponse::TurnAround,
        );

        for _ in 0..240 {
            body.integrate(dt, &config);
            let _ = body.resolve_against_platforms(&[floor], &config);
        }

        assert!(body.grounded(), "body dropped from {start} never landed");
        assert!((body.aabb().bottom() - floor.top()).abs() < 1e-3);
        assert!(!body.aabb().overlaps(&floor));
    }
}

#[test]
fn enclosed_body_resolves_deterministically() {
    let config = Config::default();
    let block = Aabb::from_xywh(0.0, 0.0, 100.0, 100.0);
    let spawn = || {
        let mut body = KinematicBody::new(
            Vec2::new(30.0, 40.0),
            Vec2::new(20.0, 20.0),
            Facing::Right,
            SideResponse::WallSlide,
        );
        body.set_horizontal_velocity(1.0);
        body.set_vertical_velocity(1.0);
        body
    };

    let mut first = spawn();
    let mut second = spawn();
    let _ = first.resolve_against_platforms(&[block], &config);
    let _ = second.resolve_against_platforms(&[block], &config);

    assert_eq!(first, second);
    assert_eq!(first.position().x, -20.0, "left face has minimum penetration");
    assert_eq!(first.velocity().x, 0.0);
}

fn next_unit(seed: &mut u32) -> f32 {
    *seed ^= *seed << 13;
    *seed ^= *seed >> 17;
    *seed ^= *seed << 5;
    (*seed >> 8) as f32 / (1u32 << 24) as f32
}
