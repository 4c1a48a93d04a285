//! Sphere controller behaviour over short step sequences

use glam::{Vec2, Vec3};
use hecs::Entity;
use planetoid_engine::prelude::*;
use tracing::info;

const DT: f32 = 1.0 / 60.0;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Physics double with an optional floor under every probe
#[derive(Default)]
struct ScriptedPhysics {
    floor: Option<ProbeHit>,
    platform: Option<(Entity, BodyInfo)>,
}

impl PhysicsQueries for ScriptedPhysics {
    fn probe(&self, query: &ProbeQuery) -> Option<ProbeHit> {
        self.floor.filter(|hit| hit.distance <= query.max_distance)
    }

    fn body_info(&self, body: Entity) -> Option<BodyInfo> {
        self.platform
            .filter(|(entity, _)| *entity == body)
            .map(|(_, info)| info)
    }
}

fn floor_contact() -> ContactReport {
    ContactReport::with_static(Vec3::Y, 0)
}

/// Run one controller step at the origin with the given contacts
fn step(
    body: &mut SphereBody,
    contacts: &[ContactReport],
    velocity: Vec3,
    ctx: &mut StepContext<'_>,
) -> StepReport {
    for contact in contacts {
        body.accumulate_contact(contact);
    }
    let report = body.step(
        &Transform::default(),
        &Rigidbody::default().with_velocity(velocity),
        ctx,
        DT,
    );
    info!(
        "state={} velocity={:?} events={:?}",
        report.state, report.velocity, report.events
    );
    report
}

#[test]
fn test_resting_on_flat_floor_keeps_still() {
    init_tracing();

    let mut world = PhysicsWorld::new();
    world.spawn_static(
        Transform::default(),
        Collider::box_collider(Vec3::new(10.0, 0.5, 10.0)),
    );
    let ball = world.spawn_body(
        Transform::from_position(Vec3::new(0.0, 1.0, 0.0)),
        Rigidbody::dynamic(1.0),
        Collider::sphere(0.5),
    );

    let field = GravityField::new();
    let mut body = SphereBody::default().with_collider(ball);

    for frame in 0..30 {
        for contact in world.contacts_for(ball) {
            body.accumulate_contact(&contact);
        }
        let (Some(transform), Some(rigidbody)) = (world.transform(ball), world.rigidbody(ball))
        else {
            panic!("Ball should have a body");
        };

        let report = {
            let mut ctx = StepContext::new(&field, &world);
            body.step(&transform, &rigidbody, &mut ctx, DT)
        };
        assert_eq!(report.state, StateLabel::Grounded, "Frame {}", frame);
        assert_eq!(report.velocity.x, 0.0);
        assert_eq!(report.velocity.z, 0.0);

        world.set_velocity(ball, report.velocity);
        world.integrate(DT);

        let velocity = world.rigidbody(ball).map(|rb| rb.linear_velocity);
        let position = world.transform(ball).map(|t| t.position);
        info!("Frame {}: position={:?} velocity={:?}", frame, position, velocity);
        let velocity = velocity.unwrap_or(Vec3::NAN);
        assert!(
            velocity.length() < 1e-4,
            "Resting ball should not move, got {:?}",
            velocity
        );
    }

    let position = world.transform(ball).map(|t| t.position.y).unwrap_or(f32::NAN);
    assert!((position - 1.0).abs() < 0.01, "Ball sank to {}", position);
}

#[test]
fn test_ground_beats_steep_contact() {
    init_tracing();

    let field = GravityField::new();
    let physics = ScriptedPhysics::default();
    let mut ctx = StepContext::new(&field, &physics);
    let mut body = SphereBody::default();

    let contacts = [floor_contact(), ContactReport::with_static(Vec3::X, 0)];
    let report = step(&mut body, &contacts, Vec3::ZERO, &mut ctx);

    assert_eq!(report.state, StateLabel::Grounded);
    assert_eq!(body.status().last_contact_normal, Vec3::Y);
    assert_eq!(body.status().last_steep_normal, Vec3::X);
    assert_eq!(
        report.transitions().collect::<Vec<_>>(),
        vec![(StateLabel::Default, StateLabel::Grounded)]
    );
}

#[test]
fn test_snaps_to_floor_after_leaving_ledge() {
    init_tracing();

    let mut scratch = hecs::World::new();
    let platform = scratch.spawn(());
    let own_collider = scratch.spawn(());

    let field = GravityField::new();
    let physics = ScriptedPhysics {
        floor: Some(ProbeHit {
            normal: Vec3::Y,
            distance: 0.6,
            point: Vec3::new(0.0, -0.6, 0.0),
            body: Some(platform),
            collider: platform,
            layer: 0,
        }),
        platform: Some((
            platform,
            BodyInfo {
                transform: Transform::from_position(Vec3::new(0.0, -1.0, 0.0)),
                mass: 1.0,
                is_kinematic: true,
            },
        )),
    };
    let mut ctx = StepContext::new(&field, &physics);
    let mut body = SphereBody::default().with_collider(own_collider);

    for _ in 0..5 {
        step(&mut body, &[floor_contact()], Vec3::ZERO, &mut ctx);
    }
    assert_eq!(body.state(), StateLabel::Grounded);

    // Moving up and sideways over the edge, no contacts this step
    let velocity = Vec3::new(3.0, 1.0, 0.0);
    let report = step(&mut body, &[], velocity, &mut ctx);

    assert_eq!(report.state, StateLabel::Grounded);
    assert_eq!(
        report.transitions().collect::<Vec<_>>(),
        vec![
            (StateLabel::Grounded, StateLabel::InAir),
            (StateLabel::InAir, StateLabel::Grounded),
        ]
    );
    assert_eq!(report.connected_body, Some(platform));
    assert_eq!(body.jump_phase(), 0);
    assert_eq!(body.status().steps_since_last_grounded, 0);

    // The upward part was removed, speed kept, then the usual
    // deceleration and gravity applied
    let snapped_speed = velocity.length();
    let decel = body.params().config.max_acceleration * DT;
    assert!(
        (report.velocity.x - (snapped_speed - decel)).abs() < 1e-3,
        "Unexpected horizontal velocity {:?}",
        report.velocity
    );
    assert!((report.velocity.y + 9.81 * DT).abs() < 1e-3);
}

#[test]
fn test_no_snap_right_after_jump() {
    init_tracing();

    let mut scratch = hecs::World::new();
    let floor_entity = scratch.spawn(());
    let field = GravityField::new();
    let physics = ScriptedPhysics {
        floor: Some(ProbeHit {
            normal: Vec3::Y,
            distance: 0.2,
            point: Vec3::ZERO,
            body: None,
            collider: floor_entity,
            layer: 0,
        }),
        platform: None,
    };
    let mut ctx = StepContext::new(&field, &physics);
    let mut body = SphereBody::default();

    for _ in 0..3 {
        step(&mut body, &[floor_contact()], Vec3::ZERO, &mut ctx);
    }
    body.set_input(Vec2::ZERO, false, true);
    let report = step(&mut body, &[floor_contact()], Vec3::ZERO, &mut ctx);
    assert!(report.jumped());

    let report = step(&mut body, &[], report.velocity, &mut ctx);
    assert_eq!(report.state, StateLabel::InAir, "Jump must not snap back");
}

#[test]
fn test_refused_jump_changes_nothing() {
    init_tracing();

    let field = GravityField::new();
    let physics = ScriptedPhysics::default();

    let run = |jump: bool| {
        let mut pool = StaminaPool::without_regen(100.0);
        pool.deduct(100.0);
        let mut ctx = StepContext::new(&field, &physics).with_stamina(&mut pool);
        let mut body = SphereBody::default();
        for _ in 0..3 {
            step(&mut body, &[floor_contact()], Vec3::ZERO, &mut ctx);
        }
        body.set_input(Vec2::new(0.5, 0.0), false, jump);
        let report = step(&mut body, &[floor_contact()], Vec3::ZERO, &mut ctx);
        (report, body.jump_phase(), body.status().steps_since_last_jump)
    };

    let (with_jump, phase, steps_since_jump) = run(true);
    let (without_jump, expected_phase, expected_steps) = run(false);

    assert!(!with_jump.jumped());
    assert_eq!(with_jump.velocity, without_jump.velocity);
    assert_eq!(phase, expected_phase);
    assert_eq!(steps_since_jump, expected_steps);
}

#[test]
fn test_air_jumps_are_capped() {
    init_tracing();

    let config = SphereConfig {
        max_air_jumps: 1,
        ..Default::default()
    };
    let field = GravityField::new();
    let physics = ScriptedPhysics::default();
    let mut ctx = StepContext::new(&field, &physics);
    let mut body = SphereBody::new(SphereParams::new(config));

    for _ in 0..3 {
        step(&mut body, &[floor_contact()], Vec3::ZERO, &mut ctx);
    }

    let mut velocity = Vec3::ZERO;
    let mut jumps = 0;
    let mut contacts = vec![floor_contact()];
    for _ in 0..20 {
        body.set_input(Vec2::ZERO, false, true);
        let report = step(&mut body, &contacts, velocity, &mut ctx);
        if report.jumped() {
            jumps += 1;
        }
        velocity = report.velocity;
        contacts.clear();
    }

    assert_eq!(jumps, 2, "One ground jump plus one air jump");
    assert_eq!(body.jump_phase(), 2);
}

#[test]
fn test_first_air_jump_after_falling_counts_twice() {
    init_tracing();

    let config = SphereConfig {
        max_air_jumps: 1,
        ..Default::default()
    };
    let field = GravityField::new();
    let physics = ScriptedPhysics::default();
    let mut ctx = StepContext::new(&field, &physics);
    let mut body = SphereBody::new(SphereParams::new(config));

    for _ in 0..3 {
        step(&mut body, &[floor_contact()], Vec3::ZERO, &mut ctx);
    }
    // Walk off the edge, nothing to snap to
    let mut velocity = Vec3::new(2.0, 0.0, 0.0);
    for _ in 0..3 {
        velocity = step(&mut body, &[], velocity, &mut ctx).velocity;
    }
    assert_eq!(body.state(), StateLabel::InAir);
    assert_eq!(body.jump_phase(), 0);

    body.set_input(Vec2::ZERO, false, true);
    let report = step(&mut body, &[], velocity, &mut ctx);
    assert!(report.jumped());
    assert!(report.events.iter().any(|event| matches!(
        event,
        LocomotionEvent::Jumped { phase: 2, .. }
    )));

    body.set_input(Vec2::ZERO, false, true);
    let report = step(&mut body, &[], report.velocity, &mut ctx);
    assert!(!report.jumped(), "Air jump already used");
}

#[test]
fn test_climbing_drains_stamina() {
    init_tracing();

    let field = GravityField::new();
    let physics = ScriptedPhysics::default();
    let mut pool = StaminaPool::without_regen(100.0);
    let mut body = SphereBody::default();
    let wall = ContactReport::with_static(Vec3::X, 0);

    {
        let mut ctx = StepContext::new(&field, &physics).with_stamina(&mut pool);
        for _ in 0..3 {
            step(&mut body, &[floor_contact()], Vec3::ZERO, &mut ctx);
        }

        body.set_input(Vec2::ZERO, true, false);
        let report = step(&mut body, &[wall], Vec3::ZERO, &mut ctx);
        assert_eq!(report.state, StateLabel::Climbing);
        // Grip pulls into the wall instead of gravity pulling down
        assert!(report.velocity.x < 0.0);
        assert_eq!(report.velocity.y, 0.0);
    }
    assert_eq!(pool.current(), 90.0, "Drain fires once on enter");
    assert_eq!(pool.modifier_count(), 1);

    pool.tick(0.1);
    assert_eq!(pool.current(), 80.0);

    {
        let mut ctx = StepContext::new(&field, &physics).with_stamina(&mut pool);
        body.set_input(Vec2::ZERO, false, false);
        let report = step(&mut body, &[wall], Vec3::ZERO, &mut ctx);
        assert_eq!(report.state, StateLabel::OnSteep);
    }
    assert_eq!(pool.modifier_count(), 0, "Drain removed on exit");
}

#[test]
fn test_exhausted_sphere_cannot_climb() {
    init_tracing();

    let field = GravityField::new();
    let physics = ScriptedPhysics::default();
    let mut pool = StaminaPool::without_regen(100.0);
    pool.deduct(100.0);
    let mut ctx = StepContext::new(&field, &physics).with_stamina(&mut pool);
    let mut body = SphereBody::default();

    for _ in 0..3 {
        step(&mut body, &[floor_contact()], Vec3::ZERO, &mut ctx);
    }
    body.set_input(Vec2::ZERO, true, false);
    let report = step(&mut body, &[ContactReport::with_static(Vec3::X, 0)], Vec3::ZERO, &mut ctx);
    assert_eq!(report.state, StateLabel::OnSteep);
}

#[test]
fn test_no_input_skips_planar_adjustment() {
    init_tracing();

    let field = GravityField::new();
    let physics = ScriptedPhysics::default();
    let mut ctx = StepContext::new(&field, &physics);
    let mut body = SphereBody::default();

    // Drifting sideways without input: air control brakes the drift
    let report = step(&mut body, &[], Vec3::new(1.5, -2.0, 0.5), &mut ctx);
    assert_eq!(report.state, StateLabel::InAir);
    assert!(report.velocity.x < 1.5);
    assert!(report.velocity.z < 0.5);

    // Nothing to adjust, but a straight fall is still capped
    let mut body = SphereBody::default();
    let max_fall_speed = body.params().config.max_fall_speed;
    let report = step(&mut body, &[], Vec3::new(0.0, -30.0, 0.0), &mut ctx);
    assert_eq!(report.velocity.x, 0.0);
    assert_eq!(report.velocity.z, 0.0);
    assert!((report.velocity.y - (-max_fall_speed - 9.81 * DT)).abs() < 1e-4);
}

#[test]
fn test_long_fall_without_input_reaches_terminal_speed() {
    init_tracing();

    let field = GravityField::new();
    let physics = ScriptedPhysics::default();
    let mut ctx = StepContext::new(&field, &physics);
    let mut body = SphereBody::default();
    let max_fall_speed = body.params().config.max_fall_speed;

    let mut velocity = Vec3::new(0.0, -5.0, 0.0);
    for _ in 0..300 {
        velocity = step(&mut body, &[], velocity, &mut ctx).velocity;
        // Gravity is added after the cap
        assert!(
            velocity.length() <= max_fall_speed + 9.81 * DT + 1e-4,
            "Fall speed uncapped: {}",
            velocity.length()
        );
    }
    assert_eq!(body.state(), StateLabel::InAir);
    assert!(velocity.y < -max_fall_speed + 1e-3);
}

#[test]
fn test_kinematic_platform_carries_sphere() {
    init_tracing();

    let mut world = PhysicsWorld::new();
    let platform_velocity = Vec3::new(2.0, 0.0, 0.0);
    let platform = world.spawn_body(
        Transform::default(),
        Rigidbody::kinematic().with_velocity(platform_velocity),
        Collider::box_collider(Vec3::new(10.0, 0.5, 10.0)),
    );
    let ball = world.spawn_body(
        Transform::from_position(Vec3::new(0.0, 1.0, 0.0)),
        Rigidbody::dynamic(1.0),
        Collider::sphere(0.5),
    );

    let field = GravityField::new();
    let mut body = SphereBody::default().with_collider(ball);

    let mut last = None;
    for _ in 0..120 {
        for contact in world.contacts_for(ball) {
            body.accumulate_contact(&contact);
        }
        let (Some(transform), Some(rigidbody)) = (world.transform(ball), world.rigidbody(ball))
        else {
            panic!("Ball should have a body");
        };
        let report = {
            let mut ctx = StepContext::new(&field, &world);
            body.step(&transform, &rigidbody, &mut ctx, DT)
        };
        world.set_velocity(ball, report.velocity);
        world.integrate(DT);
        last = Some(report);
    }

    let report = last.expect("No steps ran");
    info!(
        "velocity={:?} connection={:?}",
        report.velocity,
        body.status().last_connection_velocity
    );
    assert_eq!(report.state, StateLabel::Grounded);
    assert_eq!(report.connected_body, Some(platform));
    assert!(
        (body.status().last_connection_velocity - platform_velocity).length() < 1e-2,
        "Connection velocity {:?}",
        body.status().last_connection_velocity
    );
    assert!(
        (report.velocity.x - platform_velocity.x).abs() < 1e-2,
        "Sphere did not ride along: {:?}",
        report.velocity
    );
    assert!(report.velocity.z.abs() < 1e-4);
}

/// Stand on a body sliding along +X at 2 m/s and return the tracked connection velocity
fn ride_on_body(info: BodyInfo) -> Vec3 {
    let mut scratch = hecs::World::new();
    let other = scratch.spawn(());
    let field = GravityField::new();
    let mut body = SphereBody::default();

    for i in 0..4 {
        let physics = ScriptedPhysics {
            floor: None,
            platform: Some((
                other,
                BodyInfo {
                    transform: Transform::from_position(Vec3::new(
                        2.0 * DT * i as f32,
                        -1.0,
                        0.0,
                    )),
                    ..info
                },
            )),
        };
        let mut ctx = StepContext::new(&field, &physics);
        let contact = ContactReport::with_body(Vec3::Y, other, 0);
        let report = step(&mut body, &[contact], Vec3::ZERO, &mut ctx);
        assert_eq!(report.state, StateLabel::Grounded);
    }
    body.status().last_connection_velocity
}

#[test]
fn test_only_heavy_or_kinematic_bodies_carry_sphere() {
    init_tracing();

    let heavy = ride_on_body(BodyInfo {
        transform: Transform::default(),
        mass: 2.0,
        is_kinematic: false,
    });
    assert!((heavy - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-3, "Got {:?}", heavy);

    let kinematic = ride_on_body(BodyInfo {
        transform: Transform::default(),
        mass: 0.1,
        is_kinematic: true,
    });
    assert!((kinematic - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-3, "Got {:?}", kinematic);

    // Lighter than the sphere's 1 kg
    let light = ride_on_body(BodyInfo {
        transform: Transform::default(),
        mass: 0.5,
        is_kinematic: false,
    });
    assert_eq!(light, Vec3::ZERO);
}
