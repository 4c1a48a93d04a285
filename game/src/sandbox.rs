//! Headless simulation of a sphere rolling over a planetoid

use crate::scene::SceneConfig;
use glam::Vec3;
use hecs::Entity;
use planetoid_engine::prelude::*;
use planetoid_engine::zones::apply_acceleration_zones;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Kinematic platform that reverses direction every `period` seconds
struct MovingPlatform {
    entity: Entity,
    velocity: Vec3,
    period: f32,
    elapsed: f32,
}

/// What happened during a run
#[derive(Debug, Clone)]
pub struct SandboxSummary {
    pub steps: u32,
    pub jumps: u32,
    pub transitions: u32,
    pub grounded_steps: u32,
    pub final_state: StateLabel,
    pub final_position: Vec3,
    pub final_stamina: f32,
}

pub struct Sandbox {
    scene: SceneConfig,
    world: PhysicsWorld,
    field: GravityField,
    sphere: Entity,
    body: SphereBody,
    stamina: StaminaPool,
    platform: Option<MovingPlatform>,
    timestep: FixedTimestep,
    time: f32,
    summary: SandboxSummary,
}

impl Sandbox {
    pub fn new(scene: SceneConfig) -> Self {
        let mut world = PhysicsWorld::new();
        let mut field = GravityField::new();
        let planet = scene.planet;

        world.spawn_static(
            Transform::from_position(planet.center),
            Collider::sphere(planet.radius),
        );
        field.register(Arc::new(SphereGravity::new(
            planet.center,
            planet.gravity,
            planet.inner_radius,
            planet.outer_radius,
        )));
        if let Some(gravity) = scene.uniform_gravity {
            field.register(Arc::new(UniformGravity::new(gravity)));
        }

        let platform = scene.platform.map(|config| {
            let entity = world.spawn_body(
                Transform::from_position_rotation(config.position, config.rotation),
                Rigidbody::kinematic().with_velocity(config.velocity),
                Collider::box_collider(config.half_extents).on_layer(config.layer),
            );
            MovingPlatform {
                entity,
                velocity: config.velocity,
                period: config.period,
                elapsed: 0.0,
            }
        });

        if let Some(config) = scene.zone {
            let zone = world.spawn_static(
                Transform::from_position_rotation(config.position, config.zone.rotation),
                Collider::box_collider(config.half_extents).as_trigger(),
            );
            if let Err(e) = world.insert_one(zone, config.zone) {
                warn!(error = %e, "Could not attach acceleration zone");
            }
        }

        for i in 0..scene.boulders {
            let angle = 10.0 + 15.0 * i as f32;
            let boulder = world.spawn_body(
                Transform::from_position(planet.surface_point(angle, 3.0)),
                Rigidbody::dynamic(0.5),
                Collider::sphere(0.4),
            );
            if let Err(e) = world.insert_one(boulder, CustomGravity::resting_allowed()) {
                warn!(error = %e, "Could not attach custom gravity");
            }
        }

        let spawn = planet.surface_point(scene.spawn_angle, scene.sphere_radius + 0.5);
        let sphere = world.spawn_body(
            Transform::from_position(spawn),
            Rigidbody::dynamic(scene.sphere_mass),
            Collider::sphere(scene.sphere_radius),
        );
        let body = SphereBody::new(SphereParams::new(scene.sphere.clone())).with_collider(sphere);
        let stamina = StaminaPool::new(scene.stamina);
        let timestep = FixedTimestep::new(scene.sphere.fixed_timestep);

        info!(
            sources = field.len(),
            boulders = scene.boulders,
            spawn = ?spawn,
            "Built sandbox scene"
        );

        Self {
            scene,
            world,
            field,
            sphere,
            body,
            stamina,
            platform,
            timestep,
            time: 0.0,
            summary: SandboxSummary {
                steps: 0,
                jumps: 0,
                transitions: 0,
                grounded_steps: 0,
                final_state: StateLabel::Default,
                final_position: spawn,
                final_stamina: 0.0,
            },
        }
    }

    /// Simulate the whole scene duration frame by frame
    pub fn run(&mut self) -> SandboxSummary {
        let frame_time = self.scene.frame_time;
        let frames = (self.scene.duration / frame_time).ceil() as u32;
        for _ in 0..frames {
            self.frame(frame_time);
        }

        self.summary.final_state = self.body.state();
        self.summary.final_stamina = self.stamina.current();
        if let Some(transform) = self.world.transform(self.sphere) {
            self.summary.final_position = transform.position;
        }

        let altitude = self.summary.final_position.distance(self.scene.planet.center)
            - self.scene.planet.radius;
        info!(
            steps = self.summary.steps,
            jumps = self.summary.jumps,
            transitions = self.summary.transitions,
            state = %self.summary.final_state,
            altitude,
            stamina = self.summary.final_stamina,
            "Sandbox finished"
        );
        self.summary.clone()
    }

    fn frame(&mut self, frame_time: f32) {
        let previous_time = self.time;
        self.time += frame_time;

        let (input, started) = self.scene.input_at(self.time, previous_time);
        if let Some(input) = input.copied() {
            self.body
                .set_input(input.movement, input.climb, started && input.jump);
        }

        let steps = self.timestep.accumulate(frame_time);
        let dt = self.timestep.step();
        for _ in 0..steps {
            self.fixed_step(dt);
        }
    }

    fn fixed_step(&mut self, dt: f32) {
        self.stamina.tick(dt);
        self.move_platform(dt);
        apply_custom_gravity(&mut self.world, &self.field, dt);

        for contact in self.world.contacts_for(self.sphere) {
            self.body.accumulate_contact(&contact);
        }
        let (Some(transform), Some(rigidbody)) = (
            self.world.transform(self.sphere),
            self.world.rigidbody(self.sphere),
        ) else {
            warn!("Sphere body missing from the world");
            return;
        };

        let report = {
            let mut ctx = StepContext::new(&self.field, &self.world)
                .with_stamina(&mut self.stamina)
                .with_stats(self.scene.stats);
            self.body.step(&transform, &rigidbody, &mut ctx, dt)
        };
        self.world.set_velocity(self.sphere, report.velocity);
        apply_acceleration_zones(&mut self.world, self.sphere, Some(&mut self.body), dt);
        self.world.integrate(dt);

        self.summary.steps += 1;
        if report.state == StateLabel::Grounded {
            self.summary.grounded_steps += 1;
        }
        for event in &report.events {
            match *event {
                LocomotionEvent::Jumped {
                    direction,
                    speed,
                    phase,
                } => {
                    self.summary.jumps += 1;
                    info!(time = self.time, ?direction, speed, phase, "Jump");
                }
                LocomotionEvent::StateChanged { from, to } => {
                    self.summary.transitions += 1;
                    info!(time = self.time, %from, %to, "Movement state changed");
                }
            }
        }
    }

    fn move_platform(&mut self, dt: f32) {
        let Some(platform) = self.platform.as_mut() else {
            return;
        };
        platform.elapsed += dt;
        if platform.elapsed < platform.period {
            return;
        }
        platform.elapsed -= platform.period;
        platform.velocity = -platform.velocity;
        self.world.set_velocity(platform.entity, platform.velocity);
        debug!(velocity = ?platform.velocity, "Platform reversed");
    }
}
