//! Trigger volumes that act on bodies passing through them

use crate::controller::SphereBody;
use crate::physics::PhysicsWorld;
use glam::{Quat, Vec3};
use hecs::Entity;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Pushes bodies along its local up axis towards a target speed
///
/// Attach it next to a trigger [`Collider`](crate::physics::Collider).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccelerationZone {
    /// Orientation of the zone; its local +Y is the push direction
    pub rotation: Quat,
    /// Zero makes the speed change instantaneous
    pub acceleration: f32,
    /// Target speed along the push direction
    pub speed: f32,
}

impl Default for AccelerationZone {
    fn default() -> Self {
        Self {
            rotation: Quat::IDENTITY,
            acceleration: 10.0,
            speed: 10.0,
        }
    }
}

impl AccelerationZone {
    pub fn new(rotation: Quat, acceleration: f32, speed: f32) -> Self {
        Self {
            rotation,
            acceleration: acceleration.max(0.0),
            speed: speed.max(0.0),
        }
    }

    /// New velocity for a body inside the zone
    ///
    /// Returns `None` when the body already moves at least `speed` along
    /// the push direction.
    pub fn accelerate(&self, velocity: Vec3, dt: f32) -> Option<Vec3> {
        let mut local = self.rotation.inverse() * velocity;
        if local.y >= self.speed {
            return None;
        }

        local.y = if self.acceleration > 0.0 {
            move_towards(local.y, self.speed, self.acceleration * dt)
        } else {
            self.speed
        };
        Some(self.rotation * local)
    }
}

fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

/// Run every acceleration zone `entity` is inside of
///
/// A sphere controller pushed by a zone stops snapping to the ground so it
/// can actually leave it. Returns whether any zone changed the velocity.
pub fn apply_acceleration_zones(
    world: &mut PhysicsWorld,
    entity: Entity,
    mut sphere: Option<&mut SphereBody>,
    dt: f32,
) -> bool {
    let zones: Vec<AccelerationZone> = world
        .triggers_for(entity)
        .into_iter()
        .filter_map(|trigger| world.get::<AccelerationZone>(trigger).ok().map(|zone| *zone))
        .collect();

    let mut accelerated = false;
    for zone in zones {
        let Some(rigidbody) = world.rigidbody(entity) else {
            return accelerated;
        };
        if rigidbody.is_kinematic {
            continue;
        }
        let Some(velocity) = zone.accelerate(rigidbody.linear_velocity, dt) else {
            continue;
        };

        world.set_velocity(entity, velocity);
        if let Some(sphere) = sphere.as_deref_mut() {
            sphere.prevent_snap_to_ground();
        }
        trace!(?entity, ?velocity, "Acceleration zone applied");
        accelerated = true;
    }
    accelerated
}
