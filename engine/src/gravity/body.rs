use super::GravityField;
use crate::physics::{PhysicsWorld, Rigidbody, Transform};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Squared speed under which a body may be put to rest
const REST_SPEED_SQ: f32 = 1e-4;
/// How long a body has to stay slow before it counts as resting
const REST_DELAY: f32 = 1.0;

/// Makes an ordinary dynamic body follow the gravity field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CustomGravity {
    /// When false, bodies that came to rest stop receiving gravity. Only
    /// safe if gravity directions never change around the body.
    pub always_apply: bool,
    #[serde(skip)]
    float_delay: f32,
}

impl Default for CustomGravity {
    fn default() -> Self {
        Self {
            always_apply: true,
            float_delay: 0.0,
        }
    }
}

impl CustomGravity {
    /// Gravity that skips bodies at rest
    pub fn resting_allowed() -> Self {
        Self {
            always_apply: false,
            float_delay: 0.0,
        }
    }

    fn is_at_rest(&mut self, rb: &Rigidbody, dt: f32) -> bool {
        if rb.linear_velocity.length_squared() < REST_SPEED_SQ {
            self.float_delay += dt;
            if self.float_delay >= REST_DELAY {
                return true;
            }
        } else {
            self.float_delay = 0.0;
        }
        false
    }
}

/// Apply field gravity to every body carrying a [`CustomGravity`]
pub fn apply_custom_gravity(world: &mut PhysicsWorld, field: &GravityField, dt: f32) {
    for (entity, (transform, rb, custom)) in
        world.query_mut::<(&Transform, &mut Rigidbody, &mut CustomGravity)>()
    {
        if rb.is_kinematic {
            continue;
        }
        if !custom.always_apply && custom.is_at_rest(rb, dt) {
            trace!(entity = ?entity, "Body at rest, skipping gravity");
            continue;
        }
        let gravity = field.gravity(transform.position, false);
        rb.apply_acceleration(gravity, dt);
    }
}
