//! Physics components for the entity system

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Position and orientation of a body in world space
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Transform {
    /// Position in world space
    pub position: Vec3,
    /// Rotation in world space as a quaternion
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Transform {
    /// Create a new transform with the given position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a new transform with the given position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Convert a point from this transform's local space to world space
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    /// Convert a point from world space to this transform's local space
    pub fn inverse_transform_point(&self, world: Vec3) -> Vec3 {
        self.rotation.conjugate() * (world - self.position)
    }

    /// Convert a direction from world space to local space
    pub fn inverse_transform_direction(&self, direction: Vec3) -> Vec3 {
        self.rotation.conjugate() * direction
    }

    /// Convert a direction from local space to world space
    pub fn transform_direction(&self, direction: Vec3) -> Vec3 {
        self.rotation * direction
    }
}

/// Rigidbody component for physics simulation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Rigidbody {
    /// Mass in kilograms
    pub mass: f32,

    /// Linear velocity in world space
    pub linear_velocity: Vec3,

    /// Angular velocity in world space (axis * radians per second)
    pub angular_velocity: Vec3,

    /// Kinematic bodies move by their velocity but ignore contacts and forces
    pub is_kinematic: bool,
}

impl Default for Rigidbody {
    fn default() -> Self {
        Self {
            mass: 1.0,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            is_kinematic: false,
        }
    }
}

impl Rigidbody {
    /// Create a kinematic rigidbody (not affected by forces)
    pub fn kinematic() -> Self {
        Self {
            is_kinematic: true,
            ..Default::default()
        }
    }

    /// Create a dynamic rigidbody with the given mass
    pub fn dynamic(mass: f32) -> Self {
        Self {
            mass,
            ..Default::default()
        }
    }

    /// Set the initial linear velocity
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.linear_velocity = velocity;
        self
    }

    /// Set the initial angular velocity
    pub fn with_angular_velocity(mut self, angular_velocity: Vec3) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    /// Apply an acceleration for `dt` seconds (mass independent)
    pub fn apply_acceleration(&mut self, acceleration: Vec3, dt: f32) {
        if !self.is_kinematic {
            self.linear_velocity += acceleration * dt;
        }
    }
}

/// Collision shape types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum CollisionShape {
    /// Sphere with radius
    Sphere { radius: f32 },
    /// Box with half-extents (width/2, height/2, depth/2)
    Box { half_extents: Vec3 },
}

impl Default for CollisionShape {
    fn default() -> Self {
        CollisionShape::Box {
            half_extents: Vec3::splat(0.5),
        }
    }
}

/// Collider component for collision detection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Collider {
    /// Collision shape type
    pub shape: CollisionShape,

    /// Is this a trigger (reported as overlap, no contacts)
    pub is_trigger: bool,

    /// Collision layer index (0..32) used by layer masks
    pub layer: u32,
}

impl Collider {
    /// Create a sphere collider
    pub fn sphere(radius: f32) -> Self {
        Self {
            shape: CollisionShape::Sphere { radius },
            ..Default::default()
        }
    }

    /// Create a box collider
    pub fn box_collider(half_extents: Vec3) -> Self {
        Self {
            shape: CollisionShape::Box { half_extents },
            ..Default::default()
        }
    }

    /// Set this collider as a trigger
    pub fn as_trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }

    /// Put this collider on a collision layer
    pub fn on_layer(mut self, layer: u32) -> Self {
        self.layer = layer;
        self
    }
}
