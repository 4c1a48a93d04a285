//! Collision detection subsystem

pub mod narrow_phase;

use crate::physics::components::CollisionShape;
use glam::{Quat, Vec3};
use hecs::Entity;

/// Contact information between two overlapping colliders
#[derive(Debug, Clone)]
pub struct Contact {
    /// First collider entity
    pub entity_a: Entity,
    /// Second collider entity
    pub entity_b: Entity,
    /// World space contact point
    pub position: Vec3,
    /// Contact normal pointing from A to B
    pub normal: Vec3,
    /// Penetration depth
    pub penetration: f32,
}

impl Contact {
    /// Create a new contact
    pub fn new(
        entity_a: Entity,
        entity_b: Entity,
        position: Vec3,
        normal: Vec3,
        penetration: f32,
    ) -> Self {
        Self {
            entity_a,
            entity_b,
            position,
            normal,
            penetration,
        }
    }

    /// Flip the contact (swap A and B)
    pub fn flipped(self) -> Self {
        Self {
            entity_a: self.entity_b,
            entity_b: self.entity_a,
            position: self.position,
            normal: -self.normal,
            penetration: self.penetration,
        }
    }
}

/// Axis-aligned bounding box used to prune narrow-phase tests
#[derive(Debug, Clone, Copy)]
pub struct AABB {
    pub min: Vec3,
    pub max: Vec3,
}

impl AABB {
    /// Create an AABB from a center point and half-extents
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Check if this AABB overlaps with another
    pub fn overlaps(&self, other: &AABB) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }
}

impl CollisionShape {
    /// Get the AABB for this shape transformed by position and rotation
    pub fn world_aabb(&self, position: Vec3, rotation: Quat) -> AABB {
        match self {
            CollisionShape::Sphere { radius } => {
                AABB::from_center_half_extents(position, Vec3::splat(*radius))
            }
            CollisionShape::Box { half_extents } => {
                // Extent of a rotated box along each world axis
                let axes = [rotation * Vec3::X, rotation * Vec3::Y, rotation * Vec3::Z];
                let extent = axes[0].abs() * half_extents.x
                    + axes[1].abs() * half_extents.y
                    + axes[2].abs() * half_extents.z;
                AABB::from_center_half_extents(position, extent)
            }
        }
    }
}
