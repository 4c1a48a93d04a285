//! Query interface between the controller and the physics engine
//!
//! The controller only needs two things from physics: a ray probe for ground
//! snapping and a read-only view of the bodies it touches. Anything that can
//! answer these (the bundled [`PhysicsWorld`](super::PhysicsWorld) or a test
//! double) can drive a sphere.

use crate::config::LayerMask;
use crate::physics::components::Transform;
use glam::Vec3;
use hecs::Entity;

/// A ray probe request
#[derive(Debug, Clone, Copy)]
pub struct ProbeQuery {
    pub origin: Vec3,
    /// Direction of the probe, normalized by the implementation
    pub direction: Vec3,
    pub max_distance: f32,
    /// Only colliders on these layers are considered
    pub layer_mask: LayerMask,
    /// Collider entity to skip, usually the prober itself
    pub exclude: Option<Entity>,
}

/// Result of a successful probe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeHit {
    /// Surface normal at the hit point
    pub normal: Vec3,
    /// Distance from the probe origin
    pub distance: f32,
    pub point: Vec3,
    /// Rigid body owning the hit collider, if it has one
    pub body: Option<Entity>,
    pub collider: Entity,
    pub layer: u32,
}

/// Read-only view of a rigid body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyInfo {
    pub transform: Transform,
    pub mass: f32,
    pub is_kinematic: bool,
}

/// One contact between the controlled body and something else
///
/// `normal` points away from the other surface, towards the controlled body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactReport {
    pub normal: Vec3,
    /// The other rigid body, `None` for static geometry
    pub body: Option<Entity>,
    /// Collision layer of the other collider
    pub layer: u32,
}

impl ContactReport {
    /// Contact against static geometry
    pub fn with_static(normal: Vec3, layer: u32) -> Self {
        Self {
            normal,
            body: None,
            layer,
        }
    }

    /// Contact against a rigid body
    pub fn with_body(normal: Vec3, body: Entity, layer: u32) -> Self {
        Self {
            normal,
            body: Some(body),
            layer,
        }
    }
}

/// Queries the controller issues against the physics engine
pub trait PhysicsQueries {
    /// Cast a ray and return the closest hit
    fn probe(&self, query: &ProbeQuery) -> Option<ProbeHit>;

    /// Look up a rigid body, `None` if it no longer exists
    fn body_info(&self, body: Entity) -> Option<BodyInfo>;
}
