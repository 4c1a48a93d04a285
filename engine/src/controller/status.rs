use super::contacts::ContactAccumulator;
use glam::Vec3;
use hecs::Entity;

/// Everything the sphere knows about itself during a step
///
/// Owned by [`SphereBody`](super::SphereBody); movement states read it and
/// the grounding checks write to it.
#[derive(Debug, Clone)]
pub struct SphereStatus {
    /// Position at the start of the current step
    pub position: Vec3,
    pub velocity: Vec3,
    pub gravity: Vec3,

    pub up_axis: Vec3,
    /// Input right axis on the gravity plane
    pub right_axis: Vec3,
    /// Input forward axis on the gravity plane
    pub forward_axis: Vec3,

    pub contacts: ContactAccumulator,
    /// Normalized ground normal of the previous step
    pub last_contact_normal: Vec3,
    /// Normalized steep normal of the previous step
    pub last_steep_normal: Vec3,

    /// Velocity of the body the sphere rests on
    pub connection_velocity: Vec3,
    pub last_connection_velocity: Vec3,
    pub connection_world_position: Vec3,
    /// Connection point in the connected body's local space
    pub connection_local_position: Vec3,

    pub steps_since_last_grounded: i32,
    pub steps_since_last_jump: i32,
    /// Jumps since the sphere was last grounded
    pub jump_phase: u32,

    pub wants_climb: bool,
    /// The sphere's own collider, skipped by probes
    pub collider: Option<Entity>,
}

impl Default for SphereStatus {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            gravity: Vec3::ZERO,
            up_axis: Vec3::Y,
            right_axis: Vec3::X,
            forward_axis: Vec3::Z,
            contacts: ContactAccumulator::default(),
            last_contact_normal: Vec3::ZERO,
            last_steep_normal: Vec3::ZERO,
            connection_velocity: Vec3::ZERO,
            last_connection_velocity: Vec3::ZERO,
            connection_world_position: Vec3::ZERO,
            connection_local_position: Vec3::ZERO,
            steps_since_last_grounded: 0,
            steps_since_last_jump: 0,
            jump_phase: 0,
            wants_climb: false,
            collider: None,
        }
    }
}

impl SphereStatus {
    /// Climb contacts count only a few steps after a jump
    pub fn is_climbing(&self) -> bool {
        self.contacts.climb_count > 0 && self.steps_since_last_jump > 2
    }

    pub fn walkable_surface_detected(&self) -> bool {
        self.contacts.is_grounded()
    }

    pub fn steep_detected(&self) -> bool {
        self.contacts.has_steep()
    }
}

/// `direction` projected on the plane with `normal`, normalized
///
/// A zero normal leaves the direction as is; a direction parallel to the
/// normal collapses to zero.
pub fn project_on_plane(direction: Vec3, normal: Vec3) -> Vec3 {
    (direction - normal * direction.dot(normal)).normalize_or_zero()
}
