//! Movement states and their physics policies
//!
//! States hold no per-step data; everything they read or adjust lives in
//! [`SphereStatus`]. The only exception is the climbing stamina drain,
//! attached on enter and detached on exit.

use super::status::{project_on_plane, SphereStatus};
use crate::config::SphereParams;
use crate::physics::{PhysicsQueries, ProbeQuery};
use crate::stats::{Modifier, ModifierHandle, Stamina};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, trace};

/// Stamina drained per tick while climbing
pub const CLIMB_DRAIN_AMOUNT: f32 = -10.0;
/// Seconds between climbing drain ticks
pub const CLIMB_DRAIN_PERIOD: f32 = 0.1;

/// Name of a movement state, for animation and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateLabel {
    Default,
    Grounded,
    Climbing,
    OnSteep,
    InAir,
}

impl fmt::Display for StateLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StateLabel::Default => "default",
            StateLabel::Grounded => "grounded",
            StateLabel::Climbing => "climbing",
            StateLabel::OnSteep => "on-steep",
            StateLabel::InAir => "in-air",
        };
        f.write_str(name)
    }
}

/// Current movement mode of a sphere
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MovementState {
    /// Initial state, and the base behaviour the others refine
    #[default]
    Default,
    Grounded,
    Climbing {
        /// Stamina drain applied while climbing
        drain: Option<ModifierHandle>,
    },
    OnSteep,
    InAir,
}

impl MovementState {
    /// Fresh state for a label
    pub fn from_label(label: StateLabel) -> Self {
        match label {
            StateLabel::Default => MovementState::Default,
            StateLabel::Grounded => MovementState::Grounded,
            StateLabel::Climbing => MovementState::Climbing { drain: None },
            StateLabel::OnSteep => MovementState::OnSteep,
            StateLabel::InAir => MovementState::InAir,
        }
    }

    pub fn label(&self) -> StateLabel {
        match self {
            MovementState::Default => StateLabel::Default,
            MovementState::Grounded => StateLabel::Grounded,
            MovementState::Climbing { .. } => StateLabel::Climbing,
            MovementState::OnSteep => StateLabel::OnSteep,
            MovementState::InAir => StateLabel::InAir,
        }
    }

    /// Acceleration cap for input-driven velocity changes
    pub fn max_acceleration(&self, status: &SphereStatus, params: &SphereParams) -> f32 {
        let config = &params.config;
        match self {
            MovementState::Climbing { .. } => config.max_climb_acceleration,
            MovementState::InAir => config.max_air_acceleration,
            _ if status.walkable_surface_detected() => config.max_acceleration,
            _ => config.max_air_acceleration,
        }
    }

    /// Speed cap for input-driven movement
    pub fn max_speed(&self, status: &SphereStatus, params: &SphereParams) -> f32 {
        let config = &params.config;
        match self {
            MovementState::Climbing { .. } => config.max_climb_speed,
            _ if status.walkable_surface_detected() && status.wants_climb => {
                config.max_climb_speed
            }
            _ => config.max_speed,
        }
    }

    /// Axes the x and y input components move along, before surface projection
    pub fn axes(&self, status: &SphereStatus) -> (Vec3, Vec3) {
        match self {
            // Relative to the wall and gravity, not the camera
            MovementState::Climbing { .. } => (
                status.contacts.contact_normal.cross(status.up_axis),
                status.up_axis,
            ),
            _ => (status.right_axis, status.forward_axis),
        }
    }

    /// Velocity change caused by gravity (or its replacement) this step
    pub fn gravity_effect(&self, status: &SphereStatus, params: &SphereParams, dt: f32) -> Vec3 {
        let config = &params.config;
        let normal = status.contacts.contact_normal;
        match self {
            MovementState::Grounded => {
                if status.velocity.length_squared() < config.rest_speed_sq {
                    // Keep the pull into the surface, drop the slide along it
                    normal * status.gravity.dot(normal) * dt
                } else if status.wants_climb {
                    let grip = config.max_climb_acceleration * config.grip_strength_factor;
                    (status.gravity - normal * grip) * dt
                } else {
                    status.gravity * dt
                }
            }
            MovementState::Climbing { .. } => {
                let grip = config.max_climb_acceleration * config.grip_strength_factor;
                -normal * grip * dt
            }
            _ => status.gravity * dt,
        }
    }

    /// Whether a jump is allowed, and in which direction
    ///
    /// May rewrite `jump_phase`: wall jumps reset it, and the first air jump
    /// after walking off a ledge counts as the second jump.
    pub fn jump_direction(
        &self,
        status: &SphereStatus,
        params: &SphereParams,
        jump_phase: &mut u32,
    ) -> Option<Vec3> {
        match self {
            MovementState::Default => None,
            MovementState::Grounded | MovementState::Climbing { .. } => {
                Some(status.contacts.contact_normal)
            }
            MovementState::OnSteep => {
                *jump_phase = 0;
                Some(status.contacts.steep_normal)
            }
            MovementState::InAir => {
                let max_air_jumps = params.config.max_air_jumps;
                if max_air_jumps > 0 && *jump_phase <= max_air_jumps {
                    if *jump_phase == 0 {
                        *jump_phase = 1;
                    }
                    Some(status.contacts.contact_normal)
                } else {
                    None
                }
            }
        }
    }

    /// Re-check whether the sphere counts as grounded this step
    ///
    /// May rewrite the contact data in `status`, e.g. to turn a crevasse
    /// into virtual ground or to snap onto ground just below.
    pub fn update_grounded_state(
        &self,
        status: &mut SphereStatus,
        params: &SphereParams,
        physics: &dyn PhysicsQueries,
    ) -> bool {
        match self {
            MovementState::Default => false,
            MovementState::Grounded => true,
            MovementState::Climbing { .. } => climbing_grounded(status, params),
            MovementState::OnSteep => steep_grounded(status, params),
            MovementState::InAir => {
                if snap_to_ground(status, params, physics) {
                    return true;
                }
                // Air jumps go straight up
                status.contacts.contact_normal = status.up_axis;
                false
            }
        }
    }

    pub fn on_enter<S: Stamina + ?Sized>(&mut self, stamina: Option<&mut S>) {
        if let MovementState::Climbing { drain } = self {
            *drain = stamina.map(|stamina| {
                stamina.apply_modifier(
                    Modifier::adder(CLIMB_DRAIN_AMOUNT)
                        .every(CLIMB_DRAIN_PERIOD)
                        .forever(),
                )
            });
        }
    }

    pub fn on_stay(&mut self) {}

    pub fn on_exit<S: Stamina + ?Sized>(&mut self, stamina: Option<&mut S>) {
        if let MovementState::Climbing { drain } = self {
            if let (Some(handle), Some(stamina)) = (drain.take(), stamina) {
                stamina.remove_modifier(handle);
            }
        }
    }
}

fn climbing_grounded(status: &mut SphereStatus, params: &SphereParams) -> bool {
    if !status.is_climbing() {
        return false;
    }

    let contacts = &mut status.contacts;
    if contacts.climb_count > 1 {
        contacts.climb_normal = contacts.climb_normal.normalize_or_zero();
        let up_dot = status.up_axis.dot(contacts.climb_normal);
        if up_dot >= params.min_ground_dot {
            // Crevasse: the aggregate would read as ground, keep the last wall
            contacts.climb_normal = contacts.last_climb_normal;
        }
    }

    contacts.ground_count = 1;
    contacts.contact_normal = contacts.climb_normal;
    true
}

fn steep_grounded(status: &mut SphereStatus, params: &SphereParams) -> bool {
    let contacts = &mut status.contacts;
    if contacts.steep_count <= 1 {
        return false;
    }

    contacts.steep_normal = contacts.steep_normal.normalize_or_zero();
    let up_dot = status.up_axis.dot(contacts.steep_normal);
    if up_dot < params.min_ground_dot {
        return false;
    }

    // Several steep walls forming a virtual floor
    contacts.steep_count = 0;
    contacts.ground_count = 1;
    contacts.contact_normal = contacts.steep_normal;
    true
}

fn snap_to_ground(
    status: &mut SphereStatus,
    params: &SphereParams,
    physics: &dyn PhysicsQueries,
) -> bool {
    let config = &params.config;
    if status.steps_since_last_grounded > 1 || status.steps_since_last_jump <= 2 {
        return false;
    }

    let speed = status.velocity.length();
    if speed > config.max_snap_speed {
        return false;
    }

    let query = ProbeQuery {
        origin: status.position,
        direction: -status.up_axis,
        max_distance: config.probe_distance,
        layer_mask: config.ground_mask,
        exclude: status.collider,
    };
    let Some(hit) = physics.probe(&query) else {
        return false;
    };

    let up_dot = status.up_axis.dot(hit.normal);
    if up_dot < params.min_dot(hit.layer) {
        return false;
    }

    status.contacts.ground_count = 1;
    status.contacts.contact_normal = hit.normal;

    // Velocity already heading into the ground is left alone
    let dot = status.velocity.dot(hit.normal);
    if dot > 0.0 {
        status.velocity = (status.velocity - hit.normal * dot).normalize_or_zero() * speed;
    }
    status.contacts.connected_body = hit.body;

    debug!(distance = hit.distance, normal = ?hit.normal, "Snapped to ground");
    trace!(velocity = ?status.velocity, "Velocity after snap");
    true
}
