use super::GravitySource;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Constant gravity everywhere
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UniformGravity {
    pub gravity: Vec3,
}

impl UniformGravity {
    pub fn new(gravity: Vec3) -> Self {
        Self { gravity }
    }
}

impl GravitySource for UniformGravity {
    fn gravity_at(&self, _position: Vec3) -> Vec3 {
        self.gravity
    }
}

/// Pull towards a center point
///
/// Magnitude is `gravity / distance` up to `inner_radius`, scaled down
/// linearly to zero at `outer_radius`, and zero beyond that.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "SphereGravityDef")]
pub struct SphereGravity {
    pub center: Vec3,
    pub gravity: f32,
    inner_radius: f32,
    outer_radius: f32,
}

/// Raw serialized form, validated on the way in
#[derive(Deserialize)]
struct SphereGravityDef {
    center: Vec3,
    gravity: f32,
    inner_radius: f32,
    outer_radius: f32,
}

impl From<SphereGravityDef> for SphereGravity {
    fn from(def: SphereGravityDef) -> Self {
        SphereGravity::new(def.center, def.gravity, def.inner_radius, def.outer_radius)
    }
}

impl SphereGravity {
    /// Create a spherical source; radii are validated
    pub fn new(center: Vec3, gravity: f32, inner_radius: f32, outer_radius: f32) -> Self {
        let mut source = Self {
            center,
            gravity,
            inner_radius,
            outer_radius,
        };
        source.validate();
        source
    }

    pub fn inner_radius(&self) -> f32 {
        self.inner_radius
    }

    pub fn outer_radius(&self) -> f32 {
        self.outer_radius
    }

    /// Change both radii at once
    pub fn set_radii(&mut self, inner_radius: f32, outer_radius: f32) {
        self.inner_radius = inner_radius;
        self.outer_radius = outer_radius;
        self.validate();
    }

    /// Make radii non-negative and keep the outer radius at or beyond the
    /// inner one
    fn validate(&mut self) {
        self.inner_radius = self.inner_radius.max(0.0);
        if self.outer_radius < self.inner_radius {
            warn!(
                inner = self.inner_radius,
                outer = self.outer_radius,
                "Sphere gravity outer radius below inner radius, clamped"
            );
            self.outer_radius = self.inner_radius;
        }
    }
}

impl GravitySource for SphereGravity {
    fn gravity_at(&self, position: Vec3) -> Vec3 {
        let offset = self.center - position;
        let distance = offset.length();
        if distance > self.outer_radius || distance <= f32::EPSILON {
            return Vec3::ZERO;
        }

        let mut g = self.gravity / distance;
        if distance > self.inner_radius {
            // Only reachable when outer > inner
            let falloff = 1.0 / (self.outer_radius - self.inner_radius);
            g *= 1.0 - (distance - self.inner_radius) * falloff;
        }
        offset / distance * g
    }
}
