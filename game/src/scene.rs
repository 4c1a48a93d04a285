//! Sandbox scene description
//!
//! Everything can come from a JSON file; missing keys use the built-in
//! planetoid scene.

use glam::{Quat, Vec2, Vec3};
use planetoid_engine::config::{ConfigError, SphereConfig};
use planetoid_engine::stats::StatFactors;
use planetoid_engine::zones::AccelerationZone;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Errors while loading a scene file
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid sphere config: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid scene: {0}")]
    Invalid(String),
}

/// A round planet with its own gravity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanetConfig {
    pub center: Vec3,
    /// Radius of the solid surface
    pub radius: f32,
    /// Pull strength; the surface pull is `gravity / radius`
    pub gravity: f32,
    pub inner_radius: f32,
    pub outer_radius: f32,
}

impl Default for PlanetConfig {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            radius: 20.0,
            gravity: 196.2,
            inner_radius: 25.0,
            outer_radius: 60.0,
        }
    }
}

impl PlanetConfig {
    /// Point on the surface, `angle` degrees from the north pole towards +Z
    pub fn surface_point(&self, angle: f32, height: f32) -> Vec3 {
        let angle = angle.to_radians();
        self.center + Vec3::new(0.0, angle.cos(), angle.sin()) * (self.radius + height)
    }

    /// Rotation taking +Y to the surface normal at `angle`
    pub fn surface_rotation(&self, angle: f32) -> Quat {
        let normal = (self.surface_point(angle, 0.0) - self.center).normalize_or_zero();
        Quat::from_rotation_arc(Vec3::Y, normal)
    }
}

/// Kinematic box moving back and forth
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlatformConfig {
    pub position: Vec3,
    pub rotation: Quat,
    pub half_extents: Vec3,
    pub velocity: Vec3,
    /// Seconds before the direction flips
    pub period: f32,
    pub layer: u32,
}

/// Trigger box with an acceleration zone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneConfig {
    pub position: Vec3,
    pub half_extents: Vec3,
    pub zone: AccelerationZone,
}

/// Input held from `time` until the next entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptedInput {
    pub time: f32,
    pub movement: Vec2,
    pub climb: bool,
    /// Pressed once when the entry starts
    pub jump: bool,
}

impl Default for ScriptedInput {
    fn default() -> Self {
        Self {
            time: 0.0,
            movement: Vec2::ZERO,
            climb: false,
            jump: false,
        }
    }
}

impl ScriptedInput {
    fn at(time: f32, movement: Vec2, jump: bool) -> Self {
        Self {
            time,
            movement,
            jump,
            ..Default::default()
        }
    }
}

/// Full sandbox setup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub sphere: SphereConfig,
    pub sphere_radius: f32,
    pub sphere_mass: f32,
    /// Spawn angle on the planet in degrees
    pub spawn_angle: f32,

    pub planet: PlanetConfig,
    /// Extra uniform pull on top of the planet
    pub uniform_gravity: Option<Vec3>,
    pub platform: Option<PlatformConfig>,
    pub zone: Option<ZoneConfig>,
    /// Loose rocks that follow the gravity field
    pub boulders: u32,

    pub stamina: f32,
    pub stats: StatFactors,

    /// Simulated seconds
    pub duration: f32,
    /// Length of one simulated render frame
    pub frame_time: f32,
    pub script: Vec<ScriptedInput>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        let planet = PlanetConfig::default();
        let sphere = SphereConfig {
            max_air_jumps: 1,
            ..Default::default()
        };

        let platform = PlatformConfig {
            position: planet.surface_point(-30.0, 0.5),
            rotation: planet.surface_rotation(-30.0),
            half_extents: Vec3::new(2.0, 0.25, 2.0),
            velocity: Vec3::new(1.5, 0.0, 0.0),
            period: 2.0,
            layer: 1,
        };
        let zone = ZoneConfig {
            position: planet.surface_point(25.0, 0.5),
            half_extents: Vec3::new(1.5, 1.0, 1.5),
            zone: AccelerationZone::new(planet.surface_rotation(25.0), 0.0, 12.0),
        };

        let forward = Vec2::new(0.0, 1.0);
        Self {
            sphere,
            sphere_radius: 0.5,
            sphere_mass: 1.0,
            spawn_angle: 0.0,
            planet,
            uniform_gravity: None,
            platform: Some(platform),
            zone: Some(zone),
            boulders: 3,
            stamina: 100.0,
            stats: StatFactors::default(),
            duration: 12.0,
            frame_time: 1.0 / 50.0,
            script: vec![
                ScriptedInput::at(0.0, Vec2::ZERO, false),
                ScriptedInput::at(1.0, forward, false),
                ScriptedInput::at(2.5, forward, true),
                ScriptedInput::at(2.9, forward, true),
                ScriptedInput::at(4.0, Vec2::new(1.0, 0.0), false),
                ScriptedInput::at(6.0, -forward, false),
                ScriptedInput::at(9.0, Vec2::ZERO, true),
            ],
        }
    }
}

impl SceneConfig {
    /// Load a scene from JSON
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let mut scene: SceneConfig = serde_json::from_str(&json)?;
        scene.validate()?;
        info!(path = ?path, "Loaded scene");
        Ok(scene)
    }

    fn validate(&mut self) -> Result<(), SceneError> {
        self.sphere.validate()?;
        if !(self.duration.is_finite() && self.duration >= 0.0) {
            return Err(SceneError::Invalid(format!("duration {}", self.duration)));
        }
        if !(self.frame_time.is_finite() && self.frame_time > 0.0) {
            return Err(SceneError::Invalid(format!("frame_time {}", self.frame_time)));
        }
        if self.sphere_radius <= 0.0 || self.planet.radius <= 0.0 {
            return Err(SceneError::Invalid("radii must be positive".to_string()));
        }
        self.script.sort_by(|a, b| a.time.total_cmp(&b.time));
        Ok(())
    }

    /// Input entry active at `time`, and whether it just started
    pub fn input_at(&self, time: f32, previous_time: f32) -> (Option<&ScriptedInput>, bool) {
        let current = self.script.iter().rev().find(|input| input.time <= time);
        let started = current.map_or(false, |input| input.time > previous_time);
        (current, started)
    }
}
