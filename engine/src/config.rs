//! Configuration types for the sphere controller

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Errors that can occur while loading or validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error when reading/writing files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A value that cannot be corrected automatically
    #[error("Invalid value for {field}: {value}")]
    Invalid { field: &'static str, value: f32 },
}

/// Bit set of collision layers (layer indices 0..32)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl LayerMask {
    /// Matches every layer
    pub const ALL: LayerMask = LayerMask(u32::MAX);
    /// Matches no layer
    pub const NONE: LayerMask = LayerMask(0);

    /// Build a mask from a list of layer indices
    pub fn from_layers(layers: &[u32]) -> Self {
        let bits = layers
            .iter()
            .filter(|&&layer| layer < 32)
            .fold(0u32, |bits, &layer| bits | (1 << layer));
        LayerMask(bits)
    }

    /// Check if a layer index is part of this mask
    pub fn contains(&self, layer: u32) -> bool {
        layer < 32 && self.0 & (1 << layer) != 0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        LayerMask::ALL
    }
}

/// Tunable parameters of a sphere controller
///
/// Angles are in degrees. Missing keys in a JSON file fall back to the
/// defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SphereConfig {
    pub max_speed: f32,
    pub max_climb_speed: f32,
    pub max_fall_speed: f32,

    pub max_acceleration: f32,
    pub max_air_acceleration: f32,
    pub max_climb_acceleration: f32,

    /// Apex height of a single jump from rest
    pub jump_height: f32,
    pub jump_stamina_cost: f32,
    pub max_air_jumps: u32,

    pub max_ground_angle: f32,
    pub max_stairs_angle: f32,
    pub max_climb_angle: f32,

    /// Climbing grip factor, below 1 so inner corners can still be traversed
    pub grip_strength_factor: f32,

    /// No ground snapping above this speed
    pub max_snap_speed: f32,
    /// Length of the downward snap probe
    pub probe_distance: f32,

    /// Squared speed under which a grounded sphere counts as standing still
    pub rest_speed_sq: f32,
    /// Input and velocity changes below this are ignored
    pub input_epsilon: f32,

    pub ground_mask: LayerMask,
    pub stairs_mask: LayerMask,
    pub climbable_mask: LayerMask,

    /// Fixed physics timestep in seconds
    pub fixed_timestep: f32,
}

impl Default for SphereConfig {
    fn default() -> Self {
        Self {
            max_speed: 10.0,
            max_climb_speed: 4.0,
            max_fall_speed: 20.0,
            max_acceleration: 20.0,
            max_air_acceleration: 6.0,
            max_climb_acceleration: 40.0,
            jump_height: 2.0,
            jump_stamina_cost: 50.0,
            max_air_jumps: 0,
            max_ground_angle: 40.0,
            max_stairs_angle: 50.0,
            max_climb_angle: 140.0,
            grip_strength_factor: 0.9,
            max_snap_speed: 100.0,
            probe_distance: 1.0,
            rest_speed_sq: 0.01,
            input_epsilon: 1e-4,
            ground_mask: LayerMask::ALL,
            stairs_mask: LayerMask::ALL,
            climbable_mask: LayerMask::ALL,
            fixed_timestep: 1.0 / 60.0,
        }
    }
}

impl SphereConfig {
    /// Load a configuration from a JSON file and validate it
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let mut config: SphereConfig = serde_json::from_str(&json)?;
        config.validate()?;
        debug!(path = ?path, "Loaded sphere config");
        Ok(config)
    }

    /// Save this configuration as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        debug!(path = ?path, "Saved sphere config");
        Ok(())
    }

    /// Clamp every value into its usable range
    ///
    /// Fails only for values that have no sensible correction.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        let values = [
            ("max_speed", self.max_speed),
            ("max_climb_speed", self.max_climb_speed),
            ("max_fall_speed", self.max_fall_speed),
            ("max_acceleration", self.max_acceleration),
            ("max_air_acceleration", self.max_air_acceleration),
            ("max_climb_acceleration", self.max_climb_acceleration),
            ("jump_height", self.jump_height),
            ("jump_stamina_cost", self.jump_stamina_cost),
            ("max_ground_angle", self.max_ground_angle),
            ("max_stairs_angle", self.max_stairs_angle),
            ("max_climb_angle", self.max_climb_angle),
            ("grip_strength_factor", self.grip_strength_factor),
            ("max_snap_speed", self.max_snap_speed),
            ("probe_distance", self.probe_distance),
            ("rest_speed_sq", self.rest_speed_sq),
            ("input_epsilon", self.input_epsilon),
            ("fixed_timestep", self.fixed_timestep),
        ];
        if let Some(&(field, value)) = values.iter().find(|(_, value)| !value.is_finite()) {
            return Err(ConfigError::Invalid { field, value });
        }
        if self.fixed_timestep <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "fixed_timestep",
                value: self.fixed_timestep,
            });
        }

        let before = self.clone();

        self.max_speed = self.max_speed.max(0.0);
        self.max_climb_speed = self.max_climb_speed.max(0.0);
        self.max_fall_speed = self.max_fall_speed.max(0.0);
        self.max_acceleration = self.max_acceleration.max(0.0);
        self.max_air_acceleration = self.max_air_acceleration.max(0.0);
        self.max_climb_acceleration = self.max_climb_acceleration.max(0.0);
        self.jump_height = self.jump_height.max(0.0);
        self.jump_stamina_cost = self.jump_stamina_cost.max(0.0);
        self.max_ground_angle = self.max_ground_angle.clamp(0.0, 90.0);
        self.max_stairs_angle = self.max_stairs_angle.clamp(0.0, 90.0);
        self.max_climb_angle = self.max_climb_angle.clamp(90.0, 170.0);
        self.grip_strength_factor = self.grip_strength_factor.clamp(0.0, 1.0);
        self.max_snap_speed = self.max_snap_speed.max(0.0);
        self.probe_distance = self.probe_distance.max(0.0);
        self.rest_speed_sq = self.rest_speed_sq.max(0.0);
        self.input_epsilon = self.input_epsilon.max(0.0);

        if *self != before {
            warn!("Sphere config contained out-of-range values, clamped");
        }
        Ok(())
    }
}

/// Validated configuration plus the cosine thresholds derived from it
///
/// Surface classification compares `dot(up, normal)` against these, so the
/// trigonometry runs once per configuration instead of once per contact.
#[derive(Debug, Clone)]
pub struct SphereParams {
    pub config: SphereConfig,
    pub min_ground_dot: f32,
    pub min_stairs_dot: f32,
    pub min_climb_dot: f32,
}

impl SphereParams {
    /// Derive thresholds from a configuration, clamping it first
    pub fn new(mut config: SphereConfig) -> Self {
        if let Err(e) = config.validate() {
            warn!(error = %e, "Invalid sphere config, falling back to defaults");
            config = SphereConfig::default();
        }
        Self {
            min_ground_dot: config.max_ground_angle.to_radians().cos(),
            min_stairs_dot: config.max_stairs_angle.to_radians().cos(),
            min_climb_dot: config.max_climb_angle.to_radians().cos(),
            config,
        }
    }

    /// Minimum up-dot for a surface on `layer` to count as ground
    pub fn min_dot(&self, layer: u32) -> f32 {
        if self.config.stairs_mask.contains(layer) {
            self.min_stairs_dot
        } else {
            self.min_ground_dot
        }
    }
}

impl Default for SphereParams {
    fn default() -> Self {
        Self::new(SphereConfig::default())
    }
}
