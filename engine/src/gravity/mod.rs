//! Gravity field made of any number of sources
//!
//! There is no global "down". Every body asks the field for the gravity at
//! its own position and derives its up axis from that. The field is an
//! ordinary value owned by the world setup code and passed by reference to
//! whoever needs it.

mod body;
mod sources;

pub use body::{apply_custom_gravity, CustomGravity};
pub use sources::{SphereGravity, UniformGravity};

use glam::Vec3;
use std::sync::Arc;
use tracing::{debug, warn};

/// Gravity used when the field has nothing to say and a non-zero vector
/// was requested
pub const DEFAULT_GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);

/// Something that pulls on bodies
pub trait GravitySource: Send + Sync {
    /// Gravitational acceleration contributed at `position`
    fn gravity_at(&self, position: Vec3) -> Vec3;
}

/// Registry of active gravity sources
pub struct GravityField {
    sources: Vec<Arc<dyn GravitySource>>,
    fallback: Vec3,
}

impl Default for GravityField {
    fn default() -> Self {
        Self::new()
    }
}

impl GravityField {
    /// Create an empty field falling back to [`DEFAULT_GRAVITY`]
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            fallback: DEFAULT_GRAVITY,
        }
    }

    /// Replace the fallback gravity
    pub fn with_fallback(mut self, fallback: Vec3) -> Self {
        self.fallback = fallback;
        self
    }

    /// Add a source to the field
    ///
    /// Registering the same source twice is a programming error: it asserts
    /// in debug builds and is ignored in release builds.
    pub fn register(&mut self, source: Arc<dyn GravitySource>) {
        let duplicate = self.position_of(&source).is_some();
        debug_assert!(!duplicate, "gravity source registered twice");
        if duplicate {
            warn!("Ignoring duplicate gravity source registration");
            return;
        }
        self.sources.push(source);
        debug!(count = self.sources.len(), "Registered gravity source");
    }

    /// Remove a previously registered source
    ///
    /// Unregistering an unknown source asserts in debug builds and is ignored
    /// in release builds.
    pub fn unregister(&mut self, source: &Arc<dyn GravitySource>) {
        let index = self.position_of(source);
        debug_assert!(index.is_some(), "unregistering unknown gravity source");
        match index {
            Some(index) => {
                self.sources.remove(index);
                debug!(count = self.sources.len(), "Unregistered gravity source");
            }
            None => warn!("Ignoring removal of unknown gravity source"),
        }
    }

    /// Number of registered sources
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Sum of all contributions at `position`
    ///
    /// When the sum is exactly zero and `can_be_zero` is false, the fallback
    /// gravity is returned instead.
    pub fn gravity(&self, position: Vec3, can_be_zero: bool) -> Vec3 {
        let gravity = self
            .sources
            .iter()
            .fold(Vec3::ZERO, |sum, source| sum + source.gravity_at(position));

        if gravity == Vec3::ZERO && !can_be_zero {
            self.fallback
        } else {
            gravity
        }
    }

    /// Gravity and up axis at `position`
    ///
    /// With `can_be_zero` set and no pull at all, the up axis is zero.
    pub fn gravity_and_up(&self, position: Vec3, can_be_zero: bool) -> (Vec3, Vec3) {
        let gravity = self.gravity(position, can_be_zero);
        (gravity, -gravity.normalize_or_zero())
    }

    /// Up axis at `position`, never zero unless the fallback is
    pub fn up_axis(&self, position: Vec3) -> Vec3 {
        self.gravity_and_up(position, false).1
    }

    fn position_of(&self, source: &Arc<dyn GravitySource>) -> Option<usize> {
        let target = Arc::as_ptr(source) as *const ();
        self.sources
            .iter()
            .position(|existing| Arc::as_ptr(existing) as *const () == target)
    }
}
