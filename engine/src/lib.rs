//! Planetoid locomotion engine
//!
//! This crate provides a gravity-relative movement controller for a rolling
//! sphere, the gravity field it samples, and a small physics layer that
//! reports contacts and answers probe queries for it.

pub mod config;
pub mod controller;
pub mod gravity;
pub mod physics;
pub mod stats;
pub mod zones;

// Re-export commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{ConfigError, LayerMask, SphereConfig, SphereParams};

    // Controller types
    pub use crate::controller::{
        ContactAccumulator, ContactReport, InputLatch, LocomotionEvent, LocomotionStateMachine,
        MovementState, SphereBody, StateLabel, StepContext, StepReport,
    };

    // Gravity types
    pub use crate::gravity::{
        apply_custom_gravity, CustomGravity, GravityField, GravitySource, SphereGravity,
        UniformGravity,
    };

    // Physics types
    pub use crate::physics::{
        BodyInfo, Collider, CollisionShape, FixedTimestep, PhysicsQueries, PhysicsWorld,
        ProbeHit, ProbeQuery, Rigidbody, Transform,
    };

    // Stats types
    pub use crate::stats::{Modifier, ModifierHandle, ModifierKind, Stamina, StaminaPool, StatFactors};

    // Zones
    pub use crate::zones::AccelerationZone;

    // Math types
    pub use glam::{Quat, Vec2, Vec3};
    pub use hecs::Entity;
}

/// Initialize logging for the engine
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
