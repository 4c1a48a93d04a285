//! Physics layer the controller talks to
//!
//! A deliberately small engine: sphere and oriented-box colliders, contact
//! reports, ray probes and Euler integration over a `hecs` world. The
//! controller only sees it through [`PhysicsQueries`] and the
//! [`ContactReport`]s it is fed.

pub mod accumulator;
pub mod collision;
pub mod components;
pub mod queries;
pub mod world;

// Re-export commonly used types
pub use accumulator::FixedTimestep;
pub use components::{Collider, CollisionShape, Rigidbody, Transform};
pub use queries::{BodyInfo, ContactReport, PhysicsQueries, ProbeHit, ProbeQuery};
pub use world::PhysicsWorld;
