//! Gravity-relative sphere controller
//!
//! A [`SphereBody`] is driven once per fixed step:
//!
//! 1. feed it the step's contacts with [`SphereBody::accumulate_contact`]
//! 2. call [`SphereBody::step`] with a [`StepContext`]
//! 3. write [`StepReport::velocity`] back to the rigid body
//!
//! Movement rules live in [`MovementState`]; the state machine only decides
//! which one is active.

mod body;
mod contacts;
mod events;
mod input;
mod state;
mod state_machine;
mod status;

pub use body::{SphereBody, StepContext};
pub use contacts::{ContactAccumulator, MIN_STEEP_DOT};
pub use events::{LocomotionEvent, StepReport};
pub use input::InputLatch;
pub use state::{MovementState, StateLabel, CLIMB_DRAIN_AMOUNT, CLIMB_DRAIN_PERIOD};
pub use state_machine::{next_label, LocomotionStateMachine, Transition, TransitionFlags};
pub use status::{project_on_plane, SphereStatus};

pub use crate::physics::ContactReport;
