use super::state::StateLabel;
use glam::Vec3;
use hecs::Entity;

/// Something observers may want to react to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocomotionEvent {
    /// A jump went through
    Jumped {
        /// Final jump direction, biased towards up
        direction: Vec3,
        /// Speed added along `direction`
        speed: f32,
        /// Jump phase after this jump
        phase: u32,
    },
    StateChanged {
        from: StateLabel,
        to: StateLabel,
    },
}

/// Outcome of one controller step
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    /// State after the step
    pub state: StateLabel,
    /// Velocity to write back to the rigid body
    pub velocity: Vec3,
    /// Body the sphere was standing on during the step
    pub connected_body: Option<Entity>,
    pub events: Vec<LocomotionEvent>,
}

impl StepReport {
    /// Whether a jump happened this step
    pub fn jumped(&self) -> bool {
        self.events
            .iter()
            .any(|event| matches!(event, LocomotionEvent::Jumped { .. }))
    }

    /// State changes in the order they happened
    pub fn transitions(&self) -> impl Iterator<Item = (StateLabel, StateLabel)> + '_ {
        self.events.iter().filter_map(|event| match event {
            LocomotionEvent::StateChanged { from, to } => Some((*from, *to)),
            _ => None,
        })
    }
}
