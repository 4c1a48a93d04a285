use super::state::{MovementState, StateLabel};
use crate::stats::Stamina;
use tracing::debug;

/// Facts the transition rule looks at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitionFlags {
    /// Climb held, touching something climbable, not just after a jump
    pub climbing: bool,
    /// Stamina left (always true without a stamina collaborator)
    pub has_stamina: bool,
    pub grounded: bool,
    pub steep: bool,
}

/// Pick the next state; earlier rules win
pub fn next_label(flags: TransitionFlags) -> StateLabel {
    if flags.climbing && flags.has_stamina {
        StateLabel::Climbing
    } else if flags.grounded {
        StateLabel::Grounded
    } else if flags.steep {
        StateLabel::OnSteep
    } else {
        StateLabel::InAir
    }
}

/// A state transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: StateLabel,
    pub to: StateLabel,
}

/// Owns the current movement state and runs its enter/exit hooks
#[derive(Debug, Clone, Default)]
pub struct LocomotionStateMachine {
    current: MovementState,
    steps_in_state: u32,
}

impl LocomotionStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &MovementState {
        &self.current
    }

    pub fn label(&self) -> StateLabel {
        self.current.label()
    }

    /// Steps spent in the current state
    pub fn steps_in_state(&self) -> u32 {
        self.steps_in_state
    }

    /// Switch state if the flags call for a different one
    ///
    /// Exit runs on the old state before enter runs on the new one. Nothing
    /// happens when the state stays the same.
    pub fn update<S: Stamina + ?Sized>(
        &mut self,
        flags: TransitionFlags,
        mut stamina: Option<&mut S>,
    ) -> Option<Transition> {
        let from = self.current.label();
        let to = next_label(flags);
        if from == to {
            return None;
        }

        self.current.on_exit(stamina.as_deref_mut());
        self.current = MovementState::from_label(to);
        self.current.on_enter(stamina);
        self.steps_in_state = 0;

        debug!(%from, %to, "Movement state changed");
        Some(Transition { from, to })
    }

    /// Called once per step after transitions settled
    pub fn on_stay(&mut self) {
        self.steps_in_state += 1;
        self.current.on_stay();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::StaminaPool;

    fn all_flags() -> Vec<TransitionFlags> {
        (0..16u8)
            .map(|bits| TransitionFlags {
                climbing: bits & 1 != 0,
                has_stamina: bits & 2 != 0,
                grounded: bits & 4 != 0,
                steep: bits & 8 != 0,
            })
            .collect()
    }

    #[test]
    fn test_priority_order() {
        for flags in all_flags() {
            let expected = if flags.climbing && flags.has_stamina {
                StateLabel::Climbing
            } else if flags.grounded {
                StateLabel::Grounded
            } else if flags.steep {
                StateLabel::OnSteep
            } else {
                StateLabel::InAir
            };
            assert_eq!(next_label(flags), expected, "{flags:?}");
            // Same input, same answer
            assert_eq!(next_label(flags), next_label(flags));
        }
    }

    #[test]
    fn test_update_reports_transitions_once() {
        let mut machine = LocomotionStateMachine::new();
        assert_eq!(machine.label(), StateLabel::Default);

        let grounded = TransitionFlags {
            grounded: true,
            has_stamina: true,
            ..Default::default()
        };
        let transition = machine.update::<StaminaPool>(grounded, None);
        assert_eq!(
            transition,
            Some(Transition {
                from: StateLabel::Default,
                to: StateLabel::Grounded
            })
        );
        assert_eq!(machine.update::<StaminaPool>(grounded, None), None);
    }

    #[test]
    fn test_steps_in_state() {
        let mut machine = LocomotionStateMachine::new();
        machine.update::<StaminaPool>(TransitionFlags::default(), None);
        machine.on_stay();
        machine.on_stay();
        assert_eq!(machine.steps_in_state(), 2);

        let steep = TransitionFlags {
            steep: true,
            ..Default::default()
        };
        machine.update::<StaminaPool>(steep, None);
        assert_eq!(machine.steps_in_state(), 0);
        assert_eq!(machine.label(), StateLabel::OnSteep);
    }

    #[test]
    fn test_climbing_enter_and_exit_touch_stamina() {
        let mut pool = StaminaPool::without_regen(100.0);
        let mut machine = LocomotionStateMachine::new();

        let climbing = TransitionFlags {
            climbing: true,
            has_stamina: true,
            ..Default::default()
        };
        machine.update(climbing, Some(&mut pool));
        assert_eq!(machine.label(), StateLabel::Climbing);
        assert_eq!(pool.modifier_count(), 1);

        machine.update(TransitionFlags::default(), Some(&mut pool));
        assert_eq!(machine.label(), StateLabel::InAir);
        assert_eq!(pool.modifier_count(), 0);
    }
}
