use glam::Vec2;

/// Player intent captured between physics steps
///
/// Movement is last-write-wins. Jump presses are latched until a step
/// consumes them, so a press between two fixed steps is never lost.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputLatch {
    movement: Vec2,
    climb_held: bool,
    jump_requested: bool,
}

impl InputLatch {
    /// Set the movement vector (x = right, y = forward), clamped to unit length
    pub fn set_movement(&mut self, movement: Vec2) {
        self.movement = if movement.is_finite() {
            movement.clamp_length_max(1.0)
        } else {
            Vec2::ZERO
        };
    }

    pub fn set_climb(&mut self, held: bool) {
        self.climb_held = held;
    }

    /// Remember a jump press until the next step
    pub fn request_jump(&mut self) {
        self.jump_requested = true;
    }

    /// Feed one frame of input
    pub fn update(&mut self, movement: Vec2, climb_held: bool, jump_pressed: bool) {
        self.set_movement(movement);
        self.set_climb(climb_held);
        self.jump_requested |= jump_pressed;
    }

    pub fn movement(&self) -> Vec2 {
        self.movement
    }

    pub fn climb_held(&self) -> bool {
        self.climb_held
    }

    pub fn jump_pending(&self) -> bool {
        self.jump_requested
    }

    /// Consume the latched jump request
    pub fn take_jump(&mut self) -> bool {
        std::mem::take(&mut self.jump_requested)
    }
}
