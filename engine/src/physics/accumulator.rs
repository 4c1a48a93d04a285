//! Fixed timestep clock
//!
//! Frame times are variable, the controller is not. `FixedTimestep` turns
//! frame deltas into a whole number of fixed steps and keeps the remainder
//! for the next frame.

use tracing::warn;

/// Upper bound on fixed steps produced by a single frame
pub const MAX_STEPS_PER_FRAME: u32 = 8;

/// Accumulator handing out fixed physics steps
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    /// Time carried over from previous frames
    accumulated: f32,
    /// Length of one fixed step in seconds
    step: f32,
    /// Cap on steps per frame (prevents the spiral of death)
    max_steps: u32,
}

impl FixedTimestep {
    /// Create a clock with the given step length
    pub fn new(step: f32) -> Self {
        Self {
            accumulated: 0.0,
            step,
            max_steps: MAX_STEPS_PER_FRAME,
        }
    }

    /// Length of one step in seconds
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Add a frame's delta time and return how many fixed steps to run
    pub fn accumulate(&mut self, delta_time: f32) -> u32 {
        if !delta_time.is_finite() || delta_time <= 0.0 {
            return 0;
        }

        self.accumulated += delta_time;

        let limit = self.step * self.max_steps as f32;
        if self.accumulated > limit {
            warn!(
                accumulated = self.accumulated,
                "Frame time too large, dropping simulation time"
            );
            self.accumulated = limit;
        }

        let steps = (self.accumulated / self.step) as u32;
        self.accumulated -= steps as f32 * self.step;
        steps
    }

    /// How far between two fixed steps we are, in [0, 1)
    pub fn alpha(&self) -> f32 {
        self.accumulated / self.step
    }

    /// Drop any carried-over time
    pub fn reset(&mut self) {
        self.accumulated = 0.0;
    }

    /// Time carried over to the next frame
    pub fn accumulated_time(&self) -> f32 {
        self.accumulated
    }
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::new(1.0 / 60.0)
    }
}
