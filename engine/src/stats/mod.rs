//! Stat collaborators used by the controller
//!
//! The controller never owns stamina. It is handed an optional
//! `&mut dyn Stamina` each step and simply skips stamina rules when there
//! is none.

mod modifier;
mod stamina;

pub use modifier::{Modifier, ModifierHandle, ModifierKind};
pub use stamina::{StaminaPool, EXHAUSTION_PAUSE, REGEN_AMOUNT, REGEN_PERIOD};

use serde::{Deserialize, Serialize};

/// A stamina-like resource
pub trait Stamina {
    /// Current value
    fn current(&self) -> f32;

    /// Subtract `amount`, never going below zero
    fn deduct(&mut self, amount: f32);

    /// Attach a periodic modifier; it fires once immediately
    fn apply_modifier(&mut self, modifier: Modifier) -> ModifierHandle;

    /// Detach a modifier, returns false if it was not attached
    fn remove_modifier(&mut self, handle: ModifierHandle) -> bool;
}

/// Multipliers on movement caps, 1.0 meaning unchanged
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatFactors {
    /// Scales the maximum speed
    pub speed: f32,
    /// Scales the maximum acceleration
    pub agility: f32,
}

impl Default for StatFactors {
    fn default() -> Self {
        Self {
            speed: 1.0,
            agility: 1.0,
        }
    }
}

impl StatFactors {
    /// Build factors from percentages (100 = unchanged)
    pub fn from_percent(speed: f32, agility: f32) -> Self {
        Self {
            speed: speed.max(0.0) / 100.0,
            agility: agility.max(0.0) / 100.0,
        }
    }
}
