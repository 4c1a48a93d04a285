use super::modifier::{ActiveModifier, Modifier, ModifierHandle};
use super::Stamina;
use tracing::{debug, trace};

/// Stamina regained per regeneration tick
pub const REGEN_AMOUNT: f32 = 5.0;
/// Seconds between regeneration ticks
pub const REGEN_PERIOD: f32 = 0.1;
/// Regeneration pause after running dry
pub const EXHAUSTION_PAUSE: f32 = 1.0;

/// Stamina value with periodic modifiers and automatic regeneration
#[derive(Debug, Clone)]
pub struct StaminaPool {
    value: f32,
    max: f32,
    modifiers: Vec<ActiveModifier>,
    next_handle: u64,
    regen: Option<ModifierHandle>,
    /// Remaining regeneration pause in seconds
    pause: f32,
}

impl StaminaPool {
    /// Full pool with regeneration running
    pub fn new(max: f32) -> Self {
        let max = max.max(0.0);
        let mut pool = Self {
            value: max,
            max,
            modifiers: Vec::new(),
            next_handle: 0,
            regen: None,
            pause: 0.0,
        };
        pool.start_regen();
        pool
    }

    /// Pool without regeneration, useful when something else refills it
    pub fn without_regen(max: f32) -> Self {
        let mut pool = Self::new(max);
        if let Some(handle) = pool.regen.take() {
            pool.remove_modifier(handle);
        }
        pool
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    /// Fraction of the pool that is left
    pub fn ratio(&self) -> f32 {
        if self.max > 0.0 {
            self.value / self.max
        } else {
            0.0
        }
    }

    /// Whether regeneration is currently paused after exhaustion
    pub fn is_exhausted(&self) -> bool {
        self.pause > 0.0
    }

    /// Number of modifiers attached, regeneration included
    pub fn modifier_count(&self) -> usize {
        self.modifiers.len()
    }

    /// Advance modifier timers by `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        let was_paused = self.pause > 0.0;
        let max = self.max;
        let mut fired = Vec::new();
        for active in &mut self.modifiers {
            let count = active.advance(dt);
            let delta = active.modifier.delta(max);
            fired.extend(std::iter::repeat((active.handle, delta)).take(count as usize));
        }
        self.modifiers.retain(|active| !active.is_expired());

        let regen = self.regen;
        for (handle, delta) in fired {
            // Running dry mid-tick cancels the rest of this tick's regeneration
            if Some(handle) == regen && self.regen.is_none() {
                continue;
            }
            self.change_by(delta);
        }

        if was_paused {
            self.pause -= dt;
            if self.pause <= 0.0 {
                self.pause = 0.0;
                debug!("Stamina regeneration resumed");
                self.start_regen();
            }
        }
    }

    fn start_regen(&mut self) {
        let regen = Modifier::adder(REGEN_AMOUNT).every(REGEN_PERIOD).forever();
        self.regen = Some(self.apply_modifier(regen));
    }

    fn change_by(&mut self, delta: f32) {
        let before = self.value;
        self.value = (self.value + delta).clamp(0.0, self.max);
        trace!(before, after = self.value, "Stamina changed");

        if before > 0.0 && self.value <= 0.0 {
            self.on_exhausted();
        }
    }

    fn on_exhausted(&mut self) {
        debug!("Stamina exhausted, pausing regeneration");
        if let Some(handle) = self.regen.take() {
            self.modifiers.retain(|active| active.handle != handle);
        }
        self.pause = EXHAUSTION_PAUSE;
    }
}

impl Stamina for StaminaPool {
    fn current(&self) -> f32 {
        self.value
    }

    fn deduct(&mut self, amount: f32) {
        self.change_by(-amount);
    }

    fn apply_modifier(&mut self, modifier: Modifier) -> ModifierHandle {
        let handle = ModifierHandle(self.next_handle);
        self.next_handle += 1;

        let mut active = ActiveModifier::new(handle, modifier);
        active.fire();
        let expired = active.is_expired();
        if !expired {
            self.modifiers.push(active);
        }
        self.change_by(modifier.delta(self.max));
        handle
    }

    fn remove_modifier(&mut self, handle: ModifierHandle) -> bool {
        let before = self.modifiers.len();
        self.modifiers.retain(|active| active.handle != handle);
        if self.regen == Some(handle) {
            self.regen = None;
        }
        self.modifiers.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deduct_clamps_at_zero() {
        let mut pool = StaminaPool::without_regen(100.0);
        pool.deduct(30.0);
        assert_eq!(pool.current(), 70.0);
        pool.deduct(500.0);
        assert_eq!(pool.current(), 0.0);
    }

    #[test]
    fn test_regeneration() {
        let mut pool = StaminaPool::new(100.0);
        pool.deduct(20.0);
        pool.tick(0.1);
        assert!((pool.current() - 85.0).abs() < 1e-4);
        pool.tick(1.0);
        assert_eq!(pool.current(), 100.0);
    }

    #[test]
    fn test_exhaustion_pauses_regeneration() {
        let mut pool = StaminaPool::new(100.0);
        pool.deduct(100.0);
        assert!(pool.is_exhausted());

        pool.tick(0.5);
        assert_eq!(pool.current(), 0.0);

        // Pause over, regeneration fires right away
        pool.tick(0.6);
        assert!(!pool.is_exhausted());
        assert!((pool.current() - REGEN_AMOUNT).abs() < 1e-4);
    }

    #[test]
    fn test_drain_exhausting_mid_tick_drops_regeneration() {
        let mut pool = StaminaPool::new(100.0);
        pool.deduct(100.0);
        pool.apply_modifier(Modifier::adder(-10.0).every(0.5).forever());

        // Pause over, regeneration restarts behind the drain
        pool.tick(1.0);
        assert!(!pool.is_exhausted());
        assert!((pool.current() - REGEN_AMOUNT).abs() < 1e-4);

        // The drain empties the pool before the regeneration ticks land
        pool.tick(0.5);
        assert!(pool.is_exhausted());
        assert_eq!(pool.current(), 0.0);
        assert_eq!(pool.modifier_count(), 1);
    }

    #[test]
    fn test_drain_modifier() {
        let mut pool = StaminaPool::without_regen(100.0);
        let drain = pool.apply_modifier(Modifier::adder(-10.0).every(0.1).forever());
        assert_eq!(pool.current(), 90.0);

        pool.tick(0.1);
        assert!((pool.current() - 80.0).abs() < 1e-4);

        assert!(pool.remove_modifier(drain));
        pool.tick(1.0);
        assert!((pool.current() - 80.0).abs() < 1e-4);
        assert!(!pool.remove_modifier(drain));
    }

    #[test]
    fn test_one_shot_modifier_is_not_kept() {
        let mut pool = StaminaPool::without_regen(100.0);
        pool.deduct(50.0);
        pool.apply_modifier(Modifier::factor(0.25));
        assert_eq!(pool.current(), 75.0);
        assert_eq!(pool.modifier_count(), 0);
    }
}
