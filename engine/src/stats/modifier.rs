use serde::{Deserialize, Serialize};

/// How a modifier changes a stat each time it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifierKind {
    /// Adds `amount` to the value
    Adder,
    /// Adds `amount` times the maximum to the value
    Factor,
}

/// Opaque handle to an applied modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModifierHandle(pub(crate) u64);

/// Periodic change to a stat
///
/// Fires once as soon as it is applied, then every `period` seconds until
/// `duration` has elapsed. `duration: None` never expires.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    pub kind: ModifierKind,
    pub amount: f32,
    /// Seconds between applications, 0 fires every tick
    pub period: f32,
    pub duration: Option<f32>,
}

impl Modifier {
    /// One-shot additive change
    pub fn adder(amount: f32) -> Self {
        Self {
            kind: ModifierKind::Adder,
            amount,
            period: 0.0,
            duration: Some(0.0),
        }
    }

    /// One-shot change relative to the stat's maximum
    pub fn factor(amount: f32) -> Self {
        Self {
            kind: ModifierKind::Factor,
            ..Self::adder(amount)
        }
    }

    /// Repeat every `period` seconds
    pub fn every(mut self, period: f32) -> Self {
        self.period = period.max(0.0);
        self
    }

    /// Expire after `duration` seconds
    pub fn lasting(mut self, duration: f32) -> Self {
        self.duration = Some(duration.max(0.0));
        self
    }

    /// Never expire
    pub fn forever(mut self) -> Self {
        self.duration = None;
        self
    }

    /// Change this modifier makes to a stat with the given maximum
    pub fn delta(&self, max: f32) -> f32 {
        match self.kind {
            ModifierKind::Adder => self.amount,
            ModifierKind::Factor => self.amount * max,
        }
    }
}

/// A modifier attached to a stat, with its timing bookkeeping
#[derive(Debug, Clone)]
pub(crate) struct ActiveModifier {
    pub handle: ModifierHandle,
    pub modifier: Modifier,
    since_last: f32,
    age: f32,
    applications: u32,
}

impl ActiveModifier {
    pub fn new(handle: ModifierHandle, modifier: Modifier) -> Self {
        Self {
            handle,
            modifier,
            since_last: 0.0,
            age: 0.0,
            applications: 0,
        }
    }

    /// Record an application
    pub fn fire(&mut self) {
        self.applications += 1;
    }

    /// Advance time and return how many times the modifier fires
    pub fn advance(&mut self, dt: f32) -> u32 {
        self.age += dt;
        self.since_last += dt;

        let mut fired = 0;
        if self.modifier.period <= 0.0 {
            if !self.is_expired() {
                self.since_last = 0.0;
                self.fire();
                fired += 1;
            }
            return fired;
        }

        while self.since_last >= self.modifier.period && !self.is_expired() {
            self.since_last -= self.modifier.period;
            self.fire();
            fired += 1;
        }
        fired
    }

    pub fn is_expired(&self) -> bool {
        let Some(duration) = self.modifier.duration else {
            return false;
        };
        if self.applications == 0 {
            return false;
        }
        if self.modifier.period > 0.0 {
            let total = (duration / self.modifier.period).round().max(1.0) as u32;
            if self.applications >= total {
                return true;
            }
        }
        self.age >= duration
    }
}
