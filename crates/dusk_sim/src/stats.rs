//! Bounded integer pools: health and the regenerating "soul" resource.
//!
//! Both keep `0 <= current <= max` at all times. Damage to an empty health
//! pool is ignored so that a death is only ever reported once.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Pool was already empty; nothing changed.
    Ignored,
    Damaged { dealt: i32, remaining: i32 },
    /// This hit emptied the pool.
    Killed { dealt: i32 },
}

impl DamageOutcome {
    pub fn dealt(&self) -> i32 {
        match *self {
            Self::Ignored => 0,
            Self::Damaged { dealt, .. } | Self::Killed { dealt } => dealt,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthPool {
    current: i32,
    max: i32,
}

impl HealthPool {
    /// Starts full. `max` below 1 is raised to 1.
    pub fn new(max: i32) -> Self {
        let max = max.max(1);
        Self { current: max, max }
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn is_depleted(&self) -> bool {
        self.current == 0
    }

    pub fn is_full(&self) -> bool {
        self.current == self.max
    }

    pub fn apply_damage(&mut self, amount: i32) -> DamageOutcome {
        if self.is_depleted() {
            return DamageOutcome::Ignored;
        }
        let dealt = amount.clamp(0, self.current);
        self.current -= dealt;
        if self.current == 0 {
            DamageOutcome::Killed { dealt }
        } else {
            DamageOutcome::Damaged {
                dealt,
                remaining: self.current,
            }
        }
    }

    /// Returns the amount actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let healed = amount.clamp(0, self.max - self.current);
        self.current += healed;
        healed
    }

    pub fn refill(&mut self) {
        self.current = self.max;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourcePool {
    current: i32,
    max: i32,
}

impl ResourcePool {
    /// Starts empty. Negative `max` is raised to 0.
    pub fn new(max: i32) -> Self {
        Self {
            current: 0,
            max: max.max(0),
        }
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    /// Returns the amount actually gained.
    pub fn gain(&mut self, amount: i32) -> i32 {
        let gained = amount.clamp(0, self.max - self.current);
        self.current += gained;
        gained
    }

    /// Spend `cost` if available. Nothing is spent on failure.
    pub fn spend(&mut self, cost: i32) -> bool {
        let cost = cost.max(0);
        if self.current < cost {
            return false;
        }
        self.current -= cost;
        true
    }

    pub fn clear(&mut self) {
        self.current = 0;
    }
}
