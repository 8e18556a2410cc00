//! ModifiableStat - Lazily cached base + added + percent + multiplier stat

use super::modifier::{ModifierSource, Multiplier};
use serde::{Deserialize, Serialize};
use std::cell::Cell;

/// A stat that follows the Added → Percent → Multiplier model
///
/// Final value is calculated as:
/// `clamp((base + added) × (1 + percent / 100) × Π(multipliers), min, max)`
///
/// The result is cached; any write to a layer marks the stat dirty and the
/// next read recomputes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifiableStat {
    /// Sum of all flat additions
    added_bonus: f64,
    /// Sum of all percent bonuses (25.0 = +25%)
    percent_bonus: f64,
    /// Multiset of multipliers keyed by source
    multipliers: Vec<Multiplier>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,

    #[serde(skip)]
    final_value: Cell<f64>,
    #[serde(skip, default = "dirty")]
    is_dirty: Cell<bool>,
}

fn dirty() -> Cell<bool> {
    Cell::new(true)
}

impl Default for ModifiableStat {
    fn default() -> Self {
        ModifiableStat::new(None, None)
    }
}

impl ModifiableStat {
    pub fn new(min_value: Option<f64>, max_value: Option<f64>) -> Self {
        ModifiableStat {
            added_bonus: 0.0,
            percent_bonus: 0.0,
            multipliers: Vec::new(),
            min_value,
            max_value,
            final_value: Cell::new(0.0),
            is_dirty: Cell::new(true),
        }
    }

    /// Apply the layers to a base value without touching the cache
    pub fn compute(&self, base_value: f64) -> f64 {
        let total = (base_value + self.added_bonus)
            * (1.0 + self.percent_bonus / 100.0)
            * self.total_multiplier();
        let total = match self.min_value {
            Some(min) if total < min => min,
            _ => total,
        };
        match self.max_value {
            Some(max) if total > max => max,
            _ => total,
        }
    }

    /// Cached value, if clean
    pub fn cached(&self) -> Option<f64> {
        if self.is_dirty.get() {
            None
        } else {
            Some(self.final_value.get())
        }
    }

    /// Store a freshly computed value and clear the dirty flag
    pub(crate) fn store(&self, value: f64) {
        self.final_value.set(value);
        self.is_dirty.set(false);
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty.get()
    }

    pub fn mark_dirty(&self) {
        self.is_dirty.set(true);
    }

    pub fn added_bonus(&self) -> f64 {
        self.added_bonus
    }

    pub fn percent_bonus(&self) -> f64 {
        self.percent_bonus
    }

    pub fn multipliers(&self) -> &[Multiplier] {
        &self.multipliers
    }

    /// Product of all multipliers
    pub fn total_multiplier(&self) -> f64 {
        self.multipliers.iter().map(|m| m.value).product()
    }

    pub fn add_flat(&mut self, value: f64) {
        self.added_bonus += value;
        self.mark_dirty();
    }

    pub fn add_percent(&mut self, value: f64) {
        self.percent_bonus += value;
        self.mark_dirty();
    }

    pub fn push_multiplier(&mut self, source: ModifierSource, value: f64) {
        self.multipliers.push(Multiplier { source, value });
        self.mark_dirty();
    }

    /// Remove one multiplier entry added by `source` with this value
    ///
    /// Returns false (and leaves the list untouched) if no such entry exists.
    pub fn remove_multiplier(&mut self, source: &ModifierSource, value: f64) -> bool {
        let position = self
            .multipliers
            .iter()
            .position(|m| &m.source == source && m.value.to_bits() == value.to_bits());
        self.mark_dirty();
        match position {
            Some(index) => {
                self.multipliers.remove(index);
                true
            }
            None => false,
        }
    }
}
