//! StatModifier - A single flat / percent / multiplier adjustment to one stat

use super::keys::StatKey;
use crate::types::{AbilityId, EffectId, EquipmentSlot};
use serde::{Deserialize, Serialize};

/// One adjustment of a stat
///
/// Applying adds `flat_bonus` to the added layer, `percent_bonus` to the
/// percent layer and pushes `multiplier` (if any) onto the multiplier set.
/// Removing must be called with the exact same modifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatModifier {
    pub stat: StatKey,
    #[serde(default)]
    pub flat_bonus: f64,
    /// In percent: 25.0 means +25%
    #[serde(default)]
    pub percent_bonus: f64,
    #[serde(default)]
    pub multiplier: Option<f64>,
}

impl StatModifier {
    pub fn flat(stat: StatKey, value: f64) -> Self {
        StatModifier {
            stat,
            flat_bonus: value,
            percent_bonus: 0.0,
            multiplier: None,
        }
    }

    pub fn percent(stat: StatKey, value: f64) -> Self {
        StatModifier {
            stat,
            flat_bonus: 0.0,
            percent_bonus: value,
            multiplier: None,
        }
    }

    pub fn multiplier(stat: StatKey, value: f64) -> Self {
        StatModifier {
            stat,
            flat_bonus: 0.0,
            percent_bonus: 0.0,
            multiplier: Some(value),
        }
    }

    /// Modifier for `stacks` stacks of this per-stack modifier
    ///
    /// Flat and percent layers scale linearly, multipliers compound.
    pub fn scaled(&self, stacks: u32) -> Self {
        let n = stacks as f64;
        StatModifier {
            stat: self.stat,
            flat_bonus: self.flat_bonus * n,
            percent_bonus: self.percent_bonus * n,
            multiplier: self.multiplier.map(|m| m.powi(stacks as i32)),
        }
    }

    /// Same modifier scaled by a level factor (used by passive stat bonuses)
    pub fn times(&self, factor: f64) -> Self {
        StatModifier {
            stat: self.stat,
            flat_bonus: self.flat_bonus * factor,
            percent_bonus: self.percent_bonus * factor,
            multiplier: self.multiplier.map(|m| 1.0 + (m - 1.0) * factor),
        }
    }
}

/// Who owns an effect entry on a target
///
/// At most one effect per creator may be active on a target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum EffectCreator {
    Effect(EffectId),
    Ability(AbilityId),
}

/// Identity under which a multiplier was added
///
/// Multipliers are removed by source identity, so two sources adding the
/// same value (two stuns both multiplying by 0) never remove each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum ModifierSource {
    Effect(EffectCreator),
    Equipment(EquipmentSlot),
    Passive(AbilityId),
    Custom(String),
}

impl From<EffectCreator> for ModifierSource {
    fn from(creator: EffectCreator) -> Self {
        ModifierSource::Effect(creator)
    }
}

/// A multiplier entry tagged with its source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Multiplier {
    pub source: ModifierSource,
    pub value: f64,
}
