//! Passive abilities - Learned hooks with no cooldown state

use super::types::{PassiveHook, PassiveSpec};
use crate::stat_block::{ModifierSource, StatBlock, StatModifier};
use crate::types::AbilityId;
use serde::{Deserialize, Serialize};

/// A learned passive ability on a unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassiveAbility {
    pub ability: AbilityId,
    pub level: u32,
    /// Stat bonus modifiers currently on the owner's block
    applied: Vec<StatModifier>,
}

impl PassiveAbility {
    pub fn new(ability: AbilityId) -> Self {
        PassiveAbility {
            ability,
            level: 0,
            applied: Vec::new(),
        }
    }

    pub fn applied_modifiers(&self) -> &[StatModifier] {
        &self.applied
    }

    /// Change the level, swapping permanent stat bonuses to the new level
    pub fn set_level(&mut self, stats: &mut StatBlock, spec: &PassiveSpec, level: u32) {
        let source = ModifierSource::Passive(self.ability.clone());
        if !self.applied.is_empty() {
            stats.remove_modifiers(&source, &self.applied);
        }
        self.level = level;
        self.applied = stat_bonus_modifiers(spec, level);
        if !self.applied.is_empty() {
            stats.add_modifiers(&source, &self.applied);
        }
    }
}

/// Stat bonus modifiers of a passive at `level` (nothing when unlearned)
pub fn stat_bonus_modifiers(spec: &PassiveSpec, level: u32) -> Vec<StatModifier> {
    if level == 0 {
        return Vec::new();
    }
    spec.hooks
        .iter()
        .filter_map(|hook| match hook {
            PassiveHook::StatBonus { modifiers } => Some(modifiers),
            _ => None,
        })
        .flatten()
        .map(|m| m.times(level as f64))
        .collect()
}

/// Apply `modifyDamage` hooks to an outgoing hit
///
/// `target_health_fraction` is the struck target's current/max health.
pub fn modify_damage(spec: &PassiveSpec, level: u32, damage: f64, target_health_fraction: f64) -> f64 {
    spec.hooks.iter().fold(damage, |dmg, hook| match hook {
        PassiveHook::BonusVsWounded { threshold, percent } if target_health_fraction < *threshold => {
            dmg * (1.0 + percent.at(level) / 100.0)
        }
        _ => dmg,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stat_block::StatKey;
    use crate::types::ScaledValue;

    fn toughness() -> PassiveSpec {
        PassiveSpec {
            hooks: vec![PassiveHook::StatBonus {
                modifiers: vec![StatModifier::flat(StatKey::MaxHealth, 20.0)],
            }],
        }
    }

    #[test]
    fn test_stat_bonus_follows_level() {
        let mut stats = StatBlock::default();
        let spec = toughness();
        let mut passive = PassiveAbility::new(AbilityId::from("toughness"));

        passive.set_level(&mut stats, &spec, 1);
        assert!((stats.get(StatKey::MaxHealth) - 70.0).abs() < 1e-9);

        passive.set_level(&mut stats, &spec, 3);
        assert!((stats.get(StatKey::MaxHealth) - 110.0).abs() < 1e-9);

        // unlearning takes every bonus back off the block
        passive.set_level(&mut stats, &spec, 0);
        assert!((stats.get(StatKey::MaxHealth) - 50.0).abs() < 1e-9);
        assert!(passive.applied_modifiers().is_empty());
    }

    #[test]
    fn test_bonus_vs_wounded() {
        let spec = PassiveSpec {
            hooks: vec![PassiveHook::BonusVsWounded {
                threshold: 0.3,
                percent: ScaledValue::new(50.0, 10.0),
            }],
        };
        assert!((modify_damage(&spec, 1, 10.0, 0.8) - 10.0).abs() < 1e-9);
        assert!((modify_damage(&spec, 1, 10.0, 0.2) - 15.0).abs() < 1e-9);
        assert!((modify_damage(&spec, 2, 10.0, 0.2) - 16.0).abs() < 1e-9);
    }
}
