//! StatBlock - One lazily cached stat per attribute, owned by a unit

mod keys;
mod modifier;
mod stat_value;

pub use keys::{StatBase, StatKey, StatProfile};
pub use modifier::{EffectCreator, ModifierSource, Multiplier, StatModifier};
pub use stat_value::ModifiableStat;

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::collections::BTreeMap;
use tracing::error;

/// Complete stat state for a unit
///
/// Any modifier change invalidates every stat of the block, not only the
/// touched ones: derived stats read other stats of the same owner and no
/// dependency graph is tracked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatBlock {
    level: u32,
    bases: StatProfile,
    stats: BTreeMap<StatKey, ModifiableStat>,
    #[serde(skip)]
    recomputations: Cell<u64>,
}

impl Default for StatBlock {
    fn default() -> Self {
        Self::from_profile(&StatProfile::default(), 1)
    }
}

impl StatBlock {
    /// Build a block for an owner at `level` from its base profile
    pub fn from_profile(profile: &StatProfile, level: u32) -> Self {
        let stats = StatKey::all()
            .iter()
            .map(|key| {
                let (min, max) = key.bounds();
                (*key, ModifiableStat::new(min, max))
            })
            .collect();

        StatBlock {
            level: level.max(1),
            bases: profile.clone(),
            stats,
            recomputations: Cell::new(0),
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Change the owner's level; every level-scaled base changes with it
    pub fn set_level(&mut self, level: u32) {
        self.level = level.max(1);
        self.mark_all_dirty();
    }

    /// Read a stat, recomputing it first if dirty
    pub fn get(&self, key: StatKey) -> f64 {
        self.get_at_depth(key, 0)
    }

    fn get_at_depth(&self, key: StatKey, depth: usize) -> f64 {
        let stat = self.stat(key);
        if let Some(value) = stat.cached() {
            return value;
        }

        let base = self.base_at_depth(key, depth);
        let value = stat.compute(base);
        stat.store(value);
        self.recomputations.set(self.recomputations.get() + 1);
        value
    }

    /// Base value before any modifier layer
    pub fn base_value(&self, key: StatKey) -> f64 {
        self.base_at_depth(key, 0)
    }

    fn base_at_depth(&self, key: StatKey, depth: usize) -> f64 {
        match self.bases.base_for(key) {
            StatBase::Constant { value } => value,
            StatBase::PerLevel { base, per_level } => {
                base + per_level * self.level.saturating_sub(1) as f64
            }
            StatBase::Derived { from, ratio, plus } => {
                // an acyclic chain visits each key at most once
                if from == key || depth >= StatKey::all().len() {
                    error!(?key, ?from, "cyclic derived stat; using constant part only");
                    return plus;
                }
                plus + ratio * self.get_at_depth(from, depth + 1)
            }
        }
    }

    pub fn stat(&self, key: StatKey) -> &ModifiableStat {
        // every key is populated in from_profile
        &self.stats[&key]
    }

    fn stat_mut(&mut self, key: StatKey) -> &mut ModifiableStat {
        self.stats.entry(key).or_insert_with(|| {
            let (min, max) = key.bounds();
            ModifiableStat::new(min, max)
        })
    }

    /// Number of recomputations performed so far (cache diagnostics)
    pub fn recomputations(&self) -> u64 {
        self.recomputations.get()
    }

    pub fn mark_all_dirty(&self) {
        for stat in self.stats.values() {
            stat.mark_dirty();
        }
    }

    /// Apply a list of modifiers
    pub fn add_modifiers(&mut self, source: &ModifierSource, modifiers: &[StatModifier]) {
        for modifier in modifiers {
            let stat = self.stat_mut(modifier.stat);
            if modifier.flat_bonus != 0.0 {
                stat.add_flat(modifier.flat_bonus);
            }
            if modifier.percent_bonus != 0.0 {
                stat.add_percent(modifier.percent_bonus);
            }
            if let Some(multiplier) = modifier.multiplier {
                stat.push_multiplier(source.clone(), multiplier);
            }
        }
        self.mark_all_dirty();
    }

    /// Reverse a list previously passed to [`StatBlock::add_modifiers`]
    pub fn remove_modifiers(&mut self, source: &ModifierSource, modifiers: &[StatModifier]) {
        for modifier in modifiers {
            let stat = self.stat_mut(modifier.stat);
            if modifier.flat_bonus != 0.0 {
                stat.add_flat(-modifier.flat_bonus);
            }
            if modifier.percent_bonus != 0.0 {
                stat.add_percent(-modifier.percent_bonus);
            }
            if let Some(multiplier) = modifier.multiplier {
                if !stat.remove_multiplier(source, multiplier) {
                    error!(
                        stat = ?modifier.stat,
                        ?source,
                        multiplier,
                        "removing a multiplier that was never added"
                    );
                }
            }
        }
        self.mark_all_dirty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> ModifierSource {
        ModifierSource::Custom("test".to_string())
    }

    #[test]
    fn test_default_values() {
        let block = StatBlock::default();
        assert!((block.get(StatKey::MaxHealth) - 50.0).abs() < f64::EPSILON);
        assert!((block.get(StatKey::Speed) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_read_is_cached() {
        let block = StatBlock::default();
        let first = block.get(StatKey::Damage);
        let after_first = block.recomputations();
        let second = block.get(StatKey::Damage);
        assert!((first - second).abs() < f64::EPSILON);
        assert_eq!(block.recomputations(), after_first);
    }

    #[test]
    fn test_modifier_applies_once() {
        let mut block = StatBlock::default();
        let before = block.get(StatKey::Damage);
        block.add_modifiers(&source(), &[StatModifier::flat(StatKey::Damage, 5.0)]);
        let after = block.get(StatKey::Damage);
        let again = block.get(StatKey::Damage);
        assert!((after - before - 5.0).abs() < 1e-9);
        assert!((after - again).abs() < f64::EPSILON);
    }

    #[test]
    fn test_any_change_invalidates_whole_block() {
        let mut block = StatBlock::default();
        for key in StatKey::all() {
            block.get(*key);
        }
        block.add_modifiers(&source(), &[StatModifier::flat(StatKey::Armor, 1.0)]);
        for key in StatKey::all() {
            assert!(block.stat(*key).is_dirty(), "{:?} should be dirty", key);
        }
    }

    #[test]
    fn test_per_level_and_derived() {
        let profile = StatProfile::new()
            .with(StatKey::MaxHealth, StatBase::per_level(100.0, 10.0))
            .with(
                StatKey::Armor,
                StatBase::Derived { from: StatKey::MaxHealth, ratio: 0.1, plus: 1.0 },
            );
        let mut block = StatBlock::from_profile(&profile, 1);
        assert!((block.get(StatKey::Armor) - 11.0).abs() < 1e-9);

        block.set_level(3);
        assert!((block.get(StatKey::MaxHealth) - 120.0).abs() < 1e-9);
        assert!((block.get(StatKey::Armor) - 13.0).abs() < 1e-9);

        // derived stats see modifiers on their source
        block.add_modifiers(&source(), &[StatModifier::flat(StatKey::MaxHealth, 30.0)]);
        assert!((block.get(StatKey::Armor) - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_add_remove_round_trip() {
        let mut block = StatBlock::default();
        let mods = [
            StatModifier::flat(StatKey::Damage, 3.0),
            StatModifier::percent(StatKey::Damage, 50.0),
            StatModifier::multiplier(StatKey::Speed, 0.0),
        ];
        block.add_modifiers(&source(), &mods);
        assert!((block.get(StatKey::Speed) - 0.0).abs() < f64::EPSILON);

        block.remove_modifiers(&source(), &mods);
        let damage = block.stat(StatKey::Damage);
        assert!(damage.added_bonus().abs() < 1e-12);
        assert!(damage.percent_bonus().abs() < 1e-12);
        assert!(block.stat(StatKey::Speed).multipliers().is_empty());
        assert!((block.get(StatKey::Speed) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_remove_never_added_multiplier_keeps_others() {
        let mut block = StatBlock::default();
        block.add_modifiers(&source(), &[StatModifier::multiplier(StatKey::Damage, 2.0)]);
        block.remove_modifiers(&source(), &[StatModifier::multiplier(StatKey::Damage, 3.0)]);
        assert_eq!(block.stat(StatKey::Damage).multipliers().len(), 1);
        assert!((block.get(StatKey::Damage) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_cyclic_derived_stats_fall_back_to_constant() {
        let profile = StatProfile::new()
            .with(StatKey::Armor, StatBase::Derived { from: StatKey::MaxHealth, ratio: 1.0, plus: 2.0 })
            .with(StatKey::MaxHealth, StatBase::Derived { from: StatKey::Armor, ratio: 1.0, plus: 30.0 });
        let block = StatBlock::from_profile(&profile, 1);
        let health = block.get(StatKey::MaxHealth);
        assert!(health.is_finite());
        assert!(health >= 30.0);
        assert!(block.get(StatKey::Armor) >= 2.0);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn any_modifier() -> impl Strategy<Value = StatModifier> {
            (
                prop::sample::select(StatKey::all().to_vec()),
                -100.0f64..100.0,
                -90.0f64..200.0,
                prop::option::of(0.0f64..3.0),
            )
                .prop_map(|(stat, flat_bonus, percent_bonus, multiplier)| StatModifier {
                    stat,
                    flat_bonus,
                    percent_bonus,
                    multiplier,
                })
        }

        proptest! {
            #[test]
            fn prop_add_remove_restores_layers(mods in prop::collection::vec(any_modifier(), 0..8)) {
                let mut block = StatBlock::default();
                let src = ModifierSource::Custom("prop".to_string());
                block.add_modifiers(&src, &mods);
                block.remove_modifiers(&src, &mods);
                for key in StatKey::all() {
                    let stat = block.stat(*key);
                    prop_assert!(stat.added_bonus().abs() < 1e-6);
                    prop_assert!(stat.percent_bonus().abs() < 1e-6);
                    prop_assert!(stat.multipliers().is_empty());
                }
            }

            #[test]
            fn prop_repeated_reads_are_stable(mods in prop::collection::vec(any_modifier(), 0..8)) {
                let mut block = StatBlock::default();
                block.add_modifiers(&ModifierSource::Custom("prop".to_string()), &mods);
                for key in StatKey::all() {
                    let a = block.get(*key);
                    let count = block.recomputations();
                    let b = block.get(*key);
                    prop_assert_eq!(a.to_bits(), b.to_bits());
                    prop_assert_eq!(block.recomputations(), count);
                }
            }
        }
    }
}
