//! Stat keys and base-value definitions

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Every combat-relevant attribute a unit owns a stat for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKey {
    MaxHealth,
    HealthRegen,
    Damage,
    AttackRange,
    AttacksPerSecond,
    Armor,
    /// Chance in `[0, 1]`
    CriticalChance,
    CriticalMultiplier,
    /// Drives the extra-hit rejection chain
    ExtraHitChance,
    CooldownSpeed,
    MovementSpeed,
    AggroRadius,
    /// 0 means invulnerable
    IncomingDamageMultiplier,
    /// Generic throttle on a unit's own clock (stuns multiply by 0)
    Speed,
}

impl StatKey {
    pub fn all() -> &'static [StatKey] {
        &[
            StatKey::MaxHealth,
            StatKey::HealthRegen,
            StatKey::Damage,
            StatKey::AttackRange,
            StatKey::AttacksPerSecond,
            StatKey::Armor,
            StatKey::CriticalChance,
            StatKey::CriticalMultiplier,
            StatKey::ExtraHitChance,
            StatKey::CooldownSpeed,
            StatKey::MovementSpeed,
            StatKey::AggroRadius,
            StatKey::IncomingDamageMultiplier,
            StatKey::Speed,
        ]
    }

    /// Base used when a profile does not mention this key
    pub fn default_base(self) -> StatBase {
        let value = match self {
            StatKey::MaxHealth => 50.0,
            StatKey::HealthRegen => 0.0,
            StatKey::Damage => 5.0,
            StatKey::AttackRange => 10.0,
            StatKey::AttacksPerSecond => 1.0,
            StatKey::Armor => 0.0,
            StatKey::CriticalChance => 0.0,
            StatKey::CriticalMultiplier => 2.0,
            StatKey::ExtraHitChance => 0.0,
            StatKey::CooldownSpeed => 1.0,
            StatKey::MovementSpeed => 50.0,
            StatKey::AggroRadius => 100.0,
            StatKey::IncomingDamageMultiplier => 1.0,
            StatKey::Speed => 1.0,
        };
        StatBase::Constant { value }
    }

    /// Clamp bounds applied after the modifier layers
    pub fn bounds(self) -> (Option<f64>, Option<f64>) {
        match self {
            StatKey::MaxHealth => (Some(1.0), None),
            StatKey::CriticalChance => (Some(0.0), Some(1.0)),
            StatKey::CriticalMultiplier => (Some(1.0), None),
            StatKey::AttacksPerSecond => (Some(0.0), None),
            StatKey::Armor
            | StatKey::ExtraHitChance
            | StatKey::CooldownSpeed
            | StatKey::MovementSpeed
            | StatKey::AggroRadius
            | StatKey::IncomingDamageMultiplier
            | StatKey::Speed
            | StatKey::Damage
            | StatKey::AttackRange => (Some(0.0), None),
            StatKey::HealthRegen => (None, None),
        }
    }
}

/// Where a stat's base value comes from before modifiers are layered on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StatBase {
    Constant { value: f64 },
    /// `base + per_level * (level - 1)` of the owner
    PerLevel { base: f64, per_level: f64 },
    /// `plus + ratio * final(from)` of the same owner
    Derived { from: StatKey, ratio: f64, #[serde(default)] plus: f64 },
}

impl StatBase {
    pub fn constant(value: f64) -> Self {
        StatBase::Constant { value }
    }

    pub fn per_level(base: f64, per_level: f64) -> Self {
        StatBase::PerLevel { base, per_level }
    }
}

/// Per-key base values for a unit type; missing keys use the defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatProfile(pub BTreeMap<StatKey, StatBase>);

impl StatProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: StatKey, base: StatBase) -> Self {
        self.0.insert(key, base);
        self
    }

    pub fn base_for(&self, key: StatKey) -> StatBase {
        self.0.get(&key).copied().unwrap_or_else(|| key.default_base())
    }

    /// First stat whose chain of derived bases leads back to itself
    pub fn derived_cycle(&self) -> Option<StatKey> {
        StatKey::all().iter().copied().find(|&start| {
            let mut current = start;
            // a chain longer than the key count must revisit a key
            for _ in 0..StatKey::all().len() {
                match self.base_for(current) {
                    StatBase::Derived { from, .. } if from == start => return true,
                    StatBase::Derived { from, .. } => current = from,
                    _ => return false,
                }
            }
            false
        })
    }
}
