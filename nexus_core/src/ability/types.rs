//! Ability definitions

use crate::stat_block::StatModifier;
use crate::types::{AbilityId, AllyTypeId, EffectId, ScaledValue};
use serde::{Deserialize, Serialize};

/// What an active ability may be aimed at
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Targeting {
    #[serde(default)]
    pub allies: bool,
    #[serde(default)]
    pub enemies: bool,
    #[serde(default)]
    pub location: bool,
    /// Cast range measured edge to edge
    #[serde(default)]
    pub range: f64,
}

impl Targeting {
    /// No targeting capability: the ability fires on the caster at once
    pub fn is_immediate(&self) -> bool {
        !self.allies && !self.enemies && !self.location
    }
}

/// A lingering damage area left behind by an expiring projectile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoolSpec {
    pub radius: f64,
    pub damage_per_second: f64,
    /// Seconds
    pub duration: f64,
}

/// One step of an active ability's resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AbilityAction {
    /// `amount + damage_ratio * caster damage` to hostiles at the target
    /// (radius 0 hits only the target object)
    Damage {
        amount: ScaledValue,
        #[serde(default)]
        damage_ratio: f64,
        #[serde(default)]
        radius: f64,
    },
    Heal {
        amount: ScaledValue,
        #[serde(default)]
        radius: f64,
    },
    ApplyEffect {
        effect: EffectId,
        #[serde(default = "default_stacks")]
        stacks: u32,
        #[serde(default)]
        radius: f64,
        /// Friendly effects land on the caster's side instead
        #[serde(default)]
        friendly: bool,
    },
    /// Timed modifiers on the caster
    SelfBuff {
        modifiers: Vec<StatModifier>,
        /// Seconds
        duration: ScaledValue,
    },
    Projectile {
        damage: ScaledValue,
        speed: f64,
        radius: f64,
        /// Seconds of flight
        duration: f64,
        #[serde(default)]
        piercing: bool,
        #[serde(default)]
        effect: Option<EffectId>,
        #[serde(default)]
        pool: Option<PoolSpec>,
    },
    Summon {
        ally: AllyTypeId,
        #[serde(default = "default_stacks")]
        count: u32,
        /// Seconds
        lifetime: f64,
    },
}

fn default_stacks() -> u32 {
    1
}

fn default_charges() -> u32 {
    1
}

fn default_max_level() -> u32 {
    5
}

/// Cooldown, charges and actions of an active ability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveSpec {
    #[serde(default)]
    pub targeting: Targeting,
    /// Milliseconds per charge
    pub cooldown: ScaledValue,
    #[serde(default = "default_charges")]
    pub max_charges: u32,
    pub actions: Vec<AbilityAction>,
    /// Telegraph wind-up in milliseconds (enemy casts only)
    #[serde(default)]
    pub warning_duration: f64,
    /// Milliseconds during which no other enemy in the zone may start this
    /// ability (enemy casts only)
    #[serde(default)]
    pub zone_cooldown: f64,
}

impl ActiveSpec {
    pub fn is_multi_charge(&self) -> bool {
        self.max_charges > 1
    }

    pub fn cooldown_at(&self, level: u32) -> f64 {
        self.cooldown.at(level).max(0.0)
    }
}

/// Event hooks of a passive ability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PassiveHook {
    /// update: keep an effect on every object in range
    Aura {
        effect: EffectId,
        radius: f64,
        /// Aura hits the opposing side instead of allies
        #[serde(default)]
        hostile: bool,
    },
    /// update: heal the owner
    Regeneration { per_second: ScaledValue },
    /// onHitTarget: chance to apply an effect to the struck target
    OnHitEffect {
        effect: EffectId,
        #[serde(default = "default_stacks")]
        stacks: u32,
        chance: f64,
    },
    /// onHitTarget: a fraction of the hit splashes to hostiles around the target
    Cleave { radius: f64, fraction: ScaledValue },
    /// modifyDamage: bonus percent against targets below a health fraction
    BonusVsWounded { threshold: f64, percent: ScaledValue },
    /// Permanent modifiers while learned, scaled by level
    StatBonus { modifiers: Vec<StatModifier> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassiveSpec {
    pub hooks: Vec<PassiveHook>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AbilityKind {
    Active(ActiveSpec),
    Passive(PassiveSpec),
}

/// Configuration for an ability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityDefinition {
    pub id: AbilityId,
    pub name: String,
    pub kind: AbilityKind,
    /// Essence to reach the next level from `level` (evaluated at the
    /// current level, so learning from 0 reads `at(0)` = base)
    #[serde(default)]
    pub level_cost: ScaledValue,
    #[serde(default = "default_max_level")]
    pub max_level: u32,
}

impl AbilityDefinition {
    pub fn active(&self) -> Option<&ActiveSpec> {
        match &self.kind {
            AbilityKind::Active(spec) => Some(spec),
            AbilityKind::Passive(_) => None,
        }
    }

    pub fn passive(&self) -> Option<&PassiveSpec> {
        match &self.kind {
            AbilityKind::Passive(spec) => Some(spec),
            AbilityKind::Active(_) => None,
        }
    }

    pub fn cost_to_level(&self, current_level: u32) -> f64 {
        self.level_cost.at(current_level).max(0.0)
    }
}
