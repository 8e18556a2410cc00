//! Content definitions for heroes, allies, enemies and items

use crate::stat_block::{StatModifier, StatProfile};
use crate::types::{AbilityId, AllyTypeId, EnemyTypeId, EquipmentSlot, HeroClassId, ItemId, ScaledValue};
use serde::{Deserialize, Serialize};

fn default_unit_radius() -> f64 {
    8.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroClass {
    pub id: HeroClassId,
    pub name: String,
    #[serde(default)]
    pub stats: StatProfile,
    /// Abilities this class may learn
    #[serde(default)]
    pub abilities: Vec<AbilityId>,
    /// Learned at level 1 when the hero is created
    #[serde(default)]
    pub starting_abilities: Vec<AbilityId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllyDefinition {
    pub id: AllyTypeId,
    pub name: String,
    #[serde(default)]
    pub stats: StatProfile,
    #[serde(default = "default_unit_radius")]
    pub radius: f64,
    #[serde(default)]
    pub abilities: Vec<AbilityId>,
}

/// An enemy type; stats scale with the spawn level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyDefinition {
    pub id: EnemyTypeId,
    pub name: String,
    #[serde(default)]
    pub stats: StatProfile,
    #[serde(default = "default_unit_radius")]
    pub radius: f64,
    #[serde(default)]
    pub xp_reward: ScaledValue,
    #[serde(default)]
    pub essence_reward: ScaledValue,
    #[serde(default)]
    pub abilities: Vec<AbilityId>,
}

/// A craftable piece of equipment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub id: ItemId,
    pub name: String,
    pub slot: EquipmentSlot,
    #[serde(default)]
    pub modifiers: Vec<StatModifier>,
}

impl ItemDefinition {
    /// Placeholder used when an item id does not resolve
    pub fn missing(id: &ItemId) -> Self {
        ItemDefinition {
            id: id.clone(),
            name: "Missing Item".to_string(),
            slot: EquipmentSlot::Trinket,
            modifiers: Vec::new(),
        }
    }
}
