//! Status effect system

mod active;
mod types;

pub use active::{ActiveEffects, EffectTickResult, ObjectEffect, ObjectEffectKind};
pub use types::{EffectDefinition, EffectKind};

use crate::stat_block::{StatKey, StatModifier};
use crate::types::EffectId;
use std::collections::HashMap;

/// Effect definition registry
#[derive(Debug, Clone, Default)]
pub struct EffectRegistry {
    definitions: HashMap<EffectId, EffectDefinition>,
}

impl EffectRegistry {
    pub fn new() -> Self {
        EffectRegistry {
            definitions: HashMap::new(),
        }
    }

    pub fn register(&mut self, definition: EffectDefinition) {
        self.definitions.insert(definition.id.clone(), definition);
    }

    pub fn get(&self, id: &EffectId) -> Option<&EffectDefinition> {
        self.definitions.get(id)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Load default effect types
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        // Stun - frozen clock
        registry.register(EffectDefinition {
            id: EffectId::from("stun"),
            name: "Stun".to_string(),
            kind: EffectKind::Simple,
            duration: Some(1.0),
            modifiers: vec![StatModifier::multiplier(StatKey::Speed, 0.0)],
            damage_per_second: 0.0,
            is_debuff: true,
        });

        registry.register(EffectDefinition {
            id: EffectId::from("slow"),
            name: "Slow".to_string(),
            kind: EffectKind::Simple,
            duration: Some(2.0),
            modifiers: vec![StatModifier::percent(StatKey::MovementSpeed, -40.0)],
            damage_per_second: 0.0,
            is_debuff: true,
        });

        // Poison - unlimited stacks, damage scales with stacks
        registry.register(EffectDefinition {
            id: EffectId::from("poison"),
            name: "Poison".to_string(),
            kind: EffectKind::Stacking { max_stacks: None },
            duration: Some(3.0),
            modifiers: Vec::new(),
            damage_per_second: 2.0,
            is_debuff: true,
        });

        registry.register(EffectDefinition {
            id: EffectId::from("armor_break"),
            name: "Armor Break".to_string(),
            kind: EffectKind::Stacking { max_stacks: Some(5) },
            duration: Some(4.0),
            modifiers: vec![StatModifier::flat(StatKey::Armor, -2.0)],
            damage_per_second: 0.0,
            is_debuff: true,
        });

        registry.register(EffectDefinition {
            id: EffectId::from("frenzy"),
            name: "Frenzy".to_string(),
            kind: EffectKind::Stacking { max_stacks: Some(3) },
            duration: Some(4.0),
            modifiers: vec![StatModifier::percent(StatKey::AttacksPerSecond, 15.0)],
            damage_per_second: 0.0,
            is_debuff: false,
        });

        // Applied every tick by the inspire aura, so the duration only
        // needs to outlive one tick
        registry.register(EffectDefinition {
            id: EffectId::from("inspired"),
            name: "Inspired".to_string(),
            kind: EffectKind::Simple,
            duration: Some(0.5),
            modifiers: vec![StatModifier::percent(StatKey::Damage, 20.0)],
            damage_per_second: 0.0,
            is_debuff: false,
        });

        registry.register(EffectDefinition {
            id: EffectId::from("fortified"),
            name: "Fortified".to_string(),
            kind: EffectKind::Simple,
            duration: Some(5.0),
            modifiers: vec![StatModifier::multiplier(StatKey::IncomingDamageMultiplier, 0.5)],
            damage_per_second: 0.0,
            is_debuff: false,
        });

        registry
    }
}
