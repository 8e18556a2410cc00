//! Effect type definitions

use crate::stat_block::StatModifier;
use crate::types::EffectId;
use serde::{Deserialize, Serialize};

/// How repeated applications of an effect combine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectKind {
    /// A single instance; reapplying only extends the duration
    Simple,
    /// Magnitude scales with an accumulated stack counter
    Stacking {
        #[serde(default)]
        max_stacks: Option<u32>,
    },
}

/// Configuration for a status effect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectDefinition {
    pub id: EffectId,
    pub name: String,
    pub kind: EffectKind,
    /// Seconds; `None` is permanent until explicitly removed
    #[serde(default)]
    pub duration: Option<f64>,
    /// Modifiers for one stack
    #[serde(default)]
    pub modifiers: Vec<StatModifier>,
    /// Damage per second for one stack
    #[serde(default)]
    pub damage_per_second: f64,
    #[serde(default)]
    pub is_debuff: bool,
}

impl EffectDefinition {
    pub fn max_stacks(&self) -> Option<u32> {
        match self.kind {
            EffectKind::Simple => Some(1),
            EffectKind::Stacking { max_stacks } => max_stacks,
        }
    }

    /// Clamp a stack count to this definition's limit
    pub fn clamp_stacks(&self, stacks: u32) -> u32 {
        let stacks = stacks.max(1);
        match self.max_stacks() {
            Some(max) => stacks.min(max.max(1)),
            None => stacks,
        }
    }

    /// The modifier list for a given number of stacks
    pub fn modifiers_for(&self, stacks: u32) -> Vec<StatModifier> {
        self.modifiers.iter().map(|m| m.scaled(stacks)).collect()
    }
}
