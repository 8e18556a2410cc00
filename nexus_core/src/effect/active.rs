//! ObjectEffect - Runtime effect instances attached to a target

use super::types::{EffectDefinition, EffectKind};
use crate::stat_block::{EffectCreator, ModifierSource, StatBlock, StatModifier};
use crate::types::{AbilityId, ObjectId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Variant data of an active effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectEffectKind {
    Simple,
    Stacking { stacks: u32 },
    /// Effect granted directly by an ability (self buffs, channels)
    Ability { ability: AbilityId, level: u32 },
}

/// An effect currently applied to a target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectEffect {
    pub creator: EffectCreator,
    pub kind: ObjectEffectKind,
    /// Seconds remaining; `None` is permanent
    pub duration: Option<f64>,
    /// Exactly the modifiers that were applied; removal replays this list
    applied: Vec<StatModifier>,
    /// Damage per second at the current stack count
    pub damage_per_second: f64,
    /// Object that applied the effect, if any
    pub source: Option<ObjectId>,
}

impl ObjectEffect {
    pub fn stacks(&self) -> u32 {
        match self.kind {
            ObjectEffectKind::Stacking { stacks } => stacks,
            _ => 1,
        }
    }

    pub fn applied_modifiers(&self) -> &[StatModifier] {
        &self.applied
    }

    pub fn is_expired(&self) -> bool {
        matches!(self.duration, Some(d) if d <= 0.0)
    }

    fn modifier_source(&self) -> ModifierSource {
        ModifierSource::Effect(self.creator.clone())
    }

    fn apply(&self, stats: &mut StatBlock) {
        stats.add_modifiers(&self.modifier_source(), &self.applied);
    }

    fn remove(&self, stats: &mut StatBlock) {
        stats.remove_modifiers(&self.modifier_source(), &self.applied);
    }
}

/// Longer of two durations; a permanent effect stays permanent
fn extend(current: Option<f64>, new: Option<f64>) -> Option<f64> {
    match (current, new) {
        (Some(a), Some(b)) => Some(a.max(b)),
        _ => None,
    }
}

/// Result of one aging step
#[derive(Debug, Clone, Default)]
pub struct EffectTickResult {
    /// Damage over time accrued this step, per source
    pub damage: Vec<(Option<ObjectId>, f64)>,
    pub expired: Vec<EffectCreator>,
}

impl EffectTickResult {
    pub fn total_damage(&self) -> f64 {
        self.damage.iter().map(|(_, d)| d).sum()
    }
}

/// Effects on one target, at most one per creator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActiveEffects {
    effects: BTreeMap<EffectCreator, ObjectEffect>,
}

impl ActiveEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn get(&self, creator: &EffectCreator) -> Option<&ObjectEffect> {
        self.effects.get(creator)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectEffect> {
        self.effects.values()
    }

    /// Apply `stacks` stacks of a definition
    ///
    /// An existing instance from the same definition is merged: its old
    /// modifiers come off, the stack count is merged and clamped, the new
    /// modifiers go on and the duration is extended, never shortened.
    pub fn apply_stacks(
        &mut self,
        stats: &mut StatBlock,
        definition: &EffectDefinition,
        stacks: u32,
        source: Option<ObjectId>,
    ) {
        let creator = EffectCreator::Effect(definition.id.clone());

        if let Some(existing) = self.effects.get_mut(&creator) {
            existing.remove(stats);

            let merged = match definition.kind {
                EffectKind::Simple => 1,
                EffectKind::Stacking { .. } => {
                    definition.clamp_stacks(existing.stacks().saturating_add(stacks))
                }
            };
            if let ObjectEffectKind::Stacking { stacks } = &mut existing.kind {
                *stacks = merged;
            }
            existing.applied = definition.modifiers_for(merged);
            existing.damage_per_second = definition.damage_per_second * merged as f64;
            existing.duration = extend(existing.duration, definition.duration);
            if source.is_some() {
                existing.source = source;
            }
            existing.apply(stats);
            return;
        }

        let (kind, count) = match definition.kind {
            EffectKind::Simple => (ObjectEffectKind::Simple, 1),
            EffectKind::Stacking { .. } => {
                let count = definition.clamp_stacks(stacks);
                (ObjectEffectKind::Stacking { stacks: count }, count)
            }
        };
        let effect = ObjectEffect {
            creator: creator.clone(),
            kind,
            duration: definition.duration,
            applied: definition.modifiers_for(count),
            damage_per_second: definition.damage_per_second * count as f64,
            source,
        };
        effect.apply(stats);
        self.effects.insert(creator, effect);
    }

    /// Apply a simple (non-stacking) definition
    pub fn apply(&mut self, stats: &mut StatBlock, definition: &EffectDefinition, source: Option<ObjectId>) {
        self.apply_stacks(stats, definition, 1, source);
    }

    /// Apply or refresh an ability-granted effect with a fixed modifier list
    pub fn apply_ability_effect(
        &mut self,
        stats: &mut StatBlock,
        ability: &AbilityId,
        level: u32,
        modifiers: Vec<StatModifier>,
        duration: Option<f64>,
    ) {
        let creator = EffectCreator::Ability(ability.clone());
        let previous_duration = match self.effects.remove(&creator) {
            Some(old) => {
                old.remove(stats);
                Some(old.duration)
            }
            None => None,
        };
        let duration = match previous_duration {
            Some(previous) => extend(previous, duration),
            None => duration,
        };
        let effect = ObjectEffect {
            creator: creator.clone(),
            kind: ObjectEffectKind::Ability {
                ability: ability.clone(),
                level,
            },
            duration,
            applied: modifiers,
            damage_per_second: 0.0,
            source: None,
        };
        effect.apply(stats);
        self.effects.insert(creator, effect);
    }

    /// Remove an effect explicitly
    pub fn remove(&mut self, stats: &mut StatBlock, creator: &EffectCreator) -> bool {
        match self.effects.remove(creator) {
            Some(effect) => {
                effect.remove(stats);
                true
            }
            None => false,
        }
    }

    /// Detach every effect applied by `source`; returns how many were removed
    pub fn remove_from_source(&mut self, stats: &mut StatBlock, source: ObjectId) -> usize {
        let creators: Vec<EffectCreator> = self
            .effects
            .iter()
            .filter(|(_, e)| e.source == Some(source))
            .map(|(c, _)| c.clone())
            .collect();
        for creator in &creators {
            self.remove(stats, creator);
        }
        creators.len()
    }

    /// Remove every effect (death, respawn)
    pub fn clear(&mut self, stats: &mut StatBlock) {
        for (_, effect) in std::mem::take(&mut self.effects) {
            effect.remove(stats);
        }
    }

    /// Age every timed effect by `dt` seconds, removing the expired ones
    pub fn age(&mut self, stats: &mut StatBlock, dt: f64) -> EffectTickResult {
        let mut result = EffectTickResult::default();

        for effect in self.effects.values_mut() {
            let step = match effect.duration {
                Some(remaining) => dt.min(remaining.max(0.0)),
                None => dt,
            };
            if effect.damage_per_second > 0.0 && step > 0.0 {
                result.damage.push((effect.source, effect.damage_per_second * step));
            }
            if let Some(remaining) = effect.duration.as_mut() {
                *remaining -= dt;
            }
        }

        let expired: Vec<EffectCreator> = self
            .effects
            .iter()
            .filter(|(_, e)| e.is_expired())
            .map(|(c, _)| c.clone())
            .collect();
        for creator in expired {
            if let Some(effect) = self.effects.remove(&creator) {
                effect.remove(stats);
            }
            result.expired.push(creator);
        }

        result
    }
}
