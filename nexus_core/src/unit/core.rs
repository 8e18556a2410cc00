//! UnitCore - State shared by every fighting unit

use crate::ability::{AbilityDefinition, AbilityKind, ActiveAbility, PassiveAbility};
use crate::combat::AbilityTarget;
use crate::effect::ActiveEffects;
use crate::stat_block::{StatBlock, StatKey};
use crate::types::{AbilityId, Circle, ObjectId, Team};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoveTarget {
    pub x: f64,
    pub y: f64,
}

/// An ability on its way to activation (moving into range)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityUse {
    pub ability: AbilityId,
    pub target: AbilityTarget,
}

#[derive(Debug, Clone)]
pub struct UnitCore {
    pub id: ObjectId,
    pub circle: Circle,
    pub team: Team,
    pub stats: StatBlock,
    pub health: f64,
    pub effects: ActiveEffects,
    pub abilities: Vec<ActiveAbility>,
    pub passives: Vec<PassiveAbility>,
    /// Seconds until the next basic attack
    pub attack_cooldown: f64,
    /// Milliseconds until autocast may fire again
    pub autocast_lock: f64,
    /// Explicitly commanded attack target
    pub attack_target: Option<ObjectId>,
    pub movement_target: Option<MoveTarget>,
    pub ability_use: Option<AbilityUse>,
    /// Ability selected and awaiting a target
    pub selected_ability: Option<AbilityId>,
    /// A hostile body is touching this unit
    pub blocked: bool,
}

impl UnitCore {
    pub fn new(id: ObjectId, circle: Circle, team: Team, stats: StatBlock) -> Self {
        let health = stats.get(StatKey::MaxHealth);
        UnitCore {
            id,
            circle,
            team,
            stats,
            health,
            effects: ActiveEffects::new(),
            abilities: Vec::new(),
            passives: Vec::new(),
            attack_cooldown: 0.0,
            autocast_lock: 0.0,
            attack_target: None,
            movement_target: None,
            ability_use: None,
            selected_ability: None,
            blocked: false,
        }
    }

    pub fn max_health(&self) -> f64 {
        self.stats.get(StatKey::MaxHealth)
    }

    pub fn health_fraction(&self) -> f64 {
        let max = self.max_health();
        if max <= 0.0 {
            0.0
        } else {
            (self.health / max).clamp(0.0, 1.0)
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn clamp_health(&mut self) {
        let max = self.max_health();
        if self.health > max {
            self.health = max;
        }
    }

    /// Heal up to max health; returns the amount restored
    pub fn heal(&mut self, amount: f64) -> f64 {
        if amount <= 0.0 || !self.is_alive() {
            return 0.0;
        }
        let before = self.health;
        self.health = (self.health + amount).min(self.max_health());
        (self.health - before).max(0.0)
    }

    pub fn active(&self, id: &AbilityId) -> Option<&ActiveAbility> {
        self.abilities.iter().find(|a| &a.ability == id)
    }

    pub fn active_mut(&mut self, id: &AbilityId) -> Option<&mut ActiveAbility> {
        self.abilities.iter_mut().find(|a| &a.ability == id)
    }

    pub fn ability_level(&self, id: &AbilityId) -> u32 {
        self.active(id)
            .map(|a| a.level)
            .or_else(|| self.passives.iter().find(|p| &p.ability == id).map(|p| p.level))
            .unwrap_or(0)
    }

    /// Learn or level an ability; learning an active one grants full charges
    pub fn set_ability_level(&mut self, definition: &AbilityDefinition, level: u32) {
        match &definition.kind {
            AbilityKind::Active(spec) => match self.active_mut(&definition.id) {
                Some(ability) => {
                    if ability.level == 0 && level > 0 {
                        ability.charges = spec.max_charges.max(1);
                        ability.cooldown = 0.0;
                    }
                    ability.level = level;
                    ability.clamp_charges(spec);
                }
                None => {
                    self.abilities
                        .push(ActiveAbility::new(definition.id.clone(), level, spec));
                }
            },
            AbilityKind::Passive(spec) => {
                let index = match self.passives.iter().position(|p| p.ability == definition.id) {
                    Some(index) => index,
                    None => {
                        self.passives.push(PassiveAbility::new(definition.id.clone()));
                        self.passives.len() - 1
                    }
                };
                self.passives[index].set_level(&mut self.stats, spec, level);
            }
        }
    }

    /// Abandon every command and in-progress ability use
    pub fn reset_commands(&mut self) {
        self.attack_target = None;
        self.movement_target = None;
        self.ability_use = None;
        self.selected_ability = None;
    }
}
