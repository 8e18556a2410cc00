//! Hero - Player-controlled unit with levels, equipment and a revive timer

use super::actions::UnitAction;
use super::behavior::{
    acquire_attack_target, age_effects, attack_or_chase, autocast, begin_update, resolve_ability_use,
    tick_abilities, update_passives, UpdateContext,
};
use super::core::UnitCore;
use super::definitions::{HeroClass, ItemDefinition};
use super::movement::move_towards;
use crate::config::{Content, SimConstants};
use crate::stat_block::{ModifierSource, StatBlock, StatKey, StatModifier};
use crate::types::{Circle, EquipmentSlot, HeroClassId, ItemId, JobKey, ObjectId, Team};
use crate::world::{FieldObject, Neighbors, StructureKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{error, info};

/// Time left until a dead hero returns
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReviveTimer {
    pub total: f64,
    pub remaining: f64,
}

impl ReviveTimer {
    pub fn new(seconds: f64) -> Self {
        ReviveTimer {
            total: seconds,
            remaining: seconds,
        }
    }

    pub fn fraction(&self) -> f64 {
        if self.total <= 0.0 {
            0.0
        } else {
            (self.remaining / self.total).clamp(0.0, 1.0)
        }
    }
}

#[derive(Debug, Clone)]
pub struct Hero {
    pub core: UnitCore,
    pub name: String,
    pub class: HeroClassId,
    pub level: u32,
    /// Experience toward the next level
    pub xp: f64,
    pub equipment: BTreeMap<EquipmentSlot, ItemId>,
    /// Exact modifiers added per slot, removed verbatim on unequip
    equipped_modifiers: BTreeMap<EquipmentSlot, Vec<StatModifier>>,
    pub revive: Option<ReviveTimer>,
    /// Job this hero works on while idle
    pub job: Option<JobKey>,
}

impl Hero {
    pub fn new(id: ObjectId, class: &HeroClass, content: &Content, name: &str, x: f64, y: f64, radius: f64) -> Self {
        let stats = StatBlock::from_profile(&class.stats, 1);
        let mut core = UnitCore::new(id, Circle::new(x, y, radius), Team::Player, stats);
        for ability in &class.starting_abilities {
            match content.ability(ability) {
                Some(definition) => core.set_ability_level(definition, 1),
                None => error!(%ability, class = %class.id, "missing starting ability"),
            }
        }
        core.health = core.max_health();

        Hero {
            core,
            name: name.to_string(),
            class: class.id.clone(),
            level: 1,
            xp: 0.0,
            equipment: BTreeMap::new(),
            equipped_modifiers: BTreeMap::new(),
            revive: None,
            job: None,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.core.id
    }

    pub fn is_dead(&self) -> bool {
        self.revive.is_some()
    }

    pub fn is_available(&self) -> bool {
        self.revive.is_none() && self.core.is_alive()
    }

    /// Start the revive timer; commands and effects are dropped
    pub fn die(&mut self, revive_seconds: f64) {
        self.core.health = 0.0;
        self.core.effects.clear(&mut self.core.stats);
        self.core.reset_commands();
        self.core.attack_cooldown = 0.0;
        self.revive = Some(ReviveTimer::new(revive_seconds));
    }

    /// Count the revive timer down; true once it has run out
    pub fn tick_revive(&mut self, dt: f64) -> bool {
        match &mut self.revive {
            Some(timer) => {
                timer.remaining -= dt;
                timer.remaining <= 0.0
            }
            None => false,
        }
    }

    /// Return to life at full health at `(x, y)`
    pub fn revive_at(&mut self, x: f64, y: f64) {
        self.revive = None;
        self.core.effects.clear(&mut self.core.stats);
        self.core.reset_commands();
        self.core.circle.x = x;
        self.core.circle.y = y;
        self.core.health = self.core.max_health();
        info!(hero = %self.core.id, name = %self.name, "hero revived");
    }

    /// Advance one level; the health cap growth is granted as health
    pub fn gain_hero_level(&mut self) {
        let before = self.core.max_health();
        self.level += 1;
        self.core.stats.set_level(self.level);
        let gained = self.core.max_health() - before;
        if gained > 0.0 && self.core.is_alive() {
            self.core.health += gained;
        }
        self.core.clamp_health();
    }

    /// Add experience; returns the number of levels gained
    pub fn gain_xp(&mut self, xp: f64, constants: &SimConstants) -> u32 {
        if !(xp > 0.0) {
            return 0;
        }
        self.xp += xp;
        let mut gained = 0;
        loop {
            let needed = constants.xp_to_next_level(self.level);
            if needed <= 0.0 || self.xp < needed {
                break;
            }
            self.xp -= needed;
            self.gain_hero_level();
            gained += 1;
        }
        if gained > 0 {
            info!(hero = %self.core.id, level = self.level, "hero levelled up");
        }
        gained
    }

    /// Put `item` in its slot; returns the item it replaced
    pub fn equip(&mut self, item: &ItemDefinition) -> Option<ItemId> {
        let previous = self.unequip(item.slot);
        let source = ModifierSource::Equipment(item.slot);
        self.core.stats.add_modifiers(&source, &item.modifiers);
        self.equipped_modifiers.insert(item.slot, item.modifiers.clone());
        self.equipment.insert(item.slot, item.id.clone());
        self.core.clamp_health();
        previous
    }

    pub fn unequip(&mut self, slot: EquipmentSlot) -> Option<ItemId> {
        if let Some(modifiers) = self.equipped_modifiers.remove(&slot) {
            self.core
                .stats
                .remove_modifiers(&ModifierSource::Equipment(slot), &modifiers);
        }
        let previous = self.equipment.remove(&slot);
        self.core.clamp_health();
        previous
    }

    pub fn damage(&self) -> f64 {
        self.core.stats.get(StatKey::Damage)
    }

    pub fn max_health(&self) -> f64 {
        self.core.max_health()
    }

    pub fn update(&mut self, neighbors: &Neighbors<'_>, ctx: &mut UpdateContext<'_>, actions: &mut Vec<UnitAction>) {
        if !self.is_available() {
            return;
        }

        let dt = begin_update(&mut self.core, neighbors, ctx);
        tick_abilities(&mut self.core, ctx, dt);
        if dt > 0.0 {
            autocast(&mut self.core, neighbors, ctx);
        }
        update_passives(&mut self.core, neighbors, ctx, actions, dt);
        age_effects(&mut self.core, ctx.frame, actions);
        self.collect_loot(neighbors, actions);

        if dt <= 0.0 {
            return;
        }
        if resolve_ability_use(&mut self.core, neighbors, ctx, actions, dt) {
            return;
        }

        let idle = self.core.movement_target.is_none();
        if let Some(target) = acquire_attack_target(&mut self.core, neighbors, idle) {
            if attack_or_chase(&mut self.core, target, neighbors, ctx, actions, dt) {
                return;
            }
        }

        if let Some(destination) = self.core.movement_target {
            let step = self.core.stats.get(StatKey::MovementSpeed) * dt;
            if move_towards(&mut self.core.circle, destination.x, destination.y, step) {
                self.core.movement_target = None;
                if let Some(zone) = portal_under(neighbors, &self.core.circle) {
                    actions.push(UnitAction::EnterZone {
                        hero: self.core.id,
                        zone,
                    });
                }
            }
            return;
        }

        if let Some(job) = &self.job {
            actions.push(UnitAction::JobWork {
                hero: self.core.id,
                job: job.clone(),
                seconds: ctx.frame,
            });
        }
    }

    fn collect_loot(&self, neighbors: &Neighbors<'_>, actions: &mut Vec<UnitAction>) {
        for object in neighbors.iter() {
            if let FieldObject::Loot(loot) = object {
                if loot.circle.intersects(&self.core.circle) {
                    actions.push(UnitAction::CollectLoot { loot: loot.id });
                }
            }
        }
    }
}

/// Destination of a portal the circle stands on
fn portal_under(neighbors: &Neighbors<'_>, circle: &Circle) -> Option<crate::types::ZoneId> {
    neighbors.iter().find_map(|object| match object {
        FieldObject::Structure(structure) if structure.circle.intersects(circle) => match &structure.kind {
            StructureKind::Portal { zone } => Some(zone.clone()),
            StructureKind::ResourceNode { .. } => None,
        },
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HeroClassId;

    fn warrior() -> Hero {
        let content = Content::with_defaults();
        let class = &content.hero_classes[&HeroClassId::from("warrior")];
        Hero::new(ObjectId(1), class, &content, "Aldric", 0.0, 0.0, 8.0)
    }

    #[test]
    fn test_starts_with_class_abilities() {
        let hero = warrior();
        assert_eq!(hero.level, 1);
        assert!(!hero.core.abilities.is_empty() || !hero.core.passives.is_empty());
        assert!((hero.core.health - hero.max_health()).abs() < f64::EPSILON);
    }

    #[test]
    fn test_die_and_revive() {
        let mut hero = warrior();
        hero.die(5.0);
        assert!(hero.is_dead());
        assert!(!hero.is_available());
        assert!(!hero.tick_revive(4.0));
        assert!(hero.tick_revive(1.0));
        hero.revive_at(3.0, 4.0);
        assert!(hero.is_available());
        assert!((hero.core.circle.x - 3.0).abs() < f64::EPSILON);
        assert!((hero.core.health - hero.max_health()).abs() < f64::EPSILON);
    }

    #[test]
    fn test_xp_levels_carry_over() {
        let constants = SimConstants::default();
        let mut hero = warrior();
        // 100 for level 2, 150 for level 3
        let gained = hero.gain_xp(260.0, &constants);
        assert_eq!(gained, 2);
        assert_eq!(hero.level, 3);
        assert!((hero.xp - 10.0).abs() < 1e-9);
        assert_eq!(hero.core.stats.level(), 3);
    }

    #[test]
    fn test_equip_swaps_modifiers() {
        let content = Content::with_defaults();
        let mut hero = warrior();
        let base = hero.damage();

        let bronze = content.item(&ItemId::from("bronze_sword"));
        let iron = content.item(&ItemId::from("iron_sword"));
        assert_eq!(hero.equip(&bronze), None);
        let with_bronze = hero.damage();
        assert!(with_bronze > base);

        assert_eq!(hero.equip(&iron), Some(bronze.id.clone()));
        assert!(hero.damage() > with_bronze);

        assert_eq!(hero.unequip(EquipmentSlot::Weapon), Some(iron.id.clone()));
        assert!((hero.damage() - base).abs() < 1e-9);
    }
}
