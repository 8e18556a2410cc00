//! Damage pipeline - Applying hits and heals to field objects

use super::result::DamageOutcome;
use crate::stat_block::StatKey;
use crate::types::{Circle, ObjectId, ZoneId};
use crate::unit::UnitCore;
use crate::world::{FieldObject, GameState, Loot};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

/// One application of damage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub amount: f64,
    /// Object credited with the hit (receives reflections and kill xp)
    pub source: Option<ObjectId>,
    pub is_critical: bool,
    /// Produced by a reflection; never reflected again
    pub reflected: bool,
}

impl Hit {
    pub fn new(amount: f64, source: Option<ObjectId>) -> Self {
        Hit {
            amount,
            source,
            is_critical: false,
            reflected: false,
        }
    }

    pub fn critical(mut self, is_critical: bool) -> Self {
        self.is_critical = is_critical;
        self
    }

    pub fn reflection(amount: f64, source: Option<ObjectId>) -> Self {
        Hit {
            amount,
            source,
            is_critical: false,
            reflected: true,
        }
    }
}

/// Damage after armor, with diminishing returns against large hits
///
/// `damage * (1 - armor / (armor + constant * damage))`
pub fn armor_reduction(armor: f64, damage: f64, constant: f64) -> f64 {
    if damage <= 0.0 {
        return 0.0;
    }
    if armor <= 0.0 {
        return damage;
    }
    let reduction = armor / (armor + constant * damage);
    (damage * (1.0 - reduction)).max(0.0)
}

fn apply_to_unit(core: &mut UnitCore, amount: f64, outcome: &mut DamageOutcome) {
    outcome.health_before = core.health;
    core.health = (core.health - amount).max(0.0);
    outcome.health_after = core.health;
    outcome.damage_dealt = outcome.health_before - outcome.health_after;
    outcome.is_killing_blow = core.health <= 0.0;
}

/// Apply `hit` to the object `target` in `zone`
///
/// Damage that is not positive is rejected without side effects. A nexus
/// target is shielded by its wall first. Heroes scale damage by their
/// incoming damage multiplier and every unit reduces it by armor. Health
/// never drops below zero; a killing blow removes the object from its zone
/// (heroes instead start their revive timer).
pub fn damage_target(state: &mut GameState, zone: &ZoneId, target: ObjectId, hit: Hit) -> DamageOutcome {
    let mut outcome = DamageOutcome::new();
    if !(hit.amount > 0.0) {
        return outcome;
    }

    let armor_constant = state.constants.combat.armor_constant;
    let deaths = state.nexus.death_count;

    let Some(instance) = state.zones.get_mut(zone) else {
        error!(%zone, %target, "damage aimed at a zone that does not exist");
        return outcome;
    };
    let Some(object) = instance.get_mut(target) else {
        debug!(%zone, %target, "damage target is gone");
        return outcome;
    };
    if !object.is_available() {
        return outcome;
    }
    if matches!(object, FieldObject::Nexus(_)) {
        return damage_nexus(state, zone, hit);
    }

    let mut hero_died = false;
    match object {
        FieldObject::Hero(hero) => {
            let scaled = hit.amount * hero.core.stats.get(StatKey::IncomingDamageMultiplier);
            let amount = armor_reduction(hero.core.stats.get(StatKey::Armor), scaled, armor_constant);
            apply_to_unit(&mut hero.core, amount, &mut outcome);
            if outcome.is_killing_blow {
                let seconds = state.constants.revive_seconds(hero.level, deaths);
                hero.die(seconds);
                info!(hero = %target, revive_seconds = seconds, "hero died");
                hero_died = true;
            }
        }
        FieldObject::Ally(ally) => {
            let amount = armor_reduction(ally.core.stats.get(StatKey::Armor), hit.amount, armor_constant);
            apply_to_unit(&mut ally.core, amount, &mut outcome);
        }
        FieldObject::Enemy(enemy) => {
            let amount = armor_reduction(enemy.core.stats.get(StatKey::Armor), hit.amount, armor_constant);
            apply_to_unit(&mut enemy.core, amount, &mut outcome);
        }
        FieldObject::Spawner(spawner) => {
            outcome.health_before = spawner.health;
            spawner.health = (spawner.health - hit.amount).max(0.0);
            outcome.health_after = spawner.health;
            outcome.damage_dealt = outcome.health_before - outcome.health_after;
            outcome.is_killing_blow = spawner.health <= 0.0;
        }
        FieldObject::Nexus(_) | FieldObject::Structure(_) | FieldObject::Loot(_) => return outcome,
    }
    // invulnerable or fully armored targets take nothing
    outcome.applied = outcome.damage_dealt > 0.0;
    if !outcome.applied {
        return outcome;
    }
    outcome.is_critical = hit.is_critical;

    let player_side = matches!(object, FieldObject::Hero(_) | FieldObject::Ally(_));
    if player_side {
        state.counters.damage_taken += outcome.damage_dealt;
    } else {
        state.counters.damage_dealt += outcome.damage_dealt;
    }

    if hero_died {
        state.nexus.death_count += 1;
        state.counters.hero_deaths += 1;
        release_hero_target(state, target);
    } else if outcome.is_killing_blow {
        remove_dead(state, zone, target, hit.source);
    }

    outcome
}

fn damage_nexus(state: &mut GameState, zone: &ZoneId, hit: Hit) -> DamageOutcome {
    let mut outcome = DamageOutcome::new();
    outcome.applied = true;
    outcome.is_critical = hit.is_critical;

    let nexus = &mut state.nexus;
    let mut remaining = hit.amount;
    let mut reflection = 0.0;

    if nexus.wall.health > 0.0 {
        let absorbed = remaining.min(nexus.wall.health);
        nexus.wall.health -= absorbed;
        remaining -= absorbed;
        outcome.absorbed_by_wall = absorbed;
        if nexus.wall.return_damage > 0.0 && !hit.reflected {
            reflection = nexus.wall.return_damage;
        }
    }

    outcome.health_before = nexus.essence;
    nexus.essence = (nexus.essence - remaining).max(0.0);
    outcome.health_after = nexus.essence;
    outcome.essence_lost = outcome.health_before - outcome.health_after;
    outcome.damage_dealt = outcome.absorbed_by_wall + outcome.essence_lost;
    if remaining > 0.0 && nexus.essence <= 0.0 {
        outcome.is_killing_blow = true;
        warn!("nexus essence exhausted");
    }
    let nexus_id = nexus.object;
    state.counters.damage_taken += outcome.damage_dealt;

    if reflection > 0.0 {
        if let Some(attacker) = hit.source {
            outcome.reflected = reflection;
            damage_target(state, zone, attacker, Hit::reflection(reflection, Some(nexus_id)));
        }
    }

    outcome
}

/// Restore health to an available unit; returns the amount healed
pub fn heal_target(state: &mut GameState, zone: &ZoneId, target: ObjectId, amount: f64) -> f64 {
    if !(amount > 0.0) {
        return 0.0;
    }
    let Some(core) = state
        .zones
        .get_mut(zone)
        .and_then(|z| z.get_mut(target))
        .filter(|o| o.is_available())
        .and_then(FieldObject::unit_mut)
    else {
        return 0.0;
    };
    core.heal(amount)
}

/// Drop every job or command reference to a hero that just died
fn release_hero_target(state: &mut GameState, hero: ObjectId) {
    for instance in state.zones.values_mut() {
        for object in instance.objects.iter_mut() {
            if let Some(core) = object.unit_mut() {
                if core.attack_target == Some(hero) {
                    core.attack_target = None;
                }
            }
        }
    }
}

/// Remove a killed object from its zone and run its type-specific cleanup
fn remove_dead(state: &mut GameState, zone: &ZoneId, target: ObjectId, killer: Option<ObjectId>) {
    let loot_radius = state.constants.combat.loot_radius;
    let loot_lifetime = state.constants.combat.loot_lifetime;
    let spawner_essence = state.constants.spawners.essence_per_level;

    let Some(instance) = state.zones.get_mut(zone) else {
        return;
    };
    let Some(dead) = instance.remove(target) else {
        return;
    };

    let (reward_essence, reward_xp, at) = match &dead {
        FieldObject::Enemy(enemy) => {
            // detach everything this enemy created
            instance.effects.retain(|fx| fx.owner() != Some(target));
            for object in instance.objects.iter_mut() {
                if let Some(core) = object.unit_mut() {
                    core.effects.remove_from_source(&mut core.stats, target);
                }
            }
            state.counters.enemies_killed += 1;
            debug!(enemy = %target, kind = %enemy.kind, level = enemy.level, "enemy killed");
            (enemy.essence_reward, enemy.xp_reward, enemy.core.circle)
        }
        FieldObject::Spawner(spawner) => {
            state.counters.spawners_destroyed += 1;
            info!(spawner = %target, level = spawner.level, "spawner destroyed");
            (spawner_essence * spawner.level as f64, 0.0, spawner.circle)
        }
        FieldObject::Ally(_) => {
            debug!(ally = %target, "ally killed");
            return;
        }
        other => {
            error!(object = %target, kind = other.kind_name(), "removed an object that cannot die");
            return;
        }
    };

    if reward_xp > 0.0 {
        if let Some(hero) = killer.and_then(|id| credited_hero(state, zone, id)) {
            let constants = &state.constants;
            if let Some(FieldObject::Hero(h)) = state.zones.get_mut(zone).and_then(|z| z.get_mut(hero)) {
                h.gain_xp(reward_xp, constants);
            }
        }
    }

    if reward_essence > 0.0 {
        let id = state.allocate_id();
        if let Some(instance) = state.zones.get_mut(zone) {
            instance.objects.push(FieldObject::Loot(Loot {
                id,
                circle: Circle::new(at.x, at.y, loot_radius),
                essence: reward_essence,
                lifetime: loot_lifetime,
            }));
        }
    }
}

/// The hero credited for a kill: the killer itself or a summoning owner
fn credited_hero(state: &GameState, zone: &ZoneId, killer: ObjectId) -> Option<ObjectId> {
    let instance = state.zones.get(zone)?;
    match instance.get(killer)? {
        FieldObject::Hero(hero) => Some(hero.core.id),
        FieldObject::Ally(ally) => {
            let owner = ally.owner?;
            matches!(instance.get(owner), Some(FieldObject::Hero(_))).then_some(owner)
        }
        _ => None,
    }
}
