//! Player commands - Input entering the simulation
//!
//! Every command validates first and mutates only once it is sure to
//! succeed, so a declined command leaves the state untouched.

use super::object::FieldObject;
use super::state::GameState;
use crate::ability::AbilityKind;
use crate::combat::AbilityTarget;
use crate::job;
use crate::types::{AbilityId, EquipmentSlot, ItemId, JobKey, ObjectId, Team, ZoneId};
use crate::unit::{AbilityUse, MoveTarget};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("No object {0}")]
    UnknownObject(ObjectId),

    #[error("Object {0} is not a hero")]
    NotAHero(ObjectId),

    #[error("Hero {0} is dead")]
    HeroDead(ObjectId),

    #[error("Hero {0} is alive")]
    HeroAlive(ObjectId),

    #[error("Unknown ability: {0}")]
    UnknownAbility(AbilityId),

    #[error("Ability {0} is not learned")]
    AbilityNotLearned(AbilityId),

    #[error("Ability {0} is not ready")]
    AbilityNotReady(AbilityId),

    #[error("Ability {0} cannot be learned by this hero")]
    AbilityNotAvailable(AbilityId),

    #[error("Ability {0} is at its maximum level")]
    AbilityMaxLevel(AbilityId),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Not enough essence: need {needed:.1}, have {available:.1}")]
    Unaffordable { needed: f64, available: f64 },

    #[error("Cannot pay for job {0}")]
    JobUnaffordable(JobKey),

    #[error("Unknown job: {0}")]
    UnknownJob(JobKey),

    #[error("Unknown zone: {0}")]
    UnknownZone(ZoneId),

    #[error("No {0} in the inventory")]
    MissingItem(ItemId),
}

/// Zone of a living hero
fn living_hero_zone(state: &GameState, hero: ObjectId) -> Result<ZoneId, CommandError> {
    let (zone, object) = state.find_object(hero).ok_or(CommandError::UnknownObject(hero))?;
    let h = object.as_hero().ok_or(CommandError::NotAHero(hero))?;
    if !h.is_available() {
        return Err(CommandError::HeroDead(hero));
    }
    Ok(zone.clone())
}

/// Walk a hero to a point, dropping its attack and ability commands
pub fn move_hero_to(state: &mut GameState, hero: ObjectId, x: f64, y: f64) -> Result<(), CommandError> {
    living_hero_zone(state, hero)?;
    if let Some(h) = state.hero_mut(hero) {
        h.core.reset_commands();
        h.core.movement_target = Some(MoveTarget { x, y });
    }
    Ok(())
}

/// Order a hero to attack a hostile object in its zone
pub fn attack_target(state: &mut GameState, hero: ObjectId, target: ObjectId) -> Result<(), CommandError> {
    let zone = living_hero_zone(state, hero)?;
    let valid = state.zones.get(&zone).and_then(|z| z.get(target)).is_some_and(|o| {
        o.is_available() && o.team() == Some(Team::Hostile)
    });
    if !valid {
        return Err(CommandError::InvalidTarget(format!("{target} is not a hostile in {zone}")));
    }
    if let Some(h) = state.hero_mut(hero) {
        h.core.reset_commands();
        h.core.attack_target = Some(target);
    }
    Ok(())
}

/// Drop every command of a hero
pub fn clear_commands(state: &mut GameState, hero: ObjectId) -> Result<(), CommandError> {
    living_hero_zone(state, hero)?;
    if let Some(h) = state.hero_mut(hero) {
        h.core.reset_commands();
    }
    Ok(())
}

fn ready_ability(state: &GameState, hero: ObjectId, ability: &AbilityId) -> Result<(), CommandError> {
    let spec = state
        .content
        .ability(ability)
        .and_then(|d| d.active())
        .ok_or_else(|| CommandError::UnknownAbility(ability.clone()))?;
    let h = state.hero(hero).ok_or(CommandError::NotAHero(hero))?;
    let instance = h
        .core
        .active(ability)
        .filter(|a| a.is_learned())
        .ok_or_else(|| CommandError::AbilityNotLearned(ability.clone()))?;
    if !instance.is_ready(spec) {
        return Err(CommandError::AbilityNotReady(ability.clone()));
    }
    Ok(())
}

/// Select an ability for targeting
///
/// Abilities with no targeting capability are queued at once on the hero
/// itself; returns true in that case.
pub fn select_ability(state: &mut GameState, hero: ObjectId, ability: &AbilityId) -> Result<bool, CommandError> {
    living_hero_zone(state, hero)?;
    ready_ability(state, hero, ability)?;
    let immediate = state
        .content
        .ability(ability)
        .and_then(|d| d.active())
        .is_some_and(|spec| spec.targeting.is_immediate());

    if let Some(h) = state.hero_mut(hero) {
        if immediate {
            h.core.selected_ability = None;
            h.core.ability_use = Some(AbilityUse {
                ability: ability.clone(),
                target: AbilityTarget::object(hero),
            });
        } else {
            h.core.selected_ability = Some(ability.clone());
        }
    }
    Ok(immediate)
}

/// Use an ability on a target; the hero walks into range first
pub fn use_ability(
    state: &mut GameState,
    hero: ObjectId,
    ability: &AbilityId,
    target: Option<AbilityTarget>,
) -> Result<(), CommandError> {
    let zone = living_hero_zone(state, hero)?;
    ready_ability(state, hero, ability)?;
    let spec = state
        .content
        .ability(ability)
        .and_then(|d| d.active())
        .ok_or_else(|| CommandError::UnknownAbility(ability.clone()))?;
    let targeting = spec.targeting;

    let target = if targeting.is_immediate() {
        AbilityTarget::object(hero)
    } else {
        match target {
            None => return Err(CommandError::InvalidTarget("ability needs a target".to_string())),
            Some(AbilityTarget::Point { x, y }) => {
                if !targeting.location {
                    return Err(CommandError::InvalidTarget("ability cannot target a location".to_string()));
                }
                AbilityTarget::point(x, y)
            }
            Some(AbilityTarget::Object { id }) => {
                let object = state
                    .zones
                    .get(&zone)
                    .and_then(|z| z.get(id))
                    .filter(|o| o.is_available())
                    .ok_or_else(|| CommandError::InvalidTarget(format!("{id} is not available in {zone}")))?;
                let allowed = match object.team() {
                    Some(Team::Player) => targeting.allies,
                    Some(Team::Hostile) => targeting.enemies,
                    None => false,
                };
                if !allowed && !(targeting.location && matches!(object, FieldObject::Structure(_))) {
                    return Err(CommandError::InvalidTarget(format!(
                        "{} cannot be targeted by {ability}",
                        object.kind_name()
                    )));
                }
                if allowed {
                    AbilityTarget::object(id)
                } else {
                    let c = object.circle();
                    AbilityTarget::point(c.x, c.y)
                }
            }
        }
    };

    if let Some(h) = state.hero_mut(hero) {
        h.core.selected_ability = None;
        h.core.ability_use = Some(AbilityUse {
            ability: ability.clone(),
            target,
        });
    }
    Ok(())
}

pub fn set_autocast(state: &mut GameState, hero: ObjectId, ability: &AbilityId, enabled: bool) -> Result<(), CommandError> {
    let h = state.hero_mut(hero).ok_or(CommandError::NotAHero(hero))?;
    let instance = h
        .core
        .active_mut(ability)
        .ok_or_else(|| CommandError::AbilityNotLearned(ability.clone()))?;
    instance.autocast = enabled;
    Ok(())
}

/// Spend essence to raise one of the hero's abilities by a level
pub fn level_ability(state: &mut GameState, hero: ObjectId, ability: &AbilityId) -> Result<u32, CommandError> {
    let h = state.hero(hero).ok_or(CommandError::NotAHero(hero))?;
    let definition = state
        .content
        .ability(ability)
        .ok_or_else(|| CommandError::UnknownAbility(ability.clone()))?;
    let allowed = state
        .content
        .hero_classes
        .get(&h.class)
        .is_some_and(|class| class.abilities.contains(ability) || class.starting_abilities.contains(ability));
    if !allowed {
        return Err(CommandError::AbilityNotAvailable(ability.clone()));
    }
    let current = h.core.ability_level(ability);
    if current >= definition.max_level {
        return Err(CommandError::AbilityMaxLevel(ability.clone()));
    }
    let cost = definition.cost_to_level(current);
    if !state.spend_essence(cost) {
        return Err(CommandError::Unaffordable {
            needed: cost,
            available: state.nexus.essence,
        });
    }

    let GameState { content, zones, .. } = state;
    let Some(definition) = content.ability(ability) else {
        return Err(CommandError::UnknownAbility(ability.clone()));
    };
    let hero_ref = zones
        .values_mut()
        .find_map(|zone| zone.get_mut(hero))
        .and_then(FieldObject::as_hero_mut)
        .ok_or(CommandError::NotAHero(hero))?;
    hero_ref.core.set_ability_level(definition, current + 1);
    if matches!(definition.kind, AbilityKind::Passive(_)) {
        hero_ref.core.clamp_health();
    }
    info!(%hero, %ability, level = current + 1, "ability levelled");
    Ok(current + 1)
}

/// Essence needed to revive a dead hero now
pub fn revive_cost(state: &GameState, hero: ObjectId) -> Result<f64, CommandError> {
    let h = state.hero(hero).ok_or(CommandError::NotAHero(hero))?;
    let timer = h.revive.ok_or(CommandError::HeroAlive(hero))?;
    Ok(timer.remaining.max(0.0) * state.constants.heroes.revive_essence_per_second)
}

/// Pay essence to revive a dead hero at the overworld entry
pub fn pay_to_revive(state: &mut GameState, hero: ObjectId) -> Result<(), CommandError> {
    let cost = revive_cost(state, hero)?;
    if !state.spend_essence(cost) {
        return Err(CommandError::Unaffordable {
            needed: cost,
            available: state.nexus.essence,
        });
    }
    let world = ZoneId::world();
    if state.zone_of(hero) != Some(&world) {
        state.move_hero(hero, &world);
    }
    let entry = state.zones.get(&world).map_or((0.0, 0.0), |zone| zone.entry);
    if let Some(h) = state.hero_mut(hero) {
        h.revive_at(entry.0, entry.1);
    }
    Ok(())
}

/// Change a job's worker count; returns the new count
pub fn adjust_job_workers(state: &mut GameState, key: &JobKey, delta: i32) -> Result<u32, CommandError> {
    if !state.content.jobs.contains_key(key) {
        return Err(CommandError::UnknownJob(key.clone()));
    }
    Ok(job::update_assigned_workers(state, key, delta))
}

pub fn toggle_job_repeat(state: &mut GameState, key: &JobKey) -> Result<bool, CommandError> {
    job::toggle_repeat(state, key).ok_or_else(|| CommandError::UnknownJob(key.clone()))
}

/// Put a hero on a job, or take it off with `None`
pub fn assign_hero_job(state: &mut GameState, hero: ObjectId, key: Option<&JobKey>) -> Result<(), CommandError> {
    state.hero(hero).ok_or(CommandError::NotAHero(hero))?;
    match key {
        None => {
            job::unassign_hero(state, hero);
            Ok(())
        }
        Some(key) => {
            if !state.content.jobs.contains_key(key) {
                return Err(CommandError::UnknownJob(key.clone()));
            }
            if job::assign_hero_to_job(state, hero, key) {
                Ok(())
            } else {
                Err(CommandError::JobUnaffordable(key.clone()))
            }
        }
    }
}

/// Equip a crafted item from the inventory; a replaced item goes back
pub fn equip_item(state: &mut GameState, hero: ObjectId, item: &ItemId) -> Result<(), CommandError> {
    state.hero(hero).ok_or(CommandError::NotAHero(hero))?;
    if state.economy.item_count(item) == 0 {
        return Err(CommandError::MissingItem(item.clone()));
    }
    let definition = state.content.item(item);
    state.economy.take_item(item);
    let previous = state.hero_mut(hero).and_then(|h| h.equip(&definition));
    if let Some(previous) = previous {
        state.economy.add_item(previous);
    }
    Ok(())
}

pub fn unequip_item(state: &mut GameState, hero: ObjectId, slot: EquipmentSlot) -> Result<(), CommandError> {
    let h = state.hero_mut(hero).ok_or(CommandError::NotAHero(hero))?;
    if let Some(previous) = h.unequip(slot) {
        state.economy.add_item(previous);
    }
    Ok(())
}

/// Send a living hero straight into a zone
pub fn travel(state: &mut GameState, hero: ObjectId, zone: &ZoneId) -> Result<(), CommandError> {
    living_hero_zone(state, hero)?;
    if !state.content.zones.contains_key(zone) {
        return Err(CommandError::UnknownZone(zone.clone()));
    }
    state.move_hero(hero, zone);
    Ok(())
}
