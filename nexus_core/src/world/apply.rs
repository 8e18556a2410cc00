//! Applying the actions queued by an update

use super::object::FieldObject;
use super::state::GameState;
use crate::combat::{damage_target, heal_target};
use crate::job::credit_hero_work;
use crate::types::ZoneId;
use crate::unit::UnitAction;
use tracing::{debug, error};

/// Apply `actions` produced inside `zone`, in order
pub fn apply_actions(state: &mut GameState, zone: &ZoneId, actions: Vec<UnitAction>) {
    for action in actions {
        apply_action(state, zone, action);
    }
}

fn apply_action(state: &mut GameState, zone: &ZoneId, action: UnitAction) {
    match action {
        UnitAction::Damage { target, hit } => {
            damage_target(state, zone, target, hit);
        }
        UnitAction::Heal { target, amount } => {
            heal_target(state, zone, target, amount);
        }
        UnitAction::ApplyEffect {
            target,
            effect,
            stacks,
            source,
        } => {
            let Some(definition) = state.content.effects.get(&effect) else {
                error!(%effect, "missing effect definition");
                return;
            };
            let core = state
                .zones
                .get_mut(zone)
                .and_then(|z| z.get_mut(target))
                .filter(|o| o.is_available())
                .and_then(FieldObject::unit_mut);
            if let Some(core) = core {
                core.effects.apply_stacks(&mut core.stats, definition, stacks, source);
            }
        }
        UnitAction::SpawnEffect(effect) => match state.zones.get_mut(zone) {
            Some(instance) => instance.effects.push(effect),
            None => error!(%zone, "zone effect spawned in a missing zone"),
        },
        UnitAction::SpawnAlly {
            ally,
            owner,
            level,
            x,
            y,
            lifetime,
        } => {
            state.spawn_ally(zone, &ally, owner, level, x, y, lifetime);
        }
        UnitAction::SpawnEnemy {
            enemy,
            level,
            x,
            y,
            spawner,
        } => {
            state.spawn_enemy(zone, &enemy, level, x, y, spawner);
        }
        UnitAction::CollectLoot { loot } => {
            let Some(instance) = state.zones.get_mut(zone) else {
                return;
            };
            if !matches!(instance.get(loot), Some(FieldObject::Loot(_))) {
                return;
            }
            if let Some(FieldObject::Loot(loot)) = instance.remove(loot) {
                state.gain_essence(loot.essence);
                state.counters.essence_collected += loot.essence;
                debug!(essence = loot.essence, "loot collected");
            }
        }
        UnitAction::JobWork { hero, job, seconds } => {
            credit_hero_work(state, hero, &job, seconds);
        }
        UnitAction::Despawn { target } => {
            if let Some(instance) = state.zones.get_mut(zone) {
                instance.remove(target);
            }
        }
        UnitAction::EnterZone { hero, zone: destination } => {
            state.move_hero(hero, &destination);
        }
    }
}
