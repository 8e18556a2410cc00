//! Tick driver - Fixed-step update order across zones
//!
//! One tick, in order: zone clocks advance; spawner housekeeping; revive
//! timers and loot decay; zone effects and projectiles; field objects;
//! jobs. Fast-forward repeats whole ticks and never stretches one.

use super::apply::apply_actions;
use super::object::FieldObject;
use super::state::GameState;
use super::zone::{Neighbors, ZoneInstance};
use crate::job::progress_jobs;
use crate::types::{ObjectId, ZoneId};
use crate::unit::{UnitAction, UpdateContext};
use tracing::{debug, trace};

/// Run `frames` fixed ticks
pub fn update_game(state: &mut GameState, frames: u32) {
    for _ in 0..frames {
        tick(state);
    }
}

/// Advance the whole game by one fixed tick
pub fn tick(state: &mut GameState) {
    let frame_ms = state.constants.timing.frame_ms;
    let dt = state.constants.frame_seconds();
    state.counters.frames += 1;

    for zone in state.zones.values_mut() {
        zone.time += frame_ms;
    }

    let zone_ids: Vec<ZoneId> = state.zones.keys().cloned().collect();

    replace_destroyed_spawners(state);
    for zone in &zone_ids {
        update_spawners(state, zone, dt);
    }
    update_revivals(state, dt);
    decay_loot(state, dt);

    for zone in &zone_ids {
        update_zone_effects(state, zone, dt);
    }

    // only objects present when the phase starts update this tick
    let snapshot: Vec<(ZoneId, Vec<ObjectId>)> = zone_ids
        .iter()
        .filter_map(|id| {
            state
                .zones
                .get(id)
                .map(|zone| (id.clone(), zone.objects.iter().map(FieldObject::id).collect()))
        })
        .collect();
    for (zone, ids) in &snapshot {
        for id in ids {
            update_object(state, zone, *id, dt);
        }
    }

    progress_jobs(state, dt);
    trace!(frame = state.counters.frames, "tick complete");
}

fn replace_destroyed_spawners(state: &mut GameState) {
    let world = ZoneId::world();
    let alive = state.zones.get(&world).map_or(0, |zone| {
        zone.objects
            .iter()
            .filter(|o| matches!(o, FieldObject::Spawner(_)))
            .count()
    });
    for _ in alive..state.constants.spawners.count {
        state.spawn_world_spawner();
    }
}

fn update_spawners(state: &mut GameState, zone: &ZoneId, dt: f64) {
    let mut actions = Vec::new();
    {
        let GameState {
            zones, constants, rng, ..
        } = state;
        let Some(instance) = zones.get_mut(zone) else {
            return;
        };
        for index in 0..instance.objects.len() {
            let Some((object, neighbors)) = Neighbors::split(&mut instance.objects, index) else {
                break;
            };
            if let FieldObject::Spawner(spawner) = object {
                spawner.update(&neighbors, constants, rng, dt, &mut actions);
            }
        }
    }
    apply_actions(state, zone, actions);
}

/// Count down dead heroes; finished ones return at the overworld entry
fn update_revivals(state: &mut GameState, dt: f64) {
    let mut revived: Vec<ObjectId> = Vec::new();
    for zone in state.zones.values_mut() {
        for object in zone.objects.iter_mut() {
            if let FieldObject::Hero(hero) = object {
                if hero.tick_revive(dt) {
                    revived.push(hero.id());
                }
            }
        }
    }

    let world = ZoneId::world();
    for id in revived {
        if state.zone_of(id) != Some(&world) {
            state.move_hero(id, &world);
        }
        let entry = state.zones.get(&world).map_or((0.0, 0.0), |zone| zone.entry);
        if let Some(hero) = state.hero_mut(id) {
            hero.revive_at(entry.0, entry.1);
        }
    }
}

fn decay_loot(state: &mut GameState, dt: f64) {
    for zone in state.zones.values_mut() {
        for object in zone.objects.iter_mut() {
            if let FieldObject::Loot(loot) = object {
                loot.lifetime -= dt;
            }
        }
        zone.objects
            .retain(|o| !matches!(o, FieldObject::Loot(loot) if loot.lifetime <= 0.0));
    }
}

/// Projectiles and pools act before any object; what they spawn on expiry
/// first updates next tick
fn update_zone_effects(state: &mut GameState, zone: &ZoneId, dt: f64) {
    let mut actions: Vec<UnitAction> = Vec::new();
    {
        let Some(instance) = state.zones.get_mut(zone) else {
            return;
        };
        let ZoneInstance { effects, objects, .. } = instance;
        let mut spawned = Vec::new();
        for effect in effects.iter_mut() {
            effect.update(dt, objects, &mut actions);
            if effect.is_expired() {
                if let Some(next) = effect.on_expire() {
                    spawned.push(next);
                }
            }
        }
        effects.retain(|effect| !effect.is_expired());
        effects.extend(spawned);
    }
    apply_actions(state, zone, actions);
}

/// Update one object and apply what it queued before the next object runs
fn update_object(state: &mut GameState, zone: &ZoneId, id: ObjectId, dt: f64) {
    let mut actions: Vec<UnitAction> = Vec::new();
    {
        let GameState {
            zones,
            content,
            constants,
            rng,
            ..
        } = state;
        let Some(instance) = zones.get_mut(zone) else {
            return;
        };
        let Some(index) = instance.index_of(id) else {
            debug!(object = %id, "object left before its update");
            return;
        };
        let ZoneInstance {
            id: zone_id,
            time,
            objects,
            cooldowns,
            ..
        } = instance;
        let Some((object, neighbors)) = Neighbors::split(objects, index) else {
            return;
        };
        let mut ctx = UpdateContext {
            content,
            constants,
            rng,
            zone: zone_id,
            zone_time: *time,
            cooldowns,
            frame: dt,
        };
        match object {
            FieldObject::Hero(hero) => hero.update(&neighbors, &mut ctx, &mut actions),
            FieldObject::Ally(ally) => ally.update(&neighbors, &mut ctx, &mut actions),
            FieldObject::Enemy(enemy) => enemy.update(&neighbors, &mut ctx, &mut actions),
            // spawners run during housekeeping
            FieldObject::Spawner(_) => {}
            FieldObject::Nexus(_) | FieldObject::Structure(_) | FieldObject::Loot(_) => {}
        }
    }
    apply_actions(state, zone, actions);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Content, SimConstants};

    #[test]
    fn test_zone_clock_and_frames() {
        let mut state = GameState::with_heroes(Content::with_defaults(), SimConstants::default(), 1, &[]);
        update_game(&mut state, 50);
        assert_eq!(state.counters.frames, 50);
        assert!((state.zones[&ZoneId::world()].time - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn test_destroyed_spawner_replaced_at_next_level() {
        let mut state = GameState::with_heroes(Content::with_defaults(), SimConstants::default(), 1, &[]);
        let world = ZoneId::world();
        let first = state.zones[&world]
            .objects
            .iter()
            .find(|o| matches!(o, FieldObject::Spawner(_)))
            .map(FieldObject::id)
            .unwrap();
        state.zones.get_mut(&world).unwrap().remove(first);

        tick(&mut state);
        let levels: Vec<u32> = state.zones[&world]
            .objects
            .iter()
            .filter_map(|o| match o {
                FieldObject::Spawner(s) => Some(s.level),
                _ => None,
            })
            .collect();
        assert_eq!(levels.len(), 2);
        assert!(levels.contains(&3));
        assert_eq!(state.world.next_spawner_level, 4);
    }

    #[test]
    fn test_loot_fades() {
        let mut state = GameState::with_heroes(Content::with_defaults(), SimConstants::default(), 1, &[]);
        let world = ZoneId::world();
        state.drop_loot(&world, 500.0, 500.0, 3.0);
        let count = |s: &GameState| {
            s.zones[&world]
                .objects
                .iter()
                .filter(|o| matches!(o, FieldObject::Loot(_)))
                .count()
        };
        assert_eq!(count(&state), 1);
        if let Some(FieldObject::Loot(loot)) = state.zones.get_mut(&world).unwrap().objects.last_mut() {
            loot.lifetime = 0.01;
        }
        tick(&mut state);
        assert_eq!(count(&state), 0);
    }
}
