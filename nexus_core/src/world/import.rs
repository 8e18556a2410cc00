//! Save snapshots
//!
//! A snapshot stores counts and levels only. Importing starts a fresh run
//! and replays the same level-up functions the tick uses, so a loaded game
//! and one played to the same point hold identical derived values.

use super::state::GameState;
use crate::config::{Content, SimConstants};
use crate::job::{max_workers, Job};
use crate::types::{AbilityId, EquipmentSlot, HeroClassId, ItemId, JobKey, ResourceKind, ToolType, ZoneId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Failed to encode or decode snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroSnapshot {
    pub class: HeroClassId,
    pub name: String,
    pub level: u32,
    pub xp: f64,
    #[serde(default)]
    pub abilities: BTreeMap<AbilityId, u32>,
    #[serde(default)]
    pub equipment: BTreeMap<EquipmentSlot, ItemId>,
    #[serde(default)]
    pub job: Option<JobKey>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub key: JobKey,
    pub workers: u32,
    pub worker_seconds_completed: f64,
    pub is_paid_for: bool,
    pub should_repeat_job: bool,
    pub completions: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SaveSnapshot {
    pub essence: f64,
    /// Overworld clock in milliseconds
    pub world_time: f64,
    pub death_count: u32,
    pub wall_level: u32,
    pub wall_health: f64,
    pub population_level: u32,
    pub next_spawner_level: u32,
    #[serde(default)]
    pub resources: BTreeMap<ResourceKind, u32>,
    #[serde(default)]
    pub tools: BTreeMap<ToolType, u32>,
    #[serde(default)]
    pub items: BTreeMap<ItemId, u32>,
    #[serde(default)]
    pub heroes: Vec<HeroSnapshot>,
    #[serde(default)]
    pub jobs: Vec<JobSnapshot>,
}

impl SaveSnapshot {
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Capture the persistent part of a run
pub fn export_snapshot(state: &GameState) -> SaveSnapshot {
    let heroes = state
        .heroes()
        .map(|hero| HeroSnapshot {
            class: hero.class.clone(),
            name: hero.name.clone(),
            level: hero.level,
            xp: hero.xp,
            abilities: hero
                .core
                .abilities
                .iter()
                .map(|a| (a.ability.clone(), a.level))
                .chain(hero.core.passives.iter().map(|p| (p.ability.clone(), p.level)))
                .filter(|(_, level)| *level > 0)
                .collect(),
            equipment: hero.equipment.clone(),
            job: hero.job.clone(),
        })
        .collect();

    let jobs = state
        .economy
        .jobs
        .values()
        .map(|job| JobSnapshot {
            key: job.key.clone(),
            workers: job.workers,
            worker_seconds_completed: job.worker_seconds_completed,
            is_paid_for: job.is_paid_for,
            should_repeat_job: job.should_repeat_job,
            completions: job.completions,
        })
        .collect();

    SaveSnapshot {
        essence: state.nexus.essence,
        world_time: state.zones.get(&ZoneId::world()).map_or(0.0, |zone| zone.time),
        death_count: state.nexus.death_count,
        wall_level: state.nexus.wall.level,
        wall_health: state.nexus.wall.health,
        population_level: state.economy.population_level,
        next_spawner_level: state.world.next_spawner_level,
        resources: state.economy.resources.clone(),
        tools: state.economy.tools.clone(),
        items: state.economy.items.clone(),
        heroes,
        jobs,
    }
}

/// Rebuild a run from a snapshot by replaying its progression
pub fn import_snapshot(content: Content, constants: SimConstants, seed: u64, snapshot: &SaveSnapshot) -> GameState {
    let mut state = GameState::with_heroes(content, constants, seed, &[]);

    for _ in 0..snapshot.wall_level {
        state.gain_wall_level();
    }
    state.nexus.wall.health = snapshot.wall_health.clamp(0.0, state.nexus.wall.max_health);

    let start = state.economy.population_level;
    for _ in start..snapshot.population_level {
        state.gain_population_level();
    }

    state.nexus.essence = snapshot.essence.max(0.0);
    state.nexus.death_count = snapshot.death_count;
    state.world.next_spawner_level = state.world.next_spawner_level.max(snapshot.next_spawner_level);
    if let Some(world) = state.zones.get_mut(&ZoneId::world()) {
        world.time = snapshot.world_time.max(0.0);
    }

    // inventory counts replace the starting stock
    state.economy.resources = snapshot.resources.clone();
    state.economy.tools = snapshot.tools.clone();
    state.economy.items = snapshot.items.clone();

    for saved in &snapshot.jobs {
        if !state.content.jobs.contains_key(&saved.key) {
            warn!(job = %saved.key, "dropping job missing from content");
            continue;
        }
        let mut job = Job::new(saved.key.clone());
        job.worker_seconds_completed = saved.worker_seconds_completed;
        job.is_paid_for = saved.is_paid_for;
        job.should_repeat_job = saved.should_repeat_job;
        job.completions = saved.completions;
        state.economy.jobs.insert(saved.key.clone(), job);

        // workers still obey the population and tool limits
        let workers = saved.workers.min(max_workers(&state, &saved.key));
        if let Some(job) = state.economy.jobs.get_mut(&saved.key) {
            job.workers = workers;
        }
    }

    for saved in &snapshot.heroes {
        restore_hero(&mut state, saved);
    }

    info!(heroes = snapshot.heroes.len(), jobs = snapshot.jobs.len(), "snapshot imported");
    state
}

fn restore_hero(state: &mut GameState, saved: &HeroSnapshot) {
    let Some(id) = state.spawn_hero(&saved.class, &saved.name) else {
        warn!(class = %saved.class, "dropping hero of unknown class");
        return;
    };

    let GameState { content, zones, economy, .. } = state;
    let Some(hero) = zones.values_mut().find_map(|zone| zone.get_mut(id)).and_then(|o| o.as_hero_mut()) else {
        return;
    };

    for _ in 1..saved.level {
        hero.gain_hero_level();
    }
    hero.xp = saved.xp.max(0.0);

    for (ability, &level) in &saved.abilities {
        match content.ability(ability) {
            Some(definition) => hero.core.set_ability_level(definition, level.min(definition.max_level)),
            None => warn!(%ability, "dropping unknown ability"),
        }
    }
    for item in saved.equipment.values() {
        hero.equip(&content.item(item));
    }
    hero.core.health = hero.max_health();

    if let Some(key) = &saved.job {
        if let Some(job) = economy.jobs.get_mut(key).filter(|job| job.is_paid_for && job.hero_target.is_none()) {
            job.hero_target = Some(id);
            hero.job = Some(key.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::update_assigned_workers;

    #[test]
    fn test_json_round_trip_preserves_fields() {
        let snapshot = SaveSnapshot {
            essence: 42.5,
            wall_level: 2,
            ..SaveSnapshot::default()
        };
        let json = snapshot.to_json().unwrap();
        assert_eq!(SaveSnapshot::from_json(&json).unwrap(), snapshot);
        assert!(SaveSnapshot::from_json("{ not json").is_err());
    }

    #[test]
    fn test_import_replays_wall_levels() {
        let snapshot = SaveSnapshot {
            wall_level: 3,
            wall_health: 1000.0,
            ..SaveSnapshot::default()
        };
        let state = import_snapshot(Content::with_defaults(), SimConstants::default(), 1, &snapshot);
        assert_eq!(state.nexus.wall.level, 3);
        assert!((state.nexus.wall.max_health - 150.0).abs() < 1e-9);
        assert!((state.nexus.wall.health - 150.0).abs() < 1e-9);
        assert!((state.nexus.wall.return_damage - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_export_then_import_matches() {
        let mut state = GameState::new(Content::with_defaults(), SimConstants::default(), 3);
        let hero = state.hero_ids()[0];
        state.hero_mut(hero).unwrap().gain_xp(120.0, &SimConstants::default());
        state.economy.add_tool(ToolType::Axe);
        update_assigned_workers(&mut state, &JobKey::from("chop_wood"), 1);
        state.gain_wall_level();

        let snapshot = export_snapshot(&state);
        let json = snapshot.to_json().unwrap();
        let restored = import_snapshot(
            Content::with_defaults(),
            SimConstants::default(),
            3,
            &SaveSnapshot::from_json(&json).unwrap(),
        );

        assert_eq!(export_snapshot(&restored), snapshot);
        let restored_hero = restored.heroes().next().unwrap();
        assert_eq!(restored_hero.level, 2);
        assert!((restored_hero.max_health() - state.hero(hero).unwrap().max_health()).abs() < 1e-9);
    }
}
