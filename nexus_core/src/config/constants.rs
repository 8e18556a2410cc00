//! Simulation constants configuration

use crate::types::{HeroClassId, ResourceKind, ToolType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tunable simulation constants
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimConstants {
    #[serde(default)]
    pub timing: TimingConstants,
    #[serde(default)]
    pub combat: CombatConstants,
    #[serde(default)]
    pub heroes: HeroConstants,
    #[serde(default)]
    pub nexus: NexusConstants,
    #[serde(default)]
    pub spawners: SpawnerConstants,
    #[serde(default)]
    pub economy: EconomyConstants,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConstants {
    /// Simulated milliseconds per tick
    #[serde(default = "default_frame_ms")]
    pub frame_ms: f64,
    /// Lock after any ability use before autocast may fire again (ms)
    #[serde(default = "default_autocast_lock_ms")]
    pub autocast_lock_ms: f64,
}

impl Default for TimingConstants {
    fn default() -> Self {
        TimingConstants {
            frame_ms: default_frame_ms(),
            autocast_lock_ms: default_autocast_lock_ms(),
        }
    }
}

fn default_frame_ms() -> f64 {
    20.0
}
fn default_autocast_lock_ms() -> f64 {
    500.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatConstants {
    /// Formula constant: reduction = armor / (armor + constant * damage)
    #[serde(default = "default_armor_constant")]
    pub armor_constant: f64,
    /// Radius of essence loot dropped by kills
    #[serde(default = "default_loot_radius")]
    pub loot_radius: f64,
    /// Loot that nobody picks up fades after this many seconds
    #[serde(default = "default_loot_lifetime")]
    pub loot_lifetime: f64,
}

impl Default for CombatConstants {
    fn default() -> Self {
        CombatConstants {
            armor_constant: default_armor_constant(),
            loot_radius: default_loot_radius(),
            loot_lifetime: default_loot_lifetime(),
        }
    }
}

fn default_armor_constant() -> f64 {
    5.0
}
fn default_loot_radius() -> f64 {
    4.0
}
fn default_loot_lifetime() -> f64 {
    60.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeroConstants {
    /// Classes of the heroes present at the start of a run
    #[serde(default = "default_starting_heroes")]
    pub starting_heroes: Vec<HeroClassId>,
    #[serde(default = "default_hero_radius")]
    pub radius: f64,
    /// Revive seconds = floor(level * per_level * (1 + deaths * death_penalty))
    #[serde(default = "default_revive_seconds_per_level")]
    pub revive_seconds_per_level: f64,
    #[serde(default = "default_revive_death_penalty")]
    pub revive_death_penalty: f64,
    /// Essence per remaining revive second when paying to revive early
    #[serde(default = "default_revive_essence_per_second")]
    pub revive_essence_per_second: f64,
    /// XP to reach level n+1 = xp_base * xp_growth^(n-1)
    #[serde(default = "default_xp_base")]
    pub xp_base: f64,
    #[serde(default = "default_xp_growth")]
    pub xp_growth: f64,
}

impl Default for HeroConstants {
    fn default() -> Self {
        HeroConstants {
            starting_heroes: default_starting_heroes(),
            radius: default_hero_radius(),
            revive_seconds_per_level: default_revive_seconds_per_level(),
            revive_death_penalty: default_revive_death_penalty(),
            revive_essence_per_second: default_revive_essence_per_second(),
            xp_base: default_xp_base(),
            xp_growth: default_xp_growth(),
        }
    }
}

fn default_starting_heroes() -> Vec<HeroClassId> {
    vec![HeroClassId::from("warrior"), HeroClassId::from("ranger")]
}
fn default_hero_radius() -> f64 {
    8.0
}
fn default_revive_seconds_per_level() -> f64 {
    5.0
}
fn default_revive_death_penalty() -> f64 {
    0.2
}
fn default_revive_essence_per_second() -> f64 {
    2.0
}
fn default_xp_base() -> f64 {
    100.0
}
fn default_xp_growth() -> f64 {
    1.5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NexusConstants {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default = "default_nexus_radius")]
    pub radius: f64,
    #[serde(default = "default_starting_essence")]
    pub starting_essence: f64,
    /// Wall max health per wall level (level 0 has no wall)
    #[serde(default = "default_wall_health_per_level")]
    pub wall_health_per_level: f64,
    /// Return damage per wall level
    #[serde(default = "default_wall_return_damage_per_level")]
    pub wall_return_damage_per_level: f64,
}

impl Default for NexusConstants {
    fn default() -> Self {
        NexusConstants {
            x: 0.0,
            y: 0.0,
            radius: default_nexus_radius(),
            starting_essence: default_starting_essence(),
            wall_health_per_level: default_wall_health_per_level(),
            wall_return_damage_per_level: default_wall_return_damage_per_level(),
        }
    }
}

fn default_nexus_radius() -> f64 {
    30.0
}
fn default_starting_essence() -> f64 {
    100.0
}
fn default_wall_health_per_level() -> f64 {
    50.0
}
fn default_wall_return_damage_per_level() -> f64 {
    2.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnerConstants {
    /// Spawners kept alive in the overworld
    #[serde(default = "default_spawner_count")]
    pub count: usize,
    /// Distance of new spawners from the nexus
    #[serde(default = "default_spawner_distance")]
    pub distance: f64,
    #[serde(default = "default_spawner_radius")]
    pub radius: f64,
    /// Seconds between spawns
    #[serde(default = "default_spawn_interval")]
    pub interval: f64,
    #[serde(default = "default_max_alive")]
    pub max_alive: usize,
    /// Spawner health = health_per_level * level
    #[serde(default = "default_spawner_health_per_level")]
    pub health_per_level: f64,
    /// Essence dropped when destroyed, per level
    #[serde(default = "default_spawner_essence_per_level")]
    pub essence_per_level: f64,
}

impl Default for SpawnerConstants {
    fn default() -> Self {
        SpawnerConstants {
            count: default_spawner_count(),
            distance: default_spawner_distance(),
            radius: default_spawner_radius(),
            interval: default_spawn_interval(),
            max_alive: default_max_alive(),
            health_per_level: default_spawner_health_per_level(),
            essence_per_level: default_spawner_essence_per_level(),
        }
    }
}

fn default_spawner_count() -> usize {
    2
}
fn default_spawner_distance() -> f64 {
    400.0
}
fn default_spawner_radius() -> f64 {
    14.0
}
fn default_spawn_interval() -> f64 {
    6.0
}
fn default_max_alive() -> usize {
    4
}
fn default_spawner_health_per_level() -> f64 {
    80.0
}
fn default_spawner_essence_per_level() -> f64 {
    25.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconomyConstants {
    /// Population at population level 0
    #[serde(default = "default_starting_population")]
    pub starting_population: u32,
    #[serde(default = "default_population_per_level")]
    pub population_per_level: u32,
    #[serde(default = "default_starting_resources")]
    pub starting_resources: BTreeMap<ResourceKind, u32>,
    #[serde(default = "default_starting_tools")]
    pub starting_tools: BTreeMap<ToolType, u32>,
}

impl Default for EconomyConstants {
    fn default() -> Self {
        EconomyConstants {
            starting_population: default_starting_population(),
            population_per_level: default_population_per_level(),
            starting_resources: default_starting_resources(),
            starting_tools: default_starting_tools(),
        }
    }
}

fn default_starting_population() -> u32 {
    3
}
fn default_population_per_level() -> u32 {
    1
}
fn default_starting_resources() -> BTreeMap<ResourceKind, u32> {
    BTreeMap::from([(ResourceKind::Wood, 10)])
}
fn default_starting_tools() -> BTreeMap<ToolType, u32> {
    BTreeMap::from([(ToolType::Axe, 1)])
}

impl SimConstants {
    /// Seconds per tick
    pub fn frame_seconds(&self) -> f64 {
        self.timing.frame_ms / 1000.0
    }

    /// Revive time in whole seconds for a hero of `level` after `deaths`
    /// hero deaths in this run
    pub fn revive_seconds(&self, level: u32, deaths: u32) -> f64 {
        let h = &self.heroes;
        (level as f64 * h.revive_seconds_per_level * (1.0 + deaths as f64 * h.revive_death_penalty))
            .floor()
    }

    pub fn xp_to_next_level(&self, level: u32) -> f64 {
        self.heroes.xp_base * self.heroes.xp_growth.powi(level.saturating_sub(1) as i32)
    }

    pub fn wall_max_health(&self, wall_level: u32) -> f64 {
        self.nexus.wall_health_per_level * wall_level as f64
    }

    pub fn wall_return_damage(&self, wall_level: u32) -> f64 {
        self.nexus.wall_return_damage_per_level * wall_level as f64
    }

    pub fn population(&self, population_level: u32) -> u32 {
        self.economy.starting_population + self.economy.population_per_level * population_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_toml;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let constants: SimConstants = parse_toml(
            r#"
[timing]
autocast_lock_ms = 250.0

[economy.starting_resources]
stone = 4
"#,
        )
        .unwrap();
        assert!((constants.timing.frame_ms - 20.0).abs() < f64::EPSILON);
        assert!((constants.timing.autocast_lock_ms - 250.0).abs() < f64::EPSILON);
        assert_eq!(constants.economy.starting_resources.get(&ResourceKind::Stone), Some(&4));
        assert_eq!(constants.spawners.count, 2);
    }

    #[test]
    fn test_revive_formula() {
        let constants = SimConstants::default();
        // floor(3 * 5 * 1.0)
        assert!((constants.revive_seconds(3, 0) - 15.0).abs() < f64::EPSILON);
        // floor(3 * 5 * 1.4) = 21
        assert!((constants.revive_seconds(3, 2) - 21.0).abs() < f64::EPSILON);
        // floor(1 * 5 * 1.2) = 6
        assert!((constants.revive_seconds(1, 1) - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_xp_curve() {
        let constants = SimConstants::default();
        assert!((constants.xp_to_next_level(1) - 100.0).abs() < 1e-9);
        assert!((constants.xp_to_next_level(3) - 225.0).abs() < 1e-9);
    }
}
