//! Static content tables and their TOML loading

use super::ConfigError;
use crate::ability::{AbilityAction, AbilityDefinition, AbilityKind, AbilityRegistry, PassiveHook};
use crate::effect::{EffectDefinition, EffectRegistry};
use crate::job::{JobCondition, JobDefinition, JobReward};
use crate::stat_block::{StatBase, StatKey, StatModifier, StatProfile};
use crate::types::{
    AbilityId, AllyTypeId, EffectId, EnemyTypeId, EquipmentSlot, HeroClassId, ItemId, JobKey,
    ResourceKind, ScaledValue, ToolType, ZoneId,
};
use crate::unit::{AllyDefinition, EnemyDefinition, HeroClass, ItemDefinition};
use crate::world::{ZoneDefinition, ZoneObjectSpec};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::error;

/// Read-only content consumed by a running game
#[derive(Debug, Clone, Default)]
pub struct Content {
    pub effects: EffectRegistry,
    pub abilities: AbilityRegistry,
    pub hero_classes: BTreeMap<HeroClassId, HeroClass>,
    pub allies: BTreeMap<AllyTypeId, AllyDefinition>,
    pub enemies: BTreeMap<EnemyTypeId, EnemyDefinition>,
    pub items: BTreeMap<ItemId, ItemDefinition>,
    pub jobs: BTreeMap<JobKey, JobDefinition>,
    pub zones: BTreeMap<ZoneId, ZoneDefinition>,
}

/// On-disk layout of a content file; every table is optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentFile {
    #[serde(default)]
    pub effects: Vec<EffectDefinition>,
    #[serde(default)]
    pub abilities: Vec<AbilityDefinition>,
    #[serde(default)]
    pub hero_classes: Vec<HeroClass>,
    #[serde(default)]
    pub allies: Vec<AllyDefinition>,
    #[serde(default)]
    pub enemies: Vec<EnemyDefinition>,
    #[serde(default)]
    pub items: Vec<ItemDefinition>,
    #[serde(default)]
    pub jobs: Vec<JobDefinition>,
    #[serde(default)]
    pub zones: Vec<ZoneDefinition>,
}

/// Parse a content file and layer it over the built-in tables
pub fn parse_content(content: &str) -> Result<Content, ConfigError> {
    let file: ContentFile = super::parse_toml(content)?;
    let mut tables = Content::with_defaults();
    tables.extend(file);
    tables.validate()?;
    Ok(tables)
}

/// Load a content file from disk and layer it over the built-in tables
pub fn load_content(path: &Path) -> Result<Content, ConfigError> {
    let text = fs::read_to_string(path)?;
    parse_content(&text)
}

impl Content {
    /// Add (or replace by id) every definition of a content file
    pub fn extend(&mut self, file: ContentFile) {
        for def in file.effects {
            self.effects.register(def);
        }
        for def in file.abilities {
            self.abilities.register(def);
        }
        for def in file.hero_classes {
            self.hero_classes.insert(def.id.clone(), def);
        }
        for def in file.allies {
            self.allies.insert(def.id.clone(), def);
        }
        for def in file.enemies {
            self.enemies.insert(def.id.clone(), def);
        }
        for def in file.items {
            self.items.insert(def.id.clone(), def);
        }
        for def in file.jobs {
            self.jobs.insert(def.key.clone(), def);
        }
        for def in file.zones {
            self.zones.insert(def.id.clone(), def);
        }
    }

    pub fn ability(&self, id: &AbilityId) -> Option<&AbilityDefinition> {
        self.abilities.get(id)
    }

    pub fn effect(&self, id: &EffectId) -> Option<&EffectDefinition> {
        self.effects.get(id)
    }

    /// Resolve an item, falling back to a placeholder for unknown ids
    pub fn item(&self, id: &ItemId) -> ItemDefinition {
        match self.items.get(id) {
            Some(def) => def.clone(),
            None => {
                error!(item = %id, "missing item definition");
                ItemDefinition::missing(id)
            }
        }
    }

    /// Check every cross-table reference
    pub fn validate(&self) -> Result<(), ConfigError> {
        for ability in self.abilities.iter() {
            self.validate_ability(ability)?;
        }
        for class in self.hero_classes.values() {
            let owner = format!("hero class '{}'", class.id);
            for id in class.abilities.iter().chain(&class.starting_abilities) {
                self.require_ability(id, &owner)?;
            }
            require_acyclic_stats(&class.stats, &owner)?;
        }
        for ally in self.allies.values() {
            let owner = format!("ally '{}'", ally.id);
            for id in &ally.abilities {
                self.require_ability(id, &owner)?;
            }
            require_acyclic_stats(&ally.stats, &owner)?;
        }
        for enemy in self.enemies.values() {
            let owner = format!("enemy '{}'", enemy.id);
            for id in &enemy.abilities {
                self.require_ability(id, &owner)?;
            }
            require_acyclic_stats(&enemy.stats, &owner)?;
        }
        for job in self.jobs.values() {
            if job.worker_seconds <= 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "job '{}' needs a positive worker_seconds",
                    job.key
                )));
            }
            if let JobReward::CraftItem { item } = &job.reward {
                if !self.items.contains_key(item) {
                    return Err(ConfigError::ValidationError(format!(
                        "job '{}' crafts unknown item '{}'",
                        job.key, item
                    )));
                }
            }
        }
        for zone in self.zones.values() {
            for spec in &zone.layout {
                let enemy = match spec {
                    ZoneObjectSpec::Enemy { enemy, .. } | ZoneObjectSpec::Spawner { enemy, .. } => enemy,
                    _ => continue,
                };
                if !self.enemies.contains_key(enemy) {
                    return Err(ConfigError::ValidationError(format!(
                        "zone '{}' places unknown enemy '{}'",
                        zone.id, enemy
                    )));
                }
            }
        }
        if !self.zones.contains_key(&ZoneId::world()) {
            return Err(ConfigError::ValidationError(
                "content must define the 'world' zone".to_string(),
            ));
        }
        Ok(())
    }

    fn require_ability(&self, id: &AbilityId, owner: &str) -> Result<(), ConfigError> {
        if self.abilities.get(id).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "{} references unknown ability '{}'",
                owner, id
            )));
        }
        Ok(())
    }

    fn require_effect(&self, id: &EffectId, owner: &AbilityId) -> Result<(), ConfigError> {
        if self.effects.get(id).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "ability '{}' references unknown effect '{}'",
                owner, id
            )));
        }
        Ok(())
    }

    fn validate_ability(&self, ability: &AbilityDefinition) -> Result<(), ConfigError> {
        match &ability.kind {
            AbilityKind::Active(spec) => {
                for action in &spec.actions {
                    match action {
                        AbilityAction::ApplyEffect { effect, .. } => {
                            self.require_effect(effect, &ability.id)?
                        }
                        AbilityAction::Projectile {
                            effect: Some(effect),
                            ..
                        } => self.require_effect(effect, &ability.id)?,
                        AbilityAction::Summon { ally, .. } if !self.allies.contains_key(ally) => {
                            return Err(ConfigError::ValidationError(format!(
                                "ability '{}' summons unknown ally '{}'",
                                ability.id, ally
                            )));
                        }
                        _ => {}
                    }
                }
            }
            AbilityKind::Passive(spec) => {
                for hook in &spec.hooks {
                    match hook {
                        PassiveHook::Aura { effect, .. } | PassiveHook::OnHitEffect { effect, .. } => {
                            self.require_effect(effect, &ability.id)?
                        }
                        _ => {}
                    }
                }
            }
        }
        Ok(())
    }

    /// Built-in content tables
    pub fn with_defaults() -> Self {
        let mut content = Content {
            effects: EffectRegistry::with_defaults(),
            abilities: AbilityRegistry::with_defaults(),
            ..Content::default()
        };

        for class in default_hero_classes() {
            content.hero_classes.insert(class.id.clone(), class);
        }
        for ally in default_allies() {
            content.allies.insert(ally.id.clone(), ally);
        }
        for enemy in default_enemies() {
            content.enemies.insert(enemy.id.clone(), enemy);
        }
        for item in default_items() {
            content.items.insert(item.id.clone(), item);
        }
        for job in default_jobs() {
            content.jobs.insert(job.key.clone(), job);
        }
        for zone in default_zones() {
            content.zones.insert(zone.id.clone(), zone);
        }

        content
    }
}

fn require_acyclic_stats(stats: &StatProfile, owner: &str) -> Result<(), ConfigError> {
    match stats.derived_cycle() {
        Some(key) => Err(ConfigError::ValidationError(format!(
            "{} has a derived stat cycle through {:?}",
            owner, key
        ))),
        None => Ok(()),
    }
}

fn ids(list: &[&str]) -> Vec<AbilityId> {
    list.iter().map(|s| AbilityId::from(*s)).collect()
}

fn default_hero_classes() -> Vec<HeroClass> {
    vec![
        HeroClass {
            id: HeroClassId::from("warrior"),
            name: "Warrior".to_string(),
            stats: StatProfile::new()
                .with(StatKey::MaxHealth, StatBase::per_level(120.0, 15.0))
                .with(StatKey::Damage, StatBase::per_level(8.0, 1.5))
                .with(StatKey::Armor, StatBase::per_level(3.0, 0.5))
                .with(StatKey::AttackRange, StatBase::constant(6.0))
                .with(StatKey::CriticalChance, StatBase::constant(0.05))
                .with(StatKey::ExtraHitChance, StatBase::constant(0.1))
                .with(StatKey::MovementSpeed, StatBase::constant(60.0))
                .with(StatKey::HealthRegen, StatBase::per_level(0.5, 0.1)),
            abilities: ids(&[
                "power_strike",
                "whirlwind",
                "battle_cry",
                "toughness",
                "cleave",
                "executioner",
            ]),
            starting_abilities: ids(&["power_strike"]),
        },
        HeroClass {
            id: HeroClassId::from("ranger"),
            name: "Ranger".to_string(),
            stats: StatProfile::new()
                .with(StatKey::MaxHealth, StatBase::per_level(80.0, 10.0))
                .with(StatKey::Damage, StatBase::per_level(6.0, 1.2))
                .with(StatKey::AttackRange, StatBase::constant(90.0))
                .with(StatKey::AttacksPerSecond, StatBase::constant(1.2))
                .with(StatKey::CriticalChance, StatBase::constant(0.1))
                .with(StatKey::MovementSpeed, StatBase::constant(65.0))
                .with(
                    StatKey::AggroRadius,
                    StatBase::Derived {
                        from: StatKey::AttackRange,
                        ratio: 1.0,
                        plus: 40.0,
                    },
                ),
            abilities: ids(&[
                "fireball",
                "mend",
                "call_wolf",
                "venom_blade",
                "inspire",
                "regeneration",
            ]),
            starting_abilities: ids(&["fireball"]),
        },
    ]
}

fn default_allies() -> Vec<AllyDefinition> {
    vec![AllyDefinition {
        id: AllyTypeId::from("wolf"),
        name: "Wolf".to_string(),
        stats: StatProfile::new()
            .with(StatKey::MaxHealth, StatBase::per_level(40.0, 8.0))
            .with(StatKey::Damage, StatBase::per_level(4.0, 1.0))
            .with(StatKey::AttacksPerSecond, StatBase::constant(1.5))
            .with(StatKey::MovementSpeed, StatBase::constant(80.0)),
        radius: 6.0,
        abilities: Vec::new(),
    }]
}

fn default_enemies() -> Vec<EnemyDefinition> {
    vec![
        EnemyDefinition {
            id: EnemyTypeId::from("goblin"),
            name: "Goblin".to_string(),
            stats: StatProfile::new()
                .with(StatKey::MaxHealth, StatBase::per_level(25.0, 8.0))
                .with(StatKey::Damage, StatBase::per_level(3.0, 1.0))
                .with(StatKey::MovementSpeed, StatBase::constant(40.0))
                .with(StatKey::AggroRadius, StatBase::constant(80.0)),
            radius: 7.0,
            xp_reward: ScaledValue::new(10.0, 5.0),
            essence_reward: ScaledValue::new(3.0, 1.0),
            abilities: Vec::new(),
        },
        EnemyDefinition {
            id: EnemyTypeId::from("brute"),
            name: "Brute".to_string(),
            stats: StatProfile::new()
                .with(StatKey::MaxHealth, StatBase::per_level(70.0, 20.0))
                .with(StatKey::Damage, StatBase::per_level(7.0, 2.0))
                .with(StatKey::Armor, StatBase::per_level(2.0, 1.0))
                .with(StatKey::AttacksPerSecond, StatBase::constant(0.6))
                .with(StatKey::MovementSpeed, StatBase::constant(30.0)),
            radius: 11.0,
            xp_reward: ScaledValue::new(25.0, 10.0),
            essence_reward: ScaledValue::new(8.0, 3.0),
            abilities: ids(&["slam"]),
        },
        EnemyDefinition {
            id: EnemyTypeId::from("spitter"),
            name: "Spitter".to_string(),
            stats: StatProfile::new()
                .with(StatKey::MaxHealth, StatBase::per_level(20.0, 6.0))
                .with(StatKey::Damage, StatBase::per_level(4.0, 1.0))
                .with(StatKey::AttackRange, StatBase::constant(70.0))
                .with(StatKey::MovementSpeed, StatBase::constant(35.0)),
            radius: 6.0,
            xp_reward: ScaledValue::new(15.0, 6.0),
            essence_reward: ScaledValue::new(5.0, 2.0),
            abilities: ids(&["spit"]),
        },
    ]
}

fn default_items() -> Vec<ItemDefinition> {
    vec![
        ItemDefinition {
            id: ItemId::from("bronze_sword"),
            name: "Bronze Sword".to_string(),
            slot: EquipmentSlot::Weapon,
            modifiers: vec![StatModifier::flat(StatKey::Damage, 3.0)],
        },
        ItemDefinition {
            id: ItemId::from("iron_sword"),
            name: "Iron Sword".to_string(),
            slot: EquipmentSlot::Weapon,
            modifiers: vec![
                StatModifier::flat(StatKey::Damage, 6.0),
                StatModifier::percent(StatKey::AttacksPerSecond, 10.0),
            ],
        },
        ItemDefinition {
            id: ItemId::from("leather_armor"),
            name: "Leather Armor".to_string(),
            slot: EquipmentSlot::Armor,
            modifiers: vec![
                StatModifier::flat(StatKey::Armor, 2.0),
                StatModifier::flat(StatKey::MaxHealth, 10.0),
            ],
        },
        ItemDefinition {
            id: ItemId::from("lucky_charm"),
            name: "Lucky Charm".to_string(),
            slot: EquipmentSlot::Trinket,
            modifiers: vec![
                StatModifier::flat(StatKey::CriticalChance, 0.05),
                StatModifier::flat(StatKey::ExtraHitChance, 0.1),
            ],
        },
    ]
}

fn job(key: &str, name: &str, worker_seconds: f64, reward: JobReward) -> JobDefinition {
    JobDefinition {
        key: JobKey::from(key),
        name: name.to_string(),
        worker_seconds,
        growth: 0.0,
        resource_cost: BTreeMap::new(),
        essence_cost: 0.0,
        required_tool: None,
        max_workers: None,
        repeatable: true,
        reward,
        can_progress: JobCondition::Always,
        valid_while: JobCondition::Always,
    }
}

fn default_jobs() -> Vec<JobDefinition> {
    let gather = |key: &str, name: &str, resource: ResourceKind, tool: Option<ToolType>| JobDefinition {
        required_tool: tool,
        can_progress: JobCondition::ResourceNodeRemaining { resource },
        ..job(key, name, 5.0, JobReward::GainResource { resource, amount: 1 })
    };

    vec![
        gather("chop_wood", "Chop Wood", ResourceKind::Wood, Some(ToolType::Axe)),
        gather("quarry_stone", "Quarry Stone", ResourceKind::Stone, Some(ToolType::Pickaxe)),
        gather("mine_iron", "Mine Iron", ResourceKind::Iron, Some(ToolType::Pickaxe)),
        gather("gather_herbs", "Gather Herbs", ResourceKind::Herb, None),
        JobDefinition {
            resource_cost: BTreeMap::from([(ResourceKind::Wood, 5)]),
            ..job("craft_axe", "Craft Axe", 8.0, JobReward::GainTool { tool: ToolType::Axe })
        },
        JobDefinition {
            resource_cost: BTreeMap::from([(ResourceKind::Wood, 5), (ResourceKind::Stone, 3)]),
            ..job(
                "craft_pickaxe",
                "Craft Pickaxe",
                10.0,
                JobReward::GainTool { tool: ToolType::Pickaxe },
            )
        },
        JobDefinition {
            resource_cost: BTreeMap::from([(ResourceKind::Wood, 4)]),
            ..job(
                "craft_hammer",
                "Craft Hammer",
                8.0,
                JobReward::GainTool { tool: ToolType::Hammer },
            )
        },
        JobDefinition {
            resource_cost: BTreeMap::from([(ResourceKind::Stone, 4)]),
            required_tool: Some(ToolType::Hammer),
            max_workers: Some(1),
            ..job(
                "forge_bronze_sword",
                "Forge Bronze Sword",
                12.0,
                JobReward::CraftItem { item: ItemId::from("bronze_sword") },
            )
        },
        JobDefinition {
            resource_cost: BTreeMap::from([(ResourceKind::Iron, 5)]),
            required_tool: Some(ToolType::Hammer),
            max_workers: Some(1),
            ..job(
                "forge_iron_sword",
                "Forge Iron Sword",
                20.0,
                JobReward::CraftItem { item: ItemId::from("iron_sword") },
            )
        },
        JobDefinition {
            resource_cost: BTreeMap::from([(ResourceKind::Herb, 4)]),
            ..job(
                "sew_leather_armor",
                "Sew Leather Armor",
                12.0,
                JobReward::CraftItem { item: ItemId::from("leather_armor") },
            )
        },
        JobDefinition {
            resource_cost: BTreeMap::from([(ResourceKind::Iron, 2), (ResourceKind::Herb, 2)]),
            essence_cost: 20.0,
            max_workers: Some(1),
            ..job(
                "carve_lucky_charm",
                "Carve Lucky Charm",
                15.0,
                JobReward::CraftItem { item: ItemId::from("lucky_charm") },
            )
        },
        JobDefinition {
            resource_cost: BTreeMap::from([(ResourceKind::Stone, 10), (ResourceKind::Wood, 5)]),
            growth: 0.5,
            ..job("build_wall", "Build Wall", 20.0, JobReward::GainWallLevel)
        },
        JobDefinition {
            can_progress: JobCondition::WallDamaged,
            ..job("repair_wall", "Repair Wall", 2.0, JobReward::RepairWall { amount: 10.0 })
        },
        JobDefinition {
            resource_cost: BTreeMap::from([(ResourceKind::Wood, 8)]),
            growth: 0.5,
            ..job("build_house", "Build House", 15.0, JobReward::GainPopulation)
        },
        JobDefinition {
            resource_cost: BTreeMap::from([(ResourceKind::Herb, 1)]),
            ..job("brew_remedy", "Brew Remedy", 4.0, JobReward::HealHeroes { amount: 20.0 })
        },
        JobDefinition {
            max_workers: Some(0),
            valid_while: JobCondition::HeroTargetAlive,
            ..job("train_hero", "Train Hero", 10.0, JobReward::TrainHero { xp: 15.0 })
        },
        JobDefinition {
            max_workers: Some(2),
            ..job("pray", "Pray", 10.0, JobReward::GainEssence { amount: 5.0 })
        },
    ]
}

fn default_zones() -> Vec<ZoneDefinition> {
    vec![
        ZoneDefinition {
            id: ZoneId::world(),
            name: "Overworld".to_string(),
            floor_color: "#3b5d2a".to_string(),
            entry: (0.0, 45.0),
            layout: vec![
                ZoneObjectSpec::ResourceNode {
                    resource: ResourceKind::Wood,
                    amount: 200,
                    x: 140.0,
                    y: 60.0,
                    r: 20.0,
                },
                ZoneObjectSpec::ResourceNode {
                    resource: ResourceKind::Stone,
                    amount: 150,
                    x: -150.0,
                    y: 80.0,
                    r: 18.0,
                },
                ZoneObjectSpec::ResourceNode {
                    resource: ResourceKind::Herb,
                    amount: 100,
                    x: 60.0,
                    y: -140.0,
                    r: 12.0,
                },
                ZoneObjectSpec::Portal {
                    zone: ZoneId::from("cave"),
                    x: -200.0,
                    y: -200.0,
                    r: 16.0,
                },
            ],
        },
        ZoneDefinition {
            id: ZoneId::from("cave"),
            name: "Cave".to_string(),
            floor_color: "#2e2a27".to_string(),
            entry: (0.0, 0.0),
            layout: vec![
                ZoneObjectSpec::Enemy {
                    enemy: EnemyTypeId::from("goblin"),
                    level: 2,
                    x: 80.0,
                    y: 10.0,
                },
                ZoneObjectSpec::Enemy {
                    enemy: EnemyTypeId::from("brute"),
                    level: 2,
                    x: 140.0,
                    y: -20.0,
                },
                ZoneObjectSpec::Spawner {
                    enemy: EnemyTypeId::from("spitter"),
                    level: 2,
                    x: 220.0,
                    y: 0.0,
                },
                ZoneObjectSpec::ResourceNode {
                    resource: ResourceKind::Iron,
                    amount: 80,
                    x: 180.0,
                    y: 90.0,
                    r: 14.0,
                },
                ZoneObjectSpec::Portal {
                    zone: ZoneId::world(),
                    x: -30.0,
                    y: 0.0,
                    r: 16.0,
                },
            ],
        },
    ]
}
