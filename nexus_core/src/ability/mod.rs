//! Abilities - Active/passive definitions and their runtime state

mod active;
mod passive;
mod telegraph;
mod types;

pub use active::ActiveAbility;
pub use passive::{modify_damage, stat_bonus_modifiers, PassiveAbility};
pub use telegraph::{prepare_to_use_enemy_ability_on_target, CastSnapshot, EnemyCast, ZoneCooldowns};
pub use types::{
    AbilityAction, AbilityDefinition, AbilityKind, ActiveSpec, PassiveHook, PassiveSpec, PoolSpec,
    Targeting,
};

use crate::stat_block::{StatKey, StatModifier};
use crate::types::{AbilityId, AllyTypeId, EffectId, ScaledValue};
use std::collections::HashMap;

/// Ability definition registry
#[derive(Debug, Clone, Default)]
pub struct AbilityRegistry {
    definitions: HashMap<AbilityId, AbilityDefinition>,
}

impl AbilityRegistry {
    pub fn new() -> Self {
        AbilityRegistry {
            definitions: HashMap::new(),
        }
    }

    pub fn register(&mut self, definition: AbilityDefinition) {
        self.definitions.insert(definition.id.clone(), definition);
    }

    pub fn get(&self, id: &AbilityId) -> Option<&AbilityDefinition> {
        self.definitions.get(id)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AbilityDefinition> {
        self.definitions.values()
    }

    /// Built-in hero, ally and enemy abilities
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(active(
            "power_strike",
            "Power Strike",
            ActiveSpec {
                targeting: Targeting {
                    enemies: true,
                    range: 15.0,
                    ..Targeting::default()
                },
                cooldown: ScaledValue::new(4000.0, -200.0),
                max_charges: 1,
                actions: vec![
                    AbilityAction::Damage {
                        amount: ScaledValue::new(10.0, 5.0),
                        damage_ratio: 1.0,
                        radius: 0.0,
                    },
                    AbilityAction::ApplyEffect {
                        effect: EffectId::from("stun"),
                        stacks: 1,
                        radius: 0.0,
                        friendly: false,
                    },
                ],
                warning_duration: 0.0,
                zone_cooldown: 0.0,
            },
            ScaledValue::new(20.0, 20.0),
        ));

        // No targeting: fires around the caster
        registry.register(active(
            "whirlwind",
            "Whirlwind",
            ActiveSpec {
                targeting: Targeting::default(),
                cooldown: ScaledValue::flat(6000.0),
                max_charges: 2,
                actions: vec![AbilityAction::Damage {
                    amount: ScaledValue::new(8.0, 4.0),
                    damage_ratio: 0.5,
                    radius: 40.0,
                }],
                warning_duration: 0.0,
                zone_cooldown: 0.0,
            },
            ScaledValue::new(30.0, 25.0),
        ));

        registry.register(active(
            "fireball",
            "Fireball",
            ActiveSpec {
                targeting: Targeting {
                    enemies: true,
                    location: true,
                    range: 150.0,
                    ..Targeting::default()
                },
                cooldown: ScaledValue::flat(5000.0),
                max_charges: 1,
                actions: vec![AbilityAction::Projectile {
                    damage: ScaledValue::new(20.0, 8.0),
                    speed: 200.0,
                    radius: 6.0,
                    duration: 1.5,
                    piercing: false,
                    effect: None,
                    pool: Some(PoolSpec {
                        radius: 25.0,
                        damage_per_second: 5.0,
                        duration: 3.0,
                    }),
                }],
                warning_duration: 0.0,
                zone_cooldown: 0.0,
            },
            ScaledValue::new(40.0, 30.0),
        ));

        registry.register(active(
            "mend",
            "Mend",
            ActiveSpec {
                targeting: Targeting {
                    allies: true,
                    range: 80.0,
                    ..Targeting::default()
                },
                cooldown: ScaledValue::flat(8000.0),
                max_charges: 1,
                actions: vec![AbilityAction::Heal {
                    amount: ScaledValue::new(25.0, 10.0),
                    radius: 0.0,
                }],
                warning_duration: 0.0,
                zone_cooldown: 0.0,
            },
            ScaledValue::new(25.0, 20.0),
        ));

        registry.register(active(
            "battle_cry",
            "Battle Cry",
            ActiveSpec {
                targeting: Targeting::default(),
                cooldown: ScaledValue::flat(12000.0),
                max_charges: 1,
                actions: vec![AbilityAction::SelfBuff {
                    modifiers: vec![
                        StatModifier::percent(StatKey::Damage, 30.0),
                        StatModifier::percent(StatKey::AttacksPerSecond, 20.0),
                    ],
                    duration: ScaledValue::new(4.0, 1.0),
                }],
                warning_duration: 0.0,
                zone_cooldown: 0.0,
            },
            ScaledValue::new(30.0, 30.0),
        ));

        registry.register(active(
            "call_wolf",
            "Call Wolf",
            ActiveSpec {
                targeting: Targeting::default(),
                cooldown: ScaledValue::new(20000.0, -1000.0),
                max_charges: 1,
                actions: vec![AbilityAction::Summon {
                    ally: AllyTypeId::from("wolf"),
                    count: 1,
                    lifetime: 15.0,
                }],
                warning_duration: 0.0,
                zone_cooldown: 0.0,
            },
            ScaledValue::new(50.0, 40.0),
        ));

        registry.register(passive(
            "toughness",
            "Toughness",
            vec![PassiveHook::StatBonus {
                modifiers: vec![
                    StatModifier::flat(StatKey::MaxHealth, 15.0),
                    StatModifier::flat(StatKey::Armor, 1.0),
                ],
            }],
        ));

        registry.register(passive(
            "venom_blade",
            "Venom Blade",
            vec![PassiveHook::OnHitEffect {
                effect: EffectId::from("poison"),
                stacks: 1,
                chance: 0.5,
            }],
        ));

        registry.register(passive(
            "cleave",
            "Cleave",
            vec![PassiveHook::Cleave {
                radius: 20.0,
                fraction: ScaledValue::new(0.3, 0.1),
            }],
        ));

        registry.register(passive(
            "executioner",
            "Executioner",
            vec![PassiveHook::BonusVsWounded {
                threshold: 0.3,
                percent: ScaledValue::new(50.0, 25.0),
            }],
        ));

        registry.register(passive(
            "inspire",
            "Inspire",
            vec![PassiveHook::Aura {
                effect: EffectId::from("inspired"),
                radius: 60.0,
                hostile: false,
            }],
        ));

        registry.register(passive(
            "regeneration",
            "Regeneration",
            vec![PassiveHook::Regeneration {
                per_second: ScaledValue::new(1.0, 0.5),
            }],
        ));

        // Enemy abilities: telegraphed and zone throttled
        registry.register(active(
            "slam",
            "Slam",
            ActiveSpec {
                targeting: Targeting {
                    enemies: true,
                    range: 30.0,
                    ..Targeting::default()
                },
                cooldown: ScaledValue::flat(6000.0),
                max_charges: 1,
                actions: vec![AbilityAction::Damage {
                    amount: ScaledValue::new(12.0, 4.0),
                    damage_ratio: 0.0,
                    radius: 30.0,
                }],
                warning_duration: 800.0,
                zone_cooldown: 2000.0,
            },
            ScaledValue::flat(0.0),
        ));

        registry.register(active(
            "spit",
            "Spit",
            ActiveSpec {
                targeting: Targeting {
                    enemies: true,
                    range: 120.0,
                    ..Targeting::default()
                },
                cooldown: ScaledValue::flat(4000.0),
                max_charges: 1,
                actions: vec![AbilityAction::Projectile {
                    damage: ScaledValue::new(6.0, 2.0),
                    speed: 150.0,
                    radius: 4.0,
                    duration: 1.2,
                    piercing: false,
                    effect: Some(EffectId::from("slow")),
                    pool: None,
                }],
                warning_duration: 400.0,
                zone_cooldown: 1000.0,
            },
            ScaledValue::flat(0.0),
        ));

        registry
    }
}

fn active(id: &str, name: &str, spec: ActiveSpec, level_cost: ScaledValue) -> AbilityDefinition {
    AbilityDefinition {
        id: AbilityId::from(id),
        name: name.to_string(),
        kind: AbilityKind::Active(spec),
        level_cost,
        max_level: 5,
    }
}

fn passive(id: &str, name: &str, hooks: Vec<PassiveHook>) -> AbilityDefinition {
    AbilityDefinition {
        id: AbilityId::from(id),
        name: name.to_string(),
        kind: AbilityKind::Passive(PassiveSpec { hooks }),
        level_cost: ScaledValue::new(20.0, 20.0),
        max_level: 5,
    }
}
