//! nexus_core - Simulation core of a real-time idle combat game
//!
//! This library provides:
//! - StatBlock: Lazily cached stats with flat, percent and multiplier modifiers
//! - Effects: Timed stat modifiers, damage over time and stacking rules
//! - Abilities: Active abilities with cooldowns or charges, passive hooks,
//!   and enemy telegraphs
//! - Combat: Target queries, damage resolution, reflection and projectiles
//! - Units: Heroes, allies and enemies and their per-tick behavior
//! - Jobs: The worker economy of population, tools and resources
//! - World: Zones, spawners, player commands, save snapshots and the tick

pub mod ability;
pub mod combat;
pub mod config;
pub mod effect;
pub mod job;
pub mod prelude;
pub mod stat_block;
pub mod types;
pub mod unit;
pub mod world;

// Re-export core types for convenience
pub use ability::{AbilityDefinition, AbilityRegistry, ActiveAbility, PassiveAbility};
pub use combat::{damage_target, heal_target, AbilityTarget, DamageOutcome, Hit};
pub use config::{load_constants, load_content, ConfigError, Content, SimConstants};
pub use effect::{ActiveEffects, EffectDefinition, EffectRegistry};
pub use job::{Economy, Job, JobDefinition};
pub use stat_block::{StatBlock, StatKey, StatModifier};
pub use types::{AbilityId, Circle, JobKey, ObjectId, Team, ZoneId};
pub use unit::{Ally, Enemy, Hero, UnitCore};
pub use world::{
    export_snapshot, import_snapshot, tick, update_game, CommandError, FieldObject, GameState, SaveSnapshot,
};
