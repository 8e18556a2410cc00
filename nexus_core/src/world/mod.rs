//! World module - Zones, field objects and the tick that drives them
//!
//! A [`GameState`] owns every zone instance. Each tick advances all zones
//! in a fixed order; see [`tick`].

mod apply;
mod commands;
mod import;
mod object;
mod spawner;
mod state;
mod tick;
mod zone;

pub use apply::apply_actions;
pub use commands::{
    adjust_job_workers, assign_hero_job, attack_target, clear_commands, equip_item, level_ability,
    move_hero_to, pay_to_revive, revive_cost, select_ability, set_autocast, toggle_job_repeat, travel,
    unequip_item, use_ability, CommandError,
};
pub use import::{export_snapshot, import_snapshot, HeroSnapshot, JobSnapshot, SaveSnapshot, SnapshotError};
pub use object::{FieldObject, Loot, NexusObject, Structure, StructureKind};
pub use spawner::Spawner;
pub use state::{GameState, NexusState, RunCounters, WallState, WorldState};
pub use tick::{tick, update_game};
pub use zone::{Neighbors, ZoneDefinition, ZoneInstance, ZoneObjectSpec};
