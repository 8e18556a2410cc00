//! Unit module - Heroes, allies and enemies and their per-tick behavior

mod actions;
mod ally;
mod behavior;
mod core;
mod definitions;
mod enemy;
mod hero;
mod movement;

pub use actions::UnitAction;
pub use ally::Ally;
pub use behavior::{ResolvedTarget, UpdateContext};
pub use self::core::{AbilityUse, MoveTarget, UnitCore};
pub use definitions::{AllyDefinition, EnemyDefinition, HeroClass, ItemDefinition};
pub use enemy::Enemy;
pub use hero::{Hero, ReviveTimer};
pub use movement::{approach, move_towards};
