//! Prelude module for convenient imports
//!
//! ```rust
//! use nexus_core::prelude::*;
//! ```

// Core types
pub use crate::stat_block::{StatBlock, StatKey, StatModifier};
pub use crate::types::{AbilityId, Circle, EquipmentSlot, ItemId, JobKey, ObjectId, ResourceKind, Team, ToolType, ZoneId};

// Abilities and effects
pub use crate::ability::{AbilityDefinition, ActiveAbility, Targeting};
pub use crate::effect::{EffectDefinition, EffectKind};

// Combat
pub use crate::combat::{AbilityTarget, DamageOutcome, Hit};

// Units
pub use crate::unit::{Ally, Enemy, Hero, UnitCore};

// Economy
pub use crate::job::{Economy, Job, JobReward};

// World
pub use crate::world::{update_game, CommandError, FieldObject, GameState, SaveSnapshot};

// Config
pub use crate::config::{Content, SimConstants};
