//! Ally - Summoned unit that follows its owner and fights

use super::actions::UnitAction;
use super::behavior::{
    acquire_attack_target, age_effects, attack_or_chase, autocast, begin_update, resolve_ability_use,
    tick_abilities, update_passives, UpdateContext,
};
use super::core::UnitCore;
use super::definitions::AllyDefinition;
use super::movement::approach;
use crate::config::Content;
use crate::stat_block::{StatBlock, StatKey};
use crate::types::{AllyTypeId, Circle, ObjectId, Team};
use crate::world::Neighbors;
use tracing::error;

/// Distance an ally keeps from its owner while idle
const FOLLOW_GAP: f64 = 12.0;

#[derive(Debug, Clone)]
pub struct Ally {
    pub core: UnitCore,
    pub kind: AllyTypeId,
    pub owner: Option<ObjectId>,
    /// Seconds left before the summon fades; None lasts forever
    pub lifetime: Option<f64>,
}

impl Ally {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ObjectId,
        definition: &AllyDefinition,
        content: &Content,
        level: u32,
        owner: Option<ObjectId>,
        x: f64,
        y: f64,
        lifetime: Option<f64>,
    ) -> Self {
        let stats = StatBlock::from_profile(&definition.stats, level);
        let mut core = UnitCore::new(id, Circle::new(x, y, definition.radius), Team::Player, stats);
        for ability in &definition.abilities {
            match content.ability(ability) {
                Some(def) => core.set_ability_level(def, level.max(1)),
                None => error!(%ability, ally = %definition.id, "missing ally ability"),
            }
        }
        core.health = core.max_health();

        Ally {
            core,
            kind: definition.id.clone(),
            owner,
            lifetime,
        }
    }

    pub fn is_available(&self) -> bool {
        self.core.is_alive()
    }

    pub fn update(&mut self, neighbors: &Neighbors<'_>, ctx: &mut UpdateContext<'_>, actions: &mut Vec<UnitAction>) {
        if let Some(lifetime) = &mut self.lifetime {
            *lifetime -= ctx.frame;
            if *lifetime <= 0.0 {
                actions.push(UnitAction::Despawn { target: self.core.id });
                return;
            }
        }

        let dt = begin_update(&mut self.core, neighbors, ctx);
        tick_abilities(&mut self.core, ctx, dt);
        if dt > 0.0 {
            autocast(&mut self.core, neighbors, ctx);
        }
        update_passives(&mut self.core, neighbors, ctx, actions, dt);
        age_effects(&mut self.core, ctx.frame, actions);

        if dt <= 0.0 {
            return;
        }
        if resolve_ability_use(&mut self.core, neighbors, ctx, actions, dt) {
            return;
        }
        if let Some(target) = acquire_attack_target(&mut self.core, neighbors, true) {
            if attack_or_chase(&mut self.core, target, neighbors, ctx, actions, dt) {
                return;
            }
        }

        let owner = self
            .owner
            .and_then(|id| neighbors.get(id))
            .filter(|o| o.is_available())
            .map(|o| o.circle());
        if let Some(owner) = owner {
            let step = self.core.stats.get(StatKey::MovementSpeed) * dt;
            approach(&mut self.core.circle, &owner, FOLLOW_GAP, step);
        }
    }
}
