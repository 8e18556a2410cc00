//! Enemy - Hostile unit with level-scaled stats and telegraphed abilities

use super::actions::UnitAction;
use super::behavior::{
    acquire_attack_target, age_effects, attack_or_chase, begin_update, resolve_actions, tick_abilities,
    update_passives, ResolvedTarget, UpdateContext,
};
use super::core::UnitCore;
use super::definitions::EnemyDefinition;
use crate::ability::{prepare_to_use_enemy_ability_on_target, AbilityDefinition, EnemyCast};
use crate::config::Content;
use crate::stat_block::StatBlock;
use crate::types::{Circle, EnemyTypeId, ObjectId, Team};
use crate::world::{FieldObject, Neighbors};
use tracing::{debug, error};

#[derive(Debug, Clone)]
pub struct Enemy {
    pub core: UnitCore,
    pub kind: EnemyTypeId,
    pub level: u32,
    pub xp_reward: f64,
    pub essence_reward: f64,
    /// Spawner that produced this enemy, if any
    pub spawner: Option<ObjectId>,
    /// Ability in its warning phase
    pub cast: Option<EnemyCast>,
}

impl Enemy {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ObjectId,
        definition: &EnemyDefinition,
        content: &Content,
        level: u32,
        x: f64,
        y: f64,
        spawner: Option<ObjectId>,
    ) -> Self {
        let level = level.max(1);
        let stats = StatBlock::from_profile(&definition.stats, level);
        let mut core = UnitCore::new(id, Circle::new(x, y, definition.radius), Team::Hostile, stats);
        for ability in &definition.abilities {
            match content.ability(ability) {
                Some(def) => core.set_ability_level(def, level),
                None => error!(%ability, enemy = %definition.id, "missing enemy ability"),
            }
        }
        core.health = core.max_health();

        Enemy {
            core,
            kind: definition.id.clone(),
            level,
            xp_reward: definition.xp_reward.at(level),
            essence_reward: definition.essence_reward.at(level),
            spawner,
            cast: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.core.is_alive()
    }

    pub fn update(&mut self, neighbors: &Neighbors<'_>, ctx: &mut UpdateContext<'_>, actions: &mut Vec<UnitAction>) {
        let dt = begin_update(&mut self.core, neighbors, ctx);
        tick_abilities(&mut self.core, ctx, dt);
        update_passives(&mut self.core, neighbors, ctx, actions, dt);
        age_effects(&mut self.core, ctx.frame, actions);

        if dt <= 0.0 {
            return;
        }

        if let Some(cast) = &mut self.cast {
            if cast.advance(dt * 1000.0) {
                if let Some(cast) = self.cast.take() {
                    self.resolve_cast(&cast, neighbors, ctx, actions);
                }
            }
            return;
        }

        let target = acquire_attack_target(&mut self.core, neighbors, true).or_else(|| default_target(neighbors, ctx));
        let Some(target) = target else {
            return;
        };
        if self.try_start_cast(target, neighbors, ctx) {
            return;
        }
        attack_or_chase(&mut self.core, target, neighbors, ctx, actions, dt);
    }

    /// Begin the first telegraphed ability that reaches `target`
    fn try_start_cast(&mut self, target: ObjectId, neighbors: &Neighbors<'_>, ctx: &mut UpdateContext<'_>) -> bool {
        let Some(circle) = neighbors.get(target).map(FieldObject::circle) else {
            return false;
        };
        let content = ctx.content;
        for ability in self.core.abilities.iter_mut() {
            let Some(spec) = content.ability(&ability.ability).and_then(AbilityDefinition::active) else {
                continue;
            };
            if self.core.circle.gap_to(&circle) > spec.targeting.range {
                continue;
            }
            let cast = prepare_to_use_enemy_ability_on_target(
                ability,
                spec,
                ctx.cooldowns,
                ctx.zone,
                ctx.zone_time,
                &circle,
            );
            if let Some(cast) = cast {
                debug!(enemy = %self.core.id, ability = %cast.ability, "telegraph started");
                self.cast = Some(cast);
                return true;
            }
        }
        false
    }

    /// Land a finished telegraph at its frozen target point
    fn resolve_cast(
        &mut self,
        cast: &EnemyCast,
        neighbors: &Neighbors<'_>,
        ctx: &UpdateContext<'_>,
        actions: &mut Vec<UnitAction>,
    ) {
        if &cast.snapshot.zone != ctx.zone {
            error!(enemy = %self.core.id, ability = %cast.ability, "telegraph target left the caster's zone");
            return;
        }
        let Some(definition) = ctx.content.ability(&cast.ability) else {
            error!(ability = %cast.ability, "missing ability definition");
            return;
        };
        let Some(spec) = definition.active() else {
            error!(ability = %cast.ability, "telegraphed ability is not active");
            return;
        };
        let target = ResolvedTarget {
            circle: Circle::point(cast.snapshot.x, cast.snapshot.y),
            object: None,
        };
        resolve_actions(
            &mut self.core,
            definition,
            spec,
            cast.level,
            &target,
            neighbors,
            ctx,
            actions,
        );
    }
}

/// Enemies in the overworld march on the nexus when nothing else is near
fn default_target(neighbors: &Neighbors<'_>, ctx: &UpdateContext<'_>) -> Option<ObjectId> {
    if !ctx.zone.is_world() {
        return None;
    }
    neighbors.iter().find_map(|object| match object {
        FieldObject::Nexus(nexus) => Some(nexus.id),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewards_scale_with_level() {
        let content = Content::with_defaults();
        let goblin = &content.enemies[&EnemyTypeId::from("goblin")];
        let enemy = Enemy::new(ObjectId(3), goblin, &content, 3, 0.0, 0.0, None);
        assert_eq!(enemy.core.team, Team::Hostile);
        assert!((enemy.xp_reward - 20.0).abs() < 1e-9);
        assert!((enemy.essence_reward - 5.0).abs() < 1e-9);
        assert!((enemy.core.health - 41.0).abs() < 1e-9);
    }

    #[test]
    fn test_abilities_learned_at_spawn_level() {
        let content = Content::with_defaults();
        let brute = &content.enemies[&EnemyTypeId::from("brute")];
        let enemy = Enemy::new(ObjectId(4), brute, &content, 2, 0.0, 0.0, None);
        assert_eq!(enemy.core.abilities.len(), 1);
        assert_eq!(enemy.core.abilities[0].level, 2);
    }
}
