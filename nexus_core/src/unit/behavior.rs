//! Per-tick behavior shared by heroes, allies and enemies

use super::actions::UnitAction;
use super::core::{AbilityUse, UnitCore};
use super::movement::approach;
use crate::ability::{
    modify_damage, AbilityAction, AbilityDefinition, ActiveSpec, PassiveAbility, PassiveHook, PassiveSpec,
    ZoneCooldowns,
};
use crate::combat::{
    get_team_targets_in_circle, nearest_of_team, roll_crit, roll_hit_count, AbilityTarget, Hit, Projectile,
    ProjectileLaunch, ZoneEffect,
};
use crate::config::{Content, SimConstants};
use crate::stat_block::StatKey;
use crate::types::{Circle, EffectId, ObjectId, Team, ZoneId};
use crate::world::{FieldObject, Neighbors};
use rand::rngs::StdRng;
use rand::Rng;
use std::f64::consts::TAU;
use tracing::{debug, error};

/// Everything a unit may read or touch besides itself and its zone mates
pub struct UpdateContext<'a> {
    pub content: &'a Content,
    pub constants: &'a SimConstants,
    pub rng: &'a mut StdRng,
    pub zone: &'a ZoneId,
    /// Zone clock in milliseconds
    pub zone_time: f64,
    pub cooldowns: &'a mut ZoneCooldowns,
    /// Frame length in seconds
    pub frame: f64,
}

/// Where an ability resolves
#[derive(Debug, Clone, Copy)]
pub struct ResolvedTarget {
    pub circle: Circle,
    pub object: Option<ObjectId>,
}

/// Clamp health, refresh the blocked flag and return this unit's scaled
/// time step (the `Speed` stat throttles its clock; 0 freezes it)
pub(crate) fn begin_update(unit: &mut UnitCore, neighbors: &Neighbors<'_>, ctx: &UpdateContext<'_>) -> f64 {
    unit.clamp_health();
    let hostile = unit.team.opponent();
    unit.blocked = neighbors.iter().any(|o| {
        o.is_available() && o.team() == Some(hostile) && o.circle().intersects(&unit.circle)
    });
    ctx.frame * unit.stats.get(StatKey::Speed)
}

fn active_spec<'c>(content: &'c Content, id: &crate::types::AbilityId) -> Option<&'c ActiveSpec> {
    content.ability(id).and_then(AbilityDefinition::active)
}

fn passive_spec<'c>(content: &'c Content, passive: &PassiveAbility) -> Option<&'c PassiveSpec> {
    if passive.level == 0 {
        return None;
    }
    content.ability(&passive.ability).and_then(AbilityDefinition::passive)
}

/// Cooldown regeneration (scaled by `CooldownSpeed`) and the unit's own timers
pub(crate) fn tick_abilities(unit: &mut UnitCore, ctx: &UpdateContext<'_>, dt: f64) {
    let dt_ms = dt * 1000.0;
    let cooldown_dt = dt_ms * unit.stats.get(StatKey::CooldownSpeed);
    for ability in unit.abilities.iter_mut() {
        match active_spec(ctx.content, &ability.ability) {
            Some(spec) => ability.tick(spec, cooldown_dt),
            None => error!(ability = %ability.ability, "missing active ability definition"),
        }
    }
    unit.autocast_lock = (unit.autocast_lock - dt_ms).max(0.0);
    unit.attack_cooldown = (unit.attack_cooldown - dt).max(0.0);
}

/// Queue the first ready autocast ability that has something to aim at
pub(crate) fn autocast(unit: &mut UnitCore, neighbors: &Neighbors<'_>, ctx: &UpdateContext<'_>) {
    if unit.autocast_lock > 0.0 || unit.ability_use.is_some() {
        return;
    }
    let chosen = unit
        .abilities
        .iter()
        .filter(|a| a.autocast)
        .find_map(|ability| {
            let spec = active_spec(ctx.content, &ability.ability)?;
            if !ability.is_ready(spec) {
                return None;
            }
            autocast_target(unit, spec, neighbors).map(|target| AbilityUse {
                ability: ability.ability.clone(),
                target,
            })
        });
    if chosen.is_some() {
        unit.ability_use = chosen;
    }
}

fn autocast_target(unit: &UnitCore, spec: &ActiveSpec, neighbors: &Neighbors<'_>) -> Option<AbilityTarget> {
    let hostile = unit.team.opponent();
    let aggro = unit.stats.get(StatKey::AggroRadius);
    let reach = aggro.max(spec.targeting.range);

    if spec.targeting.is_immediate() {
        return nearest_of_team(neighbors.iter(), &unit.circle, hostile, aggro)
            .map(|_| AbilityTarget::object(unit.id));
    }

    if spec.targeting.enemies {
        let commanded = unit
            .attack_target
            .and_then(|id| neighbors.get(id))
            .filter(|o| o.is_available() && o.team() == Some(hostile));
        if let Some(target) = commanded.or_else(|| nearest_of_team(neighbors.iter(), &unit.circle, hostile, reach)) {
            return Some(AbilityTarget::object(target.id()));
        }
    }

    if spec.targeting.allies {
        // most wounded friendly unit in reach, the caster included
        let mut best = (unit.health_fraction() < 1.0).then(|| (unit.health_fraction(), unit.id));
        for other in neighbors.iter() {
            if other.team() != Some(unit.team) || !other.is_available() {
                continue;
            }
            if unit.circle.gap_to(&other.circle()) > reach {
                continue;
            }
            if let Some(fraction) = other.health_fraction() {
                if fraction < 1.0 && best.map_or(true, |(b, _)| fraction < b) {
                    best = Some((fraction, other.id()));
                }
            }
        }
        if let Some((_, id)) = best {
            return Some(AbilityTarget::object(id));
        }
    }

    if spec.targeting.location {
        if let Some(target) = nearest_of_team(neighbors.iter(), &unit.circle, hostile, reach) {
            let c = target.circle();
            return Some(AbilityTarget::point(c.x, c.y));
        }
    }

    None
}

/// Passive `update` hooks and stat-based regeneration
pub(crate) fn update_passives(
    unit: &mut UnitCore,
    neighbors: &Neighbors<'_>,
    ctx: &UpdateContext<'_>,
    actions: &mut Vec<UnitAction>,
    dt: f64,
) {
    let mut regen = unit.stats.get(StatKey::HealthRegen) * dt;
    let mut self_auras: Vec<EffectId> = Vec::new();

    for passive in &unit.passives {
        let Some(spec) = passive_spec(ctx.content, passive) else {
            continue;
        };
        for hook in &spec.hooks {
            match hook {
                PassiveHook::Aura { effect, radius, hostile } => {
                    let side = if *hostile { unit.team.opponent() } else { unit.team };
                    let area = Circle::new(unit.circle.x, unit.circle.y, *radius);
                    for target in get_team_targets_in_circle(neighbors.iter(), &area, side) {
                        if target.is_unit() {
                            actions.push(UnitAction::ApplyEffect {
                                target: target.id(),
                                effect: effect.clone(),
                                stacks: 1,
                                source: Some(unit.id),
                            });
                        }
                    }
                    if !*hostile {
                        self_auras.push(effect.clone());
                    }
                }
                PassiveHook::Regeneration { per_second } => {
                    regen += per_second.at(passive.level) * dt;
                }
                _ => {}
            }
        }
    }

    for effect in self_auras {
        match ctx.content.effect(&effect) {
            Some(definition) => unit.effects.apply(&mut unit.stats, definition, Some(unit.id)),
            None => error!(%effect, "missing effect definition"),
        }
    }

    if regen > 0.0 {
        unit.heal(regen);
    } else if regen < 0.0 {
        actions.push(UnitAction::Damage {
            target: unit.id,
            hit: Hit::new(-regen, None),
        });
    }
}

/// Age status effects on the real frame clock; damage over time is queued
/// against the unit itself, credited to whoever applied it
pub(crate) fn age_effects(unit: &mut UnitCore, frame: f64, actions: &mut Vec<UnitAction>) {
    let result = unit.effects.age(&mut unit.stats, frame);
    for (source, amount) in result.damage {
        actions.push(UnitAction::Damage {
            target: unit.id,
            hit: Hit::new(amount, source),
        });
    }
}

fn resolve_target(unit: &UnitCore, target: &AbilityTarget, neighbors: &Neighbors<'_>) -> Option<ResolvedTarget> {
    match *target {
        AbilityTarget::Object { id } if id == unit.id => Some(ResolvedTarget {
            circle: unit.circle,
            object: Some(id),
        }),
        AbilityTarget::Object { id } => neighbors
            .get(id)
            .filter(|o| o.is_available())
            .map(|o| ResolvedTarget {
                circle: o.circle(),
                object: Some(id),
            }),
        AbilityTarget::Point { x, y } => Some(ResolvedTarget {
            circle: Circle::point(x, y),
            object: None,
        }),
    }
}

/// Drive an in-progress ability use: move into range, then activate
///
/// Returns true while the ability use occupies the unit this tick. A target
/// that became unavailable abandons the use without any rollback.
pub(crate) fn resolve_ability_use(
    unit: &mut UnitCore,
    neighbors: &Neighbors<'_>,
    ctx: &UpdateContext<'_>,
    actions: &mut Vec<UnitAction>,
    dt: f64,
) -> bool {
    let Some(pending) = unit.ability_use.clone() else {
        return false;
    };
    let content = ctx.content;

    let Some(definition) = content.ability(&pending.ability) else {
        error!(ability = %pending.ability, "missing ability definition");
        unit.ability_use = None;
        return false;
    };
    let Some(spec) = definition.active() else {
        error!(ability = %pending.ability, "passive ability queued for activation");
        unit.ability_use = None;
        return false;
    };
    let Some(level) = unit
        .active(&pending.ability)
        .filter(|a| a.is_ready(spec))
        .map(|a| a.level)
    else {
        unit.ability_use = None;
        return false;
    };
    let Some(target) = resolve_target(unit, &pending.target, neighbors) else {
        debug!(unit = %unit.id, ability = %pending.ability, "ability target lost");
        unit.ability_use = None;
        return false;
    };

    let in_range =
        spec.targeting.is_immediate() || unit.circle.gap_to(&target.circle) <= spec.targeting.range;
    if !in_range {
        let step = unit.stats.get(StatKey::MovementSpeed) * dt;
        approach(&mut unit.circle, &target.circle, spec.targeting.range, step);
        return true;
    }

    if let Some(ability) = unit.active_mut(&pending.ability) {
        ability.activate(spec);
    }
    unit.ability_use = None;
    unit.autocast_lock = ctx.constants.timing.autocast_lock_ms;
    resolve_actions(unit, definition, spec, level, &target, neighbors, ctx, actions);
    true
}

/// Objects of `team` affected by an action of `radius` at `target`
fn affected(
    caster: &UnitCore,
    target: &ResolvedTarget,
    radius: f64,
    team: Team,
    neighbors: &Neighbors<'_>,
) -> Vec<ObjectId> {
    if radius <= 0.0 {
        return match target.object {
            Some(id) if id == caster.id => {
                if caster.team == team {
                    vec![id]
                } else {
                    Vec::new()
                }
            }
            Some(id) => neighbors
                .get(id)
                .filter(|o| o.is_available() && o.team() == Some(team))
                .map(|o| vec![o.id()])
                .unwrap_or_default(),
            None => get_team_targets_in_circle(neighbors.iter(), &target.circle, team)
                .iter()
                .map(|o| o.id())
                .collect(),
        };
    }

    let area = Circle::new(target.circle.x, target.circle.y, radius);
    let mut ids: Vec<ObjectId> = get_team_targets_in_circle(neighbors.iter(), &area, team)
        .iter()
        .map(|o| o.id())
        .collect();
    if caster.team == team && caster.is_alive() && caster.circle.intersects(&area) {
        ids.push(caster.id);
    }
    ids
}

/// Carry out every action of an active ability
#[allow(clippy::too_many_arguments)]
pub(crate) fn resolve_actions(
    caster: &mut UnitCore,
    definition: &AbilityDefinition,
    spec: &ActiveSpec,
    level: u32,
    target: &ResolvedTarget,
    neighbors: &Neighbors<'_>,
    ctx: &UpdateContext<'_>,
    actions: &mut Vec<UnitAction>,
) {
    let hostile = caster.team.opponent();

    for action in &spec.actions {
        match action {
            AbilityAction::Damage {
                amount,
                damage_ratio,
                radius,
            } => {
                let total = amount.at(level) + damage_ratio * caster.stats.get(StatKey::Damage);
                for id in affected(caster, target, *radius, hostile, neighbors) {
                    actions.push(UnitAction::Damage {
                        target: id,
                        hit: Hit::new(total, Some(caster.id)),
                    });
                }
            }
            AbilityAction::Heal { amount, radius } => {
                let heal = amount.at(level);
                for id in affected(caster, target, *radius, caster.team, neighbors) {
                    if id == caster.id {
                        caster.heal(heal);
                    } else {
                        actions.push(UnitAction::Heal { target: id, amount: heal });
                    }
                }
            }
            AbilityAction::ApplyEffect {
                effect,
                stacks,
                radius,
                friendly,
            } => {
                let side = if *friendly { caster.team } else { hostile };
                for id in affected(caster, target, *radius, side, neighbors) {
                    if id == caster.id {
                        match ctx.content.effect(effect) {
                            Some(def) => caster.effects.apply_stacks(&mut caster.stats, def, *stacks, Some(caster.id)),
                            None => error!(%effect, "missing effect definition"),
                        }
                    } else {
                        actions.push(UnitAction::ApplyEffect {
                            target: id,
                            effect: effect.clone(),
                            stacks: *stacks,
                            source: Some(caster.id),
                        });
                    }
                }
            }
            AbilityAction::SelfBuff { modifiers, duration } => {
                caster.effects.apply_ability_effect(
                    &mut caster.stats,
                    &definition.id,
                    level,
                    modifiers.clone(),
                    Some(duration.at(level)),
                );
            }
            AbilityAction::Projectile {
                damage,
                speed,
                radius,
                duration,
                piercing,
                effect,
                pool,
            } => {
                let projectile = Projectile::launch(ProjectileLaunch {
                    owner: Some(caster.id),
                    team: caster.team,
                    from: (caster.circle.x, caster.circle.y),
                    toward: (target.circle.x, target.circle.y),
                    speed: *speed,
                    radius: *radius,
                    duration: *duration,
                    damage: damage.at(level),
                    piercing: *piercing,
                    effect: effect.clone(),
                    pool: *pool,
                });
                actions.push(UnitAction::SpawnEffect(ZoneEffect::Projectile(projectile)));
            }
            AbilityAction::Summon { ally, count, lifetime } => {
                let offset = caster.circle.r * 2.0;
                for i in 0..*count {
                    let angle = TAU * i as f64 / (*count).max(1) as f64;
                    actions.push(UnitAction::SpawnAlly {
                        ally: ally.clone(),
                        owner: caster.id,
                        level: caster.stats.level(),
                        x: caster.circle.x + angle.cos() * offset,
                        y: caster.circle.y + angle.sin() * offset,
                        lifetime: *lifetime,
                    });
                }
            }
        }
    }
}

/// Pick the attack target: explicit command, then an idle aggro scan, then
/// whatever hostile is touching a blocked unit
pub(crate) fn acquire_attack_target(unit: &mut UnitCore, neighbors: &Neighbors<'_>, idle: bool) -> Option<ObjectId> {
    let hostile = unit.team.opponent();

    if let Some(id) = unit.attack_target {
        let valid = neighbors
            .get(id)
            .is_some_and(|o| o.is_available() && o.team() == Some(hostile));
        if valid {
            return Some(id);
        }
        unit.attack_target = None;
    }

    if idle {
        let aggro = unit.stats.get(StatKey::AggroRadius);
        if let Some(target) = nearest_of_team(neighbors.iter(), &unit.circle, hostile, aggro) {
            return Some(target.id());
        }
    }

    if unit.blocked {
        if let Some(target) = nearest_of_team(neighbors.iter(), &unit.circle, hostile, 0.0) {
            return Some(target.id());
        }
    }

    None
}

/// Attack `target` if in range and off cooldown, otherwise close in
///
/// Returns false only if the target cannot be found.
pub(crate) fn attack_or_chase(
    unit: &mut UnitCore,
    target: ObjectId,
    neighbors: &Neighbors<'_>,
    ctx: &mut UpdateContext<'_>,
    actions: &mut Vec<UnitAction>,
    dt: f64,
) -> bool {
    let Some(object) = neighbors.get(target) else {
        return false;
    };
    let circle = object.circle();
    let range = unit.stats.get(StatKey::AttackRange);

    if unit.circle.gap_to(&circle) > range {
        let step = unit.stats.get(StatKey::MovementSpeed) * dt;
        approach(&mut unit.circle, &circle, range, step);
        return true;
    }

    if unit.attack_cooldown <= 0.0 {
        let attacks_per_second = unit.stats.get(StatKey::AttacksPerSecond);
        if attacks_per_second > 0.0 {
            perform_attack(unit, object, neighbors, ctx, actions);
            unit.attack_cooldown = 1.0 / attacks_per_second;
        }
    }
    true
}

/// One basic attack: extra-hit chain, per-hit crit, passive damage and
/// on-hit hooks
fn perform_attack(
    unit: &UnitCore,
    target: &FieldObject,
    neighbors: &Neighbors<'_>,
    ctx: &mut UpdateContext<'_>,
    actions: &mut Vec<UnitAction>,
) {
    let content = ctx.content;
    let target_id = target.id();
    let target_circle = target.circle();
    let target_fraction = target.health_fraction().unwrap_or(1.0);
    let hostile = unit.team.opponent();

    let hit_count = roll_hit_count(&mut *ctx.rng, unit.stats.get(StatKey::ExtraHitChance));
    let crit_chance = unit.stats.get(StatKey::CriticalChance);
    let crit_multiplier = unit.stats.get(StatKey::CriticalMultiplier);

    for _ in 0..hit_count {
        let mut damage = unit.stats.get(StatKey::Damage);
        for passive in &unit.passives {
            if let Some(spec) = passive_spec(content, passive) {
                damage = modify_damage(spec, passive.level, damage, target_fraction);
            }
        }
        let (multiplier, is_critical) = roll_crit(&mut *ctx.rng, crit_chance, crit_multiplier);
        damage *= multiplier;

        actions.push(UnitAction::Damage {
            target: target_id,
            hit: Hit::new(damage, Some(unit.id)).critical(is_critical),
        });

        // on-hit hooks
        for passive in &unit.passives {
            let Some(spec) = passive_spec(content, passive) else {
                continue;
            };
            for hook in &spec.hooks {
                match hook {
                    PassiveHook::OnHitEffect { effect, stacks, chance } => {
                        if ctx.rng.gen::<f64>() < *chance {
                            actions.push(UnitAction::ApplyEffect {
                                target: target_id,
                                effect: effect.clone(),
                                stacks: *stacks,
                                source: Some(unit.id),
                            });
                        }
                    }
                    PassiveHook::Cleave { radius, fraction } => {
                        let splash = damage * fraction.at(passive.level);
                        let area = Circle::new(target_circle.x, target_circle.y, *radius);
                        for other in get_team_targets_in_circle(neighbors.iter(), &area, hostile) {
                            if other.id() != target_id && other.is_unit() {
                                actions.push(UnitAction::Damage {
                                    target: other.id(),
                                    hit: Hit::new(splash, Some(unit.id)),
                                });
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stat_block::{StatBase, StatBlock, StatProfile};
    use crate::types::{AbilityId, EnemyTypeId};
    use crate::unit::Enemy;
    use rand::SeedableRng;

    struct Fixture {
        content: Content,
        constants: SimConstants,
        rng: StdRng,
        cooldowns: ZoneCooldowns,
        zone: ZoneId,
    }

    impl Fixture {
        fn new() -> Self {
            Fixture {
                content: Content::with_defaults(),
                constants: SimConstants::default(),
                rng: StdRng::seed_from_u64(7),
                cooldowns: ZoneCooldowns::new(),
                zone: ZoneId::from("arena"),
            }
        }

        fn ctx(&mut self) -> UpdateContext<'_> {
            UpdateContext {
                content: &self.content,
                constants: &self.constants,
                rng: &mut self.rng,
                zone: &self.zone,
                zone_time: 0.0,
                cooldowns: &mut self.cooldowns,
                frame: self.constants.frame_seconds(),
            }
        }
    }

    /// 10 damage, two attacks a second, no crits or extra hits
    fn fighter(x: f64) -> UnitCore {
        let profile = StatProfile::new()
            .with(StatKey::Damage, StatBase::constant(10.0))
            .with(StatKey::AttacksPerSecond, StatBase::constant(2.0))
            .with(StatKey::AttackRange, StatBase::constant(10.0));
        UnitCore::new(ObjectId(1), Circle::new(x, 0.0, 8.0), Team::Player, StatBlock::from_profile(&profile, 1))
    }

    fn goblin(content: &Content, id: u64, x: f64) -> FieldObject {
        let definition = &content.enemies[&EnemyTypeId::from("goblin")];
        FieldObject::Enemy(Enemy::new(ObjectId(id), definition, content, 1, x, 0.0, None))
    }

    fn learn(unit: &mut UnitCore, content: &Content, ability: &str) {
        let definition = content.ability(&AbilityId::from(ability)).unwrap();
        unit.set_ability_level(definition, 1);
    }

    #[test]
    fn test_autocast_prefers_commanded_target() {
        let mut fx = Fixture::new();
        let mut unit = fighter(0.0);
        learn(&mut unit, &fx.content, "power_strike");
        let objects = vec![goblin(&fx.content, 2, 30.0), goblin(&fx.content, 3, 60.0)];
        let neighbors = Neighbors::new(&objects, &[]);

        unit.attack_target = Some(ObjectId(3));
        autocast(&mut unit, &neighbors, &fx.ctx());

        let queued = unit.ability_use.clone().unwrap();
        assert_eq!(queued.ability, AbilityId::from("power_strike"));
        assert_eq!(queued.target, AbilityTarget::object(ObjectId(3)));
    }

    #[test]
    fn test_autocast_held_back() {
        let mut fx = Fixture::new();
        let mut unit = fighter(0.0);
        learn(&mut unit, &fx.content, "power_strike");
        let objects = vec![goblin(&fx.content, 2, 30.0)];
        let neighbors = Neighbors::new(&objects, &[]);

        unit.autocast_lock = 100.0;
        autocast(&mut unit, &neighbors, &fx.ctx());
        assert!(unit.ability_use.is_none());

        unit.autocast_lock = 0.0;
        unit.abilities[0].autocast = false;
        autocast(&mut unit, &neighbors, &fx.ctx());
        assert!(unit.ability_use.is_none());

        // nothing to aim at
        unit.abilities[0].autocast = true;
        autocast(&mut unit, &Neighbors::new(&[], &[]), &fx.ctx());
        assert!(unit.ability_use.is_none());

        autocast(&mut unit, &neighbors, &fx.ctx());
        assert!(unit.ability_use.is_some());
    }

    #[test]
    fn test_ability_use_closes_in_then_fires() {
        let mut fx = Fixture::new();
        let strike = AbilityId::from("power_strike");
        let mut unit = fighter(0.0);
        learn(&mut unit, &fx.content, "power_strike");
        // edge gap 85, power strike reaches 15
        let objects = vec![goblin(&fx.content, 2, 100.0)];
        let neighbors = Neighbors::new(&objects, &[]);
        let dt = fx.constants.frame_seconds();
        let mut actions = Vec::new();
        unit.ability_use = Some(AbilityUse {
            ability: strike.clone(),
            target: AbilityTarget::object(ObjectId(2)),
        });

        assert!(resolve_ability_use(&mut unit, &neighbors, &fx.ctx(), &mut actions, dt));
        assert!(unit.circle.x > 0.0 && unit.circle.x <= 1.0 + 1e-9);
        assert!(unit.ability_use.is_some());
        assert!(actions.is_empty());
        assert!(unit.active(&strike).unwrap().cooldown.abs() < f64::EPSILON);

        unit.circle.x = 80.0;
        assert!(resolve_ability_use(&mut unit, &neighbors, &fx.ctx(), &mut actions, dt));
        assert!(unit.ability_use.is_none());
        assert!(unit.active(&strike).unwrap().cooldown > 0.0);
        assert!((unit.autocast_lock - fx.constants.timing.autocast_lock_ms).abs() < f64::EPSILON);
        assert!(actions
            .iter()
            .any(|a| matches!(a, UnitAction::Damage { target, .. } if *target == ObjectId(2))));
        assert!(actions
            .iter()
            .any(|a| matches!(a, UnitAction::ApplyEffect { target, .. } if *target == ObjectId(2))));
    }

    #[test]
    fn test_lost_target_abandons_use_without_spending() {
        let mut fx = Fixture::new();
        let strike = AbilityId::from("power_strike");
        let mut unit = fighter(0.0);
        learn(&mut unit, &fx.content, "power_strike");
        let mut dead = goblin(&fx.content, 2, 20.0);
        if let Some(core) = dead.unit_mut() {
            core.health = 0.0;
        }
        let objects = vec![dead];
        let neighbors = Neighbors::new(&objects, &[]);
        let dt = fx.constants.frame_seconds();
        let mut actions = Vec::new();

        for target in [ObjectId(2), ObjectId(9)] {
            unit.ability_use = Some(AbilityUse {
                ability: strike.clone(),
                target: AbilityTarget::object(target),
            });
            assert!(!resolve_ability_use(&mut unit, &neighbors, &fx.ctx(), &mut actions, dt));
            assert!(unit.ability_use.is_none());
        }
        assert!(unit.active(&strike).unwrap().cooldown.abs() < f64::EPSILON);
        assert!(actions.is_empty());
    }

    #[test]
    fn test_attack_target_priority() {
        let mut fx = Fixture::new();
        let mut unit = fighter(0.0);
        let objects = vec![goblin(&fx.content, 2, 30.0), goblin(&fx.content, 3, 60.0)];
        let neighbors = Neighbors::new(&objects, &[]);

        unit.attack_target = Some(ObjectId(3));
        assert_eq!(acquire_attack_target(&mut unit, &neighbors, false), Some(ObjectId(3)));

        // a stale command is dropped; idle units take the nearest hostile
        unit.attack_target = Some(ObjectId(9));
        assert_eq!(acquire_attack_target(&mut unit, &neighbors, true), Some(ObjectId(2)));
        assert_eq!(unit.attack_target, None);

        // a moving unit only fights what blocks it
        assert_eq!(acquire_attack_target(&mut unit, &neighbors, false), None);
        let touching = vec![goblin(&fx.content, 4, 10.0)];
        let neighbors = Neighbors::new(&touching, &[]);
        begin_update(&mut unit, &neighbors, &fx.ctx());
        assert!(unit.blocked);
        assert_eq!(acquire_attack_target(&mut unit, &neighbors, false), Some(ObjectId(4)));
    }

    #[test]
    fn test_attack_cadence_and_chase() {
        let mut fx = Fixture::new();
        let mut unit = fighter(0.0);
        let objects = vec![goblin(&fx.content, 2, 20.0)];
        let neighbors = Neighbors::new(&objects, &[]);
        let dt = fx.constants.frame_seconds();
        let mut actions = Vec::new();

        assert!(attack_or_chase(&mut unit, ObjectId(2), &neighbors, &mut fx.ctx(), &mut actions, dt));
        assert_eq!(actions.len(), 1);
        let UnitAction::Damage { target, hit } = &actions[0] else {
            panic!("expected a damage action");
        };
        assert_eq!(*target, ObjectId(2));
        assert!((hit.amount - 10.0).abs() < 1e-9);
        assert!((unit.attack_cooldown - 0.5).abs() < 1e-9);

        // cooling down: in range but no swing
        attack_or_chase(&mut unit, ObjectId(2), &neighbors, &mut fx.ctx(), &mut actions, dt);
        assert_eq!(actions.len(), 1);

        tick_abilities(&mut unit, &fx.ctx(), 0.5);
        assert!(unit.attack_cooldown.abs() < f64::EPSILON);
        attack_or_chase(&mut unit, ObjectId(2), &neighbors, &mut fx.ctx(), &mut actions, dt);
        assert_eq!(actions.len(), 2);

        // out of range: close in instead of swinging
        let far = vec![goblin(&fx.content, 3, 200.0)];
        let far = Neighbors::new(&far, &[]);
        unit.attack_cooldown = 0.0;
        assert!(attack_or_chase(&mut unit, ObjectId(3), &far, &mut fx.ctx(), &mut actions, dt));
        assert_eq!(actions.len(), 2);
        assert!(unit.circle.x > 0.0);

        assert!(!attack_or_chase(&mut unit, ObjectId(9), &far, &mut fx.ctx(), &mut actions, dt));
    }
}
