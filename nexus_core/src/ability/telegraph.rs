//! Enemy telegraphs - Wind-up casts and the per-zone ability throttle

use super::active::ActiveAbility;
use super::types::ActiveSpec;
use crate::types::{AbilityId, Circle, ZoneId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where the cast was aimed when it started
///
/// A frozen copy, not a live reference: the telegraph does not follow a
/// target that moves during the wind-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastSnapshot {
    pub zone: ZoneId,
    pub x: f64,
    pub y: f64,
}

/// An enemy ability in its warning phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyCast {
    pub ability: AbilityId,
    pub level: u32,
    pub snapshot: CastSnapshot,
    /// Milliseconds elapsed, counting up to `warning_duration`
    pub warning_time: f64,
    pub warning_duration: f64,
}

impl EnemyCast {
    /// Advance the wind-up; true once the cast should resolve
    pub fn advance(&mut self, dt: f64) -> bool {
        self.warning_time += dt;
        self.is_complete()
    }

    pub fn is_complete(&self) -> bool {
        self.warning_time >= self.warning_duration
    }

    /// Fraction of the wind-up elapsed, for display
    pub fn progress(&self) -> f64 {
        if self.warning_duration <= 0.0 {
            1.0
        } else {
            (self.warning_time / self.warning_duration).clamp(0.0, 1.0)
        }
    }
}

/// Shared rate limiter of a zone, keyed by ability definition
///
/// Stores the zone time (ms) at which each ability may next be started by
/// any caster in the zone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZoneCooldowns {
    ready_at: BTreeMap<AbilityId, f64>,
}

impl ZoneCooldowns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self, ability: &AbilityId, now: f64) -> bool {
        self.ready_at.get(ability).map_or(true, |&at| now >= at)
    }

    pub fn arm(&mut self, ability: &AbilityId, now: f64, cooldown: f64) {
        self.ready_at.insert(ability.clone(), now + cooldown.max(0.0));
    }

    pub fn remaining(&self, ability: &AbilityId, now: f64) -> f64 {
        self.ready_at
            .get(ability)
            .map_or(0.0, |&at| (at - now).max(0.0))
    }
}

/// Start the warning phase of an enemy ability aimed at `target`
///
/// Declines (returns `None`, nothing changed) unless both the caster's own
/// cooldown and the zone cooldown are ready. On success the caster's charge
/// is spent and the zone cooldown is armed for every caster in the zone.
pub fn prepare_to_use_enemy_ability_on_target(
    ability: &mut ActiveAbility,
    spec: &ActiveSpec,
    cooldowns: &mut ZoneCooldowns,
    zone: &ZoneId,
    now: f64,
    target: &Circle,
) -> Option<EnemyCast> {
    if !ability.is_ready(spec) || !cooldowns.is_ready(&ability.ability, now) {
        return None;
    }
    if !ability.activate(spec) {
        return None;
    }
    cooldowns.arm(&ability.ability, now, spec.zone_cooldown);

    Some(EnemyCast {
        ability: ability.ability.clone(),
        level: ability.level,
        snapshot: CastSnapshot {
            zone: zone.clone(),
            x: target.x,
            y: target.y,
        },
        warning_time: 0.0,
        warning_duration: spec.warning_duration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::types::Targeting;
    use crate::types::ScaledValue;

    fn slam() -> ActiveSpec {
        ActiveSpec {
            targeting: Targeting {
                enemies: true,
                range: 40.0,
                ..Targeting::default()
            },
            cooldown: ScaledValue::flat(1000.0),
            max_charges: 1,
            actions: Vec::new(),
            warning_duration: 800.0,
            zone_cooldown: 2000.0,
        }
    }

    #[test]
    fn test_zone_cooldown_is_shared_between_casters() {
        let spec = slam();
        let id = AbilityId::from("slam");
        let zone = ZoneId::from("cave");
        let mut cooldowns = ZoneCooldowns::new();
        let mut first = ActiveAbility::new(id.clone(), 1, &spec);
        let mut second = ActiveAbility::new(id.clone(), 1, &spec);
        let target = Circle::new(10.0, 5.0, 8.0);

        let cast = prepare_to_use_enemy_ability_on_target(
            &mut first, &spec, &mut cooldowns, &zone, 0.0, &target,
        );
        assert!(cast.is_some());

        // second caster is ready itself but the zone throttle holds it
        let blocked = prepare_to_use_enemy_ability_on_target(
            &mut second, &spec, &mut cooldowns, &zone, 1000.0, &target,
        );
        assert!(blocked.is_none());
        assert!(second.is_ready(&spec));

        let later = prepare_to_use_enemy_ability_on_target(
            &mut second, &spec, &mut cooldowns, &zone, 2000.0, &target,
        );
        assert!(later.is_some());
    }

    #[test]
    fn test_snapshot_is_frozen() {
        let spec = slam();
        let mut ability = ActiveAbility::new(AbilityId::from("slam"), 1, &spec);
        let mut cooldowns = ZoneCooldowns::new();
        let mut target = Circle::new(3.0, 4.0, 8.0);
        let mut cast = prepare_to_use_enemy_ability_on_target(
            &mut ability,
            &spec,
            &mut cooldowns,
            &ZoneId::world(),
            0.0,
            &target,
        )
        .unwrap();

        target.x = 100.0;
        assert!((cast.snapshot.x - 3.0).abs() < f64::EPSILON);
        assert!(!cast.advance(400.0));
        assert!((cast.progress() - 0.5).abs() < 1e-9);
        assert!(cast.advance(400.0));
    }
}
