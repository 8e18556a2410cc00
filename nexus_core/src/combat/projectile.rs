//! Zone effects - Projectiles and lingering damage pools

use super::damage::Hit;
use super::targeting::get_team_targets_in_circle;
use crate::ability::PoolSpec;
use crate::types::{Circle, EffectId, ObjectId, Team};
use crate::unit::UnitAction;
use crate::world::FieldObject;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A moving hit volume fired by one side at the other
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub owner: Option<ObjectId>,
    /// Side that fired it; it only hits the opposing side's units
    pub team: Team,
    pub circle: Circle,
    pub vx: f64,
    pub vy: f64,
    /// Seconds of flight left
    pub duration: f64,
    pub damage: f64,
    pub piercing: bool,
    pub effect: Option<EffectId>,
    pub pool: Option<PoolSpec>,
    hit: BTreeSet<ObjectId>,
    expired: bool,
}

/// Launch parameters of a projectile
#[derive(Debug, Clone)]
pub struct ProjectileLaunch {
    pub owner: Option<ObjectId>,
    pub team: Team,
    pub from: (f64, f64),
    pub toward: (f64, f64),
    pub speed: f64,
    pub radius: f64,
    pub duration: f64,
    pub damage: f64,
    pub piercing: bool,
    pub effect: Option<EffectId>,
    pub pool: Option<PoolSpec>,
}

impl Projectile {
    pub fn launch(params: ProjectileLaunch) -> Self {
        let (x, y) = params.from;
        let dx = params.toward.0 - x;
        let dy = params.toward.1 - y;
        let len = (dx * dx + dy * dy).sqrt();
        let (vx, vy) = if len > 0.0 {
            (dx / len * params.speed, dy / len * params.speed)
        } else {
            (0.0, 0.0)
        };

        Projectile {
            owner: params.owner,
            team: params.team,
            circle: Circle::new(x, y, params.radius),
            vx,
            vy,
            duration: params.duration,
            damage: params.damage,
            piercing: params.piercing,
            effect: params.effect,
            pool: params.pool,
            hit: BTreeSet::new(),
            expired: false,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    pub fn has_hit(&self, id: ObjectId) -> bool {
        self.hit.contains(&id)
    }

    /// Move, collide and age by `dt` seconds
    pub fn update(&mut self, dt: f64, objects: &[FieldObject], actions: &mut Vec<UnitAction>) {
        if self.expired {
            return;
        }

        self.circle.x += self.vx * dt;
        self.circle.y += self.vy * dt;

        let targets = get_team_targets_in_circle(objects, &self.circle, self.team.opponent());
        for target in targets.into_iter().filter(|o| o.is_unit()) {
            let id = target.id();
            if !self.hit.insert(id) {
                continue;
            }
            actions.push(UnitAction::Damage {
                target: id,
                hit: Hit::new(self.damage, self.owner),
            });
            if let Some(effect) = &self.effect {
                actions.push(UnitAction::ApplyEffect {
                    target: id,
                    effect: effect.clone(),
                    stacks: 1,
                    source: self.owner,
                });
            }
            if !self.piercing {
                self.expired = true;
                return;
            }
        }

        self.duration -= dt;
        if self.duration <= 0.0 {
            self.expired = true;
        }
    }

    /// Secondary effect left behind where the projectile ended
    pub fn on_expire(&self) -> Option<DamagePool> {
        self.pool.map(|spec| DamagePool {
            owner: self.owner,
            team: self.team,
            circle: Circle::new(self.circle.x, self.circle.y, spec.radius),
            damage_per_second: spec.damage_per_second,
            duration: spec.duration,
        })
    }
}

/// Damage over time to the opposing side inside an area
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DamagePool {
    pub owner: Option<ObjectId>,
    pub team: Team,
    pub circle: Circle,
    pub damage_per_second: f64,
    pub duration: f64,
}

impl DamagePool {
    pub fn is_expired(&self) -> bool {
        self.duration <= 0.0
    }

    pub fn update(&mut self, dt: f64, objects: &[FieldObject], actions: &mut Vec<UnitAction>) {
        let step = dt.min(self.duration.max(0.0));
        if step > 0.0 {
            for target in get_team_targets_in_circle(objects, &self.circle, self.team.opponent()) {
                actions.push(UnitAction::Damage {
                    target: target.id(),
                    hit: Hit::new(self.damage_per_second * step, self.owner),
                });
            }
        }
        self.duration -= dt;
    }
}

/// Transient effect owned by a zone
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ZoneEffect {
    Projectile(Projectile),
    Pool(DamagePool),
}

impl ZoneEffect {
    pub fn owner(&self) -> Option<ObjectId> {
        match self {
            ZoneEffect::Projectile(p) => p.owner,
            ZoneEffect::Pool(p) => p.owner,
        }
    }

    pub fn is_expired(&self) -> bool {
        match self {
            ZoneEffect::Projectile(p) => p.is_expired(),
            ZoneEffect::Pool(p) => p.is_expired(),
        }
    }

    pub fn update(&mut self, dt: f64, objects: &[FieldObject], actions: &mut Vec<UnitAction>) {
        match self {
            ZoneEffect::Projectile(p) => p.update(dt, objects, actions),
            ZoneEffect::Pool(p) => p.update(dt, objects, actions),
        }
    }

    pub fn on_expire(&self) -> Option<ZoneEffect> {
        match self {
            ZoneEffect::Projectile(p) => p.on_expire().map(ZoneEffect::Pool),
            ZoneEffect::Pool(_) => None,
        }
    }
}
