//! Spawner - Destructible structure that keeps producing enemies

use super::object::FieldObject;
use super::zone::Neighbors;
use crate::config::SimConstants;
use crate::types::{Circle, EnemyTypeId, ObjectId};
use crate::unit::UnitAction;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spawner {
    pub id: ObjectId,
    pub circle: Circle,
    pub enemy: EnemyTypeId,
    pub level: u32,
    pub health: f64,
    pub max_health: f64,
    /// Seconds until the next spawn attempt
    pub timer: f64,
}

impl Spawner {
    pub fn new(id: ObjectId, enemy: EnemyTypeId, level: u32, x: f64, y: f64, constants: &SimConstants) -> Self {
        let level = level.max(1);
        let max_health = constants.spawners.health_per_level * level as f64;
        Spawner {
            id,
            circle: Circle::new(x, y, constants.spawners.radius),
            enemy,
            level,
            health: max_health,
            max_health,
            timer: constants.spawners.interval,
        }
    }

    pub fn is_available(&self) -> bool {
        self.health > 0.0
    }

    pub fn health_fraction(&self) -> f64 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            (self.health / self.max_health).clamp(0.0, 1.0)
        }
    }

    /// Count down and queue a spawn next to the spawner when due
    ///
    /// A spawner with `max_alive` living children waits without resetting
    /// its timer, so it spawns as soon as one of them dies.
    pub fn update(
        &mut self,
        neighbors: &Neighbors<'_>,
        constants: &SimConstants,
        rng: &mut StdRng,
        dt: f64,
        actions: &mut Vec<UnitAction>,
    ) {
        self.timer -= dt;
        if self.timer > 0.0 {
            return;
        }

        let alive = neighbors
            .iter()
            .filter(|o| matches!(o, FieldObject::Enemy(e) if e.spawner == Some(self.id) && e.is_available()))
            .count();
        if alive >= constants.spawners.max_alive {
            return;
        }

        let angle = rng.gen_range(0.0..TAU);
        let distance = self.circle.r * 1.5;
        actions.push(UnitAction::SpawnEnemy {
            enemy: self.enemy.clone(),
            level: self.level,
            x: self.circle.x + angle.cos() * distance,
            y: self.circle.y + angle.sin() * distance,
            spawner: Some(self.id),
        });
        self.timer = constants.spawners.interval;
    }
}
