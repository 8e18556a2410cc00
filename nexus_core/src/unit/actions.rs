//! UnitAction - Cross-object mutations queued during an update

use crate::combat::{Hit, ZoneEffect};
use crate::types::{AllyTypeId, EffectId, EnemyTypeId, JobKey, ObjectId, ZoneId};

/// A change to something other than the updating object itself
///
/// Updates only see the rest of their zone read-only; everything they want
/// to do to other objects, the zone or the economy is queued and applied
/// right after their own update.
#[derive(Debug, Clone)]
pub enum UnitAction {
    Damage {
        target: ObjectId,
        hit: Hit,
    },
    Heal {
        target: ObjectId,
        amount: f64,
    },
    ApplyEffect {
        target: ObjectId,
        effect: EffectId,
        stacks: u32,
        source: Option<ObjectId>,
    },
    SpawnEffect(ZoneEffect),
    SpawnAlly {
        ally: AllyTypeId,
        owner: ObjectId,
        level: u32,
        x: f64,
        y: f64,
        lifetime: f64,
    },
    SpawnEnemy {
        enemy: EnemyTypeId,
        level: u32,
        x: f64,
        y: f64,
        spawner: Option<ObjectId>,
    },
    CollectLoot {
        loot: ObjectId,
    },
    /// Hero labor credited to a job
    JobWork {
        hero: ObjectId,
        job: JobKey,
        seconds: f64,
    },
    Despawn {
        target: ObjectId,
    },
    EnterZone {
        hero: ObjectId,
        zone: ZoneId,
    },
}
