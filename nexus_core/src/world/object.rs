//! FieldObject - Everything that occupies space in a zone

use super::spawner::Spawner;
use crate::types::{Circle, ObjectId, ResourceKind, Team, ZoneId};
use crate::unit::{Ally, Enemy, Hero, UnitCore};
use serde::{Deserialize, Serialize};

/// The player's base as it appears in the overworld
///
/// Its essence and wall live on [`super::NexusState`]; this is only the
/// body that can be targeted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NexusObject {
    pub id: ObjectId,
    pub circle: Circle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StructureKind {
    /// Finite supply drawn on by gathering jobs
    ResourceNode { resource: ResourceKind, remaining: u32 },
    Portal { zone: ZoneId },
}

/// Static, untargetable scenery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    pub id: ObjectId,
    pub circle: Circle,
    pub kind: StructureKind,
}

/// Essence dropped by a kill, collected by touching heroes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Loot {
    pub id: ObjectId,
    pub circle: Circle,
    pub essence: f64,
    /// Seconds before it fades
    pub lifetime: f64,
}

#[derive(Debug, Clone)]
pub enum FieldObject {
    Hero(Hero),
    Ally(Ally),
    Enemy(Enemy),
    Spawner(Spawner),
    Nexus(NexusObject),
    Structure(Structure),
    Loot(Loot),
}

impl FieldObject {
    pub fn id(&self) -> ObjectId {
        match self {
            FieldObject::Hero(h) => h.core.id,
            FieldObject::Ally(a) => a.core.id,
            FieldObject::Enemy(e) => e.core.id,
            FieldObject::Spawner(s) => s.id,
            FieldObject::Nexus(n) => n.id,
            FieldObject::Structure(s) => s.id,
            FieldObject::Loot(l) => l.id,
        }
    }

    pub fn circle(&self) -> Circle {
        match self {
            FieldObject::Hero(h) => h.core.circle,
            FieldObject::Ally(a) => a.core.circle,
            FieldObject::Enemy(e) => e.core.circle,
            FieldObject::Spawner(s) => s.circle,
            FieldObject::Nexus(n) => n.circle,
            FieldObject::Structure(s) => s.circle,
            FieldObject::Loot(l) => l.circle,
        }
    }

    /// Side this object fights on; None for things that cannot be attacked
    pub fn team(&self) -> Option<Team> {
        match self {
            FieldObject::Hero(_) | FieldObject::Ally(_) | FieldObject::Nexus(_) => Some(Team::Player),
            FieldObject::Enemy(_) | FieldObject::Spawner(_) => Some(Team::Hostile),
            FieldObject::Structure(_) | FieldObject::Loot(_) => None,
        }
    }

    /// Alive and present; the nexus, structures and loot always are
    pub fn is_available(&self) -> bool {
        match self {
            FieldObject::Hero(h) => h.is_available(),
            FieldObject::Ally(a) => a.is_available(),
            FieldObject::Enemy(e) => e.is_available(),
            FieldObject::Spawner(s) => s.is_available(),
            FieldObject::Nexus(_) | FieldObject::Structure(_) | FieldObject::Loot(_) => true,
        }
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, FieldObject::Hero(_) | FieldObject::Ally(_) | FieldObject::Enemy(_))
    }

    pub fn unit(&self) -> Option<&UnitCore> {
        match self {
            FieldObject::Hero(h) => Some(&h.core),
            FieldObject::Ally(a) => Some(&a.core),
            FieldObject::Enemy(e) => Some(&e.core),
            _ => None,
        }
    }

    pub fn unit_mut(&mut self) -> Option<&mut UnitCore> {
        match self {
            FieldObject::Hero(h) => Some(&mut h.core),
            FieldObject::Ally(a) => Some(&mut a.core),
            FieldObject::Enemy(e) => Some(&mut e.core),
            _ => None,
        }
    }

    /// Health fraction of things with a health bar
    pub fn health_fraction(&self) -> Option<f64> {
        match self {
            FieldObject::Spawner(s) => Some(s.health_fraction()),
            _ => self.unit().map(UnitCore::health_fraction),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldObject::Hero(_) => "hero",
            FieldObject::Ally(_) => "ally",
            FieldObject::Enemy(_) => "enemy",
            FieldObject::Spawner(_) => "spawner",
            FieldObject::Nexus(_) => "nexus",
            FieldObject::Structure(_) => "structure",
            FieldObject::Loot(_) => "loot",
        }
    }

    pub fn as_hero(&self) -> Option<&Hero> {
        match self {
            FieldObject::Hero(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_hero_mut(&mut self) -> Option<&mut Hero> {
        match self {
            FieldObject::Hero(h) => Some(h),
            _ => None,
        }
    }
}
