//! Zones - Isolated simulation spaces and their definitions

use super::object::FieldObject;
use crate::ability::ZoneCooldowns;
use crate::combat::ZoneEffect;
use crate::types::{EnemyTypeId, ObjectId, ResourceKind, ZoneId};
use serde::{Deserialize, Serialize};

fn default_floor_color() -> String {
    "#333333".to_string()
}

/// One object placed when a zone is first created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ZoneObjectSpec {
    Enemy {
        enemy: EnemyTypeId,
        level: u32,
        x: f64,
        y: f64,
    },
    Spawner {
        enemy: EnemyTypeId,
        level: u32,
        x: f64,
        y: f64,
    },
    ResourceNode {
        resource: ResourceKind,
        amount: u32,
        x: f64,
        y: f64,
        r: f64,
    },
    Portal {
        zone: ZoneId,
        x: f64,
        y: f64,
        r: f64,
    },
}

/// Static description of a zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneDefinition {
    pub id: ZoneId,
    pub name: String,
    #[serde(default = "default_floor_color")]
    pub floor_color: String,
    /// Where heroes arrive when they enter
    #[serde(default)]
    pub entry: (f64, f64),
    #[serde(default)]
    pub layout: Vec<ZoneObjectSpec>,
}

/// A running zone: its clock, objects, transient effects and the shared
/// enemy ability throttle
#[derive(Debug, Clone)]
pub struct ZoneInstance {
    pub id: ZoneId,
    /// Milliseconds simulated in this zone
    pub time: f64,
    pub objects: Vec<FieldObject>,
    pub effects: Vec<ZoneEffect>,
    pub cooldowns: ZoneCooldowns,
    pub entry: (f64, f64),
}

impl ZoneInstance {
    pub fn new(id: ZoneId, entry: (f64, f64)) -> Self {
        ZoneInstance {
            id,
            time: 0.0,
            objects: Vec::new(),
            effects: Vec::new(),
            cooldowns: ZoneCooldowns::new(),
            entry,
        }
    }

    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id() == id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&FieldObject> {
        self.objects.iter().find(|o| o.id() == id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut FieldObject> {
        self.objects.iter_mut().find(|o| o.id() == id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.index_of(id).is_some()
    }

    /// Take an object out of the zone; this is its destruction unless the
    /// caller moves it elsewhere
    pub fn remove(&mut self, id: ObjectId) -> Option<FieldObject> {
        self.index_of(id).map(|index| self.objects.remove(index))
    }
}

/// Read-only view of a zone's other objects during one object's update
#[derive(Debug, Clone, Copy)]
pub struct Neighbors<'a> {
    before: &'a [FieldObject],
    after: &'a [FieldObject],
}

impl<'a> Neighbors<'a> {
    pub fn new(before: &'a [FieldObject], after: &'a [FieldObject]) -> Self {
        Neighbors { before, after }
    }

    /// Split `objects` around `index`: the view plus the object itself
    pub fn split(objects: &'a mut [FieldObject], index: usize) -> Option<(&'a mut FieldObject, Neighbors<'a>)> {
        if index >= objects.len() {
            return None;
        }
        let (before, rest) = objects.split_at_mut(index);
        let (current, after) = rest.split_first_mut()?;
        Some((current, Neighbors::new(before, after)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a FieldObject> + 'a {
        self.before.iter().chain(self.after.iter())
    }

    pub fn get(&self, id: ObjectId) -> Option<&'a FieldObject> {
        self.iter().find(|o| o.id() == id)
    }

    pub fn len(&self) -> usize {
        self.before.len() + self.after.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
