//! Core identifiers, geometry and small enums shared by every subsystem

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a field object (hero, enemy, spawner, ...)
///
/// Ids are allocated from a monotonically increasing counter and never
/// reused, so a stale id simply fails to resolve once its object is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Allocates fresh object ids
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectIdAllocator {
    next: u64,
}

impl ObjectIdAllocator {
    pub fn new() -> Self {
        ObjectIdAllocator { next: 1 }
    }

    pub fn allocate(&mut self) -> ObjectId {
        let id = ObjectId(self.next.max(1));
        self.next = id.0 + 1;
        id
    }
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                $name(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Key of a zone instance ("world" for the overworld)
    ZoneId
);
string_id!(
    /// Stable identifier of an effect definition
    EffectId
);
string_id!(
    /// Stable identifier of an ability definition
    AbilityId
);
string_id!(
    /// Stable key of a job
    JobKey
);
string_id!(EnemyTypeId);
string_id!(AllyTypeId);
string_id!(HeroClassId);
string_id!(ItemId);

impl ZoneId {
    pub const WORLD: &'static str = "world";

    /// The overworld zone
    pub fn world() -> Self {
        ZoneId::from(Self::WORLD)
    }

    pub fn is_world(&self) -> bool {
        self.0 == Self::WORLD
    }
}

/// A circle in zone space; every field object is one
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Circle {
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

impl Circle {
    pub fn new(x: f64, y: f64, r: f64) -> Self {
        Circle { x, y, r }
    }

    /// Zero-radius circle at a point
    pub fn point(x: f64, y: f64) -> Self {
        Circle { x, y, r: 0.0 }
    }

    /// Distance between centers
    pub fn distance_to(&self, other: &Circle) -> f64 {
        distance(self.x, self.y, other.x, other.y)
    }

    /// Distance between edges (negative when overlapping)
    pub fn gap_to(&self, other: &Circle) -> f64 {
        self.distance_to(other) - self.r - other.r
    }

    /// Strict intersection: circles exactly `r1 + r2` apart do not intersect
    pub fn intersects(&self, other: &Circle) -> bool {
        self.distance_to(other) < self.r + other.r
    }
}

pub fn distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    (dx * dx + dy * dy).sqrt()
}

/// Which side of the fight an object is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    Player,
    Hostile,
}

impl Team {
    pub fn opponent(self) -> Team {
        match self {
            Team::Player => Team::Hostile,
            Team::Hostile => Team::Player,
        }
    }
}

/// Gatherable resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Wood,
    Stone,
    Iron,
    Herb,
}

impl ResourceKind {
    pub fn all() -> &'static [ResourceKind] {
        &[
            ResourceKind::Wood,
            ResourceKind::Stone,
            ResourceKind::Iron,
            ResourceKind::Herb,
        ]
    }
}

/// Tools that gate how many workers a job can take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolType {
    Axe,
    Pickaxe,
    Hammer,
}

/// Equipment slot for hero gear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentSlot {
    Weapon,
    Armor,
    Trinket,
}

impl EquipmentSlot {
    pub fn all() -> &'static [EquipmentSlot] {
        &[EquipmentSlot::Weapon, EquipmentSlot::Armor, EquipmentSlot::Trinket]
    }
}

/// A value that scales linearly with a level (level 1 = `base`)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScaledValue {
    #[serde(default)]
    pub base: f64,
    #[serde(default)]
    pub per_level: f64,
}

impl ScaledValue {
    pub fn new(base: f64, per_level: f64) -> Self {
        ScaledValue { base, per_level }
    }

    pub fn flat(base: f64) -> Self {
        ScaledValue { base, per_level: 0.0 }
    }

    pub fn at(&self, level: u32) -> f64 {
        self.base + self.per_level * level.saturating_sub(1) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tangent_circles_do_not_intersect() {
        let a = Circle::new(0.0, 0.0, 5.0);
        let b = Circle::new(10.0, 0.0, 5.0);
        assert!(!a.intersects(&b));
        assert!(!b.intersects(&a));

        let c = Circle::new(9.99, 0.0, 5.0);
        assert!(a.intersects(&c));
    }

    #[test]
    fn test_id_allocator_never_reuses() {
        let mut ids = ObjectIdAllocator::new();
        let a = ids.allocate();
        let b = ids.allocate();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn test_default_allocator_starts_at_one() {
        let mut ids = ObjectIdAllocator::default();
        assert_eq!(ids.allocate(), ObjectId(1));
    }

    #[test]
    fn test_scaled_value() {
        let v = ScaledValue::new(10.0, 2.5);
        assert!((v.at(1) - 10.0).abs() < f64::EPSILON);
        assert!((v.at(3) - 15.0).abs() < f64::EPSILON);
        assert!((v.at(0) - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zone_id_world() {
        assert!(ZoneId::world().is_world());
        assert!(!ZoneId::from("cave").is_world());
    }
}
