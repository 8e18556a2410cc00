//! Spatial target queries

use crate::types::{Circle, ObjectId, Team};
use crate::world::FieldObject;
use serde::{Deserialize, Serialize};

/// Anything an ability can be aimed at
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AbilityTarget {
    Object { id: ObjectId },
    /// Zero-radius pseudo-target for location abilities
    Point { x: f64, y: f64 },
}

impl AbilityTarget {
    pub fn object(id: ObjectId) -> Self {
        AbilityTarget::Object { id }
    }

    pub fn point(x: f64, y: f64) -> Self {
        AbilityTarget::Point { x, y }
    }

    pub fn object_id(&self) -> Option<ObjectId> {
        match self {
            AbilityTarget::Object { id } => Some(*id),
            AbilityTarget::Point { .. } => None,
        }
    }
}

/// Available candidates whose circle strictly intersects `circle`
pub fn get_targets_in_circle<'a, I>(candidates: I, circle: &Circle) -> Vec<&'a FieldObject>
where
    I: IntoIterator<Item = &'a FieldObject>,
{
    candidates
        .into_iter()
        .filter(|o| o.is_available() && o.circle().intersects(circle))
        .collect()
}

/// Available, damageable objects of `team` inside `circle`
pub fn get_team_targets_in_circle<'a, I>(candidates: I, circle: &Circle, team: Team) -> Vec<&'a FieldObject>
where
    I: IntoIterator<Item = &'a FieldObject>,
{
    get_targets_in_circle(candidates, circle)
        .into_iter()
        .filter(|o| o.team() == Some(team))
        .collect()
}

/// Closest available object of `team` (edge to edge) within `max_gap`
pub fn nearest_of_team<'a, I>(candidates: I, from: &Circle, team: Team, max_gap: f64) -> Option<&'a FieldObject>
where
    I: IntoIterator<Item = &'a FieldObject>,
{
    candidates
        .into_iter()
        .filter(|o| o.is_available() && o.team() == Some(team))
        .map(|o| (from.gap_to(&o.circle()), o))
        .filter(|(gap, _)| *gap <= max_gap)
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, o)| o)
}
