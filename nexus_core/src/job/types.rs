//! Job definitions and runtime job state

use crate::types::{ItemId, JobKey, ObjectId, ResourceKind, ToolType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What completing a job does
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobReward {
    /// Gather from a resource node of the same kind
    GainResource { resource: ResourceKind, amount: u32 },
    GainTool { tool: ToolType },
    GainEssence { amount: f64 },
    CraftItem { item: ItemId },
    GainWallLevel,
    RepairWall { amount: f64 },
    GainPopulation,
    /// Heal one hero per completion, cycling through the heroes
    HealHeroes { amount: f64 },
    /// XP for the hero assigned to the job
    TrainHero { xp: f64 },
}

/// A predicate over the game state used to gate job progress
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobCondition {
    #[default]
    Always,
    ResourceNodeRemaining { resource: ResourceKind },
    WallDamaged,
    HeroTargetAlive,
}

fn default_repeatable() -> bool {
    true
}

/// Configuration for a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDefinition {
    pub key: JobKey,
    pub name: String,
    /// Worker-seconds for the first completion
    pub worker_seconds: f64,
    /// Threshold grows by this fraction of the base per completion
    #[serde(default)]
    pub growth: f64,
    #[serde(default)]
    pub resource_cost: BTreeMap<ResourceKind, u32>,
    #[serde(default)]
    pub essence_cost: f64,
    /// Each worker needs one tool of this type
    #[serde(default)]
    pub required_tool: Option<ToolType>,
    #[serde(default)]
    pub max_workers: Option<u32>,
    #[serde(default = "default_repeatable")]
    pub repeatable: bool,
    pub reward: JobReward,
    /// Progress freezes while false; the job keeps its workers
    #[serde(default)]
    pub can_progress: JobCondition,
    /// The job is stopped as soon as this is false
    #[serde(default)]
    pub valid_while: JobCondition,
}

impl JobDefinition {
    /// Worker-seconds needed for the next completion
    pub fn threshold(&self, completions: u32) -> f64 {
        self.worker_seconds * (1.0 + self.growth * completions as f64)
    }

    pub fn has_cost(&self) -> bool {
        self.essence_cost > 0.0 || self.resource_cost.values().any(|&n| n > 0)
    }
}

/// Runtime state of a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub key: JobKey,
    pub workers: u32,
    pub worker_seconds_completed: f64,
    pub is_paid_for: bool,
    pub should_repeat_job: bool,
    /// Hero explicitly assigned to the job
    pub hero_target: Option<ObjectId>,
    pub completions: u32,
    /// Worker-seconds contributed by heroes since the last progress step
    #[serde(default)]
    pub pending_hero_seconds: f64,
}

impl Job {
    pub fn new(key: JobKey) -> Self {
        Job {
            key,
            workers: 0,
            worker_seconds_completed: 0.0,
            is_paid_for: false,
            should_repeat_job: false,
            hero_target: None,
            completions: 0,
            pending_hero_seconds: 0.0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.workers > 0 || self.hero_target.is_some()
    }

    /// Fraction of the current threshold completed, for display
    pub fn progress_fraction(&self, definition: &JobDefinition) -> f64 {
        let threshold = definition.threshold(self.completions);
        if threshold <= 0.0 {
            0.0
        } else {
            (self.worker_seconds_completed / threshold).clamp(0.0, 1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_growth() {
        let def = JobDefinition {
            key: JobKey::from("build_house"),
            name: "Build House".to_string(),
            worker_seconds: 10.0,
            growth: 0.5,
            resource_cost: BTreeMap::new(),
            essence_cost: 0.0,
            required_tool: None,
            max_workers: None,
            repeatable: true,
            reward: JobReward::GainPopulation,
            can_progress: JobCondition::Always,
            valid_while: JobCondition::Always,
        };
        assert!((def.threshold(0) - 10.0).abs() < f64::EPSILON);
        assert!((def.threshold(2) - 20.0).abs() < f64::EPSILON);
        assert!(!def.has_cost());
    }

    #[test]
    fn test_parse_job() {
        let def: JobDefinition = toml::from_str(
            r#"
key = "chop_wood"
name = "Chop Wood"
worker_seconds = 5.0
required_tool = "axe"
reward = { type = "gain_resource", resource = "wood", amount = 2 }
can_progress = { type = "resource_node_remaining", resource = "wood" }

[resource_cost]
herb = 1
"#,
        )
        .unwrap();
        assert_eq!(def.required_tool, Some(ToolType::Axe));
        assert_eq!(def.resource_cost.get(&ResourceKind::Herb), Some(&1));
        assert!(def.repeatable);
        assert_eq!(def.valid_while, JobCondition::Always);
    }
}
