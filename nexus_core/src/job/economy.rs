//! Economy - Population, inventory and the job table of a run

use super::types::{Job, JobDefinition};
use crate::config::{Content, SimConstants};
use crate::types::{ItemId, JobKey, ResourceKind, ToolType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Economy {
    /// Houses built; population follows from it
    pub population_level: u32,
    pub population: u32,
    pub resources: BTreeMap<ResourceKind, u32>,
    pub tools: BTreeMap<ToolType, u32>,
    pub items: BTreeMap<ItemId, u32>,
    pub jobs: BTreeMap<JobKey, Job>,
}

impl Economy {
    pub fn new(constants: &SimConstants) -> Self {
        Economy {
            population_level: 0,
            population: constants.population(0),
            resources: constants.economy.starting_resources.clone(),
            tools: constants.economy.starting_tools.clone(),
            items: BTreeMap::new(),
            jobs: BTreeMap::new(),
        }
    }

    pub fn resource(&self, kind: ResourceKind) -> u32 {
        self.resources.get(&kind).copied().unwrap_or(0)
    }

    pub fn add_resource(&mut self, kind: ResourceKind, amount: u32) {
        *self.resources.entry(kind).or_insert(0) += amount;
    }

    pub fn tool_count(&self, tool: ToolType) -> u32 {
        self.tools.get(&tool).copied().unwrap_or(0)
    }

    pub fn add_tool(&mut self, tool: ToolType) {
        *self.tools.entry(tool).or_insert(0) += 1;
    }

    pub fn item_count(&self, item: &ItemId) -> u32 {
        self.items.get(item).copied().unwrap_or(0)
    }

    pub fn add_item(&mut self, item: ItemId) {
        *self.items.entry(item).or_insert(0) += 1;
    }

    /// Remove one item from the inventory; false if there is none
    pub fn take_item(&mut self, item: &ItemId) -> bool {
        match self.items.get_mut(item) {
            Some(count) if *count > 0 => {
                *count -= 1;
                if *count == 0 {
                    self.items.remove(item);
                }
                true
            }
            _ => false,
        }
    }

    /// Population currently assigned to jobs
    pub fn assigned_workers(&self) -> u32 {
        self.jobs.values().map(|j| j.workers).sum()
    }

    pub fn idle_population(&self) -> u32 {
        self.population.saturating_sub(self.assigned_workers())
    }

    /// Tools of `tool` held by workers of jobs other than `except`
    pub fn tools_in_use(&self, content: &Content, tool: ToolType, except: Option<&JobKey>) -> u32 {
        self.jobs
            .values()
            .filter(|job| Some(&job.key) != except)
            .filter(|job| {
                content
                    .jobs
                    .get(&job.key)
                    .is_some_and(|def| def.required_tool == Some(tool))
            })
            .map(|job| job.workers)
            .sum()
    }

    /// Whether every resource of the job's cost is in stock
    pub fn has_resources_for(&self, definition: &JobDefinition) -> bool {
        definition
            .resource_cost
            .iter()
            .all(|(kind, amount)| self.resource(*kind) >= *amount)
    }

    /// Deduct the job's resource cost; callers check affordability first
    pub(crate) fn deduct_resources(&mut self, definition: &JobDefinition) {
        for (kind, amount) in &definition.resource_cost {
            if let Some(stock) = self.resources.get_mut(kind) {
                *stock = stock.saturating_sub(*amount);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starting_inventory() {
        let economy = Economy::new(&SimConstants::default());
        assert_eq!(economy.population, 3);
        assert_eq!(economy.resource(ResourceKind::Wood), 10);
        assert_eq!(economy.tool_count(ToolType::Axe), 1);
        assert_eq!(economy.idle_population(), 3);
    }

    #[test]
    fn test_take_item() {
        let mut economy = Economy::new(&SimConstants::default());
        let sword = ItemId::from("bronze_sword");
        assert!(!economy.take_item(&sword));
        economy.add_item(sword.clone());
        assert_eq!(economy.item_count(&sword), 1);
        assert!(economy.take_item(&sword));
        assert_eq!(economy.item_count(&sword), 0);
    }

    #[test]
    fn test_tools_in_use_counts_other_jobs() {
        let content = Content::with_defaults();
        let mut economy = Economy::new(&SimConstants::default());
        let mut chop = Job::new(JobKey::from("chop_wood"));
        chop.workers = 1;
        economy.jobs.insert(chop.key.clone(), chop);
        assert_eq!(economy.tools_in_use(&content, ToolType::Axe, None), 1);
        assert_eq!(
            economy.tools_in_use(&content, ToolType::Axe, Some(&JobKey::from("chop_wood"))),
            0
        );
    }
}
