//! Job engine - Worker allocation, payment, progress and completion

use super::types::{Job, JobCondition, JobDefinition, JobReward};
use crate::combat::heal_target;
use crate::types::{JobKey, ObjectId, ZoneId};
use crate::world::GameState;
use tracing::{debug, error, info};

/// The job for `key`, created on first use; None if no definition exists
pub fn get_or_create_job<'a>(state: &'a mut GameState, key: &JobKey) -> Option<&'a mut Job> {
    let Some(definition) = state.content.jobs.get(key) else {
        error!(job = %key, "missing job definition");
        return None;
    };
    let repeat = definition.repeatable;
    Some(state.economy.jobs.entry(key.clone()).or_insert_with(|| {
        let mut job = Job::new(key.clone());
        job.should_repeat_job = repeat;
        job
    }))
}

/// Most workers `key` may hold right now: population left idle plus the
/// job's own workers, the tools not held by other jobs, and the
/// definition's cap
pub fn max_workers(state: &GameState, key: &JobKey) -> u32 {
    let Some(definition) = state.content.jobs.get(key) else {
        return 0;
    };
    let economy = &state.economy;
    let current = economy.jobs.get(key).map_or(0, |j| j.workers);

    let mut max = economy.idle_population() + current;
    if let Some(tool) = definition.required_tool {
        let free = economy
            .tool_count(tool)
            .saturating_sub(economy.tools_in_use(&state.content, tool, Some(key)));
        max = max.min(free);
    }
    if let Some(cap) = definition.max_workers {
        max = max.min(cap);
    }
    max
}

/// Pay every up-front cost of `key` at once, or nothing at all
///
/// Returns true if the job is (now) paid for.
pub fn pay_for_job(state: &mut GameState, key: &JobKey) -> bool {
    let Some(definition) = state.content.jobs.get(key) else {
        error!(job = %key, "missing job definition");
        return false;
    };
    if state.economy.jobs.get(key).is_some_and(|j| j.is_paid_for) {
        return true;
    }

    let affordable =
        state.nexus.essence >= definition.essence_cost && state.economy.has_resources_for(definition);
    if !affordable {
        return false;
    }

    state.economy.deduct_resources(definition);
    state.nexus.essence -= definition.essence_cost;
    if let Some(job) = get_or_create_job(state, key) {
        job.is_paid_for = true;
    }
    true
}

/// Change the worker count of `key` by `delta`; returns the new count
///
/// Adding workers needs a non-zero worker cap and, for an unpaid job, a
/// successful payment. The count is clamped to `[0, max_workers]`.
pub fn update_assigned_workers(state: &mut GameState, key: &JobKey, delta: i32) -> u32 {
    let Some(current) = get_or_create_job(state, key).map(|j| j.workers) else {
        return 0;
    };
    if delta == 0 {
        return current;
    }

    if delta > 0 {
        let max = max_workers(state, key);
        if max == 0 || current >= max {
            return current;
        }
        if !pay_for_job(state, key) {
            debug!(job = %key, "cannot afford job");
            return current;
        }
        let workers = (current.saturating_add(delta as u32)).min(max);
        set_workers(state, key, workers);
        workers
    } else {
        let workers = current.saturating_sub(delta.unsigned_abs());
        set_workers(state, key, workers);
        workers
    }
}

fn set_workers(state: &mut GameState, key: &JobKey, workers: u32) {
    if let Some(job) = state.economy.jobs.get_mut(key) {
        job.workers = workers;
    }
}

/// Flip a job's repeat flag; jobs that cannot repeat stay off
pub fn toggle_repeat(state: &mut GameState, key: &JobKey) -> Option<bool> {
    let repeatable = state.content.jobs.get(key)?.repeatable;
    let job = get_or_create_job(state, key)?;
    job.should_repeat_job = repeatable && !job.should_repeat_job;
    Some(job.should_repeat_job)
}

/// Put a hero on a job, taking it off any previous one
///
/// Declines (false) if the job cannot be paid for.
pub fn assign_hero_to_job(state: &mut GameState, hero: ObjectId, key: &JobKey) -> bool {
    if get_or_create_job(state, key).is_none() || !pay_for_job(state, key) {
        return false;
    }
    unassign_hero(state, hero);
    if let Some(job) = state.economy.jobs.get_mut(key) {
        job.hero_target = Some(hero);
    }
    if let Some(h) = state.hero_mut(hero) {
        h.job = Some(key.clone());
    }
    true
}

/// Take a hero off its job, if any
pub fn unassign_hero(state: &mut GameState, hero: ObjectId) {
    let previous = state.hero_mut(hero).and_then(|h| h.job.take());
    if let Some(key) = previous {
        if let Some(job) = state.economy.jobs.get_mut(&key) {
            if job.hero_target == Some(hero) {
                job.hero_target = None;
            }
        }
    }
}

/// Stop a job: workers and progress zeroed, assigned hero detached
pub fn stop_job(state: &mut GameState, key: &JobKey) {
    let Some(job) = state.economy.jobs.get_mut(key) else {
        return;
    };
    job.workers = 0;
    job.worker_seconds_completed = 0.0;
    job.pending_hero_seconds = 0.0;
    let hero = job.hero_target.take();
    if let Some(hero) = hero {
        if let Some(h) = state.hero_mut(hero) {
            if h.job.as_ref() == Some(key) {
                h.job = None;
            }
        }
    }
    info!(job = %key, "job stopped");
}

/// Credit hero labor; ignored unless the hero is the job's assigned hero
/// and the job is paid for
pub fn credit_hero_work(state: &mut GameState, hero: ObjectId, key: &JobKey, seconds: f64) {
    if let Some(job) = state.economy.jobs.get_mut(key) {
        if job.is_paid_for && job.hero_target == Some(hero) {
            job.pending_hero_seconds += seconds;
        }
    }
}

/// Evaluate a job predicate
pub fn condition_holds(state: &GameState, condition: JobCondition, job: &Job) -> bool {
    match condition {
        JobCondition::Always => true,
        JobCondition::ResourceNodeRemaining { resource } => state.resource_node_remaining(resource) > 0,
        JobCondition::WallDamaged => {
            let wall = &state.nexus.wall;
            wall.level > 0 && wall.health < wall.max_health
        }
        JobCondition::HeroTargetAlive => job
            .hero_target
            .and_then(|id| state.hero(id))
            .is_some_and(|h| h.is_available()),
    }
}

/// Advance every active job by `dt` seconds
///
/// Runs after all field objects so hero labor from this tick is counted.
pub fn progress_jobs(state: &mut GameState, dt: f64) {
    let keys: Vec<JobKey> = state
        .economy
        .jobs
        .values()
        .filter(|j| j.is_active() || j.pending_hero_seconds > 0.0)
        .map(|j| j.key.clone())
        .collect();

    for key in keys {
        let Some(definition) = state.content.jobs.get(&key).cloned() else {
            error!(job = %key, "missing job definition");
            continue;
        };
        progress_job(state, &definition, dt);
    }
}

fn progress_job(state: &mut GameState, definition: &JobDefinition, dt: f64) {
    let key = &definition.key;
    let Some(job) = state.economy.jobs.get(key).cloned() else {
        return;
    };

    if !condition_holds(state, definition.valid_while, &job) {
        stop_job(state, key);
        return;
    }
    if !job.is_paid_for {
        return;
    }
    if !condition_holds(state, definition.can_progress, &job) {
        if let Some(job) = state.economy.jobs.get_mut(key) {
            job.pending_hero_seconds = 0.0;
        }
        return;
    }

    let Some(job) = state.economy.jobs.get_mut(key) else {
        return;
    };
    job.worker_seconds_completed += job.workers as f64 * dt + job.pending_hero_seconds;
    job.pending_hero_seconds = 0.0;

    loop {
        let Some(job) = state.economy.jobs.get_mut(key) else {
            return;
        };
        let threshold = definition.threshold(job.completions);
        if threshold <= 0.0 || job.worker_seconds_completed < threshold {
            return;
        }
        job.worker_seconds_completed -= threshold;
        job.completions += 1;
        job.is_paid_for = false;
        let repeat = job.should_repeat_job && definition.repeatable;
        let snapshot = job.clone();

        complete_job(state, definition, &snapshot);
        state.counters.jobs_completed += 1;
        info!(job = %key, completions = snapshot.completions, "job completed");

        if !repeat {
            stop_job(state, key);
            return;
        }
        if !pay_for_job(state, key) {
            debug!(job = %key, "cannot pay to repeat job");
            stop_job(state, key);
            return;
        }
        let Some(job) = state.economy.jobs.get(key).cloned() else {
            return;
        };
        if !condition_holds(state, definition.valid_while, &job) {
            stop_job(state, key);
            return;
        }
        if !condition_holds(state, definition.can_progress, &job) {
            // frozen on repeat: do not bank progress against the next run
            if let Some(job) = state.economy.jobs.get_mut(key) {
                job.worker_seconds_completed = 0.0;
            }
            return;
        }
    }
}

/// Grant a job's reward
fn complete_job(state: &mut GameState, definition: &JobDefinition, job: &Job) {
    match &definition.reward {
        JobReward::GainResource { resource, amount } => {
            let drawn = state.draw_from_nodes(*resource, *amount);
            state.economy.add_resource(*resource, drawn);
        }
        JobReward::GainTool { tool } => state.economy.add_tool(*tool),
        JobReward::GainEssence { amount } => state.gain_essence(*amount),
        JobReward::CraftItem { item } => {
            if !state.content.items.contains_key(item) {
                error!(%item, job = %definition.key, "crafted an unknown item");
            }
            state.economy.add_item(item.clone());
        }
        JobReward::GainWallLevel => state.gain_wall_level(),
        JobReward::RepairWall { amount } => {
            let wall = &mut state.nexus.wall;
            wall.health = (wall.health + amount).min(wall.max_health);
        }
        JobReward::GainPopulation => state.gain_population_level(),
        JobReward::HealHeroes { amount } => heal_next_hero(state, *amount),
        JobReward::TrainHero { xp } => {
            let Some(hero) = job.hero_target else {
                return;
            };
            let constants = &state.constants;
            let target = state
                .zones
                .values_mut()
                .find_map(|zone| zone.get_mut(hero))
                .and_then(crate::world::FieldObject::as_hero_mut);
            if let Some(h) = target {
                h.gain_xp(*xp, constants);
            }
        }
    }
}

/// Heal the next wounded hero after the last one healed, wrapping around
fn heal_next_hero(state: &mut GameState, amount: f64) {
    let mut wounded: Vec<(ObjectId, ZoneId)> = Vec::new();
    for (zone_id, zone) in &state.zones {
        for object in &zone.objects {
            if let Some(hero) = object.as_hero() {
                if hero.is_available() && hero.core.health < hero.max_health() {
                    wounded.push((hero.id(), zone_id.clone()));
                }
            }
        }
    }
    if wounded.is_empty() {
        return;
    }
    wounded.sort_by_key(|(id, _)| *id);

    let next = state
        .healer_last_target
        .and_then(|last| wounded.iter().find(|(id, _)| *id > last))
        .unwrap_or(&wounded[0])
        .clone();
    heal_target(state, &next.1, next.0, amount);
    state.healer_last_target = Some(next.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Content, SimConstants};
    use crate::types::{ResourceKind, ToolType};

    fn state() -> GameState {
        GameState::with_heroes(Content::with_defaults(), SimConstants::default(), 3, &[])
    }

    #[test]
    fn test_get_or_create_is_idempotent() {
        let mut state = state();
        let key = JobKey::from("pray");
        get_or_create_job(&mut state, &key).unwrap().workers = 1;
        assert_eq!(get_or_create_job(&mut state, &key).unwrap().workers, 1);
        assert_eq!(state.economy.jobs.len(), 1);
        assert!(get_or_create_job(&mut state, &JobKey::from("nope")).is_none());
    }

    #[test]
    fn test_tool_limits_workers() {
        let mut state = state();
        let chop = JobKey::from("chop_wood");
        assert_eq!(max_workers(&state, &chop), 1);
        assert_eq!(update_assigned_workers(&mut state, &chop, 3), 1);
        state.economy.add_tool(ToolType::Axe);
        assert_eq!(update_assigned_workers(&mut state, &chop, 3), 2);
        assert_eq!(state.economy.idle_population(), 1);
    }

    #[test]
    fn test_population_limits_workers() {
        let mut state = state();
        let herbs = JobKey::from("gather_herbs");
        assert_eq!(update_assigned_workers(&mut state, &herbs, 10), 3);
        let pray = JobKey::from("pray");
        assert_eq!(max_workers(&state, &pray), 0);
        assert_eq!(update_assigned_workers(&mut state, &pray, 1), 0);
        assert_eq!(update_assigned_workers(&mut state, &herbs, -2), 1);
        assert_eq!(update_assigned_workers(&mut state, &pray, 5), 2);
    }

    #[test]
    fn test_unaffordable_job_pays_nothing() {
        let mut state = state();
        // stone 10 + wood 5: wood is in stock, stone is not
        let wall = JobKey::from("build_wall");
        assert_eq!(update_assigned_workers(&mut state, &wall, 1), 0);
        assert_eq!(state.economy.resource(ResourceKind::Wood), 10);
        assert!(!state.economy.jobs[&wall].is_paid_for);
    }

    #[test]
    fn test_gathering_draws_from_nodes() {
        let mut state = state();
        let chop = JobKey::from("chop_wood");
        let before = state.resource_node_remaining(ResourceKind::Wood);
        update_assigned_workers(&mut state, &chop, 1);
        progress_jobs(&mut state, 5.0);
        assert_eq!(state.economy.resource(ResourceKind::Wood), 11);
        assert_eq!(state.resource_node_remaining(ResourceKind::Wood), before - 1);
        // repeats by default
        assert_eq!(state.economy.jobs[&chop].workers, 1);
        assert_eq!(state.economy.jobs[&chop].completions, 1);
    }

    #[test]
    fn test_non_repeating_job_stops() {
        let mut state = state();
        let axe = JobKey::from("craft_axe");
        assert_eq!(toggle_repeat(&mut state, &axe), Some(false));
        update_assigned_workers(&mut state, &axe, 2);
        assert_eq!(state.economy.resource(ResourceKind::Wood), 5);
        progress_jobs(&mut state, 4.0);
        assert_eq!(state.economy.tool_count(ToolType::Axe), 2);
        let job = &state.economy.jobs[&axe];
        assert_eq!(job.workers, 0);
        assert!(job.worker_seconds_completed.abs() < f64::EPSILON);
        assert!(!job.is_paid_for);
    }

    #[test]
    fn test_repair_freezes_until_damaged() {
        let mut state = state();
        state.gain_wall_level();
        let repair = JobKey::from("repair_wall");
        update_assigned_workers(&mut state, &repair, 1);
        progress_jobs(&mut state, 1.0);
        assert!(state.economy.jobs[&repair].worker_seconds_completed.abs() < f64::EPSILON);

        state.nexus.wall.health = 30.0;
        progress_jobs(&mut state, 2.0);
        assert!((state.nexus.wall.health - 40.0).abs() < f64::EPSILON);
        assert_eq!(state.economy.jobs[&repair].workers, 1);
    }

    #[test]
    fn test_healer_round_robin() {
        let mut state = GameState::new(Content::with_defaults(), SimConstants::default(), 3);
        let ids = state.hero_ids();
        for id in &ids {
            let hero = state.hero_mut(*id).unwrap();
            hero.core.health = 1.0;
        }
        heal_next_hero(&mut state, 5.0);
        heal_next_hero(&mut state, 5.0);
        heal_next_hero(&mut state, 5.0);
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(state.healer_last_target, Some(sorted[0]));
        assert!((state.hero(sorted[0]).unwrap().core.health - 11.0).abs() < 1e-9);
        assert!((state.hero(sorted[1]).unwrap().core.health - 6.0).abs() < 1e-9);
    }
}
