//! Job module - Worker- and resource-gated repeatable tasks
//!
//! Jobs compete for one shared population and tool pool. Every allocation
//! function mutates those counts directly and runs inside the single
//! update tick.

mod economy;
mod progress;
mod types;

pub use economy::Economy;
pub use progress::{
    assign_hero_to_job, condition_holds, credit_hero_work, get_or_create_job, max_workers, pay_for_job,
    progress_jobs, stop_job, toggle_repeat, unassign_hero, update_assigned_workers,
};
pub use types::{Job, JobCondition, JobDefinition, JobReward};
