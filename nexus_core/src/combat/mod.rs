//! Combat module - Target queries, hit rolls, damage resolution and
//! zone-owned projectiles

mod damage;
mod hits;
mod projectile;
mod result;
mod targeting;

pub use damage::{armor_reduction, damage_target, heal_target, Hit};
pub use hits::{roll_crit, roll_hit_count};
pub use projectile::{DamagePool, Projectile, ProjectileLaunch, ZoneEffect};
pub use result::DamageOutcome;
pub use targeting::{get_targets_in_circle, get_team_targets_in_circle, nearest_of_team, AbilityTarget};
