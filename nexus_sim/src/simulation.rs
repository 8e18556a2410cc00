//! Headless runs: build a game, apply start-up orders, fast-forward, report

use nexus_core::config::{load_constants, load_content, validate_constants, ConfigError, Content, SimConstants};
use nexus_core::types::JobKey;
use nexus_core::world::{
    adjust_job_workers, export_snapshot, import_snapshot, update_game, CommandError, FieldObject, GameState,
    RunCounters, SaveSnapshot, SnapshotError,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid job order '{0}', expected KEY=WORKERS")]
    JobOrder(String),

    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Everything a run needs, resolved from the command line
#[derive(Debug, Clone, Default)]
pub struct RunSettings {
    /// Simulated seconds, rounded to whole ticks
    pub seconds: f64,
    pub seed: u64,
    pub content: Option<PathBuf>,
    pub constants: Option<PathBuf>,
    pub load: Option<PathBuf>,
    pub save: Option<PathBuf>,
    /// `KEY=WORKERS` orders applied before the first tick
    pub jobs: Vec<String>,
    /// Log a progress line every this many simulated seconds
    pub report_every: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeroReport {
    pub name: String,
    pub class: String,
    pub level: u32,
    pub health: f64,
    pub max_health: f64,
    pub alive: bool,
    pub zone: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub workers: u32,
    pub completions: u32,
    pub progress: f64,
}

/// Summary of a finished run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub seed: u64,
    pub seconds: f64,
    pub essence: f64,
    pub wall_level: u32,
    pub wall_health: f64,
    pub population: u32,
    pub enemies_alive: usize,
    pub spawner_levels: Vec<u32>,
    pub counters: RunCounters,
    pub heroes: Vec<HeroReport>,
    pub jobs: BTreeMap<String, JobReport>,
}

impl RunReport {
    pub fn from_state(state: &GameState, seed: u64) -> Self {
        let mut enemies_alive = 0;
        let mut spawner_levels = Vec::new();
        for zone in state.zones.values() {
            for object in &zone.objects {
                match object {
                    FieldObject::Enemy(_) => enemies_alive += 1,
                    FieldObject::Spawner(spawner) => spawner_levels.push(spawner.level),
                    _ => {}
                }
            }
        }
        spawner_levels.sort_unstable();

        let heroes = state
            .heroes()
            .map(|hero| HeroReport {
                name: hero.name.clone(),
                class: hero.class.to_string(),
                level: hero.level,
                health: hero.core.health,
                max_health: hero.max_health(),
                alive: hero.is_available(),
                zone: state.zone_of(hero.id()).map(|z| z.to_string()),
            })
            .collect();

        let jobs = state
            .economy
            .jobs
            .values()
            .map(|job| {
                let progress = state
                    .content
                    .jobs
                    .get(&job.key)
                    .map_or(0.0, |definition| job.progress_fraction(definition));
                (
                    job.key.to_string(),
                    JobReport {
                        workers: job.workers,
                        completions: job.completions,
                        progress,
                    },
                )
            })
            .collect();

        RunReport {
            seed,
            seconds: state.counters.frames as f64 * state.constants.frame_seconds(),
            essence: state.nexus.essence,
            wall_level: state.nexus.wall.level,
            wall_health: state.nexus.wall.health,
            population: state.economy.population,
            enemies_alive,
            spawner_levels,
            counters: state.counters,
            heroes,
            jobs,
        }
    }

    pub fn print_summary(&self) {
        println!("\n{}", "=".repeat(50));
        println!("  Run summary (seed {}, {:.1}s)", self.seed, self.seconds);
        println!("{}", "=".repeat(50));
        println!("  Essence: {:.1}", self.essence);
        println!("  Wall: level {} ({:.1} hp)", self.wall_level, self.wall_health);
        println!("  Population: {}", self.population);
        println!(
            "  Kills: {} enemies, {} spawners",
            self.counters.enemies_killed, self.counters.spawners_destroyed
        );
        println!("  Hero deaths: {}", self.counters.hero_deaths);
        println!("  Spawner levels: {:?}", self.spawner_levels);
        println!("\n  Heroes:");
        for hero in &self.heroes {
            let status = if hero.alive { "alive" } else { "reviving" };
            println!(
                "    {} the {} - level {}, {:.0}/{:.0} hp, {}",
                hero.name, hero.class, hero.level, hero.health, hero.max_health, status
            );
        }
        if !self.jobs.is_empty() {
            println!("\n  Jobs:");
            for (key, job) in &self.jobs {
                println!(
                    "    {}: {} workers, {} done, {:.0}%",
                    key,
                    job.workers,
                    job.completions,
                    job.progress * 100.0
                );
            }
        }
    }
}

fn parse_job_order(order: &str) -> Result<(JobKey, i32), SimError> {
    let (key, workers) = order
        .split_once('=')
        .ok_or_else(|| SimError::JobOrder(order.to_string()))?;
    let workers: i32 = workers
        .trim()
        .parse()
        .map_err(|_| SimError::JobOrder(order.to_string()))?;
    Ok((JobKey::from(key.trim()), workers))
}

fn load_tables(settings: &RunSettings) -> Result<(Content, SimConstants), SimError> {
    let content = match &settings.content {
        Some(path) => load_content(path)?,
        None => Content::with_defaults(),
    };
    let constants = match &settings.constants {
        Some(path) => load_constants(path)?,
        None => {
            let constants = SimConstants::default();
            validate_constants(&constants)?;
            constants
        }
    };
    Ok((content, constants))
}

/// Build the starting state, either fresh or from a saved snapshot
pub fn build_state(settings: &RunSettings) -> Result<GameState, SimError> {
    let (content, constants) = load_tables(settings)?;
    let state = match &settings.load {
        Some(path) => {
            let json = fs::read_to_string(path).map_err(|source| SimError::Io {
                path: path.clone(),
                source,
            })?;
            let snapshot = SaveSnapshot::from_json(&json)?;
            info!(path = %path.display(), "loaded snapshot");
            import_snapshot(content, constants, settings.seed, &snapshot)
        }
        None => GameState::new(content, constants, settings.seed),
    };
    Ok(state)
}

/// Run the whole simulation and return its report
pub fn run(settings: &RunSettings) -> Result<RunReport, SimError> {
    let mut state = build_state(settings)?;

    for order in &settings.jobs {
        let (key, workers) = parse_job_order(order)?;
        let assigned = adjust_job_workers(&mut state, &key, workers)?;
        if assigned == 0 && workers > 0 {
            warn!(job = %key, "no workers could be assigned");
        } else {
            debug!(job = %key, workers = assigned, "workers assigned");
        }
    }

    let frame_seconds = state.constants.frame_seconds();
    let frames = (settings.seconds.max(0.0) / frame_seconds).round() as u32;
    let chunk = settings
        .report_every
        .filter(|s| *s > 0.0)
        .map_or(frames, |s| ((s / frame_seconds).round() as u32).max(1));

    info!(frames, seed = settings.seed, "simulation started");
    let mut remaining = frames;
    while remaining > 0 {
        let step = remaining.min(chunk.max(1));
        update_game(&mut state, step);
        remaining -= step;
        if settings.report_every.is_some() {
            info!(
                seconds = state.counters.frames as f64 * frame_seconds,
                essence = state.nexus.essence,
                kills = state.counters.enemies_killed,
                "progress"
            );
        }
    }
    info!(
        kills = state.counters.enemies_killed,
        deaths = state.counters.hero_deaths,
        "simulation finished"
    );

    if let Some(path) = &settings.save {
        let json = export_snapshot(&state).to_json()?;
        fs::write(path, json).map_err(|source| SimError::Io {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "snapshot saved");
    }

    Ok(RunReport::from_state(&state, settings.seed))
}
