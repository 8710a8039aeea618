//! Independent matchups simulated in parallel.
//!
//! Each matchup owns its own groups, so the batch shares nothing but the
//! read-only config. A failing matchup is reported in place and does not
//! stop the others.

use rayon::prelude::*;
use rayon::ThreadPoolBuildError;
use serde::{Deserialize, Serialize};

use crate::combat::{simulate, CombatProfile, Outcome, SimulationConfig, TraceMode};
use crate::parallel::pool::WorkerPool;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matchup {
    pub label: String,
    pub ally: CombatProfile,
    pub enemy: CombatProfile,
    pub ally_count: u32,
    pub enemy_count: u32,
    /// Overrides the batch config's starting distance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starting_distance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MatchupStatus {
    Ok {
        outcome: Outcome,
        elapsed_time: f64,
        ally_survivors: usize,
        enemy_survivors: usize,
        ally_hp_left: f64,
        enemy_hp_left: f64,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupReport {
    pub label: String,
    #[serde(flatten)]
    pub status: MatchupStatus,
}

fn run_one(matchup: &Matchup, config: &SimulationConfig) -> MatchupReport {
    let config = SimulationConfig {
        starting_distance: matchup.starting_distance.unwrap_or(config.starting_distance),
        trace_mode: TraceMode::Off,
        ..*config
    };
    let status = match simulate(
        &matchup.ally,
        &matchup.enemy,
        matchup.ally_count,
        matchup.enemy_count,
        &config,
    ) {
        Ok(result) => MatchupStatus::Ok {
            outcome: result.outcome,
            elapsed_time: result.elapsed_time,
            ally_survivors: result.ally.survivors(),
            enemy_survivors: result.enemy.survivors(),
            ally_hp_left: result.ally.hitpoints.iter().sum(),
            enemy_hp_left: result.enemy.hitpoints.iter().sum(),
        },
        Err(err) => MatchupStatus::Error {
            message: err.to_string(),
        },
    };
    MatchupReport {
        label: matchup.label.clone(),
        status,
    }
}

/// Simulates every matchup on `pool`. Reports come back in input order.
pub fn run_matchups(
    matchups: &[Matchup],
    config: &SimulationConfig,
    pool: &WorkerPool,
) -> Result<Vec<MatchupReport>, ThreadPoolBuildError> {
    pool.install(|| {
        matchups
            .par_iter()
            .map(|matchup| run_one(matchup, config))
            .collect()
    })
}
