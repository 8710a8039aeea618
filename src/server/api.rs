//! Request/response records and the synchronous work behind each endpoint.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::combat::{
    estimate_duel, simulate, CombatProfile, DuelSummary, SimulationError, SimulationResult,
    TraceMode,
};
use crate::data::roster::{ProfileSource, Roster, MAX_AGE};
use crate::parallel::{run_matchups, Matchup, MatchupReport, WorkerPool};
use crate::settings::SimulationDefaults;

pub const MAX_UNIT_COUNT: u32 = 500;
pub const MAX_MATCHUPS: usize = 256;
/// Upper bound on the per-request rayon pool; 0 still means the global pool.
pub const MAX_WORKERS: usize = 64;

#[derive(Debug, Clone)]
pub struct AppState {
    pub roster: Arc<Roster>,
    pub defaults: SimulationDefaults,
}

impl AppState {
    pub fn new(roster: Roster, defaults: SimulationDefaults) -> Self {
        Self {
            roster: Arc::new(roster),
            defaults,
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unknown unit '{unit}' for civ '{civ}' at age {age}")]
    UnknownUnit { unit: String, civ: String, age: u8 },

    #[error("{0}")]
    Invalid(String),

    #[error("{0}")]
    SafetyLimit(String),

    #[error("{0}")]
    Internal(String),
}

impl From<SimulationError> for ApiError {
    fn from(err: SimulationError) -> Self {
        match err {
            SimulationError::SafetyLimitExceeded { .. } => Self::SafetyLimit(err.to_string()),
            _ => Self::Invalid(err.to_string()),
        }
    }
}

fn default_age() -> u8 {
    MAX_AGE
}

fn default_count() -> u32 {
    1
}

/// A side is either a roster lookup or a fully resolved inline profile.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SideInput {
    Lookup {
        unit: String,
        civ: String,
        #[serde(default = "default_age")]
        age: u8,
    },
    Inline(CombatProfile),
}

impl SideInput {
    pub fn resolve(&self, source: &impl ProfileSource) -> Result<CombatProfile, ApiError> {
        match self {
            Self::Inline(profile) => Ok(*profile),
            Self::Lookup { unit, civ, age } => {
                source
                    .resolve(unit, civ, *age)
                    .ok_or_else(|| ApiError::UnknownUnit {
                        unit: unit.clone(),
                        civ: civ.clone(),
                        age: *age,
                    })
            }
        }
    }
}

fn check_count(field: &str, count: u32) -> Result<(), ApiError> {
    if count > MAX_UNIT_COUNT {
        return Err(ApiError::Invalid(format!(
            "{field} must be at most {MAX_UNIT_COUNT}, got {count}"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulateRequest {
    pub ally: SideInput,
    pub enemy: SideInput,
    #[serde(default = "default_count")]
    pub ally_count: u32,
    #[serde(default = "default_count")]
    pub enemy_count: u32,
    pub starting_distance: Option<f64>,
    #[serde(default)]
    pub trace: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulateResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub result: SimulationResult,
}

pub fn simulate_payload(
    state: &AppState,
    request: &SimulateRequest,
) -> Result<SimulateResponse, ApiError> {
    check_count("ally_count", request.ally_count)?;
    check_count("enemy_count", request.enemy_count)?;
    let ally = request.ally.resolve(state.roster.as_ref())?;
    let enemy = request.enemy.resolve(state.roster.as_ref())?;

    let mut config = state.defaults.to_config();
    if let Some(distance) = request.starting_distance {
        config.starting_distance = distance;
    }
    if request.trace {
        config.trace_mode = TraceMode::Ticks;
    }

    let result = simulate(
        &ally,
        &enemy,
        request.ally_count,
        request.enemy_count,
        &config,
    )?;
    Ok(SimulateResponse {
        status: "ok",
        result,
    })
}

#[derive(Debug, Clone, Deserialize)]
pub struct DuelRequest {
    pub ally: SideInput,
    pub enemy: SideInput,
}

#[derive(Debug, Clone, Serialize)]
pub struct DuelResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub summary: DuelSummary,
}

pub fn duel_payload(state: &AppState, request: &DuelRequest) -> Result<DuelResponse, ApiError> {
    let ally = request.ally.resolve(state.roster.as_ref())?;
    let enemy = request.enemy.resolve(state.roster.as_ref())?;
    for profile in [&ally, &enemy] {
        profile
            .validate()
            .map_err(|err| ApiError::Invalid(err.to_string()))?;
    }
    Ok(DuelResponse {
        status: "ok",
        summary: estimate_duel(&ally, &enemy),
    })
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchupInput {
    pub label: String,
    pub ally: SideInput,
    pub enemy: SideInput,
    #[serde(default = "default_count")]
    pub ally_count: u32,
    #[serde(default = "default_count")]
    pub enemy_count: u32,
    pub starting_distance: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchupsRequest {
    pub matchups: Vec<MatchupInput>,
    #[serde(default)]
    pub workers: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchupsResponse {
    pub status: &'static str,
    pub reports: Vec<MatchupReport>,
}

pub fn matchups_payload(
    state: &AppState,
    request: &MatchupsRequest,
) -> Result<MatchupsResponse, ApiError> {
    if request.matchups.is_empty() {
        return Err(ApiError::Invalid("matchups must not be empty".to_string()));
    }
    if request.matchups.len() > MAX_MATCHUPS {
        return Err(ApiError::Invalid(format!(
            "at most {MAX_MATCHUPS} matchups per request, got {}",
            request.matchups.len()
        )));
    }

    if request.workers > MAX_WORKERS {
        return Err(ApiError::Invalid(format!(
            "workers must be at most {MAX_WORKERS}, got {}",
            request.workers
        )));
    }

    let matchups = request
        .matchups
        .iter()
        .map(|input| -> Result<Matchup, ApiError> {
            check_count("ally_count", input.ally_count)?;
            check_count("enemy_count", input.enemy_count)?;
            Ok(Matchup {
                label: input.label.clone(),
                ally: input.ally.resolve(state.roster.as_ref())?,
                enemy: input.enemy.resolve(state.roster.as_ref())?,
                ally_count: input.ally_count,
                enemy_count: input.enemy_count,
                starting_distance: input.starting_distance,
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    let reports = run_matchups(
        &matchups,
        &state.defaults.to_config(),
        &WorkerPool::with_workers(request.workers),
    )
    .map_err(|err| ApiError::Internal(err.to_string()))?;
    Ok(MatchupsResponse {
        status: "ok",
        reports,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct UnitListItem {
    pub id: String,
    pub name: String,
    pub civ: String,
    pub age: u8,
}

pub fn units_payload(state: &AppState) -> Vec<UnitListItem> {
    state
        .roster
        .units
        .iter()
        .map(|record| UnitListItem {
            id: record.id.clone(),
            name: record.name.clone(),
            civ: record.civ.clone(),
            age: record.age,
        })
        .collect()
}
