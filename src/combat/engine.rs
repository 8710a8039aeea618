//! Fixed-tick combat simulator for two unit groups on a 1-D battlefield.
//!
//! The ally group starts at position 0 and the enemy group at
//! [SimulationConfig::starting_distance]. Every tick runs, in order: range
//! check, attack resolution (ally volley first, then enemy), movement of the
//! groups still out of range, removal of dead units, and the termination
//! check. A group attacks as a volley: every living unit lands one hit on the
//! first living unit of the opposing pool.

use serde::{Deserialize, Serialize};

use crate::combat::damage::hit_damage;
use crate::combat::error::{ConfigurationError, SimulationError};
use crate::combat::profile::{CombatProfile, Side};
use crate::combat::trace::{EngagementState, SideTick, TickEvent, TraceCollector, TraceMode};

pub const DEFAULT_TICK_SIZE: f64 = 0.125;
/// Ticks without movement, damage, or an armed group in range before a stalemate is called.
pub const DEFAULT_STALL_WINDOW: u64 = 80;
pub const DEFAULT_MAX_TICKS: u64 = 100_000;
pub const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub tick_size: f64,
    pub starting_distance: f64,
    pub stall_window: u64,
    pub max_ticks: u64,
    pub trace_mode: TraceMode,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_size: DEFAULT_TICK_SIZE,
            starting_distance: 0.0,
            stall_window: DEFAULT_STALL_WINDOW,
            max_ticks: DEFAULT_MAX_TICKS,
            trace_mode: TraceMode::Off,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !self.tick_size.is_finite() || self.tick_size <= 0.0 {
            return Err(ConfigurationError::InvalidTickSize(self.tick_size));
        }
        if !self.starting_distance.is_finite() || self.starting_distance < 0.0 {
            return Err(ConfigurationError::InvalidStartingDistance(
                self.starting_distance,
            ));
        }
        if self.stall_window == 0 {
            return Err(ConfigurationError::ZeroTickWindow("stall_window"));
        }
        if self.max_ticks == 0 {
            return Err(ConfigurationError::ZeroTickWindow("max_ticks"));
        }
        Ok(())
    }
}

/// One side's live state during a simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct CombatantGroup {
    pub side: Side,
    /// Per-unit hitpoints in pool order. Only ever shrinks.
    pub hitpoints: Vec<f64>,
    pub position: f64,
    pub last_attack_time: Option<f64>,
    pub is_moving: bool,
}

impl CombatantGroup {
    pub fn new(
        side: Side,
        profile: &CombatProfile,
        count: u32,
        position: f64,
    ) -> Result<Self, ConfigurationError> {
        if count == 0 {
            return Err(ConfigurationError::EmptyGroup { side });
        }
        Ok(Self {
            side,
            hitpoints: vec![profile.hitpoints; count as usize],
            position,
            last_attack_time: None,
            is_moving: false,
        })
    }

    pub fn is_eliminated(&self) -> bool {
        self.hitpoints.is_empty()
    }

    /// Units with hitpoints left, including ones not yet removed this tick.
    pub fn living_units(&self) -> usize {
        self.hitpoints.iter().filter(|hp| **hp > 0.0).count()
    }

    fn ready_to_attack(&self, now: f64, interval: f64) -> bool {
        match self.last_attack_time {
            None => true,
            Some(last) => now - last >= interval - EPSILON,
        }
    }

    /// Applies `hits` hits of `damage`, each to the first living unit.
    /// Returns the number of hits that found a target.
    fn absorb_volley(&mut self, hits: usize, damage: f64) -> u32 {
        let mut landed = 0;
        let mut target = 0;
        for _ in 0..hits {
            while self.hitpoints.get(target).is_some_and(|hp| *hp <= 0.0) {
                target += 1;
            }
            let Some(hp) = self.hitpoints.get_mut(target) else {
                break;
            };
            *hp -= damage;
            landed += 1;
        }
        landed
    }

    fn remove_dead(&mut self) {
        self.hitpoints.retain(|hp| *hp > 0.0);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Victory { winner: Side },
    Stalemate,
}

impl Outcome {
    pub fn winner(self) -> Option<Side> {
        match self {
            Self::Victory { winner } => Some(winner),
            Self::Stalemate => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideResult {
    pub side: Side,
    /// Surviving units' hitpoints in pool order; empty when wiped out.
    pub hitpoints: Vec<f64>,
    pub volleys: u64,
    pub hits_landed: u64,
    pub damage_dealt: f64,
    pub position: f64,
}

impl SideResult {
    pub fn survivors(&self) -> usize {
        self.hitpoints.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub ally: SideResult,
    pub enemy: SideResult,
    /// Simulated seconds at the tick that resolved the battle.
    pub elapsed_time: f64,
    pub ticks: u64,
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<TickEvent>,
}

impl SimulationResult {
    pub fn side(&self, side: Side) -> &SideResult {
        match side {
            Side::Ally => &self.ally,
            Side::Enemy => &self.enemy,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    volleys: u64,
    hits_landed: u64,
    damage_dealt: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct Strike {
    attacked: bool,
    hits: u32,
    damage: f64,
}

/// Runs `attacker`'s volley against `defender` if it is in range and off cooldown.
fn resolve_attack(
    attacker: &mut CombatantGroup,
    defender: &mut CombatantGroup,
    state: EngagementState,
    hit: Option<f64>,
    interval: f64,
    now: f64,
) -> Strike {
    let Some(damage) = hit else {
        return Strike::default();
    };
    let volley = attacker.living_units();
    if state != EngagementState::Engaged
        || volley == 0
        || defender.living_units() == 0
        || !attacker.ready_to_attack(now, interval)
    {
        return Strike::default();
    }
    attacker.last_attack_time = Some(now);
    let hits = defender.absorb_volley(volley, damage);
    Strike {
        attacked: true,
        hits,
        damage: f64::from(hits) * damage,
    }
}

fn engagement(distance: f64, max_range: f64) -> EngagementState {
    if distance > max_range + EPSILON {
        EngagementState::Approaching
    } else {
        EngagementState::Engaged
    }
}

/// Splits this tick's closing movement so the groups meet instead of crossing.
fn closing_steps(ally_step: f64, enemy_step: f64, distance: f64) -> (f64, f64) {
    let total = ally_step + enemy_step;
    if total <= distance {
        return (ally_step, enemy_step);
    }
    let ally_share = distance * ally_step / total;
    (ally_share, distance - ally_share)
}

/// A simulation in progress. Use [simulate] unless per-tick inspection is needed.
#[derive(Debug, Clone)]
pub struct Battle {
    ally_profile: CombatProfile,
    enemy_profile: CombatProfile,
    ally: CombatantGroup,
    enemy: CombatantGroup,
    ally_hit: Option<f64>,
    enemy_hit: Option<f64>,
    config: SimulationConfig,
    tick: u64,
    stalled_ticks: u64,
    ally_tally: Tally,
    enemy_tally: Tally,
    trace: TraceCollector,
    resolved: Option<(Outcome, f64)>,
}

impl Battle {
    pub fn new(
        ally_profile: &CombatProfile,
        enemy_profile: &CombatProfile,
        ally_count: u32,
        enemy_count: u32,
        config: &SimulationConfig,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        ally_profile
            .validate()
            .map_err(|source| SimulationError::Profile {
                side: Side::Ally,
                source,
            })?;
        enemy_profile
            .validate()
            .map_err(|source| SimulationError::Profile {
                side: Side::Enemy,
                source,
            })?;
        let ally = CombatantGroup::new(Side::Ally, ally_profile, ally_count, 0.0)?;
        let enemy = CombatantGroup::new(
            Side::Enemy,
            enemy_profile,
            enemy_count,
            config.starting_distance,
        )?;

        Ok(Self {
            ally_profile: *ally_profile,
            enemy_profile: *enemy_profile,
            ally,
            enemy,
            ally_hit: hit_damage(ally_profile, enemy_profile).map(|(_, damage)| damage),
            enemy_hit: hit_damage(enemy_profile, ally_profile).map(|(_, damage)| damage),
            config: *config,
            tick: 0,
            stalled_ticks: 0,
            ally_tally: Tally::default(),
            enemy_tally: Tally::default(),
            trace: TraceCollector::for_mode(config.trace_mode),
            resolved: None,
        })
    }

    /// Ticks simulated so far.
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    pub fn group(&self, side: Side) -> &CombatantGroup {
        match side {
            Side::Ally => &self.ally,
            Side::Enemy => &self.enemy,
        }
    }

    pub fn distance(&self) -> f64 {
        (self.enemy.position - self.ally.position).max(0.0)
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.resolved.map(|(outcome, _)| outcome)
    }

    /// Simulates one tick. Returns the outcome once the battle is resolved;
    /// stepping a resolved battle is a no-op.
    pub fn step(&mut self) -> Option<Outcome> {
        if let Some((outcome, _)) = self.resolved {
            return Some(outcome);
        }

        let now = self.tick as f64 * self.config.tick_size;
        let distance = self.distance();
        let ally_state = engagement(distance, self.ally_profile.max_range);
        let enemy_state = engagement(distance, self.enemy_profile.max_range);

        let ally_strike = resolve_attack(
            &mut self.ally,
            &mut self.enemy,
            ally_state,
            self.ally_hit,
            self.ally_profile.attack_interval,
            now,
        );
        let enemy_strike = resolve_attack(
            &mut self.enemy,
            &mut self.ally,
            enemy_state,
            self.enemy_hit,
            self.enemy_profile.attack_interval,
            now,
        );

        let step_for = |state: EngagementState, profile: &CombatProfile| {
            if state == EngagementState::Approaching {
                profile.move_speed * self.config.tick_size
            } else {
                0.0
            }
        };
        let (ally_step, enemy_step) = closing_steps(
            step_for(ally_state, &self.ally_profile),
            step_for(enemy_state, &self.enemy_profile),
            distance,
        );
        self.ally.position += ally_step;
        self.enemy.position -= enemy_step;
        self.ally.is_moving = ally_step > 0.0;
        self.enemy.is_moving = enemy_step > 0.0;

        self.ally.remove_dead();
        self.enemy.remove_dead();

        for (tally, strike) in [
            (&mut self.ally_tally, ally_strike),
            (&mut self.enemy_tally, enemy_strike),
        ] {
            if strike.attacked {
                tally.volleys += 1;
            }
            tally.hits_landed += u64::from(strike.hits);
            tally.damage_dealt += strike.damage;
        }

        self.trace.record(TickEvent {
            tick: self.tick,
            time: now,
            distance,
            ally: SideTick {
                state: ally_state,
                attacked: ally_strike.attacked,
                hits: ally_strike.hits,
                damage: ally_strike.damage,
                units_alive: self.ally.hitpoints.len(),
                position: self.ally.position,
            },
            enemy: SideTick {
                state: enemy_state,
                attacked: enemy_strike.attacked,
                hits: enemy_strike.hits,
                damage: enemy_strike.damage,
                units_alive: self.enemy.hitpoints.len(),
                position: self.enemy.position,
            },
        });
        self.tick += 1;

        let outcome = if self.enemy.is_eliminated() {
            Some(Outcome::Victory { winner: Side::Ally })
        } else if self.ally.is_eliminated() {
            Some(Outcome::Victory { winner: Side::Enemy })
        } else {
            let armed_in_range = (ally_state == EngagementState::Engaged && self.ally_hit.is_some())
                || (enemy_state == EngagementState::Engaged && self.enemy_hit.is_some());
            let progressed = ally_step > 0.0
                || enemy_step > 0.0
                || ally_strike.hits > 0
                || enemy_strike.hits > 0
                || armed_in_range;
            if progressed {
                self.stalled_ticks = 0;
            } else {
                self.stalled_ticks += 1;
            }
            (self.stalled_ticks >= self.config.stall_window).then_some(Outcome::Stalemate)
        };

        if let Some(outcome) = outcome {
            self.resolved = Some((outcome, now));
        }
        outcome
    }

    /// Steps until resolution or the tick ceiling.
    pub fn run(mut self) -> Result<SimulationResult, SimulationError> {
        tracing::debug!(
            ally_units = self.ally.hitpoints.len(),
            enemy_units = self.enemy.hitpoints.len(),
            distance = self.distance(),
            "simulation started"
        );
        loop {
            if let Some((outcome, elapsed_time)) = self.resolved {
                return Ok(self.into_result(outcome, elapsed_time));
            }
            if self.tick >= self.config.max_ticks {
                tracing::warn!(ticks = self.tick, "simulation hit the tick ceiling");
                return Err(SimulationError::SafetyLimitExceeded { ticks: self.tick });
            }
            self.step();
        }
    }

    fn into_result(self, outcome: Outcome, elapsed_time: f64) -> SimulationResult {
        tracing::debug!(
            ?outcome,
            elapsed_time,
            ticks = self.tick,
            "simulation resolved"
        );
        let side_result = |group: CombatantGroup, tally: Tally| SideResult {
            side: group.side,
            hitpoints: group.hitpoints,
            volleys: tally.volleys,
            hits_landed: tally.hits_landed,
            damage_dealt: tally.damage_dealt,
            position: group.position,
        };
        SimulationResult {
            ally: side_result(self.ally, self.ally_tally),
            enemy: side_result(self.enemy, self.enemy_tally),
            elapsed_time,
            ticks: self.tick,
            outcome,
            trace: self.trace.into_events(),
        }
    }
}

/// Simulates `ally_count` units of `ally_profile` against `enemy_count` units
/// of `enemy_profile` until one pool is empty or a stalemate is detected.
pub fn simulate(
    ally_profile: &CombatProfile,
    enemy_profile: &CombatProfile,
    ally_count: u32,
    enemy_count: u32,
    config: &SimulationConfig,
) -> Result<SimulationResult, SimulationError> {
    Battle::new(ally_profile, enemy_profile, ally_count, enemy_count, config)?.run()
}
