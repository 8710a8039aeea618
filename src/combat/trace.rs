//! Opt-in per-tick record of a simulation.

use std::io;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceMode {
    #[default]
    Off,
    /// One [TickEvent] per simulated tick.
    Ticks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementState {
    Approaching,
    Engaged,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SideTick {
    pub state: EngagementState,
    pub attacked: bool,
    /// Hits that found a living target this tick.
    pub hits: u32,
    pub damage: f64,
    /// Units alive after death resolution.
    pub units_alive: usize,
    pub position: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickEvent {
    pub tick: u64,
    pub time: f64,
    /// Distance at the start of the tick.
    pub distance: f64,
    pub ally: SideTick,
    pub enemy: SideTick,
}

#[derive(Debug, Clone, Default)]
pub struct TraceCollector {
    enabled: bool,
    events: Vec<TickEvent>,
}

impl TraceCollector {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            events: Vec::new(),
        }
    }

    pub fn for_mode(mode: TraceMode) -> Self {
        Self::new(mode == TraceMode::Ticks)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn record(&mut self, event: TickEvent) {
        if self.enabled {
            self.events.push(event);
        }
    }

    pub fn events(&self) -> &[TickEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<TickEvent> {
        self.events
    }
}

pub fn serialize_trace_json(events: &[TickEvent]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(events)
}

/// Flat CSV row; nested side records do not map onto csv columns.
#[derive(Debug, Serialize)]
struct TraceRow {
    tick: u64,
    time: f64,
    distance: f64,
    ally_state: EngagementState,
    ally_attacked: bool,
    ally_hits: u32,
    ally_damage: f64,
    ally_units_alive: usize,
    ally_position: f64,
    enemy_state: EngagementState,
    enemy_attacked: bool,
    enemy_hits: u32,
    enemy_damage: f64,
    enemy_units_alive: usize,
    enemy_position: f64,
}

impl From<&TickEvent> for TraceRow {
    fn from(event: &TickEvent) -> Self {
        Self {
            tick: event.tick,
            time: event.time,
            distance: event.distance,
            ally_state: event.ally.state,
            ally_attacked: event.ally.attacked,
            ally_hits: event.ally.hits,
            ally_damage: event.ally.damage,
            ally_units_alive: event.ally.units_alive,
            ally_position: event.ally.position,
            enemy_state: event.enemy.state,
            enemy_attacked: event.enemy.attacked,
            enemy_hits: event.enemy.hits,
            enemy_damage: event.enemy.damage,
            enemy_units_alive: event.enemy.units_alive,
            enemy_position: event.enemy.position,
        }
    }
}

/// Write one header row plus one row per tick.
pub fn write_trace_csv<W: io::Write>(events: &[TickEvent], writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for event in events {
        csv_writer.serialize(TraceRow::from(event))?;
    }
    csv_writer.flush()?;
    Ok(())
}
