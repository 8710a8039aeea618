pub mod damage;
pub mod duel;
pub mod engine;
pub mod error;
pub mod profile;
pub mod trace;

pub use damage::{hit_damage, MIN_HIT_DAMAGE};
pub use duel::{estimate_duel, DuelLine, DuelSummary, StatDiffs};
pub use engine::{
    simulate, Battle, CombatantGroup, Outcome, SideResult, SimulationConfig, SimulationResult,
    DEFAULT_MAX_TICKS, DEFAULT_STALL_WINDOW, DEFAULT_TICK_SIZE, EPSILON,
};
pub use error::{ConfigurationError, SimulationError};
pub use profile::{ArmorStats, AttackKind, AttackStat, CombatProfile, Side};
pub use trace::{
    serialize_trace_json, write_trace_csv, EngagementState, SideTick, TickEvent, TraceCollector,
    TraceMode,
};
