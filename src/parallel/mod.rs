pub mod batch;
pub mod pool;

pub use batch::{run_matchups, Matchup, MatchupReport, MatchupStatus};
pub use pool::WorkerPool;
