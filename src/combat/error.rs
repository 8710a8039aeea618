use thiserror::Error;

use crate::combat::profile::Side;

/// Rejected inputs. Raised before the tick loop starts, never defaulted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("{side} unit count must be positive")]
    EmptyGroup { side: Side },

    #[error("{field} must be finite and non-negative, got {value}")]
    InvalidStat { field: &'static str, value: f64 },

    #[error("attack interval must be positive, got {0}")]
    NonPositiveAttackInterval(f64),

    #[error("starting hitpoints must be positive, got {0}")]
    NonPositiveHitpoints(f64),

    #[error("tick size must be finite and positive, got {0}")]
    InvalidTickSize(f64),

    #[error("starting distance must be finite and non-negative, got {0}")]
    InvalidStartingDistance(f64),

    #[error("{0} must be at least one tick")]
    ZeroTickWindow(&'static str),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("invalid {side} profile: {source}")]
    Profile {
        side: Side,
        #[source]
        source: ConfigurationError,
    },

    #[error("invalid simulation input: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("simulation aborted after {ticks} ticks without resolution")]
    SafetyLimitExceeded { ticks: u64 },
}

impl SimulationError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Profile { .. } | Self::Configuration(_))
    }
}
